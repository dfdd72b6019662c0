//! Key condition builder for queries.
//!
//! Collects a partition key equality, an optional sort key predicate and an optional list of
//! projected attributes, then compiles them into an [`Expression`].

use crate::{
    error::{Error, Result},
    expression::{Expression, ExpressionBuilder, condition, selection},
    marshal::KeyBase,
    value::{self, IntoAttributeValue},
};

use aws_sdk_dynamodb::types::AttributeValue;
use indexmap::IndexSet;

/// Operator of a sort key predicate.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum KeyOperator {
    /// `key = value`
    #[default]
    Equal,
    /// `key < value`
    LessThan,
    /// `key <= value`
    LessThanEqual,
    /// `key > value`
    GreaterThan,
    /// `key >= value`
    GreaterThanEqual,
    /// `begins_with(key, value)`, string values only.
    BeginsWith,
    /// `key BETWEEN value AND upper`
    Between,
}

impl KeyOperator {
    /// Build the key predicate for `key`.
    ///
    /// Fails with [`Error::RequiredKeyAndValue`] when `key` is empty or `value` is absent,
    /// [`Error::BeginsWithPrefixType`] when `BeginsWith` is given a non-string value and
    /// [`Error::BetweenUpperValue`] when `Between` has no upper bound.
    pub fn key_condition(
        self,
        key: &str,
        value: Option<AttributeValue>,
        upper: Option<AttributeValue>,
    ) -> Result<condition::KeyCondition> {
        let value = match value {
            Some(value) if !key.is_empty() && !value::is_nil(&value) => value,
            _ => return Err(Error::RequiredKeyAndValue),
        };
        let condition = match self {
            Self::Equal => condition::Condition::Equals(value),
            Self::LessThan => condition::Condition::LessThan(value),
            Self::LessThanEqual => condition::Condition::LessThanOrEqual(value),
            Self::GreaterThan => condition::Condition::GreaterThan(value),
            Self::GreaterThanEqual => condition::Condition::GreaterThanOrEqual(value),
            Self::BeginsWith => match value {
                AttributeValue::S(prefix) => condition::Condition::BeginsWith(prefix),
                _ => return Err(Error::BeginsWithPrefixType),
            },
            Self::Between => match upper {
                Some(upper) if !value::is_nil(&upper) => {
                    condition::Condition::Between(value, upper)
                }
                _ => return Err(Error::BetweenUpperValue),
            },
        };
        Ok(condition::KeyCondition {
            condition,
            name: key.to_string(),
        })
    }
}

/// Builder for a query key condition with an optional projection.
///
/// ```rust
/// use dynamodb_access::key_condition::{KeyConditionBuilder, KeyOperator};
///
/// let expression = KeyConditionBuilder::new()
///     .with_partition_key("customerId", "c-1")
///     .with_sort_key(KeyOperator::BeginsWith, "orderId", "2024#")
///     .with_projection(["orderId", "total"])
///     .build()
///     .unwrap();
/// assert_eq!(
///     expression.key_condition(),
///     Some("#customerId = :customerId_eq0 AND begins_with(#orderId, :orderId_begins_with1)")
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyConditionBuilder {
    partition_key_field: String,
    partition_key_value: Option<AttributeValue>,
    sort_key_operator: Option<KeyOperator>,
    sort_key_field: String,
    sort_key_value: Option<AttributeValue>,
    sort_key_upper: Option<AttributeValue>,
    projection: Vec<String>,
}

impl KeyConditionBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the partition key equality.
    pub fn with_partition_key(
        mut self,
        field: impl Into<String>,
        value: impl IntoAttributeValue,
    ) -> Self {
        self.partition_key_field = field.into();
        self.partition_key_value = Some(value.into_attribute_value());
        self
    }

    /// Set the sort key predicate.
    pub fn with_sort_key(
        mut self,
        operator: KeyOperator,
        field: impl Into<String>,
        value: impl IntoAttributeValue,
    ) -> Self {
        self.sort_key_operator = Some(operator);
        self.sort_key_field = field.into();
        self.sort_key_value = Some(value.into_attribute_value());
        self
    }

    /// Set the upper bound used by [`KeyOperator::Between`].
    pub fn with_upper_bound(mut self, upper: impl IntoAttributeValue) -> Self {
        self.sort_key_upper = Some(upper.into_attribute_value());
        self
    }

    /// Take the partition key and, when `operator` is given, the sort key from a keyed item.
    pub fn with_key_base<K: KeyBase + ?Sized>(
        mut self,
        key_base: &K,
        operator: Option<KeyOperator>,
    ) -> Self {
        self = self.with_partition_key(key_base.partition_key_field(), key_base.partition_key());
        if let Some(operator) = operator {
            self = self.with_sort_key(
                operator,
                key_base.sort_key_field().unwrap_or_default(),
                key_base.sort_key(),
            );
        }
        self
    }

    /// Append attributes to the projection.
    pub fn with_projection<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Whether the partition key field and value are both present.
    pub fn is_enabled(&self) -> bool {
        !self.partition_key_field.is_empty()
            && self
                .partition_key_value
                .as_ref()
                .is_some_and(|value| !value::is_nil(value))
    }

    /// Compile into an expression holding the key condition and, if any, the projection.
    ///
    /// Projected attributes are de-duplicated, keeping the first occurrence of each.
    pub fn build(self) -> Result<Expression> {
        if !self.is_enabled() {
            return Err(Error::RequiredPartitionKey);
        }
        let mut key_condition = vec![KeyOperator::Equal.key_condition(
            &self.partition_key_field,
            self.partition_key_value,
            None,
        )?];
        if let Some(operator) = self.sort_key_operator {
            key_condition.push(operator.key_condition(
                &self.sort_key_field,
                self.sort_key_value,
                self.sort_key_upper,
            )?);
        }
        let mut builder = ExpressionBuilder::new().with_key_condition(key_condition);
        if !self.projection.is_empty() {
            let projection: IndexSet<String> = self.projection.into_iter().collect();
            builder = builder.with_projection(selection::SelectionMap::Leaves(
                projection.into_iter().collect(),
            ));
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_dynamodb::primitives::Blob;
    use rstest::rstest;
    use std::collections;

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn n(value: &str) -> AttributeValue {
        AttributeValue::N(value.to_string())
    }

    #[rstest]
    #[case::equal(KeyOperator::Equal, "#sk = :sk_eq1")]
    #[case::less_than(KeyOperator::LessThan, "#sk < :sk_lt1")]
    #[case::less_than_equal(KeyOperator::LessThanEqual, "#sk <= :sk_lte1")]
    #[case::greater_than(KeyOperator::GreaterThan, "#sk > :sk_gt1")]
    #[case::greater_than_equal(KeyOperator::GreaterThanEqual, "#sk >= :sk_gte1")]
    fn test_sort_key_operators(#[case] operator: KeyOperator, #[case] expected: &str) {
        let expression = KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .with_sort_key(operator, "sk", 5)
            .build()
            .unwrap();
        assert_eq!(
            expression.key_condition(),
            Some(format!("#pk = :pk_eq0 AND {expected}").as_str())
        );
    }

    #[test]
    fn test_partition_key_only() {
        let expression = KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .build()
            .unwrap();
        assert_eq!(expression.key_condition(), Some("#pk = :pk_eq0"));
        assert_eq!(expression.projection(), None);
        assert_eq!(
            expression.values(),
            Some(&collections::HashMap::from([(":pk_eq0".to_string(), s("a"))]))
        );
    }

    #[test]
    fn test_between() {
        let expression = KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .with_sort_key(KeyOperator::Between, "sk", 1)
            .with_upper_bound(9)
            .build()
            .unwrap();
        assert_eq!(
            expression.key_condition(),
            Some("#pk = :pk_eq0 AND #sk BETWEEN :sk_between1 AND :sk_between2")
        );
        assert_eq!(
            expression.values(),
            Some(&collections::HashMap::from([
                (":pk_eq0".to_string(), s("a")),
                (":sk_between1".to_string(), n("1")),
                (":sk_between2".to_string(), n("9")),
            ]))
        );
    }

    #[test]
    fn test_binary_partition_key() {
        let expression = KeyConditionBuilder::new()
            .with_partition_key("pk", vec![1u8, 2])
            .build()
            .unwrap();
        assert_eq!(
            expression.values(),
            Some(&collections::HashMap::from([(
                ":pk_eq0".to_string(),
                AttributeValue::B(Blob::new(vec![1, 2]))
            )]))
        );
    }

    #[test]
    fn test_projection_is_deduplicated() {
        let expression = KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .with_projection(["a", "b"])
            .with_projection(["a", "c", "b"])
            .build()
            .unwrap();
        assert_eq!(expression.projection(), Some("#a, #b, #c"));
    }

    #[rstest]
    #[case::empty(KeyConditionBuilder::new())]
    #[case::missing_field(KeyConditionBuilder::new().with_partition_key("", "a"))]
    #[case::nil_value(KeyConditionBuilder::new().with_partition_key("pk", None::<String>))]
    #[case::sort_key_only(KeyConditionBuilder::new().with_sort_key(KeyOperator::Equal, "sk", "a"))]
    fn test_required_partition_key(#[case] builder: KeyConditionBuilder) {
        assert!(!builder.is_enabled());
        assert!(matches!(builder.build(), Err(Error::RequiredPartitionKey)));
    }

    #[rstest]
    #[case::begins_with_number(
        KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .with_sort_key(KeyOperator::BeginsWith, "sk", 1),
        "begins_with requires a string prefix"
    )]
    #[case::between_without_upper(
        KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .with_sort_key(KeyOperator::Between, "sk", 1),
        "between requires an upper bound"
    )]
    #[case::sort_key_without_field(
        KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .with_sort_key(KeyOperator::Equal, "", 1),
        "key field and value are required"
    )]
    #[case::sort_key_nil(
        KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .with_sort_key(KeyOperator::Equal, "sk", None::<i64>),
        "key field and value are required"
    )]
    #[case::sort_key_nan(
        KeyConditionBuilder::new()
            .with_partition_key("pk", "a")
            .with_sort_key(KeyOperator::GreaterThan, "sk", f64::NAN),
        "key field and value are required"
    )]
    fn test_invalid_sort_key(#[case] builder: KeyConditionBuilder, #[case] expected: &str) {
        assert_eq!(builder.build().unwrap_err().to_string(), expected);
    }

    #[rstest]
    #[case::empty_key(KeyOperator::Equal, "", Some(s("a")), None)]
    #[case::missing_value(KeyOperator::Equal, "a", None, None)]
    #[case::null_value(KeyOperator::LessThan, "a", Some(AttributeValue::Null(true)), None)]
    fn test_key_operator_required(
        #[case] operator: KeyOperator,
        #[case] key: &str,
        #[case] value: Option<AttributeValue>,
        #[case] upper: Option<AttributeValue>,
    ) {
        assert!(matches!(
            operator.key_condition(key, value, upper),
            Err(Error::RequiredKeyAndValue)
        ));
    }

    #[test]
    fn test_key_operator_begins_with() {
        let actual = KeyOperator::BeginsWith
            .key_condition("sk", Some(s("2024#")), None)
            .unwrap();
        assert_eq!(
            actual,
            condition::KeyCondition {
                condition: condition::Condition::BeginsWith("2024#".to_string()),
                name: "sk".to_string(),
            }
        );
    }
}
