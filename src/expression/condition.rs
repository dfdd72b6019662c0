use crate::expression::{self, ExpressionError, Fragment};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use std::{collections, ops};

/// Logical operator for combining conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicalOperator {
    /// Logical AND - all conditions must be true.
    And,
    /// Logical OR - at least one condition must be true.
    Or,
}

impl ops::Deref for LogicalOperator {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Condition types for DynamoDB expressions.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::expression::condition;
///
/// let eq = condition::Condition::Equals(AttributeValue::S("value".to_string()));
/// let gt = condition::Condition::GreaterThan(AttributeValue::N("100".to_string()));
/// let null = condition::Condition::Null;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// Checks if an attribute begins with a specified prefix (string types only).
    BeginsWith(String),
    /// Checks if an attribute value is between two values (inclusive).
    Between(types::AttributeValue, types::AttributeValue),
    /// Checks if an attribute contains a specified value.
    Contains(types::AttributeValue),
    /// Checks if an attribute value equals a specified value.
    Equals(types::AttributeValue),
    /// Checks if an attribute value is greater than a specified value.
    GreaterThan(types::AttributeValue),
    /// Checks if an attribute value is greater than or equal to a specified value.
    GreaterThanOrEqual(types::AttributeValue),
    /// Checks if an attribute value is in a list of specified values.
    In(Vec<types::AttributeValue>),
    /// Checks if an attribute value is less than a specified value.
    LessThan(types::AttributeValue),
    /// Checks if an attribute value is less than or equal to a specified value.
    LessThanOrEqual(types::AttributeValue),
    /// Checks if an attribute does not contain a specified value.
    NotContains(types::AttributeValue),
    /// Checks if an attribute value does not equal a specified value.
    NotEqual(types::AttributeValue),
    /// Checks if an attribute exists (is not null).
    NotNull,
    /// Checks if an attribute does not exist (is null).
    Null,
}

impl Condition {
    fn render(
        self,
        key: &str,
        key_placeholder: &str,
        index: &mut usize,
    ) -> (String, collections::HashMap<String, types::AttributeValue>) {
        let mut expression_attribute_values = collections::HashMap::new();
        let mut bind = |tag: &str, value: types::AttributeValue| {
            let value_placeholder = expression::value_placeholder(key, tag, *index);
            *index += 1;
            expression_attribute_values.insert(value_placeholder.clone(), value);
            value_placeholder
        };
        let expression = match self {
            Self::BeginsWith(prefix) => {
                let value_placeholder = bind("begins_with", types::AttributeValue::S(prefix));
                format!("begins_with({key_placeholder}, {value_placeholder})")
            }
            Self::Between(low, high) => {
                let low = bind("between", low);
                let high = bind("between", high);
                format!("{key_placeholder} BETWEEN {low} AND {high}")
            }
            Self::Contains(value) => {
                format!("contains({key_placeholder}, {})", bind("contains", value))
            }
            Self::Equals(value) => format!("{key_placeholder} = {}", bind("eq", value)),
            Self::GreaterThan(value) => format!("{key_placeholder} > {}", bind("gt", value)),
            Self::GreaterThanOrEqual(value) => {
                format!("{key_placeholder} >= {}", bind("gte", value))
            }
            Self::In(values) => {
                let placeholders: Vec<_> =
                    values.into_iter().map(|value| bind("in", value)).collect();
                format!("{key_placeholder} IN ({})", placeholders.join(", "))
            }
            Self::LessThan(value) => format!("{key_placeholder} < {}", bind("lt", value)),
            Self::LessThanOrEqual(value) => {
                format!("{key_placeholder} <= {}", bind("lte", value))
            }
            Self::NotContains(value) => {
                format!(
                    "NOT contains({key_placeholder}, {})",
                    bind("not_contains", value)
                )
            }
            Self::NotEqual(value) => format!("{key_placeholder} <> {}", bind("ne", value)),
            Self::NotNull => format!("attribute_exists({key_placeholder})"),
            Self::Null => format!("attribute_not_exists({key_placeholder})"),
        };
        (expression, expression_attribute_values)
    }
}

/// Condition applied to an attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition {
    /// The condition to apply to the attribute.
    pub condition: Condition,
    /// The name of the attribute to apply the condition to.
    pub name: String,
}

impl KeyCondition {
    pub(crate) fn render_all(
        keys: Vec<Self>,
        index: &mut usize,
    ) -> Result<Fragment, ExpressionError> {
        let mut fragments = Vec::with_capacity(keys.len());
        for key in keys {
            let placeholder = expression::name_placeholder(&key.name);
            let (expression, expression_attribute_values) =
                key.condition.render(&key.name, &placeholder, index);
            fragments.push(Fragment {
                expression,
                names: collections::HashMap::from([(placeholder, key.name)]),
                values: expression_attribute_values,
            });
        }
        Fragment::merge(&LogicalOperator::And, fragments)
    }
}

/// Map of conditions with logical operators.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::expression::condition;
///
/// let map = condition::ConditionMap::Leaves(
///     condition::LogicalOperator::And,
///     vec![
///         condition::KeyCondition {
///             name: "status".to_string(),
///             condition: condition::Condition::Equals(AttributeValue::S("active".to_string())),
///         },
///     ],
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionMap {
    /// Leaf conditions - flat list of conditions combined with the logical operator.
    Leaves(LogicalOperator, Vec<KeyCondition>),
    /// Node conditions - nested conditions for hierarchical attribute paths.
    Node(LogicalOperator, IndexMap<String, ConditionMap>),
}

impl ConditionMap {
    /// whether the rendered expression holds more than one clause
    fn is_compound(&self) -> bool {
        match self {
            Self::Leaves(_, leaves) => leaves.len() > 1,
            Self::Node(_, map) => match map.len() {
                0 => false,
                1 => map.values().any(Self::is_compound),
                _ => true,
            },
        }
    }

    pub(crate) fn render(
        self,
        keys: &[String],
        index: &mut usize,
    ) -> Result<Fragment, ExpressionError> {
        match self {
            Self::Leaves(operator, key_conditions) => {
                let mut fragments = Vec::with_capacity(key_conditions.len());
                for key_condition in key_conditions {
                    let (placeholder, new_keys) =
                        expression::add_placeholder(keys, &key_condition.name);
                    let key_placeholder = new_keys.join(expression::PATH_SEPARATOR);
                    let (expression, expression_attribute_values) =
                        key_condition
                            .condition
                            .render(&key_condition.name, &key_placeholder, index);
                    fragments.push(Fragment {
                        expression,
                        names: collections::HashMap::from([(placeholder, key_condition.name)]),
                        values: expression_attribute_values,
                    });
                }
                Fragment::merge(&operator, fragments)
            }
            Self::Node(operator, map) => {
                let has_siblings = map.len() > 1;
                let mut fragments = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let wrap = has_siblings && value.is_compound();
                    let (placeholder, new_keys) = expression::add_placeholder(keys, &key);
                    let mut fragment = value.render(&new_keys, index)?;
                    fragment.insert_name(placeholder, key)?;
                    if wrap {
                        fragment.expression = format!("({})", fragment.expression);
                    }
                    fragments.push(fragment);
                }
                Fragment::merge(&operator, fragments)
            }
        }
    }
}
