//! Expression compiler.
//!
//! Turns structured conditions, key conditions, projections and update actions into DynamoDB
//! expression strings with their placeholder maps. Every part of one [`ExpressionBuilder`]
//! shares a single placeholder counter, so the parts of an [`Expression`] can be sent together
//! without value placeholders colliding.

/// Condition expressions for filters, conditional writes and key conditions.
pub mod condition;

/// Attribute selection for projection expressions.
pub mod selection;

/// Update expressions.
pub mod update;

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections;

/// Separator for attribute path components.
const PATH_SEPARATOR: &str = ".";

/// Errors raised while compiling an expression.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ExpressionError {
    /// Two different attribute names were rendered to the same name placeholder.
    #[error("placeholder `{placeholder}` is bound to both `{first}` and `{second}`")]
    ConflictingPlaceholder {
        /// The name placeholder.
        placeholder: String,
        /// The attribute name bound first.
        first: String,
        /// The attribute name that collided with it.
        second: String,
    },
    /// The builder was given no part to compile.
    #[error("expression has no parts")]
    Empty,
}

fn sanitize(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub(crate) fn name_placeholder(identifier: &str) -> String {
    format!("#{}", sanitize(identifier))
}

pub(crate) fn value_placeholder(identifier: &str, tag: &str, index: usize) -> String {
    format!(":{}_{tag}{index}", sanitize(identifier))
}

pub(crate) fn add_placeholder(keys: &[String], identifier: &str) -> (String, Vec<String>) {
    let placeholder = name_placeholder(identifier);
    let mut new_keys = Vec::with_capacity(keys.len() + 1);
    new_keys.extend_from_slice(keys);
    new_keys.push(placeholder.clone());
    (placeholder, new_keys)
}

fn join(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{operator}{right}")
    }
}

fn insert_name(
    names: &mut collections::HashMap<String, String>,
    placeholder: String,
    name: String,
) -> Result<(), ExpressionError> {
    match names.get(&placeholder) {
        Some(first) if *first != name => Err(ExpressionError::ConflictingPlaceholder {
            placeholder,
            first: first.clone(),
            second: name,
        }),
        _ => {
            names.insert(placeholder, name);
            Ok(())
        }
    }
}

pub(crate) fn non_empty<K, V>(
    map: collections::HashMap<K, V>,
) -> Option<collections::HashMap<K, V>> {
    if map.is_empty() { None } else { Some(map) }
}

/// rendered expression part
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Fragment {
    pub(crate) expression: String,
    pub(crate) names: collections::HashMap<String, String>,
    pub(crate) values: collections::HashMap<String, AttributeValue>,
}

impl Fragment {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Result<Self, ExpressionError> {
        let mut fragment = Self::default();
        for item in items {
            for (placeholder, name) in item.names {
                insert_name(&mut fragment.names, placeholder, name)?;
            }
            fragment.values.extend(item.values);
            fragment.expression = join(fragment.expression, operator, item.expression);
        }
        Ok(fragment)
    }

    pub(crate) fn insert_name(
        &mut self,
        placeholder: String,
        name: String,
    ) -> Result<(), ExpressionError> {
        insert_name(&mut self.names, placeholder, name)
    }
}

/// Collects the parts of one request and compiles them with a shared placeholder counter.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::expression::{ExpressionBuilder, condition, selection};
///
/// let expression = ExpressionBuilder::new()
///     .with_filter(condition::ConditionMap::Leaves(
///         condition::LogicalOperator::And,
///         vec![condition::KeyCondition {
///             name: "status".to_string(),
///             condition: condition::Condition::Equals(AttributeValue::S("active".to_string())),
///         }],
///     ))
///     .with_projection(selection::SelectionMap::Leaves(vec!["id".to_string()]))
///     .build()
///     .unwrap();
/// assert_eq!(expression.filter(), Some("#status = :status_eq0"));
/// assert_eq!(expression.projection(), Some("#id"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionBuilder {
    key_condition: Option<Vec<condition::KeyCondition>>,
    filter: Option<condition::ConditionMap>,
    condition: Option<condition::ConditionMap>,
    projection: Option<selection::SelectionMap>,
    update: Option<update::UpdateExpressionMap>,
}

impl ExpressionBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key condition: every predicate is joined with `AND`.
    pub fn with_key_condition(mut self, key_condition: Vec<condition::KeyCondition>) -> Self {
        self.key_condition = Some(key_condition);
        self
    }

    /// Set the filter condition.
    pub fn with_filter(mut self, filter: condition::ConditionMap) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the write condition.
    pub fn with_condition(mut self, condition: condition::ConditionMap) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set the projection.
    pub fn with_projection(mut self, projection: selection::SelectionMap) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Set the update actions.
    pub fn with_update(mut self, update: update::UpdateExpressionMap) -> Self {
        self.update = Some(update);
        self
    }

    /// Compile every part that was set.
    pub fn build(self) -> Result<Expression, ExpressionError> {
        let Self {
            key_condition,
            filter,
            condition,
            projection,
            update,
        } = self;
        if key_condition.is_none()
            && filter.is_none()
            && condition.is_none()
            && projection.is_none()
            && update.is_none()
        {
            return Err(ExpressionError::Empty);
        }
        let mut index = 0;
        let mut expression = Expression::default();
        if let Some(key_condition) = key_condition {
            let fragment = condition::KeyCondition::render_all(key_condition, &mut index)?;
            expression.key_condition = Some(expression.absorb(fragment)?);
        }
        if let Some(filter) = filter {
            let fragment = filter.render(&[], &mut index)?;
            expression.filter = Some(expression.absorb(fragment)?);
        }
        if let Some(condition) = condition {
            let fragment = condition.render(&[], &mut index)?;
            expression.condition = Some(expression.absorb(fragment)?);
        }
        if let Some(projection) = projection {
            let fragment = projection.render(&[])?;
            expression.projection = Some(expression.absorb(fragment)?);
        }
        if let Some(update) = update {
            let fragment = update.render(&[], &mut index)?;
            expression.update = Some(expression.absorb(fragment)?);
        }
        Ok(expression)
    }
}

/// Compiled expression parts with their merged placeholder maps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Expression {
    pub(crate) key_condition: Option<String>,
    pub(crate) filter: Option<String>,
    pub(crate) condition: Option<String>,
    pub(crate) projection: Option<String>,
    pub(crate) update: Option<String>,
    pub(crate) names: collections::HashMap<String, String>,
    pub(crate) values: collections::HashMap<String, AttributeValue>,
}

impl Expression {
    fn absorb(&mut self, fragment: Fragment) -> Result<String, ExpressionError> {
        for (placeholder, name) in fragment.names {
            insert_name(&mut self.names, placeholder, name)?;
        }
        self.values.extend(fragment.values);
        Ok(fragment.expression)
    }

    /// Key condition expression.
    pub fn key_condition(&self) -> Option<&str> {
        self.key_condition.as_deref()
    }

    /// Filter expression.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Condition expression.
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    /// Projection expression.
    pub fn projection(&self) -> Option<&str> {
        self.projection.as_deref()
    }

    /// Update expression.
    pub fn update(&self) -> Option<&str> {
        self.update.as_deref()
    }

    /// Expression attribute names, `None` when no part used one.
    pub fn names(&self) -> Option<&collections::HashMap<String, String>> {
        (!self.names.is_empty()).then_some(&self.names)
    }

    /// Expression attribute values, `None` when no part used one.
    pub fn values(&self) -> Option<&collections::HashMap<String, AttributeValue>> {
        (!self.values.is_empty()).then_some(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indexmap::IndexMap;
    use rstest::rstest;

    fn equals(name: &str, value: &str) -> condition::KeyCondition {
        condition::KeyCondition {
            name: name.to_string(),
            condition: condition::Condition::Equals(AttributeValue::S(value.to_string())),
        }
    }

    #[rstest]
    #[case::plain("a", "#a")]
    #[case::dashed("user-id", "#user_id")]
    #[case::dotted("a.b", "#a_b")]
    fn test_name_placeholder(#[case] identifier: &str, #[case] expected: &str) {
        assert_eq!(name_placeholder(identifier), expected);
    }

    #[test]
    fn test_build_shares_counter_across_parts() {
        let expression = ExpressionBuilder::new()
            .with_key_condition(vec![equals("pk", "a")])
            .with_filter(condition::ConditionMap::Leaves(
                condition::LogicalOperator::And,
                vec![equals("status", "active")],
            ))
            .with_projection(selection::SelectionMap::Leaves(vec![
                "pk".to_string(),
                "status".to_string(),
            ]))
            .build()
            .unwrap();
        assert_eq!(expression.key_condition(), Some("#pk = :pk_eq0"));
        assert_eq!(expression.filter(), Some("#status = :status_eq1"));
        assert_eq!(expression.projection(), Some("#pk, #status"));
        assert_eq!(expression.condition(), None);
        assert_eq!(expression.update(), None);
        assert_eq!(
            expression.names(),
            Some(&collections::HashMap::from([
                ("#pk".to_string(), "pk".to_string()),
                ("#status".to_string(), "status".to_string()),
            ]))
        );
        assert_eq!(
            expression.values(),
            Some(&collections::HashMap::from([
                (":pk_eq0".to_string(), AttributeValue::S("a".to_string())),
                (":status_eq1".to_string(), AttributeValue::S("active".to_string())),
            ]))
        );
    }

    #[test]
    fn test_build_condition_and_update() {
        let expression = ExpressionBuilder::new()
            .with_condition(condition::ConditionMap::Leaves(
                condition::LogicalOperator::And,
                vec![condition::KeyCondition {
                    name: "pk".to_string(),
                    condition: condition::Condition::NotNull,
                }],
            ))
            .with_update(update::UpdateExpressionMap::Set(update::SetInputsMap::Leaves(
                vec![(
                    "name".to_string(),
                    update::SetInput::Assign(AttributeValue::S("n".to_string())),
                )],
            )))
            .build()
            .unwrap();
        assert_eq!(expression.condition(), Some("attribute_exists(#pk)"));
        assert_eq!(expression.update(), Some("SET #name = :set0"));
    }

    #[test]
    fn test_projection_only_has_no_values() {
        let expression = ExpressionBuilder::new()
            .with_projection(selection::SelectionMap::Leaves(vec!["a".to_string()]))
            .build()
            .unwrap();
        assert!(expression.values().is_none());
        assert!(expression.names().is_some());
    }

    #[test]
    fn test_build_empty() {
        assert_eq!(ExpressionBuilder::new().build(), Err(ExpressionError::Empty));
    }

    #[test]
    fn test_build_conflicting_placeholder() {
        let actual = ExpressionBuilder::new()
            .with_filter(condition::ConditionMap::Node(
                condition::LogicalOperator::And,
                IndexMap::from([(
                    "a-b".to_string(),
                    condition::ConditionMap::Leaves(
                        condition::LogicalOperator::And,
                        vec![equals("a_b", "x")],
                    ),
                )]),
            ))
            .build();
        assert_eq!(
            actual,
            Err(ExpressionError::ConflictingPlaceholder {
                placeholder: "#a_b".to_string(),
                first: "a_b".to_string(),
                second: "a-b".to_string(),
            })
        );
    }
}
