use crate::expression::{self, ExpressionError, Fragment, selection};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use std::collections;

/// Map for ADD and DELETE operations.
#[derive(Clone, Debug, PartialEq)]
pub enum AddOrDeleteInputsMap {
    /// Leaf operations - flat list of (attribute_name, value) pairs.
    Leaves(Vec<(String, types::AttributeValue)>),
    /// Node operations - nested operations for hierarchical attribute paths.
    Node(IndexMap<String, AddOrDeleteInputsMap>),
}

impl AddOrDeleteInputsMap {
    fn render(self, keys: &[String], index: &mut usize) -> Result<Fragment, ExpressionError> {
        let mut fragments = Vec::new();
        match self {
            Self::Leaves(leaves) => {
                for (key, value) in leaves {
                    let (placeholder, new_keys) = expression::add_placeholder(keys, &key);
                    let path = new_keys.join(expression::PATH_SEPARATOR);
                    let value_placeholder = format!(":add_or_delete{index}");
                    *index += 1;
                    fragments.push(Fragment {
                        expression: format!("{path} {value_placeholder}"),
                        names: collections::HashMap::from([(placeholder, key)]),
                        values: collections::HashMap::from([(value_placeholder, value)]),
                    });
                }
            }
            Self::Node(map) => {
                for (key, value) in map {
                    let (placeholder, new_keys) = expression::add_placeholder(keys, &key);
                    let mut fragment = value.render(&new_keys, index)?;
                    fragment.insert_name(placeholder, key)?;
                    fragments.push(fragment);
                }
            }
        }
        Fragment::merge(", ", fragments)
    }
}

/// SET operation for updating attributes.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::expression::update;
///
/// let assign = update::SetInput::Assign(AttributeValue::S("value".to_string()));
/// let increment = update::SetInput::Increment(AttributeValue::N("10".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SetInput {
    /// Assign a new value to the attribute (replaces existing value).
    Assign(types::AttributeValue),
    /// Increment a numeric attribute by the specified value.
    Increment(types::AttributeValue),
    /// Decrement a numeric attribute by the specified value.
    Decrement(types::AttributeValue),
    /// Append values to the end of a list attribute.
    ListAppend(types::AttributeValue),
    /// Prepend values to the beginning of a list attribute.
    ListPrepend(types::AttributeValue),
    /// Assign a value only if the attribute doesn't exist.
    IfNotExists(types::AttributeValue),
}

impl SetInput {
    fn render(self, path: &str, value_placeholder: &str) -> (types::AttributeValue, String) {
        match self {
            Self::Assign(value) => (value, format!("{path} = {value_placeholder}")),
            Self::Increment(value) => (value, format!("{path} = {path} + {value_placeholder}")),
            Self::Decrement(value) => (value, format!("{path} = {path} - {value_placeholder}")),
            Self::ListAppend(value) => (
                value,
                format!("{path} = list_append({path}, {value_placeholder})"),
            ),
            Self::ListPrepend(value) => (
                value,
                format!("{path} = list_append({value_placeholder}, {path})"),
            ),
            Self::IfNotExists(value) => (
                value,
                format!("{path} = if_not_exists({path}, {value_placeholder})"),
            ),
        }
    }
}

/// Map for SET operations.
#[derive(Clone, Debug, PartialEq)]
pub enum SetInputsMap {
    /// Leaf operations - flat list of (attribute_name, set_operation) pairs.
    Leaves(Vec<(String, SetInput)>),
    /// Node operations - nested operations for hierarchical attribute paths.
    Node(IndexMap<String, SetInputsMap>),
}

impl SetInputsMap {
    fn render(self, keys: &[String], index: &mut usize) -> Result<Fragment, ExpressionError> {
        let mut fragments = Vec::new();
        match self {
            Self::Leaves(leaves) => {
                for (key, set_operation) in leaves {
                    let (placeholder, new_keys) = expression::add_placeholder(keys, &key);
                    let path = new_keys.join(expression::PATH_SEPARATOR);
                    let value_placeholder = format!(":set{index}");
                    *index += 1;
                    let (value, expression) = set_operation.render(&path, &value_placeholder);
                    fragments.push(Fragment {
                        expression,
                        names: collections::HashMap::from([(placeholder, key)]),
                        values: collections::HashMap::from([(value_placeholder, value)]),
                    });
                }
            }
            Self::Node(map) => {
                for (key, value) in map {
                    let (placeholder, new_keys) = expression::add_placeholder(keys, &key);
                    let mut fragment = value.render(&new_keys, index)?;
                    fragment.insert_name(placeholder, key)?;
                    fragments.push(fragment);
                }
            }
        }
        Fragment::merge(", ", fragments)
    }
}

/// Update expression map.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::expression::update;
///
/// let expr = update::UpdateExpressionMap::Set(
///     update::SetInputsMap::Leaves(vec![
///         ("name".to_string(), update::SetInput::Assign(AttributeValue::S("New".to_string()))),
///     ]),
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateExpressionMap {
    /// ADD operations - add values to numbers or sets.
    Add(AddOrDeleteInputsMap),
    /// DELETE operations - delete values from sets.
    Delete(AddOrDeleteInputsMap),
    /// REMOVE operations - remove attributes from items.
    Remove(selection::SelectionMap),
    /// SET operations - set or modify attribute values.
    Set(SetInputsMap),
    /// Combined operations - multiple operation types in a single update expression.
    Combined(Vec<UpdateExpressionMap>),
}

impl UpdateExpressionMap {
    pub(crate) fn render(
        self,
        keys: &[String],
        index: &mut usize,
    ) -> Result<Fragment, ExpressionError> {
        let (action, mut fragment) = match self {
            Self::Add(add_operations) => ("ADD", add_operations.render(keys, index)?),
            Self::Delete(delete_operations) => ("DELETE", delete_operations.render(keys, index)?),
            Self::Remove(remove_operations) => ("REMOVE", remove_operations.render(keys)?),
            Self::Set(set_operations) => ("SET", set_operations.render(keys, index)?),
            Self::Combined(combined_operations) => {
                let mut fragments = Vec::with_capacity(combined_operations.len());
                for operation in combined_operations {
                    fragments.push(operation.render(keys, index)?);
                }
                return Fragment::merge(" ", fragments);
            }
        };
        fragment.expression = format!("{action} {}", fragment.expression);
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn s(value: &str) -> types::AttributeValue {
        types::AttributeValue::S(value.to_string())
    }

    fn n(value: &str) -> types::AttributeValue {
        types::AttributeValue::N(value.to_string())
    }

    #[rstest]
    #[case::set_leaves(
        UpdateExpressionMap::Set(
            SetInputsMap::Leaves(
                vec![
                    ("a".to_string(), SetInput::Assign(s("b"))),
                    ("c".to_string(), SetInput::Increment(n("1"))),
                    ("d".to_string(), SetInput::Decrement(n("2"))),
                ]
            )
        ),
        Fragment {
            expression: "SET #a = :set0, #c = #c + :set1, #d = #d - :set2".to_string(),
            names: collections::HashMap::from(
                [
                    ("#a".to_string(), "a".to_string()),
                    ("#c".to_string(), "c".to_string()),
                    ("#d".to_string(), "d".to_string()),
                ]
            ),
            values: collections::HashMap::from(
                [
                    (":set0".to_string(), s("b")),
                    (":set1".to_string(), n("1")),
                    (":set2".to_string(), n("2")),
                ]
            ),
        }
    )]
    #[case::set_lists_nested(
        UpdateExpressionMap::Set(
            SetInputsMap::Node(
                IndexMap::from(
                    [(
                        "a".to_string(),
                        SetInputsMap::Leaves(
                            vec![
                                (
                                    "b".to_string(),
                                    SetInput::ListAppend(types::AttributeValue::L(vec![s("x")])),
                                ),
                                (
                                    "c".to_string(),
                                    SetInput::ListPrepend(types::AttributeValue::L(vec![s("y")])),
                                ),
                                ("d".to_string(), SetInput::IfNotExists(n("0"))),
                            ]
                        )
                    )]
                )
            )
        ),
        Fragment {
            expression: "SET #a.#b = list_append(#a.#b, :set0), #a.#c = list_append(:set1, #a.#c), #a.#d = if_not_exists(#a.#d, :set2)".to_string(),
            names: collections::HashMap::from(
                [
                    ("#a".to_string(), "a".to_string()),
                    ("#b".to_string(), "b".to_string()),
                    ("#c".to_string(), "c".to_string()),
                    ("#d".to_string(), "d".to_string()),
                ]
            ),
            values: collections::HashMap::from(
                [
                    (":set0".to_string(), types::AttributeValue::L(vec![s("x")])),
                    (":set1".to_string(), types::AttributeValue::L(vec![s("y")])),
                    (":set2".to_string(), n("0")),
                ]
            ),
        }
    )]
    #[case::combined(
        UpdateExpressionMap::Combined(
            vec![
                UpdateExpressionMap::Set(
                    SetInputsMap::Leaves(
                        vec![("a".to_string(), SetInput::Assign(s("b")))]
                    )
                ),
                UpdateExpressionMap::Add(
                    AddOrDeleteInputsMap::Leaves(
                        vec![("c".to_string(), n("1"))]
                    )
                ),
                UpdateExpressionMap::Delete(
                    AddOrDeleteInputsMap::Leaves(
                        vec![("d".to_string(), types::AttributeValue::Ss(vec!["x".to_string()]))]
                    )
                ),
                UpdateExpressionMap::Remove(
                    selection::SelectionMap::Leaves(
                        vec!["e".to_string()]
                    )
                ),
            ]
        ),
        Fragment {
            expression: "SET #a = :set0 ADD #c :add_or_delete1 DELETE #d :add_or_delete2 REMOVE #e".to_string(),
            names: collections::HashMap::from(
                [
                    ("#a".to_string(), "a".to_string()),
                    ("#c".to_string(), "c".to_string()),
                    ("#d".to_string(), "d".to_string()),
                    ("#e".to_string(), "e".to_string()),
                ]
            ),
            values: collections::HashMap::from(
                [
                    (":set0".to_string(), s("b")),
                    (":add_or_delete1".to_string(), n("1")),
                    (
                        ":add_or_delete2".to_string(),
                        types::AttributeValue::Ss(vec!["x".to_string()]),
                    ),
                ]
            ),
        }
    )]
    fn test_update_expression_map_render(
        #[case] update_expression_map: UpdateExpressionMap,
        #[case] expected: Fragment,
    ) {
        let actual = update_expression_map.render(&[], &mut 0).unwrap();
        assert_eq!(actual, expected);
    }
}
