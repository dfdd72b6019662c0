use crate::expression::{self, ExpressionError, Fragment};

use indexmap::IndexMap;
use std::collections;

/// Map for selecting attributes in projection expressions.
///
/// ```rust
/// use dynamodb_access::expression::selection;
///
/// let selection = selection::SelectionMap::Leaves(vec![
///     "id".to_string(),
///     "name".to_string(),
/// ]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionMap {
    /// Leaf selection - a flat list of attribute names to select.
    Leaves(Vec<String>),
    /// Node selection - nested selection for hierarchical attribute paths.
    Node(IndexMap<String, SelectionMap>),
}

impl SelectionMap {
    pub(crate) fn render(self, keys: &[String]) -> Result<Fragment, ExpressionError> {
        let fragments: Vec<Fragment> = match self {
            Self::Leaves(leaves) => leaves
                .into_iter()
                .map(|leaf| {
                    let (placeholder, new_keys) = expression::add_placeholder(keys, &leaf);
                    Fragment {
                        expression: new_keys.join(expression::PATH_SEPARATOR),
                        names: collections::HashMap::from([(placeholder, leaf)]),
                        ..Default::default()
                    }
                })
                .collect(),
            Self::Node(map) => map
                .into_iter()
                .map(|(key, value)| {
                    let (placeholder, new_keys) = expression::add_placeholder(keys, &key);
                    let mut fragment = value.render(&new_keys)?;
                    fragment.insert_name(placeholder, key)?;
                    Ok(fragment)
                })
                .collect::<Result<Vec<_>, ExpressionError>>()?,
        };
        Fragment::merge(", ", fragments)
    }
}
