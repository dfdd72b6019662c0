//! Primary key maps.

use crate::value::IntoAttributeValue;

use aws_sdk_dynamodb::types;
use std::collections;

/// Key component.
#[derive(Clone, Debug, PartialEq)]
pub struct Key {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: types::AttributeValue,
}

/// Primary key (partition key and optional sort key).
///
/// ```rust
/// use dynamodb_access::key::Keys;
/// use std::collections::HashMap;
///
/// let key: HashMap<_, _> = Keys::partition("id", "1").with_sort("version", 2).into();
/// assert_eq!(key.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Keys {
    /// The partition key (required).
    pub partition_key: Key,
    /// The sort key (optional, only for tables with composite primary keys).
    pub sort_key: Option<Key>,
}

impl Keys {
    /// A primary key made of a partition key only.
    pub fn partition(name: impl Into<String>, value: impl IntoAttributeValue) -> Self {
        Self {
            partition_key: Key {
                name: name.into(),
                value: value.into_attribute_value(),
            },
            sort_key: None,
        }
    }

    /// Add a sort key.
    pub fn with_sort(mut self, name: impl Into<String>, value: impl IntoAttributeValue) -> Self {
        self.sort_key = Some(Key {
            name: name.into(),
            value: value.into_attribute_value(),
        });
        self
    }
}

impl From<Keys> for collections::HashMap<String, types::AttributeValue> {
    fn from(keys: Keys) -> Self {
        let mut map = Self::from([(keys.partition_key.name, keys.partition_key.value)]);
        if let Some(sort_key) = keys.sort_key {
            map.insert(sort_key.name, sort_key.value);
        }
        map
    }
}
