//! Opaque continuation tokens for paginated queries and scans.
//!
//! A token is the JSON object `{field: {"S" | "N" | "B": value}}` encoded as URL-safe base64
//! with padding. Binary values are themselves standard base64 inside the JSON.

use crate::error::{Error, Result};

use aws_sdk_dynamodb::{primitives::Blob, types::AttributeValue};
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use std::collections;

/// Last evaluated key of a page, usable as the exclusive start key of the next one.
///
/// ```rust
/// use dynamodb_access::pagination::PaginationKey;
///
/// let key = PaginationKey::from_iter([("pk", "a")]);
/// let token = key.encode().unwrap();
/// assert_eq!(PaginationKey::decode(&token).unwrap(), Some(key));
/// assert_eq!(PaginationKey::decode("").unwrap(), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaginationKey(collections::HashMap<String, AttributeValue>);

impl PaginationKey {
    /// Wrap a raw key map.
    pub fn new(key: collections::HashMap<String, AttributeValue>) -> Self {
        Self(key)
    }

    /// Whether the key holds no attribute.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw key map.
    pub fn as_map(&self) -> &collections::HashMap<String, AttributeValue> {
        &self.0
    }

    /// Take the raw key map.
    pub fn into_inner(self) -> collections::HashMap<String, AttributeValue> {
        self.0
    }

    /// Encode into a token. An empty key encodes to the empty string.
    pub fn encode(&self) -> Result<String> {
        if self.0.is_empty() {
            return Ok(String::new());
        }
        let mut wrapper = collections::BTreeMap::new();
        for (field, value) in &self.0 {
            let (kind, value) = match value {
                AttributeValue::S(value) => ("S", value.clone()),
                AttributeValue::N(value) => ("N", value.clone()),
                AttributeValue::B(value) => ("B", STANDARD.encode(value.as_ref())),
                _ => return Err(Error::UnsupportedAttributeKind),
            };
            wrapper.insert(field.as_str(), collections::BTreeMap::from([(kind, value)]));
        }
        let json = serde_json::to_vec(&wrapper)?;
        Ok(URL_SAFE.encode(json))
    }

    /// Decode a token. The empty string decodes to `None`.
    pub fn decode(token: &str) -> Result<Option<Self>> {
        if token.is_empty() {
            return Ok(None);
        }
        let json = URL_SAFE.decode(token)?;
        let wrapper: collections::HashMap<String, collections::HashMap<String, String>> =
            serde_json::from_slice(&json)?;
        let mut key = collections::HashMap::with_capacity(wrapper.len());
        for (field, typed) in wrapper {
            let present = |kind: &str| typed.get(kind).filter(|value| !value.is_empty());
            let value = if let Some(value) = present("S") {
                AttributeValue::S(value.clone())
            } else if let Some(value) = present("N") {
                AttributeValue::N(value.clone())
            } else if let Some(value) = present("B") {
                AttributeValue::B(Blob::new(STANDARD.decode(value)?))
            } else {
                return Err(Error::UnsupportedAttributeKind);
            };
            key.insert(field, value);
        }
        Ok(Some(Self(key)))
    }
}

impl From<collections::HashMap<String, AttributeValue>> for PaginationKey {
    fn from(key: collections::HashMap<String, AttributeValue>) -> Self {
        Self(key)
    }
}

impl<K: Into<String>, V: crate::value::IntoAttributeValue> FromIterator<(K, V)> for PaginationKey {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into_attribute_value()))
                .collect(),
        )
    }
}

impl Serialize for PaginationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let token = self.encode().map_err(ser::Error::custom)?;
        serializer.serialize_str(&token)
    }
}

impl<'de> Deserialize<'de> for PaginationKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        let key = Self::decode(&token).map_err(de::Error::custom)?;
        Ok(key.unwrap_or_default())
    }
}
