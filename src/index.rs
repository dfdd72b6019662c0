//! Secondary index descriptors.
//!
//! An index is named `{kind}-{partition key}[-{sort key}]`, with kind `gsi` or `lsi`, so the
//! descriptor can be rebuilt from the name alone.

use crate::error::{Error, Result};

use aws_sdk_dynamodb::types;
use std::fmt;

const INDEX_NAME_SEPARATOR: &str = "-";

/// Kind of secondary index.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IndexKind {
    /// Global secondary index.
    Global,
    /// Local secondary index; always has a sort key.
    Local,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("gsi"),
            Self::Local => f.write_str("lsi"),
        }
    }
}

/// Name and key attributes of a secondary index.
///
/// ```rust
/// use aws_sdk_dynamodb::types::{AttributeDefinition, ScalarAttributeType};
/// use dynamodb_access::index::Index;
///
/// let status = AttributeDefinition::builder()
///     .attribute_name("status")
///     .attribute_type(ScalarAttributeType::S)
///     .build()
///     .unwrap();
/// let index = Index::global(status, None).unwrap();
/// assert_eq!(index.name(), "gsi-status");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Index {
    kind: IndexKind,
    name: String,
    partition_key: types::AttributeDefinition,
    sort_key: Option<types::AttributeDefinition>,
}

impl Index {
    /// Describe an index over the given key attributes.
    pub fn new(
        kind: IndexKind,
        partition_key: types::AttributeDefinition,
        sort_key: Option<types::AttributeDefinition>,
    ) -> Result<Self> {
        if partition_key.attribute_name().is_empty()
            || sort_key
                .as_ref()
                .is_some_and(|sort_key| sort_key.attribute_name().is_empty())
        {
            return Err(Error::InvalidAttributeDefinition);
        }
        if kind == IndexKind::Local && sort_key.is_none() {
            return Err(Error::RequiredSortKey);
        }
        let mut name = format!(
            "{kind}{INDEX_NAME_SEPARATOR}{}",
            partition_key.attribute_name()
        );
        if let Some(sort_key) = &sort_key {
            name.push_str(INDEX_NAME_SEPARATOR);
            name.push_str(sort_key.attribute_name());
        }
        Ok(Self {
            kind,
            name,
            partition_key,
            sort_key,
        })
    }

    /// Describe a global secondary index.
    pub fn global(
        partition_key: types::AttributeDefinition,
        sort_key: Option<types::AttributeDefinition>,
    ) -> Result<Self> {
        Self::new(IndexKind::Global, partition_key, sort_key)
    }

    /// Describe a local secondary index.
    pub fn local(
        partition_key: types::AttributeDefinition,
        sort_key: types::AttributeDefinition,
    ) -> Result<Self> {
        Self::new(IndexKind::Local, partition_key, Some(sort_key))
    }

    /// Rebuild a descriptor from its name. The sort key type defaults to string.
    pub fn from_name(
        name: &str,
        partition_key_type: types::ScalarAttributeType,
        sort_key_type: Option<types::ScalarAttributeType>,
    ) -> Result<Self> {
        let unexpected = || Error::UnexpectedIndexFormat(name.to_string());
        let parts: Vec<_> = name.split(INDEX_NAME_SEPARATOR).collect();
        let kind = match parts.first().copied() {
            Some("gsi") => IndexKind::Global,
            Some("lsi") => IndexKind::Local,
            _ => return Err(unexpected()),
        };
        let (partition_key_field, sort_key_field) = match parts[1..] {
            [partition_key_field] => (partition_key_field, None),
            [partition_key_field, sort_key_field] => (partition_key_field, Some(sort_key_field)),
            _ => return Err(unexpected()),
        };
        let partition_key = types::AttributeDefinition::builder()
            .attribute_name(partition_key_field)
            .attribute_type(partition_key_type)
            .build()?;
        let sort_key = match sort_key_field {
            Some(sort_key_field) => Some(
                types::AttributeDefinition::builder()
                    .attribute_name(sort_key_field)
                    .attribute_type(sort_key_type.unwrap_or(types::ScalarAttributeType::S))
                    .build()?,
            ),
            None => None,
        };
        let index = Self::new(kind, partition_key, sort_key)?;
        if index.name != name {
            return Err(unexpected());
        }
        Ok(index)
    }

    /// Index name, usable as the query index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index kind.
    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    /// Partition key attribute name.
    pub fn partition_key_field(&self) -> &str {
        self.partition_key.attribute_name()
    }

    /// Sort key attribute name, if any.
    pub fn sort_key_field(&self) -> Option<&str> {
        self.sort_key
            .as_ref()
            .map(types::AttributeDefinition::attribute_name)
    }

    /// Key schema: `HASH` on the partition key, then `RANGE` on the sort key if present.
    pub fn key_schema(&self) -> Result<Vec<types::KeySchemaElement>> {
        let mut key_schema = vec![
            types::KeySchemaElement::builder()
                .attribute_name(self.partition_key_field())
                .key_type(types::KeyType::Hash)
                .build()?,
        ];
        if let Some(sort_key_field) = self.sort_key_field() {
            key_schema.push(
                types::KeySchemaElement::builder()
                    .attribute_name(sort_key_field)
                    .key_type(types::KeyType::Range)
                    .build()?,
            );
        }
        Ok(key_schema)
    }

    /// Attribute definitions of the key attributes, partition key first.
    pub fn attribute_definitions(&self) -> Vec<types::AttributeDefinition> {
        let mut definitions = vec![self.partition_key.clone()];
        definitions.extend(self.sort_key.clone());
        definitions
    }
}
