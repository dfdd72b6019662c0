//! Error types shared by every module of the crate.

use crate::expression;

use aws_sdk_dynamodb::error::BuildError;
use std::{error, result};

/// Result type used throughout the crate.
pub type Result<T, E = Error> = result::Result<T, E>;

/// The first requirement a [`ContextQuery`](crate::context_query::ContextQuery) failed.
///
/// Once a query latches an insufficiency it keeps it: later checks never replace it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Insufficiency {
    /// The operation targets a single table but no table name was set.
    #[error("table name is not set")]
    MissingTableName,
    /// A required member is unset or empty.
    #[error("{0} is not set")]
    Missing(&'static str),
    /// `Select::SpecificAttributes` was requested without a projection expression.
    #[error("select is SPECIFIC_ATTRIBUTES but no projection expression is set")]
    ProjectionRequired,
    /// The batch write map holds no write requests across all of its tables.
    #[error("batch write holds no write requests")]
    EmptyBatchWrite,
    /// The batch write map holds more write requests than a single call accepts.
    #[error("batch write holds {count} write requests, limit is {limit}")]
    BatchWriteLimit {
        /// Total write requests across all tables.
        count: usize,
        /// Configured ceiling.
        limit: usize,
    },
    /// A batch get table entry has an empty key list.
    #[error("batch get entry for table `{0}` has no keys")]
    BatchGetMissingKeys(String),
    /// The batch get map holds no keys across all of its tables.
    #[error("batch get holds no keys")]
    EmptyBatchGet,
    /// The batch get map holds more keys than a single call accepts.
    #[error("batch get holds {count} keys, limit is {limit}")]
    BatchGetLimit {
        /// Total keys across all tables.
        count: usize,
        /// Configured ceiling.
        limit: usize,
    },
    /// The transaction write list is longer than a single transaction accepts.
    #[error("transaction write holds {count} items, limit is {limit}")]
    TransactionWriteLimit {
        /// Number of items.
        count: usize,
        /// Configured ceiling.
        limit: usize,
    },
    /// The transaction get list is longer than a single transaction accepts.
    #[error("transaction get holds {count} items, limit is {limit}")]
    TransactionGetLimit {
        /// Number of items.
        count: usize,
        /// Configured ceiling.
        limit: usize,
    },
    /// A preset could not assemble its part of the request.
    #[error("preset failed: {0}")]
    Preset(#[source] Box<Error>),
}

fn joined(cause: &Option<Insufficiency>) -> String {
    match cause {
        Some(cause) => format!("\n{cause}"),
        None => String::new(),
    }
}

/// Errors returned by the crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The accumulated query is not sufficient for the operation it was compiled into.
    ///
    /// Match on this variant (or [`Error::is_insufficient`]) for the generic marker and read
    /// [`Error::insufficiency`] for the first failed requirement.
    #[error("insufficient required members{}", joined(.cause))]
    Insufficient {
        /// The first failed requirement, when one was recorded.
        #[source]
        cause: Option<Insufficiency>,
    },
    /// A key condition was built without a partition key field and value.
    #[error("partition key field and value are required")]
    RequiredPartitionKey,
    /// A key predicate was built without a field or a value.
    #[error("key field and value are required")]
    RequiredKeyAndValue,
    /// `BeginsWith` was given a value that is not a string.
    #[error("begins_with requires a string prefix")]
    BeginsWithPrefixType,
    /// `Between` was given no upper bound.
    #[error("between requires an upper bound")]
    BetweenUpperValue,
    /// An update expression was requested for an item with nothing to set.
    #[error("nothing to update")]
    EmptyForUpdate,
    /// A local secondary index was defined without a sort key.
    #[error("local secondary index requires a sort key")]
    RequiredSortKey,
    /// An attribute definition carries no attribute name.
    #[error("attribute definition has no attribute name")]
    InvalidAttributeDefinition,
    /// An index name does not follow the `{kind}-{partition}[-{sort}]` format.
    #[error("unexpected index name format: `{0}`")]
    UnexpectedIndexFormat(String),
    /// A pagination key holds an attribute that is not a string, number or binary.
    #[error("unsupported attribute value kind for a key")]
    UnsupportedAttributeKind,
    /// An attribute was expected to be a list.
    #[error("expected a list attribute")]
    ExpectedList,
    /// An attribute was expected to be a map.
    #[error("expected a map attribute")]
    ExpectedMap,
    /// A get returned no item.
    #[error("item not found")]
    NotFoundItem,
    /// Returned attributes were requested but no return-value policy was set.
    #[error("return values are not set")]
    ReturnValuesNotSet,
    /// Put and delete accept only `NONE` or `ALL_OLD` as return values.
    #[error("return values must be NONE or ALL_OLD for this operation")]
    ReturnValuesSetToInvalidValue,
    /// A pre-marshal, post-unmarshal or sort key hook failed.
    #[error("item hook failed: {0}")]
    Hook(Box<dyn error::Error + Send + Sync>),
    /// The expression compiler rejected its input.
    #[error(transparent)]
    Expression(#[from] expression::ExpressionError),
    /// Structural (de)serialization failed.
    #[error(transparent)]
    Serde(#[from] serde_dynamo::Error),
    /// The SDK rejected a request shape.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The transport call failed.
    #[error(transparent)]
    Sdk(#[from] aws_sdk_dynamodb::Error),
    /// A pagination token is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// A pagination token is not valid base64.
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    /// Wrap an error raised by an item hook.
    pub fn hook<E>(error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Hook(error.into())
    }

    /// Whether this is the generic insufficient-members marker.
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::Insufficient { .. })
    }

    /// The latched cause of an insufficiency, if any.
    pub fn insufficiency(&self) -> Option<&Insufficiency> {
        match self {
            Self::Insufficient { cause } => cause.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::without_cause(
        Error::Insufficient { cause: None },
        "insufficient required members"
    )]
    #[case::with_cause(
        Error::Insufficient { cause: Some(Insufficiency::MissingTableName) },
        "insufficient required members\ntable name is not set"
    )]
    #[case::limit(
        Error::Insufficient {
            cause: Some(
                Insufficiency::BatchWriteLimit {
                    count: 26,
                    limit: 25,
                }
            )
        },
        "insufficient required members\nbatch write holds 26 write requests, limit is 25"
    )]
    fn test_insufficient_display(#[case] error: Error, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
        assert!(error.is_insufficient());
    }

    #[test]
    fn test_insufficient_source_is_cause() {
        let error = Error::Insufficient {
            cause: Some(Insufficiency::Missing("key")),
        };
        let source = error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "key is not set");
        assert!(matches!(
            error.insufficiency(),
            Some(Insufficiency::Missing("key"))
        ));
    }

    #[test]
    fn test_domain_error_is_not_insufficient() {
        assert!(!Error::EmptyForUpdate.is_insufficient());
        assert!(Error::EmptyForUpdate.insufficiency().is_none());
    }
}
