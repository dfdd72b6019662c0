use crate::{
    context_query::ContextQuery,
    error::{Error, Insufficiency},
};

use aws_sdk_dynamodb::types;

/// member checked by a compiler
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Member {
    Key,
    Item,
    Select,
    BatchWrite,
    BatchGet,
    TransactionWrite,
    TransactionGet,
}

impl ContextQuery {
    pub(crate) fn is_valid(&self) -> bool {
        !self.insufficient
    }

    /// Latch a missing table name, then report whether the query is still valid.
    pub(crate) fn is_valid_with_table(&mut self) -> bool {
        if self.table_name.is_empty() {
            self.set_insufficient_cause(Insufficiency::MissingTableName);
        }
        self.is_valid()
    }

    /// Check `member` unless the query is already insufficient.
    pub(crate) fn required(&mut self, member: Member) -> &mut Self {
        if self.insufficient {
            return self;
        }
        if let Err(cause) = self.check(member) {
            self.set_insufficient_cause(cause);
        }
        self
    }

    /// Latch the query as insufficient. Only the first cause is kept.
    pub(crate) fn set_insufficient_cause(&mut self, cause: Insufficiency) -> &mut Self {
        if !self.insufficient {
            #[cfg(feature = "tracing")]
            tracing::debug!(table = %self.table_name, %cause, "query is insufficient");
            self.insufficient = true;
            self.cause = Some(cause);
        }
        self
    }

    pub(crate) fn insufficient_error(&mut self) -> Error {
        Error::Insufficient {
            cause: self.cause.take(),
        }
    }

    fn check(&self, member: Member) -> Result<(), Insufficiency> {
        match member {
            Member::Key => match &self.key {
                Some(key) if !key.is_empty() => Ok(()),
                _ => Err(Insufficiency::Missing("key")),
            },
            Member::Item => match &self.item {
                Some(item) if !item.is_empty() => Ok(()),
                _ => Err(Insufficiency::Missing("item")),
            },
            Member::Select => match self.select {
                Some(types::Select::SpecificAttributes) if self.projection_expression.is_none() => {
                    Err(Insufficiency::ProjectionRequired)
                }
                _ => Ok(()),
            },
            Member::BatchWrite => {
                let items = self
                    .batch_write_items
                    .as_ref()
                    .ok_or(Insufficiency::Missing("batch write items"))?;
                let count: usize = items.values().map(Vec::len).sum();
                let limit = self.config.batch_write_limit;
                if count == 0 {
                    Err(Insufficiency::EmptyBatchWrite)
                } else if count > limit {
                    Err(Insufficiency::BatchWriteLimit { count, limit })
                } else {
                    Ok(())
                }
            }
            Member::BatchGet => {
                let items = self
                    .batch_get_items
                    .as_ref()
                    .ok_or(Insufficiency::Missing("batch get items"))?;
                let mut count = 0;
                for (table, keys_and_attributes) in items {
                    let keys = keys_and_attributes.keys();
                    if keys.is_empty() {
                        return Err(Insufficiency::BatchGetMissingKeys(table.clone()));
                    }
                    count += keys.len();
                }
                let limit = self.config.batch_get_limit;
                if count == 0 {
                    Err(Insufficiency::EmptyBatchGet)
                } else if count > limit {
                    Err(Insufficiency::BatchGetLimit { count, limit })
                } else {
                    Ok(())
                }
            }
            Member::TransactionWrite => {
                let count = match &self.transaction_write_items {
                    Some(items) if !items.is_empty() => items.len(),
                    _ => return Err(Insufficiency::Missing("transaction write items")),
                };
                let limit = self.config.transaction_write_limit;
                if count > limit {
                    Err(Insufficiency::TransactionWriteLimit { count, limit })
                } else {
                    Ok(())
                }
            }
            Member::TransactionGet => {
                let count = match &self.transaction_get_items {
                    Some(items) if !items.is_empty() => items.len(),
                    _ => return Err(Insufficiency::Missing("transaction get items")),
                };
                let limit = self.config.transaction_get_limit;
                if count > limit {
                    Err(Insufficiency::TransactionGetLimit { count, limit })
                } else {
                    Ok(())
                }
            }
        }
    }
}
