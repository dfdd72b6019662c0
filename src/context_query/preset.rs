use crate::{
    context_query::ContextQuery,
    error::{Insufficiency, Result},
    expression::{Expression, non_empty},
    marshal::{self, AttributeMap, Item},
};

use aws_sdk_dynamodb::types;
use std::collections;

impl ContextQuery {
    /// Count matching items instead of returning them, for query and scan.
    pub fn count(self) -> Self {
        self.select(types::Select::Count)
    }

    /// Get the item stored under `key`.
    pub fn simple_get(
        self,
        table: impl Into<String>,
        key: AttributeMap,
        consistent_read: bool,
    ) -> Self {
        self.table(table).key(key).consistent_read(consistent_read)
    }

    /// Take the projection and attribute names of `expression`.
    pub fn expr_get(self, expression: Expression) -> Self {
        self.projection_expression(expression.projection)
            .expression_attribute_names(non_empty(expression.names))
    }

    /// Take the key condition, filter, projection and placeholders of `expression`.
    pub fn expr_query(self, expression: Expression) -> Self {
        self.key_condition_expression(expression.key_condition)
            .filter_expression(expression.filter)
            .projection_expression(expression.projection)
            .expression_attribute_names(non_empty(expression.names))
            .expression_attribute_values(non_empty(expression.values))
    }

    /// Take the filter, projection and placeholders of `expression`.
    pub fn expr_scan(self, expression: Expression) -> Self {
        self.filter_expression(expression.filter)
            .projection_expression(expression.projection)
            .expression_attribute_names(non_empty(expression.names))
            .expression_attribute_values(non_empty(expression.values))
    }

    /// Put `item` into `table`.
    pub fn simple_put(self, table: impl Into<String>, item: AttributeMap) -> Self {
        self.table(table).item(item)
    }

    /// Take the condition and placeholders of `expression`.
    pub fn expr_put(self, expression: Expression) -> Self {
        self.condition_expression(expression.condition)
            .expression_attribute_names(non_empty(expression.names))
            .expression_attribute_values(non_empty(expression.values))
    }

    /// Update the item stored under `key`.
    pub fn simple_update(self, table: impl Into<String>, key: AttributeMap) -> Self {
        self.table(table).key(key)
    }

    /// Take the update, condition and placeholders of `expression`.
    pub fn expr_update(self, expression: Expression) -> Self {
        self.update_expression(expression.update)
            .condition_expression(expression.condition)
            .expression_attribute_names(non_empty(expression.names))
            .expression_attribute_values(non_empty(expression.values))
    }

    /// Delete the item stored under `key`.
    pub fn simple_delete(self, table: impl Into<String>, key: AttributeMap) -> Self {
        self.table(table).key(key)
    }

    /// Take the condition and placeholders of `expression`.
    pub fn expr_delete(self, expression: Expression) -> Self {
        self.expr_put(expression)
    }

    /// Replace the batch write with one put request per item.
    ///
    /// Does nothing when `items` is empty. A record that fails to marshal latches the query as
    /// insufficient with the failure as its cause.
    pub fn simple_batch_put<I: Item>(mut self, table: impl Into<String>, items: Vec<I>) -> Self {
        if items.is_empty() {
            return self;
        }
        let requests = items
            .into_iter()
            .map(|mut item| -> Result<types::WriteRequest> {
                let item = marshal::marshal_map(&mut item)?;
                let request = types::PutRequest::builder().set_item(Some(item)).build()?;
                Ok(types::WriteRequest::builder().put_request(request).build())
            })
            .collect::<Result<Vec<_>>>();
        match requests {
            Ok(requests) => {
                self.batch_write_items(collections::HashMap::from([(table.into(), requests)]))
            }
            Err(error) => {
                self.set_insufficient_cause(Insufficiency::Preset(Box::new(error)));
                self
            }
        }
    }

    /// Replace the batch write with one delete request per key.
    pub fn simple_batch_delete(
        mut self,
        table: impl Into<String>,
        keys: Vec<AttributeMap>,
    ) -> Self {
        let requests = keys
            .into_iter()
            .map(|key| -> Result<types::WriteRequest> {
                let request = types::DeleteRequest::builder().set_key(Some(key)).build()?;
                Ok(types::WriteRequest::builder().delete_request(request).build())
            })
            .collect::<Result<Vec<_>>>();
        match requests {
            Ok(requests) => {
                self.batch_write_items(collections::HashMap::from([(table.into(), requests)]))
            }
            Err(error) => {
                self.set_insufficient_cause(Insufficiency::Preset(Box::new(error)));
                self
            }
        }
    }

    /// Replace the batch get with `keys` of `table`.
    pub fn simple_batch_get(mut self, table: impl Into<String>, keys: Vec<AttributeMap>) -> Self {
        match types::KeysAndAttributes::builder().set_keys(Some(keys)).build() {
            Ok(keys_and_attributes) => {
                self.batch_get_items(collections::HashMap::from([(
                    table.into(),
                    keys_and_attributes,
                )]))
            }
            Err(error) => {
                self.set_insufficient_cause(Insufficiency::Preset(Box::new(error.into())));
                self
            }
        }
    }
}
