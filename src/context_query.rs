//! Request accumulator shared by every operation.
//!
//! A [`ContextQuery`] collects every parameter any of the ten operations might need. Setters
//! never fail: whether the accumulated state is sufficient is decided when the query is
//! compiled into an SDK input with `TryFrom`, e.g. `GetItemInput::try_from(query)`.
//!
//! ```rust
//! use aws_sdk_dynamodb::operation::get_item::GetItemInput;
//! use dynamodb_access::{context_query::ContextQuery, key::Keys};
//!
//! let query = ContextQuery::new().simple_get("T", Keys::partition("id", "42").into(), false);
//! let input = GetItemInput::try_from(query).unwrap();
//! assert_eq!(input.table_name(), Some("T"));
//! assert_eq!(input.consistent_read(), Some(false));
//!
//! let error = GetItemInput::try_from(ContextQuery::new().table("T")).unwrap_err();
//! assert!(error.is_insufficient());
//! ```

/// Compilation into SDK inputs.
mod compile;

/// Convenience presets.
mod preset;

/// Sufficiency validation.
mod validate;

use crate::{
    config::Config,
    error::Insufficiency,
    index::Index,
    key_condition::KeyConditionBuilder,
    marshal::AttributeMap,
    pagination::PaginationKey,
};

use aws_sdk_dynamodb::types;
use std::collections;

/// Accumulated parameters of one request.
///
/// Once a compile finds the query insufficient, the first cause is latched and kept.
#[derive(Debug, Default)]
pub struct ContextQuery {
    insufficient: bool,
    cause: Option<Insufficiency>,
    config: Config,

    table_name: String,
    item: Option<AttributeMap>,
    key: Option<AttributeMap>,
    consistent_read: bool,
    start_key: Option<PaginationKey>,
    index_name: Option<String>,
    limit: Option<i32>,
    order_ascending: bool,
    select: Option<types::Select>,

    condition_expression: Option<String>,
    key_condition_expression: Option<String>,
    filter_expression: Option<String>,
    projection_expression: Option<String>,
    update_expression: Option<String>,
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    expression_attribute_values: Option<AttributeMap>,

    batch_write_items: Option<collections::HashMap<String, Vec<types::WriteRequest>>>,
    batch_get_items: Option<collections::HashMap<String, types::KeysAndAttributes>>,

    transaction_write_items: Option<Vec<types::TransactWriteItem>>,
    client_request_token: Option<String>,
    transaction_get_items: Option<Vec<types::TransactGetItem>>,

    return_values: Option<types::ReturnValue>,
    return_values_on_condition_check_failure: Option<types::ReturnValuesOnConditionCheckFailure>,

    key_condition_builder: Option<KeyConditionBuilder>,
}

impl ContextQuery {
    /// Create an empty query with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty query validated against `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the table name.
    pub fn table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Set the item to put.
    pub fn item(mut self, item: AttributeMap) -> Self {
        self.item = Some(item);
        self
    }

    /// Set the primary key for get, update and delete.
    pub fn key(mut self, key: AttributeMap) -> Self {
        self.key = Some(key);
        self
    }

    /// Request strongly consistent reads.
    pub fn consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    /// Resume a query or scan after `start_key`.
    pub fn start_key(mut self, start_key: Option<PaginationKey>) -> Self {
        self.start_key = start_key.filter(|start_key| !start_key.is_empty());
        self
    }

    /// Query or scan a secondary index. Empty names are ignored.
    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        let index_name = index_name.into();
        if !index_name.is_empty() {
            self.index_name = Some(index_name);
        }
        self
    }

    /// Query or scan the secondary index described by `index`.
    pub fn index_of(self, index: &Index) -> Self {
        self.index(index.name())
    }

    /// Cap the number of evaluated items. Non-positive limits are ignored.
    pub fn limit(mut self, limit: i32) -> Self {
        if limit > 0 {
            self.limit = Some(limit);
        }
        self
    }

    /// Return query results in ascending sort key order. Descending is the default.
    pub fn order_ascending(mut self, order_ascending: bool) -> Self {
        self.order_ascending = order_ascending;
        self
    }

    /// Set the select mode.
    pub fn select(mut self, select: types::Select) -> Self {
        self.select = Some(select);
        self
    }

    /// Set the condition expression.
    pub fn condition_expression(mut self, expression: Option<String>) -> Self {
        self.condition_expression = expression;
        self
    }

    /// Set the key condition expression.
    pub fn key_condition_expression(mut self, expression: Option<String>) -> Self {
        self.key_condition_expression = expression;
        self
    }

    /// Set the filter expression.
    pub fn filter_expression(mut self, expression: Option<String>) -> Self {
        self.filter_expression = expression;
        self
    }

    /// Set the projection expression.
    pub fn projection_expression(mut self, expression: Option<String>) -> Self {
        self.projection_expression = expression;
        self
    }

    /// Set the update expression.
    pub fn update_expression(mut self, expression: Option<String>) -> Self {
        self.update_expression = expression;
        self
    }

    /// Set the expression attribute names.
    pub fn expression_attribute_names(
        mut self,
        names: Option<collections::HashMap<String, String>>,
    ) -> Self {
        self.expression_attribute_names = names;
        self
    }

    /// Set the expression attribute values.
    pub fn expression_attribute_values(mut self, values: Option<AttributeMap>) -> Self {
        self.expression_attribute_values = values;
        self
    }

    /// Replace the batch write requests, keyed by table.
    pub fn batch_write_items(
        mut self,
        items: collections::HashMap<String, Vec<types::WriteRequest>>,
    ) -> Self {
        self.batch_write_items = Some(items);
        self
    }

    /// Replace the batch get keys, keyed by table.
    pub fn batch_get_items(
        mut self,
        items: collections::HashMap<String, types::KeysAndAttributes>,
    ) -> Self {
        self.batch_get_items = Some(items);
        self
    }

    /// Replace the transaction write items.
    pub fn transaction_write_items(mut self, items: Vec<types::TransactWriteItem>) -> Self {
        self.transaction_write_items = Some(items);
        self
    }

    /// Set the idempotency token of a write transaction. Empty tokens are ignored.
    pub fn client_request_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if !token.is_empty() {
            self.client_request_token = Some(token);
        }
        self
    }

    /// Replace the transaction get items.
    pub fn transaction_get_items(mut self, items: Vec<types::TransactGetItem>) -> Self {
        self.transaction_get_items = Some(items);
        self
    }

    /// Set the return-value policy of put, update and delete.
    pub fn return_values(mut self, return_values: types::ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }

    /// Set the return-value policy applied when a condition check fails.
    pub fn return_values_on_condition_check_failure(
        mut self,
        return_values: types::ReturnValuesOnConditionCheckFailure,
    ) -> Self {
        self.return_values_on_condition_check_failure = Some(return_values);
        self
    }

    /// Attach a key condition builder, expanded when the query is compiled.
    ///
    /// Its key condition, filter, projection and placeholder maps replace whatever was set
    /// through the other setters, regardless of call order.
    pub fn key_condition_builder(mut self, builder: KeyConditionBuilder) -> Self {
        self.key_condition_builder = Some(builder);
        self
    }

    /// Append write requests for `table` to the batch write.
    pub fn append_batch_write_items(
        mut self,
        table: impl Into<String>,
        requests: impl IntoIterator<Item = types::WriteRequest>,
    ) -> Self {
        self.batch_write_items
            .get_or_insert_with(collections::HashMap::new)
            .entry(table.into())
            .or_default()
            .extend(requests);
        self
    }

    /// Append items to the write transaction.
    pub fn append_transaction_write_items(
        mut self,
        items: impl IntoIterator<Item = types::TransactWriteItem>,
    ) -> Self {
        self.transaction_write_items
            .get_or_insert_with(Vec::new)
            .extend(items);
        self
    }

    /// Append items to the read transaction.
    pub fn append_transaction_get_items(
        mut self,
        items: impl IntoIterator<Item = types::TransactGetItem>,
    ) -> Self {
        self.transaction_get_items
            .get_or_insert_with(Vec::new)
            .extend(items);
        self
    }

    /// Table name, empty when unset.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Select mode, if set.
    pub fn selected(&self) -> Option<&types::Select> {
        self.select.as_ref()
    }

    /// Whether a return-value policy other than `NONE` is set, for writes or for failed
    /// condition checks.
    pub fn returns_values(&self) -> bool {
        self.return_values
            .as_ref()
            .is_some_and(|return_values| *return_values != types::ReturnValue::None)
            || self
                .return_values_on_condition_check_failure
                .as_ref()
                .is_some_and(|return_values| {
                    *return_values != types::ReturnValuesOnConditionCheckFailure::None
                })
    }

    /// Return-value policy for writes, if set.
    pub fn return_values_policy(&self) -> Option<&types::ReturnValue> {
        self.return_values.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::key::Keys;

    use rstest::rstest;

    fn put(id: &str) -> types::WriteRequest {
        types::WriteRequest::builder()
            .put_request(
                types::PutRequest::builder()
                    .set_item(Some(Keys::partition("id", id).into()))
                    .build()
                    .unwrap(),
            )
            .build()
    }

    #[test]
    fn test_setters_ignore_empty_values() {
        let query = ContextQuery::new()
            .index("")
            .limit(0)
            .limit(-3)
            .client_request_token("")
            .start_key(Some(PaginationKey::default()));
        assert_eq!(query.index_name, None);
        assert_eq!(query.limit, None);
        assert_eq!(query.client_request_token, None);
        assert_eq!(query.start_key, None);
    }

    #[test]
    fn test_index_of() {
        let index = Index::from_name("gsi-status", types::ScalarAttributeType::S, None).unwrap();
        let query = ContextQuery::new().index_of(&index);
        assert_eq!(query.index_name.as_deref(), Some("gsi-status"));
    }

    #[test]
    fn test_append_batch_write_items() {
        let query = ContextQuery::new()
            .append_batch_write_items("a", [put("1")])
            .append_batch_write_items("a", [put("2")])
            .append_batch_write_items("b", [put("3")]);
        let items = query.batch_write_items.unwrap();
        assert_eq!(items["a"].len(), 2);
        assert_eq!(items["b"].len(), 1);
    }

    #[test]
    fn test_append_transaction_items() {
        let write = types::TransactWriteItem::builder()
            .put(
                types::Put::builder()
                    .table_name("T")
                    .set_item(Some(Keys::partition("id", "1").into()))
                    .build()
                    .unwrap(),
            )
            .build();
        let query = ContextQuery::new()
            .append_transaction_write_items([write.clone()])
            .append_transaction_write_items([write]);
        assert_eq!(query.transaction_write_items.map(|items| items.len()), Some(2));
    }

    #[rstest]
    #[case::unset(ContextQuery::new(), false)]
    #[case::none(ContextQuery::new().return_values(types::ReturnValue::None), false)]
    #[case::all_old(ContextQuery::new().return_values(types::ReturnValue::AllOld), true)]
    #[case::on_condition_check_failure(
        ContextQuery::new().return_values_on_condition_check_failure(
            types::ReturnValuesOnConditionCheckFailure::AllOld
        ),
        true
    )]
    fn test_returns_values(#[case] query: ContextQuery, #[case] expected: bool) {
        assert_eq!(query.returns_values(), expected);
    }
}
