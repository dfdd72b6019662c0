//! Typed wrappers that compile a [`ContextQuery`] and send it through a [`Transport`].
//!
//! A query that fails to compile never reaches the transport.

use crate::{
    context_query::ContextQuery,
    error::{Error, Result},
    marshal::{self, AttributeMap, Item},
    pagination::PaginationKey,
};

use aws_sdk_dynamodb::{
    operation::{
        batch_get_item::{BatchGetItemInput, BatchGetItemOutput},
        batch_write_item::{BatchWriteItemInput, BatchWriteItemOutput},
        delete_item::{DeleteItemInput, DeleteItemOutput},
        get_item::{GetItemInput, GetItemOutput},
        put_item::{PutItemInput, PutItemOutput},
        query::{QueryInput, QueryOutput},
        scan::{ScanInput, ScanOutput},
        transact_get_items::{TransactGetItemsInput, TransactGetItemsOutput},
        transact_write_items::{TransactWriteItemsInput, TransactWriteItemsOutput},
        update_item::{UpdateItemInput, UpdateItemOutput},
    },
    types,
};
use std::collections;

/// Sends compiled requests to the store.
///
/// Retries, backoff and timeouts belong to the implementation.
pub trait Transport {
    /// Send a get item request.
    fn get_item(&self, input: GetItemInput) -> impl Future<Output = Result<GetItemOutput>> + Send;

    /// Send a query request.
    fn query(&self, input: QueryInput) -> impl Future<Output = Result<QueryOutput>> + Send;

    /// Send a scan request.
    fn scan(&self, input: ScanInput) -> impl Future<Output = Result<ScanOutput>> + Send;

    /// Send a put item request.
    fn put_item(&self, input: PutItemInput) -> impl Future<Output = Result<PutItemOutput>> + Send;

    /// Send an update item request.
    fn update_item(
        &self,
        input: UpdateItemInput,
    ) -> impl Future<Output = Result<UpdateItemOutput>> + Send;

    /// Send a delete item request.
    fn delete_item(
        &self,
        input: DeleteItemInput,
    ) -> impl Future<Output = Result<DeleteItemOutput>> + Send;

    /// Send a batch write request.
    fn batch_write_item(
        &self,
        input: BatchWriteItemInput,
    ) -> impl Future<Output = Result<BatchWriteItemOutput>> + Send;

    /// Send a batch get request.
    fn batch_get_item(
        &self,
        input: BatchGetItemInput,
    ) -> impl Future<Output = Result<BatchGetItemOutput>> + Send;

    /// Send a write transaction.
    fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> impl Future<Output = Result<TransactWriteItemsOutput>> + Send;

    /// Send a read transaction.
    fn transact_get_items(
        &self,
        input: TransactGetItemsInput,
    ) -> impl Future<Output = Result<TransactGetItemsOutput>> + Send;
}

impl Transport for aws_sdk_dynamodb::Client {
    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput> {
        let output = aws_sdk_dynamodb::Client::get_item(self)
            .set_table_name(input.table_name)
            .set_key(input.key)
            .set_consistent_read(input.consistent_read)
            .set_projection_expression(input.projection_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn query(&self, input: QueryInput) -> Result<QueryOutput> {
        let output = aws_sdk_dynamodb::Client::query(self)
            .set_table_name(input.table_name)
            .set_index_name(input.index_name)
            .set_select(input.select)
            .set_limit(input.limit)
            .set_consistent_read(input.consistent_read)
            .set_scan_index_forward(input.scan_index_forward)
            .set_exclusive_start_key(input.exclusive_start_key)
            .set_projection_expression(input.projection_expression)
            .set_filter_expression(input.filter_expression)
            .set_key_condition_expression(input.key_condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn scan(&self, input: ScanInput) -> Result<ScanOutput> {
        let output = aws_sdk_dynamodb::Client::scan(self)
            .set_table_name(input.table_name)
            .set_index_name(input.index_name)
            .set_select(input.select)
            .set_limit(input.limit)
            .set_consistent_read(input.consistent_read)
            .set_exclusive_start_key(input.exclusive_start_key)
            .set_projection_expression(input.projection_expression)
            .set_filter_expression(input.filter_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput> {
        let output = aws_sdk_dynamodb::Client::put_item(self)
            .set_table_name(input.table_name)
            .set_item(input.item)
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_return_values(input.return_values)
            .set_return_values_on_condition_check_failure(
                input.return_values_on_condition_check_failure,
            )
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput> {
        let output = aws_sdk_dynamodb::Client::update_item(self)
            .set_table_name(input.table_name)
            .set_key(input.key)
            .set_update_expression(input.update_expression)
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_return_values(input.return_values)
            .set_return_values_on_condition_check_failure(
                input.return_values_on_condition_check_failure,
            )
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput> {
        let output = aws_sdk_dynamodb::Client::delete_item(self)
            .set_table_name(input.table_name)
            .set_key(input.key)
            .set_condition_expression(input.condition_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .set_return_values(input.return_values)
            .set_return_values_on_condition_check_failure(
                input.return_values_on_condition_check_failure,
            )
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn batch_write_item(&self, input: BatchWriteItemInput) -> Result<BatchWriteItemOutput> {
        let output = aws_sdk_dynamodb::Client::batch_write_item(self)
            .set_request_items(input.request_items)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn batch_get_item(&self, input: BatchGetItemInput) -> Result<BatchGetItemOutput> {
        let output = aws_sdk_dynamodb::Client::batch_get_item(self)
            .set_request_items(input.request_items)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn transact_write_items(
        &self,
        input: TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput> {
        let output = aws_sdk_dynamodb::Client::transact_write_items(self)
            .set_transact_items(input.transact_items)
            .set_client_request_token(input.client_request_token)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }

    async fn transact_get_items(
        &self,
        input: TransactGetItemsInput,
    ) -> Result<TransactGetItemsOutput> {
        let output = aws_sdk_dynamodb::Client::transact_get_items(self)
            .set_transact_items(input.transact_items)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;
        Ok(output)
    }
}

/// One page of a query or scan.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<I> {
    /// Decoded items; always empty for count-only requests.
    pub items: Vec<I>,
    /// Number of matching items reported by the store.
    pub count: i32,
    /// Start key of the next page, absent on the last one.
    pub last_evaluated_key: Option<PaginationKey>,
}

impl<I> Page<I> {
    /// Continuation token of the next page, empty on the last one.
    pub fn continuation_token(&self) -> Result<String> {
        match &self.last_evaluated_key {
            Some(key) => key.encode(),
            None => Ok(String::new()),
        }
    }
}

/// Result of a batch write.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchWriteOutcome {
    /// Every request was processed.
    Complete,
    /// Requests the store left unprocessed, keyed by table; resubmitting them is up to the caller.
    Partial(collections::HashMap<String, Vec<types::WriteRequest>>),
}

impl BatchWriteOutcome {
    /// Whether every request was processed.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Typed entry point over a [`Transport`].
///
/// ```rust,no_run
/// use dynamodb_access::{client::Client, context_query::ContextQuery, key::Keys};
///
/// # async fn example(sdk: aws_sdk_dynamodb::Client) -> dynamodb_access::error::Result<()> {
/// let client = Client::new(sdk);
/// let query = ContextQuery::new().simple_get("users", Keys::partition("id", "42").into(), true);
/// let user: serde_json::Value = client.get(query).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client<T = aws_sdk_dynamodb::Client> {
    transport: T,
}

fn page<I: Item>(
    items: Option<Vec<AttributeMap>>,
    count: i32,
    last_evaluated_key: Option<AttributeMap>,
    count_only: bool,
) -> Result<Page<I>> {
    let mut decoded = Vec::new();
    if !count_only && count > 0 {
        marshal::unmarshal_list_into::<I, I>(items.unwrap_or_default(), &mut decoded)?;
    }
    Ok(Page {
        items: decoded,
        count,
        last_evaluated_key: last_evaluated_key
            .map(PaginationKey::new)
            .filter(|key| !key.is_empty()),
    })
}

fn returned<I: Item>(attributes: Option<AttributeMap>) -> Result<Option<I>> {
    match attributes {
        Some(attributes) if !attributes.is_empty() => marshal::unmarshal_map(attributes).map(Some),
        _ => Ok(None),
    }
}

/// Put and delete accept only `NONE` or `ALL_OLD`.
fn check_non_update_return_values(query: &ContextQuery) -> Result<()> {
    match query.return_values_policy() {
        None | Some(types::ReturnValue::None) | Some(types::ReturnValue::AllOld) => Ok(()),
        Some(_) => Err(Error::ReturnValuesSetToInvalidValue),
    }
}

fn check_returns_values(query: &ContextQuery) -> Result<()> {
    if query.returns_values() {
        Ok(())
    } else {
        Err(Error::ReturnValuesNotSet)
    }
}

impl<T: Transport> Client<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get one item. An empty response is [`Error::NotFoundItem`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.get",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn get<I: Item>(&self, query: ContextQuery) -> Result<I> {
        let input = GetItemInput::try_from(query)?;
        let output = self.transport.get_item(input).await?;
        match output.item {
            Some(item) if !item.is_empty() => marshal::unmarshal_map(item),
            _ => Err(Error::NotFoundItem),
        }
    }

    /// Query one page. Count-only queries skip item decoding.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.query",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn query<I: Item>(&self, query: ContextQuery) -> Result<Page<I>> {
        let count_only = query.selected() == Some(&types::Select::Count);
        let input = QueryInput::try_from(query)?;
        let output = self.transport.query(input).await?;
        page(output.items, output.count, output.last_evaluated_key, count_only)
    }

    /// Scan one page. Count-only scans skip item decoding.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.scan",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn scan<I: Item>(&self, query: ContextQuery) -> Result<Page<I>> {
        let count_only = query.selected() == Some(&types::Select::Count);
        let input = ScanInput::try_from(query)?;
        let output = self.transport.scan(input).await?;
        page(output.items, output.count, output.last_evaluated_key, count_only)
    }

    /// Put an item.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.put",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn put(&self, query: ContextQuery) -> Result<()> {
        check_non_update_return_values(&query)?;
        let input = PutItemInput::try_from(query)?;
        self.transport.put_item(input).await?;
        Ok(())
    }

    /// Put an item and decode the attributes it replaced, if any.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.put",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn put_returning<I: Item>(&self, query: ContextQuery) -> Result<Option<I>> {
        check_non_update_return_values(&query)?;
        check_returns_values(&query)?;
        let input = PutItemInput::try_from(query)?;
        let output = self.transport.put_item(input).await?;
        returned(output.attributes)
    }

    /// Update an item.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.update",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn update(&self, query: ContextQuery) -> Result<()> {
        let input = UpdateItemInput::try_from(query)?;
        self.transport.update_item(input).await?;
        Ok(())
    }

    /// Update an item and decode the attributes selected by its return-value policy.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.update",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn update_returning<I: Item>(&self, query: ContextQuery) -> Result<Option<I>> {
        check_returns_values(&query)?;
        let input = UpdateItemInput::try_from(query)?;
        let output = self.transport.update_item(input).await?;
        returned(output.attributes)
    }

    /// Delete an item.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.delete",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn delete(&self, query: ContextQuery) -> Result<()> {
        check_non_update_return_values(&query)?;
        let input = DeleteItemInput::try_from(query)?;
        self.transport.delete_item(input).await?;
        Ok(())
    }

    /// Delete an item and decode the attributes it held, if any.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.delete",
            skip_all,
            fields(table = query.table_name()),
            err
        )
    )]
    pub async fn delete_returning<I: Item>(&self, query: ContextQuery) -> Result<Option<I>> {
        check_non_update_return_values(&query)?;
        check_returns_values(&query)?;
        let input = DeleteItemInput::try_from(query)?;
        let output = self.transport.delete_item(input).await?;
        returned(output.attributes)
    }

    /// Write a batch. Unprocessed requests come back as [`BatchWriteOutcome::Partial`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.batch_write", skip_all, err)
    )]
    pub async fn batch_write(&self, query: ContextQuery) -> Result<BatchWriteOutcome> {
        let input = BatchWriteItemInput::try_from(query)?;
        let output = self.transport.batch_write_item(input).await?;
        match output.unprocessed_items {
            Some(unprocessed) if unprocessed.values().any(|requests| !requests.is_empty()) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(tables = unprocessed.len(), "batch write left unprocessed items");
                Ok(BatchWriteOutcome::Partial(unprocessed))
            }
            _ => Ok(BatchWriteOutcome::Complete),
        }
    }

    /// Get a batch, returning the raw items keyed by table.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.batch_get", skip_all, err)
    )]
    pub async fn batch_get(
        &self,
        query: ContextQuery,
    ) -> Result<collections::HashMap<String, Vec<AttributeMap>>> {
        let input = BatchGetItemInput::try_from(query)?;
        let output = self.transport.batch_get_item(input).await?;
        Ok(output.responses.unwrap_or_default())
    }

    /// Run a write transaction.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.transaction_write", skip_all, err)
    )]
    pub async fn transaction_write(&self, query: ContextQuery) -> Result<()> {
        let input = TransactWriteItemsInput::try_from(query)?;
        self.transport.transact_write_items(input).await?;
        Ok(())
    }

    /// Run a read transaction, returning one entry per requested item in request order.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.transaction_get", skip_all, err)
    )]
    pub async fn transaction_get(&self, query: ContextQuery) -> Result<Vec<Option<AttributeMap>>> {
        let input = TransactGetItemsInput::try_from(query)?;
        let output = self.transport.transact_get_items(input).await?;
        let items = output
            .responses
            .unwrap_or_default()
            .into_iter()
            .map(|response| response.item)
            .collect();
        Ok(items)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use crate::key::Keys;

    use aws_sdk_dynamodb::types::AttributeValue;
    use serde::{Deserialize, Serialize};
    use std::sync::{Mutex, atomic};

    /// Transport answering every call with canned data.
    #[derive(Debug, Default)]
    pub(crate) struct MockTransport {
        pub(crate) calls: atomic::AtomicUsize,
        pub(crate) item: Option<AttributeMap>,
        pub(crate) items: Vec<AttributeMap>,
        pub(crate) last_evaluated_key: Option<AttributeMap>,
        pub(crate) unprocessed: Option<collections::HashMap<String, Vec<types::WriteRequest>>>,
        pub(crate) inputs: Mutex<Vec<String>>,
    }

    impl MockTransport {
        fn record(&self, input: impl std::fmt::Debug) {
            self.calls.fetch_add(1, atomic::Ordering::SeqCst);
            self.inputs.lock().unwrap().push(format!("{input:?}"));
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(atomic::Ordering::SeqCst)
        }
    }

    impl Transport for MockTransport {
        async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput> {
            self.record(input);
            Ok(GetItemOutput::builder().set_item(self.item.clone()).build())
        }

        async fn query(&self, input: QueryInput) -> Result<QueryOutput> {
            let count_only = input.select() == Some(&types::Select::Count);
            self.record(input);
            let items = (!count_only).then(|| self.items.clone());
            Ok(QueryOutput::builder()
                .set_items(items)
                .count(self.items.len() as i32)
                .set_last_evaluated_key(self.last_evaluated_key.clone())
                .build())
        }

        async fn scan(&self, input: ScanInput) -> Result<ScanOutput> {
            self.record(input);
            Ok(ScanOutput::builder()
                .set_items(Some(self.items.clone()))
                .count(self.items.len() as i32)
                .set_last_evaluated_key(self.last_evaluated_key.clone())
                .build())
        }

        async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput> {
            self.record(input);
            Ok(PutItemOutput::builder().set_attributes(self.item.clone()).build())
        }

        async fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput> {
            self.record(input);
            Ok(UpdateItemOutput::builder().set_attributes(self.item.clone()).build())
        }

        async fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput> {
            self.record(input);
            Ok(DeleteItemOutput::builder().set_attributes(self.item.clone()).build())
        }

        async fn batch_write_item(
            &self,
            input: BatchWriteItemInput,
        ) -> Result<BatchWriteItemOutput> {
            self.record(input);
            Ok(BatchWriteItemOutput::builder()
                .set_unprocessed_items(self.unprocessed.clone())
                .build())
        }

        async fn batch_get_item(&self, input: BatchGetItemInput) -> Result<BatchGetItemOutput> {
            self.record(input);
            Ok(BatchGetItemOutput::builder()
                .set_responses(Some(collections::HashMap::from([(
                    "T".to_string(),
                    self.items.clone(),
                )])))
                .build())
        }

        async fn transact_write_items(
            &self,
            input: TransactWriteItemsInput,
        ) -> Result<TransactWriteItemsOutput> {
            self.record(input);
            Ok(TransactWriteItemsOutput::builder().build())
        }

        async fn transact_get_items(
            &self,
            input: TransactGetItemsInput,
        ) -> Result<TransactGetItemsOutput> {
            self.record(input);
            let responses = self
                .items
                .iter()
                .map(|item| {
                    types::ItemResponse::builder()
                        .set_item(Some(item.clone()).filter(|item| !item.is_empty()))
                        .build()
                })
                .collect();
            Ok(TransactGetItemsOutput::builder()
                .set_responses(Some(responses))
                .build())
        }
    }

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct User {
        id: String,
        name: String,
    }

    impl Item for User {}

    fn user(id: &str, name: &str) -> AttributeMap {
        collections::HashMap::from([
            ("id".to_string(), AttributeValue::S(id.to_string())),
            ("name".to_string(), AttributeValue::S(name.to_string())),
        ])
    }

    fn key() -> AttributeMap {
        Keys::partition("id", "42").into()
    }

    fn client(transport: MockTransport) -> Client<MockTransport> {
        Client::new(transport)
    }

    #[tokio::test]
    async fn test_insufficient_never_calls_transport() {
        let client = client(MockTransport::default());
        let results = [
            client.get::<User>(ContextQuery::new()).await.err(),
            client.query::<User>(ContextQuery::new()).await.err(),
            client.scan::<User>(ContextQuery::new()).await.err(),
            client.put(ContextQuery::new()).await.err(),
            client.update(ContextQuery::new()).await.err(),
            client.delete(ContextQuery::new()).await.err(),
            client.batch_write(ContextQuery::new()).await.err(),
            client.batch_get(ContextQuery::new()).await.err(),
            client.transaction_write(ContextQuery::new()).await.err(),
            client.transaction_get(ContextQuery::new()).await.err(),
        ];
        for error in results {
            assert!(error.is_some_and(|error| error.is_insufficient()));
        }
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_get() {
        let client = client(MockTransport {
            item: Some(user("42", "Ann")),
            ..Default::default()
        });
        let actual: User = client
            .get(ContextQuery::new().simple_get("T", key(), false))
            .await
            .unwrap();
        assert_eq!(
            actual,
            User {
                id: "42".to_string(),
                name: "Ann".to_string(),
            }
        );
        assert_eq!(client.transport().calls(), 1);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let client = client(MockTransport::default());
        let actual = client
            .get::<User>(ContextQuery::new().simple_get("T", key(), false))
            .await;
        assert!(matches!(actual, Err(Error::NotFoundItem)));
    }

    #[tokio::test]
    async fn test_query_page() {
        let client = client(MockTransport {
            items: vec![user("1", "a"), user("2", "b")],
            last_evaluated_key: Some(Keys::partition("id", "2").into()),
            ..Default::default()
        });
        let page: Page<User> = client
            .query(
                ContextQuery::new()
                    .table("T")
                    .key_condition_expression(Some("#id = :id".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.items[1].name, "b");
        let token = page.continuation_token().unwrap();
        assert_eq!(
            PaginationKey::decode(&token).unwrap(),
            page.last_evaluated_key
        );
    }

    #[tokio::test]
    async fn test_query_count_skips_decoding() {
        let client = client(MockTransport {
            items: vec![user("1", "a")],
            ..Default::default()
        });
        let page: Page<User> = client
            .query(ContextQuery::new().table("T").count())
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.continuation_token().unwrap(), "");
    }

    #[tokio::test]
    async fn test_scan() {
        let client = client(MockTransport {
            items: vec![user("1", "a")],
            ..Default::default()
        });
        let page: Page<User> = client.scan(ContextQuery::new().table("T")).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.last_evaluated_key, None);
    }

    #[tokio::test]
    async fn test_put_rejects_update_only_return_values() {
        let client = client(MockTransport::default());
        let query = ContextQuery::new()
            .simple_put("T", user("1", "a"))
            .return_values(types::ReturnValue::UpdatedNew);
        assert!(matches!(
            client.put(query).await,
            Err(Error::ReturnValuesSetToInvalidValue)
        ));
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_put_returning() {
        let client = client(MockTransport {
            item: Some(user("1", "old")),
            ..Default::default()
        });
        let query = ContextQuery::new()
            .simple_put("T", user("1", "new"))
            .return_values(types::ReturnValue::AllOld);
        let previous: Option<User> = client.put_returning(query).await.unwrap();
        assert_eq!(previous.map(|user| user.name), Some("old".to_string()));
    }

    #[tokio::test]
    async fn test_returning_without_policy() {
        let client = client(MockTransport::default());
        let actual = client
            .delete_returning::<User>(ContextQuery::new().simple_delete("T", key()))
            .await;
        assert!(matches!(actual, Err(Error::ReturnValuesNotSet)));
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_update_returning_empty_attributes() {
        let client = client(MockTransport::default());
        let query = ContextQuery::new()
            .simple_update("T", key())
            .update_expression(Some("SET #a = :a".to_string()))
            .return_values(types::ReturnValue::UpdatedNew);
        let actual: Option<User> = client.update_returning(query).await.unwrap();
        assert_eq!(actual, None);
    }

    #[tokio::test]
    async fn test_batch_write_outcome() {
        let request = types::WriteRequest::builder()
            .delete_request(
                types::DeleteRequest::builder()
                    .set_key(Some(key()))
                    .build()
                    .unwrap(),
            )
            .build();
        let unprocessed = collections::HashMap::from([("T".to_string(), vec![request])]);
        let complete = client(MockTransport::default());
        let partial = client(MockTransport {
            unprocessed: Some(unprocessed.clone()),
            ..Default::default()
        });
        let query = || ContextQuery::new().simple_batch_delete("T", vec![key()]);
        assert!(complete.batch_write(query()).await.unwrap().is_complete());
        assert_eq!(
            partial.batch_write(query()).await.unwrap(),
            BatchWriteOutcome::Partial(unprocessed)
        );
    }

    #[tokio::test]
    async fn test_batch_get() {
        let client = client(MockTransport {
            items: vec![user("1", "a")],
            ..Default::default()
        });
        let responses = client
            .batch_get(ContextQuery::new().simple_batch_get("T", vec![key()]))
            .await
            .unwrap();
        assert_eq!(responses["T"], vec![user("1", "a")]);
    }

    #[tokio::test]
    async fn test_transaction_get_keeps_order() {
        let client = client(MockTransport {
            items: vec![user("1", "a"), AttributeMap::new(), user("3", "c")],
            ..Default::default()
        });
        let get = |id: &str| {
            types::TransactGetItem::builder()
                .get(
                    types::Get::builder()
                        .table_name("T")
                        .set_key(Some(Keys::partition("id", id).into()))
                        .build()
                        .unwrap(),
                )
                .build()
        };
        let items = client
            .transaction_get(
                ContextQuery::new().append_transaction_get_items([get("1"), get("2"), get("3")]),
            )
            .await
            .unwrap();
        assert_eq!(items, vec![Some(user("1", "a")), None, Some(user("3", "c"))]);
    }
}
