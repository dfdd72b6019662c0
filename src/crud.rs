//! Create, read, update and delete keyed records.

use crate::{
    client::{Client, Page, Transport},
    context_query::ContextQuery,
    error::Result,
    expression::{ExpressionBuilder, condition},
    key_condition::{KeyConditionBuilder, KeyOperator},
    marshal::{self, Item, KeyBase, KeyedItem},
    update,
};

use serde::Serialize;

fn partition_key_condition<K: KeyBase + ?Sized>(
    item: &K,
    condition: condition::Condition,
) -> condition::ConditionMap {
    condition::ConditionMap::Leaves(
        condition::LogicalOperator::And,
        vec![condition::KeyCondition {
            condition,
            name: item.partition_key_field().to_string(),
        }],
    )
}

/// CRUD operations over a [`Client`], driven by the key description of each record.
#[derive(Clone, Copy, Debug)]
pub struct Crud<'a, T> {
    client: &'a Client<T>,
}

impl<T: Transport> Client<T> {
    /// CRUD operations over this client.
    pub fn crud(&self) -> Crud<'_, T> {
        Crud { client: self }
    }
}

impl<T: Transport> Crud<'_, T> {
    /// Whether a record with the same primary key is stored.
    ///
    /// With `skip_sort_key`, only the partition key is matched and the sort key is not derived.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.crud.exists",
            skip_all,
            fields(table = item.table()),
            err
        )
    )]
    pub async fn exists<K: KeyedItem>(
        &self,
        item: &mut K,
        skip_sort_key: bool,
        consistent_read: bool,
    ) -> Result<bool> {
        if !skip_sort_key {
            item.save_sort_key()?;
        }
        item.pre_marshal()?;
        let operator = (!skip_sort_key).then_some(KeyOperator::Equal);
        let expression = KeyConditionBuilder::new()
            .with_key_base(&*item, operator)
            .build()?;
        let query = ContextQuery::new()
            .table(item.table())
            .expr_query(expression)
            .limit(1)
            .count()
            .consistent_read(consistent_read);
        let page: Page<serde_json::Value> = self.client.query(query).await?;
        Ok(page.count == 1)
    }

    /// Put a record. With `strict`, fail if its partition key is already taken.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.crud.create",
            skip_all,
            fields(table = item.table()),
            err
        )
    )]
    pub async fn create<K: KeyedItem + Item>(&self, item: &mut K, strict: bool) -> Result<()> {
        let attributes = marshal::marshal_map(item)?;
        let mut query = ContextQuery::new().simple_put(item.table(), attributes);
        if strict {
            let expression = ExpressionBuilder::new()
                .with_condition(partition_key_condition(&*item, condition::Condition::Null))
                .build()?;
            query = query.expr_put(expression);
        }
        self.client.put(query).await
    }

    /// Replace `item` with the stored record sharing its primary key.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.crud.read",
            skip_all,
            fields(table = item.table()),
            err
        )
    )]
    pub async fn read<K: KeyedItem + Item>(
        &self,
        item: &mut K,
        consistent_read: bool,
    ) -> Result<()> {
        let key = marshal::marshal_key(item)?;
        let query = ContextQuery::new().simple_get(item.table(), key, consistent_read);
        *item = self.client.get(query).await?;
        Ok(())
    }

    /// Set every non-zero attribute of `item` except its key. With `strict`, fail if no record
    /// with its partition key is stored.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.crud.update",
            skip_all,
            fields(table = item.table()),
            err
        )
    )]
    pub async fn update<K: KeyedItem + Serialize>(&self, item: &mut K, strict: bool) -> Result<()> {
        let key = marshal::marshal_key(item)?;
        let condition =
            strict.then(|| partition_key_condition(&*item, condition::Condition::NotNull));
        let expression = update::keyed_item_update_expression(&*item, condition)?;
        let query = ContextQuery::new()
            .simple_update(item.table(), key)
            .expr_update(expression);
        self.client.update(query).await
    }

    /// Delete the record sharing the primary key of `item`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_access.crud.delete",
            skip_all,
            fields(table = item.table()),
            err
        )
    )]
    pub async fn delete<K: KeyedItem>(&self, item: &mut K) -> Result<()> {
        let key = marshal::marshal_key(item)?;
        let query = ContextQuery::new().simple_delete(item.table(), key);
        self.client.delete(query).await
    }
}
