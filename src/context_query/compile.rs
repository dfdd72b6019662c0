use crate::{
    context_query::{ContextQuery, validate::Member},
    error::{Error, Result},
};

use aws_sdk_dynamodb::operation::{
    batch_get_item::BatchGetItemInput, batch_write_item::BatchWriteItemInput,
    delete_item::DeleteItemInput, get_item::GetItemInput, put_item::PutItemInput,
    query::QueryInput, scan::ScanInput, transact_get_items::TransactGetItemsInput,
    transact_write_items::TransactWriteItemsInput, update_item::UpdateItemInput,
};

impl ContextQuery {
    /// Check `member` and, unless `multi_table`, the table name.
    fn ensure(&mut self, member: Member, multi_table: bool) -> Result<()> {
        self.required(member);
        let valid = if multi_table {
            self.is_valid()
        } else {
            self.is_valid_with_table()
        };
        if valid {
            Ok(())
        } else {
            Err(self.insufficient_error())
        }
    }

    /// Replace the expression slots with the attached key condition builder's output.
    fn expand_key_condition_builder(mut self) -> Result<Self> {
        match self.key_condition_builder.take() {
            Some(builder) => Ok(self.expr_query(builder.build()?)),
            None => Ok(self),
        }
    }
}

impl TryFrom<ContextQuery> for GetItemInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::Key, false)?;
        let input = Self::builder()
            .table_name(query.table_name)
            .set_key(query.key)
            .consistent_read(query.consistent_read)
            .set_projection_expression(query.projection_expression)
            .set_expression_attribute_names(query.expression_attribute_names)
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for QueryInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::Select, false)?;
        let query = query.expand_key_condition_builder()?;
        let input = Self::builder()
            .table_name(query.table_name)
            .consistent_read(query.consistent_read)
            .set_exclusive_start_key(query.start_key.map(|start_key| start_key.into_inner()))
            .set_expression_attribute_names(query.expression_attribute_names)
            .set_expression_attribute_values(query.expression_attribute_values)
            .set_filter_expression(query.filter_expression)
            .set_index_name(query.index_name)
            .set_key_condition_expression(query.key_condition_expression)
            .set_limit(query.limit)
            .set_projection_expression(query.projection_expression)
            .scan_index_forward(query.order_ascending)
            .set_select(query.select)
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for ScanInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::Select, false)?;
        let input = Self::builder()
            .table_name(query.table_name)
            .consistent_read(query.consistent_read)
            .set_exclusive_start_key(query.start_key.map(|start_key| start_key.into_inner()))
            .set_expression_attribute_names(query.expression_attribute_names)
            .set_expression_attribute_values(query.expression_attribute_values)
            .set_filter_expression(query.filter_expression)
            .set_index_name(query.index_name)
            .set_limit(query.limit)
            .set_projection_expression(query.projection_expression)
            .set_select(query.select)
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for PutItemInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::Item, false)?;
        let input = Self::builder()
            .table_name(query.table_name)
            .set_item(query.item)
            .set_condition_expression(query.condition_expression)
            .set_expression_attribute_names(query.expression_attribute_names)
            .set_expression_attribute_values(query.expression_attribute_values)
            .set_return_values(query.return_values)
            .set_return_values_on_condition_check_failure(
                query.return_values_on_condition_check_failure,
            )
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for UpdateItemInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::Key, false)?;
        let input = Self::builder()
            .table_name(query.table_name)
            .set_key(query.key)
            .set_update_expression(query.update_expression)
            .set_condition_expression(query.condition_expression)
            .set_expression_attribute_names(query.expression_attribute_names)
            .set_expression_attribute_values(query.expression_attribute_values)
            .set_return_values(query.return_values)
            .set_return_values_on_condition_check_failure(
                query.return_values_on_condition_check_failure,
            )
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for DeleteItemInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::Key, false)?;
        let input = Self::builder()
            .table_name(query.table_name)
            .set_key(query.key)
            .set_condition_expression(query.condition_expression)
            .set_expression_attribute_names(query.expression_attribute_names)
            .set_expression_attribute_values(query.expression_attribute_values)
            .set_return_values(query.return_values)
            .set_return_values_on_condition_check_failure(
                query.return_values_on_condition_check_failure,
            )
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for BatchWriteItemInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::BatchWrite, true)?;
        let input = Self::builder()
            .set_request_items(query.batch_write_items)
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for BatchGetItemInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::BatchGet, true)?;
        let input = Self::builder()
            .set_request_items(query.batch_get_items)
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for TransactWriteItemsInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::TransactionWrite, true)?;
        let input = Self::builder()
            .set_transact_items(query.transaction_write_items)
            .set_client_request_token(query.client_request_token)
            .build()?;
        Ok(input)
    }
}

impl TryFrom<ContextQuery> for TransactGetItemsInput {
    type Error = Error;

    fn try_from(mut query: ContextQuery) -> Result<Self> {
        query.ensure(Member::TransactionGet, true)?;
        let input = Self::builder()
            .set_transact_items(query.transaction_get_items)
            .build()?;
        Ok(input)
    }
}
