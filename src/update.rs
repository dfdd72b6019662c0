//! Update expressions synthesized from records.
//!
//! Every non-zero attribute of a serialized record becomes a `SET` assignment. Embedded
//! structures (`#[serde(flatten)]`) contribute their attributes at the top level and fields
//! marked `#[serde(skip)]` never appear, so the serde derive is the per-type descriptor.

use crate::{
    error::{Error, Result},
    expression::{Expression, ExpressionBuilder, condition, update},
    marshal::{AttributeMap, KeyedItem},
};

use aws_sdk_dynamodb::types::AttributeValue;
use serde::Serialize;
use std::collections;

/// Whether an attribute holds the zero value of its type.
fn is_zero(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::S(value) => value.is_empty(),
        AttributeValue::N(value) => value.parse::<f64>().is_ok_and(|number| number == 0.0),
        AttributeValue::B(value) => value.as_ref().is_empty(),
        AttributeValue::Bool(value) => !value,
        AttributeValue::Null(_) => true,
        AttributeValue::L(value) => value.is_empty(),
        AttributeValue::M(value) => value.values().all(is_zero),
        AttributeValue::Ss(value) => value.is_empty(),
        AttributeValue::Ns(value) => value.is_empty(),
        AttributeValue::Bs(value) => value.is_empty(),
        _ => false,
    }
}

/// Build `SET` actions for every non-zero attribute of `item` not named in `omit`.
///
/// Actions are sorted by attribute name. Fails with [`Error::EmptyForUpdate`] when nothing is
/// left to set.
///
/// ```rust
/// use dynamodb_access::{expression::ExpressionBuilder, update};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Profile {
///     id: String,
///     name: String,
///     age: u32,
/// }
///
/// let profile = Profile {
///     id: "p-1".to_string(),
///     name: "Ann".to_string(),
///     age: 0,
/// };
/// let actions = update::update_expression(&profile, &["id"]).unwrap();
/// let expression = ExpressionBuilder::new().with_update(actions).build().unwrap();
/// assert_eq!(expression.update(), Some("SET #name = :set0"));
/// ```
pub fn update_expression<T>(item: &T, omit: &[&str]) -> Result<update::UpdateExpressionMap>
where
    T: Serialize + ?Sized,
{
    let attributes: AttributeMap = serde_dynamo::to_item(item)?;
    let omit: collections::HashSet<&str> = omit.iter().copied().collect();
    let mut leaves: Vec<_> = attributes
        .into_iter()
        .filter(|(name, value)| !omit.contains(name.as_str()) && !is_zero(value))
        .map(|(name, value)| (name, update::SetInput::Assign(value)))
        .collect();
    if leaves.is_empty() {
        return Err(Error::EmptyForUpdate);
    }
    leaves.sort_by(|(left, _), (right, _)| left.cmp(right));
    Ok(update::UpdateExpressionMap::Set(update::SetInputsMap::Leaves(leaves)))
}

/// Compile an update for a keyed record, leaving its key attributes out of the `SET` clause.
pub fn keyed_item_update_expression<K>(
    item: &K,
    condition: Option<condition::ConditionMap>,
) -> Result<Expression>
where
    K: KeyedItem + Serialize,
{
    let mut omit = vec![item.partition_key_field()];
    if let Some(sort_key_field) = item.sort_key_field() {
        omit.push(sort_key_field);
    }
    let mut builder = ExpressionBuilder::new().with_update(update_expression(item, &omit)?);
    if let Some(condition) = condition {
        builder = builder.with_condition(condition);
    }
    Ok(builder.build()?)
}
