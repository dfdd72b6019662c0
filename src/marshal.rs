//! Bridge between user records and attribute maps.
//!
//! Records are serialized with `serde_dynamo`. Before marshaling and after unmarshaling, a
//! record may run hooks; which hooks run is decided by the [`Capability`] it reports.

use crate::{
    error::{Error, Result},
    key::Keys,
};

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Serialize, de::DeserializeOwned};
use std::collections;

/// Attribute map as stored in a table.
pub type AttributeMap = collections::HashMap<String, AttributeValue>;

/// Table and primary key description of a keyed record.
pub trait KeyBase {
    /// Name of the table the record lives in.
    fn table(&self) -> &str;

    /// Name of the partition key attribute.
    fn partition_key_field(&self) -> &str;

    /// Name of the sort key attribute, if the table has one.
    fn sort_key_field(&self) -> Option<&str> {
        None
    }

    /// Current partition key value.
    fn partition_key(&self) -> AttributeValue;

    /// Current sort key value, if any.
    fn sort_key(&self) -> Option<AttributeValue> {
        None
    }
}

/// Hooks around structural (de)serialization.
pub trait Hooks {
    /// Runs right before a record is marshaled.
    fn pre_marshal(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs right after a record is unmarshaled.
    fn post_unmarshal(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A record with a primary key that can derive its own sort key.
pub trait KeyedItem: KeyBase + Hooks {
    /// Fill in the sort key from the other fields.
    ///
    /// Must be idempotent: it runs before every full marshal unless explicitly skipped.
    fn save_sort_key(&mut self) -> Result<()> {
        Ok(())
    }
}

/// What a record can do beyond plain serialization.
pub enum Capability<'a> {
    /// Keyed record: derive the sort key, then run the hooks.
    Keyed(&'a mut dyn KeyedItem),
    /// Record with hooks only.
    Hooked(&'a mut dyn Hooks),
    /// Plain record.
    Plain,
}

/// A record that can be stored in a table.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::marshal::{self, Capability, Hooks, Item, KeyBase, KeyedItem};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize, Serialize)]
/// struct Order {
///     customer: String,
///     day: String,
///     number: u32,
///     #[serde(default)]
///     sk: String,
/// }
///
/// impl KeyBase for Order {
///     fn table(&self) -> &str {
///         "orders"
///     }
///     fn partition_key_field(&self) -> &str {
///         "customer"
///     }
///     fn sort_key_field(&self) -> Option<&str> {
///         Some("sk")
///     }
///     fn partition_key(&self) -> AttributeValue {
///         AttributeValue::S(self.customer.clone())
///     }
///     fn sort_key(&self) -> Option<AttributeValue> {
///         Some(AttributeValue::S(self.sk.clone()))
///     }
/// }
///
/// impl Hooks for Order {}
///
/// impl KeyedItem for Order {
///     fn save_sort_key(&mut self) -> dynamodb_access::error::Result<()> {
///         self.sk = format!("{}#{}", self.day, self.number);
///         Ok(())
///     }
/// }
///
/// impl Item for Order {
///     fn capability(&mut self) -> Capability<'_> {
///         Capability::Keyed(self)
///     }
/// }
///
/// let mut order = Order {
///     customer: "c-1".to_string(),
///     day: "2024-01-01".to_string(),
///     number: 7,
///     sk: String::new(),
/// };
/// let map = marshal::marshal_map(&mut order).unwrap();
/// assert_eq!(map["sk"], AttributeValue::S("2024-01-01#7".to_string()));
/// ```
pub trait Item: Serialize + DeserializeOwned {
    /// Report the hooks this record supports.
    fn capability(&mut self) -> Capability<'_> {
        Capability::Plain
    }
}

impl Item for serde_json::Value {}

fn prepare<I: Item>(item: &mut I, skip_sort_key: bool) -> Result<()> {
    match item.capability() {
        Capability::Keyed(keyed) => {
            if !skip_sort_key {
                keyed.save_sort_key()?;
            }
            keyed.pre_marshal()
        }
        Capability::Hooked(hooked) => hooked.pre_marshal(),
        Capability::Plain => Ok(()),
    }
}

fn finish<I: Item>(item: &mut I) -> Result<()> {
    match item.capability() {
        Capability::Keyed(keyed) => keyed.post_unmarshal(),
        Capability::Hooked(hooked) => hooked.post_unmarshal(),
        Capability::Plain => Ok(()),
    }
}

/// Run the record's hooks, then serialize it into an attribute map.
pub fn marshal_map<I: Item>(item: &mut I) -> Result<AttributeMap> {
    prepare(item, false)?;
    Ok(serde_dynamo::to_item(&*item)?)
}

/// Like [`marshal_map`], but never derives the sort key.
pub fn marshal_map_skip_sort_key<I: Item>(item: &mut I) -> Result<AttributeMap> {
    prepare(item, true)?;
    Ok(serde_dynamo::to_item(&*item)?)
}

/// Run the record's hooks, then build a map holding only its primary key.
pub fn marshal_key<K: KeyedItem + ?Sized>(item: &mut K) -> Result<AttributeMap> {
    item.save_sort_key()?;
    item.pre_marshal()?;
    let mut keys = Keys::partition(item.partition_key_field(), item.partition_key());
    if let (Some(field), Some(value)) = (item.sort_key_field(), item.sort_key()) {
        keys = keys.with_sort(field, value);
    }
    Ok(keys.into())
}

/// Deserialize an attribute map, then run the record's post-unmarshal hook.
pub fn unmarshal_map<I: Item>(item: AttributeMap) -> Result<I> {
    let mut record: I = serde_dynamo::from_item(item)?;
    finish(&mut record)?;
    Ok(record)
}

/// Unmarshal every map into a record.
pub fn unmarshal_list<I: Item>(items: Vec<AttributeMap>) -> Result<Vec<I>> {
    items.into_iter().map(unmarshal_map).collect()
}

/// Unmarshal every map as `I` and append the converted elements to `out`.
///
/// `E` is the element type of the destination, e.g. `I` itself or `Box<I>`. Nothing is
/// appended unless every map unmarshals.
pub fn unmarshal_list_into<I, E>(items: Vec<AttributeMap>, out: &mut Vec<E>) -> Result<()>
where
    I: Item,
    E: From<I>,
{
    let records = unmarshal_list::<I>(items)?;
    out.reserve(records.len());
    out.extend(records.into_iter().map(E::from));
    Ok(())
}

/// Deserialize a list of maps as one value, for bundle types with their own `Deserialize`.
pub fn unmarshal_list_as<T: DeserializeOwned>(items: Vec<AttributeMap>) -> Result<T> {
    let list = AttributeValue::L(items.into_iter().map(AttributeValue::M).collect());
    Ok(serde_dynamo::from_attribute_value(list)?)
}

/// Check that `value` is a list whose elements are all maps.
pub fn check_list_of_maps(value: &AttributeValue) -> Result<()> {
    let AttributeValue::L(elements) = value else {
        return Err(Error::ExpectedList);
    };
    if elements
        .iter()
        .all(|element| matches!(element, AttributeValue::M(_)))
    {
        Ok(())
    } else {
        Err(Error::ExpectedMap)
    }
}
