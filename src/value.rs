//! Conversion of plain Rust values into attribute values.

use aws_sdk_dynamodb::{primitives::Blob, types::AttributeValue};

/// Conversion into a single [`AttributeValue`].
///
/// Implemented for the scalar types that commonly make up keys and conditions, so builders
/// can take `"user#1"` or `42` directly. `None` converts to `NULL`, which key predicates treat
/// as an absent value. So do NaN and infinite floats, which the store cannot hold as numbers.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::value::IntoAttributeValue;
///
/// assert_eq!("a".into_attribute_value(), AttributeValue::S("a".to_string()));
/// assert_eq!(7u8.into_attribute_value(), AttributeValue::N("7".to_string()));
/// ```
pub trait IntoAttributeValue {
    /// Convert `self` into an attribute value.
    fn into_attribute_value(self) -> AttributeValue;
}

impl IntoAttributeValue for AttributeValue {
    fn into_attribute_value(self) -> AttributeValue {
        self
    }
}

impl IntoAttributeValue for String {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::S(self)
    }
}

impl IntoAttributeValue for &str {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::S(self.to_string())
    }
}

impl IntoAttributeValue for &String {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::S(self.clone())
    }
}

impl IntoAttributeValue for bool {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::Bool(self)
    }
}

impl IntoAttributeValue for Vec<u8> {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::B(Blob::new(self))
    }
}

impl IntoAttributeValue for &[u8] {
    fn into_attribute_value(self) -> AttributeValue {
        AttributeValue::B(Blob::new(self))
    }
}

impl<T: IntoAttributeValue> IntoAttributeValue for Option<T> {
    fn into_attribute_value(self) -> AttributeValue {
        match self {
            Some(value) => value.into_attribute_value(),
            None => AttributeValue::Null(true),
        }
    }
}

macro_rules! impl_number {
    ($($number:ty),* $(,)?) => {
        $(
            impl IntoAttributeValue for $number {
                fn into_attribute_value(self) -> AttributeValue {
                    AttributeValue::N(self.to_string())
                }
            }
        )*
    };
}

impl_number!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

macro_rules! impl_float {
    ($($float:ty),* $(,)?) => {
        $(
            impl IntoAttributeValue for $float {
                fn into_attribute_value(self) -> AttributeValue {
                    if self.is_finite() {
                        AttributeValue::N(self.to_string())
                    } else {
                        AttributeValue::Null(true)
                    }
                }
            }
        )*
    };
}

impl_float!(f32, f64);

/// Whether a value counts as absent for key predicates.
pub(crate) fn is_nil(value: &AttributeValue) -> bool {
    matches!(value, AttributeValue::Null(_))
}
