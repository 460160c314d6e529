//! Field codec contract and implementations for the built-in field types.
//!
//! A [`Field`] is anything that can occupy one slot of a record: scalars,
//! optionals, sequences, string-keyed maps and nested records (the `record!`
//! macro emits the `Field` impl for record types). The engines drive every
//! field through this one trait, so the three traversals never branch on
//! concrete types.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::{Map, Value};

use crate::errors::{EncodeError, ParseError};

/// Shape a field occupies in a tree value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean scalar
    Bool,
    /// Integer scalar
    Int,
    /// Floating point scalar
    Float,
    /// UTF-8 string scalar
    Str,
    /// Ordered sequence of one element type
    Seq,
    /// String-keyed map of one value type
    Map,
    /// Nested record with its own schema
    Record,
}

impl FieldKind {
    /// Returns the tree-value type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Float => "number",
            FieldKind::Str => "string",
            FieldKind::Seq => "array",
            FieldKind::Map => "object",
            FieldKind::Record => "object",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Returns the kind name of a tree value for error messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Conversion contract between one record field and a tree value.
pub trait Field: Sized {
    /// Shape this field occupies in a tree value.
    const KIND: FieldKind;

    /// True only for fields that may hold no value.
    const NULLABLE: bool = false;

    /// Tree value for the current contents, `None` when an optional holds
    /// nothing.
    fn encode(&self) -> Result<Option<Value>, EncodeError>;

    /// Strict conversion from a present tree value.
    fn decode(value: &Value) -> Result<Self, ParseError>;

    /// Shape check mirroring `decode` without building the result.
    fn matches(value: &Value) -> bool;

    /// The "no value" contents, for fields that can be absent.
    fn absent() -> Option<Self> {
        None
    }
}

macro_rules! int_field {
    ($($ty:ty),* $(,)?) => {$(
        impl Field for $ty {
            const KIND: FieldKind = FieldKind::Int;

            fn encode(&self) -> Result<Option<Value>, EncodeError> {
                Ok(Some(Value::from(*self)))
            }

            fn decode(value: &Value) -> Result<Self, ParseError> {
                value
                    .as_i64()
                    .and_then(|n| <$ty>::try_from(n).ok())
                    .ok_or(ParseError::Mismatch {
                        expected: "int",
                        found: kind_name(value),
                    })
            }

            fn matches(value: &Value) -> bool {
                value.as_i64().is_some_and(|n| <$ty>::try_from(n).is_ok())
            }
        }
    )*};
}

int_field!(i8, i16, i32, i64, u8, u16, u32);

impl Field for u64 {
    const KIND: FieldKind = FieldKind::Int;

    fn encode(&self) -> Result<Option<Value>, EncodeError> {
        Ok(Some(Value::from(*self)))
    }

    fn decode(value: &Value) -> Result<Self, ParseError> {
        value.as_u64().ok_or(ParseError::Mismatch {
            expected: "int",
            found: kind_name(value),
        })
    }

    fn matches(value: &Value) -> bool {
        value.as_u64().is_some()
    }
}

impl Field for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn encode(&self) -> Result<Option<Value>, EncodeError> {
        Ok(Some(Value::from(*self)))
    }

    // Integer tree values are acceptable for a float field.
    fn decode(value: &Value) -> Result<Self, ParseError> {
        value.as_f64().ok_or(ParseError::Mismatch {
            expected: "number",
            found: kind_name(value),
        })
    }

    fn matches(value: &Value) -> bool {
        value.is_number()
    }
}

impl Field for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn encode(&self) -> Result<Option<Value>, EncodeError> {
        Ok(Some(Value::from(f64::from(*self))))
    }

    fn decode(value: &Value) -> Result<Self, ParseError> {
        f64::decode(value).map(|n| n as f32)
    }

    fn matches(value: &Value) -> bool {
        value.is_number()
    }
}

impl Field for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn encode(&self) -> Result<Option<Value>, EncodeError> {
        Ok(Some(Value::Bool(*self)))
    }

    fn decode(value: &Value) -> Result<Self, ParseError> {
        value.as_bool().ok_or(ParseError::Mismatch {
            expected: "bool",
            found: kind_name(value),
        })
    }

    fn matches(value: &Value) -> bool {
        value.is_boolean()
    }
}

impl Field for String {
    const KIND: FieldKind = FieldKind::Str;

    fn encode(&self) -> Result<Option<Value>, EncodeError> {
        Ok(Some(Value::String(self.clone())))
    }

    fn decode(value: &Value) -> Result<Self, ParseError> {
        value.as_str().map(str::to_owned).ok_or(ParseError::Mismatch {
            expected: "string",
            found: kind_name(value),
        })
    }

    fn matches(value: &Value) -> bool {
        value.is_string()
    }
}

/// An optional field. A `null` tree value and a missing key both read back
/// as `None`; the engines additionally tolerate a mismatched value by
/// treating it as "no value".
impl<T: Field> Field for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn encode(&self) -> Result<Option<Value>, EncodeError> {
        match self {
            Some(inner) => inner.encode(),
            None => Ok(None),
        }
    }

    fn decode(value: &Value) -> Result<Self, ParseError> {
        if value.is_null() {
            return Ok(None);
        }
        T::decode(value).map(Some)
    }

    fn matches(value: &Value) -> bool {
        value.is_null() || T::matches(value)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: Field> Field for Vec<T> {
    const KIND: FieldKind = FieldKind::Seq;

    fn encode(&self) -> Result<Option<Value>, EncodeError> {
        let mut items = Vec::with_capacity(self.len());
        for (index, item) in self.iter().enumerate() {
            let encoded = item.encode().map_err(|source| EncodeError::Element {
                index,
                source: Box::new(source),
            })?;
            items.push(encoded.unwrap_or(Value::Null));
        }
        Ok(Some(Value::Array(items)))
    }

    fn decode(value: &Value) -> Result<Self, ParseError> {
        let items = value.as_array().ok_or(ParseError::Mismatch {
            expected: "array",
            found: kind_name(value),
        })?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                T::decode(item).map_err(|source| ParseError::Element {
                    index,
                    source: Box::new(source),
                })
            })
            .collect()
    }

    fn matches(value: &Value) -> bool {
        match value.as_array() {
            Some(items) => items.iter().all(T::matches),
            None => false,
        }
    }
}

macro_rules! map_field {
    ($($map:ident),* $(,)?) => {$(
        impl<T: Field> Field for $map<String, T> {
            const KIND: FieldKind = FieldKind::Map;

            fn encode(&self) -> Result<Option<Value>, EncodeError> {
                let mut entries = Map::new();
                for (key, item) in self {
                    let encoded = item.encode().map_err(|source| EncodeError::Entry {
                        key: key.clone(),
                        source: Box::new(source),
                    })?;
                    entries.insert(key.clone(), encoded.unwrap_or(Value::Null));
                }
                Ok(Some(Value::Object(entries)))
            }

            fn decode(value: &Value) -> Result<Self, ParseError> {
                let entries = value.as_object().ok_or(ParseError::Mismatch {
                    expected: "object",
                    found: kind_name(value),
                })?;
                entries
                    .iter()
                    .map(|(key, item)| {
                        T::decode(item)
                            .map(|parsed| (key.clone(), parsed))
                            .map_err(|source| ParseError::Entry {
                                key: key.clone(),
                                source: Box::new(source),
                            })
                    })
                    .collect()
            }

            fn matches(value: &Value) -> bool {
                match value.as_object() {
                    Some(entries) => entries.values().all(T::matches),
                    None => false,
                }
            }
        }
    )*};
}

map_field!(HashMap, BTreeMap);
