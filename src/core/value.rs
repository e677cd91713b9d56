// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dynamic value type system.
//!
//! [`DynamicValue`] is the shape exchanged at the crate boundary in place of
//! generated message structs. Decoding produces a [`Record`] (field name to
//! value); encoding consumes one.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A decoded message: field name -> value.
pub type Record = HashMap<String, DynamicValue>;

/// Value tree for one message field.
///
/// Scalar variants mirror the decoded protobuf scalar types one to one, so a
/// decode followed by an encode never changes a value's width or signedness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DynamicValue {
    // Absent / explicitly unset
    Null,

    Bool(bool),

    // Signed integers (int32, sint32, sfixed32, enums / 64-bit counterparts)
    Int32(i32),
    Int64(i64),

    // Unsigned integers (uint32, fixed32 / 64-bit counterparts)
    UInt32(u32),
    UInt64(u64),

    Float32(f32),
    Float64(f64),

    // UTF-8 text
    String(String),

    // Opaque bytes (bytes fields, unresolved nested messages, unknown fields)
    Bytes(Vec<u8>),

    // Repeated field
    Array(Vec<DynamicValue>),

    // Map field, ordered by key
    Map(BTreeMap<MapKey, DynamicValue>),

    // Nested message
    Record(Record),
}

/// Key of a map field.
///
/// Protobuf restricts map keys to integral, bool and string types, all of
/// which have a total order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapKey {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    String(String),
}

impl MapKey {
    /// Convert a scalar value into a map key, if it has a key-compatible kind.
    pub fn from_value(value: &DynamicValue) -> Option<Self> {
        match value {
            DynamicValue::Bool(v) => Some(MapKey::Bool(*v)),
            DynamicValue::Int32(v) => Some(MapKey::Int32(*v)),
            DynamicValue::Int64(v) => Some(MapKey::Int64(*v)),
            DynamicValue::UInt32(v) => Some(MapKey::UInt32(*v)),
            DynamicValue::UInt64(v) => Some(MapKey::UInt64(*v)),
            DynamicValue::String(v) => Some(MapKey::String(v.clone())),
            _ => None,
        }
    }

    /// Convert this key back into a value.
    pub fn to_value(&self) -> DynamicValue {
        match self {
            MapKey::Bool(v) => DynamicValue::Bool(*v),
            MapKey::Int32(v) => DynamicValue::Int32(*v),
            MapKey::Int64(v) => DynamicValue::Int64(*v),
            MapKey::UInt32(v) => DynamicValue::UInt32(*v),
            MapKey::UInt64(v) => DynamicValue::UInt64(*v),
            MapKey::String(v) => DynamicValue::String(v.clone()),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(v) => write!(f, "{v}"),
            MapKey::Int32(v) => write!(f, "{v}"),
            MapKey::Int64(v) => write!(f, "{v}"),
            MapKey::UInt32(v) => write!(f, "{v}"),
            MapKey::UInt64(v) => write!(f, "{v}"),
            MapKey::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for MapKey {
    fn from(value: &str) -> Self {
        MapKey::String(value.to_string())
    }
}

impl From<String> for MapKey {
    fn from(value: String) -> Self {
        MapKey::String(value)
    }
}

impl From<i32> for MapKey {
    fn from(value: i32) -> Self {
        MapKey::Int32(value)
    }
}

impl From<i64> for MapKey {
    fn from(value: i64) -> Self {
        MapKey::Int64(value)
    }
}

impl From<u32> for MapKey {
    fn from(value: u32) -> Self {
        MapKey::UInt32(value)
    }
}

impl From<u64> for MapKey {
    fn from(value: u64) -> Self {
        MapKey::UInt64(value)
    }
}

impl From<bool> for MapKey {
    fn from(value: bool) -> Self {
        MapKey::Bool(value)
    }
}

impl DynamicValue {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Build a record value from `(name, value)` pairs.
    pub fn record<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<DynamicValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        DynamicValue::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a map value from `(key, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<MapKey>,
        V: Into<DynamicValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        DynamicValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    // ========================================================================
    // Type Checking Predicates
    // ========================================================================

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// Check if this value is an integer type (signed or unsigned).
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DynamicValue::Int32(_)
                | DynamicValue::Int64(_)
                | DynamicValue::UInt32(_)
                | DynamicValue::UInt64(_)
        )
    }

    /// Check if this value is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, DynamicValue::Float32(_) | DynamicValue::Float64(_))
    }

    /// Check if this value is a numeric type (integers or floats).
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check if this value is a container type (array, map or record).
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            DynamicValue::Array(_) | DynamicValue::Map(_) | DynamicValue::Record(_)
        )
    }

    // ========================================================================
    // Type Conversion Methods
    // ========================================================================

    /// Try to get the inner bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to convert this value to i64 (for integer types only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Int32(v) => Some(*v as i64),
            DynamicValue::Int64(v) => Some(*v),
            DynamicValue::UInt32(v) => Some(*v as i64),
            DynamicValue::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to convert this value to u64 (for non-negative integers only).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            DynamicValue::UInt32(v) => Some(*v as u64),
            DynamicValue::UInt64(v) => Some(*v),
            DynamicValue::Int32(v) => u64::try_from(*v).ok(),
            DynamicValue::Int64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to convert this value to f64 (for numeric values only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Int32(v) => Some(*v as f64),
            DynamicValue::Int64(v) => Some(*v as f64),
            DynamicValue::UInt32(v) => Some(*v as f64),
            DynamicValue::UInt64(v) => Some(*v as f64),
            DynamicValue::Float32(v) => Some(*v as f64),
            DynamicValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DynamicValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the inner array.
    pub fn as_array(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get the inner map.
    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, DynamicValue>> {
        match self {
            DynamicValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get the inner record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            DynamicValue::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get a mutable reference to the inner record.
    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            DynamicValue::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::Null => "null",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::Int32(_) => "int32",
            DynamicValue::Int64(_) => "int64",
            DynamicValue::UInt32(_) => "uint32",
            DynamicValue::UInt64(_) => "uint64",
            DynamicValue::Float32(_) => "float32",
            DynamicValue::Float64(_) => "float64",
            DynamicValue::String(_) => "string",
            DynamicValue::Bytes(_) => "bytes",
            DynamicValue::Array(_) => "array",
            DynamicValue::Map(_) => "map",
            DynamicValue::Record(_) => "record",
        }
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::Null => write!(f, "null"),
            DynamicValue::Bool(v) => write!(f, "{v}"),
            DynamicValue::Int32(v) => write!(f, "{v}"),
            DynamicValue::Int64(v) => write!(f, "{v}"),
            DynamicValue::UInt32(v) => write!(f, "{v}"),
            DynamicValue::UInt64(v) => write!(f, "{v}"),
            DynamicValue::Float32(v) => write!(f, "{v}"),
            DynamicValue::Float64(v) => write!(f, "{v}"),
            DynamicValue::String(v) => write!(f, "\"{v}\""),
            DynamicValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            DynamicValue::Array(v) => write!(f, "[{} elements]", v.len()),
            DynamicValue::Map(v) => write!(f, "{{{} entries}}", v.len()),
            DynamicValue::Record(v) => write!(f, "{{{} fields}}", v.len()),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for DynamicValue {
                fn from(value: $ty) -> Self {
                    DynamicValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    Vec<u8> => Bytes,
    Vec<DynamicValue> => Array,
    Record => Record,
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::String(value.to_string())
    }
}

impl From<BTreeMap<MapKey, DynamicValue>> for DynamicValue {
    fn from(value: BTreeMap<MapKey, DynamicValue>) -> Self {
        DynamicValue::Map(value)
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DynamicValue::Null, Into::into)
    }
}
