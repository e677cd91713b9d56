// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON to record conversion, guided by a message descriptor.
//!
//! JSON has a single number type and no byte strings, so the descriptor picks
//! the value variant: `int32` fields become [`DynamicValue::Int32`], `bytes`
//! fields are read from hex strings, and so on.
//!
//! ## Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dynproto::encoding::json::JsonDecoder;
//! use dynproto::schema::SchemaRegistryBuilder;
//! use dynproto::DynamicValue;
//!
//! let mut builder = SchemaRegistryBuilder::new();
//! builder.load_source("p.proto", "syntax = \"proto3\"; message Person { int32 id = 1; bytes tag = 2; }")?;
//! let registry = builder.build();
//!
//! let decoder = JsonDecoder::new(&registry);
//! let record = decoder.decode(r#"{"id": 42, "tag": "cafe"}"#, registry.get_message("Person")?)?;
//! assert_eq!(record["id"], DynamicValue::Int32(42));
//! assert_eq!(record["tag"], DynamicValue::Bytes(vec![0xCA, 0xFE]));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::{CodecError, DynamicValue, MapKey, Record, Result as CoreResult};
use crate::encoding::protobuf::encoder;
use crate::schema::descriptor::{
    DescriptorPool, FieldDescriptor, MessageDescriptor, ScalarKind, TypeDescriptor,
};

/// Converts JSON text into records shaped for the protobuf encoder.
pub struct JsonDecoder<'a, P: DescriptorPool + ?Sized> {
    pool: &'a P,
}

impl<'a, P: DescriptorPool + ?Sized> JsonDecoder<'a, P> {
    /// Create a decoder that resolves nested types through `pool`.
    pub fn new(pool: &'a P) -> Self {
        Self { pool }
    }

    /// Decode a JSON object as `message`.
    pub fn decode(&self, json: &str, message: &MessageDescriptor) -> CoreResult<Record> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| CodecError::parse("json", format!("{e}")))?;
        self.decode_value(&value, message)
    }

    /// Convert an already-parsed JSON object.
    pub fn decode_value(&self, value: &Value, message: &MessageDescriptor) -> CoreResult<Record> {
        let Value::Object(obj) = value else {
            return Err(CodecError::type_mismatch(&message.name, json_kind(value)));
        };

        let mut record = Record::with_capacity(obj.len());
        for (key, val) in obj {
            let converted = match message.field_by_name(key) {
                Some(field) => self.field_value(val, field).map_err(|e| e.in_field(key))?,
                // Kept so a strict encode can report it.
                None => untyped(val),
            };
            record.insert(key.clone(), converted);
        }
        Ok(record)
    }

    fn field_value(&self, value: &Value, field: &FieldDescriptor) -> CoreResult<DynamicValue> {
        if value.is_null() {
            return Ok(DynamicValue::Null);
        }

        if let TypeDescriptor::Map {
            key,
            value: value_ty,
            ..
        } = &field.ty
        {
            let Value::Object(obj) = value else {
                return Err(CodecError::type_mismatch(
                    field.ty.display_name(),
                    json_kind(value),
                ));
            };
            let mut map = BTreeMap::new();
            for (k, v) in obj {
                let map_key = parse_map_key(*key, k).map_err(|e| e.in_field(format!("[{k}]")))?;
                let map_value = self
                    .typed_value(v, value_ty)
                    .map_err(|e| e.in_field(format!("[{k}]")))?;
                map.insert(map_key, map_value);
            }
            return Ok(DynamicValue::Map(map));
        }

        if field.is_repeated() {
            let Value::Array(items) = value else {
                return Err(CodecError::type_mismatch(
                    format!("repeated {}", field.ty.display_name()),
                    json_kind(value),
                ));
            };
            return items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.typed_value(item, &field.ty)
                        .map_err(|e| e.in_field(format!("[{i}]")))
                })
                .collect::<CoreResult<Vec<_>>>()
                .map(DynamicValue::Array);
        }

        self.typed_value(value, &field.ty)
    }

    fn typed_value(&self, value: &Value, ty: &TypeDescriptor) -> CoreResult<DynamicValue> {
        match ty {
            TypeDescriptor::Primitive { scalar } => scalar_value(value, *scalar),
            TypeDescriptor::Enum { name } => match value {
                Value::String(s) => Ok(DynamicValue::String(s.clone())),
                Value::Number(n) => n
                    .as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .map(DynamicValue::Int32)
                    .ok_or_else(|| CodecError::type_mismatch(format!("enum {name}"), n.to_string())),
                other => Err(CodecError::type_mismatch(
                    format!("enum {name}"),
                    json_kind(other),
                )),
            },
            TypeDescriptor::Message { name } => match self.pool.message(name) {
                Some(nested) => self.decode_value(value, nested).map(DynamicValue::Record),
                None => Ok(untyped(value)),
            },
            // Wrappers are written as their bare inner value.
            TypeDescriptor::Wrapper { wrapper } => match value {
                Value::Null => Ok(DynamicValue::Null),
                other => scalar_value(other, wrapper.inner()),
            },
            TypeDescriptor::Map { .. } => Err(CodecError::type_mismatch(
                ty.display_name(),
                json_kind(value),
            )),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Best-effort conversion without a descriptor.
fn untyped(value: &Value) -> DynamicValue {
    match value {
        Value::Null => DynamicValue::Null,
        Value::Bool(b) => DynamicValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DynamicValue::Int64(i)
            } else if let Some(u) = n.as_u64() {
                DynamicValue::UInt64(u)
            } else {
                DynamicValue::Float64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => DynamicValue::String(s.clone()),
        Value::Array(items) => DynamicValue::Array(items.iter().map(untyped).collect()),
        Value::Object(obj) => DynamicValue::Record(
            obj.iter()
                .map(|(k, v)| (k.clone(), untyped(v)))
                .collect(),
        ),
    }
}

fn scalar_value(value: &Value, kind: ScalarKind) -> CoreResult<DynamicValue> {
    let mismatch = || CodecError::type_mismatch(kind.name(), json_kind(value));

    // 64-bit integers may arrive quoted.
    let signed = || -> CoreResult<i64> {
        match value {
            Value::Number(n) => n.as_i64().ok_or_else(mismatch),
            Value::String(s) => s.parse().map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    };
    let unsigned = || -> CoreResult<u64> {
        match value {
            Value::Number(n) => n.as_u64().ok_or_else(mismatch),
            Value::String(s) => s.parse().map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    };
    let float = || -> CoreResult<f64> {
        match value {
            Value::Number(n) => n.as_f64().ok_or_else(mismatch),
            Value::String(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => other.parse().map_err(|_| mismatch()),
            },
            _ => Err(mismatch()),
        }
    };

    Ok(match kind {
        ScalarKind::Double => DynamicValue::Float64(float()?),
        ScalarKind::Float => DynamicValue::Float32(float()? as f32),
        ScalarKind::Int32 | ScalarKind::SInt32 | ScalarKind::SFixed32 => {
            DynamicValue::Int32(i32::try_from(signed()?).map_err(|_| mismatch())?)
        }
        ScalarKind::Int64 | ScalarKind::SInt64 | ScalarKind::SFixed64 => {
            DynamicValue::Int64(signed()?)
        }
        ScalarKind::UInt32 | ScalarKind::Fixed32 => {
            DynamicValue::UInt32(u32::try_from(unsigned()?).map_err(|_| mismatch())?)
        }
        ScalarKind::UInt64 | ScalarKind::Fixed64 => DynamicValue::UInt64(unsigned()?),
        ScalarKind::Bool => DynamicValue::Bool(value.as_bool().ok_or_else(mismatch)?),
        ScalarKind::String => DynamicValue::String(value.as_str().ok_or_else(mismatch)?.to_string()),
        ScalarKind::Bytes => {
            let text = value.as_str().ok_or_else(mismatch)?;
            DynamicValue::Bytes(
                hex::decode(text)
                    .map_err(|e| CodecError::type_mismatch("hex bytes", format!("'{text}' ({e})")))?,
            )
        }
    })
}

fn parse_map_key(kind: ScalarKind, text: &str) -> CoreResult<MapKey> {
    let value = encoder::parse_map_key(kind, text)?;
    MapKey::from_value(&value)
        .ok_or_else(|| CodecError::type_mismatch(format!("{kind} map key"), value.type_name()))
}
