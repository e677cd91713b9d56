// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-aware protobuf encoder.
//!
//! Fields are emitted in ascending field-number order, so the output does not
//! depend on record iteration order. `Null` values are treated as absent; any
//! other supplied value is emitted, zero included. Repeated fields are always
//! written unpacked.
//!
//! Errors raised inside nested values carry the dotted path of the failing
//! field, e.g. `post.comments[2].author.id`.

use std::borrow::Cow;

use super::options::{CodecOptions, UNKNOWN_FIELDS_KEY};
use super::wire::WireType;
use super::writer::WireWriter;
use crate::core::{CodecError, DynamicValue, Record, Result as CoreResult};
use crate::schema::descriptor::{
    DescriptorPool, FieldDescriptor, MessageDescriptor, ScalarKind, TypeDescriptor,
};

/// Encoder for dynamic records.
pub struct ProtobufEncoder<'a, P: DescriptorPool + ?Sized> {
    pool: &'a P,
    options: &'a CodecOptions,
}

impl<'a, P: DescriptorPool + ?Sized> ProtobufEncoder<'a, P> {
    /// Create an encoder over a descriptor pool.
    pub fn new(pool: &'a P, options: &'a CodecOptions) -> Self {
        Self { pool, options }
    }

    /// Encode one record as `message`.
    pub fn encode(&self, record: &Record, message: &MessageDescriptor) -> CoreResult<Vec<u8>> {
        let mut writer = WireWriter::new();
        self.encode_message(record, message, &mut writer, 0)?;
        Ok(writer.finish())
    }

    fn encode_message(
        &self,
        record: &Record,
        message: &MessageDescriptor,
        writer: &mut WireWriter,
        depth: usize,
    ) -> CoreResult<()> {
        if depth > self.options.recursion_limit {
            return Err(CodecError::RecursionLimitExceeded {
                limit: self.options.recursion_limit,
            });
        }

        let mut present: Vec<(&FieldDescriptor, &str, &DynamicValue)> =
            Vec::with_capacity(record.len());
        for (key, value) in record {
            if key == UNKNOWN_FIELDS_KEY {
                continue;
            }
            match message.field_by_name(key) {
                Some(field) => {
                    if !value.is_null() {
                        present.push((field, key.as_str(), value));
                    }
                }
                None if self.options.strict_field_names_on_encode => {
                    return Err(CodecError::UnknownFieldName {
                        message: message.name.clone(),
                        field: key.clone(),
                    });
                }
                None => {
                    tracing::trace!(message = %message.name, field = %key, "Dropping unknown record key");
                }
            }
        }

        // A declared name beats its JSON alias when both are supplied.
        present.sort_by_key(|(field, key, _)| (field.number, *key != field.name));
        present.dedup_by_key(|(field, _, _)| field.number);

        if self.options.enforce_oneof_exclusivity_on_encode {
            check_oneofs(message, &present)?;
        }

        for (field, _, value) in &present {
            self.encode_field(message, field, value, writer, depth)
                .map_err(|e| e.in_field(&field.name))?;
        }

        if let Some(DynamicValue::Bytes(raw)) = record.get(UNKNOWN_FIELDS_KEY) {
            writer.raw(raw);
        }
        Ok(())
    }

    fn encode_field(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        value: &DynamicValue,
        writer: &mut WireWriter,
        depth: usize,
    ) -> CoreResult<()> {
        if let TypeDescriptor::Map {
            key,
            value: value_ty,
            entry,
        } = &field.ty
        {
            let entry = match self.pool.message(entry) {
                Some(descriptor) => Cow::Borrowed(descriptor),
                None => Cow::Owned(MessageDescriptor::map_entry(
                    entry.as_str(),
                    *key,
                    (**value_ty).clone(),
                )),
            };
            return match value {
                DynamicValue::Map(map) => {
                    for (k, v) in map {
                        self.encode_map_entry(field.number, &entry, *key, &k.to_value(), v, writer, depth)
                            .map_err(|e| e.in_field(format!("[{k}]")))?;
                    }
                    Ok(())
                }
                DynamicValue::Record(entries) => {
                    let mut keys: Vec<&String> = entries.keys().collect();
                    keys.sort();
                    for k in keys {
                        let v = &entries[k];
                        parse_map_key(*key, k)
                            .and_then(|parsed| {
                                self.encode_map_entry(
                                    field.number,
                                    &entry,
                                    *key,
                                    &parsed,
                                    v,
                                    writer,
                                    depth,
                                )
                            })
                            .map_err(|e| e.in_field(format!("[{k}]")))?;
                    }
                    Ok(())
                }
                other => Err(CodecError::type_mismatch(
                    field.ty.display_name(),
                    other.type_name(),
                )),
            };
        }

        if field.is_repeated() {
            let DynamicValue::Array(items) = value else {
                return Err(CodecError::type_mismatch(
                    format!("repeated {}", field.ty.display_name()),
                    value.type_name(),
                ));
            };
            for (index, item) in items.iter().enumerate() {
                self.encode_value(owner, field, item, writer, depth)
                    .map_err(|e| e.in_field(format!("[{index}]")))?;
            }
            return Ok(());
        }

        self.encode_value(owner, field, value, writer, depth)
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_map_entry(
        &self,
        number: u32,
        entry: &MessageDescriptor,
        key_kind: ScalarKind,
        key: &DynamicValue,
        value: &DynamicValue,
        writer: &mut WireWriter,
        depth: usize,
    ) -> CoreResult<()> {
        let mut nested = WireWriter::new();
        encode_scalar(1, key_kind, key, &mut nested).map_err(|e| e.in_field("key"))?;
        if !value.is_null() {
            let value_field = entry.field_by_number(2).ok_or_else(|| {
                CodecError::invalid_schema(&entry.name, "map entry has no value field")
            })?;
            self.encode_value(entry, value_field, value, &mut nested, depth + 1)
                .map_err(|e| e.in_field("value"))?;
        }
        writer
            .tag(number, WireType::LengthDelimited)
            .bytes(nested.data());
        Ok(())
    }

    /// Encode one tag and a single (non-repeated) value of `field`.
    fn encode_value(
        &self,
        owner: &MessageDescriptor,
        field: &FieldDescriptor,
        value: &DynamicValue,
        writer: &mut WireWriter,
        depth: usize,
    ) -> CoreResult<()> {
        let number = field.number;
        match &field.ty {
            TypeDescriptor::Primitive { scalar } => encode_scalar(number, *scalar, value, writer),
            TypeDescriptor::Enum { name } => {
                let n = self.enum_number(name, value)?;
                // Negative numbers are sign-extended to ten bytes.
                writer.tag(number, WireType::Varint).varint(n as i64 as u64);
                Ok(())
            }
            TypeDescriptor::Message { name } => match value {
                DynamicValue::Bytes(raw) => {
                    writer.tag(number, WireType::LengthDelimited).bytes(raw);
                    Ok(())
                }
                DynamicValue::Record(nested_record) => {
                    let nested = self.pool.message(name).ok_or_else(|| {
                        CodecError::unresolved(name, format!("{}.{}", owner.name, field.name))
                    })?;
                    let mut nested_writer = WireWriter::new();
                    self.encode_message(nested_record, nested, &mut nested_writer, depth + 1)?;
                    writer
                        .tag(number, WireType::LengthDelimited)
                        .bytes(nested_writer.data());
                    Ok(())
                }
                other => Err(CodecError::type_mismatch(name, other.type_name())),
            },
            TypeDescriptor::Wrapper { wrapper } => {
                let inner = match value {
                    DynamicValue::Record(fields) => {
                        fields.get("value").unwrap_or(&DynamicValue::Null)
                    }
                    scalar => scalar,
                };
                let mut nested = WireWriter::new();
                if !inner.is_null() {
                    encode_scalar(1, wrapper.inner(), inner, &mut nested)
                        .map_err(|e| e.in_field("value"))?;
                }
                writer
                    .tag(number, WireType::LengthDelimited)
                    .bytes(nested.data());
                Ok(())
            }
            TypeDescriptor::Map { .. } => Err(CodecError::type_mismatch(
                field.ty.display_name(),
                value.type_name(),
            )),
        }
    }

    fn enum_number(&self, enum_name: &str, value: &DynamicValue) -> CoreResult<i32> {
        if let DynamicValue::String(name) = value {
            return self
                .pool
                .enumeration(enum_name)
                .and_then(|e| e.number_of(name))
                .ok_or_else(|| {
                    CodecError::type_mismatch(
                        format!("enum {enum_name}"),
                        format!("unknown value name '{name}'"),
                    )
                });
        }
        integer_bits(value)
            .map(|bits| bits as i32)
            .ok_or_else(|| CodecError::type_mismatch(format!("enum {enum_name}"), value.type_name()))
    }
}

fn check_oneofs(
    message: &MessageDescriptor,
    present: &[(&FieldDescriptor, &str, &DynamicValue)],
) -> CoreResult<()> {
    for (index, oneof) in message.oneofs.iter().enumerate() {
        let set: Vec<String> = present
            .iter()
            .filter(|(field, _, _)| field.oneof_index == Some(index))
            .map(|(field, _, _)| field.name.clone())
            .collect();
        if set.len() > 1 {
            return Err(CodecError::OneofConflict {
                oneof: oneof.name.clone(),
                fields: set,
            });
        }
    }
    Ok(())
}

/// Two's-complement bit pattern of an integer value.
///
/// Narrower wire widths keep the low bits, as standard protobuf runtimes do.
fn integer_bits(value: &DynamicValue) -> Option<u64> {
    match value {
        DynamicValue::Int32(v) => Some(*v as i64 as u64),
        DynamicValue::Int64(v) => Some(*v as u64),
        DynamicValue::UInt32(v) => Some(u64::from(*v)),
        DynamicValue::UInt64(v) => Some(*v),
        _ => None,
    }
}

fn encode_scalar(
    number: u32,
    kind: ScalarKind,
    value: &DynamicValue,
    writer: &mut WireWriter,
) -> CoreResult<()> {
    let mismatch = || CodecError::type_mismatch(kind.name(), value.type_name());
    let integer = || integer_bits(value).ok_or_else(mismatch);

    match kind {
        ScalarKind::Double => {
            let v = value.as_f64().ok_or_else(mismatch)?;
            writer.tag(number, WireType::Fixed64).fixed64(v.to_bits());
        }
        ScalarKind::Float => {
            let v = match value {
                DynamicValue::Float32(v) => *v,
                other => other.as_f64().ok_or_else(mismatch)? as f32,
            };
            writer.tag(number, WireType::Fixed32).fixed32(v.to_bits());
        }
        ScalarKind::Int32 => {
            let v = integer()? as u32 as i32;
            writer.tag(number, WireType::Varint).varint(v as i64 as u64);
        }
        ScalarKind::Int64 | ScalarKind::UInt64 => {
            writer.tag(number, WireType::Varint).varint(integer()?);
        }
        ScalarKind::UInt32 => {
            writer
                .tag(number, WireType::Varint)
                .varint(u64::from(integer()? as u32));
        }
        ScalarKind::SInt32 => {
            let v = integer()? as u32 as i32;
            writer.tag(number, WireType::Varint).zigzag(i64::from(v));
        }
        ScalarKind::SInt64 => {
            writer.tag(number, WireType::Varint).zigzag(integer()? as i64);
        }
        ScalarKind::Fixed32 | ScalarKind::SFixed32 => {
            writer.tag(number, WireType::Fixed32).fixed32(integer()? as u32);
        }
        ScalarKind::Fixed64 | ScalarKind::SFixed64 => {
            writer.tag(number, WireType::Fixed64).fixed64(integer()?);
        }
        ScalarKind::Bool => {
            let v = value.as_bool().ok_or_else(mismatch)?;
            writer.tag(number, WireType::Varint).varint(u64::from(v));
        }
        ScalarKind::String => {
            let v = value.as_str().ok_or_else(mismatch)?;
            writer
                .tag(number, WireType::LengthDelimited)
                .bytes(v.as_bytes());
        }
        ScalarKind::Bytes => {
            let v = value.as_bytes().ok_or_else(mismatch)?;
            writer.tag(number, WireType::LengthDelimited).bytes(v);
        }
    }
    Ok(())
}

/// Parse a record key of a map supplied as a record.
pub(crate) fn parse_map_key(kind: ScalarKind, text: &str) -> CoreResult<DynamicValue> {
    let mismatch = || CodecError::type_mismatch(format!("{kind} map key"), format!("'{text}'"));
    Ok(match kind {
        ScalarKind::String => DynamicValue::String(text.to_string()),
        ScalarKind::Bool => DynamicValue::Bool(text.parse().map_err(|_| mismatch())?),
        ScalarKind::UInt32 | ScalarKind::Fixed32 => {
            DynamicValue::UInt32(text.parse().map_err(|_| mismatch())?)
        }
        ScalarKind::UInt64 | ScalarKind::Fixed64 => {
            DynamicValue::UInt64(text.parse().map_err(|_| mismatch())?)
        }
        ScalarKind::Int32 | ScalarKind::SInt32 | ScalarKind::SFixed32 => {
            DynamicValue::Int32(text.parse().map_err(|_| mismatch())?)
        }
        ScalarKind::Int64 | ScalarKind::SInt64 | ScalarKind::SFixed64 => {
            DynamicValue::Int64(text.parse().map_err(|_| mismatch())?)
        }
        ScalarKind::Double | ScalarKind::Float | ScalarKind::Bytes => return Err(mismatch()),
    })
}
