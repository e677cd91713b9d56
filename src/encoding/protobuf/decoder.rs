// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-aware protobuf decoder.
//!
//! Walks wire bytes and a [`MessageDescriptor`] in lockstep, producing a
//! [`Record`] keyed by declared field names.
//!
//! ## Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dynproto::encoding::protobuf::{CodecOptions, ProtobufDecoder};
//! use dynproto::schema::SchemaRegistryBuilder;
//! use dynproto::DynamicValue;
//!
//! let mut builder = SchemaRegistryBuilder::new();
//! builder.load_source("p.proto", "syntax = \"proto3\"; message Person { int32 id = 1; string name = 2; }")?;
//! let registry = builder.build();
//!
//! let options = CodecOptions::default();
//! let decoder = ProtobufDecoder::new(&registry, &options);
//! let record = decoder.decode(&[0x08, 0x2A, 0x12, 0x02, b'A', b'l'], registry.get_message("Person")?)?;
//! assert_eq!(record["id"], DynamicValue::Int32(42));
//! assert_eq!(record["name"], DynamicValue::from("Al"));
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;

use super::cursor::WireCursor;
use super::options::{CodecOptions, UNKNOWN_FIELDS_KEY};
use super::wire::{zigzag_decode, WireType};
use crate::core::{CodecError, DynamicValue, MapKey, Record, Result as CoreResult};
use crate::schema::builtin_types;
use crate::schema::descriptor::{
    DescriptorPool, FieldDescriptor, MessageDescriptor, ScalarKind, TypeDescriptor, WrapperKind,
};

/// Decoder for protobuf wire bytes.
///
/// Nested message, enum and map-entry names are resolved through the pool.
pub struct ProtobufDecoder<'a, P: DescriptorPool + ?Sized> {
    pool: &'a P,
    options: &'a CodecOptions,
}

impl<'a, P: DescriptorPool + ?Sized> ProtobufDecoder<'a, P> {
    /// Create a decoder over a descriptor pool.
    pub fn new(pool: &'a P, options: &'a CodecOptions) -> Self {
        Self { pool, options }
    }

    /// Decode one message.
    ///
    /// Any wire error aborts the whole call; no partial record is returned.
    pub fn decode(&self, data: &[u8], message: &MessageDescriptor) -> CoreResult<Record> {
        self.decode_message(data, message, 0)
    }

    fn decode_message(
        &self,
        data: &[u8],
        message: &MessageDescriptor,
        depth: usize,
    ) -> CoreResult<Record> {
        if depth > self.options.recursion_limit {
            return Err(CodecError::RecursionLimitExceeded {
                limit: self.options.recursion_limit,
            });
        }

        let mut cursor = WireCursor::new(data);
        let mut record = Record::new();
        let mut unknown = Vec::new();

        while !cursor.is_at_end() {
            let start = cursor.position();
            let (number, wire_type) = cursor.read_tag()?;

            let Some(field) = message.field_by_number(number) else {
                tracing::trace!(
                    message = %message.name,
                    field_number = number,
                    wire_type = wire_type.as_str(),
                    "Skipping unknown field"
                );
                self.skip(&mut cursor, start, number, wire_type, &mut unknown)?;
                continue;
            };

            if !accepts(field, wire_type) {
                if self.options.strict_wire_type_on_decode {
                    return Err(CodecError::invalid_wire_type(
                        number,
                        wire_type.bits(),
                        format!(
                            "field '{}' expects {}",
                            field.name,
                            field.ty.wire_type().as_str()
                        ),
                    ));
                }
                tracing::debug!(
                    message = %message.name,
                    field = %field.name,
                    wire_type = wire_type.as_str(),
                    "Skipping field with mismatched wire type"
                );
                self.skip(&mut cursor, start, number, wire_type, &mut unknown)?;
                continue;
            }

            self.decode_field(&mut cursor, field, wire_type, &mut record, depth)?;
            // Last oneof member on the wire wins.
            if let Some(group) = message.oneof_of(field) {
                for &sibling in group.fields.iter().filter(|&&n| n != number) {
                    if let Some(other) = message.field_by_number(sibling) {
                        record.remove(&other.name);
                    }
                }
            }
        }

        if !unknown.is_empty() {
            record.insert(UNKNOWN_FIELDS_KEY.to_string(), DynamicValue::Bytes(unknown));
        }
        if self.options.populate_defaults_on_decode {
            self.populate_defaults(message, &mut record);
        }
        Ok(record)
    }

    fn skip(
        &self,
        cursor: &mut WireCursor<'_>,
        start: usize,
        number: u32,
        wire_type: WireType,
        unknown: &mut Vec<u8>,
    ) -> CoreResult<()> {
        cursor.skip_value(number, wire_type)?;
        if self.options.preserve_unknown_bytes_on_decode {
            unknown.extend_from_slice(cursor.slice_from(start));
        }
        Ok(())
    }

    fn decode_field(
        &self,
        cursor: &mut WireCursor<'_>,
        field: &FieldDescriptor,
        wire_type: WireType,
        record: &mut Record,
        depth: usize,
    ) -> CoreResult<()> {
        if let TypeDescriptor::Map { key, value, entry } = &field.ty {
            let bytes = cursor.read_length_delimited()?;
            let (k, v) = self.decode_map_entry(bytes, *key, value, entry, depth)?;
            if let DynamicValue::Map(map) = record
                .entry(field.name.clone())
                .or_insert_with(|| DynamicValue::Map(BTreeMap::new()))
            {
                map.insert(k, v);
            }
            return Ok(());
        }

        if field.is_repeated() {
            let values = if wire_type == WireType::LengthDelimited
                && field.ty.wire_type() != WireType::LengthDelimited
            {
                let bytes = cursor.read_length_delimited()?;
                self.decode_packed(bytes, field)?
            } else {
                vec![self.decode_value(cursor, field, depth)?]
            };
            if let DynamicValue::Array(items) = record
                .entry(field.name.clone())
                .or_insert_with(|| DynamicValue::Array(Vec::new()))
            {
                items.extend(values);
            }
            return Ok(());
        }

        let value = self.decode_value(cursor, field, depth)?;
        record.insert(field.name.clone(), value);
        Ok(())
    }

    /// Decode one non-packed value of `field`.
    fn decode_value(
        &self,
        cursor: &mut WireCursor<'_>,
        field: &FieldDescriptor,
        depth: usize,
    ) -> CoreResult<DynamicValue> {
        match &field.ty {
            TypeDescriptor::Primitive { scalar } => decode_scalar(cursor, *scalar, &field.name),
            TypeDescriptor::Enum { name } => self.decode_enum(cursor, name),
            TypeDescriptor::Message { name } => {
                let bytes = cursor.read_length_delimited()?;
                match self.pool.message(name) {
                    Some(nested) => Ok(DynamicValue::Record(self.decode_message(
                        bytes,
                        nested,
                        depth + 1,
                    )?)),
                    None => {
                        tracing::debug!(
                            field = %field.name,
                            type_name = %name,
                            "Message type not registered, keeping raw bytes"
                        );
                        Ok(DynamicValue::Bytes(bytes.to_vec()))
                    }
                }
            }
            TypeDescriptor::Wrapper { wrapper } => {
                let bytes = cursor.read_length_delimited()?;
                self.decode_wrapper(bytes, *wrapper, depth)
            }
            TypeDescriptor::Map { .. } => Err(CodecError::invalid_schema(
                &field.name,
                "map field decoded outside its entry",
            )),
        }
    }

    fn decode_enum(&self, cursor: &mut WireCursor<'_>, enum_name: &str) -> CoreResult<DynamicValue> {
        // Negative enum numbers are sign-extended to 64 bits on the wire.
        let number = cursor.read_varint()? as i32;
        if !self.options.allow_unknown_enum_number_decode {
            if let Some(descriptor) = self.pool.enumeration(enum_name) {
                if !descriptor.contains(number) {
                    return Err(CodecError::UnknownEnumValue {
                        enum_name: enum_name.to_string(),
                        number,
                    });
                }
            }
        }
        Ok(DynamicValue::Int32(number))
    }

    fn decode_packed(&self, bytes: &[u8], field: &FieldDescriptor) -> CoreResult<Vec<DynamicValue>> {
        let mut cursor = WireCursor::new(bytes);
        let mut values = Vec::new();
        while !cursor.is_at_end() {
            let value = match &field.ty {
                TypeDescriptor::Enum { name } => self.decode_enum(&mut cursor, name)?,
                TypeDescriptor::Primitive { scalar } => {
                    decode_scalar(&mut cursor, *scalar, &field.name)?
                }
                other => {
                    return Err(CodecError::invalid_wire_type(
                        field.number,
                        WireType::LengthDelimited.bits(),
                        format!("type '{}' cannot be packed", other.display_name()),
                    ))
                }
            };
            values.push(value);
        }
        Ok(values)
    }

    fn decode_map_entry(
        &self,
        bytes: &[u8],
        key: ScalarKind,
        value: &TypeDescriptor,
        entry: &str,
        depth: usize,
    ) -> CoreResult<(MapKey, DynamicValue)> {
        let descriptor = match self.pool.message(entry) {
            Some(descriptor) => Cow::Borrowed(descriptor),
            None => Cow::Owned(MessageDescriptor::map_entry(entry, key, value.clone())),
        };
        let mut decoded = self.decode_message(bytes, &descriptor, depth + 1)?;

        let key_value = decoded
            .remove("key")
            .unwrap_or_else(|| key.default_value());
        let map_key = MapKey::from_value(&key_value)
            .ok_or_else(|| CodecError::type_mismatch("map key", key_value.type_name()))?;
        let map_value = match decoded.remove("value") {
            Some(v) => v,
            None => self.absent_value(value),
        };
        Ok((map_key, map_value))
    }

    fn decode_wrapper(&self, bytes: &[u8], kind: WrapperKind, depth: usize) -> CoreResult<DynamicValue> {
        let full_name = kind.full_name();
        let descriptor = match self.pool.message(&full_name) {
            Some(descriptor) => Cow::Borrowed(descriptor),
            None => Cow::Owned(builtin_types::wrapper_descriptor(kind)),
        };
        let mut inner = self.decode_message(bytes, &descriptor, depth + 1)?;
        if self.options.unwrap_wrappers_on_decode {
            // A present wrapper with no inner field holds the zero value.
            Ok(inner
                .remove("value")
                .unwrap_or_else(|| kind.inner().default_value()))
        } else {
            Ok(DynamicValue::Record(inner))
        }
    }

    /// Value of an entry or field whose bytes were absent.
    fn absent_value(&self, ty: &TypeDescriptor) -> DynamicValue {
        match ty {
            TypeDescriptor::Primitive { scalar } => scalar.default_value(),
            TypeDescriptor::Enum { name } => DynamicValue::Int32(self.enum_default(name)),
            TypeDescriptor::Wrapper { .. } if self.options.unwrap_wrappers_on_decode => {
                DynamicValue::Null
            }
            TypeDescriptor::Message { .. }
            | TypeDescriptor::Wrapper { .. }
            | TypeDescriptor::Map { .. } => DynamicValue::Record(Record::new()),
        }
    }

    fn enum_default(&self, enum_name: &str) -> i32 {
        self.pool
            .enumeration(enum_name)
            .and_then(|e| e.values.first())
            .map_or(0, |v| v.number)
    }

    /// Fill absent singular scalar and enum fields (and, when unwrapping,
    /// wrapper fields) with their zero value. Oneof members stay absent.
    fn populate_defaults(&self, message: &MessageDescriptor, record: &mut Record) {
        for field in &message.fields {
            if field.is_repeated() || field.oneof_index.is_some() || record.contains_key(&field.name)
            {
                continue;
            }
            let default = match &field.ty {
                TypeDescriptor::Primitive { .. } | TypeDescriptor::Enum { .. } => {
                    self.absent_value(&field.ty)
                }
                TypeDescriptor::Wrapper { .. } if self.options.unwrap_wrappers_on_decode => {
                    DynamicValue::Null
                }
                _ => continue,
            };
            record.insert(field.name.clone(), default);
        }
    }
}

/// Check if `wire_type` can carry a value of `field`.
fn accepts(field: &FieldDescriptor, wire_type: WireType) -> bool {
    let expected = field.ty.wire_type();
    wire_type == expected
        || (field.is_repeated()
            && wire_type == WireType::LengthDelimited
            && matches!(
                field.ty,
                TypeDescriptor::Enum { .. } | TypeDescriptor::Primitive { .. }
            ))
}

fn decode_scalar(
    cursor: &mut WireCursor<'_>,
    kind: ScalarKind,
    field_name: &str,
) -> CoreResult<DynamicValue> {
    Ok(match kind {
        ScalarKind::Double => DynamicValue::Float64(f64::from_bits(cursor.read_fixed64()?)),
        ScalarKind::Float => DynamicValue::Float32(f32::from_bits(cursor.read_fixed32()?)),
        ScalarKind::Int32 => DynamicValue::Int32(cursor.read_varint()? as i32),
        ScalarKind::Int64 => DynamicValue::Int64(cursor.read_varint()? as i64),
        ScalarKind::UInt32 => DynamicValue::UInt32(cursor.read_varint()? as u32),
        ScalarKind::UInt64 => DynamicValue::UInt64(cursor.read_varint()?),
        ScalarKind::SInt32 => DynamicValue::Int32(zigzag_decode(cursor.read_varint()?) as i32),
        ScalarKind::SInt64 => DynamicValue::Int64(zigzag_decode(cursor.read_varint()?)),
        ScalarKind::Fixed32 => DynamicValue::UInt32(cursor.read_fixed32()?),
        ScalarKind::Fixed64 => DynamicValue::UInt64(cursor.read_fixed64()?),
        ScalarKind::SFixed32 => DynamicValue::Int32(cursor.read_fixed32()? as i32),
        ScalarKind::SFixed64 => DynamicValue::Int64(cursor.read_fixed64()? as i64),
        ScalarKind::Bool => DynamicValue::Bool(cursor.read_varint()? != 0),
        ScalarKind::String => {
            let bytes = cursor.read_length_delimited()?;
            let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 {
                field: field_name.to_string(),
            })?;
            DynamicValue::String(text.to_string())
        }
        ScalarKind::Bytes => DynamicValue::Bytes(cursor.read_bytes()?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::descriptor::{EnumDescriptor, FieldLabel, OneofGroup};
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestPool {
        messages: HashMap<String, MessageDescriptor>,
        enums: HashMap<String, EnumDescriptor>,
    }

    impl TestPool {
        fn with_message(mut self, message: MessageDescriptor) -> Self {
            self.messages.insert(message.name.clone(), message);
            self
        }

        fn with_enum(mut self, descriptor: EnumDescriptor) -> Self {
            self.enums.insert(descriptor.name.clone(), descriptor);
            self
        }
    }

    impl DescriptorPool for TestPool {
        fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
            self.messages.get(full_name)
        }

        fn enumeration(&self, full_name: &str) -> Option<&EnumDescriptor> {
            self.enums.get(full_name)
        }
    }

    fn person() -> MessageDescriptor {
        MessageDescriptor::new(
            "Person",
            vec![
                FieldDescriptor::new("id", 1, TypeDescriptor::primitive(ScalarKind::Int32)),
                FieldDescriptor::new("name", 2, TypeDescriptor::primitive(ScalarKind::String)),
            ],
            Vec::new(),
        )
    }

    fn repeated(name: &str, number: u32, ty: TypeDescriptor) -> FieldDescriptor {
        let mut field = FieldDescriptor::new(name, number, ty);
        field.label = FieldLabel::Repeated;
        field
    }

    fn decode_with(
        pool: &TestPool,
        message: &MessageDescriptor,
        data: &[u8],
        options: CodecOptions,
    ) -> CoreResult<Record> {
        ProtobufDecoder::new(pool, &options).decode(data, message)
    }

    #[test]
    fn test_decode_person() {
        let pool = TestPool::default();
        let record = decode_with(
            &pool,
            &person(),
            &[0x08, 0x2A, 0x12, 0x02, 0x41, 0x6C],
            CodecOptions::default(),
        )
        .unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["id"], DynamicValue::Int32(42));
        assert_eq!(record["name"], DynamicValue::String("Al".to_string()));
    }

    #[test]
    fn test_unknown_field_skipped_between_known() {
        let pool = TestPool::default();
        // id=42, field 99 varint 7, name="Al"
        let data = [0x08, 0x2A, 0x98, 0x06, 0x07, 0x12, 0x02, 0x41, 0x6C];
        let record = decode_with(&pool, &person(), &data, CodecOptions::default()).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["name"], DynamicValue::String("Al".to_string()));

        let options = CodecOptions::default().with_preserve_unknown_bytes(true);
        let record = decode_with(&pool, &person(), &data, options).unwrap();
        assert_eq!(
            record[UNKNOWN_FIELDS_KEY],
            DynamicValue::Bytes(vec![0x98, 0x06, 0x07])
        );
    }

    #[test]
    fn test_wire_type_mismatch() {
        let pool = TestPool::default();
        // id sent as length-delimited
        let data = [0x0A, 0x01, 0x00, 0x12, 0x01, 0x42];
        let record = decode_with(&pool, &person(), &data, CodecOptions::default()).unwrap();
        assert!(!record.contains_key("id"));
        assert_eq!(record["name"], DynamicValue::String("B".to_string()));

        let err = decode_with(&pool, &person(), &data, CodecOptions::strict()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidWireType {
                field_number: 1,
                wire_type: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_input_fails() {
        let pool = TestPool::default();
        let err = decode_with(&pool, &person(), &[0x12, 0x05, 0x41], CodecOptions::default())
            .unwrap_err();
        assert!(err.is_truncation());
        let err = decode_with(&pool, &person(), &[0x08], CodecOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEndOfData { .. }));
    }

    #[test]
    fn test_enum_validation() {
        let pool = TestPool::default().with_enum(EnumDescriptor::new(
            "Color",
            [("RED", 0), ("GREEN", 1)],
        ));
        let message = MessageDescriptor::new(
            "Paint",
            vec![FieldDescriptor::new("color", 1, TypeDescriptor::enumeration("Color"))],
            Vec::new(),
        );
        let record = decode_with(&pool, &message, &[0x08, 0x01], CodecOptions::default()).unwrap();
        assert_eq!(record["color"], DynamicValue::Int32(1));

        let err = decode_with(&pool, &message, &[0x08, 0x05], CodecOptions::default()).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownEnumValue {
                enum_name: "Color".to_string(),
                number: 5
            }
        );

        let options = CodecOptions::default().with_allow_unknown_enum_numbers(true);
        let record = decode_with(&pool, &message, &[0x08, 0x05], options).unwrap();
        assert_eq!(record["color"], DynamicValue::Int32(5));
    }

    #[test]
    fn test_repeated_packed_and_unpacked() {
        let pool = TestPool::default();
        let message = MessageDescriptor::new(
            "Numbers",
            vec![repeated("values", 1, TypeDescriptor::primitive(ScalarKind::SInt32))],
            Vec::new(),
        );
        // unpacked 1, then packed [-1, 2]
        let data = [0x08, 0x02, 0x0A, 0x02, 0x01, 0x04];
        let record = decode_with(&pool, &message, &data, CodecOptions::default()).unwrap();
        assert_eq!(
            record["values"],
            DynamicValue::Array(vec![
                DynamicValue::Int32(1),
                DynamicValue::Int32(-1),
                DynamicValue::Int32(2)
            ])
        );
    }

    #[test]
    fn test_map_accumulates_last_key_wins() {
        let entry = MessageDescriptor::map_entry(
            "Bag.ScoresEntry",
            ScalarKind::String,
            TypeDescriptor::primitive(ScalarKind::Int32),
        );
        let pool = TestPool::default().with_message(entry);
        let message = MessageDescriptor::new(
            "Bag",
            vec![FieldDescriptor::new(
                "scores",
                1,
                TypeDescriptor::Map {
                    key: ScalarKind::String,
                    value: Box::new(TypeDescriptor::primitive(ScalarKind::Int32)),
                    entry: "Bag.ScoresEntry".to_string(),
                },
            )],
            Vec::new(),
        );
        // {a: 1}, {b: 2}, {a: 3}, and an entry with no value
        let data = [
            0x0A, 0x05, 0x0A, 0x01, b'a', 0x10, 0x01, //
            0x0A, 0x05, 0x0A, 0x01, b'b', 0x10, 0x02, //
            0x0A, 0x05, 0x0A, 0x01, b'a', 0x10, 0x03, //
            0x0A, 0x03, 0x0A, 0x01, b'c',
        ];
        let record = decode_with(&pool, &message, &data, CodecOptions::default()).unwrap();
        assert_eq!(
            record["scores"],
            DynamicValue::map([("a", 3), ("b", 2), ("c", 0)])
        );
    }

    #[test]
    fn test_unresolved_message_keeps_bytes() {
        let pool = TestPool::default();
        let message = MessageDescriptor::new(
            "Holder",
            vec![FieldDescriptor::new("inner", 1, TypeDescriptor::message("Missing"))],
            Vec::new(),
        );
        let record =
            decode_with(&pool, &message, &[0x0A, 0x02, 0x08, 0x01], CodecOptions::default())
                .unwrap();
        assert_eq!(record["inner"], DynamicValue::Bytes(vec![0x08, 0x01]));
    }

    #[test]
    fn test_wrappers() {
        let pool = TestPool::default();
        let message = MessageDescriptor::new(
            "Holder",
            vec![
                FieldDescriptor::new(
                    "count",
                    1,
                    TypeDescriptor::Wrapper {
                        wrapper: WrapperKind::Int32,
                    },
                ),
                FieldDescriptor::new(
                    "label",
                    2,
                    TypeDescriptor::Wrapper {
                        wrapper: WrapperKind::String,
                    },
                ),
            ],
            Vec::new(),
        );
        // count = {value: 7}, label = {} (present, zero)
        let data = [0x0A, 0x02, 0x08, 0x07, 0x12, 0x00];
        let record = decode_with(&pool, &message, &data, CodecOptions::default()).unwrap();
        assert_eq!(record["count"], DynamicValue::record([("value", 7)]));
        assert_eq!(record["label"], DynamicValue::Record(Record::new()));

        let options = CodecOptions::default().with_unwrap_wrappers(true);
        let record = decode_with(&pool, &message, &data, options).unwrap();
        assert_eq!(record["count"], DynamicValue::Int32(7));
        assert_eq!(record["label"], DynamicValue::String(String::new()));

        let options = options.with_populate_defaults(true);
        let record = decode_with(&pool, &message, &[], options).unwrap();
        assert_eq!(record["count"], DynamicValue::Null);
    }

    #[test]
    fn test_populate_defaults_skips_oneof_members() {
        let pool = TestPool::default();
        let mut choice = FieldDescriptor::new("choice", 3, TypeDescriptor::primitive(ScalarKind::Bool));
        choice.oneof_index = Some(0);
        let mut fields = person().fields;
        fields.push(choice);
        let message = MessageDescriptor::new(
            "Person",
            fields,
            vec![OneofGroup {
                name: "kind".to_string(),
                fields: vec![3],
            }],
        );
        let options = CodecOptions::default().with_populate_defaults(true);
        let record = decode_with(&pool, &message, &[], options).unwrap();
        assert_eq!(record["id"], DynamicValue::Int32(0));
        assert_eq!(record["name"], DynamicValue::String(String::new()));
        assert!(!record.contains_key("choice"));

        let record = decode_with(&pool, &message, &[], CodecOptions::default()).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_last_oneof_member_wins() {
        let pool = TestPool::default();
        let mut text = FieldDescriptor::new("text", 10, TypeDescriptor::primitive(ScalarKind::String));
        text.oneof_index = Some(0);
        let mut code = FieldDescriptor::new("code", 11, TypeDescriptor::primitive(ScalarKind::Int32));
        code.oneof_index = Some(0);
        let message = MessageDescriptor::new(
            "Body",
            vec![FieldDescriptor::new("id", 1, TypeDescriptor::primitive(ScalarKind::Int32)), text, code],
            vec![OneofGroup {
                name: "body".to_string(),
                fields: vec![10, 11],
            }],
        );

        // text = "hi", id = 7, code = 5
        let data = [0x52, 0x02, b'h', b'i', 0x08, 0x07, 0x58, 0x05];
        let record = decode_with(&pool, &message, &data, CodecOptions::default()).unwrap();
        assert!(!record.contains_key("text"));
        assert_eq!(record["code"], DynamicValue::Int32(5));
        assert_eq!(record["id"], DynamicValue::Int32(7));

        // code = 5, then text = "hi"
        let data = [0x58, 0x05, 0x52, 0x02, b'h', b'i'];
        let record = decode_with(&pool, &message, &data, CodecOptions::default()).unwrap();
        assert!(!record.contains_key("code"));
        assert_eq!(record["text"], DynamicValue::from("hi"));
    }

    #[test]
    fn test_recursion_limit() {
        let node = MessageDescriptor::new(
            "Node",
            vec![FieldDescriptor::new("child", 1, TypeDescriptor::message("Node"))],
            Vec::new(),
        );
        let pool = TestPool::default().with_message(node.clone());
        // child { child { child {} } }
        let data = [0x0A, 0x04, 0x0A, 0x02, 0x0A, 0x00];
        assert!(decode_with(&pool, &node, &data, CodecOptions::default()).is_ok());

        let options = CodecOptions::default().with_recursion_limit(2);
        assert_eq!(
            decode_with(&pool, &node, &data, options).unwrap_err(),
            CodecError::RecursionLimitExceeded { limit: 2 }
        );
    }

    #[test]
    fn test_invalid_utf8_and_wire_type() {
        let pool = TestPool::default();
        let err = decode_with(&pool, &person(), &[0x12, 0x01, 0xFF], CodecOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidUtf8 {
                field: "name".to_string()
            }
        );
        // wire type 7 cannot be skipped
        let err = decode_with(&pool, &person(), &[0x0F], CodecOptions::default()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidWireType { wire_type: 7, .. }));
    }
}
