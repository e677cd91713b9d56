// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf codec entry points.

use super::decoder::ProtobufDecoder;
use super::encoder::ProtobufEncoder;
use super::options::CodecOptions;
use crate::core::{CodecError, Record, Result};
use crate::schema::descriptor::{DescriptorPool, MessageDescriptor};

/// Decode `data` as `message`, resolving nested types through `pool`.
pub fn decode<P: DescriptorPool + ?Sized>(
    data: &[u8],
    message: &MessageDescriptor,
    pool: &P,
    options: &CodecOptions,
) -> Result<Record> {
    tracing::trace!(message = %message.name, bytes = data.len(), "Decoding message");
    ProtobufDecoder::new(pool, options).decode(data, message)
}

/// Encode `record` as `message`, resolving nested types through `pool`.
pub fn encode<P: DescriptorPool + ?Sized>(
    record: &Record,
    message: &MessageDescriptor,
    pool: &P,
    options: &CodecOptions,
) -> Result<Vec<u8>> {
    tracing::trace!(message = %message.name, fields = record.len(), "Encoding message");
    ProtobufEncoder::new(pool, options).encode(record, message)
}

/// Protobuf codec bound to a descriptor pool and a set of options.
///
/// Holds only shared references into the pool, so one registry can back any
/// number of codecs on different threads.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use dynproto::encoding::protobuf::ProtobufCodec;
/// use dynproto::schema::SchemaRegistryBuilder;
/// use dynproto::DynamicValue;
///
/// let mut builder = SchemaRegistryBuilder::new();
/// builder.load_source("p.proto", "syntax = \"proto3\"; message Person { int32 id = 1; string name = 2; }")?;
/// let registry = builder.build();
///
/// let codec = ProtobufCodec::new(&registry);
/// let record = DynamicValue::record([("id", DynamicValue::Int32(42)), ("name", "Al".into())]);
/// let bytes = codec.encode_by_name("Person", record.as_record().unwrap())?;
/// assert_eq!(bytes, [0x08, 0x2A, 0x12, 0x02, 0x41, 0x6C]);
/// # Ok(())
/// # }
/// ```
pub struct ProtobufCodec<'a, P: DescriptorPool + ?Sized> {
    pool: &'a P,
    options: CodecOptions,
}

impl<'a, P: DescriptorPool + ?Sized> ProtobufCodec<'a, P> {
    /// Create a codec with default options.
    pub fn new(pool: &'a P) -> Self {
        Self::with_options(pool, CodecOptions::default())
    }

    /// Create a codec with explicit options.
    pub fn with_options(pool: &'a P, options: CodecOptions) -> Self {
        Self { pool, options }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Decode `data` as `message`.
    pub fn decode(&self, data: &[u8], message: &MessageDescriptor) -> Result<Record> {
        decode(data, message, self.pool, &self.options)
    }

    /// Encode `record` as `message`.
    pub fn encode(&self, record: &Record, message: &MessageDescriptor) -> Result<Vec<u8>> {
        encode(record, message, self.pool, &self.options)
    }

    /// Decode `data` as the message with fully-qualified name `type_name`.
    pub fn decode_by_name(&self, type_name: &str, data: &[u8]) -> Result<Record> {
        self.decode(data, self.message(type_name)?)
    }

    /// Encode `record` as the message with fully-qualified name `type_name`.
    pub fn encode_by_name(&self, type_name: &str, record: &Record) -> Result<Vec<u8>> {
        self.encode(record, self.message(type_name)?)
    }

    fn message(&self, type_name: &str) -> Result<&'a MessageDescriptor> {
        let name = type_name.strip_prefix('.').unwrap_or(type_name);
        let pool: &'a P = self.pool;
        pool.message(name)
            .ok_or_else(|| CodecError::not_found(type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DynamicValue;
    use crate::schema::SchemaRegistryBuilder;

    const SCHEMA: &str = r#"
        syntax = "proto3";
        package demo;

        message Node {
            int32 value = 1;
            Node left = 2;
            Node right = 3;
        }
    "#;

    fn tree(depth: u32) -> DynamicValue {
        if depth == 0 {
            return DynamicValue::record([("value", DynamicValue::Int32(0))]);
        }
        DynamicValue::record([
            ("value", DynamicValue::Int32(depth as i32)),
            ("left", tree(depth - 1)),
            ("right", tree(depth - 1)),
        ])
    }

    #[test]
    fn test_recursive_round_trip() {
        let mut builder = SchemaRegistryBuilder::new();
        builder.load_source("tree.proto", SCHEMA).unwrap();
        let registry = builder.build();
        let codec = ProtobufCodec::new(&registry);

        let original = tree(4);
        let bytes = codec
            .encode_by_name("demo.Node", original.as_record().unwrap())
            .unwrap();
        let decoded = codec.decode_by_name("demo.Node", &bytes).unwrap();
        assert_eq!(DynamicValue::Record(decoded), original);
    }

    #[test]
    fn test_by_name_requires_full_name() {
        let mut builder = SchemaRegistryBuilder::new();
        builder.load_source("tree.proto", SCHEMA).unwrap();
        let registry = builder.build();
        let codec = ProtobufCodec::with_options(&registry, CodecOptions::strict());
        assert!(codec.options().strict_wire_type_on_decode);
        assert!(codec.decode_by_name(".demo.Node", &[]).is_ok());
        assert_eq!(
            codec.decode_by_name("Node", &[]).unwrap_err(),
            CodecError::not_found("Node")
        );
    }
}
