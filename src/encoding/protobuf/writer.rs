// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Growable output buffer for protobuf wire bytes.
//!
//! # Example
//!
//! ```
//! use dynproto::encoding::protobuf::wire::WireType;
//! use dynproto::encoding::protobuf::writer::WireWriter;
//!
//! let mut writer = WireWriter::new();
//! writer.tag(1, WireType::Varint).varint(42);
//! writer.tag(2, WireType::LengthDelimited).bytes(b"Al");
//! assert_eq!(writer.finish(), vec![0x08, 0x2A, 0x12, 0x02, b'A', b'l']);
//! ```

use super::wire::{self, WireType};

/// Default initial capacity for the output buffer.
const DEFAULT_CAPACITY: usize = 64;

/// Protobuf wire writer.
#[derive(Debug, Clone)]
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WireWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty writer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get a reference to the encoded data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return the encoded data.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    /// Write a field tag.
    pub fn tag(&mut self, field_number: u32, wire_type: WireType) -> &mut Self {
        self.varint(wire::make_tag(field_number, wire_type))
    }

    /// Write a varint.
    pub fn varint(&mut self, value: u64) -> &mut Self {
        wire::encode_varint_into(value, &mut self.buffer);
        self
    }

    /// Write a signed value with zigzag mapping.
    pub fn zigzag(&mut self, value: i64) -> &mut Self {
        self.varint(wire::zigzag_encode(value))
    }

    /// Write a little-endian 32-bit value.
    pub fn fixed32(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&wire::encode_fixed32(value));
        self
    }

    /// Write a little-endian 64-bit value.
    pub fn fixed64(&mut self, value: u64) -> &mut Self {
        self.buffer.extend_from_slice(&wire::encode_fixed64(value));
        self
    }

    /// Write a length prefix followed by `data`.
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.varint(data.len() as u64);
        self.buffer.extend_from_slice(data);
        self
    }

    /// Append bytes that are already wire-encoded.
    pub fn raw(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }
}
