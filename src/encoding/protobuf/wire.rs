// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf wire primitives.
//!
//! - Base-128 varints (at most 10 bytes for 64 bits)
//! - Zigzag mapping for `sint32`/`sint64`
//! - Little-endian fixed32/fixed64
//! - Length-delimited byte blocks
//! - Tag packing: `field_number << 3 | wire_type`

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{CodecError, Result};

/// Maximum encoded size of a varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Largest field number allowed by the protocol (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Physical encoding of a field value, stored in the low 3 bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// int32, int64, uint32, uint64, sint32, sint64, bool, enum
    Varint = 0,
    /// fixed64, sfixed64, double
    Fixed64 = 1,
    /// string, bytes, messages, maps, packed repeated
    LengthDelimited = 2,
    /// Deprecated group start
    StartGroup = 3,
    /// Deprecated group end
    EndGroup = 4,
    /// fixed32, sfixed32, float
    Fixed32 = 5,
}

impl WireType {
    /// Decode the 3 wire-type bits. Values 6 and 7 are not assigned.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    /// Raw bit value.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Check if this is one of the deprecated group wire types.
    pub fn is_group(self) -> bool {
        matches!(self, WireType::StartGroup | WireType::EndGroup)
    }

    /// Get string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::StartGroup => "start-group",
            WireType::EndGroup => "end-group",
            WireType::Fixed32 => "fixed32",
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Varint
// =============================================================================

/// Number of bytes `value` occupies as a varint.
pub fn encoded_varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Append `value` to `buf` as a varint.
pub fn encode_varint_into(mut value: u64, buf: &mut Vec<u8>) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Encode `value` as a varint.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_varint_len(value));
    encode_varint_into(value, &mut buf);
    buf
}

/// Decode a varint starting at `pos`, returning the value and the position after it.
///
/// Fails with [`CodecError::UnexpectedEndOfData`] if the input ends mid-varint and
/// with [`CodecError::VarintTooLong`] if no terminating byte appears within 10 bytes.
/// A tenth byte above `0x01` would set bits past 64 and fails with
/// [`CodecError::VarintOverflow`].
pub fn decode_varint(data: &[u8], pos: usize) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        let idx = pos + i;
        let byte = *data
            .get(idx)
            .ok_or(CodecError::UnexpectedEndOfData { position: idx })?;
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(if byte & 0x80 != 0 {
                CodecError::VarintTooLong { position: pos }
            } else {
                CodecError::VarintOverflow { position: pos }
            });
        }
        result |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((result, idx + 1));
        }
    }
    Err(CodecError::VarintTooLong { position: pos })
}

// =============================================================================
// Zigzag
// =============================================================================

/// Map a signed integer onto an unsigned one so small magnitudes stay short.
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

// =============================================================================
// Tags
// =============================================================================

/// Pack a field number and wire type into a tag.
pub fn make_tag(field_number: u32, wire_type: WireType) -> u64 {
    (u64::from(field_number) << 3) | u64::from(wire_type.bits())
}

/// Split a tag into its raw field number and wire-type bits.
pub fn split_tag(tag: u64) -> (u64, u8) {
    (tag >> 3, (tag & 0x07) as u8)
}

/// Unpack a tag, returning `None` for field numbers outside `1..=MAX_FIELD_NUMBER`
/// or unassigned wire types.
pub fn parse_tag(tag: u64) -> Option<(u32, WireType)> {
    let (number, bits) = split_tag(tag);
    if number == 0 || number > u64::from(MAX_FIELD_NUMBER) {
        return None;
    }
    Some((number as u32, WireType::from_bits(bits)?))
}

// =============================================================================
// Fixed width
// =============================================================================

/// Encode a 32-bit value little-endian.
pub fn encode_fixed32(value: u32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    buf
}

/// Encode a 64-bit value little-endian.
pub fn encode_fixed64(value: u64) -> [u8; 8] {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    buf
}

fn fixed_slice(data: &[u8], pos: usize, width: usize) -> Result<&[u8]> {
    let available = data.len().saturating_sub(pos);
    if available < width {
        return Err(CodecError::TruncatedFixedWidth {
            needed: width,
            available,
            position: pos,
        });
    }
    Ok(&data[pos..pos + width])
}

/// Decode a little-endian 32-bit value at `pos`.
pub fn decode_fixed32(data: &[u8], pos: usize) -> Result<(u32, usize)> {
    let bytes = fixed_slice(data, pos, 4)?;
    Ok((LittleEndian::read_u32(bytes), pos + 4))
}

/// Decode a little-endian 64-bit value at `pos`.
pub fn decode_fixed64(data: &[u8], pos: usize) -> Result<(u64, usize)> {
    let bytes = fixed_slice(data, pos, 8)?;
    Ok((LittleEndian::read_u64(bytes), pos + 8))
}

// =============================================================================
// Length-delimited
// =============================================================================

/// Encode a varint length prefix followed by `bytes`.
pub fn encode_length_delimited(bytes: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_varint_len(bytes.len() as u64) + bytes.len());
    encode_varint_into(bytes.len() as u64, &mut buf);
    buf.extend_from_slice(bytes);
    buf
}

/// Locate the payload of a length-delimited block at `pos`.
///
/// Returns the payload range start and end.
pub(crate) fn length_delimited_bounds(data: &[u8], pos: usize) -> Result<(usize, usize)> {
    let (len, start) = decode_varint(data, pos)?;
    let available = data.len() - start;
    if len > available as u64 {
        return Err(CodecError::TruncatedBytes {
            declared: len,
            available,
            position: start,
        });
    }
    Ok((start, start + len as usize))
}

/// Decode a length-delimited block at `pos` into an owned copy of its payload.
pub fn decode_length_delimited(data: &[u8], pos: usize) -> Result<(Vec<u8>, usize)> {
    let (start, end) = length_delimited_bounds(data, pos)?;
    Ok((data[start..end].to_vec(), end))
}
