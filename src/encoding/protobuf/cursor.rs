// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounds-checked reader over protobuf wire bytes.

use super::wire::{self, WireType};
use crate::CodecError;
use crate::Result as CoreResult;

/// Cursor that tracks the read position within a protobuf buffer.
///
/// Every read is bounds-checked and advances the cursor only on success.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use dynproto::encoding::protobuf::cursor::WireCursor;
/// use dynproto::encoding::protobuf::wire::WireType;
///
/// let data = [0x08, 0x2A];
/// let mut cursor = WireCursor::new(&data);
/// assert_eq!(cursor.read_tag()?, (1, WireType::Varint));
/// assert_eq!(cursor.read_varint()?, 42);
/// assert!(cursor.is_at_end());
/// # Ok(())
/// # }
/// ```
pub struct WireCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WireCursor<'a> {
    /// Create a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if the cursor has consumed the whole buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Read a varint.
    pub fn read_varint(&mut self) -> CoreResult<u64> {
        let (value, next) = wire::decode_varint(self.data, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    /// Read a tag and split it into field number and wire type.
    ///
    /// Field number zero, numbers above 2^29 - 1 and wire types 6/7 are rejected
    /// here because the length of the value that follows cannot be known.
    pub fn read_tag(&mut self) -> CoreResult<(u32, WireType)> {
        let start = self.offset;
        let (tag, next) = wire::decode_varint(self.data, start)?;
        let (number, bits) = wire::split_tag(tag);
        if number == 0 || number > u64::from(wire::MAX_FIELD_NUMBER) {
            return Err(CodecError::InvalidFieldNumber {
                number,
                position: start,
            });
        }
        let wire_type = WireType::from_bits(bits).ok_or_else(|| {
            CodecError::invalid_wire_type(number as u32, bits, "unassigned wire type")
        })?;
        self.offset = next;
        Ok((number as u32, wire_type))
    }

    /// Read a little-endian 32-bit value.
    pub fn read_fixed32(&mut self) -> CoreResult<u32> {
        let (value, next) = wire::decode_fixed32(self.data, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    /// Read a little-endian 64-bit value.
    pub fn read_fixed64(&mut self) -> CoreResult<u64> {
        let (value, next) = wire::decode_fixed64(self.data, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    /// Read a length-delimited block, borrowing its payload.
    pub fn read_length_delimited(&mut self) -> CoreResult<&'a [u8]> {
        let (start, end) = wire::length_delimited_bounds(self.data, self.offset)?;
        self.offset = end;
        Ok(&self.data[start..end])
    }

    /// Read a length-delimited block into an owned buffer.
    pub fn read_bytes(&mut self) -> CoreResult<Vec<u8>> {
        self.read_length_delimited().map(<[u8]>::to_vec)
    }

    /// Bytes between `start` and the current position.
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.data[start.min(self.offset)..self.offset]
    }

    /// Skip the value that follows a tag with the given wire type.
    ///
    /// A start-group tag skips every nested field up to the matching end-group
    /// tag. A stray end-group tag is an error.
    pub fn skip_value(&mut self, field_number: u32, wire_type: WireType) -> CoreResult<()> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.read_fixed64()?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.read_fixed32()?;
            }
            WireType::StartGroup => self.skip_group(field_number)?,
            WireType::EndGroup => {
                return Err(CodecError::invalid_wire_type(
                    field_number,
                    wire_type.bits(),
                    "end-group tag without matching start-group",
                ));
            }
        }
        Ok(())
    }

    /// Skip nested fields up to the end-group tag closing `field_number`.
    ///
    /// Open groups are tracked on a heap stack so nesting depth is bounded
    /// only by the input length.
    fn skip_group(&mut self, field_number: u32) -> CoreResult<()> {
        let mut open = vec![field_number];
        while let Some(&current) = open.last() {
            if self.is_at_end() {
                return Err(CodecError::UnexpectedEndOfData {
                    position: self.offset,
                });
            }
            let (number, wire_type) = self.read_tag()?;
            match wire_type {
                WireType::EndGroup if number == current => {
                    open.pop();
                }
                WireType::EndGroup => {
                    return Err(CodecError::invalid_wire_type(
                        number,
                        wire_type.bits(),
                        format!("end-group does not match open group {current}"),
                    ));
                }
                WireType::StartGroup => open.push(number),
                other => self.skip_value(number, other)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_person_fields() {
        let data = [0x08, 0x2A, 0x12, 0x02, b'A', b'l'];
        let mut cursor = WireCursor::new(&data);
        assert_eq!(cursor.read_tag().unwrap(), (1, WireType::Varint));
        assert_eq!(cursor.read_varint().unwrap(), 42);
        assert_eq!(cursor.read_tag().unwrap(), (2, WireType::LengthDelimited));
        assert_eq!(cursor.read_length_delimited().unwrap(), b"Al");
        assert!(cursor.is_at_end());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_read_tag_rejects_field_zero() {
        let mut cursor = WireCursor::new(&[0x00]);
        assert!(matches!(
            cursor.read_tag(),
            Err(CodecError::InvalidFieldNumber { number: 0, .. })
        ));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_read_tag_rejects_wire_type_7() {
        let mut cursor = WireCursor::new(&[0x0F]);
        assert!(matches!(
            cursor.read_tag(),
            Err(CodecError::InvalidWireType { wire_type: 7, .. })
        ));
    }

    #[test]
    fn test_skip_each_wire_type() {
        let mut data = vec![0x96, 0x01];
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data.extend_from_slice(&[0x03, b'a', b'b', b'c']);
        data.extend_from_slice(&[9, 9, 9, 9]);
        let mut cursor = WireCursor::new(&data);
        cursor.skip_value(1, WireType::Varint).unwrap();
        assert_eq!(cursor.position(), 2);
        cursor.skip_value(1, WireType::Fixed64).unwrap();
        assert_eq!(cursor.position(), 10);
        cursor.skip_value(1, WireType::LengthDelimited).unwrap();
        assert_eq!(cursor.position(), 14);
        cursor.skip_value(1, WireType::Fixed32).unwrap();
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_skip_group() {
        // group 5 { field 1 varint 7; group 6 { } } then field 2 varint 1
        let data = [0x2B, 0x08, 0x07, 0x33, 0x34, 0x2C, 0x10, 0x01];
        let mut cursor = WireCursor::new(&data);
        let (number, wire_type) = cursor.read_tag().unwrap();
        assert_eq!((number, wire_type), (5, WireType::StartGroup));
        cursor.skip_value(number, wire_type).unwrap();
        assert_eq!(cursor.read_tag().unwrap(), (2, WireType::Varint));
        assert_eq!(cursor.read_varint().unwrap(), 1);
    }

    #[test]
    fn test_unterminated_group() {
        let data = [0x2B, 0x08, 0x07];
        let mut cursor = WireCursor::new(&data);
        let (number, wire_type) = cursor.read_tag().unwrap();
        assert!(cursor.skip_value(number, wire_type).unwrap_err().is_truncation());
    }

    #[test]
    fn test_deeply_nested_groups() {
        // 200k start-group tags for field 3 and no end tags.
        let data = vec![0x1B; 200_000];
        let mut cursor = WireCursor::new(&data);
        let (number, wire_type) = cursor.read_tag().unwrap();
        assert!(cursor.skip_value(number, wire_type).unwrap_err().is_truncation());

        // The same depth, properly closed.
        let mut data = vec![0x1B; 50_000];
        data.extend(std::iter::repeat(0x1C).take(50_000));
        data.extend([0x08, 0x01]);
        let mut cursor = WireCursor::new(&data);
        let (number, wire_type) = cursor.read_tag().unwrap();
        cursor.skip_value(number, wire_type).unwrap();
        assert_eq!(cursor.read_tag().unwrap(), (1, WireType::Varint));
    }

    #[test]
    fn test_mismatched_end_group() {
        // Group 3 opened, group 4 closed.
        let data = [0x1B, 0x24];
        let mut cursor = WireCursor::new(&data);
        let (number, wire_type) = cursor.read_tag().unwrap();
        assert!(matches!(
            cursor.skip_value(number, wire_type),
            Err(CodecError::InvalidWireType { field_number: 4, wire_type: 4, .. })
        ));
    }

    #[test]
    fn test_slice_from() {
        let data = [0x08, 0x2A, 0x10, 0x01];
        let mut cursor = WireCursor::new(&data);
        let start = cursor.position();
        cursor.read_tag().unwrap();
        cursor.read_varint().unwrap();
        assert_eq!(cursor.slice_from(start), &[0x08, 0x2A]);
    }
}
