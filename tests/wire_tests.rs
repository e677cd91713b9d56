// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire-format primitive tests against known byte sequences.

use dynproto::encoding::protobuf::wire::{
    decode_varint, encode_varint, make_tag, parse_tag, zigzag_decode, zigzag_encode,
    MAX_FIELD_NUMBER,
};
use dynproto::encoding::protobuf::{WireCursor, WireType, WireWriter};
use dynproto::{CodecError, ErrorCategory};

#[test]
fn test_varint_known_encodings() {
    assert_eq!(encode_varint(0), vec![0x00]);
    assert_eq!(encode_varint(1), vec![0x01]);
    assert_eq!(encode_varint(150), vec![0x96, 0x01]);
    assert_eq!(encode_varint(300), vec![0xAC, 0x02]);
    assert_eq!(encode_varint(u64::MAX).len(), 10);
    assert_eq!(encode_varint(-1i64 as u64).len(), 10);

    assert_eq!(decode_varint(&[0x96, 0x01], 0).unwrap(), (150, 2));
    assert_eq!(decode_varint(&[0xFF, 0xAC, 0x02], 1).unwrap(), (300, 3));
}

#[test]
fn test_varint_errors() {
    assert_eq!(
        decode_varint(&[0x80, 0x80], 0).unwrap_err(),
        CodecError::UnexpectedEndOfData { position: 2 }
    );
    let eleven = [0xFF; 11];
    assert_eq!(
        decode_varint(&eleven, 0).unwrap_err(),
        CodecError::VarintTooLong { position: 0 }
    );

    // Ten bytes, but the last one sets bits above 64.
    let overflow = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
    let err = decode_varint(&overflow, 0).unwrap_err();
    assert_eq!(err, CodecError::VarintOverflow { position: 0 });
    assert_eq!(err.category(), ErrorCategory::Wire);
}

#[test]
fn test_zigzag_pairs() {
    for (signed, unsigned) in [(0i64, 0u64), (-1, 1), (1, 2), (-2, 3), (2147483647, 4294967294)] {
        assert_eq!(zigzag_encode(signed), unsigned);
        assert_eq!(zigzag_decode(unsigned), signed);
    }
    assert_eq!(zigzag_decode(zigzag_encode(i64::MIN)), i64::MIN);
}

#[test]
fn test_tags() {
    assert_eq!(make_tag(1, WireType::Varint), 0x08);
    assert_eq!(make_tag(2, WireType::LengthDelimited), 0x12);
    assert_eq!(parse_tag(0x08), Some((1, WireType::Varint)));
    assert_eq!(parse_tag(0x07), None);
    assert_eq!(parse_tag(0x0E), None);
    assert_eq!(
        parse_tag(make_tag(MAX_FIELD_NUMBER, WireType::Fixed32)),
        Some((MAX_FIELD_NUMBER, WireType::Fixed32))
    );
}

#[test]
fn test_writer_then_cursor() {
    let mut writer = WireWriter::new();
    writer
        .tag(1, WireType::Varint)
        .varint(42)
        .tag(2, WireType::LengthDelimited)
        .bytes(b"Al")
        .tag(3, WireType::Fixed32)
        .fixed32(7)
        .tag(4, WireType::Fixed64)
        .fixed64(1.5f64.to_bits());
    let data = writer.finish();
    assert_eq!(&data[..6], &[0x08, 0x2A, 0x12, 0x02, 0x41, 0x6C]);

    let mut cursor = WireCursor::new(&data);
    assert_eq!(cursor.read_tag().unwrap(), (1, WireType::Varint));
    assert_eq!(cursor.read_varint().unwrap(), 42);
    assert_eq!(cursor.read_tag().unwrap(), (2, WireType::LengthDelimited));
    assert_eq!(cursor.read_length_delimited().unwrap(), b"Al");
    assert_eq!(cursor.read_tag().unwrap(), (3, WireType::Fixed32));
    assert_eq!(cursor.read_fixed32().unwrap(), 7);
    assert_eq!(cursor.read_tag().unwrap(), (4, WireType::Fixed64));
    assert_eq!(f64::from_bits(cursor.read_fixed64().unwrap()), 1.5);
    assert!(cursor.is_at_end());
}

#[test]
fn test_truncation_errors_are_wire_errors() {
    // Length prefix says 5, only 2 bytes follow.
    let mut cursor = WireCursor::new(&[0x12, 0x05, 0x41, 0x6C]);
    cursor.read_tag().unwrap();
    let err = cursor.read_length_delimited().unwrap_err();
    assert!(matches!(err, CodecError::TruncatedBytes { .. }));
    assert_eq!(err.category(), ErrorCategory::Wire);
    assert!(err.is_truncation());

    let mut cursor = WireCursor::new(&[0x01, 0x02]);
    let err = cursor.read_fixed32().unwrap_err();
    assert!(matches!(err, CodecError::TruncatedFixedWidth { .. }));
}

#[test]
fn test_skip_values() {
    let mut writer = WireWriter::new();
    writer
        .tag(9, WireType::Varint)
        .varint(300)
        .tag(9, WireType::LengthDelimited)
        .bytes(&[1, 2, 3])
        .tag(9, WireType::StartGroup)
        .tag(1, WireType::Varint)
        .varint(5)
        .tag(9, WireType::EndGroup)
        .tag(1, WireType::Varint)
        .varint(1);
    let data = writer.finish();

    let mut cursor = WireCursor::new(&data);
    for _ in 0..3 {
        let (number, wire_type) = cursor.read_tag().unwrap();
        cursor.skip_value(number, wire_type).unwrap();
    }
    assert_eq!(cursor.read_tag().unwrap(), (1, WireType::Varint));
    assert_eq!(cursor.read_varint().unwrap(), 1);
}

#[test]
fn test_unassigned_wire_type_rejected() {
    // Field 1, wire type 7.
    let mut cursor = WireCursor::new(&[0x0F, 0x00]);
    assert!(matches!(
        cursor.read_tag(),
        Err(CodecError::InvalidWireType { wire_type: 7, .. })
    ));
    // Field number 0.
    let mut cursor = WireCursor::new(&[0x00]);
    assert!(matches!(
        cursor.read_tag(),
        Err(CodecError::InvalidFieldNumber { number: 0, .. })
    ));
}
