// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Interop tests: bytes produced by prost-generated types must decode with the
//! dynamic codec and vice versa.

mod common;

use std::collections::HashMap;

use common::{fixture_path, fixture_registry};
use dynproto::{CodecOptions, DynamicValue, SchemaRegistry, SchemaRegistryBuilder};
use prost::Message;

/// Mirrors `demo.Person` in `tests/fixtures/person.proto`, unpacked.
#[derive(Clone, PartialEq, Message)]
struct Person {
    #[prost(int32, tag = "1")]
    id: i32,
    #[prost(string, tag = "2")]
    name: String,
    #[prost(int32, repeated, packed = "false", tag = "3")]
    lucky_numbers: Vec<i32>,
    #[prost(double, tag = "4")]
    height: f64,
    #[prost(bool, tag = "5")]
    active: bool,
    #[prost(fixed32, tag = "6")]
    checksum: u32,
    #[prost(sint32, tag = "7")]
    delta: i32,
    #[prost(map = "int32, string", tag = "8")]
    nicknames: HashMap<i32, String>,
}

/// Same field layout with the proto3 default (packed) repeated encoding.
#[derive(Clone, PartialEq, Message)]
struct PackedPerson {
    #[prost(int32, tag = "1")]
    id: i32,
    #[prost(int32, repeated, tag = "3")]
    lucky_numbers: Vec<i32>,
}

#[derive(Clone, PartialEq, Message)]
struct Int32Value {
    #[prost(int32, tag = "1")]
    value: i32,
}

#[derive(Clone, PartialEq, Message)]
struct User {
    #[prost(int64, tag = "1")]
    id: i64,
    #[prost(string, tag = "2")]
    display_name: String,
    #[prost(int32, tag = "3")]
    role: i32,
}

#[derive(Clone, PartialEq, Message)]
struct Post {
    #[prost(string, tag = "1")]
    title: String,
    #[prost(message, optional, tag = "2")]
    author: Option<User>,
    #[prost(string, repeated, tag = "5")]
    tags: Vec<String>,
    #[prost(message, optional, tag = "6")]
    rating: Option<Int32Value>,
    #[prost(bytes = "vec", tag = "7")]
    cover: Vec<u8>,
}

fn person_registry() -> SchemaRegistry {
    let mut builder = SchemaRegistryBuilder::new();
    builder.load_schema(fixture_path("person.proto")).unwrap();
    builder.build()
}

#[test]
fn test_person_bytes_match_prost() {
    let registry = person_registry();
    let record = DynamicValue::record([("id", DynamicValue::Int32(42)), ("name", "Al".into())]);
    let ours = registry
        .encode_message("demo.Person", record.as_record().unwrap(), &CodecOptions::default())
        .unwrap();

    let theirs = Person {
        id: 42,
        name: "Al".to_string(),
        ..Default::default()
    }
    .encode_to_vec();

    assert_eq!(ours, vec![0x08, 0x2A, 0x12, 0x02, 0x41, 0x6C]);
    assert_eq!(ours, theirs);
}

#[test]
fn test_negative_and_zigzag_match_prost() {
    let registry = person_registry();
    let record = DynamicValue::record([
        ("id", DynamicValue::Int32(-1)),
        ("delta", DynamicValue::Int32(-64)),
        ("checksum", DynamicValue::UInt32(0xDEADBEEF)),
    ]);
    let ours = registry
        .encode_message("demo.Person", record.as_record().unwrap(), &CodecOptions::default())
        .unwrap();
    let theirs = Person {
        id: -1,
        delta: -64,
        checksum: 0xDEADBEEF,
        ..Default::default()
    }
    .encode_to_vec();
    assert_eq!(ours, theirs);
    // Tag plus ten-byte varint.
    assert_eq!(&ours[..11], &[0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
}

#[test]
fn test_prost_bytes_decode_dynamically() {
    let registry = person_registry();
    let person = Person {
        id: 7,
        name: "Zed".to_string(),
        lucky_numbers: vec![3, -5, 1 << 20],
        height: 1.75,
        active: true,
        checksum: 99,
        delta: -2,
        nicknames: HashMap::from([(1, "z".to_string()), (2, "zz".to_string())]),
    };
    let decoded = registry
        .decode_message("demo.Person", &person.encode_to_vec(), &CodecOptions::default())
        .unwrap();

    assert_eq!(decoded["id"], DynamicValue::Int32(7));
    assert_eq!(decoded["name"], DynamicValue::from("Zed"));
    assert_eq!(
        decoded["lucky_numbers"],
        DynamicValue::Array(vec![
            DynamicValue::Int32(3),
            DynamicValue::Int32(-5),
            DynamicValue::Int32(1 << 20)
        ])
    );
    assert_eq!(decoded["height"], DynamicValue::Float64(1.75));
    assert_eq!(decoded["active"], DynamicValue::Bool(true));
    assert_eq!(decoded["checksum"], DynamicValue::UInt32(99));
    assert_eq!(decoded["delta"], DynamicValue::Int32(-2));
    assert_eq!(decoded["nicknames"], DynamicValue::map([(1, "z"), (2, "zz")]));
}

#[test]
fn test_packed_repeated_from_prost() {
    let registry = person_registry();
    let packed = PackedPerson {
        id: 1,
        lucky_numbers: vec![1, 2, 300],
    }
    .encode_to_vec();
    // Field 3 arrives as one length-delimited run.
    assert_eq!(&packed[2..4], &[0x1A, 0x04]);

    let decoded = registry
        .decode_message("demo.Person", &packed, &CodecOptions::default())
        .unwrap();
    assert_eq!(
        decoded["lucky_numbers"],
        DynamicValue::Array(vec![
            DynamicValue::Int32(1),
            DynamicValue::Int32(2),
            DynamicValue::Int32(300)
        ])
    );
}

#[test]
fn test_dynamic_bytes_decode_with_prost() {
    let registry = person_registry();
    let record = DynamicValue::record([
        ("id", DynamicValue::Int32(5)),
        (
            "lucky_numbers",
            DynamicValue::Array(vec![DynamicValue::Int32(8), DynamicValue::Int32(-8)]),
        ),
        ("height", DynamicValue::Float64(-0.5)),
        ("nicknames", DynamicValue::map([(10, "ten")])),
    ]);
    let ours = registry
        .encode_message("demo.Person", record.as_record().unwrap(), &CodecOptions::default())
        .unwrap();

    let person = Person::decode(ours.as_slice()).unwrap();
    assert_eq!(person.id, 5);
    assert_eq!(person.lucky_numbers, vec![8, -8]);
    assert_eq!(person.height, -0.5);
    assert_eq!(person.nicknames.get(&10).map(String::as_str), Some("ten"));
}

#[test]
fn test_nested_messages_and_wrappers_interop() {
    let registry = fixture_registry();
    let post = Post {
        title: "t".to_string(),
        author: Some(User {
            id: 9,
            display_name: "nina".to_string(),
            role: 1,
        }),
        tags: vec!["a".to_string(), "b".to_string()],
        rating: Some(Int32Value { value: 4 }),
        cover: vec![0, 1, 2],
    };

    let options = CodecOptions::default().with_unwrap_wrappers(true);
    let decoded = registry
        .decode_message("blog.Post", &post.encode_to_vec(), &options)
        .unwrap();
    assert_eq!(decoded["rating"], DynamicValue::Int32(4));
    assert_eq!(
        decoded["author"],
        DynamicValue::record([
            ("id", DynamicValue::Int64(9)),
            ("display_name", DynamicValue::from("nina")),
            ("role", DynamicValue::Int32(1)),
        ])
    );

    // A bare scalar is accepted for a wrapper field on encode.
    let mut record = decoded.clone();
    record.insert("rating".to_string(), DynamicValue::Int32(4));
    let ours = registry
        .encode_message("blog.Post", &record, &CodecOptions::default())
        .unwrap();
    assert_eq!(Post::decode(ours.as_slice()).unwrap(), post);
}
