// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encode/decode tests through the registry, using the fixture schemas.

mod common;

use std::collections::HashMap;

use common::{fixture_registry, registry_from};
use dynproto::encoding::protobuf::{ProtobufCodec, UNKNOWN_FIELDS_KEY};
use dynproto::{CodecError, CodecOptions, DynamicValue, ErrorCategory, Record};

fn user(id: i64, name: &str, role: i32) -> DynamicValue {
    DynamicValue::record([
        ("id", DynamicValue::Int64(id)),
        ("display_name", DynamicValue::from(name)),
        ("role", DynamicValue::Int32(role)),
    ])
}

fn sample_post() -> DynamicValue {
    DynamicValue::record([
        ("title", DynamicValue::from("Dynamic codecs")),
        ("author", user(1, "ann", 2)),
        (
            "comments",
            DynamicValue::Array(vec![
                DynamicValue::record([
                    ("author", user(2, "bo", 0)),
                    ("text", DynamicValue::from("nice")),
                    ("score", DynamicValue::Int64(-3)),
                ]),
                DynamicValue::record([
                    ("author", user(3, "cy", 1)),
                    ("text", DynamicValue::from("+1")),
                    ("score", DynamicValue::Int64(7)),
                ]),
            ]),
        ),
        ("votes", DynamicValue::map([("ann", 3), ("bo", -1)])),
        (
            "tags",
            DynamicValue::Array(vec!["rust".into(), "protobuf".into()]),
        ),
        ("rating", DynamicValue::record([("value", 5)])),
        ("cover", DynamicValue::Bytes(vec![0x89, 0x50, 0x4E, 0x47])),
        ("markdown", DynamicValue::from("# hi")),
    ])
}

#[test]
fn test_post_round_trip() {
    let registry = fixture_registry();
    let options = CodecOptions::default();
    let post = sample_post();

    let bytes = registry
        .encode_message("blog.Post", post.as_record().unwrap(), &options)
        .unwrap();
    let decoded = registry.decode_message("blog.Post", &bytes, &options).unwrap();
    assert_eq!(DynamicValue::Record(decoded), post);
}

#[test]
fn test_encoding_is_deterministic() {
    let registry = fixture_registry();
    let options = CodecOptions::default();
    let post = sample_post();
    let record = post.as_record().unwrap();

    // Same content, different insertion order.
    let mut shuffled: Record = HashMap::new();
    let mut keys: Vec<_> = record.keys().cloned().collect();
    keys.reverse();
    for key in keys {
        shuffled.insert(key.clone(), record[&key].clone());
    }

    let a = registry.encode_message("blog.Post", record, &options).unwrap();
    let b = registry.encode_message("blog.Post", &shuffled, &options).unwrap();
    assert_eq!(a, b);
    // Field 1 (title) comes first.
    assert_eq!(a[0], 0x0A);
}

#[test]
fn test_unwrap_wrappers_on_decode() {
    let registry = fixture_registry();
    let post = DynamicValue::record([("rating", DynamicValue::record([("value", 0)]))]);
    let bytes = registry
        .encode_message("blog.Post", post.as_record().unwrap(), &CodecOptions::default())
        .unwrap();
    // Inner zero is emitted, so the wrapper is present with a value.
    assert_eq!(bytes, vec![0x32, 0x02, 0x08, 0x00]);

    let unwrap = CodecOptions::default().with_unwrap_wrappers(true);
    let decoded = registry.decode_message("blog.Post", &bytes, &unwrap).unwrap();
    assert_eq!(decoded["rating"], DynamicValue::Int32(0));

    // Present but empty wrapper still unwraps to the zero value.
    let decoded = registry
        .decode_message("blog.Post", &[0x32, 0x00], &unwrap)
        .unwrap();
    assert_eq!(decoded["rating"], DynamicValue::Int32(0));

    // Absent wrapper stays absent.
    let decoded = registry.decode_message("blog.Post", &[], &unwrap).unwrap();
    assert!(!decoded.contains_key("rating"));
}

#[test]
fn test_populate_defaults() {
    let registry = fixture_registry();
    let options = CodecOptions::default().with_populate_defaults(true);
    let decoded = registry.decode_message("common.User", &[], &options).unwrap();
    assert_eq!(decoded["id"], DynamicValue::Int64(0));
    assert_eq!(decoded["display_name"], DynamicValue::from(""));
    assert_eq!(decoded["role"], DynamicValue::Int32(0));

    let post = registry.decode_message("blog.Post", &[], &options).unwrap();
    assert!(!post.contains_key("text"));
    assert!(!post.contains_key("markdown"));
}

#[test]
fn test_unknown_bytes_survive_round_trip() {
    let registry = fixture_registry();
    // id = 1, then unknown field 15 (varint 150), then display_name = "x".
    let original = vec![0x08, 0x01, 0x78, 0x96, 0x01, 0x12, 0x01, 0x78];

    let keep = CodecOptions::default().with_preserve_unknown_bytes(true);
    let decoded = registry.decode_message("common.User", &original, &keep).unwrap();
    assert_eq!(
        decoded[UNKNOWN_FIELDS_KEY],
        DynamicValue::Bytes(vec![0x78, 0x96, 0x01])
    );

    let encoded = registry.encode_message("common.User", &decoded, &keep).unwrap();
    assert_eq!(encoded, vec![0x08, 0x01, 0x12, 0x01, 0x78, 0x78, 0x96, 0x01]);

    let lenient = registry
        .decode_message("common.User", &original, &CodecOptions::default())
        .unwrap();
    assert!(!lenient.contains_key(UNKNOWN_FIELDS_KEY));
}

#[test]
fn test_strict_encode_errors_carry_paths() {
    let registry = fixture_registry();
    let strict = CodecOptions::strict();

    let post = DynamicValue::record([(
        "comments",
        DynamicValue::Array(vec![
            DynamicValue::record([("text", "ok")]),
            DynamicValue::record([("author", DynamicValue::record([("nickname", "x")]))]),
        ]),
    )]);
    let err = registry
        .encode_message("blog.Post", post.as_record().unwrap(), &strict)
        .unwrap_err();
    assert_eq!(err.field_path(), Some("comments[1].author"));
    assert!(matches!(err.root_cause(), CodecError::UnknownFieldName { .. }));
    assert_eq!(err.category(), ErrorCategory::Value);

    let both = DynamicValue::record([("text", "a"), ("markdown", "b")]);
    assert!(matches!(
        registry.encode_message("blog.Post", both.as_record().unwrap(), &strict),
        Err(CodecError::OneofConflict { .. })
    ));
    // Lenient mode emits both members.
    assert!(registry
        .encode_message("blog.Post", both.as_record().unwrap(), &CodecOptions::default())
        .is_ok());
}

#[test]
fn test_json_alias_and_enum_names() {
    let registry = fixture_registry();
    let options = CodecOptions::default();

    let by_alias = DynamicValue::record([("postTitle", "hello")]);
    let by_name = DynamicValue::record([("title", "hello")]);
    assert_eq!(
        registry
            .encode_message("blog.PostRequest", by_alias.as_record().unwrap(), &options)
            .unwrap(),
        registry
            .encode_message("blog.PostRequest", by_name.as_record().unwrap(), &options)
            .unwrap()
    );

    let named = DynamicValue::record([("role", "ROLE_ADMIN")]);
    let bytes = registry
        .encode_message("common.User", named.as_record().unwrap(), &options)
        .unwrap();
    assert_eq!(bytes, vec![0x18, 0x02]);

    let unknown = DynamicValue::record([("role", "ROLE_OWNER")]);
    let err = registry
        .encode_message("common.User", unknown.as_record().unwrap(), &options)
        .unwrap_err();
    assert_eq!(err.field_path(), Some("role"));
}

#[test]
fn test_unknown_enum_number() {
    let registry = fixture_registry();
    // role = 9
    let bytes = [0x18, 0x09];
    assert!(matches!(
        registry.decode_message("common.User", &bytes, &CodecOptions::default()),
        Err(CodecError::UnknownEnumValue { .. })
    ));
    let allow = CodecOptions::default().with_allow_unknown_enum_numbers(true);
    let decoded = registry.decode_message("common.User", &bytes, &allow).unwrap();
    assert_eq!(decoded["role"], DynamicValue::Int32(9));
}

#[test]
fn test_recursion_limit_on_both_sides() {
    let registry = registry_from(&[(
        "list.proto",
        "syntax = \"proto3\"; message Link { int32 v = 1; Link next = 2; }",
    )]);

    let mut chain = DynamicValue::record([("v", 0)]);
    for i in 1..=10 {
        chain = DynamicValue::record([("v", DynamicValue::Int32(i)), ("next", chain)]);
    }

    let options = CodecOptions::default();
    let bytes = registry
        .encode_message("Link", chain.as_record().unwrap(), &options)
        .unwrap();

    let shallow = options.with_recursion_limit(5);
    assert!(matches!(
        registry
            .encode_message("Link", chain.as_record().unwrap(), &shallow)
            .map_err(|e| e.root_cause().clone()),
        Err(CodecError::RecursionLimitExceeded { .. })
    ));
    assert!(matches!(
        registry.decode_message("Link", &bytes, &shallow),
        Err(CodecError::RecursionLimitExceeded { .. })
    ));
    assert!(registry.decode_message("Link", &bytes, &options).is_ok());
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = fixture_registry();
    let post = sample_post();
    let bytes = registry
        .encode_message("blog.Post", post.as_record().unwrap(), &CodecOptions::default())
        .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let codec = ProtobufCodec::new(&registry);
                let decoded = codec.decode_by_name("blog.Post", &bytes).unwrap();
                assert_eq!(DynamicValue::Record(decoded), post);
            });
        }
    });
}

const SCALARS: &str = r#"
syntax = "proto3";
package demo;
message Scalars {
    double f64 = 1;
    float f32 = 2;
    int32 i32 = 3;
    int64 i64 = 4;
    uint32 u32 = 5;
    uint64 u64 = 6;
    sint32 s32 = 7;
    sint64 s64 = 8;
    fixed32 x32 = 9;
    fixed64 x64 = 10;
    sfixed32 sx32 = 11;
    sfixed64 sx64 = 12;
    bool flag = 13;
    string text = 14;
    bytes blob = 15;
}
"#;

fn scalars(
    f64v: f64,
    f32v: f32,
    int: (i32, i64),
    uint: (u32, u64),
    flag: bool,
) -> DynamicValue {
    DynamicValue::record([
        ("f64", DynamicValue::Float64(f64v)),
        ("f32", DynamicValue::Float32(f32v)),
        ("i32", DynamicValue::Int32(int.0)),
        ("i64", DynamicValue::Int64(int.1)),
        ("u32", DynamicValue::UInt32(uint.0)),
        ("u64", DynamicValue::UInt64(uint.1)),
        ("s32", DynamicValue::Int32(int.0)),
        ("s64", DynamicValue::Int64(int.1)),
        ("x32", DynamicValue::UInt32(uint.0)),
        ("x64", DynamicValue::UInt64(uint.1)),
        ("sx32", DynamicValue::Int32(int.0)),
        ("sx64", DynamicValue::Int64(int.1)),
        ("flag", DynamicValue::Bool(flag)),
        ("text", DynamicValue::from(if flag { "ünïcode" } else { "" })),
        ("blob", DynamicValue::Bytes(if flag { vec![0, 255] } else { vec![] })),
    ])
}

#[test]
fn test_scalar_extremes_round_trip() {
    let registry = registry_from(&[("scalars.proto", SCALARS)]);
    let options = CodecOptions::default();

    for value in [
        scalars(0.0, 0.0, (0, 0), (0, 0), false),
        scalars(f64::MIN, f32::MIN, (i32::MIN, i64::MIN), (u32::MIN, u64::MIN), true),
        scalars(f64::MAX, f32::MAX, (i32::MAX, i64::MAX), (u32::MAX, u64::MAX), true),
        scalars(
            f64::INFINITY,
            f32::NEG_INFINITY,
            (-1, -1),
            (1 << 31, 1 << 63),
            true,
        ),
    ] {
        let bytes = registry
            .encode_message("demo.Scalars", value.as_record().unwrap(), &options)
            .unwrap();
        let decoded = registry.decode_message("demo.Scalars", &bytes, &options).unwrap();
        assert_eq!(DynamicValue::Record(decoded), value);
    }

    // NaN never compares equal, so check the decoded kind directly.
    let nan = DynamicValue::record([
        ("f64", DynamicValue::Float64(f64::NAN)),
        ("f32", DynamicValue::Float32(f32::NAN)),
    ]);
    let bytes = registry
        .encode_message("demo.Scalars", nan.as_record().unwrap(), &options)
        .unwrap();
    let decoded = registry.decode_message("demo.Scalars", &bytes, &options).unwrap();
    assert!(matches!(decoded["f64"], DynamicValue::Float64(v) if v.is_nan()));
    assert!(matches!(decoded["f32"], DynamicValue::Float32(v) if v.is_nan()));
}

#[test]
fn test_map_order_and_empty_map() {
    let registry = fixture_registry();
    let options = CodecOptions::default();

    let forward = DynamicValue::record([(
        "votes",
        DynamicValue::map([("a", 1), ("b", 2), ("c", 3)]),
    )]);
    let backward = DynamicValue::record([(
        "votes",
        DynamicValue::map([("c", 3), ("b", 2), ("a", 1)]),
    )]);
    let a = registry
        .encode_message("blog.Post", forward.as_record().unwrap(), &options)
        .unwrap();
    let b = registry
        .encode_message("blog.Post", backward.as_record().unwrap(), &options)
        .unwrap();
    assert_eq!(a, b);
    let decoded = registry.decode_message("blog.Post", &a, &options).unwrap();
    assert_eq!(DynamicValue::Record(decoded), forward);

    let empty = DynamicValue::record([(
        "votes",
        DynamicValue::Map(Default::default()),
    )]);
    let bytes = registry
        .encode_message("blog.Post", empty.as_record().unwrap(), &options)
        .unwrap();
    assert!(bytes.is_empty());
    let decoded = registry.decode_message("blog.Post", &bytes, &options).unwrap();
    assert!(!decoded.contains_key("votes"));
}

#[test]
fn test_deeply_nested_groups_fail_cleanly() {
    let registry = registry_from(&[(
        "person.proto",
        "syntax = \"proto3\"; message Person { int32 id = 1; repeated int32 lucky = 3; }",
    )]);
    // Field 3 as start-group repeated: a known field with the wrong wire type.
    let known = vec![0x1B; 200_000];
    // Field 9 as start-group repeated: an unknown field.
    let unknown = vec![0x4B; 200_000];

    for data in [known, unknown] {
        let err = registry
            .decode_message("Person", &data, &CodecOptions::default())
            .unwrap_err();
        assert!(err.is_truncation());
        assert_eq!(err.category(), ErrorCategory::Wire);
    }
}
