// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Resolved schema descriptors.
//!
//! Descriptors are produced by the registry from the parsed AST. Every type
//! reference has been pinned to a fully-qualified message, enum or wrapper, so
//! the codec can dispatch on [`TypeDescriptor`] with an exhaustive match.
//! Descriptors are immutable once the registry is built.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::core::DynamicValue;
use crate::encoding::protobuf::wire::WireType;

/// Built-in scalar field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarKind {
    /// Parse a scalar keyword as written in a schema.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "double" => ScalarKind::Double,
            "float" => ScalarKind::Float,
            "int32" => ScalarKind::Int32,
            "int64" => ScalarKind::Int64,
            "uint32" => ScalarKind::UInt32,
            "uint64" => ScalarKind::UInt64,
            "sint32" => ScalarKind::SInt32,
            "sint64" => ScalarKind::SInt64,
            "fixed32" => ScalarKind::Fixed32,
            "fixed64" => ScalarKind::Fixed64,
            "sfixed32" => ScalarKind::SFixed32,
            "sfixed64" => ScalarKind::SFixed64,
            "bool" => ScalarKind::Bool,
            "string" => ScalarKind::String,
            "bytes" => ScalarKind::Bytes,
            _ => return None,
        })
    }

    /// Schema keyword for this kind.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::SInt32 => "sint32",
            ScalarKind::SInt64 => "sint64",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::SFixed32 => "sfixed32",
            ScalarKind::SFixed64 => "sfixed64",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }

    /// Wire type used for a single value of this kind.
    pub fn wire_type(self) -> WireType {
        match self {
            ScalarKind::Int32
            | ScalarKind::Int64
            | ScalarKind::UInt32
            | ScalarKind::UInt64
            | ScalarKind::SInt32
            | ScalarKind::SInt64
            | ScalarKind::Bool => WireType::Varint,
            ScalarKind::Fixed64 | ScalarKind::SFixed64 | ScalarKind::Double => WireType::Fixed64,
            ScalarKind::Fixed32 | ScalarKind::SFixed32 | ScalarKind::Float => WireType::Fixed32,
            ScalarKind::String | ScalarKind::Bytes => WireType::LengthDelimited,
        }
    }

    /// Check if repeated values of this kind may appear packed.
    pub fn is_packable(self) -> bool {
        self.wire_type() != WireType::LengthDelimited
    }

    /// Check if this kind is allowed as a map key.
    pub fn is_valid_map_key(self) -> bool {
        !matches!(
            self,
            ScalarKind::Double | ScalarKind::Float | ScalarKind::Bytes
        )
    }

    /// Zero value of this kind.
    pub fn default_value(self) -> DynamicValue {
        match self {
            ScalarKind::Double => DynamicValue::Float64(0.0),
            ScalarKind::Float => DynamicValue::Float32(0.0),
            ScalarKind::Int32 | ScalarKind::SInt32 | ScalarKind::SFixed32 => DynamicValue::Int32(0),
            ScalarKind::Int64 | ScalarKind::SInt64 | ScalarKind::SFixed64 => DynamicValue::Int64(0),
            ScalarKind::UInt32 | ScalarKind::Fixed32 => DynamicValue::UInt32(0),
            ScalarKind::UInt64 | ScalarKind::Fixed64 => DynamicValue::UInt64(0),
            ScalarKind::Bool => DynamicValue::Bool(false),
            ScalarKind::String => DynamicValue::String(String::new()),
            ScalarKind::Bytes => DynamicValue::Bytes(Vec::new()),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The nine well-known scalar wrapper messages of `google/protobuf/wrappers.proto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WrapperKind {
    Double,
    Float,
    Int64,
    UInt64,
    Int32,
    UInt32,
    Bool,
    String,
    Bytes,
}

impl WrapperKind {
    /// Every wrapper kind.
    pub const ALL: [WrapperKind; 9] = [
        WrapperKind::Double,
        WrapperKind::Float,
        WrapperKind::Int64,
        WrapperKind::UInt64,
        WrapperKind::Int32,
        WrapperKind::UInt32,
        WrapperKind::Bool,
        WrapperKind::String,
        WrapperKind::Bytes,
    ];

    /// Scalar held in the wrapper's `value` field (number 1).
    pub fn inner(self) -> ScalarKind {
        match self {
            WrapperKind::Double => ScalarKind::Double,
            WrapperKind::Float => ScalarKind::Float,
            WrapperKind::Int64 => ScalarKind::Int64,
            WrapperKind::UInt64 => ScalarKind::UInt64,
            WrapperKind::Int32 => ScalarKind::Int32,
            WrapperKind::UInt32 => ScalarKind::UInt32,
            WrapperKind::Bool => ScalarKind::Bool,
            WrapperKind::String => ScalarKind::String,
            WrapperKind::Bytes => ScalarKind::Bytes,
        }
    }

    /// Unqualified message name, e.g. `Int32Value`.
    pub fn short_name(self) -> &'static str {
        match self {
            WrapperKind::Double => "DoubleValue",
            WrapperKind::Float => "FloatValue",
            WrapperKind::Int64 => "Int64Value",
            WrapperKind::UInt64 => "UInt64Value",
            WrapperKind::Int32 => "Int32Value",
            WrapperKind::UInt32 => "UInt32Value",
            WrapperKind::Bool => "BoolValue",
            WrapperKind::String => "StringValue",
            WrapperKind::Bytes => "BytesValue",
        }
    }

    /// Fully-qualified message name, e.g. `google.protobuf.Int32Value`.
    pub fn full_name(self) -> String {
        format!("google.protobuf.{}", self.short_name())
    }

    /// Match a type reference against the wrapper names.
    ///
    /// Accepts the fully-qualified form (with or without a leading `.`).
    pub fn from_type_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix('.').unwrap_or(name);
        let short = name.strip_prefix("google.protobuf.")?;
        Self::ALL.into_iter().find(|k| k.short_name() == short)
    }
}

/// Resolved type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDescriptor {
    /// Built-in scalar
    Primitive { scalar: ScalarKind },
    /// Fully-qualified message name
    Message { name: String },
    /// Fully-qualified enum name
    Enum { name: String },
    /// `map<key, value>`, carried on the wire as repeated `entry` messages
    Map {
        key: ScalarKind,
        value: Box<TypeDescriptor>,
        /// Fully-qualified name of the synthetic entry message
        entry: String,
    },
    /// Well-known scalar wrapper
    Wrapper { wrapper: WrapperKind },
}

impl TypeDescriptor {
    /// Shorthand for a primitive type.
    pub fn primitive(scalar: ScalarKind) -> Self {
        TypeDescriptor::Primitive { scalar }
    }

    /// Shorthand for a message reference.
    pub fn message(name: impl Into<String>) -> Self {
        TypeDescriptor::Message { name: name.into() }
    }

    /// Shorthand for an enum reference.
    pub fn enumeration(name: impl Into<String>) -> Self {
        TypeDescriptor::Enum { name: name.into() }
    }

    /// Wire type used for a single (non-packed) value of this type.
    pub fn wire_type(&self) -> WireType {
        match self {
            TypeDescriptor::Primitive { scalar } => scalar.wire_type(),
            TypeDescriptor::Enum { .. } => WireType::Varint,
            TypeDescriptor::Message { .. }
            | TypeDescriptor::Map { .. }
            | TypeDescriptor::Wrapper { .. } => WireType::LengthDelimited,
        }
    }

    /// Check if this is a map type.
    pub fn is_map(&self) -> bool {
        matches!(self, TypeDescriptor::Map { .. })
    }

    /// Human-readable type name, as it would appear in a schema.
    pub fn display_name(&self) -> String {
        match self {
            TypeDescriptor::Primitive { scalar } => scalar.name().to_string(),
            TypeDescriptor::Message { name } | TypeDescriptor::Enum { name } => name.clone(),
            TypeDescriptor::Map { key, value, .. } => {
                format!("map<{}, {}>", key.name(), value.display_name())
            }
            TypeDescriptor::Wrapper { wrapper } => wrapper.full_name(),
        }
    }
}

/// Cardinality of a resolved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLabel {
    Optional,
    Required,
    Repeated,
}

/// A resolved field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Field number, unique within the owning message
    pub number: u32,
    /// `Repeated` is never used for map fields
    pub label: FieldLabel,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Index into [`MessageDescriptor::oneofs`], if the field is a oneof member
    pub oneof_index: Option<usize>,
    /// JSON alias (explicit `json_name` option or lowerCamelCase of `name`)
    pub json_name: String,
}

impl FieldDescriptor {
    /// Create an optional field with the default JSON alias.
    pub fn new(name: impl Into<String>, number: u32, ty: TypeDescriptor) -> Self {
        let name = name.into();
        Self {
            json_name: to_json_name(&name),
            name,
            number,
            label: FieldLabel::Optional,
            ty,
            oneof_index: None,
        }
    }

    /// Check if the field holds a list of values.
    pub fn is_repeated(&self) -> bool {
        self.label == FieldLabel::Repeated
    }

    /// Check if the field is a map.
    pub fn is_map(&self) -> bool {
        self.ty.is_map()
    }
}

/// Default JSON alias for a field name: underscores dropped, following letter upper-cased.
pub fn to_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// A `oneof` group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneofGroup {
    pub name: String,
    /// Member field numbers in declaration order
    pub fields: Vec<u32>,
}

/// A resolved message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDescriptor {
    /// Fully-qualified name
    pub name: String,
    /// Fields (including oneof members) sorted by number
    pub fields: Vec<FieldDescriptor>,
    pub oneofs: Vec<OneofGroup>,
    /// Fully-qualified names of nested messages
    pub nested_messages: Vec<String>,
    /// Fully-qualified names of nested enums
    pub nested_enums: Vec<String>,
    /// True only for synthetic map entry messages
    pub is_map_entry: bool,
    #[serde(skip)]
    by_number: HashMap<u32, usize>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl MessageDescriptor {
    /// Create a message from its fields. Fields are sorted by number.
    pub fn new(
        name: impl Into<String>,
        mut fields: Vec<FieldDescriptor>,
        oneofs: Vec<OneofGroup>,
    ) -> Self {
        fields.sort_by_key(|f| f.number);
        let mut by_number = HashMap::with_capacity(fields.len());
        let mut by_name = HashMap::with_capacity(fields.len() * 2);
        for (index, field) in fields.iter().enumerate() {
            by_number.insert(field.number, index);
            by_name.insert(field.json_name.clone(), index);
        }
        // Declared names take precedence over JSON aliases.
        for (index, field) in fields.iter().enumerate() {
            by_name.insert(field.name.clone(), index);
        }
        Self {
            name: name.into(),
            fields,
            oneofs,
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
            is_map_entry: false,
            by_number,
            by_name,
        }
    }

    /// Build the synthetic `key = 1; value = 2` entry message of a map field.
    pub fn map_entry(name: impl Into<String>, key: ScalarKind, value: TypeDescriptor) -> Self {
        let mut entry = Self::new(
            name,
            vec![
                FieldDescriptor::new("key", 1, TypeDescriptor::primitive(key)),
                FieldDescriptor::new("value", 2, value),
            ],
            Vec::new(),
        );
        entry.is_map_entry = true;
        entry
    }

    /// Unqualified name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Look up a field by number.
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.by_number.get(&number).map(|&i| &self.fields[i])
    }

    /// Look up a field by declared name or JSON alias.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Oneof group a field belongs to.
    pub fn oneof_of(&self, field: &FieldDescriptor) -> Option<&OneofGroup> {
        field.oneof_index.and_then(|i| self.oneofs.get(i))
    }
}

/// One value of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValueDescriptor {
    pub name: String,
    pub number: i32,
}

/// A resolved enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDescriptor {
    /// Fully-qualified name
    pub name: String,
    /// Values in declaration order
    pub values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    /// Create an enum from `(name, number)` pairs.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = (S, i32)>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|(name, number)| EnumValueDescriptor {
                    name: name.into(),
                    number,
                })
                .collect(),
        }
    }

    /// Check if the enum declares `number`.
    pub fn contains(&self, number: i32) -> bool {
        self.values.iter().any(|v| v.number == number)
    }

    /// First value name declared for `number`.
    pub fn name_of(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.number == number)
            .map(|v| v.name.as_str())
    }

    /// Number of the value called `name`.
    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|v| v.name == name).map(|v| v.number)
    }
}

/// A resolved `rpc` method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Fully-qualified input message name
    pub input_type: String,
    /// Fully-qualified output message name
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

/// A resolved service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    /// Fully-qualified name
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Read access to resolved descriptors by fully-qualified name.
///
/// The codec only depends on this trait, so it can run against a built
/// [`SchemaRegistry`](crate::schema::SchemaRegistry) or any other source of
/// descriptors.
pub trait DescriptorPool {
    /// Get a message (including map entries and wrapper messages) by full name.
    fn message(&self, full_name: &str) -> Option<&MessageDescriptor>;

    /// Get an enum by full name.
    fn enumeration(&self, full_name: &str) -> Option<&EnumDescriptor>;
}
