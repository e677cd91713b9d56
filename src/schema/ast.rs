// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for parsed `.proto` schema files.
//!
//! The AST mirrors the schema language: type references are kept exactly as
//! written and are only resolved when the file is added to a
//! [`SchemaRegistryBuilder`](crate::schema::SchemaRegistryBuilder).

/// Language level declared by `syntax = "..."` or `edition = "..."`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Syntax {
    /// `syntax = "proto2"` (also the default when nothing is declared)
    #[default]
    Proto2,
    /// `syntax = "proto3"`
    Proto3,
    /// `edition = "..."`
    Edition(String),
}

/// A parsed `.proto` file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoFile {
    /// File identity (path as loaded, or the name given to an in-memory source)
    pub name: String,
    pub syntax: Syntax,
    /// Dotted package name, if declared
    pub package: Option<String>,
    pub imports: Vec<Import>,
    /// File-level options, kept for display only
    pub options: Vec<OptionDecl>,
    pub messages: Vec<MessageDecl>,
    pub enums: Vec<EnumDecl>,
    pub services: Vec<ServiceDecl>,
}

impl ProtoFile {
    /// Create an empty file with the given identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the package name.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Add an ordinary import.
    pub fn with_import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(Import {
            path: path.into(),
            kind: ImportKind::Default,
        });
        self
    }

    /// Add a top-level message.
    pub fn with_message(mut self, message: MessageDecl) -> Self {
        self.messages.push(message);
        self
    }

    /// Add a top-level enum.
    pub fn with_enum(mut self, decl: EnumDecl) -> Self {
        self.enums.push(decl);
        self
    }

    /// Add a service.
    pub fn with_service(mut self, service: ServiceDecl) -> Self {
        self.services.push(service);
        self
    }
}

/// Kind of an `import` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Weak,
    Public,
}

/// An `import "path";` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    pub kind: ImportKind,
}

/// An `option name = value;` statement or a `[name = value]` field option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    /// Option name, including any parenthesised extension part
    pub name: String,
    /// Value as written (strings unquoted)
    pub value: String,
}

/// A `message` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageDecl {
    pub name: String,
    /// Fields outside any oneof, in declaration order
    pub fields: Vec<FieldDecl>,
    pub oneofs: Vec<OneofDecl>,
    /// Nested message declarations
    pub messages: Vec<MessageDecl>,
    /// Nested enum declarations
    pub enums: Vec<EnumDecl>,
}

impl MessageDecl {
    /// Create an empty message.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a oneof group.
    pub fn with_oneof(mut self, oneof: OneofDecl) -> Self {
        self.oneofs.push(oneof);
        self
    }

    /// Add a nested message.
    pub fn with_message(mut self, message: MessageDecl) -> Self {
        self.messages.push(message);
        self
    }

    /// Add a nested enum.
    pub fn with_enum(mut self, decl: EnumDecl) -> Self {
        self.enums.push(decl);
        self
    }

    /// Iterate over every field, including oneof members.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.fields
            .iter()
            .chain(self.oneofs.iter().flat_map(|o| o.fields.iter()))
    }
}

/// Cardinality written before a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldLabel {
    /// No label (proto3 singular)
    #[default]
    Implicit,
    Optional,
    Required,
    Repeated,
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTypeDecl {
    /// A scalar keyword or a (possibly dotted) type reference
    Named(String),
    /// `map<key, value>`
    Map { key: String, value: String },
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub number: u32,
    pub label: FieldLabel,
    pub ty: FieldTypeDecl,
    /// Options in `[...]` after the field number
    pub options: Vec<OptionDecl>,
}

impl FieldDecl {
    /// Create a singular field.
    pub fn new(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            label: FieldLabel::Implicit,
            ty: FieldTypeDecl::Named(type_name.into()),
            options: Vec::new(),
        }
    }

    /// Create a repeated field.
    pub fn repeated(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self {
            label: FieldLabel::Repeated,
            ..Self::new(name, number, type_name)
        }
    }

    /// Create a `map<key, value>` field.
    pub fn map(
        name: impl Into<String>,
        number: u32,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            number,
            label: FieldLabel::Implicit,
            ty: FieldTypeDecl::Map {
                key: key.into(),
                value: value.into(),
            },
            options: Vec::new(),
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: FieldLabel) -> Self {
        self.label = label;
        self
    }

    /// Add a `[name = value]` option.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(OptionDecl {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Explicit `json_name` option, if any.
    pub fn json_name(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == "json_name")
            .map(|o| o.value.as_str())
    }
}

/// A `oneof` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneofDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

impl OneofDecl {
    /// Create a oneof from its members.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// An `enum` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: String,
    pub values: Vec<EnumValueDecl>,
}

impl EnumDecl {
    /// Create an enum from `(name, number)` pairs.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = (S, i32)>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|(name, number)| EnumValueDecl {
                    name: name.into(),
                    number,
                })
                .collect(),
        }
    }
}

/// One `NAME = number;` entry of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDecl {
    pub name: String,
    pub number: i32,
}

/// A `service` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDecl {
    pub name: String,
    pub methods: Vec<MethodDecl>,
}

/// An `rpc` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl MethodDecl {
    /// Create a unary method.
    pub fn unary(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input_type: input_type.into(),
            output_type: output_type.into(),
            client_streaming: false,
            server_streaming: false,
        }
    }
}
