// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for dynproto.
//!
//! Errors fall into three families (see [`ErrorCategory`]):
//! - Schema errors raised while building or querying the registry
//! - Wire errors raised while decoding bytes
//! - Value errors raised while encoding a caller-supplied value tree
//!
//! Encode failures inside nested values are wrapped in [`CodecError::AtField`],
//! which carries the dotted path of the offending field.

use thiserror::Error;

/// Broad family an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Registry build or lookup failure
    Schema,
    /// Malformed or incompatible wire bytes
    Wire,
    /// Caller-supplied value does not fit the schema
    Value,
}

/// Errors that can occur while loading schemas or encoding/decoding messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// No message, enum or service with this name
    #[error("Type not found: '{name}'")]
    NotFound {
        /// Name as queried
        name: String,
    },

    /// A short name matched more than one registered type
    #[error("Ambiguous type name '{name}', candidates: {}", .candidates.join(", "))]
    Ambiguous {
        /// Name as queried
        name: String,
        /// Every fully-qualified name that matched
        candidates: Vec<String>,
    },

    /// A field or method references a type that is not registered
    #[error("Unresolved type '{type_name}' referenced from '{referenced_from}'")]
    UnresolvedType {
        /// Type name as written in the schema
        type_name: String,
        /// Fully-qualified name of the referencing field or method
        referenced_from: String,
    },

    /// An import could not be located or is not a schema file
    #[error("Cannot resolve import '{path}': {reason}")]
    ImportResolution {
        /// Import path as written
        path: String,
        /// Why the lookup failed
        reason: String,
    },

    /// Schema source text could not be parsed
    #[error("Parse error in {context}: {message}")]
    Parse {
        /// What was being parsed (usually a file name)
        context: String,
        /// Parser message
        message: String,
    },

    /// Structurally invalid schema
    #[error("Invalid schema '{schema_name}': {reason}")]
    InvalidSchema {
        /// Offending declaration
        schema_name: String,
        /// Validation error message
        reason: String,
    },

    /// Two declarations share a fully-qualified name
    #[error("Duplicate symbol '{name}'")]
    DuplicateSymbol {
        /// Fully-qualified name
        name: String,
    },

    /// Two fields of one message share a field number
    #[error("Duplicate field number {number} in '{message}' ('{first}' and '{second}')")]
    DuplicateFieldNumber {
        /// Fully-qualified message name
        message: String,
        /// Colliding number
        number: u32,
        /// First field using the number
        first: String,
        /// Second field using the number
        second: String,
    },

    /// Filesystem failure while loading schemas
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// File or directory involved
        path: String,
        /// Underlying error text
        message: String,
    },

    /// Input ended in the middle of a varint or tag
    #[error("Unexpected end of data at position {position}")]
    UnexpectedEndOfData {
        /// Offset where more input was required
        position: usize,
    },

    /// Varint continued past 10 bytes
    #[error("Varint at position {position} is longer than 10 bytes")]
    VarintTooLong {
        /// Offset of the first varint byte
        position: usize,
    },

    /// Tenth varint byte carries bits beyond 64
    #[error("Varint at position {position} overflows 64 bits")]
    VarintOverflow {
        /// Offset of the first varint byte
        position: usize,
    },

    /// Not enough bytes left for a fixed32/fixed64 value
    #[error("Truncated fixed-width value: need {needed} bytes at position {position}, {available} available")]
    TruncatedFixedWidth {
        /// Bytes required (4 or 8)
        needed: usize,
        /// Bytes remaining
        available: usize,
        /// Offset of the value
        position: usize,
    },

    /// Length prefix points past the end of the buffer
    #[error("Truncated length-delimited value: declared {declared} bytes at position {position}, {available} available")]
    TruncatedBytes {
        /// Declared length
        declared: u64,
        /// Bytes remaining
        available: usize,
        /// Offset of the payload
        position: usize,
    },

    /// Wire type is invalid or does not match the declared field type
    #[error("Invalid wire type {wire_type} for field {field_number}: {reason}")]
    InvalidWireType {
        /// Field number from the tag
        field_number: u32,
        /// Raw wire type bits
        wire_type: u8,
        /// What was expected instead
        reason: String,
    },

    /// Tag carries field number zero or one above the protocol maximum
    #[error("Invalid field number {number} at position {position}")]
    InvalidFieldNumber {
        /// Field number from the tag
        number: u64,
        /// Offset of the tag
        position: usize,
    },

    /// Enum number not declared by the enum
    #[error("Unknown value {number} for enum '{enum_name}'")]
    UnknownEnumValue {
        /// Fully-qualified enum name
        enum_name: String,
        /// Number read from the wire
        number: i32,
    },

    /// A string field held bytes that are not UTF-8
    #[error("Invalid UTF-8 in string field '{field}'")]
    InvalidUtf8 {
        /// Field name
        field: String,
    },

    /// Message nesting exceeded the configured limit
    #[error("Recursion limit of {limit} exceeded")]
    RecursionLimitExceeded {
        /// Configured limit
        limit: usize,
    },

    /// Value kind incompatible with the declared field type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Kind of the supplied value
        found: String,
    },

    /// Record key that the message does not declare (strict encode only)
    #[error("Unknown field '{field}' for message '{message}'")]
    UnknownFieldName {
        /// Fully-qualified message name
        message: String,
        /// Record key
        field: String,
    },

    /// More than one member of a oneof was supplied (exclusive encode only)
    #[error("Oneof '{oneof}' has more than one member set: {}", .fields.join(", "))]
    OneofConflict {
        /// Oneof group name
        oneof: String,
        /// Members that carried a value
        fields: Vec<String>,
    },

    /// An error raised while encoding a nested field
    #[error("{path}: {source}")]
    AtField {
        /// Dotted field path, e.g. `post.comments[2].author.id`
        path: String,
        /// Error raised at that path
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Create a "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        CodecError::NotFound { name: name.into() }
    }

    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unresolved type error.
    pub fn unresolved(type_name: impl Into<String>, referenced_from: impl Into<String>) -> Self {
        CodecError::UnresolvedType {
            type_name: type_name.into(),
            referenced_from: referenced_from.into(),
        }
    }

    /// Create an import resolution error.
    pub fn import(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::ImportResolution {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error for a path.
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        CodecError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        CodecError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid wire type error.
    pub fn invalid_wire_type(field_number: u32, wire_type: u8, reason: impl Into<String>) -> Self {
        CodecError::InvalidWireType {
            field_number,
            wire_type,
            reason: reason.into(),
        }
    }

    /// Prefix a field path segment onto this error.
    ///
    /// Segments are joined with `.`, except index segments (`[3]`) which
    /// attach directly to the preceding name.
    pub fn in_field(self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        match self {
            CodecError::AtField { path, source } => {
                let path = if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                CodecError::AtField { path, source }
            }
            other => CodecError::AtField {
                path: segment,
                source: Box::new(other),
            },
        }
    }

    /// Dotted path of the failing field, if this error carries one.
    pub fn field_path(&self) -> Option<&str> {
        match self {
            CodecError::AtField { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The innermost error, stripped of any field path.
    pub fn root_cause(&self) -> &CodecError {
        match self {
            CodecError::AtField { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The family this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CodecError::NotFound { .. }
            | CodecError::Ambiguous { .. }
            | CodecError::UnresolvedType { .. }
            | CodecError::ImportResolution { .. }
            | CodecError::Parse { .. }
            | CodecError::InvalidSchema { .. }
            | CodecError::DuplicateSymbol { .. }
            | CodecError::DuplicateFieldNumber { .. }
            | CodecError::Io { .. } => ErrorCategory::Schema,
            CodecError::UnexpectedEndOfData { .. }
            | CodecError::VarintTooLong { .. }
            | CodecError::VarintOverflow { .. }
            | CodecError::TruncatedFixedWidth { .. }
            | CodecError::TruncatedBytes { .. }
            | CodecError::InvalidWireType { .. }
            | CodecError::InvalidFieldNumber { .. }
            | CodecError::UnknownEnumValue { .. }
            | CodecError::InvalidUtf8 { .. }
            | CodecError::RecursionLimitExceeded { .. } => ErrorCategory::Wire,
            CodecError::TypeMismatch { .. }
            | CodecError::UnknownFieldName { .. }
            | CodecError::OneofConflict { .. } => ErrorCategory::Value,
            CodecError::AtField { source, .. } => source.category(),
        }
    }

    /// Check whether the input ended before a value was complete.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self.root_cause(),
            CodecError::UnexpectedEndOfData { .. }
                | CodecError::TruncatedFixedWidth { .. }
                | CodecError::TruncatedBytes { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::NotFound { name } => vec![("name", name.clone())],
            CodecError::Ambiguous { name, candidates } => {
                vec![("name", name.clone()), ("candidates", candidates.join(","))]
            }
            CodecError::UnresolvedType {
                type_name,
                referenced_from,
            } => vec![
                ("type", type_name.clone()),
                ("referenced_from", referenced_from.clone()),
            ],
            CodecError::ImportResolution { path, reason } => {
                vec![("path", path.clone()), ("reason", reason.clone())]
            }
            CodecError::Parse { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::InvalidSchema {
                schema_name,
                reason,
            } => vec![("schema", schema_name.clone()), ("reason", reason.clone())],
            CodecError::DuplicateSymbol { name } => vec![("name", name.clone())],
            CodecError::DuplicateFieldNumber {
                message,
                number,
                first,
                second,
            } => vec![
                ("message", message.clone()),
                ("number", number.to_string()),
                ("first", first.clone()),
                ("second", second.clone()),
            ],
            CodecError::Io { path, message } => {
                vec![("path", path.clone()), ("message", message.clone())]
            }
            CodecError::UnexpectedEndOfData { position }
            | CodecError::VarintTooLong { position }
            | CodecError::VarintOverflow { position } => {
                vec![("position", position.to_string())]
            }
            CodecError::TruncatedFixedWidth {
                needed,
                available,
                position,
            } => vec![
                ("needed", needed.to_string()),
                ("available", available.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::TruncatedBytes {
                declared,
                available,
                position,
            } => vec![
                ("declared", declared.to_string()),
                ("available", available.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::InvalidWireType {
                field_number,
                wire_type,
                reason,
            } => vec![
                ("field_number", field_number.to_string()),
                ("wire_type", wire_type.to_string()),
                ("reason", reason.clone()),
            ],
            CodecError::InvalidFieldNumber { number, position } => vec![
                ("number", number.to_string()),
                ("position", position.to_string()),
            ],
            CodecError::UnknownEnumValue { enum_name, number } => {
                vec![("enum", enum_name.clone()), ("number", number.to_string())]
            }
            CodecError::InvalidUtf8 { field } => vec![("field", field.clone())],
            CodecError::RecursionLimitExceeded { limit } => vec![("limit", limit.to_string())],
            CodecError::TypeMismatch { expected, found } => {
                vec![("expected", expected.clone()), ("found", found.clone())]
            }
            CodecError::UnknownFieldName { message, field } => {
                vec![("message", message.clone()), ("field", field.clone())]
            }
            CodecError::OneofConflict { oneof, fields } => {
                vec![("oneof", oneof.clone()), ("fields", fields.join(","))]
            }
            CodecError::AtField { path, source } => {
                let mut fields = vec![("path", path.clone())];
                fields.extend(source.log_fields());
                fields
            }
        }
    }
}

/// Result type for dynproto operations.
pub type Result<T> = std::result::Result<T, CodecError>;
