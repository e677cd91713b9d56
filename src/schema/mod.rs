// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema loading for `.proto` files.
//!
//! This module provides:
//! - [`parser`] - Pest grammar producing a [`ProtoFile`] AST
//! - [`loader`] - Search roots, directory discovery and file identities
//! - [`registry`] - Symbol tables with type resolution and lookups
//! - [`descriptor`] - Resolved descriptors consumed by the codecs

pub mod ast;
pub mod builtin_types;
pub mod descriptor;
pub mod loader;
pub mod parser;
pub mod registry;

pub use ast::ProtoFile;
pub use descriptor::{
    DescriptorPool, EnumDescriptor, FieldDescriptor, FieldLabel, MessageDescriptor,
    MethodDescriptor, OneofGroup, ScalarKind, ServiceDescriptor, TypeDescriptor, WrapperKind,
};
pub use loader::SearchRoots;
pub use parser::parse_proto;
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
