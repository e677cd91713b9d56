// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Dynproto
//!
//! Protocol Buffers encoding and decoding driven by schemas loaded at runtime.
//!
//! Instead of generating code from `.proto` files, the library loads them
//! into a [`SchemaRegistry`](schema::SchemaRegistry) and exchanges messages
//! as [`DynamicValue`] trees.
//!
//! ## Architecture
//!
//! - `core/` - Error taxonomy and the dynamic value model
//! - `schema/` - `.proto` parsing, import loading, type resolution and the registry
//! - `encoding/protobuf/` - Wire primitives plus the schema-aware encoder and decoder
//! - `encoding/json/` - JSON rendering used by the command-line tool
//! - `config` - TOML configuration for search roots and codec options
//! - `mapping` - Explicit projection of records into caller types
//!
//! ## Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dynproto::encoding::protobuf::CodecOptions;
//! use dynproto::schema::SchemaRegistryBuilder;
//! use dynproto::DynamicValue;
//!
//! let mut builder = SchemaRegistryBuilder::new();
//! builder.load_source(
//!     "blog.proto",
//!     r#"
//!     syntax = "proto3";
//!     package blog;
//!     message Post {
//!         string title = 1;
//!         map<string, int32> votes = 2;
//!     }
//!     "#,
//! )?;
//! let registry = builder.build();
//!
//! let post = DynamicValue::record([
//!     ("title", DynamicValue::from("hello")),
//!     ("votes", DynamicValue::map([("ann", 3)])),
//! ]);
//! let options = CodecOptions::default();
//! let bytes = registry.encode_message("blog.Post", post.as_record().unwrap(), &options)?;
//! let decoded = registry.decode_message("blog.Post", &bytes, &options)?;
//! assert_eq!(DynamicValue::Record(decoded), post);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{CodecError, DynamicValue, ErrorCategory, MapKey, Record, Result};

// Encoding/decoding
pub mod encoding;

// Schema loading and registry
pub mod schema;

pub mod config;
pub mod mapping;

pub use config::DynprotoConfig;
pub use encoding::protobuf::CodecOptions;
pub use schema::{SchemaRegistry, SchemaRegistryBuilder};
