// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout dynproto.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error taxonomy for schema, wire and value failures
//! - [`DynamicValue`] - Value tree exchanged instead of generated structs

pub mod error;
pub mod value;

pub use error::{CodecError, ErrorCategory, Result};
pub use value::{DynamicValue, MapKey, Record};
