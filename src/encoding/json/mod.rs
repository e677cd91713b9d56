// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON bridge for dynamic values.
//!
//! Used by the command-line tool to print decoded records and to read
//! records to encode.

pub mod decoder;
pub mod encoder;

pub use decoder::JsonDecoder;
pub use encoder::{record_to_json, value_to_json, JsonEncoder};
