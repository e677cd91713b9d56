// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message encoding/decoding implementations.
//!
//! - [`protobuf`] - Protobuf wire format, driven by runtime descriptors
//! - [`json`] - JSON rendering and descriptor-guided JSON input

pub mod json;
pub mod protobuf;

pub use json::{JsonDecoder, JsonEncoder};
pub use protobuf::{CodecOptions, ProtobufCodec, ProtobufDecoder, ProtobufEncoder};
