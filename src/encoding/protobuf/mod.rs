// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Protobuf codec module.
//!
//! - [`wire`], [`cursor`] and [`writer`] handle raw wire-format primitives
//! - [`decoder`] and [`encoder`] walk a descriptor and a value tree together
//! - [`codec`] ties them to a [`DescriptorPool`](crate::schema::DescriptorPool)

pub mod codec;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod options;
pub mod wire;
pub mod writer;

pub use codec::{decode, encode, ProtobufCodec};
pub use cursor::WireCursor;
pub use decoder::ProtobufDecoder;
pub use encoder::ProtobufEncoder;
pub use options::{CodecOptions, DEFAULT_RECURSION_LIMIT, UNKNOWN_FIELDS_KEY};
pub use wire::WireType;
pub use writer::WireWriter;
