// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decode and encode commands.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use dynproto::encoding::json::{JsonDecoder, JsonEncoder};
use dynproto::encoding::protobuf::ProtobufCodec;
use dynproto::CodecOptions;

use crate::common::{parse_hex, read_input, Context, Result};

/// Codec flags that override the config file.
#[derive(Args, Clone, Debug, Default)]
pub struct CodecFlags {
    /// Fail on wire type mismatches, unknown record keys and oneof conflicts
    #[arg(long)]
    strict: bool,

    /// Accept enum numbers the schema does not declare
    #[arg(long)]
    allow_unknown_enums: bool,

    /// Show wrapper fields as bare scalars
    #[arg(long)]
    unwrap_wrappers: bool,

    /// Fill absent scalar and enum fields with zero values
    #[arg(long)]
    populate_defaults: bool,

    /// Keep unknown fields as hex under "$unknown"
    #[arg(long)]
    keep_unknown: bool,
}

impl CodecFlags {
    fn apply(&self, base: CodecOptions) -> CodecOptions {
        let mut options = if self.strict {
            CodecOptions {
                recursion_limit: base.recursion_limit,
                ..CodecOptions::strict()
            }
        } else {
            base
        };
        if self.allow_unknown_enums {
            options = options.with_allow_unknown_enum_numbers(true);
        }
        if self.unwrap_wrappers {
            options = options.with_unwrap_wrappers(true);
        }
        if self.populate_defaults {
            options = options.with_populate_defaults(true);
        }
        if self.keep_unknown {
            options = options.with_preserve_unknown_bytes(true);
        }
        options
    }
}

/// Decode protobuf bytes and print them as JSON.
#[derive(Args, Clone, Debug)]
pub struct DecodeCmd {
    /// Message type to decode
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    type_name: String,

    /// Input bytes as hex
    #[arg(long, value_name = "HEX", conflicts_with = "input", required_unless_present = "input")]
    hex: Option<String>,

    /// Input file with raw bytes (`-` for stdin)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print compact JSON on one line
    #[arg(long)]
    compact: bool,

    #[command(flatten)]
    flags: CodecFlags,

    /// Schema files or directories
    #[arg(value_name = "PROTO")]
    schemas: Vec<PathBuf>,
}

impl DecodeCmd {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let registry = ctx.load_registry(&self.schemas)?;
        let message = registry.get_message(&self.type_name)?;
        let data = match (&self.hex, &self.input) {
            (Some(text), _) => parse_hex(text)?,
            (None, Some(path)) => read_input(path)?,
            (None, None) => anyhow::bail!("one of --hex or --input is required"),
        };

        let codec = ProtobufCodec::with_options(&registry, self.flags.apply(ctx.config.codec));
        let record = codec
            .decode(&data, message)
            .with_context(|| format!("decoding {} bytes as {}", data.len(), message.name))?;

        let encoder = if self.compact {
            JsonEncoder::new()
        } else {
            JsonEncoder::pretty()
        };
        println!("{}", encoder.encode(&record)?);
        Ok(())
    }
}

/// Encode a JSON object as protobuf bytes.
#[derive(Args, Clone, Debug)]
pub struct EncodeCmd {
    /// Message type to encode
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    type_name: String,

    /// JSON object to encode
    #[arg(long, value_name = "JSON")]
    json: String,

    /// Write raw bytes to this file instead of printing hex
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    flags: CodecFlags,

    /// Schema files or directories
    #[arg(value_name = "PROTO")]
    schemas: Vec<PathBuf>,
}

impl EncodeCmd {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let registry = ctx.load_registry(&self.schemas)?;
        let message = registry.get_message(&self.type_name)?;
        let record = JsonDecoder::new(&registry)
            .decode(&self.json, message)
            .context("reading --json")?;

        let codec = ProtobufCodec::with_options(&registry, self.flags.apply(ctx.config.codec));
        let bytes = codec
            .encode(&record, message)
            .with_context(|| format!("encoding {}", message.name))?;

        match &self.output {
            Some(path) => std::fs::write(path, &bytes)
                .with_context(|| format!("writing {}", path.display()))?,
            None => println!("{}", hex::encode(&bytes)),
        }
        Ok(())
    }
}
