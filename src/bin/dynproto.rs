// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Dynproto CLI
//!
//! Inspect `.proto` schemas and convert messages between protobuf bytes and JSON.
//!
//! ## Usage
//!
//! ```sh
//! # List types
//! dynproto schema list protos/
//!
//! # Show a message
//! dynproto -I protos schema show blog.Post protos/blog.proto
//!
//! # Decode bytes to JSON
//! dynproto decode --type blog.Post --hex 0a0568656c6c6f protos/blog.proto
//!
//! # Encode JSON to bytes
//! dynproto encode --type blog.Post --json '{"title":"hello"}' protos/blog.proto
//! ```

mod cmd;
mod common;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use cmd::{DecodeCmd, EncodeCmd, SchemaCmd};
use common::{Context, Result};

/// Dynproto - runtime protobuf toolkit
///
/// Loads .proto files at runtime; no code generation involved.
#[derive(Parser, Clone)]
#[command(name = "dynproto")]
#[command(about = "Inspect .proto schemas and encode/decode protobuf messages", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Import search root (repeatable, searched in order)
    #[arg(short = 'I', long = "include", value_name = "DIR", global = true)]
    include: Vec<PathBuf>,

    /// TOML config with search roots, schemas and codec options
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Schema operations (list, show)
    #[command(subcommand)]
    Schema(SchemaCmd),

    /// Decode protobuf bytes to JSON
    Decode(DecodeCmd),

    /// Encode JSON to protobuf bytes
    Encode(EncodeCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new(cli.config.as_deref(), cli.include)?;

    match cli.command {
        Commands::Schema(cmd) => cmd.run(&ctx),
        Commands::Decode(cmd) => cmd.run(&ctx),
        Commands::Encode(cmd) => cmd.run(&ctx),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
