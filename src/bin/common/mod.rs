// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use serde::Serialize;

use dynproto::{DynprotoConfig, SchemaRegistry};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: DynprotoConfig,
}

impl Context {
    /// Merge the optional config file with `-I` roots given on the command line.
    pub fn new(config_path: Option<&Path>, include: Vec<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => DynprotoConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DynprotoConfig::default(),
        };
        // Command-line roots are searched first.
        let configured = std::mem::take(&mut config.search_roots);
        config.search_roots = include.into_iter().chain(configured).collect();
        Ok(Self { config })
    }

    /// Load the configured schemas plus `extra` into one registry.
    pub fn load_registry(&self, extra: &[PathBuf]) -> Result<SchemaRegistry> {
        if self.config.schemas.is_empty() && extra.is_empty() {
            bail!("no schema files given (pass .proto files or set `schemas` in the config)");
        }
        let mut builder = self.config.registry_builder();
        for path in self.config.schemas.iter().chain(extra) {
            builder
                .load_schema(path)
                .with_context(|| format!("loading {}", path.display()))?;
        }
        Ok(builder.build())
    }
}

/// Print `value` as pretty JSON, or run the human-readable printer.
pub fn output_json_or<T>(
    json: bool,
    value: &T,
    human_fn: impl FnOnce() -> std::io::Result<()>,
) -> Result<()>
where
    T: Serialize,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human_fn()?;
    }
    Ok(())
}

/// Parse hex text, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);
    hex::decode(digits).with_context(|| format!("invalid hex input '{text}'"))
}

/// Read a whole file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if path == Path::new("-") {
        std::io::stdin().read_to_end(&mut data)?;
    } else {
        data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    }
    Ok(data)
}
