// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! File-based configuration.
//!
//! ```toml
//! search_roots = ["protos", "third_party/protos"]
//! schemas = ["protos/app/events.proto"]
//!
//! [codec]
//! unwrap_wrappers_on_decode = true
//! recursion_limit = 64
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{CodecError, Result};
use crate::encoding::protobuf::CodecOptions;
use crate::schema::{SchemaRegistry, SchemaRegistryBuilder};

/// Search roots, schemas to preload and codec options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DynprotoConfig {
    /// Import search roots, in priority order.
    pub search_roots: Vec<PathBuf>,

    /// Schema files or directories loaded by [`DynprotoConfig::load_registry`].
    pub schemas: Vec<PathBuf>,

    /// Codec behavior flags.
    pub codec: CodecOptions,
}

impl DynprotoConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse(text, "config")
    }

    /// Load configuration from a TOML file.
    ///
    /// Relative search roots and schema paths are taken relative to the
    /// file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CodecError::io(path, &e))?;
        let mut config = Self::parse(&text, &path.display().to_string())?;

        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        tracing::debug!(
            path = %path.display(),
            roots = config.search_roots.len(),
            schemas = config.schemas.len(),
            "Loaded config"
        );
        Ok(config)
    }

    /// Check value ranges serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.codec.recursion_limit == 0 {
            return Err(CodecError::parse(
                "config",
                "codec.recursion_limit must be at least 1",
            ));
        }
        Ok(())
    }

    fn parse(text: &str, context: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CodecError::parse(context, format!("{e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// A builder with this configuration's search roots.
    pub fn registry_builder(&self) -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new().with_search_roots(self.search_roots.iter().cloned())
    }

    /// Load every configured schema into a registry.
    pub fn load_registry(&self) -> Result<SchemaRegistry> {
        let mut builder = self.registry_builder();
        for schema in &self.schemas {
            builder.load_schema(schema)?;
        }
        Ok(builder.build())
    }

    fn rebase(&mut self, base: &Path) {
        for path in self.search_roots.iter_mut().chain(self.schemas.iter_mut()) {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
