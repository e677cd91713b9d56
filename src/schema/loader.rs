// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema file discovery and import path resolution.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{CodecError, Result};

/// Extension of schema source files.
pub const SCHEMA_EXTENSION: &str = "proto";

/// Check if a path names a schema source file.
pub fn is_schema_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SCHEMA_EXTENSION)
}

/// Ordered list of directories that import paths are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRoots {
    roots: Vec<PathBuf>,
}

impl SearchRoots {
    /// Create from an ordered list of directories.
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a root. Earlier roots take precedence.
    pub fn push(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve an import path against the roots; the first root containing it wins.
    ///
    /// `fallback` is searched when no roots are configured.
    pub fn resolve(&self, import: &str, fallback: Option<&Path>) -> Result<PathBuf> {
        if !is_schema_file(Path::new(import)) {
            return Err(CodecError::import(
                import,
                format!("not a .{SCHEMA_EXTENSION} file"),
            ));
        }

        let roots: Vec<&Path> = if self.roots.is_empty() {
            fallback.into_iter().collect()
        } else {
            self.roots.iter().map(PathBuf::as_path).collect()
        };

        for root in &roots {
            let candidate = root.join(import);
            tracing::trace!(import, candidate = %candidate.display(), "Probing import");
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        let searched: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
        Err(CodecError::import(
            import,
            format!("not found in search roots [{}]", searched.join(", ")),
        ))
    }
}

/// List the schema files named by `path`.
///
/// A file is returned as-is (it must carry the schema extension); a directory
/// is walked recursively and its schema files returned in sorted order.
pub fn discover(path: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(path).map_err(|e| CodecError::io(path, &e))?;
    if metadata.is_file() {
        if !is_schema_file(path) {
            return Err(CodecError::import(
                path.display().to_string(),
                format!("not a .{SCHEMA_EXTENSION} file"),
            ));
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let mut found = Vec::new();
    walk(path, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| CodecError::io(dir, &e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CodecError::io(dir, &e))?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, found)?;
        } else if is_schema_file(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// Stable identity of a file on disk, used to skip files already loaded.
pub fn file_identity(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Read a schema file.
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CodecError::io(path, &e))
}
