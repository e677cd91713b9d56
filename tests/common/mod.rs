// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use dynproto::{SchemaRegistry, SchemaRegistryBuilder};

// ============================================================================
// Temporary schema trees
// ============================================================================

/// Get a fresh temporary directory path for one test.
pub fn temp_dir(tag: &str) -> PathBuf {
    let random = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    std::env::temp_dir().join(format!(
        "dynproto_{}_{}_{}",
        tag,
        std::process::id(),
        random
    ))
}

/// Cleanup guard for test temporary files
#[derive(Debug)]
pub struct CleanupGuard(pub PathBuf);

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Create a temporary directory holding `files` (relative path, contents).
pub fn schema_tree(tag: &str, files: &[(&str, &str)]) -> (PathBuf, CleanupGuard) {
    let dir = temp_dir(tag);
    for (rel, contents) in files {
        write_file(&dir, rel, contents);
    }
    let guard = CleanupGuard(dir.clone());
    (dir, guard)
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Fixtures
// ============================================================================

/// Get the path to a test fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir)
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Registry over the fixture tree, loaded from `blog/blog.proto`.
pub fn fixture_registry() -> SchemaRegistry {
    let mut builder =
        SchemaRegistryBuilder::new().with_search_roots([fixture_path("")]);
    builder.load_schema(fixture_path("blog/blog.proto")).unwrap();
    builder.build()
}

/// Registry over in-memory sources.
pub fn registry_from(sources: &[(&str, &str)]) -> SchemaRegistry {
    let mut builder = SchemaRegistryBuilder::new();
    builder.load_sources(sources.iter().copied()).unwrap();
    builder.build()
}
