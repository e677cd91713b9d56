// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Predefined well-known wrapper types.
//!
//! The nine messages of `google/protobuf/wrappers.proto` each hold a single
//! scalar in field `value = 1`:
//!
//! ```text
//! message Int32Value { int32 value = 1; }
//! ```
//!
//! They are built in, so an import of `google/protobuf/wrappers.proto` is
//! recognised by path and never read from disk.

use std::sync::OnceLock;

use regex::Regex;

use crate::schema::descriptor::{FieldDescriptor, MessageDescriptor, TypeDescriptor, WrapperKind};

/// Import paths that refer to the built-in wrapper definitions.
const WRAPPERS_IMPORT_PATTERN: &str = r"^(?:.*/)?google/protobuf/wrappers\.proto$";

fn wrappers_import_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(WRAPPERS_IMPORT_PATTERN).ok())
        .as_ref()
}

/// Check if an import path names the built-in wrapper definitions.
pub fn is_builtin_import(path: &str) -> bool {
    let path = path.replace('\\', "/");
    wrappers_import_regex().is_some_and(|re| re.is_match(&path))
}

/// Descriptor of one wrapper message.
pub fn wrapper_descriptor(kind: WrapperKind) -> MessageDescriptor {
    MessageDescriptor::new(
        kind.full_name(),
        vec![FieldDescriptor::new(
            "value",
            1,
            TypeDescriptor::primitive(kind.inner()),
        )],
        Vec::new(),
    )
}

/// Get all predefined wrapper message descriptors.
pub fn get_all() -> Vec<MessageDescriptor> {
    WrapperKind::ALL.into_iter().map(wrapper_descriptor).collect()
}
