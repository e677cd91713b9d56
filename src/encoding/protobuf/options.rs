// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Codec behavior flags.

use serde::{Deserialize, Serialize};

/// Default maximum message nesting depth.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Reserved record key holding unknown field bytes when
/// [`CodecOptions::preserve_unknown_bytes_on_decode`] is set.
pub const UNKNOWN_FIELDS_KEY: &str = "$unknown";

/// Options for encode and decode operations.
///
/// Every flag defaults to `false`, which favors lenient, best-effort decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Accept enum numbers the enum does not declare
    pub allow_unknown_enum_number_decode: bool,

    /// Surface wrapper fields as the bare scalar instead of `{ value: x }`
    pub unwrap_wrappers_on_decode: bool,

    /// Keep raw tag+value bytes of unknown fields under [`UNKNOWN_FIELDS_KEY`]
    pub preserve_unknown_bytes_on_decode: bool,

    /// Fill absent singular scalar and enum fields with their zero value
    pub populate_defaults_on_decode: bool,

    /// Fail on wire types that do not match the declared field type
    /// (otherwise the value is skipped like an unknown field)
    pub strict_wire_type_on_decode: bool,

    /// Fail on record keys the message does not declare
    /// (otherwise they are dropped)
    pub strict_field_names_on_encode: bool,

    /// Fail when more than one member of a oneof carries a value
    /// (otherwise every member is emitted)
    pub enforce_oneof_exclusivity_on_encode: bool,

    /// Maximum message nesting depth
    pub recursion_limit: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            allow_unknown_enum_number_decode: false,
            unwrap_wrappers_on_decode: false,
            preserve_unknown_bytes_on_decode: false,
            populate_defaults_on_decode: false,
            strict_wire_type_on_decode: false,
            strict_field_names_on_encode: false,
            enforce_oneof_exclusivity_on_encode: false,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl CodecOptions {
    /// Create options with every flag off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict decode and encode: wire types, field names and oneof exclusivity are checked.
    pub fn strict() -> Self {
        Self {
            strict_wire_type_on_decode: true,
            strict_field_names_on_encode: true,
            enforce_oneof_exclusivity_on_encode: true,
            ..Self::default()
        }
    }

    pub fn with_allow_unknown_enum_numbers(mut self, enabled: bool) -> Self {
        self.allow_unknown_enum_number_decode = enabled;
        self
    }

    pub fn with_unwrap_wrappers(mut self, enabled: bool) -> Self {
        self.unwrap_wrappers_on_decode = enabled;
        self
    }

    pub fn with_preserve_unknown_bytes(mut self, enabled: bool) -> Self {
        self.preserve_unknown_bytes_on_decode = enabled;
        self
    }

    pub fn with_populate_defaults(mut self, enabled: bool) -> Self {
        self.populate_defaults_on_decode = enabled;
        self
    }

    pub fn with_strict_wire_type(mut self, enabled: bool) -> Self {
        self.strict_wire_type_on_decode = enabled;
        self
    }

    pub fn with_strict_field_names(mut self, enabled: bool) -> Self {
        self.strict_field_names_on_encode = enabled;
        self
    }

    pub fn with_oneof_exclusivity(mut self, enabled: bool) -> Self {
        self.enforce_oneof_exclusivity_on_encode = enabled;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}
