// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema registry.
//!
//! The registry has two phases, expressed as two types:
//! - [`SchemaRegistryBuilder`] loads schema files (`&mut self`) and rebuilds
//!   its symbol tables after every batch
//! - [`SchemaRegistry`] is produced by [`SchemaRegistryBuilder::build`] and only
//!   offers `&self` lookups, so it can be shared across threads
//!
//! Every batch runs three passes over all loaded files:
//! 1. register fully-qualified names (`package.Outer.Inner`)
//! 2. resolve field types to primitives, enums, wrappers, messages and maps
//! 3. validate service method types
//!
//! A batch that fails leaves the builder exactly as it was.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::{CodecError, Record, Result};
use crate::encoding::protobuf::wire::MAX_FIELD_NUMBER;
use crate::encoding::protobuf::{self as codec, CodecOptions};
use crate::schema::ast::{
    FieldDecl, FieldLabel as DeclLabel, FieldTypeDecl, Import, ImportKind, MessageDecl, ProtoFile,
    ServiceDecl,
};
use crate::schema::builtin_types;
use crate::schema::descriptor::{
    DescriptorPool, EnumDescriptor, FieldDescriptor, FieldLabel, MessageDescriptor,
    MethodDescriptor, OneofGroup, ScalarKind, ServiceDescriptor, TypeDescriptor, WrapperKind,
};
use crate::schema::loader::{self, SearchRoots};
use crate::schema::parser::parse_proto;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolKind {
    Message,
    Enum,
    Service,
}

/// Memo key of a synthetic map entry: owner, field, key type, value type.
type MapEntryKey = (String, String, ScalarKind, TypeDescriptor);

fn wrapper_messages() -> &'static BTreeMap<String, MessageDescriptor> {
    static WRAPPERS: OnceLock<BTreeMap<String, MessageDescriptor>> = OnceLock::new();
    WRAPPERS.get_or_init(|| {
        builtin_types::get_all()
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect()
    })
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// `user_scores` -> `UserScores`
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `Owner` + `user_scores` -> `Owner.UserScoresEntry`
fn map_entry_name(owner: &str, field_name: &str) -> String {
    qualify(owner, &format!("{}Entry", camel_case(field_name)))
}

/// Exact match, then (for undotted names only) a unique dot-suffix match.
fn lookup<'a, T>(map: &'a BTreeMap<String, T>, name: &str) -> Result<&'a T> {
    let name = name.strip_prefix('.').unwrap_or(name);
    if let Some(found) = map.get(name) {
        return Ok(found);
    }
    if name.contains('.') {
        return Err(CodecError::not_found(name));
    }

    let suffix = format!(".{name}");
    let mut matches = map.iter().filter(|(full, _)| full.ends_with(&suffix));
    match (matches.next(), matches.next()) {
        (None, _) => Err(CodecError::not_found(name)),
        (Some((_, found)), None) => Ok(found),
        (Some(_), Some(_)) => Err(CodecError::Ambiguous {
            name: name.to_string(),
            candidates: map
                .keys()
                .filter(|full| full.ends_with(&suffix))
                .cloned()
                .collect(),
        }),
    }
}

// =============================================================================
// Symbol tables
// =============================================================================

/// Descriptor tables derived from the loaded files.
#[derive(Debug, Clone, Default)]
struct SymbolTables {
    messages: BTreeMap<String, MessageDescriptor>,
    enums: BTreeMap<String, EnumDescriptor>,
    services: BTreeMap<String, ServiceDescriptor>,
    map_entries: BTreeMap<String, MessageDescriptor>,
    map_entry_index: HashMap<MapEntryKey, String>,
}

impl SymbolTables {
    /// Run the three build passes over `files`.
    ///
    /// Map entries synthesised by `previous` are reused.
    fn build(files: &[ProtoFile], previous: &SymbolTables) -> Result<Self> {
        let mut tables = SymbolTables {
            map_entries: previous.map_entries.clone(),
            map_entry_index: previous.map_entry_index.clone(),
            ..SymbolTables::default()
        };

        // Pass 1: register names
        let mut symbols: HashMap<String, SymbolKind> = HashMap::new();
        let mut messages: Vec<(String, &MessageDecl)> = Vec::new();
        let mut enums = Vec::new();
        let mut services: Vec<(String, String, &ServiceDecl)> = Vec::new();

        for file in files {
            let package = file.package.clone().unwrap_or_default();
            register_messages(&package, &file.messages, &mut symbols, &mut messages, &mut enums)?;
            for decl in &file.enums {
                let full = qualify(&package, &decl.name);
                register(&mut symbols, &full, SymbolKind::Enum)?;
                enums.push((full, decl));
            }
            for decl in &file.services {
                let full = qualify(&package, &decl.name);
                register(&mut symbols, &full, SymbolKind::Service)?;
                services.push((full, package.clone(), decl));
            }
        }

        // Pass 2: resolve field types
        for (full, decl) in enums {
            let values = decl.values.iter().map(|v| (v.name.clone(), v.number));
            tables
                .enums
                .insert(full.clone(), EnumDescriptor::new(full, values));
        }
        for (full, decl) in &messages {
            let descriptor = tables.resolve_message(full, decl, &symbols)?;
            tables.messages.insert(full.clone(), descriptor);
        }

        // Pass 3: validate services
        for (full, package, decl) in services {
            let methods = decl
                .methods
                .iter()
                .map(|m| {
                    let referenced_from = format!("{full}.{}", m.name);
                    Ok(MethodDescriptor {
                        name: m.name.clone(),
                        input_type: resolve_message_type(
                            &m.input_type,
                            &package,
                            &symbols,
                            &referenced_from,
                        )?,
                        output_type: resolve_message_type(
                            &m.output_type,
                            &package,
                            &symbols,
                            &referenced_from,
                        )?,
                        client_streaming: m.client_streaming,
                        server_streaming: m.server_streaming,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            tables
                .services
                .insert(full.clone(), ServiceDescriptor { name: full, methods });
        }

        Ok(tables)
    }

    fn resolve_message(
        &mut self,
        full: &str,
        decl: &MessageDecl,
        symbols: &HashMap<String, SymbolKind>,
    ) -> Result<MessageDescriptor> {
        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            fields.push(self.resolve_field(full, field, None, symbols)?);
        }

        let mut oneofs = Vec::with_capacity(decl.oneofs.len());
        for (index, oneof) in decl.oneofs.iter().enumerate() {
            let mut numbers = Vec::with_capacity(oneof.fields.len());
            for field in &oneof.fields {
                let resolved = self.resolve_field(full, field, Some(index), symbols)?;
                numbers.push(resolved.number);
                fields.push(resolved);
            }
            oneofs.push(OneofGroup {
                name: oneof.name.clone(),
                fields: numbers,
            });
        }

        let mut seen: HashMap<u32, &str> = HashMap::with_capacity(fields.len());
        for field in &fields {
            if let Some(first) = seen.insert(field.number, &field.name) {
                return Err(CodecError::DuplicateFieldNumber {
                    message: full.to_string(),
                    number: field.number,
                    first: first.to_string(),
                    second: field.name.clone(),
                });
            }
        }

        let mut descriptor = MessageDescriptor::new(full, fields, oneofs);
        descriptor.nested_messages = decl.messages.iter().map(|m| qualify(full, &m.name)).collect();
        descriptor.nested_enums = decl.enums.iter().map(|e| qualify(full, &e.name)).collect();
        Ok(descriptor)
    }

    fn resolve_field(
        &mut self,
        owner: &str,
        field: &FieldDecl,
        oneof_index: Option<usize>,
        symbols: &HashMap<String, SymbolKind>,
    ) -> Result<FieldDescriptor> {
        let referenced_from = qualify(owner, &field.name);
        if !(1..=MAX_FIELD_NUMBER).contains(&field.number) {
            return Err(CodecError::invalid_schema(
                &referenced_from,
                format!(
                    "field number {} is outside 1..={MAX_FIELD_NUMBER}",
                    field.number
                ),
            ));
        }
        let (label, ty) = match &field.ty {
            FieldTypeDecl::Named(type_name) => {
                let ty = resolve_type(type_name, owner, symbols, &referenced_from)?;
                let label = match field.label {
                    DeclLabel::Repeated => FieldLabel::Repeated,
                    DeclLabel::Required => FieldLabel::Required,
                    DeclLabel::Optional | DeclLabel::Implicit => FieldLabel::Optional,
                };
                (label, ty)
            }
            FieldTypeDecl::Map { key, value } => {
                if field.label != DeclLabel::Implicit {
                    return Err(CodecError::invalid_schema(
                        &referenced_from,
                        "map fields cannot carry a label",
                    ));
                }
                let key_kind = ScalarKind::from_name(key)
                    .filter(|k| k.is_valid_map_key())
                    .ok_or_else(|| {
                        CodecError::invalid_schema(
                            &referenced_from,
                            format!("'{key}' is not a valid map key type"),
                        )
                    })?;
                let value_ty = resolve_type(value, owner, symbols, &referenced_from)?;
                self.check_map_entry_name(owner, &field.name, key_kind, &value_ty, symbols)?;
                let entry = self
                    .get_or_create_map_entry_message(owner, &field.name, key_kind, &value_ty)
                    .name
                    .clone();
                (
                    FieldLabel::Optional,
                    TypeDescriptor::Map {
                        key: key_kind,
                        value: Box::new(value_ty),
                        entry,
                    },
                )
            }
        };

        if oneof_index.is_some() && (label == FieldLabel::Repeated || ty.is_map()) {
            return Err(CodecError::invalid_schema(
                &referenced_from,
                "oneof members cannot be repeated or maps",
            ));
        }

        let mut descriptor = FieldDescriptor::new(field.name.clone(), field.number, ty);
        descriptor.label = label;
        descriptor.oneof_index = oneof_index;
        if let Some(json_name) = field.json_name() {
            descriptor.json_name = json_name.to_string();
        }
        Ok(descriptor)
    }

    /// The synthetic entry name must not belong to a declared type or to the
    /// entry of another map field (`a_b` and `a__b` share `ABEntry`).
    fn check_map_entry_name(
        &self,
        owner: &str,
        field_name: &str,
        key: ScalarKind,
        value: &TypeDescriptor,
        symbols: &HashMap<String, SymbolKind>,
    ) -> Result<()> {
        let name = map_entry_name(owner, field_name);
        let memo_key = (owner.to_string(), field_name.to_string(), key, value.clone());
        let taken = symbols.contains_key(&name)
            || self
                .map_entry_index
                .iter()
                .any(|(other, entry)| *entry == name && *other != memo_key);
        if taken {
            return Err(CodecError::DuplicateSymbol { name });
        }
        Ok(())
    }

    fn get_or_create_map_entry_message(
        &mut self,
        owner: &str,
        field_name: &str,
        key: ScalarKind,
        value: &TypeDescriptor,
    ) -> &MessageDescriptor {
        let memo_key = (owner.to_string(), field_name.to_string(), key, value.clone());
        let name = self
            .map_entry_index
            .entry(memo_key)
            .or_insert_with(|| map_entry_name(owner, field_name))
            .clone();
        self.map_entries
            .entry(name.clone())
            .or_insert_with(|| MessageDescriptor::map_entry(name, key, value.clone()))
    }

    fn find_message(&self, name: &str) -> Result<&MessageDescriptor> {
        let exact = name.strip_prefix('.').unwrap_or(name);
        match self.message_by_full_name(exact) {
            Some(found) => Ok(found),
            None => lookup(&self.messages, name),
        }
    }

    fn message_by_full_name(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.messages
            .get(full_name)
            .or_else(|| self.map_entries.get(full_name))
            .or_else(|| wrapper_messages().get(full_name))
    }
}

fn register(symbols: &mut HashMap<String, SymbolKind>, full: &str, kind: SymbolKind) -> Result<()> {
    if symbols.insert(full.to_string(), kind).is_some() {
        return Err(CodecError::DuplicateSymbol {
            name: full.to_string(),
        });
    }
    Ok(())
}

fn register_messages<'a>(
    prefix: &str,
    decls: &'a [MessageDecl],
    symbols: &mut HashMap<String, SymbolKind>,
    messages: &mut Vec<(String, &'a MessageDecl)>,
    enums: &mut Vec<(String, &'a crate::schema::ast::EnumDecl)>,
) -> Result<()> {
    for decl in decls {
        let full = qualify(prefix, &decl.name);
        register(symbols, &full, SymbolKind::Message)?;
        for nested in &decl.enums {
            let nested_full = qualify(&full, &nested.name);
            register(symbols, &nested_full, SymbolKind::Enum)?;
            enums.push((nested_full, nested));
        }
        register_messages(&full, &decl.messages, symbols, messages, enums)?;
        messages.push((full, decl));
    }
    Ok(())
}

/// Resolve a type reference written inside `scope`.
///
/// Scalars resolve directly. Otherwise the name is looked up in the innermost
/// scope first, then each enclosing scope; a leading `.` means the name is
/// already fully qualified. An undotted name that no scope finds falls back
/// to a unique suffix match over every registered type.
fn resolve_type(
    name: &str,
    scope: &str,
    symbols: &HashMap<String, SymbolKind>,
    referenced_from: &str,
) -> Result<TypeDescriptor> {
    if let Some(scalar) = ScalarKind::from_name(name) {
        return Ok(TypeDescriptor::primitive(scalar));
    }

    let classify = |candidate: &str| -> Option<TypeDescriptor> {
        if let Some(wrapper) = WrapperKind::from_type_name(candidate) {
            return Some(TypeDescriptor::Wrapper { wrapper });
        }
        match symbols.get(candidate) {
            Some(SymbolKind::Enum) => Some(TypeDescriptor::enumeration(candidate)),
            Some(SymbolKind::Message) => Some(TypeDescriptor::message(candidate)),
            Some(SymbolKind::Service) | None => None,
        }
    };

    if let Some(absolute) = name.strip_prefix('.') {
        return classify(absolute).ok_or_else(|| CodecError::unresolved(name, referenced_from));
    }

    let mut scope = scope;
    loop {
        if let Some(ty) = classify(&qualify(scope, name)) {
            return Ok(ty);
        }
        if scope.is_empty() {
            break;
        }
        scope = scope.rfind('.').map_or("", |i| &scope[..i]);
    }

    if !name.contains('.') {
        let suffix = format!(".{name}");
        let mut candidates: Vec<&String> = symbols
            .iter()
            .filter(|(full, kind)| **kind != SymbolKind::Service && full.ends_with(&suffix))
            .map(|(full, _)| full)
            .collect();
        candidates.sort();
        match candidates.as_slice() {
            [] => {}
            [only] => {
                if let Some(ty) = classify(only) {
                    return Ok(ty);
                }
            }
            _ => {
                return Err(CodecError::Ambiguous {
                    name: name.to_string(),
                    candidates: candidates.into_iter().cloned().collect(),
                })
            }
        }
    }

    Err(CodecError::unresolved(name, referenced_from))
}

fn resolve_message_type(
    name: &str,
    scope: &str,
    symbols: &HashMap<String, SymbolKind>,
    referenced_from: &str,
) -> Result<String> {
    match resolve_type(name, scope, symbols, referenced_from)? {
        TypeDescriptor::Message { name } => Ok(name),
        TypeDescriptor::Wrapper { wrapper } => Ok(wrapper.full_name()),
        _ => Err(CodecError::unresolved(name, referenced_from)),
    }
}

// =============================================================================
// Build phase
// =============================================================================

/// Files collected by one load call before they are committed.
#[derive(Default)]
struct Batch {
    visited: HashSet<String>,
    sources: HashMap<String, String>,
    files: Vec<ProtoFile>,
}

/// Build-phase registry.
///
/// # Example
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use dynproto::schema::SchemaRegistryBuilder;
///
/// let mut builder = SchemaRegistryBuilder::new();
/// builder.load_source(
///     "person.proto",
///     "syntax = \"proto3\"; package demo; message Person { int32 id = 1; string name = 2; }",
/// )?;
/// let registry = builder.build();
/// assert_eq!(registry.get_message("Person")?.name, "demo.Person");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistryBuilder {
    search_roots: SearchRoots,
    files: Vec<ProtoFile>,
    loaded: HashSet<String>,
    tables: SymbolTables,
}

impl SchemaRegistryBuilder {
    /// Create an empty builder with no search roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ordered list of import search roots.
    pub fn with_search_roots(mut self, roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.search_roots = SearchRoots::new(roots);
        self
    }

    /// Append an import search root.
    pub fn add_search_root(&mut self, root: impl Into<PathBuf>) -> &mut Self {
        self.search_roots.push(root);
        self
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        self.search_roots.as_slice()
    }

    /// Load one `.proto` file, or every `.proto` file under a directory, plus
    /// everything they import.
    ///
    /// Files already loaded by an earlier call are skipped. Without configured
    /// search roots, imports resolve relative to the directory that was loaded
    /// (or the parent directory of the file).
    pub fn load_schema(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let targets = loader::discover(path)?;
        let fallback = if path.is_dir() {
            path.to_path_buf()
        } else {
            path.parent().map(Path::to_path_buf).unwrap_or_default()
        };

        let mut batch = Batch::default();
        for target in &targets {
            self.visit_file(target, Some(&fallback), &mut batch)?;
        }
        self.commit(batch.files)
    }

    /// Load schema source text held in memory. `name` is the file identity
    /// other sources use to import it.
    pub fn load_source(&mut self, name: &str, source: &str) -> Result<()> {
        self.load_sources([(name, source)])
    }

    /// Load several in-memory sources as one batch, so they may import each
    /// other in any order.
    pub fn load_sources<N, S>(&mut self, sources: impl IntoIterator<Item = (N, S)>) -> Result<()>
    where
        N: Into<String>,
        S: Into<String>,
    {
        let mut batch = Batch::default();
        let mut order = Vec::new();
        for (name, source) in sources {
            let name = name.into();
            order.push(name.clone());
            batch.sources.insert(name, source.into());
        }
        for name in order {
            if let Some(source) = batch.sources.get(&name).cloned() {
                self.visit_source(&name, &source, None, &mut batch)?;
            }
        }
        self.commit(batch.files)
    }

    /// Add a pre-parsed file. Its type references must resolve against the
    /// file itself and files already loaded.
    pub fn add_file(&mut self, file: ProtoFile) -> Result<()> {
        self.add_files(vec![file])
    }

    /// Add several pre-parsed files as one batch.
    pub fn add_files(&mut self, files: Vec<ProtoFile>) -> Result<()> {
        let mut seen = HashSet::new();
        let fresh = files
            .into_iter()
            .filter(|f| !self.loaded.contains(&f.name) && seen.insert(f.name.clone()))
            .collect();
        self.commit(fresh)
    }

    /// Get (synthesising on first use) the `key = 1; value = 2` entry message
    /// for a map field of `owner`.
    pub fn get_or_create_map_entry_message(
        &mut self,
        owner: &str,
        field_name: &str,
        key: ScalarKind,
        value: &TypeDescriptor,
    ) -> &MessageDescriptor {
        self.tables
            .get_or_create_map_entry_message(owner, field_name, key, value)
    }

    /// Look up a message by fully-qualified or unique short name.
    pub fn get_message(&self, name: &str) -> Result<&MessageDescriptor> {
        self.tables.find_message(name)
    }

    /// Look up an enum by fully-qualified or unique short name.
    pub fn get_enum(&self, name: &str) -> Result<&EnumDescriptor> {
        lookup(&self.tables.enums, name)
    }

    /// Look up a service by fully-qualified or unique short name.
    pub fn get_service(&self, name: &str) -> Result<&ServiceDescriptor> {
        lookup(&self.tables.services, name)
    }

    /// Identities of loaded files, in load order.
    pub fn loaded_files(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    /// Finish the build phase.
    pub fn build(self) -> SchemaRegistry {
        tracing::debug!(
            files = self.files.len(),
            messages = self.tables.messages.len(),
            enums = self.tables.enums.len(),
            services = self.tables.services.len(),
            "Schema registry built"
        );
        SchemaRegistry {
            search_roots: self.search_roots,
            files: self.files,
            loaded: self.loaded,
            tables: self.tables,
        }
    }

    fn visit_file(&self, path: &Path, fallback: Option<&Path>, batch: &mut Batch) -> Result<()> {
        let identity = loader::file_identity(path);
        if self.loaded.contains(&identity) || !batch.visited.insert(identity.clone()) {
            tracing::trace!(file = %identity, "Schema file already loaded");
            return Ok(());
        }
        let source = loader::read_source(path)?;
        let file = parse_proto(&identity, &source)?;
        tracing::debug!(
            file = %identity,
            messages = file.messages.len(),
            enums = file.enums.len(),
            "Parsed schema file"
        );
        for import in &file.imports {
            self.visit_import(import, fallback, batch)?;
        }
        batch.files.push(file);
        Ok(())
    }

    fn visit_source(
        &self,
        name: &str,
        source: &str,
        fallback: Option<&Path>,
        batch: &mut Batch,
    ) -> Result<()> {
        if self.loaded.contains(name) || !batch.visited.insert(name.to_string()) {
            return Ok(());
        }
        let file = parse_proto(name, source)?;
        tracing::debug!(file = name, messages = file.messages.len(), "Parsed schema source");
        for import in &file.imports {
            self.visit_import(import, fallback, batch)?;
        }
        batch.files.push(file);
        Ok(())
    }

    fn visit_import(&self, import: &Import, fallback: Option<&Path>, batch: &mut Batch) -> Result<()> {
        let path = import.path.as_str();
        if builtin_types::is_builtin_import(path) {
            tracing::trace!(import = path, "Using built-in wrapper types");
            return Ok(());
        }
        if self.loaded.contains(path) || batch.visited.contains(path) {
            return Ok(());
        }
        if let Some(source) = batch.sources.get(path).cloned() {
            return self.visit_source(path, &source, fallback, batch);
        }
        match self.search_roots.resolve(path, fallback) {
            Ok(resolved) => self.visit_file(&resolved, fallback, batch),
            Err(e) if import.kind == ImportKind::Weak => {
                tracing::warn!(import = path, error = %e, "Skipping missing weak import");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn commit(&mut self, new_files: Vec<ProtoFile>) -> Result<()> {
        if new_files.is_empty() {
            return Ok(());
        }
        let mut files = self.files.clone();
        files.extend(new_files);
        let tables = SymbolTables::build(&files, &self.tables)?;

        for file in &files[self.files.len()..] {
            self.loaded.insert(file.name.clone());
        }
        tracing::debug!(
            added = files.len() - self.files.len(),
            total = files.len(),
            messages = tables.messages.len(),
            "Committed schema batch"
        );
        self.files = files;
        self.tables = tables;
        Ok(())
    }
}

impl DescriptorPool for SchemaRegistryBuilder {
    fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.tables.message_by_full_name(full_name)
    }

    fn enumeration(&self, full_name: &str) -> Option<&EnumDescriptor> {
        self.tables.enums.get(full_name)
    }
}

// =============================================================================
// Serving phase
// =============================================================================

/// Immutable, thread-safe schema registry.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    search_roots: SearchRoots,
    files: Vec<ProtoFile>,
    loaded: HashSet<String>,
    tables: SymbolTables,
}

impl SchemaRegistry {
    /// Start a new build phase.
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Re-open the build phase to load more files. Files already loaded are kept.
    pub fn into_builder(self) -> SchemaRegistryBuilder {
        SchemaRegistryBuilder {
            search_roots: self.search_roots,
            files: self.files,
            loaded: self.loaded,
            tables: self.tables,
        }
    }

    /// Look up a message by fully-qualified or unique short name.
    ///
    /// A dotted name must match exactly. An undotted name matching several
    /// messages fails with [`CodecError::Ambiguous`].
    pub fn get_message(&self, name: &str) -> Result<&MessageDescriptor> {
        self.tables.find_message(name)
    }

    /// Look up an enum by fully-qualified or unique short name.
    pub fn get_enum(&self, name: &str) -> Result<&EnumDescriptor> {
        lookup(&self.tables.enums, name)
    }

    /// Look up a service by fully-qualified or unique short name.
    pub fn get_service(&self, name: &str) -> Result<&ServiceDescriptor> {
        lookup(&self.tables.services, name)
    }

    /// Entry message synthesised for a map field.
    pub fn map_entry_message(&self, message: &str, field: &str) -> Option<&MessageDescriptor> {
        let owner = self.get_message(message).ok()?;
        match &owner.field_by_name(field)?.ty {
            TypeDescriptor::Map { entry, .. } => self.tables.map_entries.get(entry),
            _ => None,
        }
    }

    /// Fully-qualified names of all declared messages, sorted.
    pub fn message_names(&self) -> Vec<&str> {
        self.tables.messages.keys().map(String::as_str).collect()
    }

    /// Fully-qualified names of all enums, sorted.
    pub fn enum_names(&self) -> Vec<&str> {
        self.tables.enums.keys().map(String::as_str).collect()
    }

    /// Fully-qualified names of all services, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        self.tables.services.keys().map(String::as_str).collect()
    }

    /// Identities of loaded files, in load order.
    pub fn loaded_files(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    /// Parsed files, in load order.
    pub fn files(&self) -> &[ProtoFile] {
        &self.files
    }

    /// Decode `data` as the message named `type_name`.
    pub fn decode_message(
        &self,
        type_name: &str,
        data: &[u8],
        options: &CodecOptions,
    ) -> Result<Record> {
        let message = self.get_message(type_name)?;
        codec::decode(data, message, self, options)
    }

    /// Encode `record` as the message named `type_name`.
    pub fn encode_message(
        &self,
        type_name: &str,
        record: &Record,
        options: &CodecOptions,
    ) -> Result<Vec<u8>> {
        let message = self.get_message(type_name)?;
        codec::encode(record, message, self, options)
    }
}

impl DescriptorPool for SchemaRegistry {
    fn message(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.tables.message_by_full_name(full_name)
    }

    fn enumeration(&self, full_name: &str) -> Option<&EnumDescriptor> {
        self.tables.enums.get(full_name)
    }
}
