// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `.proto` schema parser using Pest.
//!
//! Produces a [`ProtoFile`] AST. Type references are kept as written; the
//! registry resolves them.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::core::CodecError;
use crate::core::Result as CoreResult;
use crate::encoding::protobuf::wire::MAX_FIELD_NUMBER;
use crate::schema::ast::{
    EnumDecl, EnumValueDecl, FieldDecl, FieldLabel, FieldTypeDecl, Import, ImportKind,
    MessageDecl, MethodDecl, OneofDecl, OptionDecl, ProtoFile, ServiceDecl, Syntax,
};

/// Pest parser for `.proto` files.
#[derive(Parser)]
#[grammar = "schema/parser/proto.pest"] // Path relative to src/ directory
pub struct ProtoParser;

/// Parse `.proto` source text.
///
/// `name` becomes the file identity and is used as context in error messages.
pub fn parse_proto(name: &str, source: &str) -> CoreResult<ProtoFile> {
    let mut pairs = ProtoParser::parse(Rule::proto, source)
        .map_err(|e| CodecError::parse(name, format!("{e}")))?;
    let root = pairs
        .next()
        .ok_or_else(|| CodecError::parse(name, "empty parse tree"))?;

    let mut file = ProtoFile::new(name);
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::syntax_decl => {
                let value = string_child(pair);
                file.syntax = match value.as_str() {
                    "proto2" => Syntax::Proto2,
                    "proto3" => Syntax::Proto3,
                    other => {
                        return Err(CodecError::parse(
                            name,
                            format!("unsupported syntax '{other}'"),
                        ))
                    }
                };
            }
            Rule::edition_decl => file.syntax = Syntax::Edition(string_child(pair)),
            Rule::import_decl => file.imports.push(parse_import(pair)),
            Rule::package_decl => {
                file.package = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::full_ident)
                    .map(|p| p.as_str().to_string());
            }
            Rule::option_decl => file.options.push(parse_option(pair)),
            Rule::message_decl => file.messages.push(parse_message(name, pair)?),
            Rule::enum_decl => file.enums.push(parse_enum(name, pair)?),
            Rule::service_decl => file.services.push(parse_service(pair)),
            Rule::extend_decl => {
                tracing::debug!(file = name, "Skipping extend block");
            }
            _ => {}
        }
    }
    Ok(file)
}

fn parse_import(pair: Pair<Rule>) -> Import {
    let mut kind = ImportKind::Default;
    let mut path = String::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::import_modifier => {
                kind = if inner.as_str().starts_with("weak") {
                    ImportKind::Weak
                } else {
                    ImportKind::Public
                };
            }
            Rule::str_lits => path = concat_strings(inner),
            _ => {}
        }
    }
    Import { path, kind }
}

fn parse_option(pair: Pair<Rule>) -> OptionDecl {
    let mut name = String::new();
    let mut value = String::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::option_name => name = inner.as_str().to_string(),
            Rule::constant => value = constant_text(inner),
            _ => {}
        }
    }
    OptionDecl { name, value }
}

fn parse_field_options(pair: Pair<Rule>) -> Vec<OptionDecl> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::field_option)
        .map(parse_option)
        .collect()
}

fn parse_message(file: &str, pair: Pair<Rule>) -> CoreResult<MessageDecl> {
    let mut inner = pair.into_inner();
    let name = next_ident(&mut inner);
    let mut message = MessageDecl::new(name.clone());

    for item in inner {
        match item.as_rule() {
            Rule::field_decl => message.fields.push(parse_field(file, &name, item)?),
            Rule::map_field => message.fields.push(parse_map_field(file, &name, item)?),
            Rule::oneof_decl => message.oneofs.push(parse_oneof(file, &name, item)?),
            Rule::message_decl => message.messages.push(parse_message(file, item)?),
            Rule::enum_decl => message.enums.push(parse_enum(file, item)?),
            Rule::extend_decl => {
                tracing::debug!(file, message = %name, "Skipping nested extend block");
            }
            _ => {}
        }
    }
    Ok(message)
}

fn parse_field(file: &str, message: &str, pair: Pair<Rule>) -> CoreResult<FieldDecl> {
    let mut label = FieldLabel::Implicit;
    let mut type_name = String::new();
    let mut name = String::new();
    let mut number_text = "";
    let mut options = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::field_label => {
                label = match inner.as_str() {
                    "optional" => FieldLabel::Optional,
                    "required" => FieldLabel::Required,
                    _ => FieldLabel::Repeated,
                };
            }
            Rule::type_name => type_name = inner.as_str().to_string(),
            Rule::ident => name = inner.as_str().to_string(),
            Rule::int_lit => number_text = inner.as_str(),
            Rule::field_options => options = parse_field_options(inner),
            _ => {}
        }
    }

    let number = field_number(file, message, &name, number_text)?;
    Ok(FieldDecl {
        name,
        number,
        label,
        ty: FieldTypeDecl::Named(type_name),
        options,
    })
}

fn parse_map_field(file: &str, message: &str, pair: Pair<Rule>) -> CoreResult<FieldDecl> {
    let mut types = Vec::with_capacity(2);
    let mut name = String::new();
    let mut number_text = "";
    let mut options = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::type_name => types.push(inner.as_str().to_string()),
            Rule::ident => name = inner.as_str().to_string(),
            Rule::int_lit => number_text = inner.as_str(),
            Rule::field_options => options = parse_field_options(inner),
            _ => {}
        }
    }

    let number = field_number(file, message, &name, number_text)?;
    let mut types = types.into_iter();
    let key = types.next().unwrap_or_default();
    let value = types.next().unwrap_or_default();
    Ok(FieldDecl {
        name,
        number,
        label: FieldLabel::Implicit,
        ty: FieldTypeDecl::Map { key, value },
        options,
    })
}

fn parse_oneof(file: &str, message: &str, pair: Pair<Rule>) -> CoreResult<OneofDecl> {
    let mut inner = pair.into_inner();
    let name = next_ident(&mut inner);
    let mut fields = Vec::new();
    for item in inner {
        if item.as_rule() == Rule::field_decl {
            let field = parse_field(file, message, item)?;
            if field.label != FieldLabel::Implicit {
                return Err(CodecError::parse(
                    file,
                    format!(
                        "oneof '{message}.{name}' member '{}' must not have a label",
                        field.name
                    ),
                ));
            }
            fields.push(field);
        }
    }
    Ok(OneofDecl { name, fields })
}

fn parse_enum(file: &str, pair: Pair<Rule>) -> CoreResult<EnumDecl> {
    let mut inner = pair.into_inner();
    let name = next_ident(&mut inner);
    let mut values = Vec::new();
    for item in inner {
        if item.as_rule() != Rule::enum_value {
            continue;
        }
        let mut value_name = String::new();
        let mut number_text = "";
        for part in item.into_inner() {
            match part.as_rule() {
                Rule::ident => value_name = part.as_str().to_string(),
                Rule::int_lit => number_text = part.as_str(),
                _ => {}
            }
        }
        let number = parse_int(number_text)
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| {
                CodecError::parse(
                    file,
                    format!("enum value '{name}.{value_name}' has invalid number '{number_text}'"),
                )
            })?;
        values.push(EnumValueDecl {
            name: value_name,
            number,
        });
    }
    Ok(EnumDecl { name, values })
}

fn parse_service(pair: Pair<Rule>) -> ServiceDecl {
    let mut inner = pair.into_inner();
    let name = next_ident(&mut inner);
    let methods = inner
        .filter(|p| p.as_rule() == Rule::rpc_decl)
        .map(parse_rpc)
        .collect();
    ServiceDecl { name, methods }
}

fn parse_rpc(pair: Pair<Rule>) -> MethodDecl {
    let mut method = MethodDecl::unary("", "", "");
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => method.name = inner.as_str().to_string(),
            Rule::rpc_input => {
                let (streaming, type_name) = parse_rpc_type(inner);
                method.client_streaming = streaming;
                method.input_type = type_name;
            }
            Rule::rpc_output => {
                let (streaming, type_name) = parse_rpc_type(inner);
                method.server_streaming = streaming;
                method.output_type = type_name;
            }
            _ => {}
        }
    }
    method
}

fn parse_rpc_type(pair: Pair<Rule>) -> (bool, String) {
    let mut streaming = false;
    let mut type_name = String::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::kw_stream => streaming = true,
            Rule::type_name => type_name = inner.as_str().to_string(),
            _ => {}
        }
    }
    (streaming, type_name)
}

// =============================================================================
// Literals
// =============================================================================

fn next_ident(pairs: &mut pest::iterators::Pairs<Rule>) -> String {
    pairs
        .find(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

fn string_child(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::str_lits)
        .map(concat_strings)
        .unwrap_or_default()
}

fn constant_text(pair: Pair<Rule>) -> String {
    match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::str_lits => concat_strings(inner),
        Some(inner) => inner.as_str().to_string(),
        None => String::new(),
    }
}

/// Adjacent string literals concatenate, as in C.
fn concat_strings(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::str_lit)
        .map(|p| unescape(p.as_str()))
        .collect()
}

/// Strip quotes and resolve escape sequences of a string literal.
fn unescape(quoted: &str) -> String {
    let body = quoted
        .get(1..quoted.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(d @ '0'..='7') => {
                // Octal escape: up to three digits
                let mut code = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(v) => {
                            code = code * 8 + v;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            Some('x') | Some('X') => {
                let mut code = 0u32;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            code = code * 16 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Parse an integer literal (decimal, hex `0x..` or octal `0..`).
fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn field_number(file: &str, message: &str, field: &str, text: &str) -> CoreResult<u32> {
    parse_int(text)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| (1..=MAX_FIELD_NUMBER).contains(&n))
        .ok_or_else(|| {
            CodecError::parse(
                file,
                format!("field '{message}.{field}' has invalid number '{text}'"),
            )
        })
}
