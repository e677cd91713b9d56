// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema command - list and show loaded types.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Subcommand;
use regex::Regex;
use serde::Serialize;

use dynproto::schema::{
    EnumDescriptor, FieldDescriptor, FieldLabel, MessageDescriptor, ServiceDescriptor,
};
use dynproto::{CodecError, SchemaRegistry};

use crate::common::{output_json_or, Context, Result};

/// Schema operations.
#[derive(Subcommand, Clone, Debug)]
pub enum SchemaCmd {
    /// List all messages, enums and services
    List {
        /// Schema files or directories
        #[arg(value_name = "PROTO")]
        schemas: Vec<PathBuf>,

        /// Only list names matching this regex
        #[arg(short, long, value_name = "REGEX")]
        filter: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show one message, enum or service
    Show {
        /// Fully-qualified or unique short type name
        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Schema files or directories
        #[arg(value_name = "PROTO")]
        schemas: Vec<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

impl SchemaCmd {
    pub fn run(self, ctx: &Context) -> Result<()> {
        match self {
            SchemaCmd::List {
                schemas,
                filter,
                json,
            } => cmd_list(&ctx.load_registry(&schemas)?, filter.as_deref(), json),
            SchemaCmd::Show {
                type_name,
                schemas,
                json,
            } => cmd_show(&ctx.load_registry(&schemas)?, &type_name, json),
        }
    }
}

fn cmd_list(registry: &SchemaRegistry, filter: Option<&str>, json: bool) -> Result<()> {
    let pattern = filter
        .map(Regex::new)
        .transpose()
        .context("invalid --filter pattern")?;
    let keep = |name: &&str| pattern.as_ref().map_or(true, |re| re.is_match(name));

    let listing = TypeListing {
        files: registry.loaded_files(),
        messages: registry.message_names().into_iter().filter(keep).collect(),
        enums: registry.enum_names().into_iter().filter(keep).collect(),
        services: registry.service_names().into_iter().filter(keep).collect(),
    };

    output_json_or(json, &listing, || {
        for (kind, names) in [
            ("message", &listing.messages),
            ("enum", &listing.enums),
            ("service", &listing.services),
        ] {
            for name in names {
                println!("{kind:<8} {name}");
            }
        }
        Ok(())
    })
}

fn cmd_show(registry: &SchemaRegistry, type_name: &str, json: bool) -> Result<()> {
    let detail = find_type(registry, type_name)?;
    output_json_or(json, &detail, || {
        match &detail {
            TypeDetail::Message(message) => print_message(message),
            TypeDetail::Enum(decl) => {
                println!("enum {} {{", decl.name);
                for value in &decl.values {
                    println!("  {} = {};", value.name, value.number);
                }
                println!("}}");
            }
            TypeDetail::Service(service) => {
                println!("service {} {{", service.name);
                for m in &service.methods {
                    println!(
                        "  rpc {}({}{}) returns ({}{});",
                        m.name,
                        if m.client_streaming { "stream " } else { "" },
                        m.input_type,
                        if m.server_streaming { "stream " } else { "" },
                        m.output_type
                    );
                }
                println!("}}");
            }
        }
        Ok(())
    })
}

/// Messages first, then enums, then services. Ambiguity is reported as is.
fn find_type<'r>(registry: &'r SchemaRegistry, name: &str) -> Result<TypeDetail<'r>> {
    match registry.get_message(name) {
        Err(CodecError::NotFound { .. }) => {}
        found => return Ok(TypeDetail::Message(found?)),
    }
    match registry.get_enum(name) {
        Err(CodecError::NotFound { .. }) => {}
        found => return Ok(TypeDetail::Enum(found?)),
    }
    Ok(TypeDetail::Service(registry.get_service(name)?))
}

fn print_message(message: &MessageDescriptor) {
    println!("message {} {{", message.name);
    for field in &message.fields {
        let oneof = message
            .oneof_of(field)
            .map(|o| format!("  // oneof {}", o.name))
            .unwrap_or_default();
        println!("  {}{oneof}", field_line(field));
    }
    println!("}}");
}

fn field_line(field: &FieldDescriptor) -> String {
    let label = match field.label {
        FieldLabel::Repeated => "repeated ",
        FieldLabel::Required => "required ",
        FieldLabel::Optional => "",
    };
    let json_name = if field.json_name != dynproto::schema::descriptor::to_json_name(&field.name) {
        format!(" [json_name = \"{}\"]", field.json_name)
    } else {
        String::new()
    };
    format!(
        "{label}{} {} = {}{json_name};",
        field.ty.display_name(),
        field.name,
        field.number
    )
}

// Output types

#[derive(Serialize)]
struct TypeListing<'r> {
    files: Vec<&'r str>,
    messages: Vec<&'r str>,
    enums: Vec<&'r str>,
    services: Vec<&'r str>,
}

#[derive(Serialize)]
#[serde(tag = "kind", content = "descriptor", rename_all = "lowercase")]
enum TypeDetail<'r> {
    Message(&'r MessageDescriptor),
    Enum(&'r EnumDescriptor),
    Service(&'r ServiceDescriptor),
}
