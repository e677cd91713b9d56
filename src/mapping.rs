// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Explicit mapping from decoded records into caller types.
//!
//! The codec only produces [`Record`]s. Callers that want their own structs
//! describe the layout they expect with a [`RecordShape`], project the record
//! through it (which checks presence and value kinds, reporting dotted paths)
//! and then build their type from the projected record via [`FromRecord`].
//!
//! ```
//! use dynproto::mapping::{from_record, FromRecord, RecordShape, Shape};
//! use dynproto::{DynamicValue, Record, Result};
//!
//! struct Person {
//!     id: i64,
//!     name: Option<String>,
//! }
//!
//! impl FromRecord for Person {
//!     fn shape() -> RecordShape {
//!         RecordShape::new()
//!             .required("id", Shape::Int)
//!             .optional("name", Shape::String)
//!     }
//!
//!     fn from_record(record: &Record) -> Result<Self> {
//!         Ok(Person {
//!             id: record["id"].as_i64().unwrap_or_default(),
//!             name: record["name"].as_str().map(str::to_string),
//!         })
//!     }
//! }
//!
//! let record = DynamicValue::record([("id", DynamicValue::Int32(7))]);
//! let person: Person = from_record(record.as_record().unwrap()).unwrap();
//! assert_eq!(person.id, 7);
//! assert_eq!(person.name, None);
//! ```

use crate::core::{CodecError, DynamicValue, Record, Result};

/// Expected kind of a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Any value, unchecked
    Any,
    Bool,
    /// `Int32` or `Int64`
    Int,
    /// `UInt32` or `UInt64`
    UInt,
    /// `Float32` or `Float64`
    Float,
    String,
    Bytes,
    /// Array whose items all have the inner shape
    List(Box<Shape>),
    /// Map whose values all have the inner shape
    Map(Box<Shape>),
    /// Nested record
    Record(RecordShape),
}

impl Shape {
    /// Shorthand for [`Shape::List`].
    pub fn list(item: Shape) -> Self {
        Shape::List(Box::new(item))
    }

    /// Shorthand for [`Shape::Map`].
    pub fn map(value: Shape) -> Self {
        Shape::Map(Box::new(value))
    }

    fn name(&self) -> String {
        match self {
            Shape::Any => "any".to_string(),
            Shape::Bool => "bool".to_string(),
            Shape::Int => "signed integer".to_string(),
            Shape::UInt => "unsigned integer".to_string(),
            Shape::Float => "float".to_string(),
            Shape::String => "string".to_string(),
            Shape::Bytes => "bytes".to_string(),
            Shape::List(item) => format!("list of {}", item.name()),
            Shape::Map(value) => format!("map of {}", value.name()),
            Shape::Record(_) => "record".to_string(),
        }
    }

    fn project(&self, value: &DynamicValue) -> Result<DynamicValue> {
        let mismatch = || CodecError::type_mismatch(self.name(), value.type_name());
        match (self, value) {
            (Shape::Any, v) => Ok(v.clone()),
            (Shape::Bool, DynamicValue::Bool(_))
            | (Shape::Int, DynamicValue::Int32(_) | DynamicValue::Int64(_))
            | (Shape::UInt, DynamicValue::UInt32(_) | DynamicValue::UInt64(_))
            | (Shape::Float, DynamicValue::Float32(_) | DynamicValue::Float64(_))
            | (Shape::String, DynamicValue::String(_))
            | (Shape::Bytes, DynamicValue::Bytes(_)) => Ok(value.clone()),
            (Shape::List(item), DynamicValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| item.project(v).map_err(|e| e.in_field(format!("[{i}]"))))
                .collect::<Result<Vec<_>>>()
                .map(DynamicValue::Array),
            (Shape::Map(inner), DynamicValue::Map(entries)) => entries
                .iter()
                .map(|(k, v)| {
                    inner
                        .project(v)
                        .map(|v| (k.clone(), v))
                        .map_err(|e| e.in_field(format!("[{k}]")))
                })
                .collect::<Result<_>>()
                .map(DynamicValue::Map),
            (Shape::Record(shape), DynamicValue::Record(record)) => {
                shape.project(record).map(DynamicValue::Record)
            }
            _ => Err(mismatch()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ShapeField {
    name: String,
    shape: Shape,
    required: bool,
}

/// Expected layout of a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordShape {
    fields: Vec<ShapeField>,
}

impl RecordShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field that must be present and non-null.
    pub fn required(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(ShapeField {
            name: name.into(),
            shape,
            required: true,
        });
        self
    }

    /// Declare a field that may be absent or null.
    pub fn optional(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(ShapeField {
            name: name.into(),
            shape,
            required: false,
        });
        self
    }

    /// Check `record` against this shape.
    ///
    /// The result holds exactly the declared fields: undeclared keys are
    /// dropped and absent optional fields are [`DynamicValue::Null`].
    pub fn project(&self, record: &Record) -> Result<Record> {
        let mut projected = Record::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match record.get(&field.name) {
                Some(v) if !v.is_null() => field
                    .shape
                    .project(v)
                    .map_err(|e| e.in_field(&field.name))?,
                _ if field.required => {
                    return Err(
                        CodecError::type_mismatch(field.shape.name(), "missing")
                            .in_field(&field.name),
                    )
                }
                _ => DynamicValue::Null,
            };
            projected.insert(field.name.clone(), value);
        }
        Ok(projected)
    }
}

/// A caller type built from a decoded record.
pub trait FromRecord: Sized {
    /// Layout [`FromRecord::from_record`] relies on.
    fn shape() -> RecordShape;

    /// Build the value from a record already projected through [`FromRecord::shape`].
    fn from_record(record: &Record) -> Result<Self>;
}

/// Project `record` through `T`'s shape and build a `T`.
pub fn from_record<T: FromRecord>(record: &Record) -> Result<T> {
    let projected = T::shape().project(record)?;
    T::from_record(&projected)
}
