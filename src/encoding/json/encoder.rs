// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record to JSON conversion.

use serde_json::{Map, Number, Value};

use crate::core::{CodecError, DynamicValue, Record, Result as CoreResult};

/// Renders decoded records as JSON.
///
/// Bytes become lowercase hex strings, map keys become strings and
/// non-finite floats become `"NaN"`, `"Infinity"` or `"-Infinity"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder {
    pretty: bool,
}

impl JsonEncoder {
    /// Create a compact encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder that indents its output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Render a record as JSON text.
    pub fn encode(&self, record: &Record) -> CoreResult<String> {
        let value = record_to_json(record);
        let text = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        text.map_err(|e| CodecError::parse("json encode", format!("{e}")))
    }
}

/// Convert a record into a JSON object.
pub fn record_to_json(record: &Record) -> Value {
    let mut sorted: Vec<_> = record.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    Value::Object(
        sorted
            .into_iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect::<Map<_, _>>(),
    )
}

/// Convert any dynamic value into JSON.
pub fn value_to_json(value: &DynamicValue) -> Value {
    match value {
        DynamicValue::Null => Value::Null,
        DynamicValue::Bool(b) => Value::Bool(*b),
        DynamicValue::Int32(v) => Value::from(*v),
        DynamicValue::Int64(v) => Value::from(*v),
        DynamicValue::UInt32(v) => Value::from(*v),
        DynamicValue::UInt64(v) => Value::from(*v),
        DynamicValue::Float32(v) => float_to_json(f64::from(*v)),
        DynamicValue::Float64(v) => float_to_json(*v),
        DynamicValue::String(s) => Value::String(s.clone()),
        DynamicValue::Bytes(b) => Value::String(hex::encode(b)),
        DynamicValue::Array(items) => Value::Array(items.iter().map(value_to_json).collect()),
        DynamicValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), value_to_json(v)))
                .collect(),
        ),
        DynamicValue::Record(record) => record_to_json(record),
    }
}

fn float_to_json(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(n) => Value::Number(n),
        None if v.is_nan() => Value::String("NaN".to_string()),
        None if v > 0.0 => Value::String("Infinity".to_string()),
        None => Value::String("-Infinity".to_string()),
    }
}
