//! Conversion between `serde_json::Value` and the SDK's `Document`, used for
//! `additionalModelRequestFields`.

use aws_smithy_types::{Document, Number};
use serde_json::{Map, Value};

pub fn to_document(value: &Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(*b),
        Value::Number(n) => Document::Number(if let Some(u) = n.as_u64() {
            Number::PosInt(u)
        } else if let Some(i) = n.as_i64() {
            Number::NegInt(i)
        } else {
            Number::Float(n.as_f64().unwrap_or_default())
        }),
        Value::String(s) => Document::String(s.clone()),
        Value::Array(items) => Document::Array(items.iter().map(to_document).collect()),
        Value::Object(map) => Document::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), to_document(value)))
                .collect(),
        ),
    }
}

pub fn from_document(document: &Document) -> Value {
    match document {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Number(Number::PosInt(u)) => Value::from(*u),
        Document::Number(Number::NegInt(i)) => Value::from(*i),
        // Non-finite floats have no JSON form.
        Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Document::String(s) => Value::String(s.clone()),
        Document::Array(items) => Value::Array(items.iter().map(from_document).collect()),
        Document::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), from_document(value)))
                .collect(),
        ),
    }
}

pub fn map_to_document(map: &Map<String, Value>) -> Document {
    Document::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), to_document(value)))
            .collect(),
    )
}

/// The document as a JSON object, or `None` if it is anything else.
pub fn document_to_map(document: &Document) -> Option<Map<String, Value>> {
    match from_document(document) {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
