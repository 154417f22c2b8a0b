//! Strict JSON schemas for structured model output

use schemars::JsonSchema;
use serde_json::Value;

use super::provider::ResponseFormat;

/// Build a strict response format from the `JsonSchema` derive of `T`.
///
/// Strict mode on OpenAI-compatible endpoints accepts only a subset of JSON
/// Schema, so the generator's `$schema`, `title` and numeric `format` hints are
/// dropped and every object is closed with `additionalProperties: false`.
pub fn strict_response_format<T: JsonSchema>(name: &str) -> ResponseFormat {
    let mut schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
    if let Value::Object(root) = &mut schema {
        root.remove("$schema");
        root.remove("title");
    }
    close_objects(&mut schema);
    ResponseFormat::json_schema(name, schema)
}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            if map.get("type").and_then(Value::as_str) == Some("integer") {
                map.remove("format");
                map.remove("minimum");
            }
            for child in map.values_mut() {
                close_objects(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}
