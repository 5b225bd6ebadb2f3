//! Parameter decoding: raw URL/header strings into typed JSON values.

use crate::spec::ParameterStyle;
use serde_json::Value;

fn convert_primitive(val: &str, schema: Option<&Value>) -> Value {
    if let Some(ty) = schema.and_then(|s| s.get("type").and_then(|v| v.as_str())) {
        match ty {
            "integer" => val
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(val.to_string())),
            "number" => val
                .parse::<f64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(val.to_string())),
            "boolean" => val
                .parse::<bool>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(val.to_string())),
            _ => Value::String(val.to_string()),
        }
    } else {
        Value::String(val.to_string())
    }
}

/// Decode a raw parameter string according to its OpenAPI schema and style.
///
/// A value that cannot be parsed as the declared primitive type stays a
/// JSON string, so the schema validator reports the type mismatch instead
/// of the decoder guessing.
#[must_use]
pub fn decode_param_value(
    value: &str,
    schema: Option<&Value>,
    style: Option<ParameterStyle>,
) -> Value {
    if let Some(ty) = schema.and_then(|s| s.get("type").and_then(|v| v.as_str())) {
        if ty == "array" {
            let items_schema = schema.and_then(|s| s.get("items"));
            let delim = match style.unwrap_or(ParameterStyle::Form) {
                ParameterStyle::SpaceDelimited => ' ',
                ParameterStyle::PipeDelimited => '|',
                _ => ',',
            };
            let items: Vec<Value> = value
                .split(delim)
                .filter(|s| !s.is_empty())
                .map(|item| convert_primitive(item, items_schema))
                .collect();
            return Value::Array(items);
        }
    }
    convert_primitive(value, schema)
}

/// Build an array from the repeated occurrences of an exploded form-style
/// parameter (`?tags=a&tags=b`), one item per occurrence.
#[must_use]
pub fn decode_exploded_values(values: &[&str], schema: Option<&Value>) -> Value {
    let items_schema = schema.and_then(|s| s.get("items"));
    Value::Array(
        values
            .iter()
            .map(|v| convert_primitive(v, items_schema))
            .collect(),
    )
}
