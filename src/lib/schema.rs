//! JSON Schema generation and structural validation of capability payloads.
//!
//! Schemas are generated from statically declared Rust types with `schemars`.
//! [`validate`] checks a decoded value against such a schema and reports every
//! violation it finds; typed decoding through `serde` is the final gate.

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde_json::Value;

use crate::lib::errors::Violation;

/// Generate the JSON Schema object describing `T`.
pub fn schema_for<T: JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(object)) => object,
        // `true`/`false` schemas carry no structure to check.
        _ => JsonObject::new(),
    }
}

/// Validate `value` against `schema`, returning all violations found.
pub fn validate(schema: &JsonObject, value: &Value) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    check(schema, value, "", &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Names of the properties declared on an object schema, with their required flag
/// and description.
pub fn properties(schema: &JsonObject) -> Vec<(String, bool, Option<String>)> {
    let required = required_names(schema);
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| {
                    let description = prop
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    (name.clone(), required.contains(&name.as_str()), description)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn required_names(schema: &JsonObject) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Convert string arguments to the scalar type their property declares.
///
/// URI template bindings always arrive as text; a property typed `integer`,
/// `number`, or `boolean` gets the parsed value instead. Strings that do not
/// parse, and properties that also accept a string, are left untouched for
/// [`validate`] to judge.
pub fn coerce_strings(schema: &JsonObject, arguments: &mut JsonObject) {
    let Some(props) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };
    for (name, value) in arguments.iter_mut() {
        let Value::String(raw) = value else {
            continue;
        };
        let Some(allowed) = props.get(name).and_then(Value::as_object).map(declared_types)
        else {
            continue;
        };
        if allowed.is_empty() || allowed.contains(&"string") {
            continue;
        }
        if let Some(parsed) = allowed.iter().find_map(|name| parse_scalar(name, raw)) {
            *value = parsed;
        }
    }
}

fn parse_scalar(type_name: &str, raw: &str) -> Option<Value> {
    match type_name {
        "integer" => raw
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| raw.parse::<u64>().map(Value::from))
            .ok(),
        "number" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        "boolean" => raw.parse::<bool>().ok().map(Value::Bool),
        _ => None,
    }
}

fn declared_types(schema: &JsonObject) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn check(schema: &JsonObject, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let allowed = declared_types(schema);
    if !allowed.is_empty() && !allowed.iter().any(|name| matches_type(name, value)) {
        out.push(Violation::new(
            path,
            format!("expected {}, found {}", allowed.join(" or "), type_name(value)),
        ));
        return;
    }

    if let Some(choices) = schema.get("enum").and_then(Value::as_array) {
        if !choices.contains(value) {
            out.push(Violation::new(path, "value is not one of the allowed options"));
        }
    }

    let Value::Object(fields) = value else {
        return;
    };

    for name in required_names(schema) {
        if !fields.contains_key(name) {
            out.push(Violation::new(
                format!("{path}/{name}"),
                "required property is missing",
            ));
        }
    }

    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        for (name, prop_schema) in props {
            let (Some(prop_schema), Some(field)) = (prop_schema.as_object(), fields.get(name))
            else {
                continue;
            };
            check(prop_schema, field, &format!("{path}/{name}"), out);
        }
    }
}

fn matches_type(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|n| n.fract() == 0.0)
        }
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
