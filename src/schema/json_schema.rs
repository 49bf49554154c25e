//! Build an [`ObjectSchema`] from the `type: object` subset of JSON Schema.
//!
//! Supported keywords: `properties`, `required`, `description`, `minLength`,
//! `maxLength`, `pattern`, `format: email`, `enum` (strings) and
//! `type: integer` with `minimum`/`maximum`. Anything else is ignored.

use serde_json::{Map, Value};
use tracing::debug;

use super::{FieldRule, FieldSchema, ObjectSchema};
use crate::error::{FormError, FormResult};

const ROOT: &str = "$";

pub fn from_json_schema(value: &Value) -> FormResult<ObjectSchema> {
    let object = value.as_object().ok_or_else(|| invalid(ROOT, "schema must be an object"))?;

    if let Some(ty) = object.get("type") {
        if ty.as_str() != Some("object") {
            return Err(invalid(ROOT, "only `type: object` schemas describe forms"));
        }
    }

    let empty = Map::new();
    let properties = match object.get("properties") {
        Some(Value::Object(props)) => props,
        Some(_) => return Err(invalid(ROOT, "`properties` must be an object")),
        None => &empty,
    };

    let required: Vec<&str> = match object.get("required") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(_) => return Err(invalid(ROOT, "`required` must be an array")),
        None => Vec::new(),
    };

    for name in &required {
        if !properties.contains_key(*name) {
            return Err(invalid(name, "listed in `required` but not declared in `properties`"));
        }
    }

    let mut fields = Vec::with_capacity(properties.len());
    for (name, property) in properties {
        let mut field = property_to_field(name, property)?;
        if required.contains(&name.as_str()) {
            field.rules.insert(0, FieldRule::Required { message: None });
        }
        fields.push(field);
    }

    debug!(fields = fields.len(), "compiled JSON schema");
    ObjectSchema::from_fields(fields)
}

fn property_to_field(name: &str, property: &Value) -> FormResult<FieldSchema> {
    let property = property
        .as_object()
        .ok_or_else(|| invalid(name, "property schema must be an object"))?;

    let mut field = FieldSchema::new(name);
    if let Some(description) = property.get("description").and_then(Value::as_str) {
        field = field.describe(description);
    }

    if property.get("type").and_then(Value::as_str) == Some("integer") {
        field = field.integer(
            property.get("minimum").and_then(Value::as_i64),
            property.get("maximum").and_then(Value::as_i64),
        );
    }
    if let Some(min) = property.get("minLength").and_then(Value::as_u64) {
        field = field.min_length(min as usize);
    }
    if let Some(max) = property.get("maxLength").and_then(Value::as_u64) {
        field = field.max_length(max as usize);
    }
    if property.get("format").and_then(Value::as_str) == Some("email") {
        field = field.email();
    }
    if let Some(pattern) = property.get("pattern").and_then(Value::as_str) {
        field = field.pattern(pattern);
    }
    if let Some(Value::Array(values)) = property.get("enum") {
        let values: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
        if !values.is_empty() {
            field = field.one_of(values);
        }
    }

    Ok(field)
}

fn invalid(field: &str, reason: &str) -> FormError {
    FormError::InvalidSchema {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
