//! Named, reusable schema definitions.
//!
//! A definition is either a list of fields with rules:
//!
//! ```yaml
//! name: signup
//! description: Account creation form
//! fields:
//!   - name: email
//!     rules:
//!       - rule: required
//!       - rule: email
//!   - name: password
//!     rules:
//!       - rule: required
//!       - rule: min_length
//!         min: 8
//! ```
//!
//! or a JSON Schema object, which may pull in other definitions with `$ref`:
//!
//! ```yaml
//! name: profile
//! json_schema:
//!   type: object
//!   properties:
//!     email:
//!       $ref: EmailField
//!   required: [email]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FormError, FormResult};
use crate::schema::{FieldSchema, ObjectSchema};

/// Configuration for a reusable form schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Unique name (used by `$ref` and the CLI)
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<Value>,
}

impl SchemaConfig {
    /// A JSON Schema that does not describe an object. Fragments exist to be
    /// pulled into other definitions with `$ref` and cannot back a form.
    pub fn is_fragment(&self) -> bool {
        self.json_schema
            .as_ref()
            .and_then(|schema| schema.get("type"))
            .is_some_and(|ty| ty.as_str() != Some("object"))
    }

    /// Compile this definition, resolving `$ref`s against `schemas`.
    pub fn build(&self, schemas: &[SchemaConfig]) -> FormResult<ObjectSchema> {
        match &self.json_schema {
            Some(json_schema) => {
                if !self.fields.is_empty() {
                    return Err(FormError::InvalidSchema {
                        field: self.name.clone(),
                        reason: "declare either `fields` or `json_schema`, not both".to_string(),
                    });
                }
                let resolved = resolve_schema_refs(json_schema, schemas)?;
                ObjectSchema::from_json_schema(&resolved)
            }
            None => ObjectSchema::from_fields(self.fields.clone()),
        }
    }
}

/// Replace every `{"$ref": "Name"}` object with the JSON Schema of the named
/// definition. Resolution is recursive; cycles are reported as errors.
pub fn resolve_schema_refs(value: &Value, schemas: &[SchemaConfig]) -> FormResult<Value> {
    resolve(value, schemas, &mut Vec::new())
}

fn resolve(value: &Value, schemas: &[SchemaConfig], stack: &mut Vec<String>) -> FormResult<Value> {
    match value {
        Value::Object(map) => {
            if let Some(ref_name) = get_ref_name(value) {
                if stack.contains(&ref_name) {
                    return Err(FormError::InvalidSchema {
                        field: ref_name,
                        reason: "circular $ref".to_string(),
                    });
                }
                let target = schemas
                    .iter()
                    .find(|s| s.name == ref_name)
                    .and_then(|s| s.json_schema.as_ref())
                    .ok_or_else(|| FormError::SchemaNotFound(ref_name.clone()))?;

                stack.push(ref_name);
                let resolved = resolve(target, schemas, stack);
                stack.pop();
                return resolved;
            }

            let mut resolved = serde_json::Map::new();
            for (key, val) in map {
                resolved.insert(key.clone(), resolve(val, schemas, stack)?);
            }
            Ok(Value::Object(resolved))
        }
        Value::Array(arr) => arr
            .iter()
            .map(|v| resolve(v, schemas, stack))
            .collect::<FormResult<Vec<_>>>()
            .map(Value::Array),
        _ => Ok(value.clone()),
    }
}

/// Extract the schema name from a `$ref` value
pub fn get_ref_name(value: &Value) -> Option<String> {
    if let Value::Object(map) = value {
        if map.len() == 1 {
            if let Some(Value::String(name)) = map.get("$ref") {
                return Some(name.clone());
            }
        }
    }
    None
}
