use std::collections::HashMap;
use thiserror::Error;

use crate::config::schema::resolve_schema_refs;
use crate::config::Settings;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid schema {name}: {reason}")]
    InvalidSchema { name: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct SettingsValidator;

impl SettingsValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_names = HashMap::new();

        for (idx, schema) in settings.schemas.iter().enumerate() {
            if schema.name.is_empty() {
                errors.push(ValidationError::MissingField(format!("schemas[{}].name", idx)));
                continue;
            }

            if let Some(prev_idx) = seen_names.insert(&schema.name, idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Schema name '{}' appears at indices {} and {}",
                    schema.name, prev_idx, idx
                )));
            }

            // Compiling catches bad regexes, unresolved $refs and malformed JSON Schema.
            let checked = match (&schema.json_schema, schema.is_fragment()) {
                (Some(fragment), true) => {
                    resolve_schema_refs(fragment, &settings.schemas).map(|_| ())
                }
                _ => schema.build(&settings.schemas).map(|_| ()),
            };
            if let Err(e) = checked {
                errors.push(ValidationError::InvalidSchema {
                    name: schema.name.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
