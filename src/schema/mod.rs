//! Declarative object schemas and the validation gate.
//!
//! An [`ObjectSchema`] is an ordered list of fields, each with a list of
//! [`FieldRule`]s. Schemas can be assembled in code:
//!
//! ```rust
//! use formgate::schema::{FieldSchema, ObjectSchema};
//!
//! let schema = ObjectSchema::builder()
//!     .field(FieldSchema::new("email").required().email())
//!     .field(FieldSchema::new("nickname").max_length(20))
//!     .build()
//!     .unwrap();
//! assert_eq!(schema.field_names().count(), 2);
//! ```
//!
//! or loaded from configuration (see [`crate::config::schema`]), either as a
//! list of fields or as a JSON Schema object.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{FieldErrors, FieldValues, Schema, ValidationResult};
use crate::error::{FormError, FormResult};

pub mod gate;
pub mod json_schema;
pub mod rules;

pub use gate::SchemaGate;
pub use rules::FieldRule;

use rules::CompiledRule;

/// Declaration of a single form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<FieldRule>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            rules: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(FieldRule::Required { message: None })
    }

    pub fn required_with(self, message: impl Into<String>) -> Self {
        self.rule(FieldRule::Required {
            message: Some(message.into()),
        })
    }

    pub fn min_length(self, min: usize) -> Self {
        self.rule(FieldRule::MinLength { min, message: None })
    }

    pub fn max_length(self, max: usize) -> Self {
        self.rule(FieldRule::MaxLength { max, message: None })
    }

    pub fn email(self) -> Self {
        self.rule(FieldRule::Email { message: None })
    }

    pub fn pattern(self, regex: impl Into<String>) -> Self {
        self.rule(FieldRule::Pattern {
            regex: regex.into(),
            message: None,
        })
    }

    pub fn one_of<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(FieldRule::OneOf {
            values: values.into_iter().map(Into::into).collect(),
            message: None,
        })
    }

    pub fn integer(self, min: Option<i64>, max: Option<i64>) -> Self {
        self.rule(FieldRule::Integer {
            min,
            max,
            message: None,
        })
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(FieldRule::is_required)
    }
}

#[derive(Debug, Clone)]
struct CompiledField {
    definition: FieldSchema,
    rules: Vec<CompiledRule>,
}

impl CompiledField {
    fn check(&self, value: Option<&str>) -> Vec<String> {
        let value = value.unwrap_or("");

        // A failed `required` short-circuits; other rules only apply to non-empty values.
        if let Some(message) = self
            .rules
            .iter()
            .filter(|rule| rule.is_required())
            .find_map(|rule| rule.violation(value))
        {
            return vec![message];
        }
        if value.is_empty() {
            return Vec::new();
        }

        self.rules
            .iter()
            .filter(|rule| !rule.is_required())
            .filter_map(|rule| rule.violation(value))
            .collect()
    }
}

/// Compiled, immutable object schema
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    fields: Vec<CompiledField>,
}

impl ObjectSchema {
    pub fn builder() -> ObjectSchemaBuilder {
        ObjectSchemaBuilder::default()
    }

    /// Compile field declarations. Field names must be unique and non-empty.
    pub fn from_fields(fields: Vec<FieldSchema>) -> FormResult<Self> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(fields.len());

        for field in fields {
            if field.name.is_empty() {
                return Err(FormError::InvalidSchema {
                    field: String::new(),
                    reason: "field name must not be empty".to_string(),
                });
            }
            if !seen.insert(field.name.clone()) {
                return Err(FormError::InvalidSchema {
                    field: field.name,
                    reason: "field declared more than once".to_string(),
                });
            }
            let rules = field
                .rules
                .iter()
                .map(|rule| CompiledRule::compile(&field.name, rule))
                .collect::<FormResult<Vec<_>>>()?;
            compiled.push(CompiledField {
                definition: field,
                rules,
            });
        }

        Ok(Self { fields: compiled })
    }

    /// See [`json_schema`] for the supported keywords.
    pub fn from_json_schema(value: &serde_json::Value) -> FormResult<Self> {
        json_schema::from_json_schema(value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.definition.name.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().map(|f| &f.definition)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields().find(|f| f.name == name)
    }

    /// Value mapping with every declared field set to the empty string
    pub fn empty_values(&self) -> FieldValues {
        self.field_names()
            .map(|name| (name.to_string(), String::new()))
            .collect()
    }
}

impl Schema for ObjectSchema {
    fn safe_parse(&self, values: &FieldValues) -> ValidationResult {
        let mut errors = FieldErrors::new();
        for field in &self.fields {
            let messages = field.check(values.get(&field.definition.name).map(String::as_str));
            if !messages.is_empty() {
                errors.insert(field.definition.name.clone(), messages);
            }
        }
        ValidationResult::from_errors(errors)
    }
}

#[derive(Debug, Default)]
pub struct ObjectSchemaBuilder {
    fields: Vec<FieldSchema>,
}

impl ObjectSchemaBuilder {
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> FormResult<ObjectSchema> {
        ObjectSchema::from_fields(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> ObjectSchema {
        ObjectSchema::builder()
            .field(FieldSchema::new("email").required().email())
            .field(FieldSchema::new("password").required().min_length(8).pattern("[0-9]"))
            .field(FieldSchema::new("nickname").max_length(5))
            .build()
            .unwrap()
    }

    fn values(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_required_short_circuits() {
        let errors = signup().safe_parse(&values(&[])).into_errors();
        assert_eq!(errors["email"], vec!["Required"]);
        assert_eq!(errors["password"], vec!["Required"]);
        assert!(!errors.contains_key("nickname"));
    }

    #[test]
    fn test_messages_in_rule_order() {
        let errors = signup()
            .safe_parse(&values(&[("email", "a@b.com"), ("password", "short")]))
            .into_errors();
        assert_eq!(
            errors["password"],
            vec!["Must be at least 8 characters", "Invalid format"]
        );
        assert!(!errors.contains_key("email"));
    }

    #[test]
    fn test_optional_empty_field_is_valid() {
        let result = signup().safe_parse(&values(&[
            ("email", "a@b.com"),
            ("password", "longenough1"),
            ("nickname", ""),
        ]));
        assert!(result.is_valid());
    }

    #[test]
    fn test_extra_keys_ignored() {
        let result = signup().safe_parse(&values(&[
            ("email", "a@b.com"),
            ("password", "longenough1"),
            ("unexpected", "whatever"),
        ]));
        assert!(result.is_valid());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = ObjectSchema::builder()
            .field(FieldSchema::new("email"))
            .field(FieldSchema::new("email"))
            .build();
        assert!(matches!(result, Err(FormError::InvalidSchema { field, .. }) if field == "email"));
    }

    #[test]
    fn test_field_description_from_yaml() {
        let yaml = "name: email\ndescription: Work address\nrules:\n  - rule: email\n";
        let field: FieldSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            field,
            FieldSchema::new("email").describe("Work address").email()
        );
    }

    #[test]
    fn test_empty_values_covers_declared_fields() {
        let empty = signup().empty_values();
        assert_eq!(
            empty.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["email", "nickname", "password"]
        );
        assert!(empty.values().all(String::is_empty));
    }
}
