use tracing::debug;

use crate::domain::{FieldErrors, FieldValues, FormData, Schema, ValidationResult};

/// Stateless entry point for checking values against a [`Schema`]
pub struct SchemaGate;

impl SchemaGate {
    /// Validate `values` against `schema`. Pure: the schema is never mutated
    /// and the same inputs always yield the same result.
    pub fn validate<S: Schema + ?Sized>(schema: &S, values: &FieldValues) -> ValidationResult {
        let result = schema.safe_parse(values);
        match &result {
            ValidationResult::Valid => debug!(fields = values.len(), "validation passed"),
            ValidationResult::Invalid(errors) => debug!(
                fields = values.len(),
                failing = errors.len(),
                "validation failed"
            ),
        }
        result
    }

    /// Single-field, single-message error mapping. Used by submission actions
    /// to report server-side failures.
    pub fn build_field_error(field: &str, message: &str) -> FieldErrors {
        FieldErrors::from([(field.to_string(), vec![message.to_string()])])
    }

    /// Re-run the schema over a submitted payload. When a name is submitted
    /// more than once the last entry is checked.
    pub fn initial_form_check<S: Schema + ?Sized>(
        form_data: &FormData,
        schema: &S,
    ) -> Result<(), FieldErrors> {
        match Self::validate(schema, &form_data.to_values()) {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }
}
