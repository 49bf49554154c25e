use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;

/// Current value per declared field
pub type FieldValues = BTreeMap<String, String>;

/// Ordered violation messages per failing field. A missing key or an empty
/// list means the field is valid.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Whether a field has been blurred at least once
pub type FocusedFields = BTreeMap<String, bool>;

/// Result of checking a set of values against a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "errors", rename_all = "lowercase")]
pub enum ValidationResult {
    Valid,
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Error mapping for display; empty when valid.
    pub fn into_errors(self) -> FieldErrors {
        match self {
            ValidationResult::Valid => FieldErrors::new(),
            ValidationResult::Invalid(errors) => errors,
        }
    }

    /// Build a result from collected errors, treating an empty mapping as valid.
    pub fn from_errors(errors: FieldErrors) -> Self {
        if errors.values().all(Vec::is_empty) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }
}

/// Outcome yielded by a remote submission action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "errors", rename_all = "lowercase")]
pub enum SubmissionOutcome {
    Success,
    Rejected(FieldErrors),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success)
    }

    /// Outcome equivalent of a validation pass: valid maps to the success
    /// sentinel, anything else to a rejection.
    pub fn from_errors(errors: FieldErrors) -> Self {
        if errors.is_empty() {
            SubmissionOutcome::Success
        } else {
            SubmissionOutcome::Rejected(errors)
        }
    }
}

/// Raw submitted entries, in submission order. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value submitted under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values submitted under `name`
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapse entries into a value mapping; the last entry for a name wins.
    pub fn to_values(&self) -> FieldValues {
        self.entries.iter().cloned().collect()
    }
}

impl From<&FieldValues> for FormData {
    fn from(values: &FieldValues) -> Self {
        Self {
            entries: values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Submit event crossing the rendering boundary
#[derive(Debug, Clone, Default)]
pub struct SubmitEvent {
    form_data: FormData,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form_data: FormData) -> Self {
        Self {
            form_data,
            default_prevented: false,
        }
    }

    /// Stop the host from performing its own navigation/submission
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }
}

/// A declarative schema the form validates against
pub trait Schema: Send + Sync {
    fn safe_parse(&self, values: &FieldValues) -> ValidationResult;
}

/// Remote submission action. Receives the most recently observed outcome and
/// the raw payload; network failures must be folded into the returned outcome.
#[async_trait]
pub trait SubmitAction: Send + Sync {
    async fn submit(&self, previous: SubmissionOutcome, payload: FormData) -> SubmissionOutcome;
}

/// Adapter turning an async closure into a [`SubmitAction`]
pub struct FnAction<F>(F);

/// Wrap `f` so it can be used as a form's submission action.
pub fn action_fn<F, Fut>(f: F) -> FnAction<F>
where
    F: Fn(SubmissionOutcome, FormData) -> Fut + Send + Sync,
    Fut: Future<Output = SubmissionOutcome> + Send + 'static,
{
    FnAction(f)
}

#[async_trait]
impl<F, Fut> SubmitAction for FnAction<F>
where
    F: Fn(SubmissionOutcome, FormData) -> Fut + Send + Sync,
    Fut: Future<Output = SubmissionOutcome> + Send + 'static,
{
    async fn submit(&self, previous: SubmissionOutcome, payload: FormData) -> SubmissionOutcome {
        (self.0)(previous, payload).await
    }
}
