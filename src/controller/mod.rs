//! Form controller: owns one form's values, focus flags and displayed errors.
//!
//! Every mutation goes through the controller. Local validation runs
//! synchronously on each change; submissions run the remote action on the
//! tokio runtime and reconcile its outcome afterwards. Each submission is
//! tagged with a sequence number and only the latest issued one may touch the
//! displayed errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{
    FieldErrors, FieldValues, FocusedFields, FormData, Schema, SubmissionOutcome, SubmitAction,
    SubmitEvent, ValidationResult,
};
use crate::error::{FormError, FormResult};
use crate::schema::SchemaGate;

pub mod binding;
pub mod submission;

pub use binding::FieldBinding;
pub use submission::{Resolution, SubmissionHandle, SubmitResult};


/// Callback fired once per applied successful submission, after the state
/// lock is released. Receives the form so it can schedule follow-up work
/// such as a reset.
pub type SuccessCallback = Arc<dyn Fn(&FormController) + Send + Sync>;

/// What `reset` does with the focused-field flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Keep "has been blurred" flags across a reset.
    #[default]
    KeepFocused,
    /// Clear every focused flag on reset.
    ClearFocused,
}

#[derive(Clone, Default)]
pub struct FormOptions {
    pub on_success: Option<SuccessCallback>,
    pub reset_policy: ResetPolicy,
    /// Show errors for the default values immediately instead of starting pristine.
    pub validate_on_mount: bool,
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn(&FormController) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    pub fn validate_on_mount(mut self, enabled: bool) -> Self {
        self.validate_on_mount = enabled;
        self
    }
}

impl fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("on_success", &self.on_success.is_some())
            .field("reset_policy", &self.reset_policy)
            .field("validate_on_mount", &self.validate_on_mount)
            .finish()
    }
}

struct FormState {
    values: FieldValues,
    focused: FocusedFields,
    displayed_errors: FieldErrors,
    latest_outcome: SubmissionOutcome,
    /// Sequence number of the most recently issued submission
    issued: u64,
}

/// Stateful controller bound to a single form instance.
///
/// Cloning yields another handle to the same form.
#[derive(Clone)]
pub struct FormController {
    schema: Arc<dyn Schema>,
    action: Arc<dyn SubmitAction>,
    defaults: Arc<FieldValues>,
    pristine_errors: Arc<FieldErrors>,
    options: FormOptions,
    state: Arc<RwLock<FormState>>,
}

impl FormController {
    /// The field set is fixed to the keys of `default_values`.
    pub fn new<S, A>(
        schema: S,
        action: A,
        default_values: FieldValues,
        options: FormOptions,
    ) -> Self
    where
        S: Schema + 'static,
        A: SubmitAction + 'static,
    {
        Self::from_shared(Arc::new(schema), Arc::new(action), default_values, options)
    }

    pub fn from_shared(
        schema: Arc<dyn Schema>,
        action: Arc<dyn SubmitAction>,
        default_values: FieldValues,
        options: FormOptions,
    ) -> Self {
        let pristine_errors =
            SchemaGate::validate(schema.as_ref(), &FieldValues::new()).into_errors();

        let displayed_errors = if options.validate_on_mount {
            SchemaGate::validate(schema.as_ref(), &default_values).into_errors()
        } else {
            FieldErrors::new()
        };

        let state = FormState {
            values: default_values.clone(),
            focused: unfocused(&default_values),
            displayed_errors,
            // Always a rejection: no submission has succeeded yet.
            latest_outcome: SubmissionOutcome::Rejected(pristine_errors.clone()),
            issued: 0,
        };

        debug!(
            fields = default_values.len(),
            pristine_failures = pristine_errors.len(),
            "form controller created"
        );

        Self {
            schema,
            action,
            defaults: Arc::new(default_values),
            pristine_errors: Arc::new(pristine_errors),
            options,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Set a field's value and revalidate the whole form.
    pub async fn on_field_change(
        &self,
        field: &str,
        raw_value: impl Into<String>,
    ) -> FormResult<()> {
        let mut state = self.state.write().await;
        let slot = state
            .values
            .get_mut(field)
            .ok_or_else(|| unknown_field(field))?;
        *slot = raw_value.into();

        let errors = SchemaGate::validate(self.schema.as_ref(), &state.values).into_errors();
        debug!(field, failing = errors.len(), "field changed");
        state.displayed_errors = errors;
        Ok(())
    }

    /// Mark a field as blurred. Displayed errors are left alone.
    pub async fn on_field_blur(&self, field: &str) -> FormResult<()> {
        let mut state = self.state.write().await;
        let flag = state
            .focused
            .get_mut(field)
            .ok_or_else(|| unknown_field(field))?;
        *flag = true;
        Ok(())
    }

    /// Validate and, when valid, dispatch the event's payload to the action.
    ///
    /// Returns as soon as the action is spawned; the outcome is applied by the
    /// spawned task. Must be called from within a tokio runtime.
    pub async fn submit(&self, event: &mut SubmitEvent) -> SubmitResult {
        event.prevent_default();

        let (seq, previous) = {
            let mut state = self.state.write().await;
            if let ValidationResult::Invalid(errors) =
                SchemaGate::validate(self.schema.as_ref(), &state.values)
            {
                debug!(failing = errors.len(), "submission blocked by local validation");
                state.displayed_errors = errors.clone();
                return SubmitResult::Rejected(errors);
            }
            state.issued += 1;
            (state.issued, state.latest_outcome.clone())
        };

        let payload = event.form_data().clone();
        info!(seq, entries = payload.len(), "dispatching form submission");

        let controller = self.clone();
        let task = tokio::spawn(async move {
            let outcome = controller.action.submit(previous, payload).await;
            controller.apply_outcome(seq, outcome).await
        });

        SubmitResult::Dispatched(SubmissionHandle::new(seq, task))
    }

    async fn apply_outcome(&self, seq: u64, outcome: SubmissionOutcome) -> Resolution {
        {
            let mut state = self.state.write().await;
            if seq != state.issued {
                warn!(seq, latest = state.issued, "discarding superseded submission outcome");
                return Resolution::Superseded {
                    seq,
                    latest: state.issued,
                };
            }

            match &outcome {
                SubmissionOutcome::Success => {
                    state.displayed_errors.clear();
                    info!(seq, "submission succeeded");
                }
                SubmissionOutcome::Rejected(errors) => {
                    state.displayed_errors = errors.clone();
                    info!(seq, failing = errors.len(), "submission rejected by action");
                }
            }
            state.latest_outcome = outcome.clone();
        }

        if outcome.is_success() {
            if let Some(callback) = &self.options.on_success {
                callback(self);
            }
        }
        Resolution::Applied(outcome)
    }

    /// Binding for one field, for wiring an input without touching validation.
    pub async fn register(&self, field: &str) -> FormResult<FieldBinding> {
        let value = self.value(field).await.ok_or_else(|| unknown_field(field))?;
        Ok(FieldBinding::new(field.to_string(), value, self.clone()))
    }

    /// Restore the default values and clear displayed errors. In-flight
    /// submissions are superseded so they cannot repopulate errors later.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.values = self.defaults.as_ref().clone();
        state.displayed_errors.clear();
        if self.options.reset_policy == ResetPolicy::ClearFocused {
            state.focused = unfocused(&self.defaults);
        }
        state.issued += 1;
        debug!(policy = ?self.options.reset_policy, "form reset");
    }

    pub async fn form_errors(&self) -> FieldErrors {
        self.state.read().await.displayed_errors.clone()
    }

    pub async fn focused_fields(&self) -> FocusedFields {
        self.state.read().await.focused.clone()
    }

    pub async fn values(&self) -> FieldValues {
        self.state.read().await.values.clone()
    }

    pub async fn value(&self, field: &str) -> Option<String> {
        self.state.read().await.values.get(field).cloned()
    }

    /// Most recently applied submission outcome; handed to the next action call.
    pub async fn latest_outcome(&self) -> SubmissionOutcome {
        self.state.read().await.latest_outcome.clone()
    }

    /// True when no errors are currently displayed
    pub async fn is_valid(&self) -> bool {
        self.state.read().await.displayed_errors.is_empty()
    }

    /// Payload built from the current values, for hosts without a native form.
    pub async fn form_data(&self) -> FormData {
        FormData::from(&self.state.read().await.values)
    }

    /// Errors for an empty form, computed once at construction
    pub fn pristine_errors(&self) -> &FieldErrors {
        &self.pristine_errors
    }

    pub fn default_values(&self) -> &FieldValues {
        &self.defaults
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(String::as_str)
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("fields", &self.defaults.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn unfocused(values: &FieldValues) -> FocusedFields {
    values.keys().map(|name| (name.clone(), false)).collect()
}

fn unknown_field(field: &str) -> FormError {
    warn!(field, "operation on undeclared field");
    FormError::UnknownField(field.to_string())
}
