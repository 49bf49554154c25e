//! # formgate - schema-driven form state
//!
//! formgate binds form field values, validation errors and submission handling
//! to a declarative schema. It has no rendering of its own: a UI layer wires
//! inputs to [`FieldBinding`]s and reads error/focus snapshots back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formgate::domain::{action_fn, FieldValues, SubmissionOutcome, SubmitEvent};
//! use formgate::schema::{FieldSchema, ObjectSchema};
//! use formgate::{FormController, FormOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let schema = ObjectSchema::builder()
//!         .field(FieldSchema::new("email").required().email())
//!         .build()?;
//!     let action = action_fn(|_previous, _payload| async { SubmissionOutcome::Success });
//!     let defaults = FieldValues::from([("email".to_string(), String::new())]);
//!
//!     let form = FormController::new(schema, action, defaults, FormOptions::new());
//!     form.on_field_change("email", "a@b.com").await?;
//!
//!     let mut event = SubmitEvent::new(form.form_data().await);
//!     if let Some(handle) = form.submit(&mut event).await.into_handle() {
//!         handle.resolved().await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! - **domain**: value/error containers and the `Schema` / `SubmitAction` ports
//! - **schema**: declarative schemas and the `SchemaGate` validator
//! - **controller**: per-form state and submission reconciliation
//! - **config**: settings and named schema definitions loaded from disk

pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod schema;

pub use controller::{
    FieldBinding, FormController, FormOptions, ResetPolicy, Resolution, SubmissionHandle,
    SubmitResult,
};
pub use error::{FormError, FormResult};
