use formgate::config::Settings;
use formgate::domain::{action_fn, FieldValues, FormData, SubmissionOutcome, SubmitEvent};
use formgate::schema::SchemaGate;
use formgate::{FormController, Resolution};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const SIGNUP: &str = r#"
name: signup
fields:
  - name: email
    rules:
      - rule: required
      - rule: email
  - name: username
    rules:
      - rule: required
      - rule: min_length
        min: 3
"#;

fn signup_settings(dir: &TempDir) -> anyhow::Result<Settings> {
    fs::create_dir_all(dir.path().join("config/schemas"))?;
    fs::write(dir.path().join("config/schemas/signup.yaml"), SIGNUP)?;
    Settings::from_root(dir.path())
}

#[tokio::test]
async fn test_signup_round_trip_with_server_check() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let settings = signup_settings(&dir)?;
    let schema = settings.schema("signup")?;
    let server_schema = schema.clone();

    // Server re-checks the payload, then rejects a taken username.
    let action = action_fn(move |_previous, payload: FormData| {
        let result = SchemaGate::initial_form_check(&payload, &server_schema);
        async move {
            if let Err(errors) = result {
                return SubmissionOutcome::Rejected(errors);
            }
            if payload.get("username") == Some("admin") {
                return SubmissionOutcome::Rejected(SchemaGate::build_field_error(
                    "username",
                    "Username is taken",
                ));
            }
            SubmissionOutcome::Success
        }
    });

    let successes = Arc::new(AtomicUsize::new(0));
    let counter = successes.clone();
    let options = settings.form_options().on_success(move |_form| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let defaults = FieldValues::from([
        ("email".to_string(), String::new()),
        ("username".to_string(), String::new()),
    ]);
    let form = FormController::new(schema, action, defaults, options);
    assert!(form.form_errors().await.is_empty());

    let email = form.register("email").await?;
    let username = form.register("username").await?;

    email.change("ada@example.com").await?;
    username.change("ad").await?;
    assert_eq!(
        form.form_errors().await["username"],
        vec!["Must be at least 3 characters"]
    );

    username.change("admin").await?;
    assert!(form.form_errors().await.is_empty());

    let mut event = SubmitEvent::new(form.form_data().await);
    let handle = form.submit(&mut event).await.into_handle().expect("valid form dispatches");
    assert!(event.is_default_prevented());
    handle.resolved().await?;
    assert_eq!(form.form_errors().await["username"], vec!["Username is taken"]);
    assert_eq!(successes.load(Ordering::SeqCst), 0);

    username.change("ada").await?;
    let mut event = SubmitEvent::new(form.form_data().await);
    let handle = form.submit(&mut event).await.into_handle().expect("valid form dispatches");
    assert_eq!(
        handle.resolved().await?,
        Resolution::Applied(SubmissionOutcome::Success)
    );
    assert!(form.form_errors().await.is_empty());
    assert_eq!(successes.load(Ordering::SeqCst), 1);

    form.reset().await;
    assert_eq!(form.values().await, *form.default_values());
    Ok(())
}
