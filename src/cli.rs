use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::SchemaConfig;
use crate::domain::FieldValues;

/// Validate form records against configured schemas
#[derive(Parser, Debug, Clone)]
#[command(name = "formgate", version, about, long_about = None)]
pub struct Cli {
    /// Directory containing formgate.toml and config/schemas/
    #[arg(short, long, env = "FORMGATE_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "FORMGATE_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check a JSON or YAML record against a schema
    Check {
        /// Schema name
        #[arg(short, long)]
        schema: String,

        /// Record file (.json, .yaml or .yml)
        #[arg(short, long)]
        input: PathBuf,
    },
    /// List configured schemas and their fields
    List,
}

/// Read a flat record. Strings are taken as-is, numbers and booleans are
/// stringified, nulls are dropped.
pub fn load_record(path: &Path) -> anyhow::Result<FieldValues> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };

    let Value::Object(map) = value else {
        anyhow::bail!("{} must contain an object of field values", path.display());
    };

    let mut values = FieldValues::new();
    for (key, value) in map {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                anyhow::bail!("Field '{}' must be a scalar value", key)
            }
        };
        values.insert(key, text);
    }
    Ok(values)
}

/// Heading printed by `formgate list`: name, then tags, then description.
pub fn list_heading(config: &SchemaConfig) -> String {
    let mut heading = config.name.clone();
    if !config.tags.is_empty() {
        heading.push_str(&format!(" [{}]", config.tags.join(", ")));
    }
    if let Some(description) = &config.description {
        heading.push_str(&format!(" - {}", description));
    }
    heading
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["formgate", "list"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.command, Command::List);
    }

    #[test]
    fn test_cli_check_args() {
        let cli = Cli::parse_from([
            "formgate",
            "--root",
            "/srv/forms",
            "check",
            "--schema",
            "signup",
            "--input",
            "record.json",
        ]);
        assert_eq!(cli.root, PathBuf::from("/srv/forms"));
        assert_eq!(
            cli.command,
            Command::Check {
                schema: "signup".to_string(),
                input: PathBuf::from("record.json"),
            }
        );
    }

    #[test]
    fn test_list_heading_shows_tags() {
        let mut config = SchemaConfig {
            name: "signup".to_string(),
            description: Some("Account creation".to_string()),
            tags: vec!["auth".to_string(), "public".to_string()],
            fields: vec![],
            json_schema: None,
        };
        assert_eq!(list_heading(&config), "signup [auth, public] - Account creation");

        config.description = None;
        assert_eq!(list_heading(&config), "signup [auth, public]");

        config.tags.clear();
        assert_eq!(list_heading(&config), "signup");
    }

    #[test]
    fn test_load_record_stringifies_scalars() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("record.yaml");
        fs::write(&path, "email: a@b.com\nage: 42\nnewsletter: true\nnickname: null\n")?;

        let values = load_record(&path)?;
        assert_eq!(values["email"], "a@b.com");
        assert_eq!(values["age"], "42");
        assert_eq!(values["newsletter"], "true");
        assert!(!values.contains_key("nickname"));
        Ok(())
    }

    #[test]
    fn test_load_record_rejects_nested_values() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("record.json");
        fs::write(&path, r#"{"tags": ["a", "b"]}"#)?;

        assert!(load_record(&path).is_err());
        Ok(())
    }
}
