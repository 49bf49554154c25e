use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod schema;
pub mod validator;

pub use schema::SchemaConfig;

use crate::controller::{FormOptions, ResetPolicy};
use crate::error::{FormError, FormResult};
use crate::schema::ObjectSchema;

/// Settings loaded from `formgate.{toml,yaml,json}`, `FORMGATE_*` environment
/// variables and every file under `config/schemas/`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub form: FormSettings,
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}

/// Controller behaviour shared by every form built from these settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FormSettings {
    #[serde(default)]
    pub validate_on_mount: bool,
    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let root = root.as_ref();
        let config_path = root.join("formgate");
        let s = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix("FORMGATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("form.validate_on_mount", false)?
            .set_default("form.reset_policy", "keep_focused")?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        settings.load_schemas_from_dir(&root.join("config").join("schemas"))?;

        validator::SettingsValidator::validate(&settings).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })?;

        tracing::debug!(schemas = settings.schemas.len(), "settings loaded");
        Ok(settings)
    }

    fn load_schemas_from_dir(&mut self, path: &Path) -> Result<(), anyhow::Error> {
        let pattern = format!("{}/*", path.display());
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => {
                    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                        if matches!(ext, "json" | "yaml" | "yml") {
                            let content = std::fs::read_to_string(&path)?;
                            let schema: SchemaConfig = if ext == "json" {
                                serde_json::from_str(&content)?
                            } else {
                                serde_yaml::from_str(&content)?
                            };
                            tracing::debug!(
                                "Loaded schema '{}' from {}",
                                schema.name,
                                path.display()
                            );
                            self.schemas.push(schema);
                        }
                    }
                }
                Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
            }
        }
        Ok(())
    }

    /// Controller options derived from the `[form]` section
    pub fn form_options(&self) -> FormOptions {
        FormOptions::new()
            .validate_on_mount(self.form.validate_on_mount)
            .reset_policy(self.form.reset_policy)
    }

    pub fn schema_config(&self, name: &str) -> Option<&SchemaConfig> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Compile the named schema
    pub fn schema(&self, name: &str) -> FormResult<ObjectSchema> {
        self.schema_config(name)
            .ok_or_else(|| FormError::SchemaNotFound(name.to_string()))?
            .build(&self.schemas)
    }

    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|s| s.name.as_str())
    }
}
