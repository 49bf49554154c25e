use super::FormController;
use crate::error::FormResult;

/// Per-field capability handed to the rendering layer: the field's name, its
/// value at registration time, and change/blur handlers that route back
/// through the controller.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    name: String,
    value: String,
    controller: FormController,
}

impl FieldBinding {
    pub(crate) fn new(name: String, value: String, controller: FormController) -> Self {
        Self {
            name,
            value,
            controller,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value captured when the binding was registered
    pub fn value(&self) -> &str {
        &self.value
    }

    pub async fn change(&self, raw_value: impl Into<String>) -> FormResult<()> {
        self.controller.on_field_change(&self.name, raw_value).await
    }

    pub async fn blur(&self) -> FormResult<()> {
        self.controller.on_field_blur(&self.name).await
    }

    /// Re-read the field's current value from the controller
    pub async fn current_value(&self) -> String {
        self.controller.value(&self.name).await.unwrap_or_default()
    }
}
