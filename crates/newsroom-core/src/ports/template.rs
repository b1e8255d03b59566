//! Template renderer port.
//!
//! Rendering is treated as a pure `(template_name, vars) -> html` collaborator;
//! the templates themselves live with the infrastructure.

use std::collections::HashMap;

/// Variables handed to a template.
pub type TemplateVars = HashMap<&'static str, String>;

/// Template renderer trait.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template_name: &str, vars: &TemplateVars) -> Result<String, TemplateError>;
}

/// Template errors.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Render failed: {0}")]
    Render(String),
}
