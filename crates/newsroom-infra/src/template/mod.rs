//! Template registry - the HTML side of outbound notifications.
//!
//! Rendering is a pure lookup-and-substitute over named templates with
//! `{{var}}` placeholders. The bodies here are deliberately plain; a real
//! deployment would register its own.

use std::collections::HashMap;

use newsroom_core::ports::{TemplateError, TemplateRenderer, TemplateVars};

pub struct TemplateRegistry {
    templates: HashMap<String, String>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the three notification templates.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            "new_post_email",
            "<html><body><p>Hi {{username}},</p>\
             <p>New in <b>{{category}}</b>: {{title}}</p>\
             <p>{{preview}}</p></body></html>",
        );
        registry.register(
            "subscription_email",
            "<html><body><p>Hi {{username}},</p>\
             <p>You are now subscribed to <b>{{category}}</b>.</p></body></html>",
        );
        registry.register(
            "welcome_email",
            "<html><body><p>Hi {{username}},</p>\
             <p>Thanks for signing up for our news portal!</p></body></html>",
        );
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.templates.insert(name.into(), body.into());
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TemplateRenderer for TemplateRegistry {
    fn render(&self, template_name: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
        let body = self
            .templates
            .get(template_name)
            .ok_or_else(|| TemplateError::UnknownTemplate(template_name.to_string()))?;

        let mut out = body.clone();
        for (key, value) in vars {
            out = out.replace(&format!("{{{{{key}}}}}"), value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_registered_template() {
        let registry = TemplateRegistry::with_defaults();
        let mut vars = TemplateVars::new();
        vars.insert("username", "alice".into());
        vars.insert("category", "rust".into());

        let html = registry.render("subscription_email", &vars).unwrap();
        assert!(html.contains("alice"));
        assert!(html.contains("<b>rust</b>"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let registry = TemplateRegistry::new();
        let result = registry.render("missing", &TemplateVars::new());
        assert!(matches!(result, Err(TemplateError::UnknownTemplate(_))));
    }

    #[test]
    fn unmatched_placeholders_are_left_alone() {
        let mut registry = TemplateRegistry::new();
        registry.register("t", "{{known}} and {{unknown}}");
        let mut vars = TemplateVars::new();
        vars.insert("known", "value".into());

        assert_eq!(registry.render("t", &vars).unwrap(), "value and {{unknown}}");
    }
}
