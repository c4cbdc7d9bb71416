//! Prompt template rendering.

use clerk_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// A parametrized natural-language template.
///
/// Placeholders use Handlebars syntax (`{{question}}`); every placeholder
/// must be bound before the rendered text is sent to a model.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Template identifier, used in logs
    pub id: &'static str,

    /// Template body with named placeholders
    pub text: &'static str,
}

impl PromptTemplate {
    /// Render the template with the given variable bindings.
    pub fn render(&self, variables: &HashMap<&str, String>) -> AppResult<String> {
        let mut handlebars = Handlebars::new();

        // Prompts are plain text, never HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        handlebars
            .register_template_string(self.id, self.text)
            .map_err(|e| {
                AppError::Prompt(format!("Failed to register template '{}': {}", self.id, e))
            })?;

        let rendered = handlebars.render(self.id, variables).map_err(|e| {
            AppError::Prompt(format!("Failed to render template '{}': {}", self.id, e))
        })?;

        tracing::trace!(template = self.id, "Rendered prompt");
        Ok(rendered)
    }
}

/// Shorthand for building the variables map.
#[macro_export]
macro_rules! prompt_vars {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = ::std::collections::HashMap::new();
        $(map.insert($key, ::std::string::String::from($value));)*
        map
    }};
}
