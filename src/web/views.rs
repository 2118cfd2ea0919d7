//! Page templates
//!
//! Templates are Tera files embedded into the binary from `templates/`.
//! `base.html` is loaded first so that every page can extend it.

use std::collections::HashMap;
use std::error::Error as StdError;

use chrono::{DateTime, Local};
use rust_embed::RustEmbed;
use tera::{Context, Tera, Value};

/// Display format of timestamps
pub const DATETIME_FORMAT: &str = "%Y. %m. %d. %H:%M:%S";

#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct Templates;

/// View errors
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// A template could not be loaded
    #[error("Template error: {0}")]
    TemplateError(String),

    /// A page could not be rendered
    #[error("Render error: {0}")]
    RenderError(String),
}

/// Template renderer for all pages
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Load the embedded templates
    pub fn load() -> Result<Self, ViewError> {
        let mut templates: Vec<(String, String)> = Vec::new();
        for name in Templates::iter() {
            let file = Templates::get(&name)
                .ok_or_else(|| ViewError::TemplateError(format!("Missing embedded template {}", name)))?;
            let content = String::from_utf8(file.data.into_owned())
                .map_err(|e| ViewError::TemplateError(format!("Template {} is not UTF-8: {}", name, e)))?;
            templates.push((name.to_string(), content));
        }

        // Base layout first
        templates.sort_by_key(|(name, _)| name != "base.html");

        let mut tera = Tera::default();
        for (name, content) in &templates {
            tera.add_raw_template(name, content)
                .map_err(|e| ViewError::TemplateError(format!("Failed to add template {}: {}", name, e)))?;
        }
        tera.build_inheritance_chains()
            .map_err(|e| ViewError::TemplateError(format!("Failed to build template inheritance: {}", e)))?;
        tera.register_filter("datetime", datetime_filter);

        tracing::debug!(count = templates.len(), "Templates loaded");
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, ViewError> {
        self.tera.render(template, context).map_err(|e| {
            let mut message = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                message.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            ViewError::RenderError(message)
        })
    }
}

/// Format an RFC 3339 timestamp in local time; other values pass through
fn datetime_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let formatted = value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| format_datetime(&dt.with_timezone(&Local)));

    Ok(formatted.map(Value::String).unwrap_or_else(|| value.clone()))
}

pub fn format_datetime(dt: &DateTime<Local>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}
