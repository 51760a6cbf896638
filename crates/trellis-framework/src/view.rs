//! Views handed to controllers.
//!
//! The dispatcher never interprets a view; it only resolves the view name a
//! route attached and passes a [`View`] to the controller constructor.
//! Controllers use it to find and render templates.
//!
//! Template lookup order:
//!
//! ```text
//! theme_dir / template_path / name
//! theme_dir / name
//! default_dir / name
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

/// Template search roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Directory searched first, typically provided by the active theme.
    #[serde(default)]
    pub theme_dir: Option<PathBuf>,

    /// Fallback directory shipped with the application.
    #[serde(default)]
    pub default_dir: Option<PathBuf>,

    /// Subdirectory of `theme_dir` searched before its root.
    #[serde(default = "default_template_path")]
    pub template_path: String,
}

fn default_template_path() -> String {
    "templates".to_string()
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            theme_dir: None,
            default_dir: None,
            template_path: default_template_path(),
        }
    }
}

/// A view bound to a controller.
#[derive(Debug, Clone, Default)]
pub struct View {
    name: Option<String>,
    config: Arc<ViewConfig>,
}

impl View {
    /// The default, unnamed view.
    pub fn new(config: Arc<ViewConfig>) -> Self {
        Self { name: None, config }
    }

    /// A view resolved from a route's view reference.
    pub fn named(name: impl Into<String>, config: Arc<ViewConfig>) -> Self {
        Self {
            name: Some(name.into()),
            config,
        }
    }

    /// The view name, `None` for the default view.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Finds `template` in the configured search roots.
    pub fn locate(&self, template: &str) -> Option<PathBuf> {
        let mut candidates = Vec::with_capacity(3);
        if let Some(theme) = &self.config.theme_dir {
            candidates.push(theme.join(&self.config.template_path).join(template));
            candidates.push(theme.join(template));
        }
        if let Some(default) = &self.config.default_dir {
            candidates.push(default.join(template));
        }

        let found = candidates.into_iter().find(|path| path.is_file());
        trace!(template, found = ?found, "Template lookup");
        found
    }

    /// Renders `template`, substituting `{{key}}` with the matching field of
    /// `args`.
    ///
    /// String values are inserted verbatim, other values as JSON. Returns
    /// `None` if the template is missing or unreadable.
    pub fn render(&self, template: &str, args: &Value) -> Option<String> {
        let path = self.locate(template)?;
        let source = read_template(&path)?;

        let Some(fields) = args.as_object() else {
            return Some(source);
        };

        let mut output = source;
        for (key, value) in fields {
            let replacement = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            output = output.replace(&format!("{{{{{key}}}}}"), &replacement);
        }
        Some(output)
    }
}

fn read_template(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(e) => {
            warn!(path = %path.display(), "Failed to read template: {e}");
            None
        }
    }
}
