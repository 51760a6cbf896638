//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use trellis_core::{Phase, RouteKind};
use trellis_framework::{RouteKindFilter, ViewConfig};

use crate::logging::SpanEvents;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrellisConfig {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub views: ViewConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Namespace that admin and frontend model names are qualified with.
    #[serde(default)]
    pub namespace: Option<String>,
}

// =============================================================================
// Routes
// =============================================================================

/// Per-phase overrides of the evaluated route kinds.
///
/// An absent list keeps the built-in kinds of that phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default)]
    pub early: Option<Vec<RouteKind>>,

    #[serde(default)]
    pub late: Option<Vec<RouteKind>>,
}

impl RoutesConfig {
    /// The configured list for `phase`, if overridden.
    pub fn kinds(&self, phase: Phase) -> Option<&[RouteKind]> {
        match phase {
            Phase::Early => self.early.as_deref(),
            Phase::Late => self.late.as_deref(),
        }
    }
}

impl RouteKindFilter for RoutesConfig {
    fn filter(&self, phase: Phase, kinds: Vec<RouteKind>) -> Vec<RouteKind> {
        self.kinds(phase).map_or(kinds, <[RouteKind]>::to_vec)
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Every level name accepted in configuration.
    pub const NAMES: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Rotation of the log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Per-module levels, e.g. `trellis_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, String>,

    #[serde(default)]
    pub span_events: SpanEvents,

    /// Include thread ids in each line.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in each line.
    #[serde(default)]
    pub file_location: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_override_replaces_defaults() {
        let routes = RoutesConfig {
            early: Some(vec![RouteKind::Any, RouteKind::Cron]),
            late: None,
        };
        assert_eq!(
            routes.filter(Phase::Early, Phase::Early.default_kinds()),
            [RouteKind::Any, RouteKind::Cron]
        );
        assert_eq!(
            routes.filter(Phase::Late, Phase::Late.default_kinds()),
            Phase::Late.default_kinds()
        );
    }

    #[test]
    fn test_deserialize_sections() {
        let config: TrellisConfig = serde_json::from_value(serde_json::json!({
            "app": {"namespace": "Shop"},
            "routes": {"late": ["late_frontend"]},
            "logging": {"level": "debug", "filters": {"trellis_framework": "trace"}}
        }))
        .unwrap();

        assert_eq!(config.app.namespace.as_deref(), Some("Shop"));
        assert_eq!(config.routes.late, Some(vec![RouteKind::LateFrontend]));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.views.template_path, "templates");
    }
}
