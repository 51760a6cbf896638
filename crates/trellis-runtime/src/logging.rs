//! Logging setup.
//!
//! Built on `tracing-subscriber` with an [`EnvFilter`]; `RUST_LOG` takes
//! precedence over the configured level. File output goes through
//! `tracing-appender`.
//!
//! ```rust,ignore
//! logging::init_from_config(&config.logging);
//!
//! // or by hand
//! LoggingBuilder::new()
//!     .with_level(tracing::Level::DEBUG)
//!     .directive("trellis_framework=trace")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig};

/// Which span lifecycle events are logged.
///
/// Enabling `new` and `close` shows each `dispatch` span as it opens and
/// closes, with its duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEvents {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

impl SpanEvents {
    pub const NONE: Self = Self {
        new: false,
        enter: false,
        exit: false,
        close: false,
    };

    /// Span creation and close.
    pub const LIFECYCLE: Self = Self {
        new: true,
        enter: false,
        exit: false,
        close: true,
    };

    pub const FULL: Self = Self {
        new: true,
        enter: true,
        exit: true,
        close: true,
    };

    fn to_fmt_span(self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(FmtSpan::NONE, |acc, (_, flag)| acc | flag)
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Builder for the global subscriber.
#[derive(Debug)]
pub struct LoggingBuilder {
    level: tracing::Level,
    directives: Vec<String>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    file_path: Option<PathBuf>,
    rotation: LogRotation,
    with_target: bool,
    thread_ids: bool,
    file_location: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: Vec::new(),
            span_events: SpanEvents::NONE,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            rotation: LogRotation::Never,
            with_target: true,
            thread_ids: false,
            file_location: false,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut directives: Vec<_> = config
            .filters
            .iter()
            .map(|(module, level)| format!("{module}={}", level.to_lowercase()))
            .collect();
        directives.sort();

        Self {
            level: config.level.to_tracing_level(),
            directives,
            span_events: config.span_events,
            format: config.format,
            output: config.output,
            file_path: config.file_path.clone(),
            rotation: config.rotation,
            with_target: true,
            thread_ids: config.thread_ids,
            file_location: config.file_location,
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a filter directive such as `trellis_framework=debug`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Includes source file and line number.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.file_location = enabled;
        self
    }

    fn build_filter(&self) -> EnvFilter {
        let base = self.level.to_string().to_lowercase();
        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base));
        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(err) => warn!(directive = %directive, error = %err, "Ignoring invalid log directive"),
            }
        }
        filter
    }

    fn build_writer(&self) -> BoxMakeWriter {
        match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => {
                let Some(path) = &self.file_path else {
                    warn!("File output requested without a file path, logging to stdout");
                    return BoxMakeWriter::new(std::io::stdout);
                };
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let name = path.file_name().unwrap_or_else(|| OsStr::new("trellis.log"));
                let appender = match self.rotation {
                    LogRotation::Never => rolling::never(dir, name),
                    LogRotation::Hourly => rolling::hourly(dir, name),
                    LogRotation::Daily => rolling::daily(dir, name),
                };
                BoxMakeWriter::new(appender)
            }
        }
    }

    /// Installs the subscriber, ignoring an already installed one.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let writer = self.build_writer();
        let span_events = self.span_events.to_fmt_span();
        let registry = tracing_subscriber::registry().with(filter);

        macro_rules! text_layer {
            ($layer:expr) => {
                $layer
                    .with_span_events(span_events)
                    .with_target(self.with_target)
                    .with_thread_ids(self.thread_ids)
                    .with_file(self.file_location)
                    .with_line_number(self.file_location)
                    .with_writer(writer)
            };
        }

        match self.format {
            LogFormat::Compact => registry.with(text_layer!(fmt::layer().compact())).try_init(),
            LogFormat::Full => registry.with(text_layer!(fmt::layer())).try_init(),
            LogFormat::Pretty => registry.with(text_layer!(fmt::layer().pretty())).try_init(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_span_events(span_events)
                        .with_current_span(true)
                        .with_writer(writer),
                )
                .try_init(),
        }
    }
}
