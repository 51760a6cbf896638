//! # Trellis Runtime
//!
//! Orchestration layer for the Trellis dispatch engine.
//!
//! This crate provides:
//! - Layered configuration loading and validation (`config`)
//! - Logging setup from configuration (`logging`)
//! - Per-request orchestration of the two dispatch phases ([`SiteRuntime`])
//!
//! ```rust,ignore
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SiteRuntime::builder()
//!         .with_logging()
//!         .components(components())
//!         .routes(declare_routes)
//!         .build()?;
//!
//!     let outcome = runtime.handle(RequestFlags::frontend()).await?;
//!     println!("{} components ran", outcome.invocations());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, TrellisConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RequestOutcome, RouteDeclarations, RuntimeBuilder, SiteRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and span helpers.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
