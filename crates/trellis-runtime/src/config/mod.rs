//! Configuration for the Trellis runtime.
//!
//! Settings are layered with figment (defaults, files, `TRELLIS_*`
//! environment variables, programmatic merges) and checked by
//! [`validate_config`] before use.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    AppConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, RoutesConfig,
    TrellisConfig,
};
pub use validation::validate_config;
