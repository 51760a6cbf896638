//! Runtime error types.

use thiserror::Error;

use trellis_core::RouteError;
use trellis_framework::DispatchError;

pub use crate::config::{ConfigError, ConfigResult};

/// Errors raised while building the runtime or serving a request.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A route declaration was rejected.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A phase could not be fired.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A request task panicked or was cancelled.
    #[error("Request task failed: {0}")]
    Task(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
