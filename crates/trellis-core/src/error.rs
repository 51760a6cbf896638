//! Usage errors reported while routes are being registered.

use thiserror::Error;

use crate::kind::{Phase, RouteKind};

/// Errors caused by registering routes at the wrong time.
///
/// A usage error never aborts the request: the offending registration is
/// rejected and everything else proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The phase that evaluates `kind` has already started.
    #[error(
        "{phase} routes can not be registered after the {phase} trigger has fired; \
         register the `{kind}` route before it fires"
    )]
    PhaseClosed {
        /// The kind that was being registered.
        kind: RouteKind,
        /// The phase that already fired.
        phase: Phase,
    },
}

impl RouteError {
    /// Returns the kind whose registration was rejected.
    pub fn kind(&self) -> RouteKind {
        match self {
            Self::PhaseClosed { kind, .. } => *kind,
        }
    }
}

/// Result type for registration operations.
pub type RouteResult<T> = Result<T, RouteError>;
