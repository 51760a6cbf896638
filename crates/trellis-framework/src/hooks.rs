//! Host collaborator traits.
//!
//! The engine hooks itself into the host through [`HostHooks`]: one callback
//! per phase, plus an error channel. [`RouteKindFilter`] lets the host adjust
//! the list of kinds evaluated at each phase.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::error;
use trellis_core::{Phase, RouteKind};

use crate::error::DispatchError;

/// Callback run when a phase trigger fires.
pub type PhaseCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Phase hooks and error reporting provided by the host.
pub trait HostHooks: Send + Sync {
    /// Registers `callback` to run once when `phase` fires.
    fn on_phase(&self, phase: Phase, callback: PhaseCallback);

    /// Reports a failed dispatch pass.
    fn report_error(&self, error: &DispatchError) {
        error!(error = %error, "Dispatch pass halted");
    }
}

/// Overrides the kinds evaluated at a phase.
pub trait RouteKindFilter: Send + Sync {
    /// Returns the kinds to evaluate, given the default list for `phase`.
    fn filter(&self, phase: Phase, kinds: Vec<RouteKind>) -> Vec<RouteKind>;
}

impl<F> RouteKindFilter for F
where
    F: Fn(Phase, Vec<RouteKind>) -> Vec<RouteKind> + Send + Sync,
{
    fn filter(&self, phase: Phase, kinds: Vec<RouteKind>) -> Vec<RouteKind> {
        self(phase, kinds)
    }
}
