//! In-process host adapter.
//!
//! [`Lifecycle`] plays the host for one request: it knows the request's
//! [`RequestFlags`], stores phase callbacks, and fires each phase at most
//! once, early strictly before late.
//!
//! ```rust,ignore
//! let lifecycle = Arc::new(Lifecycle::new(RequestFlags::frontend()));
//! let router = Router::new(lifecycle.clone(), loader);
//! router.attach(lifecycle.clone());
//!
//! router.route(RouteKind::Any)?.controller("Foo@bar");
//!
//! lifecycle.fire(Phase::Early).await?;
//! lifecycle.fire(Phase::Late).await?;
//! ```

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{error, info, warn};
use trellis_core::{HostContext, Phase, RequestFlags};

use crate::error::{DispatchError, DispatchResult};
use crate::hooks::{HostHooks, PhaseCallback};

#[derive(Debug, Default)]
struct PhaseState {
    current: Option<Phase>,
    fired: Vec<Phase>,
}

/// Phase tracking and callback storage for one request.
pub struct Lifecycle {
    flags: RequestFlags,
    state: Mutex<PhaseState>,
    callbacks: Mutex<HashMap<Phase, Vec<PhaseCallback>>>,
    errors: Mutex<Vec<DispatchError>>,
}

impl Lifecycle {
    pub fn new(flags: RequestFlags) -> Self {
        Self {
            flags,
            state: Mutex::new(PhaseState::default()),
            callbacks: Mutex::new(HashMap::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn flags(&self) -> RequestFlags {
        self.flags
    }

    /// Fires `phase`, running its callbacks in registration order.
    ///
    /// Fails if the phase already fired, or if late is fired before early.
    pub async fn fire(&self, phase: Phase) -> DispatchResult<()> {
        {
            let mut state = self.state.lock();
            if state.fired.contains(&phase) {
                return Err(DispatchError::PhaseAlreadyFired(phase));
            }
            if phase == Phase::Late && !state.fired.contains(&Phase::Early) {
                return Err(DispatchError::PhaseOutOfOrder {
                    phase,
                    requires: Phase::Early,
                });
            }
            state.fired.push(phase);
            state.current = Some(phase);
        }

        let callbacks = self.callbacks.lock().remove(&phase).unwrap_or_default();
        info!(
            phase = %phase,
            request = self.flags.label(),
            callbacks = callbacks.len(),
            "Firing phase"
        );
        for callback in callbacks {
            callback().await;
        }

        self.state.lock().current = None;
        Ok(())
    }

    /// Errors reported through this host during the request.
    pub fn errors(&self) -> Vec<DispatchError> {
        self.errors.lock().clone()
    }
}

impl HostContext for Lifecycle {
    fn is_admin(&self) -> bool {
        self.flags.admin
    }

    fn is_ajax(&self) -> bool {
        self.flags.ajax
    }

    fn is_cron(&self) -> bool {
        self.flags.cron
    }

    fn is_rest(&self) -> bool {
        self.flags.rest
    }

    fn current_phase(&self) -> Option<Phase> {
        self.state.lock().current
    }

    fn did_phase(&self, phase: Phase) -> bool {
        self.state.lock().fired.contains(&phase)
    }
}

impl HostHooks for Lifecycle {
    fn on_phase(&self, phase: Phase, callback: PhaseCallback) {
        if self.did_phase(phase) {
            warn!(phase = %phase, "Phase already fired, callback will never run");
            return;
        }
        self.callbacks.lock().entry(phase).or_default().push(callback);
    }

    fn report_error(&self, err: &DispatchError) {
        error!(error = %err, request = self.flags.label(), "Dispatch pass halted");
        self.errors.lock().push(err.clone());
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("flags", &self.flags)
            .field("state", &*self.state.lock())
            .field("errors", &self.errors.lock().len())
            .finish_non_exhaustive()
    }
}
