//! Host request predicates.
//!
//! The engine never inspects a request itself. It asks the host, through
//! [`HostContext`], what kind of request is being served and which phase
//! boundaries have been reached. Answers are read at the moment they are
//! needed, never cached.

use serde::{Deserialize, Serialize};

use crate::kind::Phase;

/// Point-in-time view of the host's request state.
pub trait HostContext: Send + Sync {
    /// The request targets the dashboard.
    fn is_admin(&self) -> bool;

    /// The request is an async call.
    fn is_ajax(&self) -> bool;

    /// The request runs scheduled tasks.
    fn is_cron(&self) -> bool;

    /// The request is served by the host's API layer.
    fn is_rest(&self) -> bool;

    /// The phase whose trigger is currently firing, if any.
    fn current_phase(&self) -> Option<Phase>;

    /// Whether the trigger for `phase` has started firing during this request.
    fn did_phase(&self, phase: Phase) -> bool;

    /// Whether the late trigger is firing or has already fired.
    fn has_late_phase_begun(&self) -> bool {
        self.current_phase() == Some(Phase::Late) || self.did_phase(Phase::Late)
    }
}

/// Static classification flags of a request.
///
/// Hosts that know the request type up front (tests, the runtime, the demo)
/// describe it with these flags; phase tracking is layered on top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFlags {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub ajax: bool,
    #[serde(default)]
    pub cron: bool,
    #[serde(default)]
    pub rest: bool,
}

impl RequestFlags {
    /// A plain public-facing request.
    pub fn frontend() -> Self {
        Self::default()
    }

    /// A dashboard request.
    pub fn admin() -> Self {
        Self {
            admin: true,
            ..Self::default()
        }
    }

    /// An async request issued from the dashboard.
    pub fn admin_ajax() -> Self {
        Self {
            admin: true,
            ajax: true,
            ..Self::default()
        }
    }

    /// A scheduled-task request.
    pub fn cron() -> Self {
        Self {
            cron: true,
            ..Self::default()
        }
    }

    /// An API request.
    pub fn rest() -> Self {
        Self {
            rest: true,
            ..Self::default()
        }
    }

    /// Whether the host reaches the late boundary for this request.
    ///
    /// Only plain front-end page loads resolve a main query; dashboard, async,
    /// scheduled and API requests end before it.
    pub fn reaches_late_phase(&self) -> bool {
        !(self.admin || self.ajax || self.cron || self.rest)
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match (self.admin, self.ajax, self.cron, self.rest) {
            (_, _, true, _) => "cron",
            (_, _, _, true) => "rest",
            (true, true, _, _) => "admin-ajax",
            (true, false, _, _) => "admin",
            (false, true, _, _) => "ajax",
            (false, false, _, _) => "frontend",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_late_boundary_only_for_page_loads() {
        assert!(RequestFlags::frontend().reaches_late_phase());
        assert!(!RequestFlags::admin().reaches_late_phase());
        assert!(!RequestFlags::admin_ajax().reaches_late_phase());
        assert!(!RequestFlags::cron().reaches_late_phase());
        assert!(!RequestFlags::rest().reaches_late_phase());
    }

    #[test]
    fn test_flags_deserialize_with_defaults() {
        let flags: RequestFlags = serde_json::from_str(r#"{"admin": true}"#).unwrap();
        assert_eq!(flags, RequestFlags::admin());
        assert_eq!(flags.label(), "admin");
    }
}
