//! Request classification.
//!
//! [`RequestClassifier`] answers "does the current request belong to this
//! route kind?" from the host predicates. It is consulted at dispatch time,
//! once per kind per pass.

use crate::kind::RouteKind;
use crate::request::HostContext;

/// Matches route kinds against the host's current request state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestClassifier;

impl RequestClassifier {
    /// Returns whether the current request matches `kind`.
    pub fn matches(kind: RouteKind, host: &dyn HostContext) -> bool {
        match kind {
            RouteKind::Any => true,
            RouteKind::Admin | RouteKind::AdminWithAjax => host.is_admin(),
            RouteKind::Ajax => host.is_ajax(),
            RouteKind::Cron => host.is_cron(),
            RouteKind::Frontend | RouteKind::FrontendWithAjax => Self::is_frontend(host),
            RouteKind::LateFrontend | RouteKind::LateFrontendWithAjax => {
                Self::is_frontend(host) || host.has_late_phase_begun()
            }
        }
    }

    /// Public-facing request: not the dashboard (unless async), not a
    /// scheduled task, not an API call.
    fn is_frontend(host: &dyn HostContext) -> bool {
        (!host.is_admin() || host.is_ajax()) && !host.is_cron() && !host.is_rest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Phase;
    use crate::request::RequestFlags;

    struct FakeHost {
        flags: RequestFlags,
        current: Option<Phase>,
        fired: Vec<Phase>,
    }

    impl FakeHost {
        fn new(flags: RequestFlags) -> Self {
            Self {
                flags,
                current: None,
                fired: Vec::new(),
            }
        }
    }

    impl HostContext for FakeHost {
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
            self.current
        }

        fn did_phase(&self, phase: Phase) -> bool {
            self.fired.contains(&phase)
        }
    }

    #[test]
    fn test_any_always_matches() {
        for flags in [
            RequestFlags::frontend(),
            RequestFlags::admin(),
            RequestFlags::cron(),
            RequestFlags::rest(),
        ] {
            assert!(RequestClassifier::matches(RouteKind::Any, &FakeHost::new(flags)));
        }
    }

    #[test]
    fn test_admin_and_frontend() {
        let admin = FakeHost::new(RequestFlags::admin());
        assert!(RequestClassifier::matches(RouteKind::Admin, &admin));
        assert!(RequestClassifier::matches(RouteKind::AdminWithAjax, &admin));
        assert!(!RequestClassifier::matches(RouteKind::Frontend, &admin));

        let front = FakeHost::new(RequestFlags::frontend());
        assert!(!RequestClassifier::matches(RouteKind::Admin, &front));
        assert!(RequestClassifier::matches(RouteKind::Frontend, &front));
        assert!(RequestClassifier::matches(RouteKind::FrontendWithAjax, &front));
    }

    #[test]
    fn test_admin_ajax_counts_as_frontend() {
        let host = FakeHost::new(RequestFlags::admin_ajax());
        assert!(RequestClassifier::matches(RouteKind::Admin, &host));
        assert!(RequestClassifier::matches(RouteKind::Ajax, &host));
        assert!(RequestClassifier::matches(RouteKind::Frontend, &host));
    }

    #[test]
    fn test_cron_and_rest_are_not_frontend() {
        let cron = FakeHost::new(RequestFlags::cron());
        assert!(RequestClassifier::matches(RouteKind::Cron, &cron));
        assert!(!RequestClassifier::matches(RouteKind::Frontend, &cron));

        let rest = FakeHost::new(RequestFlags::rest());
        assert!(!RequestClassifier::matches(RouteKind::Frontend, &rest));
        assert!(!RequestClassifier::matches(RouteKind::LateFrontend, &rest));
    }

    #[test]
    fn test_late_frontend_tolerates_late_boundary() {
        let mut host = FakeHost::new(RequestFlags::rest());
        assert!(!RequestClassifier::matches(RouteKind::LateFrontend, &host));

        host.current = Some(Phase::Late);
        assert!(RequestClassifier::matches(RouteKind::LateFrontend, &host));

        host.current = None;
        host.fired.push(Phase::Late);
        assert!(RequestClassifier::matches(RouteKind::LateFrontendWithAjax, &host));
    }
}
