//! Resolve-once-then-call.
//!
//! Provider references are evaluated each time a pass reaches their entry and
//! never cached across passes. A provider returning `None` opts the entry out.

use tracing::trace;
use trellis_core::{HandlerReference, Target};

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Dispatch to this target.
    Dispatch(Target),
    /// Skip the entry without side effects.
    Skip,
}

impl Resolution {
    pub fn into_target(self) -> Option<Target> {
        match self {
            Self::Dispatch(target) => Some(target),
            Self::Skip => None,
        }
    }
}

/// Turns references into concrete targets for one pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionPolicy;

impl ResolutionPolicy {
    /// Resolves `reference`, calling a provider exactly once.
    pub fn resolve(reference: &HandlerReference) -> Resolution {
        match reference {
            HandlerReference::Disabled => Resolution::Skip,
            HandlerReference::Static(target) => Resolution::Dispatch(target.clone()),
            HandlerReference::Provider(provider) => match provider.call() {
                Some(target) => Resolution::Dispatch(target),
                None => {
                    trace!(origin = ?provider.origin(), "Provider opted out");
                    Resolution::Skip
                }
            },
        }
    }

    /// Resolves an optional model or view binding; opting out means no binding.
    pub fn resolve_binding(reference: Option<&HandlerReference>) -> Option<Target> {
        reference.and_then(|r| Self::resolve(r).into_target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_static_and_disabled() {
        assert_eq!(
            ResolutionPolicy::resolve(&"Foo@bar".into()),
            Resolution::Dispatch(Target::parse("Foo@bar"))
        );
        assert_eq!(
            ResolutionPolicy::resolve(&HandlerReference::disabled()),
            Resolution::Skip
        );
    }

    #[test]
    fn test_provider_called_once_per_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reference = HandlerReference::provider(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            (n == 0).then(|| Target::parse("First@run"))
        });

        assert_eq!(
            ResolutionPolicy::resolve(&reference),
            Resolution::Dispatch(Target::parse("First@run"))
        );
        assert_eq!(ResolutionPolicy::resolve(&reference), Resolution::Skip);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_binding_opt_out_is_none() {
        let reference = HandlerReference::provider(|| None);
        assert_eq!(ResolutionPolicy::resolve_binding(Some(&reference)), None);
        assert_eq!(ResolutionPolicy::resolve_binding(None), None);
        assert_eq!(
            ResolutionPolicy::resolve_binding(Some(&"Stats".into())),
            Some(Target::parse("Stats"))
        );
    }
}
