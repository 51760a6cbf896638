//! Handler references.
//!
//! Routes name their controllers, models and views indirectly. A
//! [`HandlerReference`] is either a fixed identifier such as `"Widget@render"`,
//! a provider function that picks an identifier (or opts out) when the route is
//! dispatched, or the disabled marker.
//!
//! ```rust,ignore
//! use trellis_core::{HandlerReference, Target};
//!
//! let fixed = HandlerReference::from("Widget@render");
//!
//! let chosen = HandlerReference::provider(|| {
//!     if feature_enabled() { Some(Target::parse("Widget@render")) } else { None }
//! });
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

// ============================================================================
// Target
// ============================================================================

/// A resolved component identifier with an optional action.
///
/// `"Name@action"` splits into `("Name", Some("action"))`; a string without
/// `@` has no action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    name: String,
    action: Option<String>,
}

impl Target {
    /// Creates a target from its parts.
    pub fn new(name: impl Into<String>, action: Option<String>) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }

    /// Splits an identifier of the form `Name` or `Name@action`.
    ///
    /// Only the first `@` separates; an empty action is treated as absent.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('@') {
            Some((name, action)) if !action.is_empty() => Self::new(name, Some(action.to_string())),
            Some((name, _)) => Self::new(name, None),
            None => Self::new(raw, None),
        }
    }

    /// The component identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The action to invoke after construction, if any.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Returns a copy of this target under a different component name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: self.action.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "{}@{}", self.name, action),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for Target {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Target {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

// ============================================================================
// Providers
// ============================================================================

/// A zero-argument function that picks a target, or `None` to opt out.
pub type ProviderFn = Arc<dyn Fn() -> Option<Target> + Send + Sync>;

/// Where a provider function came from.
///
/// Used only to derive identity keys: it plays the role of the callable's
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOrigin {
    /// A free-standing closure, identified by the address of its allocation.
    Closure { token: usize },
    /// A method bound to a shared instance.
    Bound { token: usize, method: &'static str },
    /// An associated function of a type.
    Associated {
        type_name: &'static str,
        method: &'static str,
    },
}

/// A provider function together with its origin.
#[derive(Clone)]
pub struct Provider {
    func: ProviderFn,
    origin: ProviderOrigin,
}

impl Provider {
    /// Invokes the provider.
    pub fn call(&self) -> Option<Target> {
        (self.func)()
    }

    /// Returns the provider's origin.
    pub fn origin(&self) -> &ProviderOrigin {
        &self.origin
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// HandlerReference
// ============================================================================

/// A reference to a controller, model or view as supplied by the application.
#[derive(Debug, Clone)]
pub enum HandlerReference {
    /// The disabled marker: the route is not registered at all.
    Disabled,
    /// A fixed identifier, optionally with an `@action` suffix.
    Static(Target),
    /// A function evaluated at dispatch time.
    Provider(Provider),
}

impl HandlerReference {
    /// The disabled marker.
    pub fn disabled() -> Self {
        Self::Disabled
    }

    /// Wraps a closure evaluated each time the route is dispatched.
    pub fn provider<F>(f: F) -> Self
    where
        F: Fn() -> Option<Target> + Send + Sync + 'static,
    {
        let func: ProviderFn = Arc::new(f);
        let token = Arc::as_ptr(&func) as *const () as usize;
        Self::Provider(Provider {
            func,
            origin: ProviderOrigin::Closure { token },
        })
    }

    /// Wraps a method of a shared instance.
    ///
    /// The instance is kept alive by the reference.
    pub fn bound<T>(instance: Arc<T>, method: &'static str, f: fn(&T) -> Option<Target>) -> Self
    where
        T: Send + Sync + 'static,
    {
        let token = Arc::as_ptr(&instance) as *const () as usize;
        Self::Provider(Provider {
            func: Arc::new(move || f(&instance)),
            origin: ProviderOrigin::Bound { token, method },
        })
    }

    /// Wraps an associated function of `T`.
    pub fn associated<T: ?Sized>(method: &'static str, f: fn() -> Option<Target>) -> Self {
        Self::Provider(Provider {
            func: Arc::new(f),
            origin: ProviderOrigin::Associated {
                type_name: type_name::<T>(),
                method,
            },
        })
    }

    /// Returns `true` for the disabled marker.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl From<&str> for HandlerReference {
    fn from(raw: &str) -> Self {
        Self::Static(Target::parse(raw))
    }
}

impl From<String> for HandlerReference {
    fn from(raw: String) -> Self {
        Self::Static(Target::parse(&raw))
    }
}

impl From<Target> for HandlerReference {
    fn from(target: Target) -> Self {
        Self::Static(target)
    }
}

/// `false` is the disabled marker.
///
/// `true` names no component either, so it also disables the route, but it
/// is almost always a mistake and is logged at `warn`.
impl From<bool> for HandlerReference {
    fn from(flag: bool) -> Self {
        if flag {
            warn!("`true` is not a handler reference, route disabled");
        }
        Self::Disabled
    }
}

impl<T: Into<HandlerReference>> From<Option<T>> for HandlerReference {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Disabled, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parse() {
        let t = Target::parse("Foo@bar");
        assert_eq!(t.name(), "Foo");
        assert_eq!(t.action(), Some("bar"));

        let t = Target::parse("Dash");
        assert_eq!(t.name(), "Dash");
        assert_eq!(t.action(), None);

        let t = Target::parse("Dash@");
        assert_eq!(t.action(), None);
        assert_eq!(t.to_string(), "Dash");

        assert_eq!(Target::parse("a@b@c").action(), Some("b@c"));
    }

    #[test]
    fn test_conversions() {
        assert!(HandlerReference::from(false).is_disabled());
        assert!(HandlerReference::from(None::<&str>).is_disabled());
        assert!(matches!(
            HandlerReference::from(Some("Foo")),
            HandlerReference::Static(ref t) if t.name() == "Foo"
        ));
    }

    #[test]
    fn test_true_names_nothing() {
        assert!(HandlerReference::from(true).is_disabled());
        assert!(HandlerReference::disabled().is_disabled());
    }

    #[test]
    fn test_provider_origins() {
        struct Picker {
            target: &'static str,
        }

        impl Picker {
            fn pick(&self) -> Option<Target> {
                Some(Target::parse(self.target))
            }
        }

        let picker = Arc::new(Picker {
            target: "Widget@render",
        });
        let reference = HandlerReference::bound(Arc::clone(&picker), "pick", Picker::pick);
        let HandlerReference::Provider(provider) = reference else {
            panic!("expected provider");
        };
        assert_eq!(provider.call(), Some(Target::parse("Widget@render")));
        assert!(matches!(
            provider.origin(),
            ProviderOrigin::Bound { method: "pick", .. }
        ));

        let reference = HandlerReference::associated::<Picker>("none", || None);
        let HandlerReference::Provider(provider) = reference else {
            panic!("expected provider");
        };
        assert_eq!(provider.call(), None);
    }
}
