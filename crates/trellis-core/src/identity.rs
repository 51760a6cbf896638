//! Identity keys for registered routes.
//!
//! Every full route is stored under an [`IdentityKey`] derived from its
//! controller reference. The key starts with a fresh random salt, so two
//! registrations of the same reference always land in separate slots of the
//! route table; within one builder chain the key is computed once and reused
//! by the model and view steps.

use std::fmt;

use tracing::trace;
use uuid::Uuid;

use crate::reference::{HandlerReference, ProviderOrigin};

/// Opaque key of one route registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Derives a key for `reference`.
    ///
    /// Layout: `{salt}_{suffix}`, where the suffix is
    /// - the identifier itself for fixed references,
    /// - the allocation token (plus method name) for closures and bound methods,
    /// - `Type::method` for associated functions.
    pub fn build(reference: &HandlerReference) -> Self {
        let salt = Uuid::new_v4().simple();
        let suffix = match reference {
            HandlerReference::Disabled => String::new(),
            HandlerReference::Static(target) => target.to_string(),
            HandlerReference::Provider(provider) => match provider.origin() {
                ProviderOrigin::Closure { token } => format!("{token:016x}"),
                ProviderOrigin::Bound { token, method } => format!("{token:016x}{method}"),
                ProviderOrigin::Associated { type_name, method } => {
                    format!("{type_name}::{method}")
                }
            },
        };
        let key = Self(format!("{salt}_{suffix}"));
        trace!(key = %key, "Identity key built");
        key
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Target;

    #[test]
    fn test_static_keys_are_salted() {
        let reference = HandlerReference::from("Foo@bar");
        let a = IdentityKey::build(&reference);
        let b = IdentityKey::build(&reference);

        assert!(a.as_str().ends_with("_Foo@bar"));
        assert!(b.as_str().ends_with("_Foo@bar"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_associated_key_suffix() {
        struct Routes;
        let reference = HandlerReference::associated::<Routes>("pick", || None::<Target>);
        let key = IdentityKey::build(&reference);
        assert!(key.as_str().ends_with("Routes::pick"));
    }

    #[test]
    fn test_closure_key_uses_allocation_token() {
        let reference = HandlerReference::provider(|| None);
        let key = IdentityKey::build(&reference);
        let (_, suffix) = key.as_str().split_once('_').unwrap();
        assert_eq!(suffix.len(), 16);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
