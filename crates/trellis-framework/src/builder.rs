//! Fluent route declaration.
//!
//! ```rust,ignore
//! router
//!     .route(RouteKind::Frontend)?
//!     .controller("Product@show")
//!     .model("Product")
//!     .view("Product");
//!
//! router.route(RouteKind::Ajax)?.just_model("Cart@refresh");
//! ```
//!
//! Each [`ControllerRoute`] carries the key of the entry it created, so
//! `model` and `view` can only ever target that entry.

use tracing::{debug, trace};
use trellis_core::{HandlerReference, IdentityKey, RouteKind};

use crate::registry::RouteRegistry;
use crate::table::RouteEntry;

/// Route declaration for one kind, returned by [`Router::route`](crate::Router::route).
#[derive(Debug)]
pub struct RouteBuilder<'a> {
    registry: &'a RouteRegistry,
    kind: RouteKind,
}

impl<'a> RouteBuilder<'a> {
    pub(crate) fn new(registry: &'a RouteRegistry, kind: RouteKind) -> Self {
        Self { registry, kind }
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// Registers a full route handled by `controller`.
    ///
    /// A disabled reference records nothing; the returned chain is inert.
    pub fn controller(self, controller: impl Into<HandlerReference>) -> ControllerRoute<'a> {
        let controller = controller.into();
        if controller.is_disabled() {
            trace!(kind = %self.kind, "Disabled controller reference, route not recorded");
            return ControllerRoute {
                registry: self.registry,
                kind: self.kind,
                key: None,
            };
        }

        let key = IdentityKey::build(&controller);
        debug!(kind = %self.kind, key = %key, "Registered route");
        self.registry
            .write()
            .insert(RouteEntry::new(self.kind, key.clone(), controller));

        ControllerRoute {
            registry: self.registry,
            kind: self.kind,
            key: Some(key),
        }
    }

    /// Registers a model-only route.
    pub fn just_model(self, model: impl Into<HandlerReference>) {
        let model = model.into();
        if model.is_disabled() {
            trace!(kind = %self.kind, "Disabled model reference, route not recorded");
            return;
        }
        debug!(kind = %self.kind, "Registered model-only route");
        self.registry.write().push_model(self.kind, model);
    }
}

/// The route created by [`RouteBuilder::controller`].
#[derive(Debug)]
pub struct ControllerRoute<'a> {
    registry: &'a RouteRegistry,
    kind: RouteKind,
    key: Option<IdentityKey>,
}

impl ControllerRoute<'_> {
    /// Attaches a model to the route. No-op if the route was not recorded.
    pub fn model(self, model: impl Into<HandlerReference>) -> Self {
        if let Some(key) = &self.key {
            self.registry
                .write()
                .attach_model(self.kind, key, model.into());
        }
        self
    }

    /// Attaches a view to the route. No-op if the route was not recorded.
    pub fn view(self, view: impl Into<HandlerReference>) -> Self {
        if let Some(key) = &self.key {
            self.registry.write().attach_view(self.kind, key, view.into());
        }
        self
    }

    /// Key of the recorded entry.
    pub fn key(&self) -> Option<&IdentityKey> {
        self.key.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Target;

    #[test]
    fn test_full_route_chain() {
        let registry = RouteRegistry::new();
        let route = RouteBuilder::new(&registry, RouteKind::Frontend)
            .controller("Product@show")
            .model("Product")
            .view("Card");
        let key = route.key().cloned().unwrap();

        let table = registry.read();
        let entry = table.get(RouteKind::Frontend, &key).unwrap();
        assert!(matches!(
            entry.controller(),
            HandlerReference::Static(t) if *t == Target::parse("Product@show")
        ));
        assert!(entry.model().is_some());
        assert!(entry.view().is_some());
    }

    #[test]
    fn test_disabled_controller_ignores_attachments() {
        let registry = RouteRegistry::new();
        let route = RouteBuilder::new(&registry, RouteKind::Any)
            .controller(false)
            .model("Stats")
            .view("Panel");
        assert!(!route.is_registered());
        assert!(registry.read().is_empty());
    }

    #[test]
    fn test_true_controller_is_not_a_route() {
        let registry = RouteRegistry::new();
        let route = RouteBuilder::new(&registry, RouteKind::Any).controller(true);
        assert!(!route.is_registered());
        assert!(registry.read().is_empty());
    }

    #[test]
    fn test_just_model() {
        let registry = RouteRegistry::new();
        RouteBuilder::new(&registry, RouteKind::Ajax).just_model("Cart@refresh");
        RouteBuilder::new(&registry, RouteKind::Ajax).just_model(None::<&str>);
        assert_eq!(registry.models(RouteKind::Ajax).len(), 1);
        assert!(registry.entries(RouteKind::Ajax).is_empty());
    }
}
