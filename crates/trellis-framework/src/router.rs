//! Application-facing entry point.
//!
//! A [`Router`] owns one route table and the engine that dispatches it.
//! Registration goes through [`Router::route`], which refuses kinds whose
//! phase has already fired:
//!
//! ```rust,ignore
//! let router = Router::builder(lifecycle.clone(), loader).app("Shop").build();
//! router.attach(lifecycle.clone());
//!
//! router.route(RouteKind::Admin)?.controller("Orders@index").model("Orders");
//! router.route(RouteKind::LateFrontend)?.controller("Widget@render");
//! ```

use std::sync::Arc;

use tracing::error;
use trellis_core::{HostContext, RouteError, RouteKind, RouteResult};

use crate::builder::RouteBuilder;
use crate::dispatcher::DispatchEngine;
use crate::hooks::{HostHooks, RouteKindFilter};
use crate::loader::Loader;
use crate::namespace::NamespaceResolver;
use crate::registry::RouteRegistry;

/// Route registration front end for one request scope.
pub struct Router {
    registry: RouteRegistry,
    host: Arc<dyn HostContext>,
    engine: Arc<DispatchEngine>,
}

impl Router {
    /// Creates a router with no namespace and the default kind lists.
    pub fn new(host: Arc<dyn HostContext>, loader: Loader) -> Self {
        Self::builder(host, loader).build()
    }

    pub fn builder(host: Arc<dyn HostContext>, loader: Loader) -> RouterBuilder {
        RouterBuilder {
            host,
            loader,
            app: None,
            kind_filter: None,
        }
    }

    /// Sets the application namespace used to qualify model names.
    pub fn set_app(&self, app: impl Into<String>) -> &Self {
        self.engine.set_app(app);
        self
    }

    /// Hooks the engine into the host's phase triggers.
    pub fn attach(&self, hooks: Arc<dyn HostHooks>) -> &Self {
        self.engine.attach(hooks);
        self
    }

    /// Starts a route declaration for `kind`.
    ///
    /// Fails with [`RouteError::PhaseClosed`] if the phase evaluating `kind`
    /// has already fired. The error is logged and kept in the registry's
    /// rejected list.
    pub fn route(&self, kind: RouteKind) -> RouteResult<RouteBuilder<'_>> {
        let phase = kind.phase();
        if self.host.did_phase(phase) {
            let err = RouteError::PhaseClosed { kind, phase };
            error!(kind = %kind, phase = %phase, "{err}");
            self.registry.reject(err.clone());
            return Err(err);
        }
        Ok(RouteBuilder::new(&self.registry, kind))
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Router`].
pub struct RouterBuilder {
    host: Arc<dyn HostContext>,
    loader: Loader,
    app: Option<String>,
    kind_filter: Option<Arc<dyn RouteKindFilter>>,
}

impl RouterBuilder {
    /// Sets the application namespace.
    pub fn app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Sets the kind-list override.
    pub fn kind_filter(mut self, filter: Arc<dyn RouteKindFilter>) -> Self {
        self.kind_filter = Some(filter);
        self
    }

    pub fn build(self) -> Router {
        let registry = RouteRegistry::new();
        let mut engine = DispatchEngine::new(registry.clone(), Arc::clone(&self.host), self.loader)
            .with_namespace(NamespaceResolver::new(self.app));
        if let Some(filter) = self.kind_filter {
            engine = engine.with_kind_filter(filter);
        }

        Router {
            registry,
            host: self.host,
            engine: Arc::new(engine),
        }
    }
}
