//! Component construction.
//!
//! The engine never builds components by name reflection. Applications
//! register constructors in a [`ComponentRegistry`] once per process; each
//! request scope wraps it in a [`Loader`] whose instance cache memoizes what
//! was built:
//!
//! - models are cached per name,
//! - controllers are cached per `controller__model__view` combination.
//!
//! ```rust,ignore
//! let registry = Arc::new(
//!     ComponentRegistry::new()
//!         .controller("Widget", |bindings| Widget::new(bindings))
//!         .model("Shop::models::frontend::Cart", || Cart::default()),
//! );
//! let loader = Loader::new(registry);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::controller::{Bindings, BoxedController, BoxedModel, Controller, Model};
use crate::error::{DispatchError, DispatchResult};
use crate::namespace::Role;
use crate::view::{View, ViewConfig};

type ControllerFactory = Arc<dyn Fn(Bindings) -> BoxedController + Send + Sync>;
type ModelFactory = Arc<dyn Fn() -> BoxedModel + Send + Sync>;

// ============================================================================
// ComponentRegistry
// ============================================================================

/// Constructors for every component routes may name.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    controllers: HashMap<String, ControllerFactory>,
    models: HashMap<String, ModelFactory>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller constructor under `name`.
    pub fn controller<F, C>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Bindings) -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        self.controllers.insert(
            name.into(),
            Arc::new(move |bindings| Arc::new(factory(bindings)) as BoxedController),
        );
        self
    }

    /// Registers a model constructor under `name`.
    pub fn model<F, M>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: Model + 'static,
    {
        self.models.insert(
            name.into(),
            Arc::new(move || Arc::new(factory()) as BoxedModel),
        );
        self
    }

    /// Returns whether a component of `role` is registered under `name`.
    pub fn contains(&self, role: Role, name: &str) -> bool {
        match role {
            Role::Controller => self.controllers.contains_key(name),
            Role::Model => self.models.contains_key(name),
            Role::View => false,
        }
    }

    /// Number of registered controllers and models.
    pub fn len(&self) -> usize {
        self.controllers.len() + self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut controllers: Vec<_> = self.controllers.keys().collect();
        let mut models: Vec<_> = self.models.keys().collect();
        controllers.sort();
        models.sort();
        f.debug_struct("ComponentRegistry")
            .field("controllers", &controllers)
            .field("models", &models)
            .finish()
    }
}

// ============================================================================
// Loader
// ============================================================================

#[derive(Default)]
struct InstanceCache {
    controllers: Mutex<HashMap<String, BoxedController>>,
    models: Mutex<HashMap<String, BoxedModel>>,
}

/// Builds and memoizes components for one scope.
pub struct Loader {
    registry: Arc<ComponentRegistry>,
    views: Arc<ViewConfig>,
    cache: InstanceCache,
}

impl Loader {
    /// Creates a loader with an empty instance cache.
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            registry,
            views: Arc::new(ViewConfig::default()),
            cache: InstanceCache::default(),
        }
    }

    /// Sets the template roots given to views.
    pub fn with_view_config(mut self, config: Arc<ViewConfig>) -> Self {
        self.views = config;
        self
    }

    /// Returns the constructor registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Returns the model registered under `name`, constructing it on first use.
    pub fn model(&self, name: &str) -> DispatchResult<BoxedModel> {
        if let Some(model) = self.cache.models.lock().get(name) {
            trace!(model = name, "Model served from cache");
            return Ok(Arc::clone(model));
        }

        let factory = self
            .registry
            .models
            .get(name)
            .ok_or_else(|| DispatchError::unknown("model", name))?;
        let model = factory();
        debug!(model = name, "Constructed model");

        let mut models = self.cache.models.lock();
        Ok(Arc::clone(models.entry(name.to_string()).or_insert(model)))
    }

    /// Returns the controller registered under `name`, bound to the given
    /// model and view, constructing it on first use.
    pub fn controller(
        &self,
        name: &str,
        model: Option<&str>,
        view: Option<&str>,
    ) -> DispatchResult<BoxedController> {
        let key = cache_key(name, model, view);
        if let Some(controller) = self.cache.controllers.lock().get(&key) {
            trace!(controller = name, "Controller served from cache");
            return Ok(Arc::clone(controller));
        }

        let factory = self
            .registry
            .controllers
            .get(name)
            .ok_or_else(|| DispatchError::unknown("controller", name))?;

        let bindings = Bindings {
            model: model.map(|m| self.model(m)).transpose()?,
            view: match view {
                Some(v) => View::named(v, Arc::clone(&self.views)),
                None => View::new(Arc::clone(&self.views)),
            },
        };
        let controller = factory(bindings);
        debug!(controller = name, model = ?model, view = ?view, "Constructed controller");

        let mut controllers = self.cache.controllers.lock();
        Ok(Arc::clone(controllers.entry(key).or_insert(controller)))
    }

    /// Number of memoized controllers and models.
    pub fn cached(&self) -> (usize, usize) {
        (
            self.cache.controllers.lock().len(),
            self.cache.models.lock().len(),
        )
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (controllers, models) = self.cached();
        f.debug_struct("Loader")
            .field("registry", &self.registry)
            .field("cached_controllers", &controllers)
            .field("cached_models", &models)
            .finish()
    }
}

fn cache_key(controller: &str, model: Option<&str>, view: Option<&str>) -> String {
    format!(
        "{controller}__{}__{}",
        model.unwrap_or_default(),
        view.unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::controller::{ActionResult, Response};

    struct Counter;

    #[async_trait]
    impl Model for Counter {}

    struct Page {
        has_model: bool,
        view: Option<String>,
    }

    #[async_trait]
    impl Controller for Page {
        async fn call(&self, _action: &str) -> ActionResult {
            Ok(Response::data(serde_json::json!({
                "has_model": self.has_model,
                "view": self.view,
            })))
        }
    }

    fn registry(built: Arc<AtomicUsize>) -> Arc<ComponentRegistry> {
        Arc::new(
            ComponentRegistry::new()
                .model("Counter", || Counter)
                .controller("Page", move |bindings: Bindings| {
                    built.fetch_add(1, Ordering::SeqCst);
                    Page {
                        has_model: bindings.model().is_some(),
                        view: bindings.view().name().map(str::to_string),
                    }
                }),
        )
    }

    #[test]
    fn test_models_are_memoized() {
        let loader = Loader::new(registry(Arc::default()));
        let a = loader.model("Counter").unwrap();
        let b = loader.model("Counter").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.cached(), (0, 1));
    }

    #[test]
    fn test_controllers_memoized_per_binding() {
        let built = Arc::new(AtomicUsize::new(0));
        let loader = Loader::new(registry(Arc::clone(&built)));

        let plain = loader.controller("Page", None, None).unwrap();
        let again = loader.controller("Page", None, None).unwrap();
        assert!(Arc::ptr_eq(&plain, &again));
        assert_eq!(built.load(Ordering::SeqCst), 1);

        let bound = loader
            .controller("Page", Some("Counter"), Some("Card"))
            .unwrap();
        assert!(!Arc::ptr_eq(&plain, &bound));
        assert_eq!(built.load(Ordering::SeqCst), 2);

        let response = tokio_test::block_on(bound.call("show")).unwrap();
        assert_eq!(
            response,
            Response::data(serde_json::json!({"has_model": true, "view": "Card"}))
        );
    }

    #[test]
    fn test_unknown_components() {
        let loader = Loader::new(registry(Arc::default()));
        assert_eq!(
            loader.model("Missing").err(),
            Some(DispatchError::unknown("model", "Missing"))
        );
        assert_eq!(
            loader.controller("Page", Some("Missing"), None).err(),
            Some(DispatchError::unknown("model", "Missing"))
        );
        assert_eq!(
            loader.controller("Nope", None, None).err(),
            Some(DispatchError::unknown("controller", "Nope"))
        );
    }

    #[test]
    fn test_scopes_do_not_share_instances() {
        let shared = registry(Arc::default());
        let first = Loader::new(Arc::clone(&shared));
        let second = Loader::new(shared);
        let a = first.model("Counter").unwrap();
        let b = second.model("Counter").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
