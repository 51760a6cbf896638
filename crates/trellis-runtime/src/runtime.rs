//! Request orchestration.
//!
//! A [`SiteRuntime`] holds what lives for the whole process: configuration,
//! component constructors and the application's route declarations. Every
//! request gets its own route table, instance cache and lifecycle, so
//! concurrent requests never share dispatch state.
//!
//! ```rust,ignore
//! let runtime = SiteRuntime::builder()
//!     .config_file("trellis.toml")
//!     .components(components)
//!     .routes(|router| {
//!         router.route(RouteKind::Any)?.controller("Assets@enqueue");
//!         router.route(RouteKind::LateFrontend)?.controller("Widget@render");
//!         Ok(())
//!     })
//!     .build()?;
//!
//! let outcome = runtime.handle(RequestFlags::frontend()).await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{Instrument, Level, debug, info, span, warn};
use trellis_core::{Phase, RequestFlags, RouteError, RouteResult};
use trellis_framework::{
    ComponentRegistry, DispatchError, DispatchReport, Lifecycle, Loader, Router, ViewConfig,
};

use crate::config::{ConfigLoader, TrellisConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Route declaration function run at the start of every request.
pub type RouteDeclarations = Arc<dyn Fn(&Router) -> RouteResult<()> + Send + Sync>;

/// What one request did.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub flags: RequestFlags,
    /// One report per pass that ran, early first.
    pub reports: Vec<DispatchReport>,
    /// Errors that halted a pass.
    pub errors: Vec<DispatchError>,
    /// Registrations refused because their phase had already fired.
    pub rejected: Vec<RouteError>,
}

impl RequestOutcome {
    pub fn report(&self, phase: Phase) -> Option<&DispatchReport> {
        self.reports.iter().find(|r| r.phase == phase)
    }

    /// Total invocations across both passes.
    pub fn invocations(&self) -> usize {
        self.reports.iter().map(|r| r.invocations.len()).sum()
    }

    /// No pass halted and no registration was refused.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.rejected.is_empty()
    }
}

struct RuntimeInner {
    config: TrellisConfig,
    components: Arc<ComponentRegistry>,
    views: Arc<ViewConfig>,
    routes: RouteDeclarations,
}

/// Serves requests through the two-phase dispatch cycle.
#[derive(Clone)]
pub struct SiteRuntime {
    inner: Arc<RuntimeInner>,
}

impl SiteRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    pub fn config(&self) -> &TrellisConfig {
        &self.inner.config
    }

    /// Runs one request: declare routes, fire early, then fire late if the
    /// request reaches the late boundary.
    pub async fn handle(&self, flags: RequestFlags) -> RuntimeResult<RequestOutcome> {
        let span = span!(Level::INFO, "request", kind = flags.label());
        self.run_request(flags).instrument(span).await
    }

    async fn run_request(&self, flags: RequestFlags) -> RuntimeResult<RequestOutcome> {
        let inner = &self.inner;
        let lifecycle = Arc::new(Lifecycle::new(flags));
        let loader =
            Loader::new(Arc::clone(&inner.components)).with_view_config(Arc::clone(&inner.views));

        let mut builder = Router::builder(lifecycle.clone(), loader)
            .kind_filter(Arc::new(inner.config.routes.clone()));
        if let Some(app) = &inner.config.app.namespace {
            builder = builder.app(app.clone());
        }
        let router = builder.build();
        router.attach(lifecycle.clone());

        if let Err(err) = (inner.routes)(&router) {
            warn!(error = %err, "Route declarations stopped early");
        }
        debug!(routes = router.registry().read().len(), "Routes declared");

        lifecycle.fire(Phase::Early).await?;
        if flags.reaches_late_phase() {
            lifecycle.fire(Phase::Late).await?;
        }

        let outcome = RequestOutcome {
            flags,
            reports: router.engine().reports(),
            errors: lifecycle.errors(),
            rejected: router.registry().rejected(),
        };
        info!(
            invocations = outcome.invocations(),
            errors = outcome.errors.len(),
            rejected = outcome.rejected.len(),
            "Request complete"
        );
        Ok(outcome)
    }

    /// Runs `requests` concurrently, returning outcomes in input order.
    pub async fn serve(&self, requests: Vec<RequestFlags>) -> RuntimeResult<Vec<RequestOutcome>> {
        let mut tasks = JoinSet::new();
        for (index, flags) in requests.into_iter().enumerate() {
            let runtime = self.clone();
            tasks.spawn(async move { (index, runtime.handle(flags).await) });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined.map_err(|e| RuntimeError::Task(e.to_string()))?;
            outcomes.push((index, outcome?));
        }
        outcomes.sort_by_key(|(index, _)| *index);
        Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
    }
}

impl std::fmt::Debug for SiteRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteRuntime")
            .field("config", &self.inner.config)
            .field("components", &self.inner.components)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SiteRuntime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    config: Option<TrellisConfig>,
    config_file: Option<PathBuf>,
    profile: Option<String>,
    components: ComponentRegistry,
    routes: Option<RouteDeclarations>,
    init_logging: bool,
}

impl RuntimeBuilder {
    /// Uses `config` instead of loading one.
    pub fn config(mut self, config: TrellisConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn components(mut self, components: ComponentRegistry) -> Self {
        self.components = components;
        self
    }

    /// Sets the route declarations run at the start of every request.
    pub fn routes<F>(mut self, routes: F) -> Self
    where
        F: Fn(&Router) -> RouteResult<()> + Send + Sync + 'static,
    {
        self.routes = Some(Arc::new(routes));
        self
    }

    /// Installs the global subscriber from the logging section on build.
    pub fn with_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    pub fn build(self) -> RuntimeResult<SiteRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => {
                let mut loader = ConfigLoader::new();
                if let Some(profile) = &self.profile {
                    loader = loader.profile(profile);
                }
                if let Some(path) = &self.config_file {
                    loader = loader.file(path);
                }
                loader.load()?
            }
        };
        validate_config(&config)?;

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }
        info!(
            namespace = ?config.app.namespace,
            components = self.components.len(),
            "Runtime initialized"
        );

        Ok(SiteRuntime {
            inner: Arc::new(RuntimeInner {
                views: Arc::new(config.views.clone()),
                config,
                components: Arc::new(self.components),
                routes: self
                    .routes
                    .unwrap_or_else(|| Arc::new(|_: &Router| -> RouteResult<()> { Ok(()) })),
            }),
        })
    }
}
