//! Phase-gated dispatch engine.
//!
//! On each trigger the [`DispatchEngine`]:
//!
//! 1. Computes the kinds evaluated at the phase (defaults, then the host's
//!    [`RouteKindFilter`]; kinds of the other phase are dropped)
//! 2. Runs model-only routes of every matching kind
//! 3. Runs full routes of every matching kind: resolve the controller, bind
//!    its model and view, construct it through the [`Loader`], call `start`,
//!    `init`, then the action
//!
//! Kinds are visited in their fixed order and entries in registration order.
//! The first error halts the pass; entries that already ran stay run.

use std::collections::HashSet;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tracing::{Instrument, Level, debug, span, trace, warn};
use trellis_core::{HandlerReference, HostContext, Phase, RequestClassifier, RouteKind};

use crate::error::{DispatchError, DispatchResult};
use crate::hooks::{HostHooks, RouteKindFilter};
use crate::loader::Loader;
use crate::namespace::{NamespaceResolver, Role};
use crate::registry::RouteRegistry;
use crate::report::{DispatchReport, Invocation, RouteShape};
use crate::resolve::ResolutionPolicy;
use crate::table::RouteEntry;

/// Progress of the engine through one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Not yet attached to a host.
    Unregistered,
    /// Attached, waiting for the early trigger.
    EarlyPending,
    /// The early pass ran or is running.
    EarlyDispatched,
    /// The late pass is running.
    LatePending,
    /// Both passes ran; nothing else happens for this request.
    LateDispatched,
}

/// Walks the route table at each phase trigger.
pub struct DispatchEngine {
    registry: RouteRegistry,
    host: Arc<dyn HostContext>,
    loader: Loader,
    namespace: RwLock<NamespaceResolver>,
    kind_filter: Option<Arc<dyn RouteKindFilter>>,
    state: Mutex<EngineState>,
    reports: Mutex<Vec<DispatchReport>>,
}

impl DispatchEngine {
    pub fn new(registry: RouteRegistry, host: Arc<dyn HostContext>, loader: Loader) -> Self {
        Self {
            registry,
            host,
            loader,
            namespace: RwLock::new(NamespaceResolver::default()),
            kind_filter: None,
            state: Mutex::new(EngineState::Unregistered),
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Sets the namespace resolver.
    pub fn with_namespace(mut self, namespace: NamespaceResolver) -> Self {
        self.namespace = RwLock::new(namespace);
        self
    }

    /// Sets the kind-list override.
    pub fn with_kind_filter(mut self, filter: Arc<dyn RouteKindFilter>) -> Self {
        self.kind_filter = Some(filter);
        self
    }

    /// Sets the application namespace used to qualify model names.
    pub fn set_app(&self, app: impl Into<String>) {
        self.namespace.write().set_app(app);
    }

    /// Hooks both passes into the host.
    ///
    /// The callbacks hold weak references, so dropping the engine disables
    /// them. Failed passes are sent to [`HostHooks::report_error`].
    pub fn attach(self: &Arc<Self>, hooks: Arc<dyn HostHooks>) {
        for phase in Phase::ALL {
            let engine = Arc::downgrade(self);
            let reporter = Arc::downgrade(&hooks);
            hooks.on_phase(
                phase,
                Arc::new(move || {
                    let engine = engine.clone();
                    let reporter = reporter.clone();
                    async move {
                        let Some(engine) = engine.upgrade() else {
                            trace!(phase = %phase, "Engine dropped before its phase fired");
                            return;
                        };
                        if let Err(err) = engine.dispatch(phase).await
                            && let Some(hooks) = reporter.upgrade()
                        {
                            hooks.report_error(&err);
                        }
                    }
                    .boxed()
                }),
            );
        }

        let mut state = self.state.lock();
        if *state == EngineState::Unregistered {
            *state = EngineState::EarlyPending;
        }
    }

    /// Runs the pass for `phase`.
    ///
    /// The report is retained whether or not the pass halted.
    pub async fn dispatch(&self, phase: Phase) -> DispatchResult<DispatchReport> {
        self.begin(phase)?;

        let span = span!(Level::DEBUG, "dispatch", phase = %phase);
        let report = self.run_pass(phase).instrument(span).await;

        if phase == Phase::Late {
            *self.state.lock() = EngineState::LateDispatched;
        }
        self.reports.lock().push(report.clone());

        match &report.halted {
            Some(err) => Err(err.clone()),
            None => Ok(report),
        }
    }

    fn begin(&self, phase: Phase) -> DispatchResult<()> {
        let mut state = self.state.lock();
        *state = match (phase, *state) {
            (Phase::Early, EngineState::Unregistered | EngineState::EarlyPending) => {
                EngineState::EarlyDispatched
            }
            (Phase::Early, _) => return Err(DispatchError::PhaseAlreadyFired(Phase::Early)),
            (Phase::Late, EngineState::EarlyDispatched) => EngineState::LatePending,
            (Phase::Late, EngineState::Unregistered | EngineState::EarlyPending) => {
                return Err(DispatchError::PhaseOutOfOrder {
                    phase: Phase::Late,
                    requires: Phase::Early,
                });
            }
            (Phase::Late, _) => return Err(DispatchError::PhaseAlreadyFired(Phase::Late)),
        };
        Ok(())
    }

    async fn run_pass(&self, phase: Phase) -> DispatchReport {
        let kinds = self.kinds_for(phase);
        debug!(kinds = ?kinds, "Starting pass");

        let mut report = DispatchReport::new(phase);
        if let Err(err) = self.walk(&kinds, &mut report).await {
            warn!(error = %err, ran = report.invocations.len(), "Pass halted");
            report.halted = Some(err);
        } else {
            debug!(
                ran = report.invocations.len(),
                skipped = report.skipped,
                "Pass complete"
            );
        }
        report
    }

    async fn walk(&self, kinds: &[RouteKind], report: &mut DispatchReport) -> DispatchResult<()> {
        for &kind in kinds {
            if !self.matches(kind) {
                continue;
            }
            for model in self.registry.models(kind) {
                self.run_model(kind, &model, report).await?;
            }
        }

        for &kind in kinds {
            if !self.matches(kind) {
                continue;
            }
            for entry in self.registry.entries(kind) {
                self.run_route(&entry, report).await?;
            }
        }
        Ok(())
    }

    fn matches(&self, kind: RouteKind) -> bool {
        let matched = RequestClassifier::matches(kind, self.host.as_ref());
        trace!(kind = %kind, matched, "Classified request");
        matched
    }

    /// Kinds evaluated at `phase`, in dispatch order.
    ///
    /// Filter output keeps its order; kinds of the other phase and repeats
    /// are dropped.
    pub fn kinds_for(&self, phase: Phase) -> Vec<RouteKind> {
        let defaults = phase.default_kinds();
        let Some(filter) = &self.kind_filter else {
            return defaults;
        };

        let mut seen = HashSet::new();
        filter
            .filter(phase, defaults)
            .into_iter()
            .filter(|kind| {
                if kind.phase() != phase {
                    warn!(kind = %kind, phase = %phase, "Kind filter returned a kind of the other phase, ignoring it");
                    return false;
                }
                if !seen.insert(*kind) {
                    warn!(kind = %kind, phase = %phase, "Kind filter returned a kind twice, ignoring the repeat");
                    return false;
                }
                true
            })
            .collect()
    }

    async fn run_model(
        &self,
        kind: RouteKind,
        reference: &HandlerReference,
        report: &mut DispatchReport,
    ) -> DispatchResult<()> {
        let Some(target) = ResolutionPolicy::resolve(reference).into_target() else {
            report.skipped += 1;
            return Ok(());
        };

        let name = self.qualify(target.name(), Role::Model, kind)?;
        let model = self.loader.model(&name)?;
        let response = match target.action() {
            Some(action) => Some(
                model
                    .call(action)
                    .await
                    .map_err(|e| DispatchError::from_action(&name, action, e))?,
            ),
            None => None,
        };

        debug!(kind = %kind, model = %name, action = ?target.action(), "Ran model-only route");
        report.invocations.push(Invocation {
            kind,
            shape: RouteShape::ModelOnly,
            target: target.with_name(name),
            response,
        });
        Ok(())
    }

    async fn run_route(&self, entry: &RouteEntry, report: &mut DispatchReport) -> DispatchResult<()> {
        let kind = entry.kind();
        let Some(target) = ResolutionPolicy::resolve(entry.controller()).into_target() else {
            report.skipped += 1;
            return Ok(());
        };

        let model = ResolutionPolicy::resolve_binding(entry.model())
            .map(|m| self.qualify(m.name(), Role::Model, kind))
            .transpose()?;
        let view = ResolutionPolicy::resolve_binding(entry.view());
        let view = view.as_ref().map(|v| v.name());

        let controller = self
            .loader
            .controller(target.name(), model.as_deref(), view)?;
        controller.start().await;
        controller.init().await;

        let response = match target.action() {
            Some(action) => Some(
                controller
                    .call(action)
                    .await
                    .map_err(|e| DispatchError::from_action(target.name(), action, e))?,
            ),
            None => None,
        };

        debug!(
            kind = %kind,
            controller = target.name(),
            action = ?target.action(),
            model = ?model,
            "Ran route"
        );
        report.invocations.push(Invocation {
            kind,
            shape: RouteShape::Controller,
            target,
            response,
        });
        Ok(())
    }

    fn qualify(&self, name: &str, role: Role, kind: RouteKind) -> DispatchResult<String> {
        self.namespace
            .read()
            .qualify(name, role, kind, self.loader.registry())
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Reports of the passes run so far.
    pub fn reports(&self) -> Vec<DispatchReport> {
        self.reports.lock().clone()
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("state", &self.state())
            .field("registry", &self.registry)
            .field("loader", &self.loader)
            .field("namespace", &*self.namespace.read())
            .field("has_kind_filter", &self.kind_filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::RequestFlags;

    use crate::lifecycle::Lifecycle;
    use crate::loader::ComponentRegistry;

    fn engine(filter: Option<Arc<dyn RouteKindFilter>>) -> DispatchEngine {
        let host: Arc<dyn HostContext> = Arc::new(Lifecycle::new(RequestFlags::frontend()));
        let engine = DispatchEngine::new(
            RouteRegistry::new(),
            host,
            Loader::new(Arc::new(ComponentRegistry::new())),
        );
        match filter {
            Some(filter) => engine.with_kind_filter(filter),
            None => engine,
        }
    }

    #[test]
    fn test_default_kind_lists() {
        let engine = engine(None);
        assert_eq!(
            engine.kinds_for(Phase::Late),
            [RouteKind::LateFrontend, RouteKind::LateFrontendWithAjax]
        );
        assert_eq!(engine.kinds_for(Phase::Early).len(), 7);
    }

    #[test]
    fn test_filter_cannot_move_kinds_across_phases() {
        let filter = |phase: Phase, mut kinds: Vec<RouteKind>| {
            if phase == Phase::Late {
                kinds.push(RouteKind::Cron);
                kinds.retain(|k| *k != RouteKind::LateFrontendWithAjax);
            }
            kinds
        };
        let engine = engine(Some(Arc::new(filter)));
        assert_eq!(engine.kinds_for(Phase::Late), [RouteKind::LateFrontend]);
    }

    #[test]
    fn test_filter_repeats_are_dropped() {
        let filter = |_: Phase, kinds: Vec<RouteKind>| -> Vec<RouteKind> {
            vec![RouteKind::Ajax, RouteKind::Any, RouteKind::Ajax, RouteKind::Any]
                .into_iter()
                .chain(kinds)
                .collect()
        };
        let engine = engine(Some(Arc::new(filter)));
        let kinds = engine.kinds_for(Phase::Early);
        assert_eq!(kinds[..2], [RouteKind::Ajax, RouteKind::Any]);
        assert_eq!(kinds.len(), 7);
    }

    #[tokio::test]
    async fn test_state_machine() {
        let engine = engine(None);
        assert_eq!(engine.state(), EngineState::Unregistered);
        assert_eq!(
            engine.dispatch(Phase::Late).await.err(),
            Some(DispatchError::PhaseOutOfOrder {
                phase: Phase::Late,
                requires: Phase::Early
            })
        );

        let early = engine.dispatch(Phase::Early).await.unwrap();
        assert!(early.invocations.is_empty());
        assert_eq!(engine.state(), EngineState::EarlyDispatched);
        assert_eq!(
            engine.dispatch(Phase::Early).await.err(),
            Some(DispatchError::PhaseAlreadyFired(Phase::Early))
        );

        engine.dispatch(Phase::Late).await.unwrap();
        assert_eq!(engine.state(), EngineState::LateDispatched);
        assert_eq!(
            engine.dispatch(Phase::Late).await.err(),
            Some(DispatchError::PhaseAlreadyFired(Phase::Late))
        );
        assert_eq!(engine.reports().len(), 2);
    }
}
