//! Request orchestration through `SiteRuntime`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use trellis_core::{Phase, RequestFlags, RouteKind};
use trellis_framework::{
    ActionResult, ComponentRegistry, Controller, DispatchError, Model, Response,
};
use trellis_runtime::config::{AppConfig, RoutesConfig};
use trellis_runtime::{SiteRuntime, TrellisConfig};

struct Page {
    built: Arc<AtomicUsize>,
}

#[async_trait]
impl Controller for Page {
    async fn call(&self, action: &str) -> ActionResult {
        Ok(Response::rendered(format!(
            "{action}#{}",
            self.built.load(Ordering::SeqCst)
        )))
    }
}

struct Cart {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Model for Cart {
    async fn call(&self, action: &str) -> ActionResult {
        self.log.lock().push(action.to_string());
        Ok(Response::Empty)
    }
}

fn runtime(config: TrellisConfig, built: Arc<AtomicUsize>, log: Arc<Mutex<Vec<String>>>) -> SiteRuntime {
    let components = ComponentRegistry::new()
        .controller("Page", move |_| {
            built.fetch_add(1, Ordering::SeqCst);
            Page {
                built: Arc::clone(&built),
            }
        })
        .model("Shop::models::frontend::Cart", move || Cart {
            log: Arc::clone(&log),
        });

    SiteRuntime::builder()
        .config(config)
        .components(components)
        .routes(|router| {
            router.route(RouteKind::Any)?.controller("Page@head");
            router.route(RouteKind::Frontend)?.just_model("Cart@load");
            router.route(RouteKind::LateFrontend)?.controller("Page@body");
            Ok(())
        })
        .build()
        .unwrap()
}

fn shop() -> TrellisConfig {
    TrellisConfig {
        app: AppConfig {
            namespace: Some("Shop".into()),
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_frontend_request_runs_both_phases() {
    let log = Arc::default();
    let runtime = runtime(shop(), Arc::default(), Arc::clone(&log));

    let outcome = runtime.handle(RequestFlags::frontend()).await.unwrap();
    assert!(outcome.is_clean());
    assert_eq!(
        outcome.report(Phase::Early).unwrap().targets(),
        ["Shop::models::frontend::Cart@load", "Page@head"]
    );
    assert_eq!(outcome.report(Phase::Late).unwrap().targets(), ["Page@body"]);
    assert_eq!(*log.lock(), ["load"]);
}

#[tokio::test]
async fn test_admin_request_stops_after_early() {
    let runtime = runtime(shop(), Arc::default(), Arc::default());

    let outcome = runtime.handle(RequestFlags::admin()).await.unwrap();
    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.invocations(), 1);
}

#[tokio::test]
async fn test_missing_namespace_reported_not_fatal() {
    let runtime = runtime(TrellisConfig::default(), Arc::default(), Arc::default());

    let outcome = runtime.handle(RequestFlags::frontend()).await.unwrap();
    assert_eq!(outcome.errors.len(), 1);
    assert!(!outcome.report(Phase::Early).unwrap().is_complete());
}

#[tokio::test]
async fn test_configured_kind_lists() {
    let config = TrellisConfig {
        routes: RoutesConfig {
            early: Some(vec![RouteKind::Any]),
            late: Some(Vec::new()),
        },
        ..shop()
    };
    let runtime = runtime(config, Arc::default(), Arc::default());

    let outcome = runtime.handle(RequestFlags::frontend()).await.unwrap();
    assert_eq!(outcome.report(Phase::Early).unwrap().targets(), ["Page@head"]);
    assert!(outcome.report(Phase::Late).unwrap().invocations.is_empty());
}

#[tokio::test]
async fn test_requests_do_not_share_instances() {
    let built = Arc::new(AtomicUsize::new(0));
    let runtime = runtime(shop(), Arc::clone(&built), Arc::default());

    let outcomes = runtime
        .serve(vec![
            RequestFlags::frontend(),
            RequestFlags::cron(),
            RequestFlags::frontend(),
        ])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[1].flags, RequestFlags::cron());
    assert_eq!(built.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_unknown_controller_is_reported() {
    let runtime = SiteRuntime::builder()
        .config(TrellisConfig::default())
        .routes(|router| {
            router.route(RouteKind::Cron)?.controller("Nothing");
            Ok(())
        })
        .build()
        .unwrap();

    let outcome = runtime.handle(RequestFlags::cron()).await.unwrap();
    assert!(outcome.rejected.is_empty());
    assert_eq!(
        outcome.errors,
        [DispatchError::unknown("controller", "Nothing")]
    );
}
