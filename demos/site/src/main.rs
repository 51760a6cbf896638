//! Shop site demo
//!
//! Declares a handful of routes for a small shop and pushes simulated
//! requests through both dispatch phases.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package trellis-demo-site
//! cargo run --package trellis-demo-site -- --admin
//! cargo run --package trellis-demo-site -- --cron --config trellis.toml
//! cargo run --package trellis-demo-site -- --repeat 4
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use serde_json::json;
use tracing::info;
use trellis::prelude::*;
use trellis::runtime::config::ConfigLoader;

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(about = "Simulate requests against the demo shop routes")]
struct Args {
    /// Serve a dashboard request.
    #[arg(long)]
    admin: bool,

    /// Serve an async request.
    #[arg(long)]
    ajax: bool,

    /// Serve a scheduled-task request.
    #[arg(long)]
    cron: bool,

    /// Serve an API request.
    #[arg(long)]
    rest: bool,

    /// Configuration file; the default locations are searched otherwise.
    #[arg(long)]
    config: Option<PathBuf>,

    /// App namespace used when the configuration sets none.
    #[arg(long, default_value = "Shop")]
    app: String,

    /// Serve this many identical requests concurrently.
    #[arg(long, default_value_t = 1)]
    repeat: usize,
}

impl Args {
    fn flags(&self) -> RequestFlags {
        RequestFlags {
            admin: self.admin,
            ajax: self.ajax,
            cron: self.cron,
            rest: self.rest,
        }
    }
}

// ============================================================================
// Components
// ============================================================================

struct Assets;

#[async_trait]
impl Controller for Assets {
    async fn call(&self, action: &str) -> ActionResult {
        match action {
            "enqueue" => Ok(Response::data(json!(["shop.css", "shop.js"]))),
            _ => Err(ActionError::UnknownAction),
        }
    }
}

struct Dashboard;

#[async_trait]
impl Controller for Dashboard {
    async fn init(&self) {
        info!("Dashboard menu registered");
    }
}

/// Renders product pages through its bound view.
struct Product {
    bindings: Bindings,
}

#[async_trait]
impl Controller for Product {
    async fn call(&self, action: &str) -> ActionResult {
        if action != "show" {
            return Err(ActionError::UnknownAction);
        }
        let stock = match self.bindings.model() {
            Some(model) => model.call("stock").await?,
            None => Response::Empty,
        };
        let args = json!({"title": "Teapot", "stock": format!("{stock:?}")});
        Ok(self
            .bindings
            .view()
            .render("product.html", &args)
            .map(Response::rendered)
            .unwrap_or_else(|| Response::data(args)))
    }
}

struct Widget;

#[async_trait]
impl Controller for Widget {
    async fn call(&self, action: &str) -> ActionResult {
        match action {
            "render" => Ok(Response::rendered("<aside>Recently viewed</aside>")),
            _ => Err(ActionError::UnknownAction),
        }
    }
}

#[derive(Default)]
struct Inventory;

#[async_trait]
impl Model for Inventory {
    async fn call(&self, action: &str) -> ActionResult {
        match action {
            "stock" => Ok(Response::data(json!(12))),
            _ => Err(ActionError::UnknownAction),
        }
    }
}

#[derive(Default)]
struct Cart;

#[async_trait]
impl Model for Cart {
    async fn call(&self, action: &str) -> ActionResult {
        match action {
            "load" => Ok(Response::data(json!({"items": 2}))),
            _ => Err(ActionError::UnknownAction),
        }
    }
}

#[derive(Default)]
struct Reports;

#[async_trait]
impl Model for Reports {
    async fn call(&self, action: &str) -> ActionResult {
        match action {
            "rebuild" => {
                info!("Sales report rebuilt");
                Ok(Response::Empty)
            }
            _ => Err(ActionError::failed(format!("reports can not {action}"))),
        }
    }
}

fn components() -> ComponentRegistry {
    ComponentRegistry::new()
        .controller("Assets", |_| Assets)
        .controller("Dashboard", |_| Dashboard)
        .controller("Product", |bindings| Product { bindings })
        .controller("Widget", |_| Widget)
        .model("Shop::models::frontend::Inventory", Inventory::default)
        .model("Shop::models::frontend::Cart", Cart::default)
        .model("Reports", Reports::default)
}

// ============================================================================
// Routes
// ============================================================================

/// Decides at dispatch time whether the sale banner is shown.
struct Promotions {
    active: bool,
}

impl Promotions {
    fn banner(&self) -> Option<Target> {
        self.active.then(|| Target::parse("Widget@render"))
    }
}

struct Maintenance;

impl Maintenance {
    fn controller() -> Option<Target> {
        None
    }
}

fn declare_routes(router: &Router, promotions: &Arc<Promotions>) -> RouteResult<()> {
    router.route(RouteKind::Any)?.controller("Assets@enqueue");
    router.route(RouteKind::Admin)?.controller("Dashboard");
    router
        .route(RouteKind::Frontend)?
        .controller("Product@show")
        .model("Inventory")
        .view("product");
    router
        .route(RouteKind::FrontendWithAjax)?
        .just_model("Cart@load");
    router.route(RouteKind::Cron)?.just_model("Reports@rebuild");
    router
        .route(RouteKind::Any)?
        .controller(HandlerReference::associated::<Maintenance>(
            "controller",
            Maintenance::controller,
        ));
    router
        .route(RouteKind::LateFrontend)?
        .controller(HandlerReference::bound(
            Arc::clone(promotions),
            "banner",
            Promotions::banner,
        ));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let mut config = loader.load()?;
    config.app.namespace.get_or_insert_with(|| args.app.clone());

    let promotions = Arc::new(Promotions { active: true });
    let runtime = SiteRuntime::builder()
        .config(config)
        .with_logging()
        .components(components())
        .routes(move |router| declare_routes(router, &promotions))
        .build()?;

    let requests = vec![args.flags(); args.repeat.max(1)];
    for (index, outcome) in runtime.serve(requests).await?.iter().enumerate() {
        println!("request #{index} ({})", outcome.flags.label());
        for report in &outcome.reports {
            for invocation in &report.invocations {
                println!(
                    "  [{}] {:<28} {:<40} {:?}",
                    report.phase,
                    invocation.kind.as_str(),
                    invocation.target.to_string(),
                    invocation.response
                );
            }
            if report.skipped > 0 {
                println!("  [{}] {} route(s) opted out", report.phase, report.skipped);
            }
        }
        for error in &outcome.errors {
            println!("  error: {error}");
        }
    }

    Ok(())
}
