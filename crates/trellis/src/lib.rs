//! # Trellis
//!
//! Deferred route registration and phase-gated dispatch.
//!
//! Applications declare routes (a request kind, a controller, optionally a
//! model and a view) while the host is starting up. The host later fires two
//! triggers per request; at each one Trellis runs exactly the routes whose
//! kind belongs to that phase and matches the current request.
//!
//! ```text
//! registration ──▶ RouteTable ──▶ early trigger ──▶ Any, Admin, Ajax, Cron, Frontend…
//!                              └─▶ late trigger  ──▶ LateFrontend…
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis::prelude::*;
//!
//! let runtime = SiteRuntime::builder()
//!     .components(ComponentRegistry::new().controller("Widget", |_| Widget))
//!     .routes(|router| {
//!         router.route(RouteKind::LateFrontend)?.controller("Widget@render");
//!         Ok(())
//!     })
//!     .build()?;
//!
//! runtime.handle(RequestFlags::frontend()).await?;
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use trellis_core as core;
pub use trellis_framework as framework;
pub use trellis_runtime as runtime;

/// Commonly used types.
pub mod prelude {
    pub use trellis_core::{HandlerReference, Phase, RequestFlags, RouteKind, RouteResult, Target};

    pub use trellis_framework::{
        ActionError, ActionResult, Bindings, ComponentRegistry, Controller, Model, Response,
        Router, View,
    };

    pub use trellis_runtime::{RequestOutcome, SiteRuntime, TrellisConfig};
}
