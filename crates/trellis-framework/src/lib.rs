//! # Trellis Framework
//!
//! Route registration and phase-gated dispatch.
//!
//! This layer provides:
//! - The fluent registration builder ([`Router`], [`RouteBuilder`], [`ControllerRoute`])
//! - The route table and its shared handle ([`RouteTable`], [`RouteRegistry`])
//! - The resolve-once-then-call policy for provider references ([`ResolutionPolicy`])
//! - App namespace qualification of model names ([`NamespaceResolver`])
//! - Component construction and memoization ([`ComponentRegistry`], [`Loader`])
//! - The dispatch engine and its pass reports ([`DispatchEngine`], [`DispatchReport`])
//! - Host collaborator traits and an in-process host ([`HostHooks`], [`Lifecycle`])
//!
//! Components are plain types implementing [`Controller`] or [`Model`]; the
//! host registers their constructors by name and routes refer to them by
//! that name.

pub mod builder;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod hooks;
pub mod lifecycle;
pub mod loader;
pub mod namespace;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod router;
pub mod table;
pub mod view;

pub use builder::{ControllerRoute, RouteBuilder};
pub use controller::{
    ActionResult, Bindings, BoxedController, BoxedModel, Controller, Model, Response,
};
pub use dispatcher::{DispatchEngine, EngineState};
pub use error::{ActionError, DispatchError, DispatchResult};
pub use hooks::{HostHooks, PhaseCallback, RouteKindFilter};
pub use lifecycle::Lifecycle;
pub use loader::{ComponentRegistry, Loader};
pub use namespace::{NamespaceResolver, Role};
pub use registry::RouteRegistry;
pub use report::{DispatchReport, Invocation, RouteShape};
pub use resolve::{Resolution, ResolutionPolicy};
pub use router::{Router, RouterBuilder};
pub use table::{RouteEntry, RouteTable};
pub use view::{View, ViewConfig};
