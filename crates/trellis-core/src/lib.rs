//! # Trellis Core
//!
//! Leaf vocabulary of the Trellis route dispatch engine.
//!
//! - **Route kinds**: the closed set of request classifications and the phase
//!   each one is evaluated at ([`RouteKind`], [`Phase`])
//! - **Host predicates**: what the host knows about the current request
//!   ([`HostContext`], [`RequestFlags`])
//! - **Classification**: matching kinds against the request ([`RequestClassifier`])
//! - **References**: how routes name their components ([`HandlerReference`], [`Target`])
//! - **Identity keys**: per-registration table keys ([`IdentityKey`])
//! - **Usage errors**: registering at the wrong time ([`RouteError`])
//!
//! Nothing in this crate runs a handler; see `trellis-framework` for the
//! registration builder and the dispatch engine.

pub mod classifier;
pub mod error;
pub mod identity;
pub mod kind;
pub mod reference;
pub mod request;

pub use classifier::RequestClassifier;
pub use error::{RouteError, RouteResult};
pub use identity::IdentityKey;
pub use kind::{KindContext, Phase, RouteKind, UnknownRouteKind};
pub use reference::{HandlerReference, Provider, ProviderFn, ProviderOrigin, Target};
pub use request::{HostContext, RequestFlags};
