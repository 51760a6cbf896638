//! Controller and model traits.
//!
//! Applications implement [`Controller`] for the components routes dispatch
//! to, and [`Model`] for data providers. Both are constructed by the
//! [`Loader`](crate::loader::Loader) and memoized per request scope.
//!
//! # Lifecycle
//!
//! When a full route is dispatched the engine calls, in order:
//!
//! 1. [`Controller::start`]
//! 2. [`Controller::init`]
//! 3. [`Controller::call`] with the route's action, if it named one
//!
//! `start` and `init` default to no-ops.
//!
//! ```rust,ignore
//! use trellis_framework::{ActionError, ActionResult, Bindings, Controller, Response};
//!
//! struct Widget { bindings: Bindings }
//!
//! #[async_trait::async_trait]
//! impl Controller for Widget {
//!     async fn call(&self, action: &str) -> ActionResult {
//!         match action {
//!             "render" => Ok(Response::rendered("<div>widget</div>")),
//!             _ => Err(ActionError::UnknownAction),
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::ActionError;
use crate::view::View;

/// What an action hands back to the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Nothing to forward.
    #[default]
    Empty,
    /// Rendered markup.
    Rendered(String),
    /// Structured data.
    Data(Value),
}

impl Response {
    /// Wraps rendered markup.
    pub fn rendered(markup: impl Into<String>) -> Self {
        Self::Rendered(markup.into())
    }

    /// Wraps structured data.
    pub fn data(value: impl Into<Value>) -> Self {
        Self::Data(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<()> for Response {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl From<String> for Response {
    fn from(markup: String) -> Self {
        Self::Rendered(markup)
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

/// Result of invoking an action.
pub type ActionResult = Result<Response, ActionError>;

/// A component dispatched by full routes.
#[async_trait]
pub trait Controller: Send + Sync {
    /// First lifecycle step.
    async fn start(&self) {}

    /// Second lifecycle step.
    async fn init(&self) {}

    /// Invokes `action`.
    async fn call(&self, action: &str) -> ActionResult {
        let _ = action;
        Err(ActionError::UnknownAction)
    }
}

/// A data provider, dispatched by model-only routes or bound to a controller.
#[async_trait]
pub trait Model: Send + Sync {
    /// Invokes `action`.
    async fn call(&self, action: &str) -> ActionResult {
        let _ = action;
        Err(ActionError::UnknownAction)
    }
}

/// Shared model handle.
pub type BoxedModel = Arc<dyn Model>;

/// Shared controller handle.
pub type BoxedController = Arc<dyn Controller>;

/// What a controller is constructed with.
#[derive(Clone, Default)]
pub struct Bindings {
    /// The route's model, if it attached one.
    pub model: Option<BoxedModel>,
    /// The route's view, or the default view.
    pub view: View,
}

impl Bindings {
    pub fn model(&self) -> Option<&BoxedModel> {
        self.model.as_ref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }
}

impl std::fmt::Debug for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindings")
            .field("has_model", &self.model.is_some())
            .field("view", &self.view)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    #[async_trait]
    impl Controller for Bare {}

    #[async_trait]
    impl Model for Bare {}

    #[tokio::test]
    async fn test_default_actions_are_unknown() {
        let bare = Bare;
        Controller::start(&bare).await;
        Controller::init(&bare).await;
        assert_eq!(
            Controller::call(&bare, "anything").await,
            Err(ActionError::UnknownAction)
        );
        assert_eq!(
            Model::call(&bare, "anything").await,
            Err(ActionError::UnknownAction)
        );
    }

    #[test]
    fn test_response_conversions() {
        assert!(Response::from(()).is_empty());
        assert_eq!(
            Response::from("<p>".to_string()),
            Response::Rendered("<p>".into())
        );
        assert_eq!(
            Response::data(serde_json::json!({"ok": true})),
            Response::Data(serde_json::json!({"ok": true}))
        );
    }
}
