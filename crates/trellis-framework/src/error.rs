//! Error types for the dispatch engine.

use serde::Serialize;
use thiserror::Error;

use trellis_core::{Phase, RouteKind};

/// Failures raised while dispatching a phase.
///
/// Every variant halts the pass it occurred in. Entries that already ran are
/// not rolled back, and the route table is left untouched.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchError {
    /// No controller or model is registered under the given name.
    #[error("no {role} registered under '{name}'")]
    UnknownComponent {
        /// `"controller"` or `"model"`.
        role: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// The kind scopes names to the app namespace but none was configured.
    #[error("app namespace is not configured; call `set_app` before dispatching `{kind}` routes")]
    NamespaceMissing {
        /// The kind being dispatched.
        kind: RouteKind,
    },

    /// The component does not implement the requested action.
    #[error("'{component}' has no action '{action}'")]
    UnknownAction {
        /// Component name.
        component: String,
        /// Action name.
        action: String,
    },

    /// The action ran and reported a failure.
    #[error("action '{component}@{action}' failed: {message}")]
    ActionFailed {
        /// Component name.
        component: String,
        /// Action name.
        action: String,
        /// Failure description.
        message: String,
    },

    /// The phase trigger has already fired for this request.
    #[error("the {0} phase has already fired")]
    PhaseAlreadyFired(Phase),

    /// A phase was fired before the phase it depends on.
    #[error("the {phase} phase can not fire before the {requires} phase")]
    PhaseOutOfOrder {
        /// The phase that was fired.
        phase: Phase,
        /// The phase that must fire first.
        requires: Phase,
    },
}

impl DispatchError {
    /// Creates an unknown-component error.
    pub fn unknown(role: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownComponent {
            role,
            name: name.into(),
        }
    }

    /// Attaches component and action names to an [`ActionError`].
    pub fn from_action(component: &str, action: &str, error: ActionError) -> Self {
        match error {
            ActionError::UnknownAction => Self::UnknownAction {
                component: component.to_string(),
                action: action.to_string(),
            },
            ActionError::Failed(message) => Self::ActionFailed {
                component: component.to_string(),
                action: action.to_string(),
                message,
            },
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Returned by a controller or model action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The component has no action with that name.
    #[error("unknown action")]
    UnknownAction,

    /// The action failed.
    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    /// Creates a failure with the given message.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}
