//! App-scoped component names.
//!
//! Admin- and frontend-flavoured route kinds look model names up inside the
//! application's namespace first:
//!
//! ```text
//! {app}::{role}s::{admin|frontend}::{name}
//! ```
//!
//! If a component is registered under the qualified name it wins; otherwise
//! the short name is used as given.

use std::fmt;

use trellis_core::RouteKind;

use crate::error::{DispatchError, DispatchResult};
use crate::loader::ComponentRegistry;

/// The role a component plays in a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Controller,
    Model,
    View,
}

impl Role {
    /// Namespace segment for this role.
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Controller => "controllers",
            Self::Model => "models",
            Self::View => "views",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Controller => "controller",
            Self::Model => "model",
            Self::View => "view",
        })
    }
}

/// Rewrites short component names into the app namespace.
#[derive(Debug, Clone, Default)]
pub struct NamespaceResolver {
    app: Option<String>,
}

impl NamespaceResolver {
    pub fn new(app: Option<String>) -> Self {
        Self { app }
    }

    /// Sets the application namespace.
    pub fn set_app(&mut self, app: impl Into<String>) {
        self.app = Some(app.into());
    }

    pub fn app(&self) -> Option<&str> {
        self.app.as_deref().filter(|app| !app.is_empty())
    }

    /// Resolves `name` for a component of `role` dispatched under `kind`.
    ///
    /// Fails with [`DispatchError::NamespaceMissing`] if `kind` is admin- or
    /// frontend-flavoured and no namespace was set.
    pub fn qualify(
        &self,
        name: &str,
        role: Role,
        kind: RouteKind,
        registry: &ComponentRegistry,
    ) -> DispatchResult<String> {
        let Some(context) = kind.context() else {
            return Ok(name.to_string());
        };
        let app = self.app().ok_or(DispatchError::NamespaceMissing { kind })?;

        let qualified = format!("{app}::{}::{}::{name}", role.segment(), context.as_str());
        if registry.contains(role, &qualified) {
            Ok(qualified)
        } else {
            Ok(name.to_string())
        }
    }
}
