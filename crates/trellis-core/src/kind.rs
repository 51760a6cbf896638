//! Route kinds and dispatch phases.
//!
//! A [`RouteKind`] classifies the requests a route applies to. Every kind is
//! bound to exactly one [`Phase`]: the trigger at which routes of that kind are
//! evaluated. The binding is fixed and never reinterpreted.
//!
//! ```text
//! Early: any, admin, admin_with_possible_ajax, ajax, cron,
//!        frontend, frontend_with_possible_ajax
//! Late:  late_frontend, late_frontend_with_possible_ajax
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Phase
// ============================================================================

/// One of the two dispatch windows of a request.
///
/// The late phase always fires after the early phase within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The host's initialisation boundary.
    Early,
    /// The boundary after the host has resolved the main query.
    Late,
}

impl Phase {
    /// Both phases, in firing order.
    pub const ALL: [Phase; 2] = [Phase::Early, Phase::Late];

    /// Returns the phase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::Late => "late",
        }
    }

    /// Returns the kinds evaluated at this phase, in dispatch order.
    pub fn default_kinds(&self) -> Vec<RouteKind> {
        RouteKind::ALL
            .into_iter()
            .filter(|kind| kind.phase() == *self)
            .collect()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RouteKind
// ============================================================================

/// The closed set of request classifications a route can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Every request.
    Any,
    /// Dashboard requests.
    Admin,
    /// Dashboard requests, including async dashboard calls.
    #[serde(rename = "admin_with_possible_ajax")]
    AdminWithAjax,
    /// Async requests.
    Ajax,
    /// Scheduled-task requests.
    Cron,
    /// Public-facing requests.
    Frontend,
    /// Public-facing requests, including async calls made from the front end.
    #[serde(rename = "frontend_with_possible_ajax")]
    FrontendWithAjax,
    /// Public-facing requests evaluated once the main query is known.
    LateFrontend,
    /// Like [`RouteKind::LateFrontend`], for routes that also serve async calls.
    #[serde(rename = "late_frontend_with_possible_ajax")]
    LateFrontendWithAjax,
}

/// Whether a kind scopes its component names to the dashboard or the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindContext {
    Admin,
    Frontend,
}

impl KindContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Frontend => "frontend",
        }
    }
}

impl RouteKind {
    /// All kinds in their fixed dispatch order.
    pub const ALL: [RouteKind; 9] = [
        RouteKind::Any,
        RouteKind::Admin,
        RouteKind::AdminWithAjax,
        RouteKind::Ajax,
        RouteKind::Cron,
        RouteKind::Frontend,
        RouteKind::FrontendWithAjax,
        RouteKind::LateFrontend,
        RouteKind::LateFrontendWithAjax,
    ];

    /// Returns the phase at which routes of this kind are evaluated.
    pub fn phase(&self) -> Phase {
        match self {
            Self::LateFrontend | Self::LateFrontendWithAjax => Phase::Late,
            _ => Phase::Early,
        }
    }

    /// Returns the name used in configuration files and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Admin => "admin",
            Self::AdminWithAjax => "admin_with_possible_ajax",
            Self::Ajax => "ajax",
            Self::Cron => "cron",
            Self::Frontend => "frontend",
            Self::FrontendWithAjax => "frontend_with_possible_ajax",
            Self::LateFrontend => "late_frontend",
            Self::LateFrontendWithAjax => "late_frontend_with_possible_ajax",
        }
    }

    /// Returns the naming context of this kind, if it has one.
    ///
    /// Admin-flavoured and frontend-flavoured kinds resolve short component
    /// names inside the application namespace; the others use names verbatim.
    pub fn context(&self) -> Option<KindContext> {
        match self {
            Self::Admin | Self::AdminWithAjax => Some(KindContext::Admin),
            Self::Frontend
            | Self::FrontendWithAjax
            | Self::LateFrontend
            | Self::LateFrontendWithAjax => Some(KindContext::Frontend),
            Self::Any | Self::Ajax | Self::Cron => None,
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown route kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route kind '{0}'")]
pub struct UnknownRouteKind(pub String);

impl FromStr for RouteKind {
    type Err = UnknownRouteKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        RouteKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownRouteKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_partition() {
        assert_eq!(
            Phase::Early.default_kinds(),
            vec![
                RouteKind::Any,
                RouteKind::Admin,
                RouteKind::AdminWithAjax,
                RouteKind::Ajax,
                RouteKind::Cron,
                RouteKind::Frontend,
                RouteKind::FrontendWithAjax,
            ]
        );
        assert_eq!(
            Phase::Late.default_kinds(),
            vec![RouteKind::LateFrontend, RouteKind::LateFrontendWithAjax]
        );
    }

    #[test]
    fn test_parse_kind_names() {
        assert_eq!("admin".parse(), Ok(RouteKind::Admin));
        assert_eq!(
            "late-frontend-with-possible-ajax".parse(),
            Ok(RouteKind::LateFrontendWithAjax)
        );
        assert!("backend".parse::<RouteKind>().is_err());

        for kind in RouteKind::ALL {
            assert_eq!(kind.as_str().parse(), Ok(kind));
        }
    }

    #[test]
    fn test_serde_names_match_display() {
        for kind in RouteKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_kind_context() {
        assert_eq!(RouteKind::AdminWithAjax.context(), Some(KindContext::Admin));
        assert_eq!(RouteKind::LateFrontend.context(), Some(KindContext::Frontend));
        assert_eq!(RouteKind::Cron.context(), None);
    }
}
