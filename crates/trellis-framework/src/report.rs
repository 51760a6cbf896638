//! What a dispatch pass did.

use serde::Serialize;
use trellis_core::{Phase, RouteKind, Target};

use crate::controller::Response;
use crate::error::DispatchError;

/// Whether an invocation came from a full route or a model-only route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteShape {
    Controller,
    ModelOnly,
}

/// One component the pass constructed and ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub kind: RouteKind,
    pub shape: RouteShape,
    /// Resolved target; the name is namespace-qualified for model-only routes.
    pub target: Target,
    /// Action result, `None` if the target carried no action.
    pub response: Option<Response>,
}

/// Summary of one dispatch pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub phase: Phase,
    /// Invocations in the order they ran.
    pub invocations: Vec<Invocation>,
    /// Entries skipped because a provider opted out.
    pub skipped: usize,
    /// The error that halted the pass, if any.
    pub halted: Option<DispatchError>,
}

impl DispatchReport {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            invocations: Vec::new(),
            skipped: 0,
            halted: None,
        }
    }

    /// Resolved targets in invocation order, rendered as `Name@action`.
    pub fn targets(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(|i| i.target.to_string())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_serializes() {
        let mut report = DispatchReport::new(Phase::Early);
        report.invocations.push(Invocation {
            kind: RouteKind::Frontend,
            shape: RouteShape::Controller,
            target: Target::parse("Widget@render"),
            response: Some(Response::rendered("<div>widget</div>")),
        });
        report.skipped = 1;
        report.halted = Some(DispatchError::unknown("controller", "Missing"));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["skipped"], json!(1));
        assert_eq!(value["invocations"][0]["shape"], json!("controller"));
        assert_eq!(value["invocations"][0]["target"]["name"], json!("Widget"));
        assert_eq!(value["invocations"][0]["target"]["action"], json!("render"));
        assert_eq!(
            value["invocations"][0]["response"]["rendered"],
            json!("<div>widget</div>")
        );
        assert_eq!(
            value["halted"]["unknown_component"]["name"],
            json!("Missing")
        );
    }
}
