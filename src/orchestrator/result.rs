//! Execution envelope returned to callers.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use uuid::Uuid;

use crate::dispatch::DispatchError;
use crate::policy::EthicalEvaluation;

/// Why an execution did not succeed.
///
/// Serialized flat with a `kind` tag: `policy_blocked`, or the
/// dispatch error's own kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// Refused by the gate; nothing was dispatched.
    PolicyBlocked { reasoning: String },
    Dispatch(DispatchError),
}

impl FailureReason {
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::PolicyBlocked { .. } => "policy_blocked",
            FailureReason::Dispatch(e) => e.label(),
        }
    }
}

impl From<DispatchError> for FailureReason {
    fn from(error: DispatchError) -> Self {
        FailureReason::Dispatch(error)
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FailureReason::PolicyBlocked { reasoning } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("kind", "policy_blocked")?;
                map.serialize_entry("reasoning", reasoning)?;
                map.end()
            }
            FailureReason::Dispatch(error) => error.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    pub request_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub evaluation: EthicalEvaluation,
    /// Reserved: no override workflow exists, so this is always false.
    pub human_override_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
}

impl DispatchResult {
    pub(crate) fn blocked(request_id: Uuid, evaluation: EthicalEvaluation) -> Self {
        let reasoning = evaluation.reasoning.clone();
        Self {
            request_id,
            success: false,
            payload: None,
            evaluation,
            human_override_used: false,
            failure: Some(FailureReason::PolicyBlocked { reasoning }),
        }
    }

    pub(crate) fn completed(request_id: Uuid, payload: serde_json::Value) -> Self {
        Self {
            request_id,
            success: true,
            payload: Some(payload),
            evaluation: EthicalEvaluation::output_validated(),
            human_override_used: false,
            failure: None,
        }
    }

    pub(crate) fn failed(request_id: Uuid, error: DispatchError) -> Self {
        Self {
            request_id,
            success: false,
            payload: None,
            evaluation: EthicalEvaluation::execution_failed(&error),
            human_override_used: false,
            failure: Some(error.into()),
        }
    }

    /// True when the wish was refused by policy before any dispatch.
    pub fn is_blocked(&self) -> bool {
        matches!(self.failure, Some(FailureReason::PolicyBlocked { .. }))
    }

    /// The dispatch error, when dispatch was attempted and failed.
    pub fn dispatch_error(&self) -> Option<&DispatchError> {
        match &self.failure {
            Some(FailureReason::Dispatch(error)) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_kinds_serialize_flat() {
        let blocked = FailureReason::PolicyBlocked {
            reasoning: "Missing safeguards: human-override".into(),
        };
        assert_eq!(
            serde_json::to_value(&blocked).unwrap(),
            json!({"kind": "policy_blocked", "reasoning": "Missing safeguards: human-override"})
        );

        let unavailable = FailureReason::from(DispatchError::BackendUnavailable {
            backend: "github".into(),
        });
        assert_eq!(
            serde_json::to_value(&unavailable).unwrap(),
            json!({"kind": "backend_unavailable", "backend": "github"})
        );
        assert_eq!(unavailable.label(), "unavailable");
    }
}
