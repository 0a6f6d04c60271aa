//! Admission verdicts.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EVALUATION_ERROR: &str = "evaluation-error";
pub const EXECUTION_ERROR: &str = "execution-error";

/// Verdict for one wish (or one executed operation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EthicalEvaluation {
    pub sound: bool,
    pub trust_score: f64,
    pub bias_indicators: BTreeSet<String>,
    pub human_review_required: bool,
    pub missing_safeguards: BTreeSet<String>,
    pub reasoning: String,
    pub evaluated_at: DateTime<Utc>,
}

impl EthicalEvaluation {
    /// Returned for every wish while the gate is disabled.
    pub fn permissive() -> Self {
        Self {
            sound: true,
            trust_score: 1.0,
            bias_indicators: BTreeSet::new(),
            human_review_required: false,
            missing_safeguards: BTreeSet::new(),
            reasoning: "Policy gate disabled".to_string(),
            evaluated_at: Utc::now(),
        }
    }

    /// Block and require review: used when the gate itself faulted.
    pub fn fail_safe(reason: impl std::fmt::Display) -> Self {
        Self::blocking(EVALUATION_ERROR, format!("Evaluation failed: {reason}"))
    }

    /// Attached when an admitted operation failed to execute.
    pub fn execution_failed(reason: impl std::fmt::Display) -> Self {
        Self::blocking(EXECUTION_ERROR, format!("Process execution failed: {reason}"))
    }

    /// Lightweight check attached to a successful execution.
    pub fn output_validated() -> Self {
        Self {
            sound: true,
            trust_score: 0.8,
            bias_indicators: BTreeSet::new(),
            human_review_required: false,
            missing_safeguards: BTreeSet::new(),
            reasoning: "Output validation passed".to_string(),
            evaluated_at: Utc::now(),
        }
    }

    fn blocking(indicator: &str, reasoning: String) -> Self {
        Self {
            sound: false,
            trust_score: 0.0,
            bias_indicators: BTreeSet::from([indicator.to_string()]),
            human_review_required: true,
            missing_safeguards: BTreeSet::new(),
            reasoning,
            evaluated_at: Utc::now(),
        }
    }
}
