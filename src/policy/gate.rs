//! Admission gate.

use std::collections::BTreeSet;

use chrono::Utc;
use thiserror::Error;

use crate::config::PolicyConfig;
use crate::observability::metrics;
use crate::policy::evaluation::EthicalEvaluation;
use crate::policy::rules::{BiasRules, RiskKeywords};
use crate::policy::wish::{safeguards, Wish};

/// Trust is scored in hundredths so boundary values compare exactly.
const FULL_TRUST: i64 = 100;
const RISK_PENALTY: i64 = 20;
const SAFEGUARD_BONUSES: &[(&str, i64)] = &[
    (safeguards::HUMAN_REVIEW, 10),
    (safeguards::BIAS_DETECTION, 10),
    (safeguards::DATA_VALIDATION, 5),
];
const MANDATORY_SAFEGUARDS: &[&str] = &[safeguards::BIAS_DETECTION, safeguards::HUMAN_OVERRIDE];

/// Internal failure while evaluating. Never leaves the gate: `evaluate`
/// turns it into a fail-safe verdict.
#[derive(Debug, Error)]
pub enum EvaluationFault {
    #[error("trust threshold {0} is not a number in [0, 1]")]
    InvalidThreshold(f64),

    #[error("failed to serialize wish context: {0}")]
    Context(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct PolicyGate {
    config: PolicyConfig,
    bias_rules: BiasRules,
    risk_keywords: RiskKeywords,
}

impl PolicyGate {
    pub fn new(config: PolicyConfig) -> Self {
        let bias_rules = BiasRules::from_config(&config.bias_categories);
        let risk_keywords = RiskKeywords::new(&config.risk_keywords);
        Self {
            config,
            bias_rules,
            risk_keywords,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Evaluate `wish`. Always returns a verdict; faults become a blocking one.
    pub fn evaluate(&self, wish: &Wish) -> EthicalEvaluation {
        if !self.config.enabled {
            tracing::debug!(objective = %wish.objective, "Policy gate disabled, admitting");
            metrics::record_verdict("bypassed", 1.0);
            return EthicalEvaluation::permissive();
        }

        match self.try_evaluate(wish) {
            Ok(evaluation) => {
                let verdict = if evaluation.sound { "sound" } else { "blocked" };
                tracing::info!(
                    objective = %wish.objective,
                    domain = %wish.domain,
                    actor = %wish.actor_identity,
                    sound = evaluation.sound,
                    trust_score = evaluation.trust_score,
                    human_review = evaluation.human_review_required,
                    reasoning = %evaluation.reasoning,
                    "Policy verdict"
                );
                metrics::record_verdict(verdict, evaluation.trust_score);
                evaluation
            }
            Err(fault) => {
                tracing::error!(
                    objective = %wish.objective,
                    error = %fault,
                    "Policy evaluation faulted, blocking"
                );
                metrics::record_verdict("fault", 0.0);
                EthicalEvaluation::fail_safe(fault)
            }
        }
    }

    /// Evaluate `wish` with the gate's rules, surfacing internal faults.
    pub fn try_evaluate(&self, wish: &Wish) -> Result<EthicalEvaluation, EvaluationFault> {
        let threshold = self.config.trust_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(EvaluationFault::InvalidThreshold(threshold));
        }

        let objective = wish.objective.to_lowercase();

        let trust_score = self.trust_score(&objective, wish);

        let bias_indicators = if self.config.bias_detection {
            let context = serde_json::to_string(&wish.context)?.to_lowercase();
            self.bias_rules.detect(&[objective.as_str(), context.as_str()])
        } else {
            BTreeSet::new()
        };

        let missing_safeguards: BTreeSet<String> = MANDATORY_SAFEGUARDS
            .iter()
            .filter(|tag| !wish.declares(tag))
            .map(|tag| tag.to_string())
            .collect();

        let below_threshold = trust_score < threshold;
        let human_review_required =
            below_threshold || !bias_indicators.is_empty() || self.config.require_human_review;
        let sound = !below_threshold && bias_indicators.is_empty() && missing_safeguards.is_empty();

        let reasoning = reasoning(
            trust_score,
            threshold,
            below_threshold,
            &bias_indicators,
            &missing_safeguards,
        );

        Ok(EthicalEvaluation {
            sound,
            trust_score,
            bias_indicators,
            human_review_required,
            missing_safeguards,
            reasoning,
            evaluated_at: Utc::now(),
        })
    }

    fn trust_score(&self, objective: &str, wish: &Wish) -> f64 {
        let hits = i64::try_from(self.risk_keywords.occurrences(objective)).unwrap_or(i64::MAX);
        let bonus: i64 = SAFEGUARD_BONUSES
            .iter()
            .filter(|(tag, _)| wish.declares(tag))
            .map(|(_, bonus)| bonus)
            .sum();
        let points = FULL_TRUST
            .saturating_sub(RISK_PENALTY.saturating_mul(hits))
            .saturating_add(bonus)
            .clamp(0, FULL_TRUST);
        points as f64 / FULL_TRUST as f64
    }
}

fn reasoning(
    trust_score: f64,
    threshold: f64,
    below_threshold: bool,
    bias_indicators: &BTreeSet<String>,
    missing_safeguards: &BTreeSet<String>,
) -> String {
    let mut clauses = Vec::new();
    if below_threshold {
        clauses.push(format!(
            "Trust score {trust_score:.2} below threshold {threshold}"
        ));
    }
    if !bias_indicators.is_empty() {
        clauses.push(format!("Bias indicators: {}", join(bias_indicators)));
    }
    if !missing_safeguards.is_empty() {
        clauses.push(format!("Missing safeguards: {}", join(missing_safeguards)));
    }

    if clauses.is_empty() {
        "All policy checks passed".to_string()
    } else {
        clauses.join("; ")
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::evaluation::EVALUATION_ERROR;
    use serde_json::json;

    fn gate() -> PolicyGate {
        PolicyGate::new(PolicyConfig::default())
    }

    fn strings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_clean_wish_is_sound() {
        let wish = Wish::new("Sync calendar events")
            .safeguards([safeguards::BIAS_DETECTION, safeguards::HUMAN_OVERRIDE]);
        let evaluation = gate().evaluate(&wish);

        assert!(evaluation.sound);
        assert_eq!(evaluation.trust_score, 1.0);
        assert!(evaluation.missing_safeguards.is_empty());
        assert!(evaluation.bias_indicators.is_empty());
        assert!(!evaluation.human_review_required);
        assert_eq!(evaluation.reasoning, "All policy checks passed");
    }

    #[test]
    fn test_delete_all_contacts() {
        let evaluation = gate().evaluate(&Wish::new("delete all contacts"));

        assert_eq!(evaluation.trust_score, 0.8);
        assert_eq!(
            evaluation.missing_safeguards,
            strings(&["bias-detection", "human-override"])
        );
        assert!(!evaluation.sound);
        assert!(!evaluation.human_review_required);
        assert_eq!(
            evaluation.reasoning,
            "Missing safeguards: bias-detection, human-override"
        );
    }

    #[test]
    fn test_penalty_per_occurrence() {
        let gate = gate();
        for (objective, expected) in [
            ("remove duplicates", 0.8),
            ("delete and remove", 0.6),
            ("bypass checks, override limits, ignore errors", 0.4),
            ("hack hack, remove, ignore", 0.2),
            ("delete delete delete delete delete delete", 0.0),
        ] {
            let evaluation = gate.evaluate(&Wish::new(objective));
            assert_eq!(evaluation.trust_score, expected, "{objective}");
        }
    }

    #[test]
    fn test_score_exactly_at_threshold_is_sound() {
        let gate = PolicyGate::new(PolicyConfig {
            trust_threshold: 0.5,
            ..Default::default()
        });
        let wish = Wish::new("delete x, remove y, ignore z")
            .safeguards(["bias-detection", "human-override"]);
        let evaluation = gate.evaluate(&wish);

        assert_eq!(evaluation.trust_score, 0.5);
        assert!(evaluation.sound);
        assert!(!evaluation.human_review_required);
        assert_eq!(evaluation.reasoning, "All policy checks passed");

        let gate = PolicyGate::new(PolicyConfig {
            trust_threshold: 0.6,
            ..Default::default()
        });
        let wish = Wish::new("delete x, remove y, ignore z")
            .safeguards(["human-review", "bias-detection", "human-override"]);
        let evaluation = gate.evaluate(&wish);
        assert_eq!(evaluation.trust_score, 0.6);
        assert!(evaluation.sound);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let evaluation = gate().evaluate(&Wish::new("DELETE Archive"));
        assert_eq!(evaluation.trust_score, 0.8);
    }

    #[test]
    fn test_bonuses_and_clamp() {
        let wish = Wish::new("delete delete stale entries")
            .safeguards(["human-review", "bias-detection", "data-validation"]);
        let evaluation = gate().evaluate(&wish);
        assert_eq!(evaluation.trust_score, 0.85);

        let wish = Wish::new("sync").safeguards(["human-review", "bias-detection"]);
        assert_eq!(gate().evaluate(&wish).trust_score, 1.0);
    }

    #[test]
    fn test_reasoning_clause_order() {
        let wish = Wish::new("delete delete records of elderly users");
        let evaluation = gate().evaluate(&wish);

        assert_eq!(evaluation.trust_score, 0.6);
        assert!(evaluation.human_review_required);
        assert_eq!(evaluation.bias_indicators, strings(&["age-bias"]));
        assert_eq!(
            evaluation.reasoning,
            "Trust score 0.60 below threshold 0.7; \
             Bias indicators: age-bias; \
             Missing safeguards: bias-detection, human-override"
        );
    }

    #[test]
    fn test_bias_found_in_context() {
        let wish = Wish::new("segment contacts")
            .context("filter", json!({"income": "> 100k"}))
            .safeguards(["bias-detection", "human-override"]);
        let evaluation = gate().evaluate(&wish);

        assert_eq!(evaluation.bias_indicators, strings(&["economic-bias"]));
        assert!(!evaluation.sound);
        assert!(evaluation.human_review_required);
    }

    #[test]
    fn test_bias_detection_disabled() {
        let gate = PolicyGate::new(PolicyConfig {
            bias_detection: false,
            ..Default::default()
        });
        let wish = Wish::new("target wealthy users")
            .safeguards(["bias-detection", "human-override"]);
        let evaluation = gate.evaluate(&wish);
        assert!(evaluation.bias_indicators.is_empty());
        assert!(evaluation.sound);
    }

    #[test]
    fn test_always_require_review() {
        let gate = PolicyGate::new(PolicyConfig {
            require_human_review: true,
            ..Default::default()
        });
        let wish = Wish::new("sync calendar").safeguards(["bias-detection", "human-override"]);
        let evaluation = gate.evaluate(&wish);
        assert!(evaluation.sound);
        assert!(evaluation.human_review_required);
    }

    #[test]
    fn test_disabled_gate_is_permissive() {
        let gate = PolicyGate::new(PolicyConfig {
            enabled: false,
            ..Default::default()
        });
        for wish in [
            Wish::new("delete delete delete delete delete everything"),
            Wish::new("hack the wealthy"),
            Wish::new(""),
        ] {
            let evaluation = gate.evaluate(&wish);
            assert!(evaluation.sound);
            assert_eq!(evaluation.trust_score, 1.0);
            assert!(evaluation.bias_indicators.is_empty());
            assert!(evaluation.missing_safeguards.is_empty());
            assert!(!evaluation.human_review_required);
        }
    }

    #[test]
    fn test_invalid_threshold_fails_safe() {
        for threshold in [f64::NAN, 1.5, -0.1] {
            let gate = PolicyGate::new(PolicyConfig {
                trust_threshold: threshold,
                ..Default::default()
            });
            let wish = Wish::new("sync").safeguards(["bias-detection", "human-override"]);

            assert!(matches!(
                gate.try_evaluate(&wish),
                Err(EvaluationFault::InvalidThreshold(_))
            ));

            let evaluation = gate.evaluate(&wish);
            assert!(!evaluation.sound);
            assert_eq!(evaluation.trust_score, 0.0);
            assert!(evaluation.human_review_required);
            assert_eq!(evaluation.bias_indicators, strings(&[EVALUATION_ERROR]));
        }
    }

    #[test]
    fn test_enrichment_builder_trips_literal_match() {
        let evaluation = gate().evaluate(&Wish::data_enrichment("append", "company", "u-7"));
        assert!(evaluation.bias_indicators.contains("economic-bias"));
        assert!(evaluation.missing_safeguards.is_empty());
        assert!(!evaluation.sound);
    }
}
