//! Operation intents submitted for admission.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Safeguard tags with a fixed meaning to the gate.
pub mod safeguards {
    pub const HUMAN_REVIEW: &str = "human-review";
    pub const HUMAN_OVERRIDE: &str = "human-override";
    pub const BIAS_DETECTION: &str = "bias-detection";
    pub const DATA_VALIDATION: &str = "data-validation";
    pub const PRIVACY_PROTECTION: &str = "privacy-protection";
    pub const EXTERNAL_DATA_VALIDATION: &str = "external-data-validation";
}

/// A caller's declared intent to perform an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wish {
    pub objective: String,
    #[serde(default)]
    pub context: BTreeMap<String, Value>,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub actor_identity: String,
    #[serde(default)]
    pub declared_safeguards: BTreeSet<String>,
    #[serde(default)]
    pub requires_human_override: Option<bool>,
}

impl Wish {
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            context: BTreeMap::new(),
            domain: String::new(),
            actor_identity: String::new(),
            declared_safeguards: BTreeSet::new(),
            requires_human_override: None,
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor_identity = actor.into();
        self
    }

    pub fn context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    pub fn safeguard(mut self, tag: impl Into<String>) -> Self {
        self.declared_safeguards.insert(tag.into());
        self
    }

    pub fn safeguards<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_safeguards
            .extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn requires_human_override(mut self, required: bool) -> Self {
        self.requires_human_override = Some(required);
        self
    }

    pub fn declares(&self, tag: &str) -> bool {
        self.declared_safeguards.contains(tag)
    }

    /// Contact intelligence work over `contact_count` contacts.
    pub fn contact_intelligence(operation: &str, contact_count: usize, user_id: &str) -> Self {
        Wish::new(format!("Contact intelligence: {operation}"))
            .domain("contact-intelligence")
            .actor(user_id)
            .context("operation", json!(operation))
            .context("contact_count", json!(contact_count))
            .context("user_id", json!(user_id))
            .safeguards([
                safeguards::BIAS_DETECTION,
                safeguards::HUMAN_OVERRIDE,
                safeguards::DATA_VALIDATION,
            ])
    }

    /// Email intelligence work over `email_count` messages.
    pub fn email_intelligence(operation: &str, email_count: usize, user_id: &str) -> Self {
        Wish::new(format!("Email intelligence: {operation}"))
            .domain("email-intelligence")
            .actor(user_id)
            .context("operation", json!(operation))
            .context("email_count", json!(email_count))
            .context("user_id", json!(user_id))
            .safeguards([
                safeguards::BIAS_DETECTION,
                safeguards::HUMAN_OVERRIDE,
                safeguards::PRIVACY_PROTECTION,
            ])
    }

    /// Enrichment of a record of kind `target_type` from external sources.
    pub fn data_enrichment(operation: &str, target_type: &str, user_id: &str) -> Self {
        Wish::new(format!("Data enrichment: {operation}"))
            .domain("data-enrichment")
            .actor(user_id)
            .context("operation", json!(operation))
            .context("target_type", json!(target_type))
            .context("user_id", json!(user_id))
            .safeguards([
                safeguards::BIAS_DETECTION,
                safeguards::HUMAN_OVERRIDE,
                safeguards::EXTERNAL_DATA_VALIDATION,
            ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let wish: Wish = serde_json::from_str(r#"{"objective": "sync calendar"}"#).unwrap();
        assert_eq!(wish.objective, "sync calendar");
        assert!(wish.context.is_empty());
        assert!(wish.declared_safeguards.is_empty());
        assert_eq!(wish.requires_human_override, None);
    }

    #[test]
    fn test_contact_builder() {
        let wish = Wish::contact_intelligence("score", 40, "u-1");
        assert_eq!(wish.objective, "Contact intelligence: score");
        assert_eq!(wish.domain, "contact-intelligence");
        assert_eq!(wish.context["contact_count"], json!(40));
        assert!(wish.declares(safeguards::HUMAN_OVERRIDE));
        assert!(wish.declares(safeguards::DATA_VALIDATION));
    }
}
