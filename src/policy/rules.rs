//! Keyword tables used by the gate.

use std::collections::{BTreeMap, BTreeSet};

/// Built-in bias categories.
const DEFAULT_BIAS_TABLE: &[(&str, &[&str])] = &[
    ("gender-bias", &["male", "female", "man", "woman", "he", "she"]),
    ("racial-bias", &["race", "ethnicity", "nationality"]),
    ("age-bias", &["young", "old", "age", "elderly", "youth"]),
    ("economic-bias", &["rich", "poor", "wealthy", "income", "class"]),
];

/// Category -> keyword table. Matching is a literal substring test on
/// lowercased text, so short keywords match inside longer words.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasRules {
    categories: BTreeMap<String, Vec<String>>,
}

impl BiasRules {
    /// Use `overrides` when non-empty, otherwise the built-in table.
    pub fn from_config(overrides: &BTreeMap<String, Vec<String>>) -> Self {
        if overrides.is_empty() {
            return Self::default();
        }
        let categories = overrides
            .iter()
            .map(|(category, keywords)| {
                (
                    category.clone(),
                    keywords.iter().map(|k| k.to_lowercase()).collect(),
                )
            })
            .collect();
        Self { categories }
    }

    /// Categories with at least one keyword present in any of `haystacks`.
    /// Callers pass lowercased text.
    pub fn detect(&self, haystacks: &[&str]) -> BTreeSet<String> {
        self.categories
            .iter()
            .filter(|(_, keywords)| {
                keywords
                    .iter()
                    .filter(|k| !k.is_empty())
                    .any(|k| haystacks.iter().any(|text| text.contains(k.as_str())))
            })
            .map(|(category, _)| category.clone())
            .collect()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }
}

impl Default for BiasRules {
    fn default() -> Self {
        let categories = DEFAULT_BIAS_TABLE
            .iter()
            .map(|(category, keywords)| {
                (
                    category.to_string(),
                    keywords.iter().map(|k| k.to_string()).collect(),
                )
            })
            .collect();
        Self { categories }
    }
}

/// Risk keywords, each costing a fixed amount of trust per occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskKeywords {
    keywords: Vec<String>,
}

impl RiskKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Non-overlapping occurrences of every keyword in `text` (lowercased).
    pub fn occurrences(&self, text: &str) -> usize {
        self.keywords.iter().map(|k| text.matches(k.as_str()).count()).sum()
    }
}
