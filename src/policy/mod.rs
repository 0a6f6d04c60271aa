//! Policy subsystem.
//!
//! # Responsibilities
//! - Score a wish's trust from risk keywords and declared safeguards
//! - Flag bias categories found in the objective or context
//! - Decide soundness and whether a human must review
//!
//! # Data Flow
//! ```text
//! Wish
//!     → gate.rs: disabled? → permissive verdict
//!     → trust score (rules.rs risk keywords, safeguard bonuses)
//!     → bias indicators (rules.rs category table)
//!     → missing mandatory safeguards
//!     → EthicalEvaluation (evaluation.rs)
//! ```
//!
//! # Design Decisions
//! - Evaluation is a pure function of the wish and the config snapshot
//! - Internal faults never escape; they produce a blocking verdict
//! - The bias table is plain data and can be replaced from config

pub mod evaluation;
pub mod gate;
pub mod rules;
pub mod wish;

pub use evaluation::EthicalEvaluation;
pub use gate::{EvaluationFault, PolicyGate};
pub use rules::BiasRules;
pub use wish::{safeguards, Wish};
