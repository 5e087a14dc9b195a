//! Rule definitions and evaluator output types.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::expr::{self, Expr};

/// Fallback rule id when a spec omits one.
pub const UNKNOWN_RULE_ID: &str = "unknown_rule";
/// Fallback violation message when a spec omits one.
pub const DEFAULT_MESSAGE: &str = "Rule violated.";

/// One rule as written in a YAML rules file. All fields are optional:
/// missing metadata is defaulted at compile time, a missing condition
/// leaves the rule inert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

/// A compiled rule. Compilation never fails: an uncompilable condition is
/// carried as [`Condition::Invalid`] so the rule stays inert instead of
/// poisoning the rule set.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub message: String,
    pub condition: Condition,
}

#[derive(Debug, Clone)]
pub enum Condition {
    /// Parsed and ready to evaluate.
    Ready(Expr),
    /// The condition string failed to parse; the rule never matches.
    Invalid { source: String, error: String },
    /// No condition was provided; the rule never matches.
    Empty,
}

impl Rule {
    /// Compile a spec into a rule, defaulting missing metadata and parsing
    /// the condition string.
    pub fn compile(spec: RuleSpec) -> Self {
        let id = spec
            .id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_RULE_ID.to_string());
        let message = spec
            .message
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

        let condition = match spec.condition.as_deref() {
            None | Some("") => Condition::Empty,
            Some(source) => match expr::parse(source) {
                Ok(parsed) => Condition::Ready(parsed),
                Err(e) => {
                    warn!(rule_id = %id, error = %e, "rule condition failed to parse; rule is inert");
                    Condition::Invalid {
                        source: source.to_string(),
                        error: e.to_string(),
                    }
                }
            },
        };

        Self { id, message, condition }
    }
}

/// A record that satisfied a rule's condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub rule_id: String,
    pub message: String,
    pub donation: DonationSnapshot,
}

/// Fixed projection of the record a violation was raised for, taken from
/// the prepared evaluation context (post-coercion amount, post-uppercase
/// state/occupation/employer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonationSnapshot {
    pub name: String,
    pub amount: f64,
    pub state: String,
    pub occupation: String,
    pub employer: String,
    /// ISO-8601 transaction date, absent when the record has none.
    pub date: Option<String>,
    pub committee_id: String,
}
