//! Compliance rule engine.
//!
//! This crate provides:
//! - YAML-based rule definition with serde deserialization
//! - A restricted boolean expression grammar (lexer, parser, evaluator)
//!   replacing free-form code execution for rule conditions
//! - A per-record evaluator with per-rule fault isolation
//! - A filesystem loader that compiles conditions at load time
//!
//! A malformed rule never affects any other rule: parse failures make the
//! rule inert, and evaluation failures surface as an `Errored` outcome for
//! that (record, rule) pair only.

pub mod evaluator;
pub mod expr;
pub mod loader;
pub mod schema;

pub use evaluator::{
    evaluate, evaluate_with_outcomes, scan, Evaluation, RecordContext, RuleOutcome, ScanReport,
};
pub use loader::{LoadResult, LoadStatus, RuleError, RuleLoader};
pub use schema::{Condition, DonationSnapshot, Rule, RuleSpec, Violation};
