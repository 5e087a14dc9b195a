//! Per-record rule evaluation with per-rule fault isolation.
//!
//! Each rule is evaluated independently against a prepared field context.
//! A rule that fails — unparseable condition, unknown field, type mismatch —
//! contributes no violations and cannot abort the remaining rules or the
//! surrounding scan; it surfaces as [`RuleOutcome::Errored`] and a warning
//! log line instead of disappearing silently.

use donorwatch_core::ContributionRecord;
use tracing::warn;

use crate::expr::{evaluate as eval_expr, FieldSource, Value};
use crate::schema::{Condition, DonationSnapshot, Rule, Violation};

// ── Prepared record context ─────────────────────────────────────────

/// Field context a record exposes to rule conditions.
///
/// Prepared once per record: amount coerced to a number (0 when absent),
/// state/occupation/employer uppercased, date rendered as an ISO string.
/// Conditions can resolve the interface field names or, for compatibility
/// with rules written against the raw FEC columns, their uppercase aliases.
#[derive(Debug, Clone)]
pub struct RecordContext {
    name: String,
    state: String,
    occupation: String,
    employer: String,
    amount: f64,
    date_iso: Option<String>,
    committee_id: String,
}

impl RecordContext {
    pub fn prepare(record: &ContributionRecord) -> Self {
        Self {
            name: record.name.clone(),
            state: record.state.to_uppercase(),
            occupation: record.occupation.to_uppercase(),
            employer: record.employer.to_uppercase(),
            amount: record.transaction_amount.unwrap_or(0.0),
            date_iso: record.date_iso(),
            committee_id: record.committee_id.clone(),
        }
    }

    /// The violation projection for this record.
    pub fn snapshot(&self) -> DonationSnapshot {
        DonationSnapshot {
            name: self.name.clone(),
            amount: self.amount,
            state: self.state.clone(),
            occupation: self.occupation.clone(),
            employer: self.employer.clone(),
            date: self.date_iso.clone(),
            committee_id: self.committee_id.clone(),
        }
    }
}

impl FieldSource for RecordContext {
    fn field(&self, name: &str) -> Option<Value> {
        let date = || match &self.date_iso {
            Some(d) => Value::Str(d.clone()),
            None => Value::Null,
        };
        match name {
            "name" | "NAME" => Some(Value::Str(self.name.clone())),
            "state" | "STATE" => Some(Value::Str(self.state.clone())),
            "occupation" | "OCCUPATION" => Some(Value::Str(self.occupation.clone())),
            "employer" | "EMPLOYER" => Some(Value::Str(self.employer.clone())),
            "transactionAmount" | "TRANSACTION_AMT" => Some(Value::Num(self.amount)),
            "transactionDate" | "TRANSACTION_DT" => Some(date()),
            "committeeId" | "CMTE_ID" => Some(Value::Str(self.committee_id.clone())),
            _ => None,
        }
    }
}

// ── Per-rule outcomes ───────────────────────────────────────────────

/// What happened when one rule met one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Matched,
    NotMatched,
    /// The rule could not be evaluated; the reason is kept so callers can
    /// count or report skipped rules.
    Errored(String),
}

impl RuleOutcome {
    pub fn is_errored(&self) -> bool {
        matches!(self, RuleOutcome::Errored(_))
    }
}

/// Violations plus the per-rule outcome trail for one record.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub violations: Vec<Violation>,
    /// One outcome per rule, in rule order.
    pub outcomes: Vec<RuleOutcome>,
}

impl Evaluation {
    pub fn errored_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_errored()).count()
    }
}

// ── Evaluation ──────────────────────────────────────────────────────

/// Evaluate every rule against one record, returning the violations.
pub fn evaluate(record: &ContributionRecord, rules: &[Rule]) -> Vec<Violation> {
    evaluate_with_outcomes(record, rules).violations
}

/// Evaluate every rule against one record, keeping the outcome of each
/// rule alongside the violations.
pub fn evaluate_with_outcomes(record: &ContributionRecord, rules: &[Rule]) -> Evaluation {
    let context = RecordContext::prepare(record);
    let mut violations = Vec::new();
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in rules {
        let outcome = evaluate_rule(rule, &context);
        if let RuleOutcome::Errored(reason) = &outcome {
            warn!(rule_id = %rule.id, reason = %reason, "rule skipped for record");
        }
        if outcome == RuleOutcome::Matched {
            violations.push(Violation {
                rule_id: rule.id.clone(),
                message: rule.message.clone(),
                donation: context.snapshot(),
            });
        }
        outcomes.push(outcome);
    }

    Evaluation { violations, outcomes }
}

fn evaluate_rule(rule: &Rule, context: &RecordContext) -> RuleOutcome {
    let expr = match &rule.condition {
        Condition::Ready(expr) => expr,
        Condition::Empty => return RuleOutcome::NotMatched,
        Condition::Invalid { error, .. } => {
            return RuleOutcome::Errored(format!("condition failed to parse: {error}"));
        }
    };

    match eval_expr(expr, context) {
        Ok(Value::Bool(true)) => RuleOutcome::Matched,
        Ok(Value::Bool(false)) => RuleOutcome::NotMatched,
        Ok(other) => RuleOutcome::Errored(format!(
            "condition produced {} instead of a boolean",
            other.type_name()
        )),
        Err(e) => RuleOutcome::Errored(e.to_string()),
    }
}

// ── Batch scan ──────────────────────────────────────────────────────

/// Violations plus an errored-rule-evaluation count for a whole scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub violations: Vec<Violation>,
    /// Total (record, rule) evaluations that errored across the scan.
    pub errored: usize,
}

/// Evaluate the rule set against every record in order.
pub fn scan<'a, I>(records: I, rules: &[Rule]) -> ScanReport
where
    I: IntoIterator<Item = &'a ContributionRecord>,
{
    let mut report = ScanReport::default();
    for record in records {
        let evaluation = evaluate_with_outcomes(record, rules);
        report.errored += evaluation.errored_count();
        report.violations.extend(evaluation.violations);
    }
    report
}

// ── Tests ───────────────────────────────────────────────────────────
