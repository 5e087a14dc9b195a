//! Condition evaluation over a field source.
//!
//! Evaluation is total over the error channel: every failure mode (unknown
//! field, type mismatch, non-boolean operand) is a typed [`EvalError`], so
//! one rule's bad condition can never take down a scan.

use thiserror::Error;

use super::{CmpOp, Expr, Value};

/// Read-only field lookup the evaluator resolves identifiers against.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<Value>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("cannot order {0} against {1}")]
    Incomparable(&'static str, &'static str),

    #[error("`in` requires a list on the right-hand side, got {0}")]
    NotAList(&'static str),

    #[error("boolean operator applied to {0}")]
    NotBoolean(&'static str),
}

/// Evaluate a condition expression against a field source.
pub fn evaluate(expr: &Expr, fields: &dyn FieldSource) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),

        Expr::Field(name) => fields
            .field(name)
            .ok_or_else(|| EvalError::UnknownField(name.clone())),

        Expr::Compare { op, left, right } => {
            let left = evaluate(left, fields)?;
            let right = evaluate(right, fields)?;
            compare(*op, &left, &right).map(Value::Bool)
        }

        Expr::Membership { negated, item, list } => {
            let item = evaluate(item, fields)?;
            let list = evaluate(list, fields)?;
            let Value::List(elements) = list else {
                return Err(EvalError::NotAList(list.type_name()));
            };
            let found = elements.iter().any(|e| e.loose_eq(&item));
            Ok(Value::Bool(found != *negated))
        }

        // Boolean combinators short-circuit; both sides must be boolean
        // when reached.
        Expr::And(left, right) => {
            if !as_bool(evaluate(left, fields)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(as_bool(evaluate(right, fields)?)?))
        }
        Expr::Or(left, right) => {
            if as_bool(evaluate(left, fields)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(as_bool(evaluate(right, fields)?)?))
        }
        Expr::Not(inner) => Ok(Value::Bool(!as_bool(evaluate(inner, fields)?)?)),
    }
}

fn as_bool(value: Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::NotBoolean(other.type_name())),
    }
}

/// Comparison semantics: equality is defined across all types (mismatched
/// types are unequal); ordering requires two numbers or two strings.
fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    match op {
        CmpOp::Eq => return Ok(left.loose_eq(right)),
        CmpOp::Ne => return Ok(!left.loose_eq(right)),
        _ => {}
    }

    let ordering = match (left, right) {
        (Value::Num(a), Value::Num(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (a, b) => return Err(EvalError::Incomparable(a.type_name(), b.type_name())),
    };
    // Unordered numbers (NaN) compare false on every ordering operator.
    let Some(ordering) = ordering else {
        return Ok(false);
    };

    Ok(match op {
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::Le => ordering.is_le(),
        CmpOp::Gt => ordering.is_gt(),
        CmpOp::Ge => ordering.is_ge(),
        CmpOp::Eq | CmpOp::Ne => unreachable!("handled above"),
    })
}
