//! Recursive-descent parser for the condition grammar.
//!
//! Precedence, loosest first: `or`, `and`, `not`, comparison/membership,
//! operand. `not` binds looser than comparisons, so `not amount > 100`
//! negates the whole comparison.

use thiserror::Error;

use super::lexer::{tokenize, Token};
use super::{CmpOp, Expr, Value};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("empty condition")]
    Empty,

    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),

    #[error("unexpected end of condition")]
    UnexpectedEnd,

    #[error("expected `{0}`")]
    Expected(&'static str),
}

/// Parse a condition string into an [`Expr`].
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let (expr, pos) = parse_or(&tokens, 0)?;
    if pos != tokens.len() {
        return Err(ParseError::UnexpectedToken(pos));
    }
    Ok(expr)
}

fn parse_or(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ParseError> {
    let (mut left, mut pos) = parse_and(tokens, pos)?;
    while tokens.get(pos) == Some(&Token::Or) {
        let (right, next) = parse_and(tokens, pos + 1)?;
        left = Expr::Or(Box::new(left), Box::new(right));
        pos = next;
    }
    Ok((left, pos))
}

fn parse_and(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ParseError> {
    let (mut left, mut pos) = parse_not(tokens, pos)?;
    while tokens.get(pos) == Some(&Token::And) {
        let (right, next) = parse_not(tokens, pos + 1)?;
        left = Expr::And(Box::new(left), Box::new(right));
        pos = next;
    }
    Ok((left, pos))
}

fn parse_not(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ParseError> {
    if tokens.get(pos) == Some(&Token::Not) {
        let (inner, next) = parse_not(tokens, pos + 1)?;
        return Ok((Expr::Not(Box::new(inner)), next));
    }
    parse_comparison(tokens, pos)
}

fn parse_comparison(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ParseError> {
    let (left, pos) = parse_operand(tokens, pos)?;

    let op = match tokens.get(pos) {
        Some(Token::Eq) => Some(CmpOp::Eq),
        Some(Token::Ne) => Some(CmpOp::Ne),
        Some(Token::Lt) => Some(CmpOp::Lt),
        Some(Token::Le) => Some(CmpOp::Le),
        Some(Token::Gt) => Some(CmpOp::Gt),
        Some(Token::Ge) => Some(CmpOp::Ge),
        _ => None,
    };
    if let Some(op) = op {
        let (right, next) = parse_operand(tokens, pos + 1)?;
        return Ok((
            Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            next,
        ));
    }

    if tokens.get(pos) == Some(&Token::In) {
        let (list, next) = parse_operand(tokens, pos + 1)?;
        return Ok((membership(left, list, false), next));
    }
    if tokens.get(pos) == Some(&Token::Not) && tokens.get(pos + 1) == Some(&Token::In) {
        let (list, next) = parse_operand(tokens, pos + 2)?;
        return Ok((membership(left, list, true), next));
    }

    Ok((left, pos))
}

fn membership(item: Expr, list: Expr, negated: bool) -> Expr {
    Expr::Membership {
        negated,
        item: Box::new(item),
        list: Box::new(list),
    }
}

fn parse_operand(tokens: &[Token], pos: usize) -> Result<(Expr, usize), ParseError> {
    match tokens.get(pos) {
        None => Err(ParseError::UnexpectedEnd),
        Some(Token::Number(n)) => Ok((Expr::Literal(Value::Num(*n)), pos + 1)),
        Some(Token::Minus) => match tokens.get(pos + 1) {
            Some(Token::Number(n)) => Ok((Expr::Literal(Value::Num(-n)), pos + 2)),
            _ => Err(ParseError::Expected("number after `-`")),
        },
        Some(Token::Str(s)) => Ok((Expr::Literal(Value::Str(s.clone())), pos + 1)),
        Some(Token::Ident(name)) => Ok((Expr::Field(name.clone()), pos + 1)),
        Some(Token::LBracket) => parse_list(tokens, pos + 1),
        Some(Token::LParen) => {
            let (inner, next) = parse_or(tokens, pos + 1)?;
            if tokens.get(next) != Some(&Token::RParen) {
                return Err(ParseError::Expected(")"));
            }
            Ok((inner, next + 1))
        }
        Some(_) => Err(ParseError::UnexpectedToken(pos)),
    }
}

/// List literals hold literal elements only: numbers and strings.
fn parse_list(tokens: &[Token], mut pos: usize) -> Result<(Expr, usize), ParseError> {
    let mut items = Vec::new();

    if tokens.get(pos) == Some(&Token::RBracket) {
        return Ok((Expr::Literal(Value::List(items)), pos + 1));
    }

    loop {
        let value = match tokens.get(pos) {
            Some(Token::Number(n)) => {
                pos += 1;
                Value::Num(*n)
            }
            Some(Token::Minus) => match tokens.get(pos + 1) {
                Some(Token::Number(n)) => {
                    pos += 2;
                    Value::Num(-n)
                }
                _ => return Err(ParseError::Expected("number after `-`")),
            },
            Some(Token::Str(s)) => {
                pos += 1;
                Value::Str(s.clone())
            }
            Some(_) => return Err(ParseError::UnexpectedToken(pos)),
            None => return Err(ParseError::UnexpectedEnd),
        };
        items.push(value);

        match tokens.get(pos) {
            Some(Token::Comma) => pos += 1,
            Some(Token::RBracket) => return Ok((Expr::Literal(Value::List(items)), pos + 1)),
            Some(_) => return Err(ParseError::UnexpectedToken(pos)),
            None => return Err(ParseError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Box<Expr> {
        Box::new(Expr::Field(name.to_string()))
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Num(n)))
    }

    #[test]
    fn parses_simple_comparison() {
        let expr = parse("transactionAmount > 1000").unwrap();
        assert_eq!(
            expr,
            Expr::Compare {
                op: CmpOp::Gt,
                left: field("transactionAmount"),
                right: num(1000.0),
            }
        );
    }

    #[test]
    fn parses_membership() {
        let expr = parse("state in ['NY', 'CA']").unwrap();
        assert_eq!(
            expr,
            Expr::Membership {
                negated: false,
                item: field("state"),
                list: Box::new(Expr::Literal(Value::List(vec![
                    Value::Str("NY".to_string()),
                    Value::Str("CA".to_string()),
                ]))),
            }
        );
    }

    #[test]
    fn parses_negated_membership() {
        let expr = parse("state not in ['NY']").unwrap();
        assert!(matches!(expr, Expr::Membership { negated: true, .. }));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("a == 1 or b == 2 and c == 3").unwrap();
        match expr {
            Expr::Or(_, right) => assert!(matches!(*right, Expr::And(_, _))),
            other => panic!("expected Or at the root, got {other:?}"),
        }
    }

    #[test]
    fn not_negates_a_whole_comparison() {
        let expr = parse("not transactionAmount > 100").unwrap();
        match expr {
            Expr::Not(inner) => assert!(matches!(*inner, Expr::Compare { .. })),
            other => panic!("expected Not at the root, got {other:?}"),
        }
    }

    #[test]
    fn parentheses_group() {
        let expr = parse("(a == 1 or b == 2) and c == 3").unwrap();
        match expr {
            Expr::And(left, _) => assert!(matches!(*left, Expr::Or(_, _))),
            other => panic!("expected And at the root, got {other:?}"),
        }
    }

    #[test]
    fn negative_numbers_parse_in_comparisons_and_lists() {
        assert!(parse("transactionAmount < -100").is_ok());
        assert!(parse("transactionAmount in [-1, -2.5, 3]").is_ok());
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(parse("").is_err());
        assert!(parse("amount >").is_err());
        assert!(parse("amount > 100 extra").is_err());
        assert!(parse("(amount > 100").is_err());
        assert!(parse("state in ['NY'").is_err());
        assert!(parse("state in [x]").is_err());
        assert!(parse("and and").is_err());
    }

    #[test]
    fn no_function_calls_or_attribute_access() {
        assert!(parse("len(name) > 3").is_err());
        assert!(parse("record.name == 'X'").is_err());
    }
}
