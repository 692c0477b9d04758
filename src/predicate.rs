//! Single-comparison WHERE clause parsing and evaluation.
//!
//! The engine supports exactly one `column OP value` comparison per clause;
//! boolean connectives and nested expressions are out of scope.

use std::cmp::Ordering;

use regex::Regex;

use crate::error::DbError;
use crate::parser::strip_quotes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Like,
    Ge,
    Le,
    Ne,
    Gt,
    Lt,
    Eq,
}

/// A parsed `column OP value` comparison. The value keeps its original
/// casing; only surrounding quotes are stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: CmpOp,
    pub value: String,
}

/// Detects the operator by scanning the clause text, first match wins:
/// `LIKE`, `>=`, `<=`, `!=`, `<>`, `>`, `<`, `=`. The clause is split once
/// at the match.
pub fn parse(clause: &str) -> Result<Condition, DbError> {
    if let Some(pos) = clause.to_ascii_uppercase().find(" LIKE ") {
        return build(clause, pos, " LIKE ".len(), CmpOp::Like);
    }
    const SYMBOLS: [(&str, CmpOp); 7] = [
        (">=", CmpOp::Ge),
        ("<=", CmpOp::Le),
        ("!=", CmpOp::Ne),
        ("<>", CmpOp::Ne),
        (">", CmpOp::Gt),
        ("<", CmpOp::Lt),
        ("=", CmpOp::Eq),
    ];
    for (symbol, op) in SYMBOLS {
        if let Some(pos) = clause.find(symbol) {
            return build(clause, pos, symbol.len(), op);
        }
    }
    Err(DbError::UnsupportedOperator(clause.to_string()))
}

fn build(clause: &str, pos: usize, op_len: usize, op: CmpOp) -> Result<Condition, DbError> {
    let column = clause[..pos].trim();
    let (value, _) = strip_quotes(clause[pos + op_len..].trim());
    if column.is_empty() {
        return Err(DbError::UnsupportedOperator(clause.to_string()));
    }
    Ok(Condition {
        column: column.to_string(),
        op,
        value,
    })
}

impl Condition {
    /// Applies the comparison to one rendered row value.
    pub fn matches(&self, row_text: &str) -> bool {
        match self.op {
            CmpOp::Like => like_matches(&self.value, row_text),
            op => compare(row_text, &self.value, op),
        }
    }
}

/// Numeric comparison when both sides parse as floats, lexicographic
/// otherwise.
fn compare(lhs: &str, rhs: &str, op: CmpOp) -> bool {
    let ord = match (lhs.parse::<f64>(), rhs.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => lhs.cmp(rhs),
    };
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Ge => ord != Ordering::Less,
        CmpOp::Le => ord != Ordering::Greater,
        CmpOp::Like => false,
    }
}

/// SQL LIKE as a case-insensitive anchored match: `%` is any sequence,
/// `_` any single character, everything else literal.
fn like_matches(pattern: &str, value: &str) -> bool {
    let mut translated = String::with_capacity(pattern.len() * 2);
    for ch in pattern.chars() {
        match ch {
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            other => translated.push_str(&regex::escape(&other.to_string())),
        }
    }
    let anchored = format!("(?i)^{translated}$");
    Regex::new(&anchored).ok().is_some_and(|re| re.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_priority() {
        assert_eq!(parse("age >= 18").unwrap().op, CmpOp::Ge);
        assert_eq!(parse("age <= 18").unwrap().op, CmpOp::Le);
        assert_eq!(parse("age != 18").unwrap().op, CmpOp::Ne);
        assert_eq!(parse("age <> 18").unwrap().op, CmpOp::Ne);
        assert_eq!(parse("age > 18").unwrap().op, CmpOp::Gt);
        assert_eq!(parse("age < 18").unwrap().op, CmpOp::Lt);
        assert_eq!(parse("age = 18").unwrap().op, CmpOp::Eq);
        assert_eq!(parse("name LIKE 'A%'").unwrap().op, CmpOp::Like);
        assert_eq!(parse("name like 'A%'").unwrap().op, CmpOp::Like);
    }

    #[test]
    fn test_value_keeps_case_and_loses_quotes() {
        let cond = parse("name = 'Alice'").unwrap();
        assert_eq!(cond.column, "name");
        assert_eq!(cond.value, "Alice");
        let cond = parse("name = \"McQueen\"").unwrap();
        assert_eq!(cond.value, "McQueen");
    }

    #[test]
    fn test_unsupported_operator() {
        assert_eq!(
            parse("id IN (1, 2)").unwrap_err(),
            DbError::UnsupportedOperator("id IN (1, 2)".into())
        );
    }

    #[test]
    fn test_numeric_comparison() {
        let cond = parse("price > 100").unwrap();
        assert!(cond.matches("150"));
        assert!(cond.matches("100.5"));
        assert!(!cond.matches("99.9"));
        // "9" < "100" numerically even though "9" > "100" as a string.
        assert!(!parse("price < 100").unwrap().matches("150"));
        assert!(parse("price < 100").unwrap().matches("9"));
    }

    #[test]
    fn test_lexicographic_fallback() {
        let cond = parse("name > 'b'").unwrap();
        assert!(cond.matches("c"));
        assert!(!cond.matches("a"));
    }

    #[test]
    fn test_equality_is_case_sensitive() {
        let cond = parse("name = 'Alice'").unwrap();
        assert!(cond.matches("Alice"));
        assert!(!cond.matches("alice"));
    }

    #[test]
    fn test_null_renders_empty_and_never_equals() {
        let eq = parse("email = 'a@b.com'").unwrap();
        assert!(!eq.matches(""));
        let ne = parse("email != 'a@b.com'").unwrap();
        assert!(ne.matches(""));
    }

    #[test]
    fn test_like_wildcards() {
        let cond = parse("name LIKE 'A%'").unwrap();
        assert!(cond.matches("Alice"));
        assert!(cond.matches("alice")); // case-insensitive
        assert!(!cond.matches("Bob"));

        let cond = parse("code LIKE 'a_c'").unwrap();
        assert!(cond.matches("abc"));
        assert!(!cond.matches("abbc"));

        // Regex metacharacters in the pattern are literal.
        let cond = parse("note LIKE 'a.c'").unwrap();
        assert!(cond.matches("a.c"));
        assert!(!cond.matches("abc"));
    }
}
