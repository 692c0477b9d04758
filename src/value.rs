use std::fmt;

use crate::ast::Literal;

/// A single scalar stored in a row.
///
/// The engine is loosely typed: declared column types are kept for display
/// only, and every stored value is a number, a piece of text, or NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An empty or missing value.
    Null,
    /// A 64-bit floating-point number. Integer literals are stored as the
    /// equivalent float and rendered without a fractional part.
    Number(f64),
    /// A UTF-8 string value.
    Text(String),
}

impl Value {
    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Coerces a parsed literal into a stored value.
    ///
    /// Quoted literals are always text. An unquoted token becomes NULL when
    /// it spells the NULL keyword, a number when it parses as one, and text
    /// otherwise.
    pub fn from_literal(lit: &Literal) -> Self {
        if lit.quoted {
            return Self::Text(lit.text.clone());
        }
        if lit.text.eq_ignore_ascii_case("null") {
            return Self::Null;
        }
        match lit.text.parse::<f64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(lit.text.clone()),
        }
    }

    /// Canonical key used for index buckets and equality checks.
    ///
    /// `None` for NULL: a null value never participates in an index and
    /// never satisfies an equality constraint scan.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Text form used by WHERE comparisons. NULL compares as the empty
    /// string, so it never equals a non-empty literal while `!=` matches it.
    pub fn cmp_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{n:.0}")
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}
