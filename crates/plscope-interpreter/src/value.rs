//! Runtime values
//!
//! Comparisons and logic are three-valued: any operation touching `NULL`
//! yields `NULL` (`None`) unless stated otherwise.

use std::cmp::Ordering;
use std::fmt;

use crate::RuntimeError;

/// Index of a callable in the program registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallableId(pub(crate) usize);

/// Index of a package in the program registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(pub(crate) usize);

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    String(String),
    Boolean(bool),
    Procedure(CallableId),
    Package(PackageId),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Only `TRUE` is true; `NULL` counts as false in conditions
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Number(_) => "NUMBER",
            Value::String(_) => "VARCHAR2",
            Value::Boolean(_) => "BOOLEAN",
            Value::Procedure(_) => "PROCEDURE",
            Value::Package(_) => "PACKAGE",
        }
    }

    pub fn as_bool(&self) -> Result<Option<bool>, RuntimeError> {
        match self {
            Value::Null => Ok(None),
            Value::Boolean(b) => Ok(Some(*b)),
            other => Err(RuntimeError::mismatch("BOOLEAN", other.type_name())),
        }
    }

    /// Numeric view; strings holding a number convert implicitly
    pub fn to_number(&self) -> Result<Option<f64>, RuntimeError> {
        match self {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(Some(*n)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| RuntimeError::mismatch("NUMBER", format!("'{s}'"))),
            other => Err(RuntimeError::mismatch("NUMBER", other.type_name())),
        }
    }

    /// Textual form used by `||` and `TO_CHAR`
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn compare(&self, other: &Value) -> Result<Option<Ordering>, RuntimeError> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => Ok(None),
            (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Some(a.cmp(b))),
            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                let (a, b) = (self.to_number()?, other.to_number()?);
                Ok(a.zip(b).and_then(|(a, b)| a.partial_cmp(&b)))
            }
            (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
            (a, b) => Err(RuntimeError::mismatch(a.type_name(), b.type_name())),
        }
    }

    /// Equality for `CASE` selectors and `IN`; `NULL` never matches
    pub fn sql_eq(&self, other: &Value) -> Result<Option<bool>, RuntimeError> {
        Ok(self.compare(other)?.map(|ordering| ordering == Ordering::Equal))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::Boolean(true) => write!(f, "TRUE"),
            Value::Boolean(false) => write!(f, "FALSE"),
            Value::Procedure(id) => write!(f, "<procedure {id}>"),
            Value::Package(id) => write!(f, "<package {id}>"),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Option<bool>> for Value {
    fn from(b: Option<bool>) -> Self {
        b.map_or(Value::Null, Value::Boolean)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

pub(crate) fn and(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

pub(crate) fn or(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

/// `+ - * / MOD` over numbers
pub(crate) fn arithmetic(operator: &str, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let (Some(a), Some(b)) = (left.to_number()?, right.to_number()?) else {
        return Ok(Value::Null);
    };
    let result = match operator {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" if b == 0.0 => return Err(RuntimeError::DivisionByZero),
        "/" => a / b,
        "MOD" if b == 0.0 => a,
        "MOD" => a % b,
        other => return Err(RuntimeError::Unsupported(format!("operator {other}"))),
    };
    Ok(Value::Number(result))
}

/// `||`: NULL behaves as the empty string unless both sides are NULL
pub(crate) fn concat(left: &Value, right: &Value) -> Value {
    match (left.to_text(), right.to_text()) {
        (None, None) => Value::Null,
        (a, b) => Value::String(a.unwrap_or_default() + &b.unwrap_or_default()),
    }
}

/// SQL `LIKE`: `%` matches any run, `_` one character
pub(crate) fn like(text: &str, pattern: &str, escape: Option<char>) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern = compile_pattern(pattern, escape);
    matches_from(&text, &pattern)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PatternItem {
    Literal(char),
    One,
    Any,
}

fn compile_pattern(pattern: &str, escape: Option<char>) -> Vec<PatternItem> {
    let mut items = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let item = match c {
            c if Some(c) == escape => PatternItem::Literal(chars.next().unwrap_or(c)),
            '%' => PatternItem::Any,
            '_' => PatternItem::One,
            c => PatternItem::Literal(c),
        };
        items.push(item);
    }
    items
}

/// Greedy scan that backtracks only to the most recent `%`, so each
/// character of `text` is revisited at most once per `%`
fn matches_from(text: &[char], pattern: &[PatternItem]) -> bool {
    let (mut t, mut p) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some(PatternItem::Any) => {
                p += 1;
                resume = Some((p, t));
            }
            Some(PatternItem::One) => {
                t += 1;
                p += 1;
            }
            Some(PatternItem::Literal(c)) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match resume {
                Some((after_any, start)) => {
                    p = after_any;
                    t = start + 1;
                    resume = Some((after_any, t));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|item| *item == PatternItem::Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_integers_without_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
    }

    #[test]
    fn test_null_propagates() {
        assert_eq!(arithmetic("+", &Value::Null, &Value::from(1i64)).unwrap(), Value::Null);
        assert_eq!(Value::Null.compare(&Value::from(1i64)).unwrap(), None);
        assert_eq!(concat(&Value::Null, &Value::from("a")), Value::from("a"));
        assert_eq!(concat(&Value::Null, &Value::Null), Value::Null);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(arithmetic("*", &Value::from(6i64), &Value::from(7i64)).unwrap(), Value::Number(42.0));
        assert_eq!(arithmetic("MOD", &Value::from(7i64), &Value::from(3i64)).unwrap(), Value::Number(1.0));
        assert_eq!(arithmetic("MOD", &Value::from(7i64), &Value::from(0i64)).unwrap(), Value::Number(7.0));
        assert_eq!(
            arithmetic("/", &Value::from(1i64), &Value::from(0i64)),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(arithmetic("+", &Value::from("2"), &Value::from(1i64)).unwrap(), Value::Number(3.0));
        assert!(matches!(
            arithmetic("+", &Value::from("x"), &Value::from(1i64)),
            Err(RuntimeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_three_valued_logic() {
        assert_eq!(and(Some(false), None), Some(false));
        assert_eq!(and(Some(true), None), None);
        assert_eq!(or(Some(true), None), Some(true));
        assert_eq!(or(Some(false), None), None);
    }

    #[test]
    fn test_compare_mixed_types() {
        assert_eq!(Value::from("10").compare(&Value::from(9i64)).unwrap(), Some(Ordering::Greater));
        assert!(Value::from(true).compare(&Value::from(1i64)).is_err());
    }

    #[test]
    fn test_like_patterns() {
        assert!(like("hello", "h%o", None));
        assert!(like("hello", "h_llo", None));
        assert!(!like("hello", "h_lo", None));
        assert!(like("", "%", None));
        assert!(like("a_b", "a\\_b", Some('\\')));
        assert!(!like("axb", "a\\_b", Some('\\')));
        assert!(like("50%", "50\\%", Some('\\')));
        assert!(like("abcabd", "%ab_", None));
        assert!(like("mississippi", "m%iss%pi", None));
        assert!(!like("mississippi", "m%iss%pix", None));
        assert!(like("abc", "abc%%", None));
        assert!(!like("ab", "abc", None));
    }

    #[test]
    fn test_like_many_wildcards_finishes_quickly() {
        let text = "a".repeat(40);
        let started = std::time::Instant::now();
        assert!(!like(&text, "%a%a%a%a%a%a%a%a%a%b", None));
        assert!(like(&text, "%a%a%a%a%a%a%a%a%a%a", None));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }
}
