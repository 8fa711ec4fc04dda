//! Expression AST nodes

use serde::{Deserialize, Serialize};
use crate::{Position, Span, Statement};

/// An expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
    pub position: Position,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span, position: Position) -> Self {
        Self { kind, span, position }
    }

    /// Placeholder used when a sub-tree could not be built
    pub fn missing(span: Span, position: Position) -> Self {
        Self::new(ExpressionKind::Missing, span, position)
    }

    pub fn name(name: impl Into<String>, span: Span, position: Position) -> Self {
        Self::new(ExpressionKind::Name(name.into()), span, position)
    }

    /// Dotted text of a name or dot chain: `a.b.c`
    pub fn qualified_name(&self) -> Option<String> {
        match &self.kind {
            ExpressionKind::Name(name) => Some(name.clone()),
            ExpressionKind::Dot { name, parent } => {
                parent.qualified_name().map(|base| format!("{base}.{name}"))
            }
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.kind, ExpressionKind::Missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionKind {
    /// Numeric literal, kept verbatim: `42`, `3.14`
    Number(String),

    /// String literal with quotes removed: `'abc'`
    String(String),

    /// `TRUE` / `FALSE`
    Boolean(bool),

    /// `NULL`
    Null,

    /// Simple name: `v_total`
    Name(String),

    /// Qualified reference: `pkg.proc`; the leftmost segment is the innermost parent
    Dot {
        name: String,
        parent: Box<Expression>,
    },

    /// Arithmetic, concatenation and logical connectives: `a + b`, `a || b`, `a AND b`.
    /// Also `=` inside an UPDATE SET item.
    Binary {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Comparison: `a = b`, `a <> b`, `a <= b`
    Relational {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Postfix test: `x IS NULL`, `x IS NOT NULL`
    UnaryLogical {
        operator: String,
        operand: Box<Expression>,
    },

    /// `NOT x`
    Not(Box<Expression>),

    /// Sign: `-x`, `+x`
    Sign {
        operator: String,
        operand: Box<Expression>,
    },

    /// Membership: `x [NOT] IN (a, b)` or `x IN (SELECT ...)`
    In {
        negated: bool,
        operand: Box<Expression>,
        elements: Vec<Expression>,
    },

    /// Range: `x [NOT] BETWEEN low AND high`
    Between {
        negated: bool,
        operand: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },

    /// Pattern: `x [NOT] LIKE 'a%' [ESCAPE '\']`
    Like {
        negated: bool,
        operand: Box<Expression>,
        pattern: Box<Expression>,
        escape: Option<Box<Expression>>,
    },

    /// Builtin function with a canonical upper-case name: `NVL(a, 0)`
    FunctionCall {
        name: String,
        arguments: Vec<Expression>,
    },

    /// Any other call, keyed by its qualified callee: `pkg.fn(1)`
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// `EXISTS (SELECT ...)`
    Exists(Box<Statement>),

    /// `cur%FOUND`, `SQL%ROWCOUNT`
    CursorAttribute {
        cursor: Box<Expression>,
        attribute: CursorAttributeKind,
    },

    /// `expr [AS] alias` in select lists and table references
    Alias {
        expression: Box<Expression>,
        alias: String,
    },

    /// Oracle outer join marker: `t.col(+)`
    OuterJoin(Box<Expression>),

    /// A statement used as an expression: sub-queries and CASE expressions
    Statement(Box<Statement>),

    /// Parenthesised list: `(a, b)`
    List(Vec<Expression>),

    /// Placeholder for a sub-expression that failed to build
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorAttributeKind {
    Found,
    NotFound,
    RowCount,
    IsOpen,
}

impl CursorAttributeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "FOUND" => Some(Self::Found),
            "NOTFOUND" => Some(Self::NotFound),
            "ROWCOUNT" => Some(Self::RowCount),
            "ISOPEN" => Some(Self::IsOpen),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "%FOUND",
            Self::NotFound => "%NOTFOUND",
            Self::RowCount => "%ROWCOUNT",
            Self::IsOpen => "%ISOPEN",
        }
    }
}

/// Functions the builder rewrites into [`ExpressionKind::FunctionCall`]
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "TO_NUMBER",
    "TO_CHAR",
    "TO_DATE",
    "SUBSTR",
    "NVL",
    "DECODE",
    "ROUND",
    "SUM",
    "MAX",
];

pub fn is_builtin_function(name: &str) -> bool {
    BUILTIN_FUNCTIONS
        .iter()
        .any(|builtin| builtin.eq_ignore_ascii_case(name))
}
