//! Parser error types

use plscope_ast::{Position, Span};
use thiserror::Error;

/// The first syntax error in the input; parsing stops there
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column} {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub span: Span,
    pub message: String,
}

impl SyntaxError {
    pub fn new(position: Position, span: Span, message: impl Into<String>) -> Self {
        Self {
            line: position.line,
            column: position.column,
            span,
            message: message.into(),
        }
    }

    pub fn unexpected(expected: &str, found: &str, position: Position, span: Span) -> Self {
        Self::new(
            position,
            span,
            format!("mismatched input {found}, expecting {expected}"),
        )
    }
}
