//! Builder error types

use plscope_parser::SyntaxError;
use thiserror::Error;

/// Fatal build failures. Recoverable mismatches go to the diagnostic sink instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    #[error("{line}:{column} internal error: {message}")]
    Internal {
        line: usize,
        column: usize,
        message: String,
    },
}

impl BuildError {
    /// Line of the offending input
    pub fn line(&self) -> usize {
        match self {
            BuildError::Syntax(err) => err.line,
            BuildError::Internal { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            BuildError::Syntax(err) => err.column,
            BuildError::Internal { column, .. } => *column,
        }
    }
}
