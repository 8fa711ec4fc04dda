//! Runtime error types

use thiserror::Error;

/// Errors that abort an interpretation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("assignment to undeclared variable: {name}")]
    UndeclaredAssignmentTarget { name: String },

    #[error("scope distance {distance} exceeds chain depth {depth}")]
    ScopeDepthExceeded { distance: usize, depth: usize },

    #[error("procedure not found: {name}")]
    ProcedureNotFound { name: String },

    #[error("{name} expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("{procedure} has no parameter named {name}")]
    UnknownParameter { procedure: String, name: String },

    #[error("not callable: {name}")]
    NotCallable { name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("unhandled exception {name} raised at line {line}")]
    UnhandledException { name: String, line: usize },

    #[error("call depth limit of {depth} exceeded")]
    CallDepthExceeded { depth: usize },

    #[error("interpretation cancelled")]
    Cancelled,

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl RuntimeError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::UndefinedVariable { .. } => "E-RT-001",
            RuntimeError::UndeclaredAssignmentTarget { .. } => "E-RT-002",
            RuntimeError::ScopeDepthExceeded { .. } => "E-RT-003",
            RuntimeError::ProcedureNotFound { .. } => "E-RT-004",
            RuntimeError::ArityMismatch { .. } => "E-RT-005",
            RuntimeError::UnknownParameter { .. } => "E-RT-006",
            RuntimeError::NotCallable { .. } => "E-RT-007",
            RuntimeError::TypeMismatch { .. } => "E-RT-008",
            RuntimeError::DivisionByZero => "E-RT-009",
            RuntimeError::UnhandledException { .. } => "E-RT-010",
            RuntimeError::CallDepthExceeded { .. } => "E-RT-011",
            RuntimeError::Cancelled => "E-RT-012",
            RuntimeError::Unsupported(_) => "E-RT-999",
        }
    }

    /// Name under which exception handlers see this error.
    ///
    /// `None` for errors no handler may catch.
    pub fn exception_name(&self) -> Option<String> {
        match self {
            RuntimeError::UnhandledException { name, .. } => Some(name.clone()),
            RuntimeError::DivisionByZero => Some("ZERO_DIVIDE".to_string()),
            RuntimeError::TypeMismatch { .. } => Some("VALUE_ERROR".to_string()),
            _ => None,
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
