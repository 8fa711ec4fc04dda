//! Non-fatal diagnostics shared by the builder and the validator

use serde::{Deserialize, Serialize};
use crate::{Position, Positioned, Span};

/// A located message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(position: Position, span: Span, message: impl Into<String>) -> Self {
        Self {
            line: position.line,
            column: position.column,
            span,
            message: message.into(),
        }
    }

    /// Diagnostic located at a node
    pub fn at(node: &impl Positioned, message: impl Into<String>) -> Self {
        Self::new(node.position(), node.span(), message)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} {}", self.line, self.column, self.message)
    }
}

/// Collector of non-fatal diagnostics, passed explicitly into each build/validate call
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreDiagnostics;

impl DiagnosticSink for IgnoreDiagnostics {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
