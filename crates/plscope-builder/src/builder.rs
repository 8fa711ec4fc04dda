//! Builder state and helpers shared by the per-family builders

use plscope_ast::{Diagnostic, DiagnosticSink, Script};
use plscope_lexer::identifier_text;
use plscope_parser::{SyntaxKind, SyntaxNode, SyntaxToken};
use tracing::debug;

use crate::BuildError;

pub(crate) type BResult<T> = Result<T, BuildError>;

/// Folds a parse tree into the AST, reporting recoverable problems to a sink
pub struct Builder<'s> {
    sink: &'s mut dyn DiagnosticSink,
    reported: usize,
}

impl<'s> Builder<'s> {
    pub fn new(sink: &'s mut dyn DiagnosticSink) -> Self {
        Self { sink, reported: 0 }
    }

    /// Number of diagnostics reported so far
    pub fn reported(&self) -> usize {
        self.reported
    }

    pub fn build_script(&mut self, root: &SyntaxNode) -> BResult<Script> {
        if root.kind != SyntaxKind::Script {
            return Err(internal(root, format!("expected Script root, found {:?}", root.kind)));
        }

        let mut statements = Vec::new();
        for unit in root.nodes() {
            debug!(kind = ?unit.kind, line = unit.position.line, "building unit");
            statements.push(self.build_unit(unit)?);
        }

        Ok(Script {
            statements,
            span: root.span,
            position: root.position,
        })
    }

    pub(crate) fn report(&mut self, node: &SyntaxNode, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(node.position, node.span, message);
        debug!(
            line = diagnostic.line,
            column = diagnostic.column,
            message = %diagnostic.message,
            "recoverable build diagnostic"
        );
        self.reported += 1;
        self.sink.report(diagnostic);
    }
}

/// A parse tree shape the front end guarantees but did not deliver
pub(crate) fn internal(node: &SyntaxNode, message: impl Into<String>) -> BuildError {
    BuildError::Internal {
        line: node.position.line,
        column: node.position.column,
        message: message.into(),
    }
}

pub(crate) fn required(node: &SyntaxNode, kind: SyntaxKind) -> BResult<&SyntaxNode> {
    node.child(kind)
        .ok_or_else(|| internal(node, format!("{:?} without {:?}", node.kind, kind)))
}

pub(crate) fn first_child(node: &SyntaxNode) -> BResult<&SyntaxNode> {
    node.first_node()
        .ok_or_else(|| internal(node, format!("empty {:?}", node.kind)))
}

/// Identifier as written, without quotes
pub(crate) fn name_of(token: &SyntaxToken) -> String {
    identifier_text(&token.text).to_string()
}

/// The first word of a node, skipping the given leading keywords
pub(crate) fn leading_name(node: &SyntaxNode, skip: &[&str]) -> BResult<String> {
    node.words()
        .find(|token| !skip.iter().any(|kw| token.is_keyword(kw)))
        .map(name_of)
        .ok_or_else(|| internal(node, format!("{:?} without a name", node.kind)))
}
