//! Rule registry and tree walking

use std::collections::HashMap;

use plscope_ast::visit::{self, Visitor};
use plscope_ast::{
    Declaration, Diagnostic, DiagnosticSink, Expression, NodeRef, NodeTag, Script, Statement,
};
use tracing::debug;

use crate::{builtin_rules, Rule};

/// Rules keyed by the node variant they target.
///
/// Each validator owns its registry; registering on one instance never
/// affects another.
#[derive(Debug)]
pub struct Validator {
    rules: HashMap<NodeTag, Vec<Rule>>,
}

impl Validator {
    /// A validator with the built-in rule set
    pub fn new() -> Self {
        let mut validator = Self::empty();
        for rule in builtin_rules() {
            validator.register(rule);
        }
        validator
    }

    /// A validator with no rules
    pub fn empty() -> Self {
        Self { rules: HashMap::new() }
    }

    /// Add a rule. Rules for the same variant run in registration order.
    pub fn register(&mut self, rule: Rule) {
        debug!(rule = rule.name(), target = %rule.target(), "rule registered");
        self.rules.entry(rule.target()).or_default().push(rule);
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn rules_for(&self, tag: NodeTag) -> &[Rule] {
        self.rules.get(&tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Apply the rules targeting this node's variant, appending violations to `sink`
    pub fn validate(&self, node: NodeRef<'_>, sink: &mut dyn DiagnosticSink) {
        for rule in self.rules_for(node.tag()) {
            if let Some(diagnostic) = rule.check(node) {
                debug!(
                    rule = rule.name(),
                    line = diagnostic.line,
                    message = %diagnostic.message,
                    "rule violated"
                );
                sink.report(diagnostic);
            }
        }
    }

    /// Validate every node of a script. An empty result means a clean script.
    pub fn validate_script(&self, script: &Script) -> Vec<Diagnostic> {
        let mut walker = Walker {
            validator: self,
            diagnostics: Vec::new(),
        };
        walker.visit_script(script);
        walker.diagnostics
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

struct Walker<'v> {
    validator: &'v Validator,
    diagnostics: Vec<Diagnostic>,
}

impl<'ast> Visitor<'ast> for Walker<'_> {
    fn visit_script(&mut self, script: &'ast Script) {
        self.validator.validate(NodeRef::Script(script), &mut self.diagnostics);
        visit::walk_script(self, script);
    }

    fn visit_statement(&mut self, stmt: &'ast Statement) {
        self.validator.validate(NodeRef::Statement(stmt), &mut self.diagnostics);
        visit::walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        self.validator.validate(NodeRef::Expression(expr), &mut self.diagnostics);
        visit::walk_expression(self, expr);
    }

    fn visit_declaration(&mut self, decl: &'ast Declaration) {
        self.validator.validate(NodeRef::Declaration(decl), &mut self.diagnostics);
        visit::walk_declaration(self, decl);
    }
}
