//! Validation rules and the built-in rule set

use std::fmt;

use plscope_ast::{Diagnostic, ExpressionKind, NodeRef, NodeTag, StatementKind};

pub const NEST_TABLE_MESSAGE: &str = "unsupported: nest table type declaration";
pub const UPDATE_MULTI_SET_MESSAGE: &str = "unsupported: update set multiple columns with select";

type Check = Box<dyn Fn(NodeRef<'_>) -> Option<Diagnostic> + Send + Sync>;

/// A check bound to one node variant
pub struct Rule {
    name: String,
    target: NodeTag,
    message: String,
    check: Check,
}

impl Rule {
    /// A rule with a custom check producing its own diagnostic
    pub fn new(
        name: impl Into<String>,
        target: NodeTag,
        message: impl Into<String>,
        check: impl Fn(NodeRef<'_>) -> Option<Diagnostic> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            message: message.into(),
            check: Box::new(check),
        }
    }

    /// A rule reporting `message` at the node whenever `predicate` holds
    pub fn when(
        name: impl Into<String>,
        target: NodeTag,
        message: impl Into<String>,
        predicate: impl Fn(NodeRef<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        let message = message.into();
        let reported = message.clone();
        Self::new(name, target, message, move |node| {
            predicate(node).then(|| Diagnostic::at(&node, reported.clone()))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> NodeTag {
        self.target
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Run the check; nodes of another variant never match
    pub fn check(&self, node: NodeRef<'_>) -> Option<Diagnostic> {
        if node.tag() != self.target {
            return None;
        }
        (self.check)(node)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::when(
            "nest-table-type-declaration",
            NodeTag::NestTableTypeDeclaration,
            NEST_TABLE_MESSAGE,
            |_| true,
        ),
        Rule::when(
            "create-nest-table",
            NodeTag::CreateNestTableStatement,
            NEST_TABLE_MESSAGE,
            |_| true,
        ),
        Rule::when(
            "update-set-multiple-columns-with-select",
            NodeTag::UpdateStatement,
            UPDATE_MULTI_SET_MESSAGE,
            sets_columns_from_subquery,
        ),
    ]
}

/// `UPDATE t SET (a, b) = (SELECT ...)`, judged by the first SET item
fn sets_columns_from_subquery(node: NodeRef<'_>) -> bool {
    let Some(StatementKind::Update(update)) = node.as_statement().map(|stmt| &stmt.kind) else {
        return false;
    };
    let Some(first) = update.set.first() else {
        return false;
    };
    let ExpressionKind::Binary { operator, left, right } = &first.kind else {
        return false;
    };

    let is_subquery = match &right.kind {
        ExpressionKind::Statement(stmt) => matches!(stmt.kind, StatementKind::Select(_)),
        _ => false,
    };
    operator == "=" && matches!(left.kind, ExpressionKind::List(_)) && is_subquery
}

#[cfg(test)]
mod tests {
    use super::*;
    use plscope_ast::{Expression, Position, Span, Statement, UpdateStatement};

    fn at(line: usize) -> (Span, Position) {
        (Span::new(0, 1), Position::new(line, 0))
    }

    fn expr(kind: ExpressionKind) -> Expression {
        let (span, position) = at(1);
        Expression::new(kind, span, position)
    }

    fn update(set: Vec<Expression>) -> Statement {
        let (span, position) = at(3);
        Statement::new(
            StatementKind::Update(UpdateStatement {
                table: expr(ExpressionKind::Name("t".into())),
                set,
                where_clause: None,
            }),
            span,
            position,
        )
    }

    fn assign(left: ExpressionKind, right: ExpressionKind) -> Expression {
        expr(ExpressionKind::Binary {
            operator: "=".into(),
            left: Box::new(expr(left)),
            right: Box::new(expr(right)),
        })
    }

    fn rule_for(tag: NodeTag) -> Rule {
        builtin_rules()
            .into_iter()
            .find(|rule| rule.target() == tag)
            .expect("built-in rule")
    }

    #[test]
    fn test_update_rule_needs_list_and_subquery() {
        let rule = rule_for(NodeTag::UpdateStatement);
        let select = update(vec![]);
        let subquery = ExpressionKind::Statement(Box::new(Statement::new(
            StatementKind::Select(plscope_ast::SelectStatement {
                distinct: false,
                columns: vec![],
                bulk_collect: false,
                into: vec![],
                from: vec![],
                where_clause: None,
                group_by: vec![],
                having: None,
                order_by: vec![],
            }),
            select.span,
            select.position,
        )));
        let columns = ExpressionKind::List(vec![
            expr(ExpressionKind::Name("a".into())),
            expr(ExpressionKind::Name("b".into())),
        ]);

        let matching = update(vec![assign(columns.clone(), subquery.clone())]);
        let diagnostic = rule.check(NodeRef::Statement(&matching)).expect("should match");
        assert_eq!(diagnostic.line, 3);
        assert_eq!(diagnostic.message, UPDATE_MULTI_SET_MESSAGE);

        let single = update(vec![assign(
            ExpressionKind::Name("a".into()),
            ExpressionKind::Number("1".into()),
        )]);
        assert!(rule.check(NodeRef::Statement(&single)).is_none());

        let list_of_values = update(vec![assign(columns, ExpressionKind::List(vec![]))]);
        assert!(rule.check(NodeRef::Statement(&list_of_values)).is_none());

        // Only the first SET item is considered
        let second = update(vec![
            assign(ExpressionKind::Name("c".into()), ExpressionKind::Number("1".into())),
            assign(ExpressionKind::List(vec![]), subquery),
        ]);
        assert!(rule.check(NodeRef::Statement(&second)).is_none());

        assert!(rule.check(NodeRef::Statement(&update(vec![]))).is_none());
    }

    #[test]
    fn test_rule_ignores_other_variants() {
        let rule = rule_for(NodeTag::CreateNestTableStatement);
        let stmt = update(vec![]);
        assert!(rule.check(NodeRef::Statement(&stmt)).is_none());
    }
}
