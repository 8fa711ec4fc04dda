//! plscope Builder - Parse tree to AST
//!
//! Folds the front end's concrete parse tree into the typed AST:
//! - Expression levels with a single child collapse into that child
//! - Dotted names fold left to right into nested `Dot` nodes
//! - Builtin functions and cursor attributes get canonical nodes
//! - Local mismatches are reported to a sink and replaced by placeholders

mod builder;
mod declaration;
mod error;
mod expression;
mod statement;

pub use builder::Builder;
pub use error::*;

use plscope_ast::{DiagnosticSink, Script};
use plscope_parser::SyntaxNode;
use tracing::debug;

/// Parse and build a script. Only a syntax error aborts the build.
pub fn build(source: &str, sink: &mut dyn DiagnosticSink) -> Result<Script, BuildError> {
    let tree = plscope_parser::parse(source).inspect_err(|err| {
        debug!(line = err.line, column = err.column, message = %err.message, "syntax error");
    })?;
    build_tree(&tree, sink)
}

/// Build a script from an already parsed tree
pub fn build_tree(tree: &SyntaxNode, sink: &mut dyn DiagnosticSink) -> Result<Script, BuildError> {
    let mut builder = Builder::new(sink);
    let script = builder.build_script(tree)?;
    debug!(
        statements = script.statements.len(),
        diagnostics = builder.reported(),
        "script built"
    );
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plscope_ast::*;

    fn build_ok(source: &str) -> (Script, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let script = build(source, &mut diagnostics)
            .unwrap_or_else(|e| panic!("Failed to build: {e}"));
        (script, diagnostics)
    }

    fn block_statements(script: &Script) -> &[Statement] {
        match &script.statements[0].kind {
            StatementKind::Block(block) => &block.body.statements,
            other => panic!("Expected block, got {other:?}"),
        }
    }

    /// Value of `x := <expr>` inside an anonymous block
    fn assigned(expr: &str) -> Expression {
        let (script, diagnostics) = build_ok(&format!("BEGIN x := {expr}; END;"));
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        match &block_statements(&script)[0].kind {
            StatementKind::Assignment { value, .. } => value.clone(),
            other => panic!("Expected assignment, got {other:?}"),
        }
    }

    fn name(expr: &Expression) -> &str {
        match &expr.kind {
            ExpressionKind::Name(name) => name,
            other => panic!("Expected name, got {other:?}"),
        }
    }

    #[test]
    fn test_dot_chain_folds_leftmost_innermost() {
        let expr = assigned("a.b.c");
        let ExpressionKind::Dot { name: c, parent } = &expr.kind else {
            panic!("Expected dot, got {:?}", expr.kind);
        };
        assert_eq!(c, "c");
        let ExpressionKind::Dot { name: b, parent } = &parent.kind else {
            panic!("Expected dot, got {:?}", parent.kind);
        };
        assert_eq!(b, "b");
        assert_eq!(name(parent), "a");
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = assigned("1 + 2 * 3");
        let ExpressionKind::Binary { operator, left, right } = &expr.kind else {
            panic!("Expected binary, got {:?}", expr.kind);
        };
        assert_eq!(operator, "+");
        assert_eq!(left.kind, ExpressionKind::Number("1".into()));
        assert!(matches!(&right.kind, ExpressionKind::Binary { operator, .. } if operator == "*"));
    }

    #[test]
    fn test_parentheses_only_group() {
        let expr = assigned("(1 + 2) * 3");
        let ExpressionKind::Binary { operator, left, .. } = &expr.kind else {
            panic!("Expected binary, got {:?}", expr.kind);
        };
        assert_eq!(operator, "*");
        assert!(matches!(&left.kind, ExpressionKind::Binary { operator, .. } if operator == "+"));
    }

    #[test]
    fn test_logical_operators_are_upper_cased() {
        let expr = assigned("a = 1 and b is not null or not c");
        let ExpressionKind::Binary { operator, left, right } = &expr.kind else {
            panic!("Expected binary, got {:?}", expr.kind);
        };
        assert_eq!(operator, "OR");
        assert!(matches!(&right.kind, ExpressionKind::Not(_)));

        let ExpressionKind::Binary { operator, left, right } = &left.kind else {
            panic!("Expected AND, got {:?}", left.kind);
        };
        assert_eq!(operator, "AND");
        assert!(matches!(&left.kind, ExpressionKind::Relational { operator, .. } if operator == "="));
        assert!(
            matches!(&right.kind, ExpressionKind::UnaryLogical { operator, .. } if operator == "IS NOT NULL")
        );
    }

    #[test]
    fn test_membership_range_and_pattern() {
        assert!(matches!(
            assigned("a NOT IN (1, 2, 3)").kind,
            ExpressionKind::In { negated: true, ref elements, .. } if elements.len() == 3
        ));
        assert!(matches!(
            assigned("a BETWEEN 1 AND 10").kind,
            ExpressionKind::Between { negated: false, .. }
        ));
        assert!(matches!(
            assigned("a LIKE 'x\\_%' ESCAPE '\\'").kind,
            ExpressionKind::Like { escape: Some(_), .. }
        ));
    }

    #[test]
    fn test_builtin_functions_are_canonical() {
        let expr = assigned("nvl(a, 0)");
        let ExpressionKind::FunctionCall { name, arguments } = &expr.kind else {
            panic!("Expected function call, got {:?}", expr.kind);
        };
        assert_eq!(name, "NVL");
        assert_eq!(arguments.len(), 2);

        let expr = assigned("my_pkg.compute(1)");
        let ExpressionKind::Call { callee, arguments } = &expr.kind else {
            panic!("Expected call, got {:?}", expr.kind);
        };
        assert_eq!(callee.qualified_name().as_deref(), Some("my_pkg.compute"));
        assert_eq!(arguments.len(), 1);
    }

    #[test]
    fn test_count_star_argument() {
        let expr = assigned("count(*)");
        let ExpressionKind::Call { arguments, .. } = &expr.kind else {
            panic!("Expected call, got {:?}", expr.kind);
        };
        assert_eq!(name(&arguments[0]), "*");
    }

    #[test]
    fn test_named_argument_becomes_alias() {
        let (script, _) = build_ok("BEGIN p(a => 1); END;");
        let StatementKind::Call { callee, arguments } = &block_statements(&script)[0].kind else {
            panic!("Expected call statement");
        };
        assert_eq!(name(callee), "p");
        assert!(matches!(&arguments[0].kind, ExpressionKind::Alias { alias, .. } if alias == "a"));
    }

    #[test]
    fn test_cursor_attribute() {
        let expr = assigned("c%rowcount");
        let ExpressionKind::CursorAttribute { cursor, attribute } = &expr.kind else {
            panic!("Expected cursor attribute, got {:?}", expr.kind);
        };
        assert_eq!(name(cursor), "c");
        assert_eq!(*attribute, CursorAttributeKind::RowCount);
    }

    #[test]
    fn test_unknown_cursor_attribute_is_recoverable() {
        let (script, diagnostics) = build_ok("BEGIN x := c%bogus; y := 1; END;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "unsupported: cursor attribute %BOGUS");
        let statements = block_statements(&script);
        assert_eq!(statements.len(), 2);
        assert!(matches!(&statements[0].kind, StatementKind::Assignment { value, .. } if value.is_missing()));
    }

    #[test]
    fn test_call_on_name_prefix_is_reported() {
        let (_, diagnostics) = build_ok("BEGIN x := f(1).field; END;");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("qualified name prefix"));
    }

    #[test]
    fn test_update_multi_column_set_shape() {
        let (script, _) = build_ok("update t set (a,b) = (select 1, 2 from dual);");
        let StatementKind::Update(update) = &script.statements[0].kind else {
            panic!("Expected update");
        };
        let ExpressionKind::Binary { operator, left, right } = &update.set[0].kind else {
            panic!("Expected binary set item");
        };
        assert_eq!(operator, "=");
        assert!(matches!(&left.kind, ExpressionKind::List(columns) if columns.len() == 2));
        assert!(matches!(&right.kind, ExpressionKind::Statement(stmt)
            if matches!(stmt.kind, StatementKind::Select(_))));
    }

    #[test]
    fn test_quoted_nest_table_type() {
        let (script, _) = build_ok(r#"CREATE OR REPLACE TYPE NTHIS."DATA_ROW" as TABLE OF data_object;"#);
        let StatementKind::CreateNestTable(table) = &script.statements[0].kind else {
            panic!("Expected nest table, got {:?}", script.statements[0].kind);
        };
        assert_eq!(table.name, ObjectName::qualified("NTHIS", "DATA_ROW"));
        assert_eq!(table.element_type, DataType::named("data_object"));
        assert_eq!(script.statements[0].line(), 1);
    }

    #[test]
    fn test_unsupported_pragma_is_skipped() {
        let source = r#"
            DECLARE
                PRAGMA AUTONOMOUS_TRANSACTION;
                e EXCEPTION;
                PRAGMA EXCEPTION_INIT(e, -20001);
            BEGIN
                NULL;
            END;
        "#;
        let (script, diagnostics) = build_ok(source);
        let StatementKind::Block(block) = &script.statements[0].kind else {
            panic!("Expected block");
        };
        assert_eq!(block.declarations.len(), 2);
        assert_eq!(block.declarations[0].kind, DeclarationKind::AutonomousTransaction);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 5);
    }

    #[test]
    fn test_syntax_error_aborts_build() {
        let mut diagnostics = Vec::new();
        let err = build("BEGIN\n  IF x THEN NULL; END;\nEND;", &mut diagnostics).unwrap_err();
        assert!(matches!(err, BuildError::Syntax(_)));
        assert_eq!(err.line(), 2);
        assert!(err.to_string().starts_with("2:"), "got {err}");
    }
}
