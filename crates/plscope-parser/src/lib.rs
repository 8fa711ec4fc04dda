//! plscope Parser - Recursive descent parser
//!
//! Parses procedural-SQL source into a concrete parse tree.
//! Key parsing challenges:
//! - Keywords are ordinary words; only a small reserved set ends names
//! - `:=` is assignment, `=` is comparison
//! - A bare name statement is a procedure call
//! - Expression levels are kept as nested nodes for the AST builder to fold

mod error;
mod expression;
mod parser;
mod statement;
mod syntax;

pub use error::*;
pub use parser::Parser;
pub use syntax::*;

/// Parse a source string into a parse tree rooted at a `Script` node
pub fn parse(source: &str) -> Result<SyntaxNode, SyntaxError> {
    let mut parser = Parser::new(source);
    parser.parse_script()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(source: &str) -> SyntaxNode {
        let script = parse(source).unwrap_or_else(|e| panic!("Failed to parse: {e}"));
        script.first_node().expect("script has a unit").clone()
    }

    /// Descend through single-child nodes until one of `kind` is found
    fn find(node: &SyntaxNode, kind: SyntaxKind) -> Option<&SyntaxNode> {
        if node.kind == kind {
            return Some(node);
        }
        node.nodes().find_map(|child| find(child, kind))
    }

    #[test]
    fn test_parse_anonymous_block() {
        let source = r#"
            DECLARE
                a NUMBER;
                b NUMBER := 2;
            BEGIN
                a := 1;
            END;
        "#;
        let block = unit(source);
        assert_eq!(block.kind, SyntaxKind::Block);
        let decls = block.child(SyntaxKind::DeclareSection).unwrap();
        assert_eq!(decls.children_of(SyntaxKind::VariableDeclaration).count(), 2);
        let body = block.child(SyntaxKind::Body).unwrap();
        let seq = body.child(SyntaxKind::SeqOfStatements).unwrap();
        assert_eq!(seq.first_node().unwrap().kind, SyntaxKind::AssignmentStatement);
    }

    #[test]
    fn test_parse_create_procedure() {
        let source = r#"
            CREATE OR REPLACE PROCEDURE hr.raise_salary(p_id IN NUMBER, p_pct NUMBER DEFAULT 10) IS
                v_total NUMBER;
            BEGIN
                UPDATE employees SET salary = salary * (1 + p_pct / 100) WHERE id = p_id;
                COMMIT;
            END raise_salary;
            /
        "#;
        let proc = unit(source);
        assert_eq!(proc.kind, SyntaxKind::CreateProcedure);
        let name = proc.child(SyntaxKind::ObjectName).unwrap();
        assert_eq!(name.text(), "hr.raise_salary");
        let params = proc.child(SyntaxKind::ParameterList).unwrap();
        assert_eq!(params.children_of(SyntaxKind::Parameter).count(), 2);
    }

    #[test]
    fn test_parse_package_and_body() {
        let source = r#"
            CREATE PACKAGE pkg AS
                PROCEDURE p(x NUMBER);
                FUNCTION f RETURN NUMBER;
            END pkg;
            /
            CREATE PACKAGE BODY pkg AS
                PROCEDURE p(x NUMBER) IS BEGIN NULL; END;
                FUNCTION f RETURN NUMBER IS BEGIN RETURN 1; END f;
            END pkg;
        "#;
        let script = parse(source).unwrap();
        let kinds: Vec<_> = script.nodes().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![SyntaxKind::CreatePackage, SyntaxKind::CreatePackageBody]);

        let body = &script.nodes().nth(1).unwrap();
        let decls = body.child(SyntaxKind::DeclareSection).unwrap();
        assert!(decls.child(SyntaxKind::ProcedureDeclaration).unwrap().child(SyntaxKind::Body).is_some());
    }

    #[test]
    fn test_parse_nest_table_type() {
        let block = unit("CREATE TYPE num_list AS TABLE OF NUMBER;");
        assert_eq!(block.kind, SyntaxKind::CreateType);
        assert!(block.has_keyword("TABLE"));

        let block = unit("DECLARE TYPE t_tab IS TABLE OF VARCHAR2(10) INDEX BY PLS_INTEGER; BEGIN NULL; END;");
        let decl = find(&block, SyntaxKind::TypeDeclaration).unwrap();
        assert_eq!(decl.children_of(SyntaxKind::TypeSpec).count(), 2);
    }

    #[test]
    fn test_elements_after_keyword() {
        let block = unit("CREATE TYPE num_list AS TABLE OF NUMBER;");
        let after: Vec<_> = {
            let keyword = String::from("of");
            block.after_keyword(&keyword).collect()
        };
        assert!(!after.is_empty());
        assert!(block.node_after_keyword("TABLE").is_some());
        assert_eq!(block.after_keyword("MISSING").count(), 0);
    }

    #[test]
    fn test_expression_cascade_is_kept() {
        let block = unit("BEGIN x := 1 + 2 * 3; END;");
        let assign = find(&block, SyntaxKind::AssignmentStatement).unwrap();
        let expr = assign.child(SyntaxKind::Expression).unwrap();
        let concat = find(expr, SyntaxKind::Concatenation).unwrap();
        // 1 + (2 * 3)
        assert_eq!(concat.node_count(), 2);
        assert!(concat.token(plscope_lexer::TokenKind::Plus).is_some());
        let right = concat.nodes().nth(1).unwrap();
        assert!(right.token(plscope_lexer::TokenKind::Star).is_some());
    }

    #[test]
    fn test_general_element_with_arguments() {
        let block = unit("BEGIN pkg.proc(1, b => 2); END;");
        let call = find(&block, SyntaxKind::CallStatement).unwrap();
        let element = call.child(SyntaxKind::GeneralElement).unwrap();
        let parts: Vec<_> = element.children_of(SyntaxKind::GeneralElementPart).collect();
        assert_eq!(parts.len(), 2);
        let args = parts[1].child(SyntaxKind::FunctionArgument).unwrap();
        assert_eq!(args.children_of(SyntaxKind::Argument).count(), 2);
    }

    #[test]
    fn test_cursor_attribute_and_outer_join() {
        let block = unit("BEGIN IF c%NOTFOUND THEN SELECT a INTO v FROM t, u WHERE t.id = u.id(+); END IF; END;");
        assert!(find(&block, SyntaxKind::CursorAttribute).is_some());
        assert!(find(&block, SyntaxKind::OuterJoinSign).is_some());
    }

    #[test]
    fn test_insert_target_keeps_column_list() {
        let block = unit("BEGIN INSERT INTO hr.t (a, b) VALUES (1, 2); INSERT INTO t (SELECT x FROM s); END;");
        let insert = find(&block, SyntaxKind::InsertStatement).unwrap();
        let target = insert.child(SyntaxKind::TableRef).unwrap();
        let name = target.child(SyntaxKind::GeneralElement).unwrap();
        assert_eq!(name.children_of(SyntaxKind::GeneralElementPart).count(), 2);
        assert!(find(target, SyntaxKind::FunctionArgument).is_none());
        let columns = insert.child(SyntaxKind::ColumnList).unwrap();
        assert_eq!(columns.children_of(SyntaxKind::GeneralElement).count(), 2);
        assert!(insert.child(SyntaxKind::ValuesClause).is_some());

        let seq = find(&block, SyntaxKind::SeqOfStatements).unwrap();
        let second = seq.nodes().nth(1).unwrap();
        let second = find(second, SyntaxKind::InsertStatement).unwrap();
        assert!(second.child(SyntaxKind::ColumnList).is_none());
        assert!(second.child(SyntaxKind::Subquery).is_some());
    }

    #[test]
    fn test_update_multi_column_set() {
        let block = unit("BEGIN UPDATE t SET (a, b) = (SELECT x, y FROM s) WHERE id = 1; END;");
        let set = find(&block, SyntaxKind::ColumnBasedUpdateSet).unwrap();
        assert!(set.child(SyntaxKind::ColumnList).is_some());
        assert!(find(set, SyntaxKind::Subquery).is_some());
    }

    #[test]
    fn test_loops_and_labels() {
        let source = r#"
            BEGIN
                <<outer>>
                FOR i IN REVERSE 1..10 LOOP
                    EXIT outer WHEN i = 3;
                END LOOP outer;
                WHILE x < 10 LOOP x := x + 1; END LOOP;
                FOR r IN (SELECT id FROM t) LOOP NULL; END LOOP;
            END;
        "#;
        let block = unit(source);
        let seq = find(&block, SyntaxKind::SeqOfStatements).unwrap();
        let loops: Vec<_> = seq.children_of(SyntaxKind::LoopStatement).collect();
        assert_eq!(loops.len(), 3);
        assert!(loops[0].child(SyntaxKind::Label).is_some());
        assert!(loops[0].token(plscope_lexer::TokenKind::DotDot).is_some());
        assert!(loops[2].child(SyntaxKind::Subquery).is_some());
    }

    #[test]
    fn test_exception_handlers() {
        let source = r#"
            BEGIN
                RAISE my_error;
            EXCEPTION
                WHEN my_error OR no_data_found THEN NULL;
                WHEN OTHERS THEN ROLLBACK;
            END;
        "#;
        let block = unit(source);
        let body = block.child(SyntaxKind::Body).unwrap();
        assert_eq!(body.children_of(SyntaxKind::ExceptionHandler).count(), 2);
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = parse("BEGIN\n  x := ;\nEND;").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 7);
        assert_eq!(err.message, "mismatched input ';', expecting expression");
    }

    #[test]
    fn test_missing_terminator_at_eof() {
        let err = parse("BEGIN NULL; END").unwrap_err();
        assert!(err.message.contains("<EOF>"), "got {}", err.message);
    }

    #[test]
    fn test_invalid_character() {
        let err = parse("BEGIN x := 1 ? 2; END;").unwrap_err();
        assert!(err.message.starts_with("token recognition error"), "got {}", err.message);
    }
}
