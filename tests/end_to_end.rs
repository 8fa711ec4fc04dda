//! End-to-end tests: source text through build, validation and interpretation

mod common;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use common::assertions::*;
use common::fixtures::*;
use plscope::ast::visit::{self, Visitor};
use plscope::ast::{
    codec, Declaration, Expression, ExpressionKind, LoopKind, NodeTag, Script, Statement, StatementKind,
    TypeDefinition,
};
use plscope::interpreter::{
    Environment, Interpreter, InterpreterOptions, NativeProcedure, RuntimeError, Value,
};
use plscope::validator::{validate, NEST_TABLE_MESSAGE, UPDATE_MULTI_SET_MESSAGE};

#[test]
fn e2e_dotted_names_fold_left_to_right() {
    let script = build_clean("BEGIN x := a.b.c; END;");
    let block = first_block(&script);
    let StatementKind::Assignment { value, .. } = &block.body.statements[0].kind else {
        panic!("Expected assignment");
    };

    let ExpressionKind::Dot { name, parent } = &value.kind else {
        panic!("Expected dot expression, got {:?}", value.kind);
    };
    assert_eq!(name, "c");
    let ExpressionKind::Dot { name, parent } = &parent.kind else {
        panic!("Expected nested dot expression");
    };
    assert_eq!(name, "b");
    assert_eq!(parent.kind, ExpressionKind::Name("a".into()));
}

#[test]
fn e2e_validator_flags_unsupported_constructs() {
    let script = build_clean(r#"CREATE OR REPLACE TYPE NTHIS."DATA_ROW" as TABLE OF data_object;"#);
    assert_diagnostics(&validate(&script), &[(1, NEST_TABLE_MESSAGE)]);

    let script = build_clean("update t set (a,b) = (select 1, 2 from dual);");
    assert_diagnostics(&validate(&script), &[(1, UPDATE_MULTI_SET_MESSAGE)]);

    let script = build_clean("update t set a = 1;");
    assert!(validate(&script).is_empty());
}

#[test]
fn e2e_validator_fixture_with_rendering() {
    let source = load_fixture("unsupported.sql");
    let script = build_clean(&source);
    let diagnostics = validate(&script);
    assert_diagnostics(
        &diagnostics,
        &[(1, NEST_TABLE_MESSAGE), (5, NEST_TABLE_MESSAGE), (7, UPDATE_MULTI_SET_MESSAGE)],
    );

    let report = plscope::validator::render(&source, "unsupported.sql", &diagnostics);
    assert!(report.contains("unsupported.sql"));
    assert!(report.contains(UPDATE_MULTI_SET_MESSAGE));
}

#[test]
fn e2e_environment_scoping() {
    let mut env = Environment::new();
    env.define("x", Value::Number(1.0));

    env.push_scope();
    env.push_scope();
    assert!(matches!(env.get("nope"), Err(RuntimeError::UndefinedVariable { .. })));
    env.define("x", Value::from("shadow"));
    assert_eq!(env.get("x").unwrap(), Value::from("shadow"));
    assert!(env.pop_scope());
    assert!(env.pop_scope());

    assert_eq!(env.get("x").unwrap(), Value::Number(1.0));
    assert!(matches!(env.get("nope"), Err(RuntimeError::UndefinedVariable { .. })));
}

#[test]
fn e2e_declare_and_assign() {
    let script = build_clean("DECLARE a NUMBER; b NUMBER := 2; BEGIN a:=1; END;");

    let mut interpreter = Interpreter::new();
    interpreter.interpret(&script).unwrap();
    assert_number(&interpreter, "a", 1.0);
    assert_number(&interpreter, "b", 2.0);
    let global = interpreter.environment().global();
    assert_eq!(interpreter.environment().names(global).len(), 2);

    // Explicit assignment applies even without initializer evaluation
    let options = InterpreterOptions::from_json(r#"{"initialize_declarations": false}"#).unwrap();
    let mut interpreter = Interpreter::with_options(options);
    interpreter.interpret(&script).unwrap();
    assert_number(&interpreter, "a", 1.0);
    assert_eq!(interpreter.get("b").unwrap(), Value::Null);
}

#[test]
fn e2e_native_called_once_per_statement() {
    let script = build_clean(
        r#"
DECLARE
    i NUMBER := 0;
BEGIN
    ping;
    record_value('first');
    WHILE i < 3 LOOP
        record_value(i);
        i := i + 1;
    END LOOP;
END;
"#,
    );
    let log = Rc::new(RefCell::new(Vec::new()));

    let mut interpreter = Interpreter::new();
    let pings = Rc::clone(&log);
    interpreter.define_native(NativeProcedure::new("ping", 0, move |_| {
        pings.borrow_mut().push("ping".to_string());
        Ok(Value::Null)
    }));
    let records = Rc::clone(&log);
    interpreter.define_native(NativeProcedure::new("record_value", 1, move |args| {
        records.borrow_mut().push(args[0].to_string());
        Ok(Value::Null)
    }));
    interpreter.interpret(&script).unwrap();

    assert_eq!(*log.borrow(), vec!["ping", "first", "0", "1", "2"]);
}

#[test]
fn e2e_billing_package() {
    let source = load_fixture("billing.sql");
    let script = build_clean(&source);
    assert!(validate(&script).is_empty());

    let notes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notes);
    let mut interpreter = Interpreter::new();
    interpreter.define_native(NativeProcedure::new("audit_note", 1, move |args| {
        sink.borrow_mut().push(args[0].to_string());
        Ok(Value::Null)
    }));
    interpreter.interpret(&script).unwrap();

    assert_number(&interpreter, "v_total", 30.0);
    assert_eq!(interpreter.get("v_status").unwrap(), Value::from("rejected"));
    assert_eq!(*notes.borrow(), vec!["charge", "bonus"]);
    assert_eq!(interpreter.program().package_count(), 1);
}

#[test]
fn e2e_unhandled_exception_aborts() {
    let source = format!(
        "{}\nBEGIN billing.charge(NULL); END;\n/",
        load_fixture("billing.sql")
    );
    let script = build_clean(&source);
    let mut interpreter = Interpreter::new();
    interpreter.define_native(NativeProcedure::new("audit_note", 1, |_| Ok(Value::Null)));

    let err = interpreter.interpret(&script).unwrap_err();
    assert_eq!(err.exception_name().as_deref(), Some("INVALID_AMOUNT"));
    assert_eq!(err.code(), "E-RT-010");
    // The driver block before the failing call completed
    assert_number(&interpreter, "v_total", 30.0);
}

#[test]
fn e2e_codec_round_trip() {
    let source = format!("{}\n{}", load_fixture("billing.sql"), load_fixture("unsupported.sql"));
    let script = build_clean(&source);

    let bytes = codec::encode(&script).unwrap();
    let decoded: Script = codec::decode(&bytes).unwrap();
    assert_eq!(decoded, script);
    assert_eq!(validate(&decoded).len(), 3);
}

/// Collects the tag of every node and the loop and type shapes seen
#[derive(Default)]
struct TagCollector {
    tags: BTreeSet<NodeTag>,
    loops: BTreeSet<&'static str>,
    types: BTreeSet<&'static str>,
}

impl<'ast> Visitor<'ast> for TagCollector {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        self.tags.insert(stmt.tag());
        match &stmt.kind {
            StatementKind::Loop(loop_stmt) => {
                self.loops.insert(match loop_stmt.kind {
                    LoopKind::Basic => "basic",
                    LoopKind::While(_) => "while",
                    LoopKind::ForRange { .. } => "range",
                    LoopKind::ForCursor { .. } => "cursor",
                });
            }
            StatementKind::CreateType(create) => {
                self.types.insert(match create.definition {
                    TypeDefinition::Object(_) => "object",
                    TypeDefinition::Varray { .. } => "varray",
                });
            }
            _ => {}
        }
        visit::walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        self.tags.insert(expr.tag());
        visit::walk_expression(self, expr);
    }

    fn visit_declaration(&mut self, decl: &'ast Declaration) {
        self.tags.insert(decl.tag());
        visit::walk_declaration(self, decl);
    }
}

#[test]
fn e2e_codec_round_trip_covers_every_node_kind() {
    let (script, diagnostics) = build_with_diagnostics(&load_fixture("every_construct.sql"));
    // Only the unknown cursor attribute is reported, leaving a Missing node
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");

    let mut collector = TagCollector::default();
    collector.visit_script(&script);
    let expected = [
        NodeTag::Block,
        NodeTag::CreateProcedureStatement,
        NodeTag::CreateFunctionStatement,
        NodeTag::CreatePackageStatement,
        NodeTag::CreatePackageBodyStatement,
        NodeTag::CreateTypeStatement,
        NodeTag::CreateNestTableStatement,
        NodeTag::CreateSynonymStatement,
        NodeTag::CreateTriggerStatement,
        NodeTag::AssignmentStatement,
        NodeTag::IfStatement,
        NodeTag::LoopStatement,
        NodeTag::OpenStatement,
        NodeTag::CloseStatement,
        NodeTag::FetchStatement,
        NodeTag::ExitStatement,
        NodeTag::ContinueStatement,
        NodeTag::CallStatement,
        NodeTag::SelectStatement,
        NodeTag::UpdateStatement,
        NodeTag::InsertStatement,
        NodeTag::DeleteStatement,
        NodeTag::MergeStatement,
        NodeTag::CaseWhenStatement,
        NodeTag::ReturnStatement,
        NodeTag::RaiseStatement,
        NodeTag::CommitStatement,
        NodeTag::RollbackStatement,
        NodeTag::NullStatement,
        NodeTag::NumericLiteral,
        NodeTag::StringLiteral,
        NodeTag::BooleanLiteral,
        NodeTag::NullExpression,
        NodeTag::NameExpression,
        NodeTag::DotExpression,
        NodeTag::BinaryExpression,
        NodeTag::RelationalExpression,
        NodeTag::UnaryLogicalExpression,
        NodeTag::NotExpression,
        NodeTag::SignExpression,
        NodeTag::InExpression,
        NodeTag::BetweenExpression,
        NodeTag::LikeExpression,
        NodeTag::FunctionCallExpression,
        NodeTag::CallExpression,
        NodeTag::ExistsExpression,
        NodeTag::CursorAttribute,
        NodeTag::AliasExpression,
        NodeTag::OuterJoinExpression,
        NodeTag::StatementExpression,
        NodeTag::ListExpression,
        NodeTag::MissingExpression,
        NodeTag::VariableDeclaration,
        NodeTag::ExceptionDeclaration,
        NodeTag::CursorDeclaration,
        NodeTag::NestTableTypeDeclaration,
        NodeTag::RecordTypeDeclaration,
        NodeTag::FunctionDeclaration,
        NodeTag::ProcedureDeclaration,
        NodeTag::AutonomousTransactionDeclaration,
    ];
    let missing: Vec<_> = expected.iter().filter(|tag| !collector.tags.contains(*tag)).collect();
    assert!(missing.is_empty(), "fixture lacks {missing:?}");
    assert_eq!(collector.loops.len(), 4);
    assert_eq!(collector.types.len(), 2);

    let bytes = codec::encode(&script).unwrap();
    let decoded: Script = codec::decode(&bytes).unwrap();
    assert_eq!(decoded, script);
}
