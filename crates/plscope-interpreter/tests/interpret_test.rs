//! Interpreting built scripts

use std::cell::Cell;
use std::rc::Rc;

use plscope_ast::Script;
use plscope_builder::build;
use plscope_interpreter::*;

fn build_script(source: &str) -> Script {
    let mut diagnostics = Vec::new();
    build(source, &mut diagnostics).unwrap_or_else(|e| panic!("Failed to build: {e}"))
}

fn run(script: &Script) -> Interpreter<'_> {
    let mut interpreter = Interpreter::new();
    interpreter
        .interpret(script)
        .unwrap_or_else(|e| panic!("Failed to interpret: {e}"));
    interpreter
}

fn number(interpreter: &Interpreter<'_>, name: &str) -> f64 {
    match interpreter.get(name) {
        Ok(Value::Number(n)) => n,
        other => panic!("Expected {name} to be a number, got {other:?}"),
    }
}

#[test]
fn test_declarations_initialize_in_order() {
    let script = build_script("DECLARE a NUMBER := 1; b NUMBER := a + 1; BEGIN NULL; END;");
    let interpreter = run(&script);

    assert_eq!(number(&interpreter, "a"), 1.0);
    assert_eq!(number(&interpreter, "B"), 2.0);
    let global = interpreter.environment().global();
    assert_eq!(interpreter.environment().names(global), vec!["A", "B"]);
}

#[test]
fn test_initializers_can_be_disabled() {
    let script = build_script("DECLARE a NUMBER := 1; b NUMBER := 2; BEGIN a := 5; END;");
    let options = InterpreterOptions {
        initialize_declarations: false,
        ..InterpreterOptions::default()
    };
    let mut interpreter = Interpreter::with_options(options);
    interpreter.interpret(&script).unwrap();

    assert_eq!(interpreter.get("a").unwrap(), Value::Number(5.0));
    assert_eq!(interpreter.get("b").unwrap(), Value::Null);
}

#[test]
fn test_native_procedures() {
    let script = build_script(
        r#"
DECLARE
    doubled NUMBER;
BEGIN
    tick;
    tick;
    doubled := twice(21);
END;
"#,
    );
    let calls = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&calls);

    let mut interpreter = Interpreter::new();
    interpreter.define_native(NativeProcedure::new("tick", 0, move |_| {
        counter.set(counter.get() + 1);
        Ok(Value::Null)
    }));
    interpreter.define_native(NativeProcedure::new("TWICE", 1, |args| {
        let n = args[0].to_number()?.unwrap_or(0.0);
        Ok(Value::Number(n * 2.0))
    }));
    interpreter.interpret(&script).unwrap();

    assert_eq!(calls.get(), 2);
    assert_eq!(number(&interpreter, "doubled"), 42.0);
    assert_eq!(interpreter.call("tick", Vec::new()).unwrap(), Value::Null);
    assert_eq!(calls.get(), 3);
}

const BUMP: &str = r#"
CREATE OR REPLACE PROCEDURE bump(p_amount NUMBER, p_times NUMBER DEFAULT 2) IS
BEGIN
    counter := counter + p_amount * p_times;
END bump;
/
"#;

#[test]
fn test_positional_named_and_default_arguments() {
    let source = format!(
        "{BUMP}
DECLARE
    counter NUMBER := 0;
BEGIN
    bump(1);
    bump(p_times => 3, p_amount => 10);
    bump(5, 1);
END;
/"
    );
    let script = build_script(&source);
    let interpreter = run(&script);
    assert_eq!(number(&interpreter, "counter"), 37.0);
}

#[test]
fn test_argument_binding_errors() {
    let cases = [
        ("bump(1, 2, 3);", "E-RT-005"),
        ("bump;", "E-RT-005"),
        ("bump(p_nope => 1);", "E-RT-006"),
        ("missing_proc(1);", "E-RT-004"),
    ];
    for (call, code) in cases {
        let source = format!("{BUMP}\nDECLARE counter NUMBER := 0; BEGIN {call} END;\n/");
        let script = build_script(&source);
        let err = Interpreter::new().interpret(&script).unwrap_err();
        assert_eq!(err.code(), code, "{call} failed with {err}");
    }
}

#[test]
fn test_forward_references_between_units() {
    let script = build_script(
        r#"
CREATE FUNCTION twice(x NUMBER) RETURN NUMBER IS
BEGIN
    RETURN helper(x) * 2;
END;
/
CREATE FUNCTION helper(x NUMBER) RETURN NUMBER IS
BEGIN
    RETURN x + 1;
END;
/
DECLARE
    r NUMBER;
BEGIN
    r := twice(4);
END;
/
"#,
    );
    let mut interpreter = run(&script);

    assert_eq!(number(&interpreter, "r"), 10.0);
    assert!(interpreter.program().procedure("HELPER").is_some());
    assert_eq!(interpreter.call("helper", vec![Value::Number(1.0)]).unwrap(), Value::Number(2.0));
}

#[test]
fn test_recursive_function() {
    let script = build_script(
        r#"
CREATE FUNCTION fact(n NUMBER) RETURN NUMBER IS
BEGIN
    IF n <= 1 THEN
        RETURN 1;
    END IF;
    RETURN n * fact(n - 1);
END;
/
"#,
    );
    let mut interpreter = run(&script);
    assert_eq!(interpreter.call("fact", vec![Value::Number(5.0)]).unwrap(), Value::Number(120.0));
}

#[test]
fn test_call_depth_is_bounded() {
    let script = build_script(
        r#"
CREATE PROCEDURE spin(n NUMBER) IS
BEGIN
    spin(n + 1);
END;
/
BEGIN
    spin(0);
END;
/
"#,
    );
    let options = InterpreterOptions::from_json(r#"{"max_call_depth": 8}"#).unwrap();
    let mut interpreter = Interpreter::with_options(options);

    let err = interpreter.interpret(&script).unwrap_err();
    assert_eq!(err, RuntimeError::CallDepthExceeded { depth: 8 });
}

const BILLING: &str = r#"
CREATE OR REPLACE PACKAGE billing AS
    PROCEDURE charge(p_amount NUMBER);
    FUNCTION total RETURN NUMBER;
END billing;
/
CREATE OR REPLACE PACKAGE BODY billing AS
    g_total NUMBER := 100;

    PROCEDURE charge(p_amount NUMBER) IS
    BEGIN
        g_total := g_total + p_amount;
    END charge;

    FUNCTION total RETURN NUMBER IS
    BEGIN
        RETURN g_total;
    END;
BEGIN
    g_total := 0;
END billing;
/
"#;

#[test]
fn test_nested_block_subprograms_are_reused_across_entries() {
    let source = r#"
DECLARE
    counter NUMBER := 0;
BEGIN
    FOR k IN 1..50 LOOP
        DECLARE
            PROCEDURE bump IS
            BEGIN
                counter := counter + 1;
            END;
        BEGIN
            bump;
        END;
    END LOOP;
END;
"#;
    let script = build_script(source);
    let mut interpreter = Interpreter::new();
    interpreter.resolve(&script).unwrap();
    let before = interpreter.program().callable_count();
    interpreter.execute().unwrap();

    assert_eq!(number(&interpreter, "counter"), 50.0);
    assert_eq!(interpreter.program().callable_count(), before + 1);
}

#[test]
fn test_package_state_and_members() {
    let source = format!(
        "{BILLING}
DECLARE
    result NUMBER;
BEGIN
    billing.charge(5);
    billing.charge(p_amount => 7);
    result := billing.total;
END;
/"
    );
    let script = build_script(&source);
    let mut interpreter = run(&script);

    assert_eq!(number(&interpreter, "result"), 12.0);

    let id = interpreter.program().package_named("BILLING").unwrap();
    let package = interpreter.program().package(id).unwrap();
    assert_eq!(package.resolved_members(), 2);
    let scope = package.scope().unwrap();
    assert_eq!(interpreter.environment().get_local(scope, "g_total"), Some(Value::Number(12.0)));
    assert!(interpreter.get("g_total").is_err());

    // Repeated lookups reuse the memoized callable
    let callables = interpreter.program().callable_count();
    let first = interpreter.package_member(id, "charge").unwrap();
    let second = interpreter.package_member(id, "CHARGE").unwrap();
    assert_eq!(first, second);
    assert_eq!(interpreter.program().callable_count(), callables);

    assert!(matches!(
        interpreter.package_member(id, "refund"),
        Err(RuntimeError::ProcedureNotFound { .. })
    ));
}

#[test]
fn test_missing_package_member_call() {
    let source = format!("{BILLING}\nBEGIN billing.refund(1); END;\n/");
    let script = build_script(&source);
    let err = Interpreter::new().interpret(&script).unwrap_err();
    assert_eq!(err.code(), "E-RT-004");
}

#[test]
fn test_loops() {
    let script = build_script(
        r#"
DECLARE
    total NUMBER := 0;
    n NUMBER := 0;
    trail VARCHAR2(100);
BEGIN
    FOR i IN 1..10 LOOP
        CONTINUE WHEN i MOD 2 = 0;
        EXIT WHEN i > 7;
        total := total + i;
    END LOOP;
    WHILE n < 3 LOOP
        n := n + 1;
    END LOOP;
    FOR i IN REVERSE 1..3 LOOP
        trail := trail || i;
    END LOOP;
    LOOP
        n := n + 1;
        EXIT WHEN n >= 5;
    END LOOP;
END;
"#,
    );
    let interpreter = run(&script);

    assert_eq!(number(&interpreter, "total"), 16.0);
    assert_eq!(number(&interpreter, "n"), 5.0);
    assert_eq!(interpreter.get("trail").unwrap(), Value::from("321"));
    // The loop variable does not leak
    assert!(interpreter.get("i").is_err());
}

#[test]
fn test_conditions_treat_null_as_false() {
    let script = build_script(
        r#"
DECLARE
    v NUMBER;
    a VARCHAR2(10);
    b VARCHAR2(10);
    c VARCHAR2(10);
    d VARCHAR2(10);
BEGIN
    IF v = 1 THEN
        a := 'then';
    ELSE
        a := 'else';
    END IF;
    IF v IS NULL THEN
        b := 'null';
    END IF;
    IF 'abc' LIKE 'a%' THEN
        c := 'like';
    END IF;
    IF 3 BETWEEN 1 AND 5 THEN
        IF 2 IN (1, 2) THEN
            d := 'both';
        END IF;
    END IF;
END;
"#,
    );
    let interpreter = run(&script);

    assert_eq!(interpreter.get("a").unwrap(), Value::from("else"));
    assert_eq!(interpreter.get("b").unwrap(), Value::from("null"));
    assert_eq!(interpreter.get("c").unwrap(), Value::from("like"));
    assert_eq!(interpreter.get("d").unwrap(), Value::from("both"));
}

#[test]
fn test_builtins_and_case_expressions() {
    let script = build_script(
        r#"
DECLARE
    n NUMBER;
    s VARCHAR2(10);
    d VARCHAR2(10);
    c VARCHAR2(10);
BEGIN
    n := NVL(NULL, 3) + ROUND(2.5);
    s := SUBSTR('hello', 2, 3);
    d := DECODE(2, 1, 'one', 2, 'two');
    c := CASE WHEN n > 10 THEN 'big' ELSE 'small' END;
END;
"#,
    );
    let interpreter = run(&script);

    assert_eq!(number(&interpreter, "n"), 6.0);
    assert_eq!(interpreter.get("s").unwrap(), Value::from("ell"));
    assert_eq!(interpreter.get("d").unwrap(), Value::from("two"));
    assert_eq!(interpreter.get("c").unwrap(), Value::from("small"));
}

#[test]
fn test_exception_handlers() {
    let script = build_script(
        r#"
DECLARE
    x NUMBER := 0;
    r VARCHAR2(20);
    s VARCHAR2(20);
    e_custom EXCEPTION;
BEGIN
    BEGIN
        x := 1 / x;
    EXCEPTION
        WHEN ZERO_DIVIDE THEN
            r := 'div';
    END;
    BEGIN
        RAISE e_custom;
    EXCEPTION
        WHEN no_data_found THEN
            s := 'wrong';
        WHEN OTHERS THEN
            s := 'others';
    END;
END;
"#,
    );
    let interpreter = run(&script);

    assert_eq!(interpreter.get("r").unwrap(), Value::from("div"));
    assert_eq!(interpreter.get("s").unwrap(), Value::from("others"));
}

#[test]
fn test_unhandled_and_reraised_exceptions() {
    let script = build_script("BEGIN RAISE no_data_found; END;");
    let err = Interpreter::new().interpret(&script).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnhandledException { name: "NO_DATA_FOUND".into(), line: 1 }
    );

    let script = build_script(
        r#"
DECLARE
    e_custom EXCEPTION;
BEGIN
    RAISE e_custom;
EXCEPTION
    WHEN e_custom THEN
        RAISE;
END;
"#,
    );
    let err = Interpreter::new().interpret(&script).unwrap_err();
    assert_eq!(err.exception_name().as_deref(), Some("E_CUSTOM"));
}

#[test]
fn test_errors_abandon_remaining_statements() {
    let script = build_script(
        r#"
DECLARE
    a NUMBER := 1;
BEGIN
    a := undefined_name;
END;
/
BEGIN
    a := 2;
END;
/
"#,
    );
    let mut interpreter = Interpreter::new();

    let err = interpreter.interpret(&script).unwrap_err();
    assert!(matches!(err, RuntimeError::UndefinedVariable { .. }));
    assert_eq!(number(&interpreter, "a"), 1.0);
    assert!(interpreter.execute().is_ok());
    assert_eq!(number(&interpreter, "a"), 1.0);
}

#[test]
fn test_cancellation() {
    let script = build_script("BEGIN NULL; END;");
    let token = CancellationToken::new();
    token.cancel();
    let mut interpreter = Interpreter::new().with_cancellation(token);
    assert_eq!(interpreter.interpret(&script).unwrap_err(), RuntimeError::Cancelled);

    // Cancelled from inside an otherwise endless loop
    let script = build_script("BEGIN LOOP stop; END LOOP; END;");
    let mut interpreter = Interpreter::new();
    let token = interpreter.cancellation_token();
    interpreter.define_native(NativeProcedure::new("stop", 0, move |_| {
        token.cancel();
        Ok(Value::Null)
    }));
    assert_eq!(interpreter.interpret(&script).unwrap_err(), RuntimeError::Cancelled);
}

#[test]
fn test_sql_statements_are_skipped() {
    let script = build_script(
        r#"
DECLARE
    v NUMBER := 1;
BEGIN
    UPDATE t SET a = 1;
    COMMIT;
    v := v + 1;
END;
"#,
    );
    let interpreter = run(&script);
    assert_eq!(number(&interpreter, "v"), 2.0);
}
