use plscope::ast::{Diagnostic, Script, StatementKind};
use plscope::interpreter::{Interpreter, Value};

/// Assert a global holds the given number
pub fn assert_number(interpreter: &Interpreter<'_>, name: &str, expected: f64) {
    match interpreter.get(name) {
        Ok(Value::Number(n)) => assert_eq!(n, expected, "{name}"),
        other => panic!("Expected {name} = {expected}, got {other:?}"),
    }
}

/// Assert diagnostics as `(line, message)` pairs, in order
pub fn assert_diagnostics(diagnostics: &[Diagnostic], expected: &[(usize, &str)]) {
    let actual: Vec<(usize, &str)> = diagnostics
        .iter()
        .map(|d| (d.line, d.message.as_str()))
        .collect();
    assert_eq!(actual, expected);
}

/// The statements of the script's first anonymous block
pub fn first_block(script: &Script) -> &plscope::ast::Block {
    script
        .statements
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StatementKind::Block(block) => Some(block),
            _ => None,
        })
        .unwrap_or_else(|| panic!("Expected a block in {script:?}"))
}
