use std::fs;
use std::path::Path;

use plscope::ast::{Diagnostic, Script};

/// Load a script from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {name}: {e}"))
}

/// Build source, returning the script and the builder's diagnostics
pub fn build_with_diagnostics(source: &str) -> (Script, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let script = plscope::builder::build(source, &mut diagnostics)
        .unwrap_or_else(|e| panic!("Failed to build: {e}"));
    (script, diagnostics)
}

/// Build source that must not produce builder diagnostics
pub fn build_clean(source: &str) -> Script {
    let (script, diagnostics) = build_with_diagnostics(source);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    script
}
