//! plscope Validator - Rule-based checks over the AST
//!
//! Rules target a single node variant by its [`NodeTag`](plscope_ast::NodeTag).
//! A [`Validator`] owns its rule registry and walks whole scripts, collecting
//! one [`Diagnostic`](plscope_ast::Diagnostic) per violation in visit order.

mod render;
mod rule;
mod validator;

pub use render::render;
pub use rule::*;
pub use validator::Validator;

use plscope_ast::{Diagnostic, Script};

/// Validate a script against the built-in rules
pub fn validate(script: &Script) -> Vec<Diagnostic> {
    Validator::new().validate_script(script)
}
