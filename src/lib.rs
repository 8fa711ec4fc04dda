//! plscope - Static analysis and interpretation of PL/SQL scripts
//!
//! This is the root workspace crate that provides end-to-end tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use plscope_ast as ast;
pub use plscope_builder as builder;
pub use plscope_interpreter as interpreter;
pub use plscope_lexer as lexer;
pub use plscope_parser as parser;
pub use plscope_validator as validator;
