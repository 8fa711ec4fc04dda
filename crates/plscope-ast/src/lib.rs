//! plscope AST - Core types for the procedural-SQL abstract syntax tree
//!
//! This crate defines all AST node types, source positions, variant tags,
//! the whole-tree visitor, shared diagnostics and the binary codec.

mod span;
mod expr;
mod stmt;
mod decl;
mod node;
mod diagnostic;
pub mod codec;
pub mod visit;

pub use span::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use node::*;
pub use diagnostic::*;
