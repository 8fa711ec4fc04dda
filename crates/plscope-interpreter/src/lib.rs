//! Tree-walking interpreter for PL/SQL scripts
//!
//! Executes the procedural subset of a built [`Script`](plscope_ast::Script):
//! blocks, assignments, control flow, calls and exception handlers. SQL
//! statements are recognised and skipped; there is no database behind them.
//!
//! ```ignore
//! let mut diagnostics = Vec::new();
//! let script = plscope_builder::build(source, &mut diagnostics)?;
//! let mut interpreter = Interpreter::new();
//! interpreter.interpret(&script)?;
//! assert_eq!(interpreter.get("total")?, Value::from(3));
//! ```

mod builtins;
mod callable;
mod cancel;
mod environment;
mod error;
mod interpreter;
mod options;
mod program;
mod value;

pub use callable::{Callable, NativeProcedure, Procedure};
pub use cancel::CancellationToken;
pub use environment::{Environment, ScopeId};
pub use error::RuntimeError;
pub use interpreter::Interpreter;
pub use options::InterpreterOptions;
pub use program::{Package, Program};
pub use value::{CallableId, PackageId, Value};
