//! Interpreted and native procedures behind one calling convention

use std::fmt;

use plscope_ast::{
    Body, Declaration, ExceptionHandler, FunctionDeclaration, Parameter, ProcedureDeclaration,
};

use crate::environment::ScopeId;
use crate::interpreter::Flow;
use crate::{Interpreter, RuntimeError, Value};

/// Anything a call statement can invoke.
///
/// `call` receives exactly [`arity`](Callable::arity) positional arguments;
/// the interpreter fills defaults and named arguments beforehand.
pub trait Callable<'a>: fmt::Display {
    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    /// Declared parameters, used to bind named and defaulted arguments
    fn parameters(&self) -> &'a [Parameter] {
        &[]
    }

    /// Functions are invoked when referenced by bare name in an expression
    fn returns_value(&self) -> bool {
        false
    }

    fn call(&self, interpreter: &mut Interpreter<'a>, arguments: Vec<Value>) -> Result<Value, RuntimeError>;
}

fn check_arity(name: &str, expected: usize, found: usize) -> Result<(), RuntimeError> {
    if expected == found {
        Ok(())
    } else {
        Err(RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected,
            found,
        })
    }
}

type NativeFn = Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

/// Host-provided procedure
pub struct NativeProcedure {
    name: String,
    arity: usize,
    function: NativeFn,
}

impl NativeProcedure {
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        function: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            function: Box::new(function),
        }
    }
}

impl<'a> Callable<'a> for NativeProcedure {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, _interpreter: &mut Interpreter<'a>, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        check_arity(&self.name, self.arity, arguments.len())?;
        (self.function)(&arguments)
    }
}

impl fmt::Display for NativeProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native {}>", self.name)
    }
}

/// A `PROCEDURE` or `FUNCTION` declared in source.
///
/// Runs in a fresh child of the scope it was declared in.
pub struct Procedure<'a> {
    name: String,
    parameters: &'a [Parameter],
    declarations: &'a [Declaration],
    body: Option<&'a Body>,
    handlers: &'a [ExceptionHandler],
    is_function: bool,
    closure: ScopeId,
}

impl<'a> Procedure<'a> {
    pub fn from_procedure(decl: &'a ProcedureDeclaration, closure: ScopeId) -> Self {
        Self {
            name: decl.name.name.clone(),
            parameters: &decl.parameters,
            declarations: &decl.declarations,
            body: decl.body.as_ref(),
            handlers: &decl.handlers,
            is_function: false,
            closure,
        }
    }

    pub fn from_function(decl: &'a FunctionDeclaration, closure: ScopeId) -> Self {
        Self {
            name: decl.name.name.clone(),
            parameters: &decl.parameters,
            declarations: &decl.declarations,
            body: decl.body.as_ref(),
            handlers: &decl.handlers,
            is_function: true,
            closure,
        }
    }

    pub fn closure(&self) -> ScopeId {
        self.closure
    }
}

impl<'a> Callable<'a> for Procedure<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.parameters.len()
    }

    fn parameters(&self) -> &'a [Parameter] {
        self.parameters
    }

    fn returns_value(&self) -> bool {
        self.is_function
    }

    fn call(&self, interpreter: &mut Interpreter<'a>, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        check_arity(&self.name, self.arity(), arguments.len())?;
        let body = self
            .body
            .ok_or_else(|| RuntimeError::Unsupported(format!("{} has no body", self.name)))?;

        interpreter.with_scope(self.closure, |interp| {
            for (param, value) in self.parameters.iter().zip(arguments) {
                interp.environment_mut().define(&param.name, value);
            }
            interp.declare_all(self.declarations)?;
            match interp.execute_protected(body, self.handlers)? {
                Flow::Return(value) => Ok(value),
                Flow::Normal | Flow::Exit | Flow::Continue => Ok(Value::Null),
            }
        })
    }
}

impl fmt::Display for Procedure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_function { "function" } else { "procedure" };
        write!(f, "<{kind} {}>", self.name)
    }
}
