//! Tree-walking interpreter
//!
//! Interpretation runs in two passes. `resolve` registers every procedure,
//! function and package of a script up front so units may reference each
//! other in any order; `execute` then runs the retained top-level statements
//! (anonymous blocks, calls, package initialisation) in source order.

use std::rc::Rc;

use plscope_ast::{
    Block, Body, CaseResult, CaseWhenStatement, Declaration, DeclarationKind, ExceptionHandler,
    Expression, ExpressionKind, LoopKind, LoopStatement, PackageBody, PackageSpec, Positioned,
    Script, Statement, StatementKind,
};
use tracing::{debug, warn};

use crate::builtins::call_builtin;
use crate::environment::{Environment, ScopeId};
use crate::program::{Package, Program};
use crate::value::{and, arithmetic, concat, like, or};
use crate::{
    Callable, CallableId, CancellationToken, InterpreterOptions, NativeProcedure, PackageId, Procedure,
    RuntimeError, Value,
};

type RResult<T> = Result<T, RuntimeError>;
type SharedCallable<'a> = Rc<dyn Callable<'a> + 'a>;

/// How a statement sequence finished
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    Normal,
    Exit,
    Continue,
    Return(Value),
}

pub struct Interpreter<'a> {
    environment: Environment,
    program: Program<'a>,
    options: InterpreterOptions,
    cancellation: CancellationToken,
    depth: usize,
    executed: usize,
    /// Exceptions whose handlers are running, innermost last
    handling: Vec<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new() -> Self {
        Self::with_options(InterpreterOptions::default())
    }

    pub fn with_options(options: InterpreterOptions) -> Self {
        Self {
            environment: Environment::new(),
            program: Program::new(),
            options,
            cancellation: CancellationToken::new(),
            depth: 0,
            executed: 0,
            handling: Vec::new(),
        }
    }

    /// Use `token` to stop a running interpretation from elsewhere
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn program(&self) -> &Program<'a> {
        &self.program
    }

    /// Read a global binding
    pub fn get(&self, name: &str) -> RResult<Value> {
        self.environment
            .get_local(self.environment.global(), name)
            .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.to_string() })
    }

    /// Make a host procedure callable by name from scripts
    pub fn define_native(&mut self, native: NativeProcedure) -> CallableId {
        let global = self.environment.global();
        self.register_callable(Rc::new(native), global)
    }

    /// Resolve and execute a script
    pub fn interpret(&mut self, script: &'a Script) -> RResult<()> {
        self.resolve(script)?;
        self.execute()
    }

    /// Register the script's declarations and retain its executable statements
    pub fn resolve(&mut self, script: &'a Script) -> RResult<()> {
        let global = self.environment.global();
        for stmt in &script.statements {
            match &stmt.kind {
                StatementKind::CreateProcedure(decl) => {
                    let procedure = Procedure::from_procedure(decl, global);
                    let id = self.register_callable(Rc::new(procedure), global);
                    self.program.name_procedure(&decl.name.name, id);
                }
                StatementKind::CreateFunction(decl) => {
                    let function = Procedure::from_function(decl, global);
                    let id = self.register_callable(Rc::new(function), global);
                    self.program.name_procedure(&decl.name.name, id);
                }
                StatementKind::CreatePackage(spec) => self.register_package(spec),
                StatementKind::CreatePackageBody(body) => {
                    self.attach_package_body(body)?;
                    self.program.retain(stmt);
                }
                StatementKind::CreateType(_)
                | StatementKind::CreateNestTable(_)
                | StatementKind::CreateSynonym(_)
                | StatementKind::CreateTrigger(_) => {
                    debug!(statement = %stmt.tag(), line = stmt.line(), "schema object ignored");
                }
                StatementKind::Block(block) => {
                    // Top-level blocks run in the global scope
                    for decl in &block.declarations {
                        self.register_subprogram(decl);
                        if let DeclarationKind::Variable(_) | DeclarationKind::Cursor(_) = decl.kind {
                            if let Some(name) = decl.name() {
                                self.environment.define_in(global, name, Value::Null);
                            }
                        }
                    }
                    self.program.retain(stmt);
                }
                _ => self.program.retain(stmt),
            }
        }
        debug!(
            callables = self.program.callable_count(),
            packages = self.program.package_count(),
            pending = self.program.statements().len() - self.executed,
            "script resolved"
        );
        Ok(())
    }

    /// Run retained statements not yet executed.
    ///
    /// An error abandons the remaining statements; effects already applied stay.
    pub fn execute(&mut self) -> RResult<()> {
        while let Some(&stmt) = self.program.statements().get(self.executed) {
            self.executed += 1;
            if let Err(err) = self.execute_top_level(stmt) {
                debug!(code = err.code(), error = %err, line = stmt.line(), "interpretation aborted");
                self.executed = self.program.statements().len();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Call a global procedure from the host with positional arguments
    pub fn call(&mut self, name: &str, arguments: Vec<Value>) -> RResult<Value> {
        match self.get(name) {
            Ok(Value::Procedure(id)) => self.invoke(id, arguments),
            Ok(_) => Err(RuntimeError::NotCallable { name: name.to_string() }),
            Err(_) => Err(RuntimeError::ProcedureNotFound { name: name.to_string() }),
        }
    }

    fn execute_top_level(&mut self, stmt: &'a Statement) -> RResult<()> {
        match &stmt.kind {
            StatementKind::Block(block) => {
                self.check_cancelled()?;
                self.declare_values(&block.declarations)?;
                self.execute_protected(&block.body, &block.handlers)?;
            }
            StatementKind::CreatePackageBody(body) => self.initialize_package(body)?,
            _ => {
                self.execute_statement(stmt)?;
            }
        }
        Ok(())
    }

    // Registration

    fn register_callable(&mut self, callable: SharedCallable<'a>, scope: ScopeId) -> CallableId {
        let name = callable.name().to_string();
        let id = self.program.add_callable(callable);
        self.environment.define_in(scope, &name, Value::Procedure(id));
        debug!(name = %name, id = %id, "callable registered");
        id
    }

    /// Register a procedure or function declaration in the current scope
    fn register_subprogram(&mut self, decl: &'a Declaration) -> Option<CallableId> {
        let scope = self.environment.current();
        if let Some(id) = self.program.subprogram(decl, scope) {
            let name = decl.name()?;
            self.environment.define_in(scope, name, Value::Procedure(id));
            return Some(id);
        }
        let callable: SharedCallable<'a> = match &decl.kind {
            DeclarationKind::Procedure(proc) if proc.body.is_some() => {
                Rc::new(Procedure::from_procedure(proc, scope))
            }
            DeclarationKind::Function(func) if func.body.is_some() => {
                Rc::new(Procedure::from_function(func, scope))
            }
            _ => return None,
        };
        let id = self.register_callable(callable, scope);
        self.program.remember_subprogram(decl, scope, id);
        Some(id)
    }

    fn register_package(&mut self, spec: &'a PackageSpec) {
        let name = &spec.name.name;
        let id = self.program.add_package(Package::new(name.as_str(), Some(spec)));
        let global = self.environment.global();
        self.environment.define_in(global, name, Value::Package(id));
        debug!(package = %spec.name, id = %id, "package registered");
    }

    fn attach_package_body(&mut self, body: &'a PackageBody) -> RResult<()> {
        let name = &body.name.name;
        let global = self.environment.global();
        let id = match self.program.package_named(name) {
            Some(id) => id,
            None => {
                warn!(package = %body.name, "package body without a specification");
                let id = self.program.add_package(Package::new(name.as_str(), None));
                self.environment.define_in(global, name, Value::Package(id));
                id
            }
        };

        let scope = self.environment.allocate(global);
        let package = self.package_mut(id)?;
        package.attach_body(body, scope);
        let spec = package.spec();

        let state = spec
            .into_iter()
            .flat_map(|spec| spec.declarations.iter())
            .chain(body.declarations.iter());
        for decl in state {
            if let DeclarationKind::Variable(_) | DeclarationKind::Cursor(_) = decl.kind {
                if let Some(name) = decl.name() {
                    self.environment.define_in(scope, name, Value::Null);
                }
            }
        }
        for decl in &body.declarations {
            if let DeclarationKind::Procedure(_) | DeclarationKind::Function(_) = decl.kind {
                if let Some(member) = decl.name() {
                    let callable = self.package_member(id, member)?;
                    self.environment.define_in(scope, member, Value::Procedure(callable));
                }
            }
        }
        debug!(package = %body.name, id = %id, "package body attached");
        Ok(())
    }

    /// Resolve `package.member` to a callable, memoizing the result
    pub fn package_member(&mut self, id: PackageId, member: &str) -> RResult<CallableId> {
        let package = self.package(id)?;
        if let Some(callable) = package.member(member) {
            return Ok(callable);
        }

        let not_found = || RuntimeError::ProcedureNotFound {
            name: format!("{}.{member}", package.name()),
        };
        let (Some(body), Some(scope)) = (package.body(), package.scope()) else {
            return Err(not_found());
        };
        let callable: SharedCallable<'a> = body
            .declarations
            .iter()
            .find_map(|decl| match &decl.kind {
                DeclarationKind::Procedure(proc) if proc.name.name.eq_ignore_ascii_case(member) => {
                    Some(Rc::new(Procedure::from_procedure(proc, scope)) as SharedCallable<'a>)
                }
                DeclarationKind::Function(func) if func.name.name.eq_ignore_ascii_case(member) => {
                    Some(Rc::new(Procedure::from_function(func, scope)) as SharedCallable<'a>)
                }
                _ => None,
            })
            .ok_or_else(not_found)?;

        let callable = self.program.add_callable(callable);
        self.package_mut(id)?.remember(member, callable);
        debug!(package = %id, member, id = %callable, "package member resolved");
        Ok(callable)
    }

    fn package(&self, id: PackageId) -> RResult<&Package<'a>> {
        self.program.package(id).ok_or_else(|| RuntimeError::ProcedureNotFound {
            name: format!("package {id}"),
        })
    }

    fn package_mut(&mut self, id: PackageId) -> RResult<&mut Package<'a>> {
        self.program.package_mut(id).ok_or_else(|| RuntimeError::ProcedureNotFound {
            name: format!("package {id}"),
        })
    }

    fn package_scope(&self, id: PackageId) -> RResult<ScopeId> {
        let package = self.package(id)?;
        package.scope().ok_or_else(|| RuntimeError::Unsupported(format!(
            "package {} has no body",
            package.name()
        )))
    }

    /// Evaluate package state initializers and run the initialisation section
    fn initialize_package(&mut self, body: &'a PackageBody) -> RResult<()> {
        let id = self.program.package_named(&body.name.name).ok_or_else(|| {
            RuntimeError::ProcedureNotFound { name: body.name.to_string() }
        })?;
        let scope = self.package_scope(id)?;
        let spec = self.package(id)?.spec();

        self.in_scope(scope, |interp| {
            if let Some(spec) = spec {
                interp.declare_values(&spec.declarations)?;
            }
            interp.declare_values(&body.declarations)?;
            if let Some(init) = &body.initialization {
                debug!(package = %body.name, "running package initialisation");
                interp.execute_body(init)?;
            }
            Ok(())
        })
    }

    // Scopes and declarations

    /// Run `f` with `scope` current, restoring the previous scope afterwards
    fn in_scope<T>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> RResult<T>) -> RResult<T> {
        let previous = self.environment.enter(scope);
        let result = f(self);
        self.environment.leave(previous);
        result
    }

    /// Run `f` in a fresh child of `parent`, discarded afterwards whatever the outcome
    pub(crate) fn with_scope<T>(
        &mut self,
        parent: ScopeId,
        f: impl FnOnce(&mut Self) -> RResult<T>,
    ) -> RResult<T> {
        let scope = self.environment.allocate(parent);
        let result = self.in_scope(scope, f);
        self.environment.release(scope);
        result
    }

    /// Declare a section: subprograms first so they may reference each other
    pub(crate) fn declare_all(&mut self, declarations: &'a [Declaration]) -> RResult<()> {
        for decl in declarations {
            self.register_subprogram(decl);
        }
        self.declare_values(declarations)
    }

    fn declare_values(&mut self, declarations: &'a [Declaration]) -> RResult<()> {
        for decl in declarations {
            match &decl.kind {
                DeclarationKind::Variable(var) => {
                    let value = match &var.default {
                        Some(init) if self.options.initialize_declarations => self.evaluate(init)?,
                        _ => Value::Null,
                    };
                    self.environment.define(&var.name, value);
                }
                DeclarationKind::Cursor(cursor) => self.environment.define(&cursor.name, Value::Null),
                DeclarationKind::Exception { .. }
                | DeclarationKind::NestTableType(_)
                | DeclarationKind::RecordType(_)
                | DeclarationKind::Function(_)
                | DeclarationKind::Procedure(_)
                | DeclarationKind::AutonomousTransaction => {}
            }
        }
        Ok(())
    }

    fn check_cancelled(&self) -> RResult<()> {
        if self.cancellation.is_cancelled() {
            debug!("cancellation observed");
            return Err(RuntimeError::Cancelled);
        }
        Ok(())
    }

    // Statements

    pub(crate) fn execute_body(&mut self, body: &'a Body) -> RResult<Flow> {
        for stmt in &body.statements {
            match self.execute_statement(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    /// Run a body, routing catchable errors to the first matching handler
    pub(crate) fn execute_protected(
        &mut self,
        body: &'a Body,
        handlers: &'a [ExceptionHandler],
    ) -> RResult<Flow> {
        let err = match self.execute_body(body) {
            Err(err) => err,
            flow => return flow,
        };
        let Some(name) = err.exception_name() else {
            return Err(err);
        };
        let Some(handler) = handlers.iter().find(|handler| handler.catches(&name)) else {
            return Err(err);
        };

        debug!(exception = %name, line = handler.line(), "exception handled");
        self.handling.push(name);
        let result = self.execute_body(&handler.body);
        self.handling.pop();
        result
    }

    fn execute_statement(&mut self, stmt: &'a Statement) -> RResult<Flow> {
        match &stmt.kind {
            StatementKind::Block(block) => self.execute_block(block),
            StatementKind::CreateProcedure(_)
            | StatementKind::CreateFunction(_)
            | StatementKind::CreatePackage(_)
            | StatementKind::CreatePackageBody(_)
            | StatementKind::CreateType(_)
            | StatementKind::CreateNestTable(_)
            | StatementKind::CreateSynonym(_)
            | StatementKind::CreateTrigger(_) => Ok(Flow::Normal),
            StatementKind::Assignment { target, value } => {
                let value = self.evaluate(value)?;
                self.assign(target, value)?;
                Ok(Flow::Normal)
            }
            StatementKind::If(if_stmt) => {
                for branch in &if_stmt.branches {
                    if self.evaluate(&branch.condition)?.is_true() {
                        return self.execute_body(&branch.body);
                    }
                }
                match &if_stmt.else_body {
                    Some(body) => self.execute_body(body),
                    None => Ok(Flow::Normal),
                }
            }
            StatementKind::Loop(loop_stmt) => self.execute_loop(loop_stmt),
            StatementKind::Exit { condition } => {
                Ok(if self.holds(condition.as_ref())? { Flow::Exit } else { Flow::Normal })
            }
            StatementKind::Continue { condition } => {
                Ok(if self.holds(condition.as_ref())? { Flow::Continue } else { Flow::Normal })
            }
            StatementKind::Call { callee, arguments } => {
                self.call_expression(callee, arguments)?;
                Ok(Flow::Normal)
            }
            StatementKind::CaseWhen(case) => match self.select_case_arm(case)? {
                Some(CaseResult::Statements(body)) => self.execute_body(body),
                Some(CaseResult::Expression(expr)) => {
                    self.evaluate(expr)?;
                    Ok(Flow::Normal)
                }
                None => Err(RuntimeError::UnhandledException {
                    name: "CASE_NOT_FOUND".to_string(),
                    line: stmt.line(),
                }),
            },
            StatementKind::Return { value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            StatementKind::Raise { exception } => Err(self.raise(stmt, exception.as_ref())),
            StatementKind::Open { .. }
            | StatementKind::Close { .. }
            | StatementKind::Fetch { .. }
            | StatementKind::Select(_)
            | StatementKind::Update(_)
            | StatementKind::Insert(_)
            | StatementKind::Delete(_)
            | StatementKind::Merge(_)
            | StatementKind::Commit
            | StatementKind::Rollback => {
                debug!(statement = %stmt.tag(), line = stmt.line(), "SQL statement skipped");
                Ok(Flow::Normal)
            }
            StatementKind::Null => Ok(Flow::Normal),
        }
    }

    fn execute_block(&mut self, block: &'a Block) -> RResult<Flow> {
        self.check_cancelled()?;
        let parent = self.environment.current();
        self.with_scope(parent, |interp| {
            interp.declare_all(&block.declarations)?;
            interp.execute_protected(&block.body, &block.handlers)
        })
    }

    /// `EXIT`/`CONTINUE` conditions; no condition always holds
    fn holds(&mut self, condition: Option<&'a Expression>) -> RResult<bool> {
        match condition {
            Some(expr) => Ok(self.evaluate(expr)?.is_true()),
            None => Ok(true),
        }
    }

    fn execute_loop(&mut self, stmt: &'a LoopStatement) -> RResult<Flow> {
        match &stmt.kind {
            LoopKind::Basic => loop {
                if let Some(flow) = self.iterate(&stmt.body)? {
                    return Ok(flow);
                }
            },
            LoopKind::While(condition) => loop {
                self.check_cancelled()?;
                if !self.evaluate(condition)?.is_true() {
                    return Ok(Flow::Normal);
                }
                if let Some(flow) = self.iterate(&stmt.body)? {
                    return Ok(flow);
                }
            },
            LoopKind::ForRange { variable, reverse, low, high } => {
                let low = self.evaluate_bound(low)?;
                let high = self.evaluate_bound(high)?;
                let steps: Box<dyn Iterator<Item = i64>> = if *reverse {
                    Box::new((low..=high).rev())
                } else {
                    Box::new(low..=high)
                };

                let parent = self.environment.current();
                self.with_scope(parent, |interp| {
                    for step in steps {
                        interp.environment.define(variable, Value::from(step));
                        if let Some(flow) = interp.iterate(&stmt.body)? {
                            return Ok(flow);
                        }
                    }
                    Ok(Flow::Normal)
                })
            }
            LoopKind::ForCursor { record, .. } => {
                debug!(record = %record, line = stmt.body.line(), "cursor loop has no rows");
                Ok(Flow::Normal)
            }
        }
    }

    /// One loop iteration; `Some` ends the loop with that flow
    fn iterate(&mut self, body: &'a Body) -> RResult<Option<Flow>> {
        self.check_cancelled()?;
        Ok(match self.execute_body(body)? {
            Flow::Exit => Some(Flow::Normal),
            Flow::Return(value) => Some(Flow::Return(value)),
            Flow::Normal | Flow::Continue => None,
        })
    }

    fn evaluate_bound(&mut self, expr: &'a Expression) -> RResult<i64> {
        match self.evaluate(expr)?.to_number()? {
            Some(n) => Ok(n.round() as i64),
            None => Err(RuntimeError::mismatch("NUMBER", "NULL")),
        }
    }

    fn select_case_arm(&mut self, case: &'a CaseWhenStatement) -> RResult<Option<&'a CaseResult>> {
        let selector = match &case.selector {
            Some(selector) => Some(self.evaluate(selector)?),
            None => None,
        };
        for branch in &case.branches {
            let candidate = self.evaluate(&branch.condition)?;
            let matched = match &selector {
                Some(selector) => selector.sql_eq(&candidate)? == Some(true),
                None => candidate.is_true(),
            };
            if matched {
                return Ok(Some(&branch.result));
            }
        }
        Ok(case.else_result.as_ref())
    }

    fn raise(&self, stmt: &'a Statement, exception: Option<&'a Expression>) -> RuntimeError {
        let name = match exception {
            Some(expr) => expr.qualified_name().map(|name| name.to_ascii_uppercase()),
            None => self.handling.last().cloned(),
        };
        match name {
            Some(name) => {
                debug!(exception = %name, line = stmt.line(), "exception raised");
                RuntimeError::UnhandledException { name, line: stmt.line() }
            }
            None => RuntimeError::Unsupported("RAISE outside an exception handler".to_string()),
        }
    }

    fn assign(&mut self, target: &'a Expression, value: Value) -> RResult<()> {
        match &target.kind {
            ExpressionKind::Name(name) => self.environment.assign(name, value),
            ExpressionKind::Dot { name, parent } => match self.evaluate_reference(parent)? {
                Value::Package(id) => {
                    let scope = self.package_scope(id)?;
                    self.environment.assign_local(scope, name, value)
                }
                other => Err(RuntimeError::Unsupported(format!(
                    "assignment to a field of a {} value",
                    other.type_name()
                ))),
            },
            _ => Err(RuntimeError::Unsupported("assignment target".to_string())),
        }
    }

    // Calls

    /// Invoke a registered callable with already bound arguments
    pub fn invoke(&mut self, id: CallableId, arguments: Vec<Value>) -> RResult<Value> {
        let callable = self
            .program
            .callable(id)
            .ok_or_else(|| RuntimeError::ProcedureNotFound { name: id.to_string() })?;
        if self.depth >= self.options.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded { depth: self.options.max_call_depth });
        }

        debug!(callable = %callable, arguments = arguments.len(), depth = self.depth, "call");
        self.depth += 1;
        let result = callable.call(self, arguments);
        self.depth -= 1;
        result
    }

    fn call_expression(&mut self, callee: &'a Expression, arguments: &'a [Expression]) -> RResult<Value> {
        let id = self.resolve_callee(callee)?;
        let arguments = self.bind_arguments(id, arguments)?;
        self.invoke(id, arguments)
    }

    fn resolve_callee(&mut self, callee: &'a Expression) -> RResult<CallableId> {
        let display = || callee.qualified_name().unwrap_or_else(|| "expression".to_string());
        let value = match &callee.kind {
            ExpressionKind::Name(name) => self.environment.get(name).map_err(|err| match err {
                RuntimeError::UndefinedVariable { name } => RuntimeError::ProcedureNotFound { name },
                other => other,
            })?,
            ExpressionKind::Dot { name, parent } => match self.evaluate_reference(parent)? {
                Value::Package(id) => Value::Procedure(self.package_member(id, name)?),
                _ => return Err(RuntimeError::NotCallable { name: display() }),
            },
            _ => return Err(RuntimeError::NotCallable { name: display() }),
        };
        match value {
            Value::Procedure(id) => Ok(id),
            _ => Err(RuntimeError::NotCallable { name: display() }),
        }
    }

    /// Order arguments by parameter position: positional first, then
    /// `name => value`, then parameter defaults for anything left out
    fn bind_arguments(&mut self, id: CallableId, arguments: &'a [Expression]) -> RResult<Vec<Value>> {
        let callable = self
            .program
            .callable(id)
            .ok_or_else(|| RuntimeError::ProcedureNotFound { name: id.to_string() })?;
        let arity = callable.arity();
        let parameters = callable.parameters();
        let mismatch = || RuntimeError::ArityMismatch {
            name: callable.name().to_string(),
            expected: arity,
            found: arguments.len(),
        };

        let mut slots: Vec<Option<Value>> = vec![None; arity];
        let mut position = 0;
        for arg in arguments {
            let (index, expr) = match &arg.kind {
                ExpressionKind::Alias { expression, alias } => {
                    let index = parameters
                        .iter()
                        .position(|param| param.name.eq_ignore_ascii_case(alias))
                        .ok_or_else(|| RuntimeError::UnknownParameter {
                            procedure: callable.name().to_string(),
                            name: alias.clone(),
                        })?;
                    (index, expression.as_ref())
                }
                _ => {
                    position += 1;
                    (position - 1, arg)
                }
            };
            let slot = slots.get_mut(index).ok_or_else(mismatch)?;
            *slot = Some(self.evaluate(expr)?);
        }

        let mut values = Vec::with_capacity(arity);
        for (index, slot) in slots.into_iter().enumerate() {
            let value = match slot {
                Some(value) => value,
                None => match parameters.get(index).and_then(|param| param.default.as_ref()) {
                    Some(default) => self.evaluate(default)?,
                    None => return Err(mismatch()),
                },
            };
            values.push(value);
        }
        Ok(values)
    }

    /// Bare references to functions without arguments call them
    fn auto_call(&mut self, value: Value) -> RResult<Value> {
        if let Value::Procedure(id) = value {
            let callable = self.program.callable(id);
            if callable.is_some_and(|c| c.returns_value() && c.arity() == 0) {
                return self.invoke(id, Vec::new());
            }
        }
        Ok(value)
    }

    // Expressions

    /// Value of a name without calling functions it refers to
    fn evaluate_reference(&mut self, expr: &'a Expression) -> RResult<Value> {
        match &expr.kind {
            ExpressionKind::Name(name) => self.environment.get(name),
            _ => self.evaluate(expr),
        }
    }

    pub fn evaluate(&mut self, expr: &'a Expression) -> RResult<Value> {
        match &expr.kind {
            ExpressionKind::Number(text) => text
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| RuntimeError::mismatch("NUMBER", format!("'{text}'"))),
            // An empty string is NULL
            ExpressionKind::String(text) if text.is_empty() => Ok(Value::Null),
            ExpressionKind::String(text) => Ok(Value::String(text.clone())),
            ExpressionKind::Boolean(b) => Ok(Value::Boolean(*b)),
            ExpressionKind::Null => Ok(Value::Null),
            ExpressionKind::Name(name) => {
                let value = self.environment.get(name)?;
                self.auto_call(value)
            }
            ExpressionKind::Dot { name, parent } => self.member_value(parent, name),
            ExpressionKind::Binary { operator, left, right } => self.binary(operator, left, right),
            ExpressionKind::Relational { operator, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                relational(operator, &left, &right)
            }
            ExpressionKind::UnaryLogical { operator, operand } => {
                let is_null = self.evaluate(operand)?.is_null();
                match operator.as_str() {
                    "IS NULL" => Ok(Value::Boolean(is_null)),
                    "IS NOT NULL" => Ok(Value::Boolean(!is_null)),
                    other => Err(RuntimeError::Unsupported(format!("operator {other}"))),
                }
            }
            ExpressionKind::Not(operand) => {
                let value = self.evaluate(operand)?.as_bool()?;
                Ok(value.map(|b| !b).into())
            }
            ExpressionKind::Sign { operator, operand } => {
                let value = self.evaluate(operand)?.to_number()?;
                Ok(match (operator.as_str(), value) {
                    (_, None) => Value::Null,
                    ("-", Some(n)) => Value::Number(-n),
                    (_, Some(n)) => Value::Number(n),
                })
            }
            ExpressionKind::In { negated, operand, elements } => {
                let value = self.evaluate(operand)?;
                let mut found = Some(false);
                for element in elements {
                    let candidate = self.evaluate(element)?;
                    found = or(found, value.sql_eq(&candidate)?);
                    if found == Some(true) {
                        break;
                    }
                }
                Ok(negate(found, *negated).into())
            }
            ExpressionKind::Between { negated, operand, low, high } => {
                let value = self.evaluate(operand)?;
                let low = self.evaluate(low)?;
                let high = self.evaluate(high)?;
                let above = value.compare(&low)?.map(|o| o.is_ge());
                let below = value.compare(&high)?.map(|o| o.is_le());
                Ok(negate(and(above, below), *negated).into())
            }
            ExpressionKind::Like { negated, operand, pattern, escape } => {
                let text = self.evaluate(operand)?.to_text();
                let pattern = self.evaluate(pattern)?.to_text();
                let escape = match escape {
                    Some(expr) => self.evaluate(expr)?.to_text().and_then(|e| e.chars().next()),
                    None => None,
                };
                let matched = text
                    .zip(pattern)
                    .map(|(text, pattern)| like(&text, &pattern, escape));
                Ok(negate(matched, *negated).into())
            }
            ExpressionKind::FunctionCall { name, arguments } => {
                let values = arguments
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<RResult<Vec<_>>>()?;
                call_builtin(name, values)
            }
            ExpressionKind::Call { callee, arguments } => self.call_expression(callee, arguments),
            ExpressionKind::CursorAttribute { attribute, .. } => {
                debug!(attribute = attribute.as_str(), "cursor attribute without cursor state");
                Ok(Value::Null)
            }
            ExpressionKind::Alias { expression, .. } => self.evaluate(expression),
            ExpressionKind::Statement(stmt) => match &stmt.kind {
                StatementKind::CaseWhen(case) => match self.select_case_arm(case)? {
                    Some(CaseResult::Expression(expr)) => self.evaluate(expr),
                    Some(CaseResult::Statements(_)) => Err(RuntimeError::Unsupported(
                        "statements in a CASE expression".to_string(),
                    )),
                    None => Ok(Value::Null),
                },
                _ => Err(RuntimeError::Unsupported("sub-query evaluation".to_string())),
            },
            ExpressionKind::List(elements) => match elements.as_slice() {
                [single] => self.evaluate(single),
                _ => Err(RuntimeError::Unsupported("expression list as a value".to_string())),
            },
            ExpressionKind::Exists(_) => Err(RuntimeError::Unsupported("EXISTS sub-query".to_string())),
            ExpressionKind::OuterJoin(_) => Err(RuntimeError::Unsupported("outer join marker".to_string())),
            ExpressionKind::Missing => Err(RuntimeError::Unsupported(format!(
                "expression that failed to build at line {}",
                expr.line()
            ))),
        }
    }

    /// `pkg.member`: package state first, then package subprograms
    fn member_value(&mut self, parent: &'a Expression, member: &str) -> RResult<Value> {
        match self.evaluate_reference(parent)? {
            Value::Package(id) => {
                let scope = self.package_scope(id)?;
                let value = match self.environment.get_local(scope, member) {
                    Some(value) => value,
                    None => Value::Procedure(self.package_member(id, member)?),
                };
                self.auto_call(value)
            }
            other => Err(RuntimeError::Unsupported(format!(
                "field access on a {} value",
                other.type_name()
            ))),
        }
    }

    fn binary(&mut self, operator: &str, left: &'a Expression, right: &'a Expression) -> RResult<Value> {
        let operator = operator.to_ascii_uppercase();
        match operator.as_str() {
            "AND" => {
                let left = self.evaluate(left)?.as_bool()?;
                if left == Some(false) {
                    return Ok(Value::Boolean(false));
                }
                let right = self.evaluate(right)?.as_bool()?;
                Ok(and(left, right).into())
            }
            "OR" => {
                let left = self.evaluate(left)?.as_bool()?;
                if left == Some(true) {
                    return Ok(Value::Boolean(true));
                }
                let right = self.evaluate(right)?.as_bool()?;
                Ok(or(left, right).into())
            }
            "||" => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(concat(&left, &right))
            }
            _ => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                arithmetic(&operator, &left, &right)
            }
        }
    }
}

impl Default for Interpreter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn negate(value: Option<bool>, negated: bool) -> Option<bool> {
    if negated {
        value.map(|b| !b)
    } else {
        value
    }
}

fn relational(operator: &str, left: &Value, right: &Value) -> RResult<Value> {
    let Some(ordering) = left.compare(right)? else {
        return Ok(Value::Null);
    };
    let result = match operator {
        "=" => ordering.is_eq(),
        "<>" | "!=" | "^=" | "~=" => ordering.is_ne(),
        "<" => ordering.is_lt(),
        ">" => ordering.is_gt(),
        "<=" => ordering.is_le(),
        ">=" => ordering.is_ge(),
        other => return Err(RuntimeError::Unsupported(format!("operator {other}"))),
    };
    Ok(Value::Boolean(result))
}
