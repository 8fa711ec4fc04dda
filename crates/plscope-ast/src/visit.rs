//! Whole-tree traversal
//!
//! Implement [`Visitor`] and override the hooks you need; call the matching
//! `walk_*` function from an override to keep descending.

use crate::*;

pub trait Visitor<'ast> {
    fn visit_script(&mut self, script: &'ast Script) {
        walk_script(self, script);
    }

    fn visit_statement(&mut self, stmt: &'ast Statement) {
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        walk_expression(self, expr);
    }

    fn visit_declaration(&mut self, decl: &'ast Declaration) {
        walk_declaration(self, decl);
    }

    fn visit_body(&mut self, body: &'ast Body) {
        walk_body(self, body);
    }
}

pub fn walk_script<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, script: &'ast Script) {
    for stmt in &script.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_body<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, body: &'ast Body) {
    for stmt in &body.statements {
        visitor.visit_statement(stmt);
    }
}

fn walk_all<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, exprs: &'ast [Expression]) {
    for expr in exprs {
        visitor.visit_expression(expr);
    }
}

fn walk_opt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: Option<&'ast Expression>) {
    if let Some(expr) = expr {
        visitor.visit_expression(expr);
    }
}

fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, block: &'ast Block) {
    for decl in &block.declarations {
        visitor.visit_declaration(decl);
    }
    visitor.visit_body(&block.body);
    walk_handlers(visitor, &block.handlers);
}

fn walk_handlers<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, handlers: &'ast [ExceptionHandler]) {
    for handler in handlers {
        visitor.visit_body(&handler.body);
    }
}

fn walk_parameters<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, params: &'ast [Parameter]) {
    for param in params {
        walk_opt(visitor, param.default.as_ref());
    }
}

fn walk_procedure<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, proc: &'ast ProcedureDeclaration) {
    walk_parameters(visitor, &proc.parameters);
    for decl in &proc.declarations {
        visitor.visit_declaration(decl);
    }
    if let Some(body) = &proc.body {
        visitor.visit_body(body);
    }
    walk_handlers(visitor, &proc.handlers);
}

fn walk_function<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, func: &'ast FunctionDeclaration) {
    walk_parameters(visitor, &func.parameters);
    for decl in &func.declarations {
        visitor.visit_declaration(decl);
    }
    if let Some(body) = &func.body {
        visitor.visit_body(body);
    }
    walk_handlers(visitor, &func.handlers);
}

fn walk_case<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, case: &'ast CaseWhenStatement) {
    if let Some(selector) = &case.selector {
        visitor.visit_expression(selector);
    }
    for branch in &case.branches {
        visitor.visit_expression(&branch.condition);
        walk_case_result(visitor, &branch.result);
    }
    if let Some(result) = &case.else_result {
        walk_case_result(visitor, result);
    }
}

fn walk_case_result<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, result: &'ast CaseResult) {
    match result {
        CaseResult::Expression(expr) => visitor.visit_expression(expr),
        CaseResult::Statements(body) => visitor.visit_body(body),
    }
}

pub fn walk_statement<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Statement) {
    match &stmt.kind {
        StatementKind::Block(block) => walk_block(visitor, block),
        StatementKind::CreateProcedure(proc) => walk_procedure(visitor, proc),
        StatementKind::CreateFunction(func) => walk_function(visitor, func),
        StatementKind::CreatePackage(spec) => {
            for decl in &spec.declarations {
                visitor.visit_declaration(decl);
            }
        }
        StatementKind::CreatePackageBody(body) => {
            for decl in &body.declarations {
                visitor.visit_declaration(decl);
            }
            if let Some(init) = &body.initialization {
                visitor.visit_body(init);
            }
        }
        StatementKind::CreateType(_)
        | StatementKind::CreateNestTable(_)
        | StatementKind::CreateSynonym(_)
        | StatementKind::Commit
        | StatementKind::Rollback
        | StatementKind::Null => {}
        StatementKind::CreateTrigger(trigger) => {
            walk_opt(visitor, trigger.condition.as_ref());
            walk_block(visitor, &trigger.block);
        }
        StatementKind::Assignment { target, value } => {
            visitor.visit_expression(target);
            visitor.visit_expression(value);
        }
        StatementKind::If(if_stmt) => {
            for branch in &if_stmt.branches {
                visitor.visit_expression(&branch.condition);
                visitor.visit_body(&branch.body);
            }
            if let Some(else_body) = &if_stmt.else_body {
                visitor.visit_body(else_body);
            }
        }
        StatementKind::Loop(loop_stmt) => {
            match &loop_stmt.kind {
                LoopKind::Basic => {}
                LoopKind::While(cond) => visitor.visit_expression(cond),
                LoopKind::ForRange { low, high, .. } => {
                    visitor.visit_expression(low);
                    visitor.visit_expression(high);
                }
                LoopKind::ForCursor { source, .. } => visitor.visit_expression(source),
            }
            visitor.visit_body(&loop_stmt.body);
        }
        StatementKind::Open { cursor, arguments, query } => {
            visitor.visit_expression(cursor);
            walk_all(visitor, arguments);
            if let Some(query) = query {
                visitor.visit_statement(query);
            }
        }
        StatementKind::Close { cursor } => visitor.visit_expression(cursor),
        StatementKind::Fetch { cursor, targets, .. } => {
            visitor.visit_expression(cursor);
            walk_all(visitor, targets);
        }
        StatementKind::Exit { condition } | StatementKind::Continue { condition } => {
            walk_opt(visitor, condition.as_ref());
        }
        StatementKind::Call { callee, arguments } => {
            visitor.visit_expression(callee);
            walk_all(visitor, arguments);
        }
        StatementKind::Select(select) => {
            walk_all(visitor, &select.columns);
            walk_all(visitor, &select.into);
            walk_all(visitor, &select.from);
            walk_opt(visitor, select.where_clause.as_ref());
            walk_all(visitor, &select.group_by);
            walk_opt(visitor, select.having.as_ref());
            for item in &select.order_by {
                visitor.visit_expression(&item.expression);
            }
        }
        StatementKind::Update(update) => {
            visitor.visit_expression(&update.table);
            walk_all(visitor, &update.set);
            walk_opt(visitor, update.where_clause.as_ref());
        }
        StatementKind::Insert(insert) => {
            visitor.visit_expression(&insert.table);
            walk_all(visitor, &insert.columns);
            match &insert.source {
                InsertSource::Values(values) => walk_all(visitor, values),
                InsertSource::Query(query) => visitor.visit_statement(query),
            }
        }
        StatementKind::Delete(delete) => {
            visitor.visit_expression(&delete.table);
            walk_opt(visitor, delete.where_clause.as_ref());
        }
        StatementKind::Merge(merge) => {
            visitor.visit_expression(&merge.target);
            visitor.visit_expression(&merge.source);
            visitor.visit_expression(&merge.on);
            if let Some(matched) = &merge.matched {
                walk_all(visitor, &matched.set);
                walk_opt(visitor, matched.where_clause.as_ref());
            }
            if let Some(not_matched) = &merge.not_matched {
                walk_all(visitor, &not_matched.columns);
                walk_all(visitor, &not_matched.values);
            }
        }
        StatementKind::CaseWhen(case) => walk_case(visitor, case),
        StatementKind::Return { value } => walk_opt(visitor, value.as_ref()),
        StatementKind::Raise { exception } => walk_opt(visitor, exception.as_ref()),
    }
}

pub fn walk_expression<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expression) {
    match &expr.kind {
        ExpressionKind::Number(_)
        | ExpressionKind::String(_)
        | ExpressionKind::Boolean(_)
        | ExpressionKind::Null
        | ExpressionKind::Name(_)
        | ExpressionKind::Missing => {}
        ExpressionKind::Dot { parent, .. } => visitor.visit_expression(parent),
        ExpressionKind::Binary { left, right, .. }
        | ExpressionKind::Relational { left, right, .. } => {
            visitor.visit_expression(left);
            visitor.visit_expression(right);
        }
        ExpressionKind::UnaryLogical { operand, .. }
        | ExpressionKind::Sign { operand, .. }
        | ExpressionKind::Not(operand)
        | ExpressionKind::OuterJoin(operand) => visitor.visit_expression(operand),
        ExpressionKind::In { operand, elements, .. } => {
            visitor.visit_expression(operand);
            walk_all(visitor, elements);
        }
        ExpressionKind::Between { operand, low, high, .. } => {
            visitor.visit_expression(operand);
            visitor.visit_expression(low);
            visitor.visit_expression(high);
        }
        ExpressionKind::Like { operand, pattern, escape, .. } => {
            visitor.visit_expression(operand);
            visitor.visit_expression(pattern);
            walk_opt(visitor, escape.as_deref());
        }
        ExpressionKind::FunctionCall { arguments, .. } => walk_all(visitor, arguments),
        ExpressionKind::Call { callee, arguments } => {
            visitor.visit_expression(callee);
            walk_all(visitor, arguments);
        }
        ExpressionKind::Exists(stmt) | ExpressionKind::Statement(stmt) => {
            visitor.visit_statement(stmt)
        }
        ExpressionKind::CursorAttribute { cursor, .. } => visitor.visit_expression(cursor),
        ExpressionKind::Alias { expression, .. } => visitor.visit_expression(expression),
        ExpressionKind::List(elements) => walk_all(visitor, elements),
    }
}

pub fn walk_declaration<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, decl: &'ast Declaration) {
    match &decl.kind {
        DeclarationKind::Variable(var) => walk_opt(visitor, var.default.as_ref()),
        DeclarationKind::Cursor(cursor) => {
            walk_parameters(visitor, &cursor.parameters);
            if let Some(query) = &cursor.query {
                visitor.visit_statement(query);
            }
        }
        DeclarationKind::Function(func) => walk_function(visitor, func),
        DeclarationKind::Procedure(proc) => walk_procedure(visitor, proc),
        DeclarationKind::Exception { .. }
        | DeclarationKind::NestTableType(_)
        | DeclarationKind::RecordType(_)
        | DeclarationKind::AutonomousTransaction => {}
    }
}
