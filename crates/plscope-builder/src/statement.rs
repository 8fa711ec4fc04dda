//! Statement builders: units, control flow and SQL

use plscope_ast::{
    Block, Body, ConditionalBranch, CreateNestTableStatement, DeleteStatement, ExceptionHandler,
    Expression, ExpressionKind, IfStatement, InsertSource, InsertStatement, LoopKind,
    LoopStatement, MergeInsert, MergeStatement, MergeUpdate, OrderItem, SelectStatement,
    Statement, StatementKind, SynonymDeclaration, TriggerDeclaration, TriggerEvent,
    TriggerTiming, TypeDeclaration, TypeDefinition, UpdateStatement,
};
use plscope_lexer::TokenKind;
use plscope_parser::{SyntaxKind, SyntaxNode};

use crate::builder::{first_child, internal, leading_name, name_of, required, BResult, Builder};

impl<'s> Builder<'s> {
    pub(crate) fn build_unit(&mut self, node: &SyntaxNode) -> BResult<Statement> {
        let kind = match node.kind {
            SyntaxKind::CreateProcedure => StatementKind::CreateProcedure(self.build_procedure(node)?),
            SyntaxKind::CreateFunction => StatementKind::CreateFunction(self.build_function(node)?),
            SyntaxKind::CreatePackage => StatementKind::CreatePackage(self.build_package_spec(node)?),
            SyntaxKind::CreatePackageBody => {
                StatementKind::CreatePackageBody(self.build_package_body(node)?)
            }
            SyntaxKind::CreateType => self.build_create_type(node)?,
            SyntaxKind::CreateSynonym => {
                let mut names = node.children_of(SyntaxKind::ObjectName);
                let (Some(name), Some(target)) = (names.next(), names.next()) else {
                    return Err(internal(node, "synonym without name and target"));
                };
                StatementKind::CreateSynonym(SynonymDeclaration {
                    name: self.build_object_name(name)?,
                    public: node.has_keyword("PUBLIC"),
                    target: self.build_object_name(target)?,
                })
            }
            SyntaxKind::CreateTrigger => StatementKind::CreateTrigger(self.build_trigger(node)?),
            _ => return self.build_statement(node),
        };
        Ok(Statement::new(kind, node.span, node.position))
    }

    fn build_create_type(&mut self, node: &SyntaxNode) -> BResult<StatementKind> {
        let name = self.build_object_name(required(node, SyntaxKind::ObjectName)?)?;

        if node.has_keyword("TABLE") {
            let element_type = self.build_data_type(required(node, SyntaxKind::TypeSpec)?)?;
            return Ok(StatementKind::CreateNestTable(CreateNestTableStatement { name, element_type }));
        }

        let definition = if node.has_keyword("OBJECT") {
            TypeDefinition::Object(self.build_fields(node)?)
        } else {
            let limit = node
                .token(TokenKind::Int)
                .map(|token| token.text.clone())
                .ok_or_else(|| internal(node, "VARRAY without a limit"))?;
            TypeDefinition::Varray {
                limit,
                element_type: self.build_data_type(required(node, SyntaxKind::TypeSpec)?)?,
            }
        };
        Ok(StatementKind::CreateType(TypeDeclaration { name, definition }))
    }

    fn build_trigger(&mut self, node: &SyntaxNode) -> BResult<TriggerDeclaration> {
        let mut names = node.children_of(SyntaxKind::ObjectName);
        let (Some(name), Some(table)) = (names.next(), names.next()) else {
            return Err(internal(node, "trigger without name and table"));
        };

        let timing = if node.has_keyword("INSTEAD") {
            TriggerTiming::InsteadOf
        } else if node.has_keyword("BEFORE") {
            TriggerTiming::Before
        } else {
            TriggerTiming::After
        };

        let events = node
            .children_of(SyntaxKind::TriggerEvent)
            .map(|event| {
                if event.has_keyword("UPDATE") {
                    let columns = event
                        .after_keyword("OF")
                        .filter_map(|element| element.as_token())
                        .filter(|token| token.kind.is_word())
                        .map(name_of)
                        .collect();
                    TriggerEvent::Update { columns }
                } else if event.has_keyword("INSERT") {
                    TriggerEvent::Insert
                } else {
                    TriggerEvent::Delete
                }
            })
            .collect();

        let condition = self.build_optional_expression(node.child(SyntaxKind::Expression))?;
        let block = self.build_block(required(node, SyntaxKind::Block)?)?;

        Ok(TriggerDeclaration {
            name: self.build_object_name(name)?,
            timing,
            events,
            table: self.build_object_name(table)?,
            for_each_row: node.has_keyword("EACH"),
            condition,
            block,
        })
    }

    pub fn build_statement(&mut self, node: &SyntaxNode) -> BResult<Statement> {
        let kind = match node.kind {
            SyntaxKind::Block => StatementKind::Block(self.build_block(node)?),
            SyntaxKind::AssignmentStatement => {
                let target = self.build_general_element(required(node, SyntaxKind::GeneralElement)?)?;
                let target = self.check_assignment_target(node, target);
                let value = self.build_expression(required(node, SyntaxKind::Expression)?)?;
                StatementKind::Assignment { target, value }
            }
            SyntaxKind::IfStatement => StatementKind::If(self.build_if(node)?),
            SyntaxKind::LoopStatement => StatementKind::Loop(self.build_loop(node)?),
            SyntaxKind::ExitStatement => StatementKind::Exit {
                condition: self.build_optional_expression(node.child(SyntaxKind::Expression))?,
            },
            SyntaxKind::ContinueStatement => StatementKind::Continue {
                condition: self.build_optional_expression(node.child(SyntaxKind::Expression))?,
            },
            SyntaxKind::OpenStatement => {
                let element = self.build_general_element(required(node, SyntaxKind::GeneralElement)?)?;
                let (cursor, arguments) = split_call(element);
                let query = match node.child(SyntaxKind::SelectStatement) {
                    Some(select) => Some(Box::new(self.build_select(select)?)),
                    None => None,
                };
                StatementKind::Open { cursor, arguments, query }
            }
            SyntaxKind::CloseStatement => StatementKind::Close {
                cursor: self.build_general_element(required(node, SyntaxKind::GeneralElement)?)?,
            },
            SyntaxKind::FetchStatement => {
                let into = required(node, SyntaxKind::IntoClause)?;
                StatementKind::Fetch {
                    cursor: self.build_general_element(required(node, SyntaxKind::GeneralElement)?)?,
                    targets: self.build_expressions(into.children_of(SyntaxKind::GeneralElement))?,
                    bulk_collect: into.has_keyword("BULK"),
                }
            }
            SyntaxKind::ReturnStatement => StatementKind::Return {
                value: self.build_optional_expression(node.child(SyntaxKind::Expression))?,
            },
            SyntaxKind::RaiseStatement => StatementKind::Raise {
                exception: self.build_optional_expression(node.child(SyntaxKind::GeneralElement))?,
            },
            SyntaxKind::NullStatement => StatementKind::Null,
            SyntaxKind::CommitStatement => StatementKind::Commit,
            SyntaxKind::RollbackStatement => StatementKind::Rollback,
            SyntaxKind::CallStatement => {
                let element = self.build_general_element(required(node, SyntaxKind::GeneralElement)?)?;
                let (callee, arguments) = split_call(element);
                StatementKind::Call { callee, arguments }
            }
            SyntaxKind::CaseStatement => StatementKind::CaseWhen(self.build_case(node)?),
            SyntaxKind::SelectStatement => return self.build_select(node),
            SyntaxKind::UpdateStatement => StatementKind::Update(self.build_update(node)?),
            SyntaxKind::InsertStatement => StatementKind::Insert(self.build_insert(node)?),
            SyntaxKind::DeleteStatement => StatementKind::Delete(DeleteStatement {
                table: self.build_table_ref(required(node, SyntaxKind::TableRef)?)?,
                where_clause: self.build_where(node)?,
            }),
            SyntaxKind::MergeStatement => StatementKind::Merge(self.build_merge(node)?),
            other => return Err(internal(node, format!("{other:?} in statement position"))),
        };
        Ok(Statement::new(kind, node.span, node.position))
    }

    /// Only names and qualified names can be assigned to
    fn check_assignment_target(&mut self, node: &SyntaxNode, target: Expression) -> Expression {
        match target.kind {
            ExpressionKind::Name(_) | ExpressionKind::Dot { .. } => target,
            _ => {
                self.report(node, "invalid assignment target");
                Expression::missing(target.span, target.position)
            }
        }
    }

    // === Blocks ===

    pub(crate) fn build_block(&mut self, node: &SyntaxNode) -> BResult<Block> {
        let declarations = match node.child(SyntaxKind::DeclareSection) {
            Some(section) => self.build_declarations(section)?,
            None => Vec::new(),
        };
        let (body, handlers) = self.build_body(required(node, SyntaxKind::Body)?)?;
        Ok(Block { declarations, body, handlers })
    }

    /// `BEGIN ... EXCEPTION ... END` split into statements and handlers
    pub(crate) fn build_body(&mut self, node: &SyntaxNode) -> BResult<(Body, Vec<ExceptionHandler>)> {
        let seq = required(node, SyntaxKind::SeqOfStatements)?;
        let statements = self.build_statements(seq)?;
        let body = Body::new(statements, node.span, node.position);

        let mut handlers = Vec::new();
        for handler in node.children_of(SyntaxKind::ExceptionHandler) {
            handlers.push(self.build_handler(handler)?);
        }
        Ok((body, handlers))
    }

    fn build_handler(&mut self, node: &SyntaxNode) -> BResult<ExceptionHandler> {
        // WHEN a OR b THEN
        let words: Vec<_> = node.words().collect();
        let names = words.get(1..words.len().saturating_sub(1)).unwrap_or_default();
        let exceptions = names
            .iter()
            .step_by(2)
            .map(|token| name_of(token).to_ascii_uppercase())
            .collect();
        Ok(ExceptionHandler {
            exceptions,
            body: self.build_seq(required(node, SyntaxKind::SeqOfStatements)?)?,
            span: node.span,
            position: node.position,
        })
    }

    fn build_statements(&mut self, seq: &SyntaxNode) -> BResult<Vec<Statement>> {
        let mut statements = Vec::new();
        for stmt in seq.nodes() {
            statements.push(self.build_statement(stmt)?);
        }
        Ok(statements)
    }

    pub(crate) fn build_seq(&mut self, seq: &SyntaxNode) -> BResult<Body> {
        let statements = self.build_statements(seq)?;
        Ok(Body::new(statements, seq.span, seq.position))
    }

    // === Control flow ===

    fn build_if(&mut self, node: &SyntaxNode) -> BResult<IfStatement> {
        let mut branches = vec![ConditionalBranch {
            condition: self.build_expression(required(node, SyntaxKind::Expression)?)?,
            body: self.build_seq(required(node, SyntaxKind::SeqOfStatements)?)?,
        }];

        for part in node.children_of(SyntaxKind::ElsifPart) {
            branches.push(ConditionalBranch {
                condition: self.build_expression(required(part, SyntaxKind::Expression)?)?,
                body: self.build_seq(required(part, SyntaxKind::SeqOfStatements)?)?,
            });
        }

        let else_body = match node.child(SyntaxKind::ElsePart) {
            Some(part) => Some(self.build_seq(required(part, SyntaxKind::SeqOfStatements)?)?),
            None => None,
        };

        Ok(IfStatement { branches, else_body })
    }

    fn build_loop(&mut self, node: &SyntaxNode) -> BResult<LoopStatement> {
        let label = match node.child(SyntaxKind::Label) {
            Some(label) => Some(leading_name(label, &[])?),
            None => None,
        };

        let kind = if node.has_keyword("WHILE") {
            LoopKind::While(self.build_expression(required(node, SyntaxKind::Expression)?)?)
        } else if node.has_keyword("FOR") {
            let variable = node
                .after_keyword("FOR")
                .find_map(|element| element.as_token())
                .map(name_of)
                .ok_or_else(|| internal(node, "FOR loop without a variable"))?;

            if node.token(TokenKind::DotDot).is_some() {
                let mut bounds = node.children_of(SyntaxKind::Expression);
                let (Some(low), Some(high)) = (bounds.next(), bounds.next()) else {
                    return Err(internal(node, "range loop without bounds"));
                };
                LoopKind::ForRange {
                    variable,
                    reverse: node.has_keyword("REVERSE"),
                    low: self.build_expression(low)?,
                    high: self.build_expression(high)?,
                }
            } else {
                let source = match node.child(SyntaxKind::Subquery) {
                    Some(subquery) => self.build_expression(subquery)?,
                    None => self.build_expression(required(node, SyntaxKind::Expression)?)?,
                };
                LoopKind::ForCursor { record: variable, source }
            }
        } else {
            LoopKind::Basic
        };

        let body = self.build_seq(required(node, SyntaxKind::SeqOfStatements)?)?;
        Ok(LoopStatement { label, kind, body })
    }

    // === SQL ===

    pub(crate) fn build_select(&mut self, node: &SyntaxNode) -> BResult<Statement> {
        let columns = if node.token(TokenKind::Star).is_some() {
            vec![Expression::name("*", node.span, node.position)]
        } else {
            let mut columns = Vec::new();
            for element in node.children_of(SyntaxKind::SelectListElement) {
                columns.push(self.build_aliased(element)?);
            }
            columns
        };

        let (into, bulk_collect) = match node.child(SyntaxKind::IntoClause) {
            Some(into) => (
                self.build_expressions(into.children_of(SyntaxKind::GeneralElement))?,
                into.has_keyword("BULK"),
            ),
            None => (Vec::new(), false),
        };

        let mut from = Vec::new();
        for table in required(node, SyntaxKind::FromClause)?.children_of(SyntaxKind::TableRef) {
            from.push(self.build_table_ref(table)?);
        }

        let group_by = match node.child(SyntaxKind::GroupByClause) {
            Some(group) => self.build_expressions(group.children_of(SyntaxKind::Expression))?,
            None => Vec::new(),
        };
        let having = match node.child(SyntaxKind::HavingClause) {
            Some(having) => Some(self.build_expression(required(having, SyntaxKind::Expression)?)?),
            None => None,
        };

        let mut order_by = Vec::new();
        if let Some(order) = node.child(SyntaxKind::OrderByClause) {
            for item in order.children_of(SyntaxKind::OrderByElement) {
                order_by.push(OrderItem {
                    expression: self.build_expression(required(item, SyntaxKind::Expression)?)?,
                    descending: item.has_keyword("DESC"),
                });
            }
        }

        let select = SelectStatement {
            distinct: node.has_keyword("DISTINCT") || node.has_keyword("UNIQUE"),
            columns,
            bulk_collect,
            into,
            from,
            where_clause: self.build_where(node)?,
            group_by,
            having,
            order_by,
        };
        Ok(Statement::new(StatementKind::Select(select), node.span, node.position))
    }

    /// A select-list element, wrapped in an alias when one follows
    fn build_aliased(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        let expr = self.build_expression(first_child(node)?)?;
        match node.words().filter(|token| !token.is_keyword("AS")).last() {
            Some(alias) => Ok(Expression::new(
                ExpressionKind::Alias { expression: Box::new(expr), alias: name_of(alias) },
                node.span,
                node.position,
            )),
            None => Ok(expr),
        }
    }

    fn build_table_ref(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        let source = first_child(node)?;
        let table = self.build_expression(source)?;
        // A database link is not an alias
        let alias = match node.token(TokenKind::At) {
            Some(_) => None,
            None => node.words().last(),
        };
        match alias {
            Some(alias) => Ok(Expression::new(
                ExpressionKind::Alias { expression: Box::new(table), alias: name_of(alias) },
                node.span,
                node.position,
            )),
            None => Ok(table),
        }
    }

    fn build_where(&mut self, node: &SyntaxNode) -> BResult<Option<Expression>> {
        match node.child(SyntaxKind::WhereClause) {
            Some(clause) => Ok(Some(self.build_expression(first_child(clause)?)?)),
            None => Ok(None),
        }
    }

    fn build_update(&mut self, node: &SyntaxNode) -> BResult<UpdateStatement> {
        Ok(UpdateStatement {
            table: self.build_table_ref(required(node, SyntaxKind::TableRef)?)?,
            set: self.build_set_clause(required(node, SyntaxKind::UpdateSetClause)?)?,
            where_clause: self.build_where(node)?,
        })
    }

    /// Each `col = value` item becomes a binary `=` whose left side is a
    /// name, or a list for `(a, b) = (subquery)`.
    fn build_set_clause(&mut self, node: &SyntaxNode) -> BResult<Vec<Expression>> {
        let mut items = Vec::new();
        for item in node.children_of(SyntaxKind::ColumnBasedUpdateSet) {
            let left = match item.child(SyntaxKind::ColumnList) {
                Some(columns) => Expression::new(
                    ExpressionKind::List(self.build_expressions(columns.children_of(SyntaxKind::GeneralElement))?),
                    columns.span,
                    columns.position,
                ),
                None => self.build_general_element(required(item, SyntaxKind::GeneralElement)?)?,
            };
            let right = self.build_expression(required(item, SyntaxKind::Expression)?)?;
            items.push(Expression::new(
                ExpressionKind::Binary {
                    operator: "=".to_string(),
                    left: Box::new(left),
                    right: Box::new(right),
                },
                item.span,
                item.position,
            ));
        }
        Ok(items)
    }

    fn build_insert(&mut self, node: &SyntaxNode) -> BResult<InsertStatement> {
        let columns = match node.child(SyntaxKind::ColumnList) {
            Some(columns) => self.build_expressions(columns.children_of(SyntaxKind::GeneralElement))?,
            None => Vec::new(),
        };

        let source = if let Some(values) = node.child(SyntaxKind::ValuesClause) {
            InsertSource::Values(self.build_expressions(values.children_of(SyntaxKind::Expression))?)
        } else if let Some(subquery) = node.child(SyntaxKind::Subquery) {
            InsertSource::Query(Box::new(self.build_subquery(subquery)?))
        } else {
            InsertSource::Query(Box::new(self.build_select(required(node, SyntaxKind::SelectStatement)?)?))
        };

        Ok(InsertStatement {
            table: self.build_table_ref(required(node, SyntaxKind::TableRef)?)?,
            columns,
            source,
        })
    }

    fn build_merge(&mut self, node: &SyntaxNode) -> BResult<MergeStatement> {
        let mut tables = node.children_of(SyntaxKind::TableRef);
        let (Some(target), Some(source)) = (tables.next(), tables.next()) else {
            return Err(internal(node, "MERGE without target and source"));
        };

        let matched = match node.child(SyntaxKind::MergeUpdateClause) {
            Some(clause) => Some(MergeUpdate {
                set: self.build_set_clause(required(clause, SyntaxKind::UpdateSetClause)?)?,
                where_clause: self.build_where(clause)?,
            }),
            None => None,
        };
        let not_matched = match node.child(SyntaxKind::MergeInsertClause) {
            Some(clause) => Some(MergeInsert {
                columns: match clause.child(SyntaxKind::ColumnList) {
                    Some(columns) => self.build_expressions(columns.children_of(SyntaxKind::GeneralElement))?,
                    None => Vec::new(),
                },
                values: self.build_expressions(
                    required(clause, SyntaxKind::ValuesClause)?.children_of(SyntaxKind::Expression),
                )?,
            }),
            None => None,
        };

        Ok(MergeStatement {
            target: self.build_table_ref(target)?,
            source: self.build_table_ref(source)?,
            on: self.build_expression(required(node, SyntaxKind::Expression)?)?,
            matched,
            not_matched,
        })
    }
}

/// Separates a trailing call into callee and arguments
fn split_call(element: Expression) -> (Expression, Vec<Expression>) {
    let Expression { kind, span, position } = element;
    match kind {
        ExpressionKind::Call { callee, arguments } => (*callee, arguments),
        ExpressionKind::FunctionCall { name, arguments } => {
            (Expression::name(name, span, position), arguments)
        }
        kind => (Expression::new(kind, span, position), Vec::new()),
    }
}
