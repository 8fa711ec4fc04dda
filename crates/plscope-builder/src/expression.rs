//! Expression cascade folding
//!
//! Each cascade level with a single child defers to that child; a level with
//! an operator token builds its node with the operator text as written, upper
//! cased when it is a keyword.

use plscope_ast::{
    is_builtin_function, CaseResult, CaseWhenBranch, CaseWhenStatement, CursorAttributeKind,
    Expression, ExpressionKind, Span, Statement, StatementKind,
};
use plscope_lexer::{string_literal_text, TokenKind};
use plscope_parser::{SyntaxKind, SyntaxNode, SyntaxToken};

use crate::builder::{first_child, internal, name_of, required, BResult, Builder};

fn operator_text(token: &SyntaxToken) -> String {
    match token.keyword() {
        Some(keyword) => keyword,
        None => token.text.clone(),
    }
}

/// The operator token of a binary level: the only direct token
fn operator_of(node: &SyntaxNode) -> BResult<&SyntaxToken> {
    node.first_token()
        .ok_or_else(|| internal(node, format!("{:?} without operator", node.kind)))
}

impl<'s> Builder<'s> {
    pub fn build_expression(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        match node.kind {
            SyntaxKind::Expression => self.build_expression(first_child(node)?),
            SyntaxKind::LogicalExpression
            | SyntaxKind::RelationalExpression
            | SyntaxKind::Concatenation => self.build_binary_level(node),
            SyntaxKind::UnaryLogicalExpression => self.build_unary_logical(node),
            SyntaxKind::CompoundExpression => self.build_compound(node),
            SyntaxKind::UnaryExpression => self.build_unary(node),
            SyntaxKind::CaseExpression => {
                let case = self.build_case(node)?;
                Ok(statement_expression(node, StatementKind::CaseWhen(case)))
            }
            SyntaxKind::QuantifiedExpression => {
                let query = self.build_subquery(required(node, SyntaxKind::Subquery)?)?;
                Ok(Expression::new(
                    ExpressionKind::Exists(Box::new(query)),
                    node.span,
                    node.position,
                ))
            }
            SyntaxKind::Atom => self.build_atom(node),
            SyntaxKind::Subquery => {
                let query = self.build_subquery(node)?;
                Ok(Expression::new(
                    ExpressionKind::Statement(Box::new(query)),
                    node.span,
                    node.position,
                ))
            }
            SyntaxKind::GeneralElement => self.build_general_element(node),
            SyntaxKind::CursorAttribute => self.build_cursor_attribute(node),
            SyntaxKind::Literal => build_literal(node),
            other => {
                self.report(node, format!("expected expression, found {other:?}"));
                Ok(Expression::missing(node.span, node.position))
            }
        }
    }

    pub(crate) fn build_optional_expression(
        &mut self,
        node: Option<&SyntaxNode>,
    ) -> BResult<Option<Expression>> {
        node.map(|node| self.build_expression(node)).transpose()
    }

    pub(crate) fn build_expressions<'n>(
        &mut self,
        nodes: impl Iterator<Item = &'n SyntaxNode>,
    ) -> BResult<Vec<Expression>> {
        nodes.map(|node| self.build_expression(node)).collect()
    }

    /// `left op right` for the logical, relational and additive levels
    fn build_binary_level(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        if node.node_count() == 1 {
            return self.build_expression(first_child(node)?);
        }

        let mut operands = node.nodes();
        let (Some(left), Some(right)) = (operands.next(), operands.next()) else {
            return Err(internal(node, format!("{:?} without two operands", node.kind)));
        };
        let operator = operator_text(operator_of(node)?);
        let left = Box::new(self.build_expression(left)?);
        let right = Box::new(self.build_expression(right)?);

        let kind = if node.kind == SyntaxKind::RelationalExpression {
            ExpressionKind::Relational { operator, left, right }
        } else {
            ExpressionKind::Binary { operator, left, right }
        };
        Ok(Expression::new(kind, node.span, node.position))
    }

    fn build_unary_logical(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        let operand = first_child(node)?;

        if node.has_keyword("IS") {
            let operator = if node.has_keyword("NOT") { "IS NOT NULL" } else { "IS NULL" };
            let operand = self.build_expression(operand)?;
            return Ok(Expression::new(
                ExpressionKind::UnaryLogical {
                    operator: operator.to_string(),
                    operand: Box::new(operand),
                },
                node.span,
                node.position,
            ));
        }

        let inner = self.build_expression(operand)?;
        if node.has_keyword("NOT") {
            return Ok(Expression::new(
                ExpressionKind::Not(Box::new(inner)),
                node.span,
                node.position,
            ));
        }
        Ok(inner)
    }

    /// IN, BETWEEN and LIKE
    fn build_compound(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        let mut children = node.nodes();
        let operand = children
            .next()
            .ok_or_else(|| internal(node, "empty CompoundExpression"))?;
        if node.node_count() == 1 {
            return self.build_expression(operand);
        }

        let negated = node.has_keyword("NOT");
        let operand = Box::new(self.build_expression(operand)?);

        let kind = if node.has_keyword("IN") {
            let elements = required(node, SyntaxKind::InElements)?;
            ExpressionKind::In {
                negated,
                operand,
                elements: self.build_in_elements(elements)?,
            }
        } else if node.has_keyword("BETWEEN") {
            let (Some(low), Some(high)) = (children.next(), children.next()) else {
                return Err(internal(node, "BETWEEN without bounds"));
            };
            ExpressionKind::Between {
                negated,
                operand,
                low: Box::new(self.build_expression(low)?),
                high: Box::new(self.build_expression(high)?),
            }
        } else if node.has_keyword("LIKE") {
            let pattern = children
                .next()
                .ok_or_else(|| internal(node, "LIKE without pattern"))?;
            let pattern = Box::new(self.build_expression(pattern)?);
            let escape = match children.next() {
                Some(escape) => Some(Box::new(self.build_expression(escape)?)),
                None => None,
            };
            ExpressionKind::Like { negated, operand, pattern, escape }
        } else {
            return Err(internal(node, "CompoundExpression without operator"));
        };

        Ok(Expression::new(kind, node.span, node.position))
    }

    fn build_in_elements(&mut self, node: &SyntaxNode) -> BResult<Vec<Expression>> {
        if let Some(select) = node.child(SyntaxKind::SelectStatement) {
            let query = self.build_select(select)?;
            return Ok(vec![statement_expression(select, query.kind)]);
        }
        self.build_expressions(node.children_of(SyntaxKind::Expression))
    }

    fn build_unary(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        let inner = first_child(node)?;
        match node.first_token() {
            Some(sign) if matches!(sign.kind, TokenKind::Plus | TokenKind::Minus) => {
                let operand = self.build_expression(inner)?;
                Ok(Expression::new(
                    ExpressionKind::Sign {
                        operator: sign.text.clone(),
                        operand: Box::new(operand),
                    },
                    node.span,
                    node.position,
                ))
            }
            _ => self.build_expression(inner),
        }
    }

    fn build_atom(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        let inner = first_child(node)?;
        match inner.kind {
            SyntaxKind::ExpressionList => {
                let mut elements = self.build_expressions(inner.children_of(SyntaxKind::Expression))?;
                if elements.len() == 1 {
                    // Parentheses only group
                    if let Some(element) = elements.pop() {
                        return Ok(element);
                    }
                }
                Ok(Expression::new(ExpressionKind::List(elements), inner.span, inner.position))
            }
            SyntaxKind::GeneralElement if node.child(SyntaxKind::OuterJoinSign).is_some() => {
                let element = self.build_general_element(inner)?;
                Ok(Expression::new(
                    ExpressionKind::OuterJoin(Box::new(element)),
                    node.span,
                    node.position,
                ))
            }
            _ => self.build_expression(inner),
        }
    }

    /// Folds `a.b(x).c` left to right: the leftmost part is the innermost base
    pub(crate) fn build_general_element(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        let parts: Vec<&SyntaxNode> = node.children_of(SyntaxKind::GeneralElementPart).collect();
        let last = parts.len().saturating_sub(1);
        let mut folded: Option<Expression> = None;

        for (index, part) in parts.iter().enumerate() {
            let name = part_name(part)?;
            let span = Span::new(node.span.start, part.span.end);
            let kind = match folded.take() {
                None => ExpressionKind::Name(name),
                Some(parent) => ExpressionKind::Dot { name, parent: Box::new(parent) },
            };
            let mut expr = Expression::new(kind, span, node.position);

            if let Some(arguments) = part.child(SyntaxKind::FunctionArgument) {
                if index == last {
                    expr = self.build_call(expr, arguments, span)?;
                } else {
                    self.report(arguments, "unsupported: call arguments on a qualified name prefix");
                }
            }
            folded = Some(expr);
        }

        let mut expr = folded.ok_or_else(|| internal(node, "GeneralElement without parts"))?;
        if node.token(TokenKind::Star).is_some() {
            expr = Expression::new(
                ExpressionKind::Dot { name: "*".to_string(), parent: Box::new(expr) },
                node.span,
                node.position,
            );
        }
        Ok(expr)
    }

    fn build_call(
        &mut self,
        callee: Expression,
        arguments: &SyntaxNode,
        span: Span,
    ) -> BResult<Expression> {
        let mut args = Vec::new();
        for argument in arguments.children_of(SyntaxKind::Argument) {
            args.push(self.build_argument(argument)?);
        }

        let position = callee.position;
        let builtin = match &callee.kind {
            ExpressionKind::Name(name) if is_builtin_function(name) => Some(name.to_ascii_uppercase()),
            _ => None,
        };
        let kind = match builtin {
            Some(name) => ExpressionKind::FunctionCall { name, arguments: args },
            None => ExpressionKind::Call {
                callee: Box::new(callee),
                arguments: args,
            },
        };
        Ok(Expression::new(kind, span, position))
    }

    /// `*` becomes a name, `name => value` an alias of the value
    fn build_argument(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        if node.token(TokenKind::Star).is_some() {
            return Ok(Expression::name("*", node.span, node.position));
        }
        let value = self.build_expression(required(node, SyntaxKind::Expression)?)?;
        if node.token(TokenKind::Arrow).is_none() {
            return Ok(value);
        }
        let alias = node
            .words()
            .next()
            .map(name_of)
            .ok_or_else(|| internal(node, "named argument without a name"))?;
        Ok(Expression::new(
            ExpressionKind::Alias { expression: Box::new(value), alias },
            node.span,
            node.position,
        ))
    }

    fn build_cursor_attribute(&mut self, node: &SyntaxNode) -> BResult<Expression> {
        let cursor = self.build_general_element(required(node, SyntaxKind::GeneralElement)?)?;
        let attribute = node
            .words()
            .last()
            .ok_or_else(|| internal(node, "cursor attribute without a name"))?;

        match CursorAttributeKind::from_name(&attribute.text) {
            Some(attribute) => Ok(Expression::new(
                ExpressionKind::CursorAttribute { cursor: Box::new(cursor), attribute },
                node.span,
                node.position,
            )),
            None => {
                self.report(node, format!("unsupported: cursor attribute %{}", attribute.text.to_ascii_uppercase()));
                Ok(Expression::missing(node.span, node.position))
            }
        }
    }

    pub(crate) fn build_subquery(&mut self, node: &SyntaxNode) -> BResult<Statement> {
        self.build_select(required(node, SyntaxKind::SelectStatement)?)
    }

    /// CASE as an expression or a statement
    pub(crate) fn build_case(&mut self, node: &SyntaxNode) -> BResult<CaseWhenStatement> {
        let selector = match node.first_node() {
            Some(first) if first.kind == SyntaxKind::Expression => {
                Some(Box::new(self.build_expression(first)?))
            }
            _ => None,
        };

        let mut branches = Vec::new();
        for part in node.children_of(SyntaxKind::CaseWhenPart) {
            let mut children = part.nodes();
            let (Some(condition), Some(result)) = (children.next(), children.next()) else {
                return Err(internal(part, "WHEN without condition and result"));
            };
            branches.push(CaseWhenBranch {
                condition: self.build_expression(condition)?,
                result: self.build_case_result(result)?,
            });
        }

        let else_result = match node.child(SyntaxKind::CaseElsePart) {
            Some(part) => Some(self.build_case_result(first_child(part)?)?),
            None => None,
        };

        Ok(CaseWhenStatement { selector, branches, else_result })
    }

    fn build_case_result(&mut self, node: &SyntaxNode) -> BResult<CaseResult> {
        if node.kind == SyntaxKind::SeqOfStatements {
            Ok(CaseResult::Statements(self.build_seq(node)?))
        } else {
            Ok(CaseResult::Expression(Box::new(self.build_expression(node)?)))
        }
    }
}

fn statement_expression(node: &SyntaxNode, kind: StatementKind) -> Expression {
    let stmt = Statement::new(kind, node.span, node.position);
    Expression::new(ExpressionKind::Statement(Box::new(stmt)), node.span, node.position)
}

fn part_name(part: &SyntaxNode) -> BResult<String> {
    let word = part
        .words()
        .next()
        .ok_or_else(|| internal(part, "name part without identifier"))?;
    let name = name_of(word);
    if part.token(TokenKind::Colon).is_some() {
        Ok(format!(":{name}"))
    } else {
        Ok(name)
    }
}

fn build_literal(node: &SyntaxNode) -> BResult<Expression> {
    let token = node
        .first_token()
        .ok_or_else(|| internal(node, "empty literal"))?;
    let kind = match token.kind {
        TokenKind::Int | TokenKind::Float => ExpressionKind::Number(token.text.clone()),
        TokenKind::String => ExpressionKind::String(string_literal_text(&token.text)),
        _ if token.is_keyword("NULL") => ExpressionKind::Null,
        _ if token.is_keyword("TRUE") => ExpressionKind::Boolean(true),
        _ if token.is_keyword("FALSE") => ExpressionKind::Boolean(false),
        _ => return Err(internal(node, format!("unexpected literal {}", token.text))),
    };
    Ok(Expression::new(kind, node.span, node.position))
}
