//! Expression productions
//!
//! Precedence, loosest first: OR, AND, NOT / IS NULL, relational operators,
//! IN / BETWEEN / LIKE, `+ - ||`, `* /`, unary sign, atoms. Every level is
//! kept as its own node even with a single child.

use plscope_lexer::TokenKind;

use crate::parser::{PResult, Parser};
use crate::{SyntaxKind, SyntaxNode};

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> PResult<SyntaxNode> {
        let logical = self.parse_logical_or()?;
        Ok(self.wrap(SyntaxKind::Expression, logical))
    }

    fn parse_logical_or(&mut self) -> PResult<SyntaxNode> {
        let mut left = self.parse_logical_and()?;
        while self.at_keyword("OR") {
            let mut node = self.start_with(SyntaxKind::LogicalExpression, left);
            self.bump(&mut node);
            node.push(self.parse_logical_and()?);
            left = self.finish(node);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> PResult<SyntaxNode> {
        let mut left = self.parse_logical_operand()?;
        while self.at_keyword("AND") {
            let mut node = self.start_with(SyntaxKind::LogicalExpression, left);
            self.bump(&mut node);
            node.push(self.parse_logical_operand()?);
            left = self.finish(node);
        }
        Ok(left)
    }

    fn parse_logical_operand(&mut self) -> PResult<SyntaxNode> {
        let unary = self.parse_unary_logical()?;
        Ok(self.wrap(SyntaxKind::LogicalExpression, unary))
    }

    fn parse_unary_logical(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::UnaryLogicalExpression);
        if self.eat_keyword(&mut node, "NOT") {
            node.push(self.parse_unary_logical()?);
            return Ok(self.finish(node));
        }

        node.push(self.parse_relational()?);
        if self.eat_keyword(&mut node, "IS") {
            self.eat_keyword(&mut node, "NOT");
            self.expect_keyword(&mut node, "NULL")?;
        }
        Ok(self.finish(node))
    }

    fn parse_relational(&mut self) -> PResult<SyntaxNode> {
        let compound = self.parse_compound()?;
        let mut left = self.wrap(SyntaxKind::RelationalExpression, compound);
        while self.peek().is_relational() {
            let mut node = self.start_with(SyntaxKind::RelationalExpression, left);
            self.bump(&mut node);
            let compound = self.parse_compound()?;
            node.push(self.wrap(SyntaxKind::RelationalExpression, compound));
            left = self.finish(node);
        }
        Ok(left)
    }

    fn parse_compound(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::CompoundExpression);
        node.push(self.parse_concatenation()?);

        let negated = self.at_keyword("NOT")
            && (self.keyword_ahead_is(1, "IN")
                || self.keyword_ahead_is(1, "BETWEEN")
                || self.keyword_ahead_is(1, "LIKE"));
        if negated {
            self.bump(&mut node);
        }

        if self.eat_keyword(&mut node, "IN") {
            node.push(self.parse_in_elements()?);
        } else if self.eat_keyword(&mut node, "BETWEEN") {
            node.push(self.parse_concatenation()?);
            self.expect_keyword(&mut node, "AND")?;
            node.push(self.parse_concatenation()?);
        } else if self.eat_keyword(&mut node, "LIKE") {
            node.push(self.parse_concatenation()?);
            if self.eat_keyword(&mut node, "ESCAPE") {
                node.push(self.parse_concatenation()?);
            }
        }
        Ok(self.finish(node))
    }

    fn parse_in_elements(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::InElements);
        self.expect(&mut node, TokenKind::LParen)?;
        if self.at_keyword("SELECT") {
            node.push(self.parse_select()?);
        } else {
            node.push(self.parse_expression()?);
            while self.eat(&mut node, TokenKind::Comma) {
                node.push(self.parse_expression()?);
            }
        }
        self.expect(&mut node, TokenKind::RParen)?;
        Ok(self.finish(node))
    }

    /// Additive level: `+`, `-` and `||`
    fn parse_concatenation(&mut self) -> PResult<SyntaxNode> {
        let mut left = self.parse_multiplicative()?;
        while matches!(self.peek(), TokenKind::Plus | TokenKind::Minus | TokenKind::Concat) {
            let mut node = self.start_with(SyntaxKind::Concatenation, left);
            self.bump(&mut node);
            node.push(self.parse_multiplicative()?);
            left = self.finish(node);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<SyntaxNode> {
        let unary = self.parse_unary()?;
        let mut left = self.wrap(SyntaxKind::Concatenation, unary);
        while matches!(self.peek(), TokenKind::Star | TokenKind::Slash) || self.at_keyword("MOD") {
            let mut node = self.start_with(SyntaxKind::Concatenation, left);
            self.bump(&mut node);
            let unary = self.parse_unary()?;
            node.push(self.wrap(SyntaxKind::Concatenation, unary));
            left = self.finish(node);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::UnaryExpression);
        if matches!(self.peek(), TokenKind::Plus | TokenKind::Minus) {
            self.bump(&mut node);
            node.push(self.parse_unary()?);
        } else if self.at_keyword("CASE") {
            node.push(self.parse_case(false)?);
        } else if self.at_keyword("EXISTS") {
            let mut quantified = self.start(SyntaxKind::QuantifiedExpression);
            self.bump(&mut quantified);
            quantified.push(self.parse_subquery()?);
            node.push(self.finish(quantified));
        } else {
            node.push(self.parse_atom()?);
        }
        Ok(self.finish(node))
    }

    fn parse_atom(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::Atom);

        let is_literal = matches!(self.peek(), TokenKind::Int | TokenKind::Float | TokenKind::String)
            || self.at_any_keyword(&["NULL", "TRUE", "FALSE"]);
        if is_literal {
            let mut literal = self.start(SyntaxKind::Literal);
            self.bump(&mut literal);
            node.push(self.finish(literal));
            return Ok(self.finish(node));
        }

        if self.at(TokenKind::LParen) {
            if self.keyword_ahead_is(1, "SELECT") {
                node.push(self.parse_subquery()?);
            } else {
                let mut list = self.start(SyntaxKind::ExpressionList);
                self.bump(&mut list);
                list.push(self.parse_expression()?);
                while self.eat(&mut list, TokenKind::Comma) {
                    list.push(self.parse_expression()?);
                }
                self.expect(&mut list, TokenKind::RParen)?;
                node.push(self.finish(list));
            }
            return Ok(self.finish(node));
        }

        if !self.at_identifier() && !self.at(TokenKind::Colon) {
            return Err(self.error_here("expression"));
        }

        let element = self.parse_general_element()?;
        if self.at(TokenKind::Percent) {
            let mut attribute = self.start_with(SyntaxKind::CursorAttribute, element);
            self.bump(&mut attribute);
            self.expect_word(&mut attribute)?;
            node.push(self.finish(attribute));
        } else {
            node.push(element);
            if self.at_outer_join_sign() {
                let mut sign = self.start(SyntaxKind::OuterJoinSign);
                self.bump(&mut sign);
                self.bump(&mut sign);
                self.bump(&mut sign);
                node.push(self.finish(sign));
            }
        }
        Ok(self.finish(node))
    }

    fn at_outer_join_sign(&self) -> bool {
        self.at(TokenKind::LParen)
            && self.peek_ahead(1) == TokenKind::Plus
            && self.peek_ahead(2) == TokenKind::RParen
    }

    pub(crate) fn parse_subquery(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::Subquery);
        self.expect(&mut node, TokenKind::LParen)?;
        node.push(self.parse_select()?);
        self.expect(&mut node, TokenKind::RParen)?;
        Ok(self.finish(node))
    }

    /// Dotted chain of parts, each optionally called: `pkg.proc(1).field`
    pub(crate) fn parse_general_element(&mut self) -> PResult<SyntaxNode> {
        self.parse_dotted_element(true)
    }

    /// Dotted name whose parts never take arguments, so a following `(`
    /// is left for the caller: `INSERT INTO schema.t (a, b)`
    pub(crate) fn parse_table_name(&mut self) -> PResult<SyntaxNode> {
        self.parse_dotted_element(false)
    }

    fn parse_dotted_element(&mut self, allow_calls: bool) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::GeneralElement);
        node.push(self.parse_general_element_part(true, allow_calls)?);
        while self.at(TokenKind::Dot) {
            self.bump(&mut node);
            if self.eat(&mut node, TokenKind::Star) {
                break;
            }
            node.push(self.parse_general_element_part(false, allow_calls)?);
        }
        Ok(self.finish(node))
    }

    fn parse_general_element_part(&mut self, first: bool, allow_calls: bool) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::GeneralElementPart);
        if self.eat(&mut node, TokenKind::Colon) || !first {
            self.expect_word(&mut node)?;
        } else {
            self.expect_identifier(&mut node)?;
        }
        if allow_calls && self.at(TokenKind::LParen) && !self.at_outer_join_sign() {
            node.push(self.parse_function_argument()?);
        }
        Ok(self.finish(node))
    }

    pub(crate) fn parse_function_argument(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::FunctionArgument);
        self.expect(&mut node, TokenKind::LParen)?;
        if !self.at(TokenKind::RParen) {
            node.push(self.parse_argument()?);
            while self.eat(&mut node, TokenKind::Comma) {
                node.push(self.parse_argument()?);
            }
        }
        self.expect(&mut node, TokenKind::RParen)?;
        Ok(self.finish(node))
    }

    /// `*`, `name => expr`, or a positional expression
    fn parse_argument(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::Argument);
        if self.eat(&mut node, TokenKind::Star) {
            return Ok(self.finish(node));
        }
        if self.at_identifier() && self.peek_ahead(1) == TokenKind::Arrow {
            self.bump(&mut node);
            self.bump(&mut node);
        }
        self.eat_keyword(&mut node, "DISTINCT");
        node.push(self.parse_expression()?);
        Ok(self.finish(node))
    }
}
