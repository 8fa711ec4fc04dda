//! Statement productions: PL/SQL control flow and embedded SQL

use plscope_lexer::TokenKind;

use crate::parser::{PResult, Parser};
use crate::{SyntaxKind, SyntaxNode};

impl<'a> Parser<'a> {
    pub(crate) fn parse_statement(&mut self) -> PResult<SyntaxNode> {
        if self.at(TokenKind::LabelOpen) {
            return self.parse_labeled();
        }

        if self.at_keyword("BEGIN") || self.at_keyword("DECLARE") {
            return self.parse_block();
        }
        if self.at_keyword("IF") {
            return self.parse_if();
        }
        if self.at_any_keyword(&["LOOP", "WHILE", "FOR"]) {
            return self.parse_loop(None);
        }
        if self.at_keyword("EXIT") {
            return self.parse_exit(SyntaxKind::ExitStatement);
        }
        if self.at_keyword("CONTINUE") {
            return self.parse_exit(SyntaxKind::ContinueStatement);
        }
        if self.at_keyword("CASE") {
            return self.parse_case(true);
        }

        match self.keyword_text().as_deref() {
            Some("OPEN") => self.parse_open(),
            Some("CLOSE") => {
                let mut node = self.start(SyntaxKind::CloseStatement);
                self.bump(&mut node);
                node.push(self.parse_general_element()?);
                Ok(self.finish(node))
            }
            Some("FETCH") => self.parse_fetch(),
            Some("RETURN") => {
                let mut node = self.start(SyntaxKind::ReturnStatement);
                self.bump(&mut node);
                if !self.at(TokenKind::Semicolon) {
                    node.push(self.parse_expression()?);
                }
                Ok(self.finish(node))
            }
            Some("RAISE") => {
                let mut node = self.start(SyntaxKind::RaiseStatement);
                self.bump(&mut node);
                if !self.at(TokenKind::Semicolon) {
                    node.push(self.parse_general_element()?);
                }
                Ok(self.finish(node))
            }
            Some("NULL") => {
                let mut node = self.start(SyntaxKind::NullStatement);
                self.bump(&mut node);
                Ok(self.finish(node))
            }
            Some("COMMIT") => {
                let mut node = self.start(SyntaxKind::CommitStatement);
                self.bump(&mut node);
                self.eat_keyword(&mut node, "WORK");
                Ok(self.finish(node))
            }
            Some("ROLLBACK") => {
                let mut node = self.start(SyntaxKind::RollbackStatement);
                self.bump(&mut node);
                self.eat_keyword(&mut node, "WORK");
                if self.eat_keyword(&mut node, "TO") {
                    self.eat_keyword(&mut node, "SAVEPOINT");
                    self.expect_identifier(&mut node)?;
                }
                Ok(self.finish(node))
            }
            Some("SELECT") => self.parse_select(),
            Some("UPDATE") => self.parse_update(),
            Some("INSERT") => self.parse_insert(),
            Some("DELETE") => self.parse_delete(),
            Some("MERGE") => self.parse_merge(),
            Some("CALL") | Some("EXEC") => {
                let mut node = self.start(SyntaxKind::CallStatement);
                self.bump(&mut node);
                node.push(self.parse_general_element()?);
                Ok(self.finish(node))
            }
            _ => self.parse_assignment_or_call(),
        }
    }

    fn keyword_text(&self) -> Option<String> {
        const DISPATCH: &[&str] = &[
            "OPEN", "CLOSE", "FETCH", "RETURN", "RAISE", "NULL", "COMMIT", "ROLLBACK", "SELECT",
            "UPDATE", "INSERT", "DELETE", "MERGE", "CALL", "EXEC",
        ];
        DISPATCH
            .iter()
            .find(|kw| self.at_keyword(kw))
            .map(|kw| kw.to_string())
    }

    fn parse_assignment_or_call(&mut self) -> PResult<SyntaxNode> {
        if !self.at_identifier() && !self.at(TokenKind::Colon) {
            return Err(self.error_here("statement"));
        }
        let target = self.parse_general_element()?;
        if self.at(TokenKind::Assign) {
            let mut node = self.start_with(SyntaxKind::AssignmentStatement, target);
            self.bump(&mut node);
            node.push(self.parse_expression()?);
            Ok(self.finish(node))
        } else {
            let node = self.start_with(SyntaxKind::CallStatement, target);
            Ok(self.finish(node))
        }
    }

    /// `<<name>>` before a loop or block
    fn parse_labeled(&mut self) -> PResult<SyntaxNode> {
        let mut label = self.start(SyntaxKind::Label);
        self.expect(&mut label, TokenKind::LabelOpen)?;
        self.expect_identifier(&mut label)?;
        self.expect(&mut label, TokenKind::LabelClose)?;
        let label = self.finish(label);

        if self.at_any_keyword(&["LOOP", "WHILE", "FOR"]) {
            return self.parse_loop(Some(label));
        }
        if self.at_keyword("BEGIN") || self.at_keyword("DECLARE") {
            // Block labels carry no meaning beyond readability
            return self.parse_block();
        }
        Err(self.error_here("LOOP, WHILE, FOR or BEGIN"))
    }

    // === Control flow ===

    fn parse_if(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::IfStatement);
        self.expect_keyword(&mut node, "IF")?;
        node.push(self.parse_expression()?);
        self.expect_keyword(&mut node, "THEN")?;
        node.push(self.parse_seq_of_statements()?);

        while self.at_keyword("ELSIF") {
            let mut part = self.start(SyntaxKind::ElsifPart);
            self.bump(&mut part);
            part.push(self.parse_expression()?);
            self.expect_keyword(&mut part, "THEN")?;
            part.push(self.parse_seq_of_statements()?);
            node.push(self.finish(part));
        }
        if self.at_keyword("ELSE") {
            let mut part = self.start(SyntaxKind::ElsePart);
            self.bump(&mut part);
            part.push(self.parse_seq_of_statements()?);
            node.push(self.finish(part));
        }

        self.expect_keyword(&mut node, "END")?;
        self.expect_keyword(&mut node, "IF")?;
        Ok(self.finish(node))
    }

    fn parse_loop(&mut self, label: Option<SyntaxNode>) -> PResult<SyntaxNode> {
        let mut node = match label {
            Some(label) => self.start_with(SyntaxKind::LoopStatement, label),
            None => self.start(SyntaxKind::LoopStatement),
        };

        if self.eat_keyword(&mut node, "WHILE") {
            node.push(self.parse_expression()?);
        } else if self.eat_keyword(&mut node, "FOR") {
            self.expect_identifier(&mut node)?;
            self.expect_keyword(&mut node, "IN")?;
            self.eat_keyword(&mut node, "REVERSE");
            if self.at(TokenKind::LParen) && self.keyword_ahead_is(1, "SELECT") {
                node.push(self.parse_subquery()?);
            } else {
                node.push(self.parse_expression()?);
                if self.eat(&mut node, TokenKind::DotDot) {
                    node.push(self.parse_expression()?);
                }
            }
        }

        self.expect_keyword(&mut node, "LOOP")?;
        node.push(self.parse_seq_of_statements()?);
        self.expect_keyword(&mut node, "END")?;
        self.expect_keyword(&mut node, "LOOP")?;
        if self.at_identifier() {
            self.bump(&mut node);
        }
        Ok(self.finish(node))
    }

    fn parse_exit(&mut self, kind: SyntaxKind) -> PResult<SyntaxNode> {
        let mut node = self.start(kind);
        self.bump(&mut node);
        if self.at_identifier() {
            self.bump(&mut node);
        }
        if self.eat_keyword(&mut node, "WHEN") {
            node.push(self.parse_expression()?);
        }
        Ok(self.finish(node))
    }

    /// CASE in statement or expression position. Statement arms hold
    /// statement sequences and close with `END CASE`.
    pub(crate) fn parse_case(&mut self, is_statement: bool) -> PResult<SyntaxNode> {
        let kind = if is_statement {
            SyntaxKind::CaseStatement
        } else {
            SyntaxKind::CaseExpression
        };
        let mut node = self.start(kind);
        self.expect_keyword(&mut node, "CASE")?;
        if !self.at_keyword("WHEN") {
            node.push(self.parse_expression()?);
        }

        if !self.at_keyword("WHEN") {
            return Err(self.error_here("WHEN"));
        }
        while self.at_keyword("WHEN") {
            let mut part = self.start(SyntaxKind::CaseWhenPart);
            self.bump(&mut part);
            part.push(self.parse_expression()?);
            self.expect_keyword(&mut part, "THEN")?;
            part.push(self.parse_case_result(is_statement)?);
            node.push(self.finish(part));
        }
        if self.at_keyword("ELSE") {
            let mut part = self.start(SyntaxKind::CaseElsePart);
            self.bump(&mut part);
            part.push(self.parse_case_result(is_statement)?);
            node.push(self.finish(part));
        }

        self.expect_keyword(&mut node, "END")?;
        if is_statement {
            self.expect_keyword(&mut node, "CASE")?;
        } else {
            self.eat_keyword(&mut node, "CASE");
        }
        Ok(self.finish(node))
    }

    fn parse_case_result(&mut self, is_statement: bool) -> PResult<SyntaxNode> {
        if is_statement {
            self.parse_seq_of_statements()
        } else {
            self.parse_expression()
        }
    }

    // === Cursors ===

    fn parse_open(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::OpenStatement);
        self.expect_keyword(&mut node, "OPEN")?;
        node.push(self.parse_general_element()?);
        if self.eat_keyword(&mut node, "FOR") {
            node.push(self.parse_select()?);
        }
        Ok(self.finish(node))
    }

    fn parse_fetch(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::FetchStatement);
        self.expect_keyword(&mut node, "FETCH")?;
        node.push(self.parse_general_element()?);
        node.push(self.parse_into_clause()?);
        if self.eat_keyword(&mut node, "LIMIT") {
            node.push(self.parse_expression()?);
        }
        Ok(self.finish(node))
    }

    fn parse_into_clause(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::IntoClause);
        if self.eat_keyword(&mut node, "BULK") {
            self.expect_keyword(&mut node, "COLLECT")?;
        }
        self.expect_keyword(&mut node, "INTO")?;
        node.push(self.parse_general_element()?);
        while self.eat(&mut node, TokenKind::Comma) {
            node.push(self.parse_general_element()?);
        }
        Ok(self.finish(node))
    }

    // === SQL ===

    pub(crate) fn parse_select(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::SelectStatement);
        self.expect_keyword(&mut node, "SELECT")?;
        if !self.eat_keyword(&mut node, "DISTINCT") && !self.eat_keyword(&mut node, "UNIQUE") {
            self.eat_keyword(&mut node, "ALL");
        }

        if !self.eat(&mut node, TokenKind::Star) {
            node.push(self.parse_select_list_element()?);
            while self.eat(&mut node, TokenKind::Comma) {
                node.push(self.parse_select_list_element()?);
            }
        }

        if self.at_keyword("BULK") || self.at_keyword("INTO") {
            node.push(self.parse_into_clause()?);
        }

        let mut from = self.start(SyntaxKind::FromClause);
        self.expect_keyword(&mut from, "FROM")?;
        from.push(self.parse_table_ref()?);
        while self.eat(&mut from, TokenKind::Comma) {
            from.push(self.parse_table_ref()?);
        }
        node.push(self.finish(from));

        if self.at_keyword("WHERE") {
            node.push(self.parse_where_clause()?);
        }
        if self.at_keyword("GROUP") {
            let mut group = self.start(SyntaxKind::GroupByClause);
            self.bump(&mut group);
            self.expect_keyword(&mut group, "BY")?;
            group.push(self.parse_expression()?);
            while self.eat(&mut group, TokenKind::Comma) {
                group.push(self.parse_expression()?);
            }
            node.push(self.finish(group));
        }
        if self.at_keyword("HAVING") {
            let mut having = self.start(SyntaxKind::HavingClause);
            self.bump(&mut having);
            having.push(self.parse_expression()?);
            node.push(self.finish(having));
        }
        if self.at_keyword("ORDER") {
            let mut order = self.start(SyntaxKind::OrderByClause);
            self.bump(&mut order);
            self.expect_keyword(&mut order, "BY")?;
            order.push(self.parse_order_by_element()?);
            while self.eat(&mut order, TokenKind::Comma) {
                order.push(self.parse_order_by_element()?);
            }
            node.push(self.finish(order));
        }
        if self.at_keyword("FOR") && self.keyword_ahead_is(1, "UPDATE") {
            self.bump(&mut node);
            self.bump(&mut node);
        }

        Ok(self.finish(node))
    }

    fn parse_select_list_element(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::SelectListElement);
        node.push(self.parse_expression()?);
        if self.eat_keyword(&mut node, "AS") {
            self.expect_word(&mut node)?;
        } else if self.at_identifier() {
            self.bump(&mut node);
        }
        Ok(self.finish(node))
    }

    fn parse_order_by_element(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::OrderByElement);
        node.push(self.parse_expression()?);
        if !self.eat_keyword(&mut node, "ASC") {
            self.eat_keyword(&mut node, "DESC");
        }
        if self.eat_keyword(&mut node, "NULLS") {
            if !self.eat_keyword(&mut node, "FIRST") {
                self.expect_keyword(&mut node, "LAST")?;
            }
        }
        Ok(self.finish(node))
    }

    fn parse_table_ref(&mut self) -> PResult<SyntaxNode> {
        self.parse_table_ref_with(true)
    }

    /// Target of an INSERT: the name takes no arguments, leaving any column
    /// list to the statement
    fn parse_insert_target(&mut self) -> PResult<SyntaxNode> {
        self.parse_table_ref_with(false)
    }

    fn parse_table_ref_with(&mut self, allow_calls: bool) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::TableRef);
        if self.at(TokenKind::LParen) {
            node.push(self.parse_subquery()?);
        } else {
            let name = if allow_calls { self.parse_general_element()? } else { self.parse_table_name()? };
            node.push(name);
            if self.eat(&mut node, TokenKind::At) {
                self.expect_word(&mut node)?;
            }
        }
        if self.at_identifier() {
            self.bump(&mut node);
        }
        Ok(self.finish(node))
    }

    fn parse_where_clause(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::WhereClause);
        self.expect_keyword(&mut node, "WHERE")?;
        if self.eat_keyword(&mut node, "CURRENT") {
            self.expect_keyword(&mut node, "OF")?;
            node.push(self.parse_general_element()?);
        } else {
            node.push(self.parse_expression()?);
        }
        Ok(self.finish(node))
    }

    fn parse_update(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::UpdateStatement);
        self.expect_keyword(&mut node, "UPDATE")?;
        node.push(self.parse_table_ref()?);
        node.push(self.parse_update_set_clause()?);
        if self.at_keyword("WHERE") {
            node.push(self.parse_where_clause()?);
        }
        Ok(self.finish(node))
    }

    fn parse_update_set_clause(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::UpdateSetClause);
        self.expect_keyword(&mut node, "SET")?;
        node.push(self.parse_column_based_update_set()?);
        while self.eat(&mut node, TokenKind::Comma) {
            node.push(self.parse_column_based_update_set()?);
        }
        Ok(self.finish(node))
    }

    /// `col = expr` or `(col, ...) = (subquery)`
    fn parse_column_based_update_set(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::ColumnBasedUpdateSet);
        if self.at(TokenKind::LParen) {
            node.push(self.parse_column_list()?);
        } else {
            node.push(self.parse_general_element()?);
        }
        self.expect(&mut node, TokenKind::Eq)?;
        node.push(self.parse_expression()?);
        Ok(self.finish(node))
    }

    fn parse_column_list(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::ColumnList);
        self.expect(&mut node, TokenKind::LParen)?;
        node.push(self.parse_general_element()?);
        while self.eat(&mut node, TokenKind::Comma) {
            node.push(self.parse_general_element()?);
        }
        self.expect(&mut node, TokenKind::RParen)?;
        Ok(self.finish(node))
    }

    fn parse_values_clause(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::ValuesClause);
        self.expect_keyword(&mut node, "VALUES")?;
        self.expect(&mut node, TokenKind::LParen)?;
        node.push(self.parse_expression()?);
        while self.eat(&mut node, TokenKind::Comma) {
            node.push(self.parse_expression()?);
        }
        self.expect(&mut node, TokenKind::RParen)?;
        Ok(self.finish(node))
    }

    fn parse_insert(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::InsertStatement);
        self.expect_keyword(&mut node, "INSERT")?;
        self.expect_keyword(&mut node, "INTO")?;
        node.push(self.parse_insert_target()?);
        if self.at(TokenKind::LParen) && !self.keyword_ahead_is(1, "SELECT") {
            node.push(self.parse_column_list()?);
        }
        if self.at_keyword("VALUES") {
            node.push(self.parse_values_clause()?);
        } else if self.at(TokenKind::LParen) {
            node.push(self.parse_subquery()?);
        } else {
            node.push(self.parse_select()?);
        }
        Ok(self.finish(node))
    }

    fn parse_delete(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::DeleteStatement);
        self.expect_keyword(&mut node, "DELETE")?;
        self.eat_keyword(&mut node, "FROM");
        node.push(self.parse_table_ref()?);
        if self.at_keyword("WHERE") {
            node.push(self.parse_where_clause()?);
        }
        Ok(self.finish(node))
    }

    fn parse_merge(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::MergeStatement);
        self.expect_keyword(&mut node, "MERGE")?;
        self.expect_keyword(&mut node, "INTO")?;
        node.push(self.parse_table_ref()?);
        self.expect_keyword(&mut node, "USING")?;
        node.push(self.parse_table_ref()?);
        self.expect_keyword(&mut node, "ON")?;
        self.expect(&mut node, TokenKind::LParen)?;
        node.push(self.parse_expression()?);
        self.expect(&mut node, TokenKind::RParen)?;

        while self.at_keyword("WHEN") {
            if self.keyword_ahead_is(1, "MATCHED") {
                let mut clause = self.start(SyntaxKind::MergeUpdateClause);
                self.bump(&mut clause);
                self.bump(&mut clause);
                self.expect_keyword(&mut clause, "THEN")?;
                self.expect_keyword(&mut clause, "UPDATE")?;
                clause.push(self.parse_update_set_clause()?);
                if self.at_keyword("WHERE") {
                    clause.push(self.parse_where_clause()?);
                }
                node.push(self.finish(clause));
            } else {
                let mut clause = self.start(SyntaxKind::MergeInsertClause);
                self.bump(&mut clause);
                self.expect_keyword(&mut clause, "NOT")?;
                self.expect_keyword(&mut clause, "MATCHED")?;
                self.expect_keyword(&mut clause, "THEN")?;
                self.expect_keyword(&mut clause, "INSERT")?;
                if self.at(TokenKind::LParen) {
                    clause.push(self.parse_column_list()?);
                }
                clause.push(self.parse_values_clause()?);
                node.push(self.finish(clause));
            }
        }
        Ok(self.finish(node))
    }
}
