//! Recursive descent parser: utilities, units and declarations
//!
//! Productions never consume their terminating `;`; the enclosing list
//! production (script, statement sequence, declare section) does.

use plscope_ast::{LineIndex, Position, Span};
use plscope_lexer::{tokenize, Token, TokenKind};

use crate::{SyntaxElement, SyntaxError, SyntaxKind, SyntaxNode, SyntaxToken};

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// Words that end an expression or list and can never be a name or an alias
const RESERVED: &[&str] = &[
    "ALL", "AND", "AS", "ASC", "BEGIN", "BETWEEN", "BULK", "BY", "CASE", "CONNECT", "CREATE",
    "DECLARE", "DEFAULT", "DELETE", "DESC", "DISTINCT", "ELSE", "ELSIF", "END", "ESCAPE",
    "EXCEPTION", "EXISTS", "FALSE", "FETCH", "FOR", "FROM", "GROUP", "HAVING", "IF", "IN",
    "INSERT", "INTERSECT", "INTO", "IS", "LIKE", "LOOP", "MERGE", "MINUS", "NOT", "NULL", "OF",
    "ON", "OR", "ORDER", "RETURN", "SELECT", "SET", "START", "THEN", "TRUE", "UNION", "UPDATE",
    "USING", "VALUES", "WHEN", "WHERE", "WHILE", "WITH",
];

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.iter().any(|reserved| reserved.eq_ignore_ascii_case(word))
}

/// A node under construction
pub(crate) struct NodeBuilder {
    pub(crate) kind: SyntaxKind,
    start: Span,
    position: Position,
    children: Vec<SyntaxElement>,
}

impl NodeBuilder {
    pub(crate) fn push(&mut self, node: SyntaxNode) {
        self.children.push(SyntaxElement::Node(node));
    }
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    lines: LineIndex,
    pos: usize,
    last_end: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            lines: LineIndex::new(source),
            pos: 0,
            last_end: 0,
        }
    }

    // === Utilities ===

    fn current(&self) -> &Token {
        // tokenize always appends EOF, so the list is never empty
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn peek(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.keyword_ahead_is(0, keyword)
    }

    pub(crate) fn keyword_ahead_is(&self, n: usize, keyword: &str) -> bool {
        self.tokens
            .get(self.pos + n)
            .filter(|t| t.kind == TokenKind::Ident)
            .is_some_and(|t| t.text(self.source).eq_ignore_ascii_case(keyword))
    }

    pub(crate) fn at_any_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|kw| self.at_keyword(kw))
    }

    /// A word usable as a name: quoted, or unquoted and not reserved
    pub(crate) fn at_identifier(&self) -> bool {
        match self.peek() {
            TokenKind::QuotedIdent => true,
            TokenKind::Ident => !is_reserved(self.current().text(self.source)),
            _ => false,
        }
    }

    pub(crate) fn position_of(&self, span: Span) -> Position {
        self.lines.position(self.source, span.start)
    }

    pub(crate) fn start(&self, kind: SyntaxKind) -> NodeBuilder {
        let span = self.current().span;
        NodeBuilder {
            kind,
            start: span,
            position: self.position_of(span),
            children: Vec::new(),
        }
    }

    /// Start a node whose first child is an already finished node
    pub(crate) fn start_with(&self, kind: SyntaxKind, first: SyntaxNode) -> NodeBuilder {
        NodeBuilder {
            kind,
            start: first.span,
            position: first.position,
            children: vec![SyntaxElement::Node(first)],
        }
    }

    pub(crate) fn finish(&self, builder: NodeBuilder) -> SyntaxNode {
        let end = self.last_end.max(builder.start.start);
        SyntaxNode {
            kind: builder.kind,
            span: Span::new(builder.start.start, end),
            position: builder.position,
            children: builder.children,
        }
    }

    /// Wrap a single node in a parent production
    pub(crate) fn wrap(&self, kind: SyntaxKind, node: SyntaxNode) -> SyntaxNode {
        SyntaxNode {
            kind,
            span: node.span,
            position: node.position,
            children: vec![SyntaxElement::Node(node)],
        }
    }

    fn check_lexical(&self) -> PResult<()> {
        if self.at(TokenKind::Error) {
            let token = self.current();
            return Err(SyntaxError::new(
                self.position_of(token.span),
                token.span,
                format!("token recognition error at: '{}'", token.text(self.source)),
            ));
        }
        Ok(())
    }

    /// Move the current token into `builder`
    pub(crate) fn bump(&mut self, builder: &mut NodeBuilder) {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
            self.last_end = token.span.end;
        }
        builder.children.push(SyntaxElement::Token(SyntaxToken {
            kind: token.kind,
            text: token.text(self.source).to_string(),
            span: token.span,
            position: self.position_of(token.span),
        }));
    }

    pub(crate) fn error_here(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        let found = match token.kind {
            TokenKind::Eof => "<EOF>".to_string(),
            _ => format!("'{}'", token.text(self.source)),
        };
        SyntaxError::unexpected(expected, &found, self.position_of(token.span), token.span)
    }

    pub(crate) fn expect(&mut self, builder: &mut NodeBuilder, kind: TokenKind) -> PResult<()> {
        self.check_lexical()?;
        if self.at(kind) {
            self.bump(builder);
            Ok(())
        } else {
            Err(self.error_here(kind.describe()))
        }
    }

    pub(crate) fn expect_keyword(&mut self, builder: &mut NodeBuilder, keyword: &str) -> PResult<()> {
        self.check_lexical()?;
        if self.at_keyword(keyword) {
            self.bump(builder);
            Ok(())
        } else {
            Err(self.error_here(keyword))
        }
    }

    pub(crate) fn expect_identifier(&mut self, builder: &mut NodeBuilder) -> PResult<()> {
        self.check_lexical()?;
        if self.at_identifier() {
            self.bump(builder);
            Ok(())
        } else {
            Err(self.error_here("identifier"))
        }
    }

    /// Any word, reserved or not
    pub(crate) fn expect_word(&mut self, builder: &mut NodeBuilder) -> PResult<()> {
        self.check_lexical()?;
        if self.peek().is_word() {
            self.bump(builder);
            Ok(())
        } else {
            Err(self.error_here("identifier"))
        }
    }

    pub(crate) fn eat(&mut self, builder: &mut NodeBuilder, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump(builder);
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_keyword(&mut self, builder: &mut NodeBuilder, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.bump(builder);
            true
        } else {
            false
        }
    }

    // === Script ===

    pub fn parse_script(&mut self) -> PResult<SyntaxNode> {
        let mut script = self.start(SyntaxKind::Script);

        loop {
            self.check_lexical()?;
            while self.at(TokenKind::Slash) || self.at(TokenKind::Semicolon) {
                self.bump(&mut script);
            }
            if self.at(TokenKind::Eof) {
                break;
            }
            let unit = self.parse_unit_statement()?;
            script.push(unit);
            self.expect(&mut script, TokenKind::Semicolon)?;
        }

        Ok(self.finish(script))
    }

    fn parse_unit_statement(&mut self) -> PResult<SyntaxNode> {
        if self.at_keyword("CREATE") {
            self.parse_create()
        } else {
            self.parse_statement()
        }
    }

    // === Units ===

    fn parse_create(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::CreateProcedure);
        self.expect_keyword(&mut node, "CREATE")?;
        if self.eat_keyword(&mut node, "OR") {
            self.expect_keyword(&mut node, "REPLACE")?;
        }
        if !self.eat_keyword(&mut node, "EDITIONABLE") {
            self.eat_keyword(&mut node, "NONEDITIONABLE");
        }
        let public = self.eat_keyword(&mut node, "PUBLIC");

        if self.at_keyword("SYNONYM") {
            node.kind = SyntaxKind::CreateSynonym;
            self.bump(&mut node);
            return self.parse_synonym_tail(node);
        }
        if public {
            return Err(self.error_here("SYNONYM"));
        }

        if self.eat_keyword(&mut node, "PROCEDURE") {
            node.kind = SyntaxKind::CreateProcedure;
            self.parse_subprogram_tail(&mut node, false, true)?;
        } else if self.eat_keyword(&mut node, "FUNCTION") {
            node.kind = SyntaxKind::CreateFunction;
            self.parse_subprogram_tail(&mut node, true, true)?;
        } else if self.eat_keyword(&mut node, "PACKAGE") {
            if self.eat_keyword(&mut node, "BODY") {
                node.kind = SyntaxKind::CreatePackageBody;
                self.parse_package_body_tail(&mut node)?;
            } else {
                node.kind = SyntaxKind::CreatePackage;
                self.parse_package_tail(&mut node)?;
            }
        } else if self.eat_keyword(&mut node, "TYPE") {
            node.kind = SyntaxKind::CreateType;
            self.parse_type_tail(&mut node)?;
        } else if self.eat_keyword(&mut node, "TRIGGER") {
            node.kind = SyntaxKind::CreateTrigger;
            self.parse_trigger_tail(&mut node)?;
        } else {
            return Err(self.error_here("PROCEDURE, FUNCTION, PACKAGE, TYPE, SYNONYM or TRIGGER"));
        }

        Ok(self.finish(node))
    }

    pub(crate) fn parse_object_name(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::ObjectName);
        self.expect_identifier(&mut node)?;
        if self.eat(&mut node, TokenKind::Dot) {
            self.expect_word(&mut node)?;
        }
        Ok(self.finish(node))
    }

    /// Name, parameters, optional return type and optional implementation
    /// of a procedure or function, after its keyword.
    fn parse_subprogram_tail(
        &mut self,
        node: &mut NodeBuilder,
        is_function: bool,
        require_body: bool,
    ) -> PResult<()> {
        node.push(self.parse_object_name()?);
        if self.at(TokenKind::LParen) {
            node.push(self.parse_parameter_list()?);
        }
        if is_function {
            self.expect_keyword(node, "RETURN")?;
            node.push(self.parse_type_spec()?);
            while self.at_any_keyword(&["DETERMINISTIC", "PIPELINED", "PARALLEL_ENABLE", "RESULT_CACHE"]) {
                self.bump(node);
            }
        }
        if self.eat_keyword(node, "AUTHID") {
            self.expect_word(node)?;
        }

        let has_body = self.at_keyword("IS") || self.at_keyword("AS");
        if !has_body {
            if require_body {
                return Err(self.error_here("IS or AS"));
            }
            return Ok(());
        }
        self.bump(node);
        if self.at_keyword("LANGUAGE") || self.at_keyword("EXTERNAL") {
            return Err(self.error_here("declare section or BEGIN"));
        }
        node.push(self.parse_declare_section()?);
        node.push(self.parse_body()?);
        Ok(())
    }

    fn parse_package_tail(&mut self, node: &mut NodeBuilder) -> PResult<()> {
        node.push(self.parse_object_name()?);
        if self.eat_keyword(node, "AUTHID") {
            self.expect_word(node)?;
        }
        if !self.eat_keyword(node, "IS") {
            self.expect_keyword(node, "AS")?;
        }
        node.push(self.parse_declare_section()?);
        self.expect_keyword(node, "END")?;
        if self.at_identifier() {
            self.bump(node);
        }
        Ok(())
    }

    fn parse_package_body_tail(&mut self, node: &mut NodeBuilder) -> PResult<()> {
        node.push(self.parse_object_name()?);
        if !self.eat_keyword(node, "IS") {
            self.expect_keyword(node, "AS")?;
        }
        node.push(self.parse_declare_section()?);
        if self.at_keyword("BEGIN") {
            node.push(self.parse_body()?);
        } else {
            self.expect_keyword(node, "END")?;
            if self.at_identifier() {
                self.bump(node);
            }
        }
        Ok(())
    }

    fn parse_type_tail(&mut self, node: &mut NodeBuilder) -> PResult<()> {
        node.push(self.parse_object_name()?);
        self.eat_keyword(node, "FORCE");
        if !self.eat_keyword(node, "AS") {
            self.expect_keyword(node, "IS")?;
        }

        if self.eat_keyword(node, "TABLE") {
            self.expect_keyword(node, "OF")?;
            node.push(self.parse_type_spec()?);
        } else if self.eat_keyword(node, "OBJECT") {
            self.parse_field_specs(node)?;
        } else if self.at_keyword("VARRAY") || self.at_keyword("VARYING") {
            if self.eat_keyword(node, "VARYING") {
                self.expect_keyword(node, "ARRAY")?;
            } else {
                self.bump(node);
            }
            self.expect(node, TokenKind::LParen)?;
            self.expect(node, TokenKind::Int)?;
            self.expect(node, TokenKind::RParen)?;
            self.expect_keyword(node, "OF")?;
            node.push(self.parse_type_spec()?);
        } else {
            return Err(self.error_here("TABLE, OBJECT or VARRAY"));
        }
        Ok(())
    }

    fn parse_synonym_tail(&mut self, mut node: NodeBuilder) -> PResult<SyntaxNode> {
        node.push(self.parse_object_name()?);
        self.expect_keyword(&mut node, "FOR")?;
        node.push(self.parse_object_name()?);
        if self.eat(&mut node, TokenKind::At) {
            self.expect_word(&mut node)?;
        }
        Ok(self.finish(node))
    }

    fn parse_trigger_tail(&mut self, node: &mut NodeBuilder) -> PResult<()> {
        node.push(self.parse_object_name()?);

        if self.eat_keyword(node, "INSTEAD") {
            self.expect_keyword(node, "OF")?;
        } else if !self.eat_keyword(node, "BEFORE") {
            self.expect_keyword(node, "AFTER")?;
        }

        node.push(self.parse_trigger_event()?);
        while self.eat_keyword(node, "OR") {
            node.push(self.parse_trigger_event()?);
        }

        self.expect_keyword(node, "ON")?;
        node.push(self.parse_object_name()?);

        if self.eat_keyword(node, "REFERENCING") {
            while self.at_any_keyword(&["OLD", "NEW", "PARENT"]) {
                self.bump(node);
                self.eat_keyword(node, "AS");
                self.expect_word(node)?;
            }
        }
        if self.eat_keyword(node, "FOR") {
            self.expect_keyword(node, "EACH")?;
            self.expect_keyword(node, "ROW")?;
        }
        if self.eat_keyword(node, "WHEN") {
            self.expect(node, TokenKind::LParen)?;
            node.push(self.parse_expression()?);
            self.expect(node, TokenKind::RParen)?;
        }

        node.push(self.parse_block()?);
        Ok(())
    }

    fn parse_trigger_event(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::TriggerEvent);
        if self.eat_keyword(&mut node, "UPDATE") {
            if self.eat_keyword(&mut node, "OF") {
                self.expect_identifier(&mut node)?;
                while self.eat(&mut node, TokenKind::Comma) {
                    self.expect_identifier(&mut node)?;
                }
            }
        } else if !self.eat_keyword(&mut node, "INSERT") {
            self.expect_keyword(&mut node, "DELETE")?;
        }
        Ok(self.finish(node))
    }

    // === Parameters and types ===

    pub(crate) fn parse_parameter_list(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::ParameterList);
        self.expect(&mut node, TokenKind::LParen)?;
        node.push(self.parse_parameter()?);
        while self.eat(&mut node, TokenKind::Comma) {
            node.push(self.parse_parameter()?);
        }
        self.expect(&mut node, TokenKind::RParen)?;
        Ok(self.finish(node))
    }

    fn parse_parameter(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::Parameter);
        self.expect_identifier(&mut node)?;
        self.eat_keyword(&mut node, "IN");
        self.eat_keyword(&mut node, "OUT");
        self.eat_keyword(&mut node, "NOCOPY");
        node.push(self.parse_type_spec()?);
        if self.eat(&mut node, TokenKind::Assign) || self.eat_keyword(&mut node, "DEFAULT") {
            node.push(self.parse_expression()?);
        }
        Ok(self.finish(node))
    }

    pub(crate) fn parse_type_spec(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::TypeSpec);
        self.eat_keyword(&mut node, "REF");
        self.expect_identifier(&mut node)?;
        while self.eat(&mut node, TokenKind::Dot) {
            self.expect_word(&mut node)?;
        }
        if self.at_keyword("PRECISION") || self.at_keyword("RAW") {
            self.bump(&mut node);
        }
        if self.eat(&mut node, TokenKind::LParen) {
            if !self.eat(&mut node, TokenKind::Int) {
                self.expect(&mut node, TokenKind::Star)?;
            }
            while self.eat(&mut node, TokenKind::Comma) {
                self.expect(&mut node, TokenKind::Int)?;
            }
            if !self.eat_keyword(&mut node, "BYTE") {
                self.eat_keyword(&mut node, "CHAR");
            }
            self.expect(&mut node, TokenKind::RParen)?;
        }
        if self.eat(&mut node, TokenKind::Percent) {
            if !self.eat_keyword(&mut node, "TYPE") {
                self.expect_keyword(&mut node, "ROWTYPE")?;
            }
        }
        Ok(self.finish(node))
    }

    /// `( name type, ... )` for records and object types
    fn parse_field_specs(&mut self, node: &mut NodeBuilder) -> PResult<()> {
        self.expect(node, TokenKind::LParen)?;
        node.push(self.parse_field_spec()?);
        while self.eat(node, TokenKind::Comma) {
            node.push(self.parse_field_spec()?);
        }
        self.expect(node, TokenKind::RParen)?;
        Ok(())
    }

    fn parse_field_spec(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::FieldSpec);
        self.expect_identifier(&mut node)?;
        node.push(self.parse_type_spec()?);
        if self.eat_keyword(&mut node, "NOT") {
            self.expect_keyword(&mut node, "NULL")?;
        }
        if self.eat(&mut node, TokenKind::Assign) || self.eat_keyword(&mut node, "DEFAULT") {
            node.push(self.parse_expression()?);
        }
        Ok(self.finish(node))
    }

    // === Declarations ===

    pub(crate) fn parse_declare_section(&mut self) -> PResult<SyntaxNode> {
        let mut section = self.start(SyntaxKind::DeclareSection);
        while !self.at_keyword("BEGIN") && !self.at_keyword("END") {
            self.check_lexical()?;
            if self.at(TokenKind::Eof) {
                return Err(self.error_here("BEGIN or END"));
            }
            let decl = self.parse_declaration()?;
            section.push(decl);
            self.expect(&mut section, TokenKind::Semicolon)?;
        }
        Ok(self.finish(section))
    }

    fn parse_declaration(&mut self) -> PResult<SyntaxNode> {
        if self.at_keyword("PRAGMA") {
            return self.parse_pragma();
        }
        if self.at_keyword("CURSOR") {
            return self.parse_cursor_declaration();
        }
        if self.at_keyword("TYPE") {
            return self.parse_type_declaration();
        }
        if self.at_keyword("PROCEDURE") {
            let mut node = self.start(SyntaxKind::ProcedureDeclaration);
            self.bump(&mut node);
            self.parse_subprogram_tail(&mut node, false, false)?;
            return Ok(self.finish(node));
        }
        if self.at_keyword("FUNCTION") {
            let mut node = self.start(SyntaxKind::FunctionDeclaration);
            self.bump(&mut node);
            self.parse_subprogram_tail(&mut node, true, false)?;
            return Ok(self.finish(node));
        }
        if self.at_identifier() && self.keyword_ahead_is(1, "EXCEPTION") {
            let mut node = self.start(SyntaxKind::ExceptionDeclaration);
            self.bump(&mut node);
            self.bump(&mut node);
            return Ok(self.finish(node));
        }
        self.parse_variable_declaration()
    }

    fn parse_pragma(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::PragmaDeclaration);
        self.expect_keyword(&mut node, "PRAGMA")?;
        self.expect_word(&mut node)?;
        if self.at(TokenKind::LParen) {
            node.push(self.parse_function_argument()?);
        }
        Ok(self.finish(node))
    }

    fn parse_cursor_declaration(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::CursorDeclaration);
        self.expect_keyword(&mut node, "CURSOR")?;
        self.expect_identifier(&mut node)?;
        if self.at(TokenKind::LParen) {
            node.push(self.parse_parameter_list()?);
        }
        if self.eat_keyword(&mut node, "RETURN") {
            node.push(self.parse_type_spec()?);
        }
        if self.eat_keyword(&mut node, "IS") {
            node.push(self.parse_select()?);
        }
        Ok(self.finish(node))
    }

    fn parse_type_declaration(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::TypeDeclaration);
        self.expect_keyword(&mut node, "TYPE")?;
        self.expect_identifier(&mut node)?;
        self.expect_keyword(&mut node, "IS")?;

        if self.eat_keyword(&mut node, "TABLE") {
            self.expect_keyword(&mut node, "OF")?;
            node.push(self.parse_type_spec()?);
            if self.eat_keyword(&mut node, "NOT") {
                self.expect_keyword(&mut node, "NULL")?;
            }
            if self.eat_keyword(&mut node, "INDEX") {
                self.expect_keyword(&mut node, "BY")?;
                node.push(self.parse_type_spec()?);
            }
        } else if self.eat_keyword(&mut node, "RECORD") {
            self.parse_field_specs(&mut node)?;
        } else if self.eat_keyword(&mut node, "VARRAY") {
            self.expect(&mut node, TokenKind::LParen)?;
            self.expect(&mut node, TokenKind::Int)?;
            self.expect(&mut node, TokenKind::RParen)?;
            self.expect_keyword(&mut node, "OF")?;
            node.push(self.parse_type_spec()?);
        } else if self.eat_keyword(&mut node, "REF") {
            self.expect_keyword(&mut node, "CURSOR")?;
            if self.eat_keyword(&mut node, "RETURN") {
                node.push(self.parse_type_spec()?);
            }
        } else {
            return Err(self.error_here("TABLE, RECORD, VARRAY or REF CURSOR"));
        }
        Ok(self.finish(node))
    }

    fn parse_variable_declaration(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::VariableDeclaration);
        self.expect_identifier(&mut node)?;
        self.eat_keyword(&mut node, "CONSTANT");
        node.push(self.parse_type_spec()?);
        if self.eat_keyword(&mut node, "NOT") {
            self.expect_keyword(&mut node, "NULL")?;
        }
        if self.eat(&mut node, TokenKind::Assign) || self.eat_keyword(&mut node, "DEFAULT") {
            node.push(self.parse_expression()?);
        }
        Ok(self.finish(node))
    }

    // === Blocks ===

    /// `[DECLARE decls] BEGIN ... END`
    pub(crate) fn parse_block(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::Block);
        if self.eat_keyword(&mut node, "DECLARE") {
            node.push(self.parse_declare_section()?);
        }
        node.push(self.parse_body()?);
        Ok(self.finish(node))
    }

    /// `BEGIN seq [EXCEPTION handlers] END [name]`
    pub(crate) fn parse_body(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::Body);
        self.expect_keyword(&mut node, "BEGIN")?;
        node.push(self.parse_seq_of_statements()?);
        if self.eat_keyword(&mut node, "EXCEPTION") {
            while self.at_keyword("WHEN") {
                node.push(self.parse_exception_handler()?);
            }
        }
        self.expect_keyword(&mut node, "END")?;
        if self.at_identifier() {
            self.bump(&mut node);
        }
        Ok(self.finish(node))
    }

    pub(crate) fn parse_seq_of_statements(&mut self) -> PResult<SyntaxNode> {
        let mut seq = self.start(SyntaxKind::SeqOfStatements);
        loop {
            self.check_lexical()?;
            if self.at(TokenKind::Eof) {
                return Err(self.error_here("END"));
            }
            if self.at_any_keyword(&["END", "EXCEPTION", "ELSE", "ELSIF", "WHEN"]) {
                break;
            }
            let stmt = self.parse_statement()?;
            seq.push(stmt);
            self.expect(&mut seq, TokenKind::Semicolon)?;
        }
        Ok(self.finish(seq))
    }

    fn parse_exception_handler(&mut self) -> PResult<SyntaxNode> {
        let mut node = self.start(SyntaxKind::ExceptionHandler);
        self.expect_keyword(&mut node, "WHEN")?;
        self.expect_word(&mut node)?;
        while self.eat_keyword(&mut node, "OR") {
            self.expect_word(&mut node)?;
        }
        self.expect_keyword(&mut node, "THEN")?;
        node.push(self.parse_seq_of_statements()?);
        Ok(self.finish(node))
    }
}
