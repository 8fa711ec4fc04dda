//! Concrete parse tree
//!
//! The tree keeps every consumed token, in order, under a node tagged with the
//! grammar production that matched it. Expression productions nest even when a
//! level has a single child, so consumers see the full precedence cascade.

use plscope_ast::{Position, Span};
use plscope_lexer::TokenKind;

/// Grammar production of a [`SyntaxNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Script,

    // Units
    CreateProcedure,
    CreateFunction,
    CreatePackage,
    CreatePackageBody,
    CreateType,
    CreateSynonym,
    CreateTrigger,
    TriggerEvent,
    ObjectName,
    ParameterList,
    Parameter,
    TypeSpec,
    FieldSpec,

    // Declarations
    DeclareSection,
    VariableDeclaration,
    ExceptionDeclaration,
    CursorDeclaration,
    TypeDeclaration,
    ProcedureDeclaration,
    FunctionDeclaration,
    PragmaDeclaration,

    // Blocks
    Block,
    Body,
    SeqOfStatements,
    ExceptionHandler,
    Label,

    // PL/SQL statements
    AssignmentStatement,
    IfStatement,
    ElsifPart,
    ElsePart,
    LoopStatement,
    ExitStatement,
    ContinueStatement,
    OpenStatement,
    CloseStatement,
    FetchStatement,
    ReturnStatement,
    RaiseStatement,
    NullStatement,
    CommitStatement,
    RollbackStatement,
    CallStatement,
    CaseStatement,
    CaseWhenPart,
    CaseElsePart,

    // SQL statements
    SelectStatement,
    SelectListElement,
    IntoClause,
    FromClause,
    TableRef,
    WhereClause,
    GroupByClause,
    HavingClause,
    OrderByClause,
    OrderByElement,
    UpdateStatement,
    UpdateSetClause,
    ColumnBasedUpdateSet,
    InsertStatement,
    ColumnList,
    ValuesClause,
    DeleteStatement,
    MergeStatement,
    MergeUpdateClause,
    MergeInsertClause,

    // Expressions, outermost to innermost
    Expression,
    LogicalExpression,
    UnaryLogicalExpression,
    RelationalExpression,
    CompoundExpression,
    InElements,
    Concatenation,
    UnaryExpression,
    CaseExpression,
    QuantifiedExpression,
    Atom,
    Subquery,
    ExpressionList,
    CursorAttribute,
    OuterJoinSign,
    GeneralElement,
    GeneralElementPart,
    FunctionArgument,
    Argument,
    Literal,
}

/// A leaf of the parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxToken {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    pub position: Position,
}

impl SyntaxToken {
    /// Upper-cased text of an unquoted word
    pub fn keyword(&self) -> Option<String> {
        (self.kind == TokenKind::Ident).then(|| self.text.to_ascii_uppercase())
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Ident && self.text.eq_ignore_ascii_case(keyword)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxElement {
    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SyntaxToken> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }
}

/// An interior node of the parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub position: Position,
    pub children: Vec<SyntaxElement>,
}

impl SyntaxNode {
    /// Child nodes in order
    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(SyntaxElement::as_node)
    }

    /// Direct child tokens in order
    pub fn tokens(&self) -> impl Iterator<Item = &SyntaxToken> {
        self.children.iter().filter_map(SyntaxElement::as_token)
    }

    /// First child node of the given production
    pub fn child(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.nodes().find(|node| node.kind == kind)
    }

    /// All child nodes of the given production
    pub fn children_of(&self, kind: SyntaxKind) -> impl Iterator<Item = &SyntaxNode> {
        self.nodes().filter(move |node| node.kind == kind)
    }

    pub fn first_node(&self) -> Option<&SyntaxNode> {
        self.nodes().next()
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// First direct token of the given kind
    pub fn token(&self, kind: TokenKind) -> Option<&SyntaxToken> {
        self.tokens().find(|token| token.kind == kind)
    }

    pub fn first_token(&self) -> Option<&SyntaxToken> {
        self.tokens().next()
    }

    /// Whether a direct child token is the given keyword
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keyword(keyword).is_some()
    }

    pub fn keyword(&self, keyword: &str) -> Option<&SyntaxToken> {
        self.tokens().find(|token| token.is_keyword(keyword))
    }

    /// Direct child tokens that are words (identifiers or keywords)
    pub fn words(&self) -> impl Iterator<Item = &SyntaxToken> {
        self.tokens().filter(|token| token.kind.is_word())
    }

    /// Child elements that follow the given keyword token
    pub fn after_keyword(&self, keyword: &str) -> impl Iterator<Item = &SyntaxElement> + '_ {
        let keyword = keyword.to_string();
        self.children
            .iter()
            .skip_while(move |element| {
                !matches!(element, SyntaxElement::Token(token) if token.is_keyword(&keyword))
            })
            .skip(1)
    }

    /// First child node after the given keyword
    pub fn node_after_keyword(&self, keyword: &str) -> Option<&SyntaxNode> {
        self.after_keyword(keyword).find_map(SyntaxElement::as_node)
    }

    /// Source text covered by this node, reconstructed from its tokens
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                SyntaxElement::Node(node) => node.write_text(out),
                SyntaxElement::Token(token) => out.push_str(&token.text),
            }
        }
    }
}
