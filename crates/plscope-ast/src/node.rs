//! Variant tags and uniform node access
//!
//! Every concrete node variant has a [`NodeTag`]. Tags are computed by exhaustive
//! matches, so adding a variant without giving it a tag fails to compile.

use serde::{Deserialize, Serialize};
use crate::{
    Declaration, DeclarationKind, Expression, ExpressionKind, Position, Script, Span, Statement,
    StatementKind,
};

/// Stable discriminator for every concrete AST variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeTag {
    Script,

    // Statements
    Block,
    CreateProcedureStatement,
    CreateFunctionStatement,
    CreatePackageStatement,
    CreatePackageBodyStatement,
    CreateTypeStatement,
    CreateNestTableStatement,
    CreateSynonymStatement,
    CreateTriggerStatement,
    AssignmentStatement,
    IfStatement,
    LoopStatement,
    OpenStatement,
    CloseStatement,
    FetchStatement,
    ExitStatement,
    ContinueStatement,
    CallStatement,
    SelectStatement,
    UpdateStatement,
    InsertStatement,
    DeleteStatement,
    MergeStatement,
    CaseWhenStatement,
    ReturnStatement,
    RaiseStatement,
    CommitStatement,
    RollbackStatement,
    NullStatement,

    // Expressions
    NumericLiteral,
    StringLiteral,
    BooleanLiteral,
    NullExpression,
    NameExpression,
    DotExpression,
    BinaryExpression,
    RelationalExpression,
    UnaryLogicalExpression,
    NotExpression,
    SignExpression,
    InExpression,
    BetweenExpression,
    LikeExpression,
    FunctionCallExpression,
    CallExpression,
    ExistsExpression,
    CursorAttribute,
    AliasExpression,
    OuterJoinExpression,
    StatementExpression,
    ListExpression,
    MissingExpression,

    // Declarations
    VariableDeclaration,
    ExceptionDeclaration,
    CursorDeclaration,
    NestTableTypeDeclaration,
    RecordTypeDeclaration,
    FunctionDeclaration,
    ProcedureDeclaration,
    AutonomousTransactionDeclaration,
}

impl std::fmt::Display for NodeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Statement {
    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            StatementKind::Block(_) => NodeTag::Block,
            StatementKind::CreateProcedure(_) => NodeTag::CreateProcedureStatement,
            StatementKind::CreateFunction(_) => NodeTag::CreateFunctionStatement,
            StatementKind::CreatePackage(_) => NodeTag::CreatePackageStatement,
            StatementKind::CreatePackageBody(_) => NodeTag::CreatePackageBodyStatement,
            StatementKind::CreateType(_) => NodeTag::CreateTypeStatement,
            StatementKind::CreateNestTable(_) => NodeTag::CreateNestTableStatement,
            StatementKind::CreateSynonym(_) => NodeTag::CreateSynonymStatement,
            StatementKind::CreateTrigger(_) => NodeTag::CreateTriggerStatement,
            StatementKind::Assignment { .. } => NodeTag::AssignmentStatement,
            StatementKind::If(_) => NodeTag::IfStatement,
            StatementKind::Loop(_) => NodeTag::LoopStatement,
            StatementKind::Open { .. } => NodeTag::OpenStatement,
            StatementKind::Close { .. } => NodeTag::CloseStatement,
            StatementKind::Fetch { .. } => NodeTag::FetchStatement,
            StatementKind::Exit { .. } => NodeTag::ExitStatement,
            StatementKind::Continue { .. } => NodeTag::ContinueStatement,
            StatementKind::Call { .. } => NodeTag::CallStatement,
            StatementKind::Select(_) => NodeTag::SelectStatement,
            StatementKind::Update(_) => NodeTag::UpdateStatement,
            StatementKind::Insert(_) => NodeTag::InsertStatement,
            StatementKind::Delete(_) => NodeTag::DeleteStatement,
            StatementKind::Merge(_) => NodeTag::MergeStatement,
            StatementKind::CaseWhen(_) => NodeTag::CaseWhenStatement,
            StatementKind::Return { .. } => NodeTag::ReturnStatement,
            StatementKind::Raise { .. } => NodeTag::RaiseStatement,
            StatementKind::Commit => NodeTag::CommitStatement,
            StatementKind::Rollback => NodeTag::RollbackStatement,
            StatementKind::Null => NodeTag::NullStatement,
        }
    }
}

impl Expression {
    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            ExpressionKind::Number(_) => NodeTag::NumericLiteral,
            ExpressionKind::String(_) => NodeTag::StringLiteral,
            ExpressionKind::Boolean(_) => NodeTag::BooleanLiteral,
            ExpressionKind::Null => NodeTag::NullExpression,
            ExpressionKind::Name(_) => NodeTag::NameExpression,
            ExpressionKind::Dot { .. } => NodeTag::DotExpression,
            ExpressionKind::Binary { .. } => NodeTag::BinaryExpression,
            ExpressionKind::Relational { .. } => NodeTag::RelationalExpression,
            ExpressionKind::UnaryLogical { .. } => NodeTag::UnaryLogicalExpression,
            ExpressionKind::Not(_) => NodeTag::NotExpression,
            ExpressionKind::Sign { .. } => NodeTag::SignExpression,
            ExpressionKind::In { .. } => NodeTag::InExpression,
            ExpressionKind::Between { .. } => NodeTag::BetweenExpression,
            ExpressionKind::Like { .. } => NodeTag::LikeExpression,
            ExpressionKind::FunctionCall { .. } => NodeTag::FunctionCallExpression,
            ExpressionKind::Call { .. } => NodeTag::CallExpression,
            ExpressionKind::Exists(_) => NodeTag::ExistsExpression,
            ExpressionKind::CursorAttribute { .. } => NodeTag::CursorAttribute,
            ExpressionKind::Alias { .. } => NodeTag::AliasExpression,
            ExpressionKind::OuterJoin(_) => NodeTag::OuterJoinExpression,
            ExpressionKind::Statement(_) => NodeTag::StatementExpression,
            ExpressionKind::List(_) => NodeTag::ListExpression,
            ExpressionKind::Missing => NodeTag::MissingExpression,
        }
    }
}

impl Declaration {
    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            DeclarationKind::Variable(_) => NodeTag::VariableDeclaration,
            DeclarationKind::Exception { .. } => NodeTag::ExceptionDeclaration,
            DeclarationKind::Cursor(_) => NodeTag::CursorDeclaration,
            DeclarationKind::NestTableType(_) => NodeTag::NestTableTypeDeclaration,
            DeclarationKind::RecordType(_) => NodeTag::RecordTypeDeclaration,
            DeclarationKind::Function(_) => NodeTag::FunctionDeclaration,
            DeclarationKind::Procedure(_) => NodeTag::ProcedureDeclaration,
            DeclarationKind::AutonomousTransaction => NodeTag::AutonomousTransactionDeclaration,
        }
    }
}

/// Anything with a fixed source location
pub trait Positioned {
    fn span(&self) -> Span;
    fn position(&self) -> Position;

    fn line(&self) -> usize {
        self.position().line
    }

    fn column(&self) -> usize {
        self.position().column
    }
}

macro_rules! impl_positioned {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Positioned for $ty {
                fn span(&self) -> Span {
                    self.span
                }

                fn position(&self) -> Position {
                    self.position
                }
            }
        )*
    };
}

impl_positioned!(
    Script,
    Statement,
    Expression,
    Declaration,
    crate::Body,
    crate::Parameter,
    crate::ExceptionHandler,
    crate::FieldDeclaration,
);

/// Borrowed view over any node family, used by rule checks and walkers
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Script(&'a Script),
    Statement(&'a Statement),
    Expression(&'a Expression),
    Declaration(&'a Declaration),
}

impl<'a> NodeRef<'a> {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeRef::Script(_) => NodeTag::Script,
            NodeRef::Statement(stmt) => stmt.tag(),
            NodeRef::Expression(expr) => expr.tag(),
            NodeRef::Declaration(decl) => decl.tag(),
        }
    }

    pub fn as_statement(&self) -> Option<&'a Statement> {
        match self {
            NodeRef::Statement(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&'a Expression> {
        match self {
            NodeRef::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_declaration(&self) -> Option<&'a Declaration> {
        match self {
            NodeRef::Declaration(decl) => Some(decl),
            _ => None,
        }
    }
}

impl Positioned for NodeRef<'_> {
    fn span(&self) -> Span {
        match self {
            NodeRef::Script(node) => node.span,
            NodeRef::Statement(node) => node.span,
            NodeRef::Expression(node) => node.span,
            NodeRef::Declaration(node) => node.span,
        }
    }

    fn position(&self) -> Position {
        match self {
            NodeRef::Script(node) => node.position,
            NodeRef::Statement(node) => node.position,
            NodeRef::Expression(node) => node.position,
            NodeRef::Declaration(node) => node.position,
        }
    }
}
