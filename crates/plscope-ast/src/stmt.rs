//! Statement AST nodes

use serde::{Deserialize, Serialize};
use crate::{
    Declaration, Expression, FunctionDeclaration, ObjectName, PackageBody, PackageSpec,
    Position, ProcedureDeclaration, Span, DataType, FieldDeclaration,
};

/// Root of a built source file: the top-level unit statements in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub statements: Vec<Statement>,
    pub span: Span,
    pub position: Position,
}

/// An ordered sequence of statements: `BEGIN ... END` contents, branch bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub statements: Vec<Statement>,
    pub span: Span,
    pub position: Position,
}

impl Body {
    pub fn new(statements: Vec<Statement>, span: Span, position: Position) -> Self {
        Self { statements, span, position }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
    pub position: Position,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span, position: Position) -> Self {
        Self { kind, span, position }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    /// `[DECLARE ...] BEGIN ... [EXCEPTION ...] END`
    Block(Block),

    /// `CREATE [OR REPLACE] PROCEDURE`
    CreateProcedure(ProcedureDeclaration),

    /// `CREATE [OR REPLACE] FUNCTION`
    CreateFunction(FunctionDeclaration),

    /// `CREATE [OR REPLACE] PACKAGE`
    CreatePackage(PackageSpec),

    /// `CREATE [OR REPLACE] PACKAGE BODY`
    CreatePackageBody(PackageBody),

    /// `CREATE [OR REPLACE] TYPE t AS OBJECT (...)` / `AS VARRAY(n) OF ...`
    CreateType(TypeDeclaration),

    /// `CREATE [OR REPLACE] TYPE t AS TABLE OF ...`
    CreateNestTable(CreateNestTableStatement),

    /// `CREATE [OR REPLACE] [PUBLIC] SYNONYM s FOR target`
    CreateSynonym(SynonymDeclaration),

    /// `CREATE [OR REPLACE] TRIGGER`
    CreateTrigger(TriggerDeclaration),

    /// `target := value`
    Assignment {
        target: Expression,
        value: Expression,
    },

    If(IfStatement),

    Loop(LoopStatement),

    /// `OPEN c [(args)] [FOR select]`
    Open {
        cursor: Expression,
        arguments: Vec<Expression>,
        query: Option<Box<Statement>>,
    },

    /// `CLOSE c`
    Close { cursor: Expression },

    /// `FETCH c [BULK COLLECT] INTO a, b`
    Fetch {
        cursor: Expression,
        targets: Vec<Expression>,
        bulk_collect: bool,
    },

    /// `EXIT [WHEN cond]`
    Exit { condition: Option<Expression> },

    /// `CONTINUE [WHEN cond]`
    Continue { condition: Option<Expression> },

    /// Procedure call: `p;`, `pkg.p(1, 2);`
    Call {
        callee: Expression,
        arguments: Vec<Expression>,
    },

    Select(SelectStatement),

    Update(UpdateStatement),

    Insert(InsertStatement),

    Delete(DeleteStatement),

    Merge(MergeStatement),

    /// CASE statement, also wrapped as an expression for CASE expressions
    CaseWhen(CaseWhenStatement),

    /// `RETURN [expr]`
    Return { value: Option<Expression> },

    /// `RAISE [exception]`
    Raise { exception: Option<Expression> },

    Commit,

    Rollback,

    Null,
}

/// Anonymous or nested block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub declarations: Vec<Declaration>,
    pub body: Body,
    pub handlers: Vec<ExceptionHandler>,
}

/// `WHEN e1 [OR e2] THEN ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionHandler {
    /// Upper-case exception names; `OTHERS` catches everything
    pub exceptions: Vec<String>,
    pub body: Body,
    pub span: Span,
    pub position: Position,
}

impl ExceptionHandler {
    pub fn catches(&self, exception: &str) -> bool {
        self.exceptions
            .iter()
            .any(|name| name == "OTHERS" || name.eq_ignore_ascii_case(exception))
    }
}

/// Object type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: ObjectName,
    pub definition: TypeDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDefinition {
    /// `AS OBJECT (attr type, ...)`
    Object(Vec<FieldDeclaration>),
    /// `AS VARRAY(limit) OF element`
    Varray { limit: String, element_type: DataType },
}

/// Schema-level nested table type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNestTableStatement {
    pub name: ObjectName,
    pub element_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymDeclaration {
    pub name: ObjectName,
    pub public: bool,
    pub target: ObjectName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDeclaration {
    pub name: ObjectName,
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub table: ObjectName,
    pub for_each_row: bool,
    pub condition: Option<Expression>,
    pub block: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    Insert,
    Update { columns: Vec<String> },
    Delete,
}

/// `IF ... THEN ... ELSIF ... ELSE ... END IF`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfStatement {
    pub branches: Vec<ConditionalBranch>,
    pub else_body: Option<Body>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalBranch {
    pub condition: Expression,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStatement {
    pub label: Option<String>,
    pub kind: LoopKind,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopKind {
    /// `LOOP ... END LOOP`
    Basic,
    /// `WHILE cond LOOP`
    While(Expression),
    /// `FOR i IN [REVERSE] low..high LOOP`
    ForRange {
        variable: String,
        reverse: bool,
        low: Expression,
        high: Expression,
    },
    /// `FOR rec IN cursor LOOP` / `FOR rec IN (SELECT ...) LOOP`
    ForCursor { record: String, source: Expression },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectStatement {
    pub distinct: bool,
    pub columns: Vec<Expression>,
    pub bulk_collect: bool,
    pub into: Vec<Expression>,
    pub from: Vec<Expression>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub expression: Expression,
    pub descending: bool,
}

/// `UPDATE t SET a = 1, (b, c) = (SELECT ...) WHERE ...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatement {
    pub table: Expression,
    /// Each item is a `Binary` expression with operator `=`
    pub set: Vec<Expression>,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertStatement {
    pub table: Expression,
    pub columns: Vec<Expression>,
    pub source: InsertSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertSource {
    Values(Vec<Expression>),
    Query(Box<Statement>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStatement {
    pub table: Expression,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStatement {
    pub target: Expression,
    pub source: Expression,
    pub on: Expression,
    pub matched: Option<MergeUpdate>,
    pub not_matched: Option<MergeInsert>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeUpdate {
    pub set: Vec<Expression>,
    pub where_clause: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeInsert {
    pub columns: Vec<Expression>,
    pub values: Vec<Expression>,
}

/// `CASE [selector] WHEN ... THEN ... [ELSE ...] END [CASE]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseWhenStatement {
    pub selector: Option<Box<Expression>>,
    pub branches: Vec<CaseWhenBranch>,
    pub else_result: Option<CaseResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseWhenBranch {
    pub condition: Expression,
    pub result: CaseResult,
}

/// A CASE arm yields a value in expressions and runs statements otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseResult {
    Expression(Box<Expression>),
    Statements(Body),
}
