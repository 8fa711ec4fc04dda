//! Declaration AST nodes (declare sections, package members, subprograms)

use serde::{Deserialize, Serialize};
use crate::{Body, ExceptionHandler, Expression, Position, Span, Statement};

/// A declaration inside a `DECLARE`/`IS` section or a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub span: Span,
    pub position: Position,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, span: Span, position: Position) -> Self {
        Self { kind, span, position }
    }

    /// Declared name, if the declaration introduces one
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclarationKind::Variable(v) => Some(&v.name),
            DeclarationKind::Exception { name } => Some(name),
            DeclarationKind::Cursor(c) => Some(&c.name),
            DeclarationKind::NestTableType(t) => Some(&t.name),
            DeclarationKind::RecordType(r) => Some(&r.name),
            DeclarationKind::Function(f) => Some(&f.name.name),
            DeclarationKind::Procedure(p) => Some(&p.name.name),
            DeclarationKind::AutonomousTransaction => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    /// `v [CONSTANT] NUMBER [NOT NULL] [:= expr]`
    Variable(VariableDeclaration),

    /// `e EXCEPTION`
    Exception { name: String },

    /// `CURSOR c [(params)] IS SELECT ...`
    Cursor(CursorDeclaration),

    /// `TYPE t IS TABLE OF ...`
    NestTableType(NestTableTypeDeclaration),

    /// `TYPE r IS RECORD (...)`
    RecordType(RecordTypeDeclaration),

    /// `FUNCTION f (...) RETURN t [IS ... BEGIN ... END]`
    Function(FunctionDeclaration),

    /// `PROCEDURE p (...) [IS ... BEGIN ... END]`
    Procedure(ProcedureDeclaration),

    /// `PRAGMA AUTONOMOUS_TRANSACTION`
    AutonomousTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    pub data_type: DataType,
    pub constant: bool,
    pub not_null: bool,
    pub default: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<DataType>,
    pub query: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestTableTypeDeclaration {
    pub name: String,
    pub element_type: DataType,
    pub index_by: Option<DataType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypeDeclaration {
    pub name: String,
    pub fields: Vec<FieldDeclaration>,
}

/// Attribute of an object type or field of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    pub data_type: DataType,
    pub span: Span,
    pub position: Position,
}

/// Procedure with its local declarations and body.
///
/// `body` is `None` for forward declarations in a package spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureDeclaration {
    pub name: ObjectName,
    pub parameters: Vec<Parameter>,
    pub declarations: Vec<Declaration>,
    pub body: Option<Body>,
    pub handlers: Vec<ExceptionHandler>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: ObjectName,
    pub parameters: Vec<Parameter>,
    pub return_type: DataType,
    pub declarations: Vec<Declaration>,
    pub body: Option<Body>,
    pub handlers: Vec<ExceptionHandler>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: ObjectName,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageBody {
    pub name: ObjectName,
    pub declarations: Vec<Declaration>,
    /// Statements between the final `BEGIN` and `END`
    pub initialization: Option<Body>,
}

impl PackageBody {
    /// Procedures implemented by this body
    pub fn procedures(&self) -> impl Iterator<Item = &ProcedureDeclaration> {
        self.declarations.iter().filter_map(|decl| match &decl.kind {
            DeclarationKind::Procedure(p) => Some(p),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.declarations.iter().filter_map(|decl| match &decl.kind {
            DeclarationKind::Function(f) => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub mode: ParameterMode,
    pub data_type: DataType,
    pub default: Option<Expression>,
    pub span: Span,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterMode {
    #[default]
    In,
    Out,
    InOut,
}

/// A data type reference: `NUMBER(10, 2)`, `emp.sal%TYPE`, `data_object`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    /// Dotted type name as written, quotes removed
    pub name: String,
    /// Precision/scale/length arguments
    pub arguments: Vec<String>,
    /// `TYPE` or `ROWTYPE` for anchored declarations
    pub attribute: Option<String>,
}

impl DataType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            attribute: None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "({})", self.arguments.join(", "))?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, "%{attribute}")?;
        }
        Ok(())
    }
}

/// Optionally schema-qualified object name: `NTHIS."DATA_ROW"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectName {
    pub schema: Option<String>,
    pub name: String,
}

impl ObjectName {
    pub fn new(name: impl Into<String>) -> Self {
        Self { schema: None, name: name.into() }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Case-insensitive match on the unqualified name
    pub fn matches(&self, other: &ObjectName) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl std::fmt::Display for ObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
