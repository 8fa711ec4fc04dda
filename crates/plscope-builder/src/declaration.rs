//! Declaration builders: declare sections, subprograms, packages and types

use plscope_ast::{
    Body, CursorDeclaration, DataType, Declaration, DeclarationKind, ExceptionHandler,
    FieldDeclaration, FunctionDeclaration, NestTableTypeDeclaration, ObjectName, PackageBody,
    PackageSpec, Parameter, ParameterMode, ProcedureDeclaration, RecordTypeDeclaration,
    VariableDeclaration,
};
use plscope_lexer::TokenKind;
use plscope_parser::{SyntaxKind, SyntaxNode};

use crate::builder::{internal, leading_name, name_of, required, BResult, Builder};

/// Local declarations, body and handlers of a subprogram
type Implementation = (Vec<Declaration>, Option<Body>, Vec<ExceptionHandler>);

impl<'s> Builder<'s> {
    /// Declarations of a declare section; unsupported ones are reported and skipped
    pub(crate) fn build_declarations(&mut self, section: &SyntaxNode) -> BResult<Vec<Declaration>> {
        let mut declarations = Vec::new();
        for node in section.nodes() {
            if let Some(kind) = self.build_declaration(node)? {
                declarations.push(Declaration::new(kind, node.span, node.position));
            }
        }
        Ok(declarations)
    }

    fn build_declaration(&mut self, node: &SyntaxNode) -> BResult<Option<DeclarationKind>> {
        let kind = match node.kind {
            SyntaxKind::VariableDeclaration => DeclarationKind::Variable(VariableDeclaration {
                name: leading_name(node, &[])?,
                data_type: self.build_data_type(required(node, SyntaxKind::TypeSpec)?)?,
                constant: node.has_keyword("CONSTANT"),
                not_null: node.has_keyword("NOT"),
                default: self.build_optional_expression(node.child(SyntaxKind::Expression))?,
            }),
            SyntaxKind::ExceptionDeclaration => DeclarationKind::Exception {
                name: leading_name(node, &[])?,
            },
            SyntaxKind::CursorDeclaration => DeclarationKind::Cursor(CursorDeclaration {
                name: leading_name(node, &["CURSOR"])?,
                parameters: self.build_parameters(node)?,
                return_type: match node.child(SyntaxKind::TypeSpec) {
                    Some(spec) => Some(self.build_data_type(spec)?),
                    None => None,
                },
                query: match node.child(SyntaxKind::SelectStatement) {
                    Some(select) => Some(Box::new(self.build_select(select)?)),
                    None => None,
                },
            }),
            SyntaxKind::TypeDeclaration => return self.build_type_declaration(node),
            SyntaxKind::ProcedureDeclaration => DeclarationKind::Procedure(self.build_procedure(node)?),
            SyntaxKind::FunctionDeclaration => DeclarationKind::Function(self.build_function(node)?),
            SyntaxKind::PragmaDeclaration => {
                let pragma = leading_name(node, &["PRAGMA"])?.to_ascii_uppercase();
                if pragma != "AUTONOMOUS_TRANSACTION" {
                    self.report(node, format!("unsupported: pragma {pragma}"));
                    return Ok(None);
                }
                DeclarationKind::AutonomousTransaction
            }
            other => return Err(internal(node, format!("{other:?} in declare section"))),
        };
        Ok(Some(kind))
    }

    fn build_type_declaration(&mut self, node: &SyntaxNode) -> BResult<Option<DeclarationKind>> {
        let name = leading_name(node, &["TYPE"])?;

        if node.has_keyword("TABLE") {
            let mut specs = node.children_of(SyntaxKind::TypeSpec);
            let element = specs
                .next()
                .ok_or_else(|| internal(node, "TABLE OF without element type"))?;
            let element_type = self.build_data_type(element)?;
            let index_by = match specs.next() {
                Some(spec) => Some(self.build_data_type(spec)?),
                None => None,
            };
            return Ok(Some(DeclarationKind::NestTableType(NestTableTypeDeclaration {
                name,
                element_type,
                index_by,
            })));
        }

        if node.has_keyword("RECORD") {
            return Ok(Some(DeclarationKind::RecordType(RecordTypeDeclaration {
                name,
                fields: self.build_fields(node)?,
            })));
        }

        let what = if node.has_keyword("VARRAY") { "varray" } else { "ref cursor" };
        self.report(node, format!("unsupported: {what} type declaration"));
        Ok(None)
    }

    // === Subprograms ===

    /// Shared by `CREATE PROCEDURE` and procedure declarations
    pub(crate) fn build_procedure(&mut self, node: &SyntaxNode) -> BResult<ProcedureDeclaration> {
        let (declarations, body, handlers) = self.build_implementation(node)?;
        Ok(ProcedureDeclaration {
            name: self.build_object_name(required(node, SyntaxKind::ObjectName)?)?,
            parameters: self.build_parameters(node)?,
            declarations,
            body,
            handlers,
        })
    }

    pub(crate) fn build_function(&mut self, node: &SyntaxNode) -> BResult<FunctionDeclaration> {
        let (declarations, body, handlers) = self.build_implementation(node)?;
        Ok(FunctionDeclaration {
            name: self.build_object_name(required(node, SyntaxKind::ObjectName)?)?,
            parameters: self.build_parameters(node)?,
            return_type: self.build_data_type(required(node, SyntaxKind::TypeSpec)?)?,
            declarations,
            body,
            handlers,
        })
    }

    fn build_implementation(&mut self, node: &SyntaxNode) -> BResult<Implementation> {
        let declarations = match node.child(SyntaxKind::DeclareSection) {
            Some(section) => self.build_declarations(section)?,
            None => Vec::new(),
        };
        match node.child(SyntaxKind::Body) {
            Some(body) => {
                let (body, handlers) = self.build_body(body)?;
                Ok((declarations, Some(body), handlers))
            }
            None => Ok((declarations, None, Vec::new())),
        }
    }

    fn build_parameters(&mut self, node: &SyntaxNode) -> BResult<Vec<Parameter>> {
        let Some(list) = node.child(SyntaxKind::ParameterList) else {
            return Ok(Vec::new());
        };

        let mut parameters = Vec::new();
        for param in list.children_of(SyntaxKind::Parameter) {
            let mode = match (param.has_keyword("IN"), param.has_keyword("OUT")) {
                (true, true) => ParameterMode::InOut,
                (false, true) => ParameterMode::Out,
                _ => ParameterMode::In,
            };
            parameters.push(Parameter {
                name: leading_name(param, &[])?,
                mode,
                data_type: self.build_data_type(required(param, SyntaxKind::TypeSpec)?)?,
                default: self.build_optional_expression(param.child(SyntaxKind::Expression))?,
                span: param.span,
                position: param.position,
            });
        }
        Ok(parameters)
    }

    // === Packages ===

    pub(crate) fn build_package_spec(&mut self, node: &SyntaxNode) -> BResult<PackageSpec> {
        Ok(PackageSpec {
            name: self.build_object_name(required(node, SyntaxKind::ObjectName)?)?,
            declarations: self.build_declarations(required(node, SyntaxKind::DeclareSection)?)?,
        })
    }

    pub(crate) fn build_package_body(&mut self, node: &SyntaxNode) -> BResult<PackageBody> {
        let initialization = match node.child(SyntaxKind::Body) {
            Some(body) => {
                let (body, handlers) = self.build_body(body)?;
                if !handlers.is_empty() {
                    self.report(node, "unsupported: exception handlers in package initialization");
                }
                Some(body)
            }
            None => None,
        };
        Ok(PackageBody {
            name: self.build_object_name(required(node, SyntaxKind::ObjectName)?)?,
            declarations: self.build_declarations(required(node, SyntaxKind::DeclareSection)?)?,
            initialization,
        })
    }

    // === Names and types ===

    pub(crate) fn build_object_name(&mut self, node: &SyntaxNode) -> BResult<ObjectName> {
        let words: Vec<String> = node.words().map(name_of).collect();
        match words.as_slice() {
            [name] => Ok(ObjectName::new(name.clone())),
            [schema, name] => Ok(ObjectName::qualified(schema.clone(), name.clone())),
            _ => Err(internal(node, "malformed object name")),
        }
    }

    /// `NUMBER(10, 2)`, `t.col%TYPE`, `VARCHAR2(20 CHAR)`
    pub(crate) fn build_data_type(&mut self, node: &SyntaxNode) -> BResult<DataType> {
        let mut name = String::new();
        let mut arguments = Vec::new();
        let mut attribute = None;
        let mut in_arguments = false;
        let mut after_percent = false;
        let mut previous_word = false;

        for token in node.tokens() {
            match token.kind {
                TokenKind::LParen => in_arguments = true,
                TokenKind::RParen => in_arguments = false,
                TokenKind::Percent => after_percent = true,
                TokenKind::Int | TokenKind::Star if in_arguments => arguments.push(token.text.clone()),
                TokenKind::Dot if !in_arguments => {
                    name.push('.');
                    previous_word = false;
                }
                kind if kind.is_word() && after_percent => {
                    attribute = Some(token.text.to_ascii_uppercase());
                }
                kind if kind.is_word() && !in_arguments => {
                    if previous_word {
                        name.push(' ');
                    }
                    name.push_str(&name_of(token));
                    previous_word = true;
                }
                _ => {}
            }
        }

        if name.is_empty() {
            return Err(internal(node, "type without a name"));
        }
        Ok(DataType { name, arguments, attribute })
    }

    pub(crate) fn build_fields(&mut self, node: &SyntaxNode) -> BResult<Vec<FieldDeclaration>> {
        let mut fields = Vec::new();
        for field in node.children_of(SyntaxKind::FieldSpec) {
            fields.push(FieldDeclaration {
                name: leading_name(field, &[])?,
                data_type: self.build_data_type(required(field, SyntaxKind::TypeSpec)?)?,
                span: field.span,
                position: field.position,
            });
        }
        Ok(fields)
    }
}
