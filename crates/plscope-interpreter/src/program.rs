//! Registry of everything a script declares
//!
//! The program indexes callables and packages by id and keeps the top-level
//! statements left for the execute pass. It borrows the AST, never owns it.

use std::collections::HashMap;
use std::rc::Rc;

use plscope_ast::{Declaration, PackageBody, PackageSpec, Statement};

use crate::environment::ScopeId;
use crate::{Callable, CallableId, PackageId};

/// A package spec with its body attached once seen
pub struct Package<'a> {
    name: String,
    spec: Option<&'a PackageSpec>,
    body: Option<&'a PackageBody>,
    scope: Option<ScopeId>,
    members: HashMap<String, CallableId>,
}

impl<'a> Package<'a> {
    pub fn new(name: impl Into<String>, spec: Option<&'a PackageSpec>) -> Self {
        Self {
            name: name.into(),
            spec,
            body: None,
            scope: None,
            members: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> Option<&'a PackageSpec> {
        self.spec
    }

    pub fn body(&self) -> Option<&'a PackageBody> {
        self.body
    }

    /// Frame holding package state; set when the body is attached
    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    pub(crate) fn attach_body(&mut self, body: &'a PackageBody, scope: ScopeId) {
        self.body = Some(body);
        self.scope = Some(scope);
        self.members.clear();
    }

    pub(crate) fn member(&self, name: &str) -> Option<CallableId> {
        self.members.get(&name.to_ascii_uppercase()).copied()
    }

    pub(crate) fn remember(&mut self, name: &str, id: CallableId) {
        self.members.insert(name.to_ascii_uppercase(), id);
    }

    pub fn resolved_members(&self) -> usize {
        self.members.len()
    }
}

#[derive(Default)]
pub struct Program<'a> {
    callables: Vec<Rc<dyn Callable<'a> + 'a>>,
    packages: Vec<Package<'a>>,
    procedures: HashMap<String, CallableId>,
    package_names: HashMap<String, PackageId>,
    /// Nested subprograms by declaration address and defining frame
    subprograms: HashMap<(usize, ScopeId), CallableId>,
    statements: Vec<&'a Statement>,
}

impl<'a> Program<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_callable(&mut self, callable: Rc<dyn Callable<'a> + 'a>) -> CallableId {
        self.callables.push(callable);
        CallableId(self.callables.len() - 1)
    }

    pub fn callable(&self, id: CallableId) -> Option<Rc<dyn Callable<'a> + 'a>> {
        self.callables.get(id.0).cloned()
    }

    pub fn callable_count(&self) -> usize {
        self.callables.len()
    }

    /// Callable already made for `decl` closing over `scope`.
    ///
    /// Frames are reused once released, so re-entering a block finds the
    /// callable made on its first entry.
    pub(crate) fn subprogram(&self, decl: &'a Declaration, scope: ScopeId) -> Option<CallableId> {
        self.subprograms.get(&(declaration_key(decl), scope)).copied()
    }

    pub(crate) fn remember_subprogram(&mut self, decl: &'a Declaration, scope: ScopeId, id: CallableId) {
        self.subprograms.insert((declaration_key(decl), scope), id);
    }

    /// Record a schema-level procedure or function
    pub fn name_procedure(&mut self, name: &str, id: CallableId) {
        self.procedures.insert(name.to_ascii_uppercase(), id);
    }

    pub fn procedure(&self, name: &str) -> Option<CallableId> {
        self.procedures.get(&name.to_ascii_uppercase()).copied()
    }

    pub fn add_package(&mut self, package: Package<'a>) -> PackageId {
        let id = PackageId(self.packages.len());
        self.package_names.insert(package.name().to_ascii_uppercase(), id);
        self.packages.push(package);
        id
    }

    pub fn package(&self, id: PackageId) -> Option<&Package<'a>> {
        self.packages.get(id.0)
    }

    pub(crate) fn package_mut(&mut self, id: PackageId) -> Option<&mut Package<'a>> {
        self.packages.get_mut(id.0)
    }

    pub fn package_named(&self, name: &str) -> Option<PackageId> {
        self.package_names.get(&name.to_ascii_uppercase()).copied()
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub(crate) fn retain(&mut self, stmt: &'a Statement) {
        self.statements.push(stmt);
    }

    /// Top-level statements for the execute pass, in source order
    pub fn statements(&self) -> &[&'a Statement] {
        &self.statements
    }
}

/// The AST outlives the program, so a declaration's address identifies it
fn declaration_key(decl: &Declaration) -> usize {
    decl as *const Declaration as usize
}
