//! Scope chain stored as an arena of frames
//!
//! Frames are addressed by [`ScopeId`] and link to their parent by id. Names
//! are case-insensitive. Transient scopes (blocks, calls, loop variables) are
//! released in stack order; package scopes live as long as the environment.

use std::collections::HashMap;

use crate::{RuntimeError, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct Frame {
    values: HashMap<String, Value>,
    parent: Option<ScopeId>,
}

#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    current: ScopeId,
}

fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}

impl Environment {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
            current: ScopeId(0),
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Number of frames from the current scope to the root, inclusive
    pub fn depth(&self) -> usize {
        std::iter::successors(Some(self.current), |scope| self.parent(*scope)).count()
    }

    fn frame(&self, scope: ScopeId) -> &Frame {
        &self.frames[scope.0]
    }

    fn frame_mut(&mut self, scope: ScopeId) -> &mut Frame {
        &mut self.frames[scope.0]
    }

    fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.frames.get(scope.0).and_then(|frame| frame.parent)
    }

    /// Bind `name` in the current scope, shadowing outer bindings
    pub fn define(&mut self, name: &str, value: Value) {
        self.define_in(self.current, name, value);
    }

    pub fn define_in(&mut self, scope: ScopeId, name: &str, value: Value) {
        self.frame_mut(scope).values.insert(key(name), value);
    }

    /// Resolve `name` walking from the current scope outward
    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        let key = key(name);
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            let frame = self.frame(id);
            if let Some(value) = frame.values.get(&key) {
                return Ok(value.clone());
            }
            scope = frame.parent;
        }
        Err(RuntimeError::UndefinedVariable { name: name.to_string() })
    }

    /// Overwrite the innermost existing binding of `name`
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let key = key(name);
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            let frame = self.frame_mut(id);
            if let Some(slot) = frame.values.get_mut(&key) {
                *slot = value;
                return Ok(());
            }
            scope = frame.parent;
        }
        Err(RuntimeError::UndeclaredAssignmentTarget { name: name.to_string() })
    }

    fn ancestor(&self, distance: usize) -> Result<ScopeId, RuntimeError> {
        let mut scope = self.current;
        for _ in 0..distance {
            scope = self.parent(scope).ok_or_else(|| RuntimeError::ScopeDepthExceeded {
                distance,
                depth: self.depth(),
            })?;
        }
        Ok(scope)
    }

    /// Read `name` exactly `distance` frames up; 0 is the current scope
    pub fn get_at(&self, distance: usize, name: &str) -> Result<Value, RuntimeError> {
        let scope = self.ancestor(distance)?;
        self.get_local(scope, name)
            .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.to_string() })
    }

    pub fn assign_at(&mut self, distance: usize, name: &str, value: Value) -> Result<(), RuntimeError> {
        let scope = self.ancestor(distance)?;
        self.assign_local(scope, name, value)
    }

    /// Read a binding of exactly this frame
    pub fn get_local(&self, scope: ScopeId, name: &str) -> Option<Value> {
        self.frames.get(scope.0)?.values.get(&key(name)).cloned()
    }

    pub fn assign_local(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<(), RuntimeError> {
        let slot = self
            .frames
            .get_mut(scope.0)
            .and_then(|frame| frame.values.get_mut(&key(name)));
        match slot {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::UndeclaredAssignmentTarget { name: name.to_string() }),
        }
    }

    /// Sorted names bound directly in `scope`
    pub fn names(&self, scope: ScopeId) -> Vec<&str> {
        let mut names: Vec<_> = self
            .frames
            .get(scope.0)
            .map(|frame| frame.values.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Create a frame under `parent` without entering it
    pub fn allocate(&mut self, parent: ScopeId) -> ScopeId {
        self.frames.push(Frame {
            values: HashMap::new(),
            parent: Some(parent),
        });
        ScopeId(self.frames.len() - 1)
    }

    /// Make `scope` current, returning the scope to restore afterwards
    pub fn enter(&mut self, scope: ScopeId) -> ScopeId {
        std::mem::replace(&mut self.current, scope)
    }

    pub fn leave(&mut self, previous: ScopeId) {
        self.current = previous;
    }

    /// Drop a transient frame. Only the newest frame is reclaimed.
    pub fn release(&mut self, scope: ScopeId) {
        if scope.0 != 0 && scope.0 + 1 == self.frames.len() {
            self.frames.pop();
        }
    }

    /// Enter a new child of the current scope
    pub fn push_scope(&mut self) -> ScopeId {
        let scope = self.allocate(self.current);
        self.enter(scope);
        scope
    }

    /// Leave the current scope for its parent and discard it.
    ///
    /// Returns `false` at the root.
    pub fn pop_scope(&mut self) -> bool {
        let scope = self.current;
        match self.parent(scope) {
            Some(parent) => {
                self.leave(parent);
                self.release(scope);
                true
            }
            None => false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_walks_outward() {
        let mut env = Environment::new();
        env.define("x", Value::from(1i64));
        env.push_scope();
        env.push_scope();
        assert_eq!(env.get("X").unwrap(), Value::Number(1.0));
        assert_eq!(env.depth(), 3);
    }

    #[test]
    fn test_undefined_at_any_depth() {
        let mut env = Environment::new();
        for _ in 0..4 {
            assert_eq!(
                env.get("missing"),
                Err(RuntimeError::UndefinedVariable { name: "missing".into() })
            );
            env.push_scope();
        }
    }

    #[test]
    fn test_shadowing_is_undone_on_pop() {
        let mut env = Environment::new();
        env.define("x", Value::from(1i64));
        env.push_scope();
        env.define("x", Value::from("inner"));
        env.assign("x", Value::from("changed")).unwrap();
        assert_eq!(env.get("x").unwrap(), Value::from("changed"));
        assert!(env.pop_scope());
        assert_eq!(env.get("x").unwrap(), Value::Number(1.0));
        assert!(!env.pop_scope());
    }

    #[test]
    fn test_assign_reaches_outer_binding() {
        let mut env = Environment::new();
        env.define("total", Value::from(0i64));
        env.push_scope();
        env.assign("total", Value::from(5i64)).unwrap();
        env.pop_scope();
        assert_eq!(env.get("total").unwrap(), Value::Number(5.0));
        assert_eq!(
            env.assign("nope", Value::Null),
            Err(RuntimeError::UndeclaredAssignmentTarget { name: "nope".into() })
        );
    }

    #[test]
    fn test_distance_addressing() {
        let mut env = Environment::new();
        env.define("x", Value::from(1i64));
        env.push_scope();
        env.define("x", Value::from(2i64));

        assert_eq!(env.get_at(0, "x").unwrap(), Value::Number(2.0));
        assert_eq!(env.get_at(1, "x").unwrap(), Value::Number(1.0));
        env.assign_at(1, "x", Value::from(10i64)).unwrap();
        assert_eq!(env.get_at(1, "x").unwrap(), Value::Number(10.0));
        assert_eq!(
            env.get_at(2, "x"),
            Err(RuntimeError::ScopeDepthExceeded { distance: 2, depth: 2 })
        );
        assert!(matches!(
            env.assign_at(5, "x", Value::Null),
            Err(RuntimeError::ScopeDepthExceeded { distance: 5, .. })
        ));
    }

    #[test]
    fn test_allocated_scope_persists() {
        let mut env = Environment::new();
        let package = env.allocate(env.global());
        env.define_in(package, "counter", Value::from(0i64));

        let previous = env.enter(package);
        env.push_scope();
        env.assign("counter", Value::from(1i64)).unwrap();
        env.pop_scope();
        env.leave(previous);

        assert_eq!(env.get_local(package, "COUNTER"), Some(Value::Number(1.0)));
        assert!(env.get("counter").is_err());
        assert_eq!(env.names(package), vec!["COUNTER"]);
    }
}
