//! A single scope frame in the scope chain (§3.2).

use rustc_hash::FxHashMap;
use std::rc::Rc;

use crate::binding::Binding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Module,
    Function,
    Block,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<Rc<Scope>>,
    pub(crate) bindings: FxHashMap<Rc<str>, Binding>,
}

impl Scope {
    pub fn root(kind: ScopeKind) -> Rc<Scope> {
        Rc::new(Scope {
            kind,
            parent: None,
            bindings: FxHashMap::default(),
        })
    }

    pub fn child(parent: &Rc<Scope>, kind: ScopeKind) -> Rc<Scope> {
        Rc::new(Scope {
            kind,
            parent: Some(parent.clone()),
            bindings: FxHashMap::default(),
        })
    }

    /// Looks up a binding in this scope only, without walking to the parent.
    pub fn local(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn nearest_function_or_global(self: &Rc<Scope>) -> Rc<Scope> {
        let mut current = self.clone();
        loop {
            if matches!(current.kind, ScopeKind::Function | ScopeKind::Global) {
                return current;
            }
            match &current.parent {
                Some(p) => current = p.clone(),
                None => return current,
            }
        }
    }
}
