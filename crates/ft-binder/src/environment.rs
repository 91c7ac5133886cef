//! Persistent scope-chain environment (§3.2).
//!
//! Each `Environment` is a cheap `Rc` clone of the previous one; `declare`
//! and `assign` only reallocate the scopes on the path from the change down
//! to the root, so two branches of an `if` can each extend a shared prefix
//! without copying the whole chain.

use std::rc::Rc;

use ft_types::TypeFactory;
use rustc_hash::FxHashMap;

use crate::binding::Binding;
use crate::scope::{Scope, ScopeKind};

#[derive(Debug, Clone)]
pub struct Environment(Rc<Scope>);

impl Environment {
    pub fn new(kind: ScopeKind) -> Self {
        Environment(Scope::root(kind))
    }

    pub fn enter(&self, kind: ScopeKind) -> Self {
        Environment(Scope::child(&self.0, kind))
    }

    pub fn scope(&self) -> &Rc<Scope> {
        &self.0
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        let mut current = &self.0;
        loop {
            if let Some(b) = current.local(name) {
                return Some(b);
            }
            current = current.parent.as_ref()?;
        }
    }

    /// Adds or shadows a binding in the innermost scope.
    pub fn declare(&self, binding: Binding) -> Self {
        let mut bindings = self.0.bindings.clone();
        bindings.insert(binding.name.clone(), binding);
        Environment(Rc::new(Scope {
            kind: self.0.kind,
            parent: self.0.parent.clone(),
            bindings,
        }))
    }

    /// Updates an existing binding wherever it lives in the chain, rebuilding
    /// only the scopes between the root of this environment and the owning
    /// frame.
    pub fn assign(&self, name: &str, ty: ft_types::Ty) -> Self {
        let chain = self.chain_innermost_first();
        let Some(owner_idx) = chain.iter().position(|s| s.local(name).is_some()) else {
            return self.clone();
        };

        let owner = &chain[owner_idx];
        let mut bindings = owner.bindings.clone();
        if let Some(b) = bindings.get_mut(name) {
            b.mark_assigned(ty);
        }
        let mut rebuilt = Rc::new(Scope {
            kind: owner.kind,
            parent: owner.parent.clone(),
            bindings,
        });

        for scope in chain[..owner_idx].iter().rev() {
            rebuilt = Rc::new(Scope {
                kind: scope.kind,
                parent: Some(rebuilt),
                bindings: scope.bindings.clone(),
            });
        }

        Environment(rebuilt)
    }

    /// Flattens the whole chain into a single name -> binding map (inner
    /// scopes shadow outer ones), for callers that need to compare two
    /// environments or rebuild one from scratch (e.g. fixed-point
    /// convergence checks and loop-header widening in `ft-analyze`).
    pub fn flatten(&self) -> FxHashMap<Rc<str>, Binding> {
        let mut result = FxHashMap::default();
        for scope in self.chain_innermost_first().into_iter().rev() {
            for (name, binding) in &scope.bindings {
                result.insert(name.clone(), binding.clone());
            }
        }
        result
    }

    /// Replaces every binding's type via `f`, preserving scope structure and
    /// every other flag.
    pub fn map_types(&self, mut f: impl FnMut(&ft_types::Ty) -> ft_types::Ty) -> Self {
        fn rebuild(scope: &Rc<Scope>, f: &mut impl FnMut(&ft_types::Ty) -> ft_types::Ty) -> Rc<Scope> {
            let parent = scope.parent.as_ref().map(|p| rebuild(p, f));
            let bindings = scope
                .bindings
                .iter()
                .map(|(name, binding)| {
                    let mut b = binding.clone();
                    b.ty = f(&binding.ty);
                    (name.clone(), b)
                })
                .collect();
            Rc::new(Scope {
                kind: scope.kind,
                parent,
                bindings,
            })
        }
        Environment(rebuild(&self.0, &mut f))
    }

    fn chain_innermost_first(&self) -> Vec<Rc<Scope>> {
        let mut chain = Vec::new();
        let mut current = self.0.clone();
        loop {
            let parent = current.parent.clone();
            chain.push(current);
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }
        chain
    }

    /// Merges two environments reached along different control-flow edges
    /// into the environment that holds at their confluence point: names are
    /// unioned, binding types are joined (union), `definitely_assigned`
    /// requires both sides to agree, and `possibly_mutated` requires only
    /// one side to have mutated.
    pub fn join(a: &Environment, b: &Environment, factory: &mut TypeFactory) -> Environment {
        let chain_a = a.chain_innermost_first();
        let chain_b = b.chain_innermost_first();

        // The two branches are expected to share an identical scope-chain
        // shape since they diverged from a common ancestor without crossing
        // a function boundary; if they don't (defensive, should not happen
        // given how `ft-analyze` drives this), fall back to `a` with `b`'s
        // bindings merged in as extra names at the innermost frame.
        if chain_a.len() != chain_b.len() {
            return join_mismatched(a, b, factory);
        }

        let mut rebuilt: Option<Rc<Scope>> = None;
        for (scope_a, scope_b) in chain_a.iter().zip(chain_b.iter()).rev() {
            let mut bindings = FxHashMap::default();
            for name in scope_a.bindings.keys().chain(scope_b.bindings.keys()) {
                if bindings.contains_key(name) {
                    continue;
                }
                let merged = match (scope_a.bindings.get(name), scope_b.bindings.get(name)) {
                    (Some(x), Some(y)) => {
                        let mut m = x.clone();
                        m.ty = factory.union(vec![x.ty.clone(), y.ty.clone()]);
                        m.definitely_assigned = x.definitely_assigned && y.definitely_assigned;
                        m.possibly_mutated = x.possibly_mutated || y.possibly_mutated;
                        m
                    }
                    (Some(x), None) => {
                        let mut m = x.clone();
                        m.definitely_assigned = false;
                        m
                    }
                    (None, Some(y)) => {
                        let mut m = y.clone();
                        m.definitely_assigned = false;
                        m
                    }
                    (None, None) => unreachable!(),
                };
                bindings.insert(name.clone(), merged);
            }
            rebuilt = Some(Rc::new(Scope {
                kind: scope_a.kind,
                parent: rebuilt,
                bindings,
            }));
        }

        Environment(rebuilt.unwrap_or_else(|| Scope::root(ScopeKind::Global)))
    }
}

fn join_mismatched(a: &Environment, b: &Environment, factory: &mut TypeFactory) -> Environment {
    let mut result = a.clone();
    let mut current = Some(b.0.clone());
    while let Some(scope) = current {
        for binding in scope.bindings.values() {
            result = match result.lookup(&binding.name) {
                Some(existing) => {
                    let mut merged = existing.clone();
                    merged.ty = factory.union(vec![existing.ty.clone(), binding.ty.clone()]);
                    merged.possibly_mutated |= binding.possibly_mutated;
                    result.declare(merged)
                }
                None => {
                    let mut one_sided = binding.clone();
                    one_sided.definitely_assigned = false;
                    result.declare(one_sided)
                }
            };
        }
        current = scope.parent.clone();
    }
    result
}

#[cfg(test)]
#[path = "../tests/environment.rs"]
mod tests;
