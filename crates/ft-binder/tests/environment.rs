use super::*;
use crate::binding::{Binding, DeclarationKind};
use crate::scope::ScopeKind;
use ft_types::TypeFactory;

#[test]
fn lookup_walks_to_parent_scope() {
    let mut f = TypeFactory::new();
    let root = Environment::new(ScopeKind::Global);
    let root = root.declare(Binding::new("x", 0, DeclarationKind::Let, f.number()));
    let child = root.enter(ScopeKind::Block);
    assert!(child.lookup("x").is_some());
    assert!(child.lookup("y").is_none());
}

#[test]
fn declare_shadows_without_mutating_parent() {
    let mut f = TypeFactory::new();
    let root = Environment::new(ScopeKind::Global);
    let root = root.declare(Binding::new("x", 0, DeclarationKind::Let, f.number()));
    let child = root.enter(ScopeKind::Block);
    let child = child.declare(Binding::new("x", 1, DeclarationKind::Let, f.string()));

    assert!(ft_types::structural_eq(&child.lookup("x").unwrap().ty, &f.string()));
    assert!(ft_types::structural_eq(&root.lookup("x").unwrap().ty, &f.number()));
}

#[test]
fn assign_updates_binding_in_owning_frame() {
    let mut f = TypeFactory::new();
    let root = Environment::new(ScopeKind::Global);
    let root = root.declare(Binding::new("x", 0, DeclarationKind::Let, f.undefined()));
    let child = root.enter(ScopeKind::Block);
    let child = child.assign("x", f.number());

    assert!(ft_types::structural_eq(&child.lookup("x").unwrap().ty, &f.number()));
    assert!(child.lookup("x").unwrap().definitely_assigned);
    // The parent's own copy is untouched; only the rebuilt chain sees the change.
    assert!(ft_types::structural_eq(&root.lookup("x").unwrap().ty, &f.undefined()));
}

#[test]
fn join_unions_types_and_ands_definite_assignment() {
    let mut f = TypeFactory::new();
    let base = Environment::new(ScopeKind::Global);
    let base = base.declare(Binding::new("x", 0, DeclarationKind::Let, f.undefined()));

    let then_branch = base.assign("x", f.number());
    let else_branch = base.clone();

    let merged = Environment::join(&then_branch, &else_branch, &mut f);
    let binding = merged.lookup("x").unwrap();
    assert!(!binding.definitely_assigned);
    match &binding.ty.kind {
        ft_types::TyKind::Union(members) => assert_eq!(members.len(), 2),
        other => panic!("expected union, got {other:?}"),
    }
}

#[test]
fn join_ors_possibly_mutated() {
    let mut f = TypeFactory::new();
    let base = Environment::new(ScopeKind::Global);
    let base = base.declare(Binding::new("x", 0, DeclarationKind::Let, f.number()));

    let mutated = base.assign("x", f.number());
    let untouched = base.clone();

    let merged = Environment::join(&mutated, &untouched, &mut f);
    assert!(merged.lookup("x").unwrap().possibly_mutated);
}
