use super::*;
use crate::ty::TyKind;

#[test]
fn union_flattens_and_dedupes() {
    let mut f = TypeFactory::new();
    let inner = f.union(vec![f.number(), f.string()]);
    let outer = f.union(vec![inner, f.number(), f.boolean()]);
    match &outer.kind {
        TyKind::Union(members) => assert_eq!(members.len(), 3),
        other => panic!("expected union, got {other:?}"),
    }
}

#[test]
fn union_of_never_and_number_is_number() {
    let mut f = TypeFactory::new();
    let result = f.union(vec![f.never(), f.number()]);
    assert!(crate::ty::ptr_eq(&result, &f.number()));
}

#[test]
fn union_absorbs_any() {
    let mut f = TypeFactory::new();
    let any = f.any(Some("unresolved import"));
    let result = f.union(vec![f.number(), any]);
    assert!(result.is_any());
}

#[test]
fn union_of_single_member_unwraps() {
    let mut f = TypeFactory::new();
    let result = f.union(vec![f.number(), f.never()]);
    assert!(matches!(result.kind, TyKind::Number(None)));
}

#[test]
fn intersection_with_never_is_never() {
    let mut f = TypeFactory::new();
    let result = f.intersection(vec![f.number(), f.never()]);
    assert!(result.is_never());
}

#[test]
fn widening_a_literal_produces_the_primitive() {
    let mut f = TypeFactory::new();
    let literal = f.number_literal(42.0);
    let widened = f.widen(&literal);
    assert!(crate::ty::ptr_eq(&widened, &f.number()));
}

#[test]
fn literals_are_interned() {
    let mut f = TypeFactory::new();
    let a = f.string_literal("hello");
    let b = f.string_literal("hello");
    assert!(crate::ty::ptr_eq(&a, &b));
}

#[test]
fn union_canonicalization_is_idempotent() {
    let mut f = TypeFactory::new();
    let once = f.union(vec![f.number(), f.string(), f.number()]);
    let twice = f.union(vec![once.clone()]);
    assert!(crate::equality::structural_eq(&once, &twice));
}
