use super::*;
use crate::factory::TypeFactory;
use crate::ty::TyKind;

#[test]
fn generalize_quantifies_vars_at_or_above_boundary() {
    let mut f = TypeFactory::new();
    let v = f.fresh_type_var("t", 3);
    let scheme = generalize(&mut f, &v, 2);
    match &scheme.kind {
        TyKind::Scheme { vars, .. } => assert_eq!(vars.len(), 1),
        other => panic!("expected scheme, got {other:?}"),
    }
}

#[test]
fn generalize_skips_vars_below_boundary() {
    let mut f = TypeFactory::new();
    let v = f.fresh_type_var("t", 1);
    let result = generalize(&mut f, &v, 2);
    assert!(crate::ty::ptr_eq(&result, &v));
}

#[test]
fn instantiate_replaces_scheme_vars_with_fresh_ones() {
    let mut f = TypeFactory::new();
    let v = f.fresh_type_var("t", 1);
    let scheme = generalize(&mut f, &v, 0);
    let a = instantiate(&mut f, &scheme, 5);
    let b = instantiate(&mut f, &scheme, 5);
    assert!(!crate::ty::ptr_eq(&a, &b));
}

#[test]
fn instantiate_on_non_scheme_is_identity() {
    let mut f = TypeFactory::new();
    let n = f.number();
    let result = instantiate(&mut f, &n, 0);
    assert!(crate::ty::ptr_eq(&result, &n));
}
