use super::*;
use ft_common::NodeId;
use ft_types::{Bisubstitution, TyKind, TypeFactory};

#[test]
fn a_variable_with_one_lower_bound_resolves_to_that_bound() {
    let mut factory = TypeFactory::new();
    let mut bisub = Bisubstitution::new();
    let var = factory.fresh_type_var("t", 0);
    let number = factory.number();
    let TyKind::TypeVar { id, .. } = var.kind else {
        unreachable!()
    };
    bisub.biunify(&mut factory, &number, &var).unwrap();

    let resolved = reconstruct(&mut factory, &bisub, &var);
    assert!(matches!(resolved.kind, TyKind::Number(None)));
    let _ = id;
}

#[test]
fn an_unconstrained_variable_resolves_to_unknown() {
    let mut factory = TypeFactory::new();
    let bisub = Bisubstitution::new();
    let var = factory.fresh_type_var("t", 0);

    let resolved = reconstruct(&mut factory, &bisub, &var);
    assert!(matches!(resolved.kind, TyKind::Unknown));
}

#[test]
fn reconstruct_all_resolves_every_recorded_node() {
    let mut factory = TypeFactory::new();
    let mut bisub = Bisubstitution::new();
    let var = factory.fresh_type_var("t", 0);
    let string = factory.string();
    let TyKind::TypeVar { .. } = var.kind else {
        unreachable!()
    };
    bisub.biunify(&mut factory, &string, &var).unwrap();

    let mut node_types = rustc_hash::FxHashMap::default();
    node_types.insert(0 as NodeId, var);

    let resolved = reconstruct_all(&mut factory, &bisub, &node_types);
    let ty = resolved.get(&0).unwrap();
    assert!(matches!(ty.kind, TyKind::String(None)));
}

#[test]
fn union_of_functions_with_the_same_arity_keeps_the_more_specific_return_type() {
    let mut factory = TypeFactory::new();
    let bisub = Bisubstitution::new();
    let vague = factory.function(vec![], factory.unknown(), false, false);
    let precise = factory.function(vec![], factory.number(), false, false);
    let union = factory.union(vec![vague, precise]);

    let resolved = reconstruct(&mut factory, &bisub, &union);
    match &resolved.kind {
        TyKind::Function { return_ty, .. } => {
            assert!(matches!(return_ty.kind, TyKind::Number(None)));
        }
        other => panic!("expected a single function, got {other:?}"),
    }
}
