use super::*;
use crate::test_support::TestTree;
use ft_binder::{Binding, DeclarationKind, Environment, ScopeKind};
use ft_common::tree::{BinaryOp, NodeKind, UnaryOp};
use ft_types::TypeFactory;

#[test]
fn typeof_guard_narrows_to_matching_branch_member() {
    let mut tree = TestTree::new();
    let mut f = TypeFactory::new();

    let x_ref = tree.identifier("x");
    let typeof_x = tree.push(NodeKind::Unary {
        op: UnaryOp::Typeof,
        argument: x_ref,
    });
    let tag = tree.string("string");
    let condition = tree.push(NodeKind::Binary {
        op: BinaryOp::StrictEqual,
        left: typeof_x,
        right: tag,
    });

    let union_ty = f.union(vec![f.number(), f.string()]);
    let env = Environment::new(ScopeKind::Global)
        .declare(Binding::new("x", 0, DeclarationKind::Let, union_ty));

    let narrowed_true = narrow(&tree, &mut f, &env, condition, true);
    assert!(ft_types::structural_eq(&narrowed_true.lookup("x").unwrap().ty, &f.string()));

    let narrowed_false = narrow(&tree, &mut f, &env, condition, false);
    assert!(ft_types::structural_eq(&narrowed_false.lookup("x").unwrap().ty, &f.number()));
}

#[test]
fn nullish_guard_narrows_away_null_and_undefined() {
    let mut tree = TestTree::new();
    let mut f = TypeFactory::new();

    let x_ref = tree.identifier("x");
    let null_lit = tree.push(NodeKind::NullLiteral);
    let condition = tree.push(NodeKind::Binary {
        op: BinaryOp::NotEqual,
        left: x_ref,
        right: null_lit,
    });

    let union_ty = f.union(vec![f.number(), f.null(), f.undefined()]);
    let env = Environment::new(ScopeKind::Global)
        .declare(Binding::new("x", 0, DeclarationKind::Let, union_ty));

    let narrowed_true = narrow(&tree, &mut f, &env, condition, true);
    assert!(ft_types::structural_eq(&narrowed_true.lookup("x").unwrap().ty, &f.number()));
}
