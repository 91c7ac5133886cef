//! Structural equality (§4.1): unions compare as sets, objects compare as
//! mappings, functions compare pointwise, literals compare by value.
//!
//! This is deliberately separate from identity equality (`ty::ptr_eq`) —
//! two independently-constructed `object({a: number})` types are structurally
//! equal but not the same allocation.

use crate::ty::{Ty, TyKind};
use ft_common::limits::MAX_TYPE_WALK_DEPTH;

pub fn structural_eq(a: &Ty, b: &Ty) -> bool {
    eq_with_depth(a, b, 0)
}

fn eq_with_depth(a: &Ty, b: &Ty, depth: usize) -> bool {
    if crate::ty::ptr_eq(a, b) {
        return true;
    }
    if depth >= MAX_TYPE_WALK_DEPTH {
        // Two types that recurse this deep without resolving to the same
        // allocation are treated as equal to avoid runaway recursion on
        // pathological recursive types; `ft-types::bisubstitution` tracks
        // visited variables precisely for the cases that matter.
        return true;
    }
    let depth = depth + 1;

    match (&a.kind, &b.kind) {
        (TyKind::Never, TyKind::Never)
        | (TyKind::Unknown, TyKind::Unknown)
        | (TyKind::Null, TyKind::Null)
        | (TyKind::Undefined, TyKind::Undefined) => true,
        (TyKind::Any { .. }, TyKind::Any { .. }) => true,

        (TyKind::Number(x), TyKind::Number(y)) => x == y,
        (TyKind::String(x), TyKind::String(y)) => x == y,
        (TyKind::Boolean(x), TyKind::Boolean(y)) => x == y,
        (TyKind::BigInt(x), TyKind::BigInt(y)) => x == y,

        (
            TyKind::Array {
                element: e1,
                tuple: t1,
            },
            TyKind::Array {
                element: e2,
                tuple: t2,
            },
        ) => {
            eq_with_depth(e1, e2, depth)
                && match (t1, t2) {
                    (None, None) => true,
                    (Some(xs), Some(ys)) => {
                        xs.len() == ys.len()
                            && xs.iter().zip(ys).all(|(x, y)| eq_with_depth(x, y, depth))
                    }
                    _ => false,
                }
        }

        (TyKind::Object { properties: p1 }, TyKind::Object { properties: p2 }) => {
            p1.len() == p2.len()
                && p1.iter().all(|(name, prop1)| {
                    p2.get(name).is_some_and(|prop2| {
                        prop1.optional == prop2.optional
                            && prop1.readonly == prop2.readonly
                            && eq_with_depth(&prop1.ty, &prop2.ty, depth)
                    })
                })
        }

        (
            TyKind::Function {
                params: p1,
                return_ty: r1,
                is_async: a1,
                is_generator: g1,
            },
            TyKind::Function {
                params: p2,
                return_ty: r2,
                is_async: a2,
                is_generator: g2,
            },
        ) => {
            a1 == a2
                && g1 == g2
                && p1.len() == p2.len()
                && p1.iter().zip(p2).all(|(x, y)| {
                    x.optional == y.optional
                        && x.rest == y.rest
                        && eq_with_depth(&x.ty, &y.ty, depth)
                })
                && eq_with_depth(r1, r2, depth)
        }

        (TyKind::Promise(x), TyKind::Promise(y)) => eq_with_depth(x, y, depth),

        (TyKind::Union(xs), TyKind::Union(ys)) => members_eq_as_set(xs, ys, depth),
        (TyKind::Intersection(xs), TyKind::Intersection(ys)) => members_eq_as_set(xs, ys, depth),

        (
            TyKind::Class {
                name: n1,
                instance: i1,
                ..
            },
            TyKind::Class {
                name: n2,
                instance: i2,
                ..
            },
        ) => n1 == n2 && eq_with_depth(i1, i2, depth),

        (TyKind::TypeVar { id: x, .. }, TyKind::TypeVar { id: y, .. }) => x == y,

        (
            TyKind::Recursive {
                binder: b1,
                body: t1,
            },
            TyKind::Recursive {
                binder: b2,
                body: t2,
            },
        ) => b1 == b2 && eq_with_depth(t1, t2, depth),

        _ => false,
    }
}

/// Unions/intersections compare as sets: same cardinality, every member of
/// one has a structurally-equal counterpart in the other.
fn members_eq_as_set(xs: &[Ty], ys: &[Ty], depth: usize) -> bool {
    if xs.len() != ys.len() {
        return false;
    }
    xs.iter().all(|x| {
        ys.iter()
            .any(|y| eq_with_depth(x, y, depth) && count_eq(xs, x, depth) == count_eq(ys, x, depth))
    })
}

fn count_eq(members: &[Ty], target: &Ty, depth: usize) -> usize {
    members
        .iter()
        .filter(|m| eq_with_depth(m, target, depth))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::TypeFactory;

    #[test]
    fn identical_primitives_are_structurally_equal() {
        let mut f = TypeFactory::new();
        assert!(structural_eq(&f.number(), &f.number()));
    }

    #[test]
    fn literal_values_must_match() {
        let mut f = TypeFactory::new();
        let a = f.number_literal(1.0);
        let b = f.number_literal(2.0);
        assert!(!structural_eq(&a, &b));
    }

    #[test]
    fn unions_compare_as_sets() {
        let mut f = TypeFactory::new();
        let a = f.union(vec![f.number(), f.string()]);
        let b = f.union(vec![f.string(), f.number()]);
        assert!(structural_eq(&a, &b));
    }
}
