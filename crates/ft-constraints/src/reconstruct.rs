//! Reconstruction (§4.4.5): once the solver has run, every node's recorded
//! type is resolved against its type variable's accumulated bounds and
//! simplified into the shape that gets reported back to the caller.

use rustc_hash::FxHashMap;

use ft_common::NodeId;
use ft_types::{Bisubstitution, Ty, TyKind, TypeFactory};

/// Walks `ty`, replacing every type variable with the join (union) of its
/// positive (lower) bounds, or `unknown` if the variable never received one.
/// Recurses into compound shapes so a partially-resolved function or object
/// type still gets its resolvable pieces filled in.
pub fn reconstruct(factory: &mut TypeFactory, bisub: &Bisubstitution, ty: &Ty) -> Ty {
    reconstruct_with_seen(factory, bisub, ty, &mut Vec::new())
}

fn reconstruct_with_seen(
    factory: &mut TypeFactory,
    bisub: &Bisubstitution,
    ty: &Ty,
    seen: &mut Vec<u32>,
) -> Ty {
    match &ty.kind {
        TyKind::TypeVar { id, .. } => {
            if seen.contains(id) {
                return factory.unknown();
            }
            let bounds = bisub.positive_bounds_of(*id).to_vec();
            if bounds.is_empty() {
                return factory.unknown();
            }
            seen.push(*id);
            let resolved: Vec<Ty> = bounds
                .iter()
                .map(|b| reconstruct_with_seen(factory, bisub, b, seen))
                .collect();
            seen.pop();
            simplify_union(factory, resolved)
        }

        TyKind::Array { element, tuple: None } => {
            let resolved = reconstruct_with_seen(factory, bisub, element, seen);
            factory.array(resolved)
        }
        TyKind::Array {
            tuple: Some(members),
            ..
        } => {
            let resolved: Vec<Ty> = members
                .iter()
                .map(|m| reconstruct_with_seen(factory, bisub, m, seen))
                .collect();
            factory.tuple(resolved)
        }

        TyKind::Object { properties } => {
            let mut resolved = indexmap::IndexMap::with_capacity(properties.len());
            for (name, prop) in properties {
                resolved.insert(
                    name.clone(),
                    ft_types::PropertyType {
                        ty: reconstruct_with_seen(factory, bisub, &prop.ty, seen),
                        optional: prop.optional,
                        readonly: prop.readonly,
                    },
                );
            }
            factory.object(resolved)
        }

        TyKind::Function {
            params,
            return_ty,
            is_async,
            is_generator,
        } => {
            let params = params
                .iter()
                .map(|p| ft_types::Param {
                    name: p.name.clone(),
                    ty: reconstruct_with_seen(factory, bisub, &p.ty, seen),
                    optional: p.optional,
                    rest: p.rest,
                })
                .collect();
            let return_ty = reconstruct_with_seen(factory, bisub, return_ty, seen);
            factory.function(params, return_ty, *is_async, *is_generator)
        }

        TyKind::Promise(inner) => {
            let inner = reconstruct_with_seen(factory, bisub, inner, seen);
            factory.promise(inner)
        }

        TyKind::Union(members) => {
            let resolved: Vec<Ty> = members
                .iter()
                .map(|m| reconstruct_with_seen(factory, bisub, m, seen))
                .collect();
            simplify_union(factory, resolved)
        }
        TyKind::Intersection(members) => {
            let resolved: Vec<Ty> = members
                .iter()
                .map(|m| reconstruct_with_seen(factory, bisub, m, seen))
                .collect();
            factory.intersection(resolved)
        }

        TyKind::Recursive { body, .. } => reconstruct_with_seen(factory, bisub, body, seen),
        TyKind::Scheme { body, .. } => reconstruct_with_seen(factory, bisub, body, seen),

        _ => ty.clone(),
    }
}

/// Drops redundant `unknown` members from a union that also has a concrete
/// alternative, and dedupes function members that share a parameter
/// signature by keeping the one with the more specific return type.
fn simplify_union(factory: &mut TypeFactory, members: Vec<Ty>) -> Ty {
    let has_concrete = members
        .iter()
        .any(|m| !matches!(m.kind, TyKind::Unknown));
    let filtered: Vec<Ty> = if has_concrete {
        members
            .into_iter()
            .filter(|m| !matches!(m.kind, TyKind::Unknown))
            .collect()
    } else {
        members
    };
    let deduped = dedupe_functions_by_signature(filtered);
    factory.union(deduped)
}

fn dedupe_functions_by_signature(members: Vec<Ty>) -> Vec<Ty> {
    let mut kept: Vec<Ty> = Vec::with_capacity(members.len());
    for member in members {
        let Some(existing_idx) = kept.iter().position(|k| same_param_shape(k, &member)) else {
            kept.push(member);
            continue;
        };
        if is_more_specific_return(&member, &kept[existing_idx]) {
            kept[existing_idx] = member;
        }
    }
    kept
}

fn same_param_shape(a: &Ty, b: &Ty) -> bool {
    match (&a.kind, &b.kind) {
        (TyKind::Function { params: p1, .. }, TyKind::Function { params: p2, .. }) => {
            p1.len() == p2.len()
        }
        _ => false,
    }
}

fn is_more_specific_return(candidate: &Ty, incumbent: &Ty) -> bool {
    let (TyKind::Function { return_ty: c, .. }, TyKind::Function { return_ty: i, .. }) =
        (&candidate.kind, &incumbent.kind)
    else {
        return false;
    };
    matches!(i.kind, TyKind::Unknown) && !matches!(c.kind, TyKind::Unknown)
}

/// Resolves every node the generator recorded a type for and returns the
/// finished `NodeId -> Ty` map, ready to drive `ft-common::Annotation`
/// construction.
pub fn reconstruct_all(
    factory: &mut TypeFactory,
    bisub: &Bisubstitution,
    node_types: &FxHashMap<NodeId, Ty>,
) -> FxHashMap<NodeId, Ty> {
    node_types
        .iter()
        .map(|(node, ty)| (*node, reconstruct(factory, bisub, ty)))
        .collect()
}

#[cfg(test)]
#[path = "../tests/reconstruct.rs"]
mod tests;
