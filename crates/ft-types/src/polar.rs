//! Fresh type-variable generation and let-polymorphism (§4.4.3).
//!
//! Scope levels implement the standard level-based generalization check: a
//! type variable may be generalized only if its level is deeper than the
//! level active at the point of generalization (i.e. it was not unified with
//! something visible to an enclosing scope).

use rustc_hash::FxHashMap;

use crate::factory::TypeFactory;
use crate::ty::{Ty, TyKind, TypeVarId};

/// Tracks the current nesting level for fresh-variable creation. Entering a
/// `let`-bound function body bumps the level; generalizing that binding's
/// inferred type walks its free variables and keeps only the ones introduced
/// at or below the level being generalized.
#[derive(Debug, Default)]
pub struct LevelCounter {
    current: u32,
}

impl LevelCounter {
    pub fn enter(&mut self) -> u32 {
        self.current += 1;
        self.current
    }

    pub fn leave(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn level(&self) -> u32 {
        self.current
    }
}

/// Generalizes `ty` into a `Scheme` by quantifying over every free type
/// variable whose level is at least `boundary_level` (introduced inside the
/// binding being generalized, not visible outside it).
pub fn generalize(factory: &mut TypeFactory, ty: &Ty, boundary_level: u32) -> Ty {
    let mut vars = Vec::new();
    collect_generalizable_vars(ty, boundary_level, &mut vars);
    vars.sort_unstable();
    vars.dedup();
    if vars.is_empty() {
        ty.clone()
    } else {
        factory.scheme(vars, ty.clone())
    }
}

fn collect_generalizable_vars(ty: &Ty, boundary_level: u32, out: &mut Vec<TypeVarId>) {
    match &ty.kind {
        TyKind::TypeVar { id, level, .. } if *level >= boundary_level => out.push(*id),
        TyKind::TypeVar { .. } => {}
        TyKind::Array { element, tuple } => {
            collect_generalizable_vars(element, boundary_level, out);
            if let Some(members) = tuple {
                members
                    .iter()
                    .for_each(|m| collect_generalizable_vars(m, boundary_level, out));
            }
        }
        TyKind::Object { properties } => properties
            .values()
            .for_each(|p| collect_generalizable_vars(&p.ty, boundary_level, out)),
        TyKind::Function {
            params, return_ty, ..
        } => {
            params
                .iter()
                .for_each(|p| collect_generalizable_vars(&p.ty, boundary_level, out));
            collect_generalizable_vars(return_ty, boundary_level, out);
        }
        TyKind::Class {
            instance,
            static_properties,
            ..
        } => {
            collect_generalizable_vars(instance, boundary_level, out);
            static_properties
                .values()
                .for_each(|t| collect_generalizable_vars(t, boundary_level, out));
        }
        TyKind::Promise(inner) => collect_generalizable_vars(inner, boundary_level, out),
        TyKind::Union(members) | TyKind::Intersection(members) => members
            .iter()
            .for_each(|m| collect_generalizable_vars(m, boundary_level, out)),
        TyKind::Recursive { body, .. } => collect_generalizable_vars(body, boundary_level, out),
        TyKind::Scheme { body, .. } => collect_generalizable_vars(body, boundary_level, out),
        _ => {}
    }
}

/// Instantiates a `Scheme` with fresh type variables at the current level,
/// or returns `ty` unchanged if it is not a scheme.
pub fn instantiate(factory: &mut TypeFactory, ty: &Ty, level: u32) -> Ty {
    match &ty.kind {
        TyKind::Scheme { vars, body } => {
            let mut mapping = FxHashMap::default();
            for &v in vars {
                mapping.insert(v, factory.fresh_type_var("t", level));
            }
            substitute_vars(factory, body, &mapping)
        }
        _ => ty.clone(),
    }
}

fn substitute_vars(factory: &mut TypeFactory, ty: &Ty, mapping: &FxHashMap<TypeVarId, Ty>) -> Ty {
    match &ty.kind {
        TyKind::TypeVar { id, .. } => mapping.get(id).cloned().unwrap_or_else(|| ty.clone()),
        TyKind::Array { element, tuple } => {
            let element = substitute_vars(factory, element, mapping);
            match tuple {
                None => factory.array(element),
                Some(members) => {
                    let members = members
                        .iter()
                        .map(|m| substitute_vars(factory, m, mapping))
                        .collect();
                    factory.tuple(members)
                }
            }
        }
        TyKind::Object { properties } => {
            let mut new_props = indexmap::IndexMap::with_capacity(properties.len());
            for (name, prop) in properties {
                new_props.insert(
                    name.clone(),
                    crate::ty::PropertyType {
                        ty: substitute_vars(factory, &prop.ty, mapping),
                        optional: prop.optional,
                        readonly: prop.readonly,
                    },
                );
            }
            factory.object(new_props)
        }
        TyKind::Function {
            params,
            return_ty,
            is_async,
            is_generator,
        } => {
            let params = params
                .iter()
                .map(|p| crate::ty::Param {
                    name: p.name.clone(),
                    ty: substitute_vars(factory, &p.ty, mapping),
                    optional: p.optional,
                    rest: p.rest,
                })
                .collect();
            let return_ty = substitute_vars(factory, return_ty, mapping);
            factory.function(params, return_ty, *is_async, *is_generator)
        }
        TyKind::Promise(inner) => {
            let inner = substitute_vars(factory, inner, mapping);
            factory.promise(inner)
        }
        TyKind::Union(members) => {
            let members = members
                .iter()
                .map(|m| substitute_vars(factory, m, mapping))
                .collect();
            factory.union(members)
        }
        TyKind::Intersection(members) => {
            let members = members
                .iter()
                .map(|m| substitute_vars(factory, m, mapping))
                .collect();
            factory.intersection(members)
        }
        _ => ty.clone(),
    }
}

#[cfg(test)]
#[path = "../tests/polar.rs"]
mod tests;
