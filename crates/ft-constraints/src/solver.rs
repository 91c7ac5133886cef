//! The biunification solver (§4.4.4): classifies the constraints emitted by
//! `generator` and solves them in phases — equalities first (with an occurs
//! check that creates recursive types), then flows, then the higher-level
//! property/callable/array/disjunction shapes, each decomposing into more
//! flows against the shared [`Bisubstitution`].
//!
//! Variable-to-variable equalities are additionally tracked in an `ena`
//! union-find table so two names known to denote the same type variable
//! (e.g. both sides of a literal `+` alternative) are recognized as one
//! representative instead of drifting apart under independent bound sets.

use std::rc::Rc;

use ena::unify::{InPlaceUnificationTable, UnifyKey};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use ft_common::{Diagnostic, Span};
use ft_types::{
    BiunifyError, Bisubstitution, Param, PropertyType, Ty, TyKind, TypeFactory, TypeVarId,
};

use crate::constraint::{Constraint, ConstraintKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EqVar(u32);

impl UnifyKey for EqVar {
    type Value = ();

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        EqVar(u)
    }

    fn tag() -> &'static str {
        "EqVar"
    }
}

pub struct Solver {
    bisub: Bisubstitution,
    eq_table: InPlaceUnificationTable<EqVar>,
    eq_keys: FxHashMap<TypeVarId, EqVar>,
}

impl Solver {
    pub fn new() -> Self {
        Self {
            bisub: Bisubstitution::new(),
            eq_table: InPlaceUnificationTable::new(),
            eq_keys: FxHashMap::default(),
        }
    }

    pub fn bisubstitution(&self) -> &Bisubstitution {
        &self.bisub
    }

    /// Runs every phase of §4.4.4's workflow in order; a constraint that
    /// fails to resolve becomes an `IncompatibleTypes` diagnostic rather
    /// than aborting the rest of the solve.
    pub fn solve(
        &mut self,
        factory: &mut TypeFactory,
        constraints: &[Constraint],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        self.run_phase(factory, constraints, diagnostics, |k| {
            matches!(k, ConstraintKind::Equal { .. })
        });
        self.run_phase(factory, constraints, diagnostics, |k| {
            matches!(k, ConstraintKind::Flow { .. })
        });
        self.run_phase(factory, constraints, diagnostics, |k| {
            matches!(k, ConstraintKind::HasProperty { .. })
        });
        self.run_phase(factory, constraints, diagnostics, |k| {
            matches!(k, ConstraintKind::IsCallable { .. })
        });
        self.run_phase(factory, constraints, diagnostics, |k| {
            matches!(k, ConstraintKind::ArrayElement { .. })
        });
        self.run_phase(factory, constraints, diagnostics, |k| {
            matches!(k, ConstraintKind::Disjunction(_))
        });
    }

    fn run_phase(
        &mut self,
        factory: &mut TypeFactory,
        constraints: &[Constraint],
        diagnostics: &mut Vec<Diagnostic>,
        pick: impl Fn(&ConstraintKind) -> bool,
    ) {
        for constraint in constraints.iter().filter(|c| pick(&c.kind)) {
            if let Err(err) = self.resolve(factory, &constraint.kind) {
                diagnostics.push(incompatible_diagnostic(constraint.span, &err));
            }
        }
    }

    fn resolve(
        &mut self,
        factory: &mut TypeFactory,
        kind: &ConstraintKind,
    ) -> Result<(), BiunifyError> {
        match kind {
            ConstraintKind::Flow { lhs, rhs } => self.bisub.biunify(factory, lhs, rhs),
            ConstraintKind::Equal { a, b } => self.solve_equal(factory, a, b),
            ConstraintKind::HasProperty {
                object,
                name,
                result,
            } => self.solve_has_property(factory, object, name, result),
            ConstraintKind::IsCallable {
                callee,
                args,
                result,
            } => self.solve_is_callable(factory, callee, args, result),
            ConstraintKind::ArrayElement { array, element } => {
                let required = factory.array(element.clone());
                self.bisub.biunify(factory, array, &required)
            }
            ConstraintKind::Disjunction(alternatives) => {
                self.solve_disjunction(factory, alternatives)
            }
        }
    }

    fn eq_key(&mut self, id: TypeVarId) -> EqVar {
        *self
            .eq_keys
            .entry(id)
            .or_insert_with(|| self.eq_table.new_key(()))
    }

    /// Classical equality: var/var unions the two identities in the
    /// union-find table (so later lookups see one representative); var/
    /// concrete binds through the bisubstitution in both directions, using
    /// `occurs` to detect when the bound type mentions the variable being
    /// bound and wrapping it in a recursive type instead of looping.
    fn solve_equal(&mut self, factory: &mut TypeFactory, a: &Ty, b: &Ty) -> Result<(), BiunifyError> {
        match (&a.kind, &b.kind) {
            (TyKind::TypeVar { id: id_a, .. }, TyKind::TypeVar { id: id_b, .. }) => {
                let key_a = self.eq_key(*id_a);
                let key_b = self.eq_key(*id_b);
                self.eq_table.union(key_a, key_b);
                self.bisub.biunify(factory, a, b)?;
                self.bisub.biunify(factory, b, a)
            }
            (TyKind::TypeVar { id, .. }, _) => self.bind_equal(factory, *id, a, b),
            (_, TyKind::TypeVar { id, .. }) => self.bind_equal(factory, *id, b, a),
            _ if ft_types::structural_eq(a, b) => Ok(()),
            _ => Err(BiunifyError::Incompatible {
                lhs: ft_types::format_type(a),
                rhs: ft_types::format_type(b),
            }),
        }
    }

    fn bind_equal(
        &mut self,
        factory: &mut TypeFactory,
        id: TypeVarId,
        var_ty: &Ty,
        other: &Ty,
    ) -> Result<(), BiunifyError> {
        let bound = if occurs(id, other) {
            factory.recursive(id, other.clone())
        } else {
            other.clone()
        };
        self.bisub.biunify(factory, var_ty, &bound)?;
        self.bisub.biunify(factory, &bound, var_ty)
    }

    /// The three-way alternative of §4.4.3: a record, a function, or an
    /// array may all carry a named property. Concrete shapes are resolved
    /// directly so `result` actually receives the property's type rather
    /// than only a coarse shape check; an unresolved variable falls back to
    /// requiring a minimal record shape (the common case in practice).
    fn solve_has_property(
        &mut self,
        factory: &mut TypeFactory,
        object: &Ty,
        name: &Rc<str>,
        result: &Ty,
    ) -> Result<(), BiunifyError> {
        match &object.kind {
            TyKind::Object { properties } => match properties.get(name.as_ref()) {
                Some(prop) => self.bisub.biunify(factory, &prop.ty, result),
                None => Err(BiunifyError::Incompatible {
                    lhs: format!("{{ missing {name} }}"),
                    rhs: format!("{{ required {name} }}"),
                }),
            },
            TyKind::Array { element, .. } => self.bisub.biunify(factory, element, result),
            TyKind::Class { instance, .. } => self.solve_has_property(factory, instance, name, result),
            _ if object.is_any() => {
                let any = factory.any(Some("property-of-any"));
                self.bisub.biunify(factory, &any, result)
            }
            TyKind::TypeVar { .. } => {
                let mut props = IndexMap::with_capacity(1);
                props.insert(
                    name.clone(),
                    PropertyType {
                        ty: result.clone(),
                        optional: false,
                        readonly: false,
                    },
                );
                let record = factory.object(props);
                self.bisub.biunify(factory, object, &record)
            }
            _ => Err(BiunifyError::Incompatible {
                lhs: ft_types::format_type(object),
                rhs: format!("{{ required {name} }}"),
            }),
        }
    }

    /// `f ≤ (a1…an) → ρ` — the call-site's own argument types become the
    /// required function's parameter types (contravariance is handled by
    /// `biunify`'s existing function rule), and its return flows into
    /// `result`.
    fn solve_is_callable(
        &mut self,
        factory: &mut TypeFactory,
        callee: &Ty,
        args: &[Ty],
        result: &Ty,
    ) -> Result<(), BiunifyError> {
        let params = args
            .iter()
            .enumerate()
            .map(|(i, ty)| Param {
                name: Rc::from(format!("arg{i}")),
                ty: ty.clone(),
                optional: false,
                rest: false,
            })
            .collect();
        let required = factory.function(params, result.clone(), false, false);
        self.bisub.biunify(factory, callee, &required)
    }

    fn solve_disjunction(
        &mut self,
        factory: &mut TypeFactory,
        alternatives: &[Vec<ConstraintKind>],
    ) -> Result<(), BiunifyError> {
        let mut last_err = None;
        for alternative in alternatives {
            let snapshot = self.bisub.clone();
            let mut failed = None;
            for kind in alternative {
                if let Err(err) = self.resolve(factory, kind) {
                    failed = Some(err);
                    break;
                }
            }
            match failed {
                None => return Ok(()),
                Some(err) => {
                    self.bisub = snapshot;
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or(BiunifyError::Incompatible {
            lhs: "<no alternative>".to_string(),
            rhs: "<disjunction>".to_string(),
        }))
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

fn occurs(id: TypeVarId, ty: &Ty) -> bool {
    match &ty.kind {
        TyKind::TypeVar { id: other, .. } => *other == id,
        TyKind::Array { element, tuple } => {
            occurs(id, element) || tuple.as_ref().is_some_and(|m| m.iter().any(|t| occurs(id, t)))
        }
        TyKind::Object { properties } => properties.values().any(|p| occurs(id, &p.ty)),
        TyKind::Function {
            params, return_ty, ..
        } => params.iter().any(|p| occurs(id, &p.ty)) || occurs(id, return_ty),
        TyKind::Class {
            instance,
            static_properties,
            ..
        } => occurs(id, instance) || static_properties.values().any(|t| occurs(id, t)),
        TyKind::Promise(inner) => occurs(id, inner),
        TyKind::Union(members) | TyKind::Intersection(members) => {
            members.iter().any(|t| occurs(id, t))
        }
        TyKind::Recursive { body, .. } => occurs(id, body),
        TyKind::Scheme { body, .. } => occurs(id, body),
        _ => false,
    }
}

fn incompatible_diagnostic(span: Span, err: &BiunifyError) -> Diagnostic {
    let BiunifyError::Incompatible { lhs, rhs } = err;
    Diagnostic::incompatible_types(span, lhs, rhs)
}

#[cfg(test)]
#[path = "../tests/solver.rs"]
mod tests;
