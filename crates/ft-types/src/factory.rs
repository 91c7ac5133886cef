//! Type factory and canonicalizer (§4.1).
//!
//! Singletons and literals are interned so that structurally identical
//! requests return the same allocation, which lets most call sites use
//! `Ty::ptr_eq` as a cheap pre-check before falling back to `structural_eq`.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ty::{Param, PropertyType, Ty, TyData, TyIdent, TyKind, TypeVarId};
use indexmap::IndexMap;

pub struct TypeFactory {
    next_ident: TyIdent,
    next_type_var: TypeVarId,

    never: Ty,
    unknown: Ty,
    null: Ty,
    undefined: Ty,
    number: Ty,
    string: Ty,
    boolean: Ty,
    bigint: Ty,

    number_literals: FxHashMap<u64, Ty>,
    string_literals: FxHashMap<Rc<str>, Ty>,
    boolean_literals: [Option<Ty>; 2],
    bigint_literals: FxHashMap<i128, Ty>,
}

impl TypeFactory {
    pub fn new() -> Self {
        let mut next_ident = 0;
        let mut mk = |kind: TyKind| -> Ty {
            let ident = next_ident;
            next_ident += 1;
            Rc::new(TyData { ident, kind })
        };

        let never = mk(TyKind::Never);
        let unknown = mk(TyKind::Unknown);
        let null = mk(TyKind::Null);
        let undefined = mk(TyKind::Undefined);
        let number = mk(TyKind::Number(None));
        let string = mk(TyKind::String(None));
        let boolean = mk(TyKind::Boolean(None));
        let bigint = mk(TyKind::BigInt(None));

        Self {
            next_ident,
            next_type_var: 0,
            never,
            unknown,
            null,
            undefined,
            number,
            string,
            boolean,
            bigint,
            number_literals: FxHashMap::default(),
            string_literals: FxHashMap::default(),
            boolean_literals: [None, None],
            bigint_literals: FxHashMap::default(),
        }
    }

    fn fresh_ident(&mut self) -> TyIdent {
        let id = self.next_ident;
        self.next_ident += 1;
        id
    }

    fn intern(&mut self, kind: TyKind) -> Ty {
        let ident = self.fresh_ident();
        Rc::new(TyData { ident, kind })
    }

    // --- singletons -----------------------------------------------------

    pub fn never(&self) -> Ty {
        self.never.clone()
    }
    pub fn unknown(&self) -> Ty {
        self.unknown.clone()
    }
    pub fn null(&self) -> Ty {
        self.null.clone()
    }
    pub fn undefined(&self) -> Ty {
        self.undefined.clone()
    }
    pub fn number(&self) -> Ty {
        self.number.clone()
    }
    pub fn string(&self) -> Ty {
        self.string.clone()
    }
    pub fn boolean(&self) -> Ty {
        self.boolean.clone()
    }
    pub fn bigint(&self) -> Ty {
        self.bigint.clone()
    }

    /// `any` carries an optional provenance reason (§7: "unresolved import",
    /// "unsupported syntax", etc.) purely for diagnostics; it never affects
    /// equality or join behavior, so it is not interned.
    pub fn any(&mut self, reason: Option<&str>) -> Ty {
        self.intern(TyKind::Any {
            reason: reason.map(Rc::from),
        })
    }

    // --- literals ---------------------------------------------------------

    pub fn number_literal(&mut self, value: f64) -> Ty {
        let bits = value.to_bits();
        if let Some(ty) = self.number_literals.get(&bits) {
            return ty.clone();
        }
        let ty = self.intern(TyKind::Number(Some(bits)));
        self.number_literals.insert(bits, ty.clone());
        ty
    }

    pub fn string_literal(&mut self, value: &str) -> Ty {
        if let Some(ty) = self.string_literals.get(value) {
            return ty.clone();
        }
        let key: Rc<str> = Rc::from(value);
        let ty = self.intern(TyKind::String(Some(key.clone())));
        self.string_literals.insert(key, ty.clone());
        ty
    }

    pub fn boolean_literal(&mut self, value: bool) -> Ty {
        if let Some(ty) = &self.boolean_literals[value as usize] {
            return ty.clone();
        }
        let ident = self.fresh_ident();
        let ty = Rc::new(TyData {
            ident,
            kind: TyKind::Boolean(Some(value)),
        });
        self.boolean_literals[value as usize] = Some(ty.clone());
        ty
    }

    pub fn bigint_literal(&mut self, value: i128) -> Ty {
        if let Some(ty) = self.bigint_literals.get(&value) {
            return ty.clone();
        }
        let ty = self.intern(TyKind::BigInt(Some(value)));
        self.bigint_literals.insert(value, ty.clone());
        ty
    }

    // --- compound constructors -------------------------------------------

    pub fn array(&mut self, element: Ty) -> Ty {
        self.intern(TyKind::Array {
            element,
            tuple: None,
        })
    }

    pub fn tuple(&mut self, elements: Vec<Ty>) -> Ty {
        let element = if elements.is_empty() {
            self.never()
        } else {
            self.union(elements.clone())
        };
        self.intern(TyKind::Array {
            element,
            tuple: Some(elements),
        })
    }

    pub fn object(&mut self, properties: IndexMap<Rc<str>, PropertyType>) -> Ty {
        self.intern(TyKind::Object { properties })
    }

    pub fn function(
        &mut self,
        params: Vec<Param>,
        return_ty: Ty,
        is_async: bool,
        is_generator: bool,
    ) -> Ty {
        self.intern(TyKind::Function {
            params,
            return_ty,
            is_async,
            is_generator,
        })
    }

    pub fn promise(&mut self, inner: Ty) -> Ty {
        self.intern(TyKind::Promise(inner))
    }

    pub fn class(
        &mut self,
        name: &str,
        constructor: Ty,
        instance: Ty,
        static_properties: IndexMap<Rc<str>, Ty>,
        super_class: Option<Ty>,
    ) -> Ty {
        self.intern(TyKind::Class {
            name: Rc::from(name),
            constructor,
            instance,
            static_properties,
            super_class,
        })
    }

    pub fn fresh_type_var(&mut self, display_name: &str, level: u32) -> Ty {
        let id = self.next_type_var;
        self.next_type_var += 1;
        self.intern(TyKind::TypeVar {
            id,
            display_name: Rc::from(display_name),
            level,
        })
    }

    /// Number of type variables minted so far, for `Stats::type_variable_count`.
    pub fn type_var_count(&self) -> u32 {
        self.next_type_var
    }

    pub fn recursive(&mut self, binder: TypeVarId, body: Ty) -> Ty {
        self.intern(TyKind::Recursive { binder, body })
    }

    pub fn scheme(&mut self, vars: Vec<TypeVarId>, body: Ty) -> Ty {
        self.intern(TyKind::Scheme { vars, body })
    }

    // --- canonicalization (§4.1) ------------------------------------------

    /// Flattens nested unions, drops `never`, deduplicates structurally-equal
    /// members, collapses to `any` if any member is `any`, and returns the
    /// sole member directly if exactly one remains after reduction.
    pub fn union(&mut self, members: Vec<Ty>) -> Ty {
        let mut flat = Vec::with_capacity(members.len());
        flatten_union(members, &mut flat);

        if flat.iter().any(|t| t.is_any()) {
            return self.any(None);
        }

        flat.retain(|t| !t.is_never());

        let mut deduped: Vec<Ty> = Vec::with_capacity(flat.len());
        for member in flat {
            if !deduped
                .iter()
                .any(|existing| crate::equality::structural_eq(existing, &member))
            {
                deduped.push(member);
            }
        }

        match deduped.len() {
            0 => self.never(),
            1 => deduped.into_iter().next().unwrap(),
            _ => self.intern(TyKind::Union(deduped)),
        }
    }

    /// Dual of `union`: flattens nested intersections, drops `unknown`,
    /// collapses to `never` if any member is `never`, dedupes, and unwraps a
    /// singleton.
    pub fn intersection(&mut self, members: Vec<Ty>) -> Ty {
        let mut flat = Vec::with_capacity(members.len());
        flatten_intersection(members, &mut flat);

        if flat.iter().any(|t| t.is_never()) {
            return self.never();
        }

        flat.retain(|t| !matches!(t.kind, TyKind::Unknown));

        let mut deduped: Vec<Ty> = Vec::with_capacity(flat.len());
        for member in flat {
            if !deduped
                .iter()
                .any(|existing| crate::equality::structural_eq(existing, &member))
            {
                deduped.push(member);
            }
        }

        match deduped.len() {
            0 => self.unknown(),
            1 => deduped.into_iter().next().unwrap(),
            _ => self.intern(TyKind::Intersection(deduped)),
        }
    }

    /// Literal widening (§4.1): a literal type's enclosing declaration
    /// contributes the widened primitive once the binding is no longer
    /// treated as a literal-narrowed `const`.
    pub fn widen(&mut self, ty: &Ty) -> Ty {
        match &ty.kind {
            TyKind::Number(Some(_)) => self.number(),
            TyKind::String(Some(_)) => self.string(),
            TyKind::Boolean(Some(_)) => self.boolean(),
            TyKind::BigInt(Some(_)) => self.bigint(),
            TyKind::Array {
                element,
                tuple: Some(_),
            } => {
                let widened_element = self.widen(element);
                self.array(widened_element)
            }
            TyKind::Union(members) => {
                let widened: Vec<Ty> = members.iter().map(|m| self.widen(m)).collect();
                self.union(widened)
            }
            _ => ty.clone(),
        }
    }
}

impl Default for TypeFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_union(members: Vec<Ty>, out: &mut Vec<Ty>) {
    for member in members {
        match &member.kind {
            TyKind::Union(inner) => flatten_union(inner.clone(), out),
            _ => out.push(member),
        }
    }
}

fn flatten_intersection(members: Vec<Ty>, out: &mut Vec<Ty>) {
    for member in members {
        match &member.kind {
            TyKind::Intersection(inner) => flatten_intersection(inner.clone(), out),
            _ => out.push(member),
        }
    }
}

#[cfg(test)]
#[path = "../tests/factory.rs"]
mod tests;
