use super::*;
use crate::factory::TypeFactory;

#[test]
fn identical_primitives_biunify_trivially() {
    let mut f = TypeFactory::new();
    let mut b = Bisubstitution::new();
    assert!(b.biunify(&mut f, &f.number(), &f.number()).is_ok());
}

#[test]
fn incompatible_primitives_fail() {
    let mut f = TypeFactory::new();
    let mut b = Bisubstitution::new();
    assert!(b.biunify(&mut f, &f.number(), &f.string()).is_err());
}

#[test]
fn never_flows_into_anything() {
    let mut f = TypeFactory::new();
    let mut b = Bisubstitution::new();
    assert!(b.biunify(&mut f, &f.never(), &f.string()).is_ok());
}

#[test]
fn anything_flows_into_unknown() {
    let mut f = TypeFactory::new();
    let mut b = Bisubstitution::new();
    assert!(b.biunify(&mut f, &f.number(), &f.unknown()).is_ok());
}

#[test]
fn type_var_accumulates_bounds_and_checks_transitively() {
    let mut f = TypeFactory::new();
    let mut b = Bisubstitution::new();
    let v = f.fresh_type_var("t", 0);
    assert!(b.biunify(&mut f, &f.number(), &v).is_ok());
    // number flows into v, so v flowing into string must now fail because
    // number doesn't flow into string transitively.
    assert!(b.biunify(&mut f, &v, &f.string()).is_err());
}

#[test]
fn object_with_extra_optional_property_is_compatible() {
    let mut f = TypeFactory::new();
    let mut b = Bisubstitution::new();
    let mut have = indexmap::IndexMap::new();
    have.insert(
        std::rc::Rc::from("a"),
        crate::ty::PropertyType {
            ty: f.number(),
            optional: false,
            readonly: false,
        },
    );
    let have_ty = f.object(have);

    let mut want = indexmap::IndexMap::new();
    want.insert(
        std::rc::Rc::from("a"),
        crate::ty::PropertyType {
            ty: f.number(),
            optional: false,
            readonly: false,
        },
    );
    want.insert(
        std::rc::Rc::from("b"),
        crate::ty::PropertyType {
            ty: f.string(),
            optional: true,
            readonly: false,
        },
    );
    let want_ty = f.object(want);

    assert!(b.biunify(&mut f, &have_ty, &want_ty).is_ok());
}
