use super::*;
use crate::factory::TypeFactory;
use crate::ty::{Param, PropertyType};

#[test]
fn formats_primitives() {
    let f = TypeFactory::new();
    assert_eq!(format_type(&f.number()), "number");
    assert_eq!(format_type(&f.string()), "string");
    assert_eq!(format_type(&f.boolean()), "boolean");
}

#[test]
fn formats_string_literal_with_quotes() {
    let mut f = TypeFactory::new();
    let lit = f.string_literal("foo");
    assert_eq!(format_type(&lit), "\"foo\"");
}

#[test]
fn formats_union() {
    let mut f = TypeFactory::new();
    let u = f.union(vec![f.number(), f.undefined()]);
    assert_eq!(format_type(&u), "number | undefined");
}

#[test]
fn formats_array() {
    let mut f = TypeFactory::new();
    let a = f.array(f.number());
    assert_eq!(format_type(&a), "Array<number>");
}

#[test]
fn formats_object() {
    let mut f = TypeFactory::new();
    let mut props = indexmap::IndexMap::new();
    props.insert(
        std::rc::Rc::from("a"),
        PropertyType {
            ty: f.number(),
            optional: false,
            readonly: false,
        },
    );
    props.insert(
        std::rc::Rc::from("b"),
        PropertyType {
            ty: f.string(),
            optional: true,
            readonly: false,
        },
    );
    let o = f.object(props);
    assert_eq!(format_type(&o), "{ a: number; b?: string }");
}

#[test]
fn formats_function() {
    let mut f = TypeFactory::new();
    let params = vec![Param {
        name: std::rc::Rc::from("x"),
        ty: f.number(),
        optional: false,
        rest: false,
    }];
    let func = f.function(params, f.boolean(), false, false);
    assert_eq!(format_type(&func), "(x: number) => boolean");
}

#[test]
fn parenthesizes_union_inside_intersection() {
    let mut f = TypeFactory::new();
    let u = f.union(vec![f.number(), f.string()]);
    let mut props = indexmap::IndexMap::new();
    props.insert(
        std::rc::Rc::from("a"),
        PropertyType {
            ty: f.number(),
            optional: false,
            readonly: false,
        },
    );
    let obj = f.object(props);
    let i = f.intersection(vec![u, obj]);
    assert_eq!(format_type(&i), "(number | string) & { a: number }");
}
