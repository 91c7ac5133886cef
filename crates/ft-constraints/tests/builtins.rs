use super::*;
use ft_types::{TyKind, TypeFactory};

#[test]
fn console_and_math_are_available() {
    let mut f = TypeFactory::new();
    let env = global_environment(&mut f);
    assert!(env.lookup("console").is_some());
    assert!(env.lookup("Math").is_some());
    assert!(env.lookup("JSON").is_some());
}

#[test]
fn math_pi_is_a_number() {
    let mut f = TypeFactory::new();
    let env = global_environment(&mut f);
    let math = &env.lookup("Math").unwrap().ty;
    match &math.kind {
        TyKind::Object { properties } => {
            let pi = &properties.get("PI").unwrap().ty;
            assert!(matches!(pi.kind, TyKind::Number(None)));
        }
        other => panic!("expected object, got {other:?}"),
    }
}
