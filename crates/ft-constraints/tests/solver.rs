use super::*;
use ft_common::Span;
use ft_types::{PropertyType, TyKind, TypeFactory};

fn span() -> Span {
    Span::new(0, 1)
}

#[test]
fn a_flow_constraint_pins_a_variable_to_its_lower_bound() {
    let mut factory = TypeFactory::new();
    let mut solver = Solver::new();
    let var = factory.fresh_type_var("t", 0);
    let number = factory.number();

    let constraints = vec![Constraint::new(
        span(),
        ConstraintKind::Flow {
            lhs: number.clone(),
            rhs: var.clone(),
        },
    )];
    let mut diagnostics = Vec::new();
    solver.solve(&mut factory, &constraints, &mut diagnostics);

    assert!(diagnostics.is_empty());
    let TyKind::TypeVar { id, .. } = var.kind else {
        unreachable!()
    };
    assert_eq!(solver.bisubstitution().positive_bounds_of(id).len(), 1);
}

#[test]
fn incompatible_flow_produces_a_diagnostic_instead_of_aborting() {
    let mut factory = TypeFactory::new();
    let mut solver = Solver::new();
    let number = factory.number();
    let string = factory.string();

    let constraints = vec![Constraint::new(span(), ConstraintKind::Flow { lhs: number, rhs: string })];
    let mut diagnostics = Vec::new();
    solver.solve(&mut factory, &constraints, &mut diagnostics);

    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn equal_with_self_reference_binds_to_a_recursive_type_instead_of_looping() {
    let mut factory = TypeFactory::new();
    let mut solver = Solver::new();
    let var = factory.fresh_type_var("self", 0);
    let array_of_var = factory.array(var.clone());

    let constraints = vec![Constraint::new(
        span(),
        ConstraintKind::Equal {
            a: var.clone(),
            b: array_of_var,
        },
    )];
    let mut diagnostics = Vec::new();
    solver.solve(&mut factory, &constraints, &mut diagnostics);

    assert!(diagnostics.is_empty());
}

#[test]
fn has_property_on_an_object_resolves_the_property_type() {
    let mut factory = TypeFactory::new();
    let mut solver = Solver::new();
    let mut props = indexmap::IndexMap::new();
    props.insert(
        "x".into(),
        PropertyType {
            ty: factory.number(),
            optional: false,
            readonly: false,
        },
    );
    let object = factory.object(props);
    let result = factory.fresh_type_var("prop", 0);

    let constraints = vec![Constraint::new(
        span(),
        ConstraintKind::HasProperty {
            object,
            name: std::rc::Rc::from("x"),
            result: result.clone(),
        },
    )];
    let mut diagnostics = Vec::new();
    solver.solve(&mut factory, &constraints, &mut diagnostics);

    assert!(diagnostics.is_empty());
    let TyKind::TypeVar { id, .. } = result.kind else {
        unreachable!()
    };
    assert_eq!(solver.bisubstitution().positive_bounds_of(id).len(), 1);
}

#[test]
fn has_property_missing_from_an_object_is_a_diagnostic() {
    let mut factory = TypeFactory::new();
    let mut solver = Solver::new();
    let object = factory.object(indexmap::IndexMap::new());
    let result = factory.fresh_type_var("prop", 0);

    let constraints = vec![Constraint::new(
        span(),
        ConstraintKind::HasProperty {
            object,
            name: std::rc::Rc::from("missing"),
            result,
        },
    )];
    let mut diagnostics = Vec::new();
    solver.solve(&mut factory, &constraints, &mut diagnostics);

    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn is_callable_flows_the_call_result_into_the_requested_return_type() {
    let mut factory = TypeFactory::new();
    let mut solver = Solver::new();
    let return_ty = factory.number();
    let callee = factory.function(vec![], return_ty, false, false);
    let result = factory.fresh_type_var("call", 0);

    let constraints = vec![Constraint::new(
        span(),
        ConstraintKind::IsCallable {
            callee,
            args: vec![],
            result: result.clone(),
        },
    )];
    let mut diagnostics = Vec::new();
    solver.solve(&mut factory, &constraints, &mut diagnostics);

    assert!(diagnostics.is_empty());
    let TyKind::TypeVar { id, .. } = result.kind else {
        unreachable!()
    };
    assert_eq!(solver.bisubstitution().positive_bounds_of(id).len(), 1);
}

#[test]
fn disjunction_commits_the_first_alternative_that_succeeds() {
    let mut factory = TypeFactory::new();
    let mut solver = Solver::new();
    let number = factory.number();
    let string = factory.string();
    let left = factory.string();

    // The first alternative requires `left <= number`, which fails; the
    // solver should fall through to the second, which succeeds.
    let alternatives = vec![
        vec![ConstraintKind::Flow {
            lhs: left.clone(),
            rhs: number,
        }],
        vec![ConstraintKind::Flow {
            lhs: left,
            rhs: string,
        }],
    ];
    let constraints = vec![Constraint::new(span(), ConstraintKind::Disjunction(alternatives))];
    let mut diagnostics = Vec::new();
    solver.solve(&mut factory, &constraints, &mut diagnostics);

    assert!(diagnostics.is_empty());
}

#[test]
fn disjunction_reports_a_diagnostic_when_every_alternative_fails() {
    let mut factory = TypeFactory::new();
    let mut solver = Solver::new();
    let number = factory.number();
    let boolean = factory.boolean();
    let left = factory.string();

    let alternatives = vec![
        vec![ConstraintKind::Flow {
            lhs: left.clone(),
            rhs: number,
        }],
        vec![ConstraintKind::Flow { lhs: left, rhs: boolean }],
    ];
    let constraints = vec![Constraint::new(span(), ConstraintKind::Disjunction(alternatives))];
    let mut diagnostics = Vec::new();
    solver.solve(&mut factory, &constraints, &mut diagnostics);

    assert_eq!(diagnostics.len(), 1);
}
