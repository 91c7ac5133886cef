use super::*;
use crate::test_support::TestTree;
use ft_common::tree::{BinaryOp, DeclKind, NodeKind};

#[test]
fn a_const_literal_keeps_its_literal_type() {
    let mut tree = TestTree::new();
    let five = tree.number(5.0);
    let x_name = tree.identifier("x");
    let var_decl = tree.push(NodeKind::VarDecl {
        kind: DeclKind::Const,
        name: x_name,
        init: Some(five),
    });
    let program = tree.push(NodeKind::Program(vec![var_decl]));

    let analyzer = crate::ConstraintAnalyzer::new(&tree, "const x = 5;");
    let (result, _factory) = analyzer.analyze_program(program);

    let annotation = result
        .annotations
        .iter()
        .find(|a| a.node == x_name)
        .expect("x should be annotated");
    assert_eq!(annotation.type_string, "5");
}

/// Each call to a generalized function instantiates its own fresh copy of
/// the parameter/return variables, so the argument type observed here does
/// not flow back through the body's own (separately solved) return-flow
/// constraint; the call resolves to `unknown` rather than to the literal
/// argument type. Call-site-driven parameter inference of this kind is the
/// flow-sensitive analyzer's job (its dedicated call-site aggregation
/// pass); this path trades that precision for genuine let-polymorphism.
#[test]
fn a_generalized_functions_call_site_does_not_leak_into_its_body() {
    let mut tree = TestTree::new();

    let param_name = tree.identifier("a");
    let param = tree.push(NodeKind::Param {
        name: param_name,
        default: None,
        rest: false,
        type_annotation: None,
    });
    let return_arg = tree.identifier("a");
    let return_stmt = tree.push(NodeKind::Return(Some(return_arg)));
    let body = tree.push(NodeKind::Block(vec![return_stmt]));
    let fn_name = tree.identifier("id");
    let fn_decl = tree.push(NodeKind::FunctionDecl {
        name: Some(fn_name),
        params: vec![param],
        body,
        is_async: false,
        is_generator: false,
    });

    let callee = tree.identifier("id");
    let arg = tree.number(5.0);
    let call_expr = tree.push(NodeKind::Call {
        callee,
        args: vec![arg],
        optional: false,
    });
    let call_stmt = tree.push(NodeKind::ExprStmt(call_expr));

    let program = tree.push(NodeKind::Program(vec![fn_decl, call_stmt]));

    let analyzer = crate::ConstraintAnalyzer::new(&tree, "function id(a) { return a; } id(5);");
    let (result, _factory) = analyzer.analyze_program(program);

    let call_annotation = result
        .annotations
        .iter()
        .find(|a| a.node == call_expr)
        .expect("the call expression should be annotated");
    assert_eq!(call_annotation.type_string, "unknown");
}

#[test]
fn adding_two_numbers_resolves_to_number() {
    let mut tree = TestTree::new();
    let left = tree.number(1.0);
    let right = tree.number(2.0);
    let add = tree.push(NodeKind::Binary {
        op: BinaryOp::Add,
        left,
        right,
    });
    let stmt = tree.push(NodeKind::ExprStmt(add));
    let program = tree.push(NodeKind::Program(vec![stmt]));

    let analyzer = crate::ConstraintAnalyzer::new(&tree, "1 + 2;");
    let (result, _factory) = analyzer.analyze_program(program);

    let annotation = result
        .annotations
        .iter()
        .find(|a| a.node == add)
        .expect("the addition should be annotated");
    assert_eq!(annotation.type_string, "number");
}

#[test]
fn member_access_on_an_object_literal_resolves_the_property_type() {
    let mut tree = TestTree::new();
    let key = tree.identifier("x");
    let value = tree.number(1.0);
    let object = tree.push(NodeKind::ObjectLiteral(vec![(key, value, false)]));
    let prop = tree.identifier("x");
    let member = tree.push(NodeKind::Member {
        object,
        property: prop,
        computed: false,
        optional: false,
    });
    let stmt = tree.push(NodeKind::ExprStmt(member));
    let program = tree.push(NodeKind::Program(vec![stmt]));

    let analyzer = crate::ConstraintAnalyzer::new(&tree, "({ x: 1 }).x;");
    let (result, _factory) = analyzer.analyze_program(program);

    let annotation = result
        .annotations
        .iter()
        .find(|a| a.node == member)
        .expect("the member access should be annotated");
    assert_eq!(annotation.type_string, "1");
}

#[test]
fn a_recursive_function_does_not_hang_the_generator() {
    let mut tree = TestTree::new();
    let n_name = tree.identifier("n");
    let param = tree.push(NodeKind::Param {
        name: n_name,
        default: None,
        rest: false,
        type_annotation: None,
    });
    let fn_name_ref = tree.identifier("loop");
    let arg = tree.identifier("n");
    let recurse_call = tree.push(NodeKind::Call {
        callee: fn_name_ref,
        args: vec![arg],
        optional: false,
    });
    let return_stmt = tree.push(NodeKind::Return(Some(recurse_call)));
    let body = tree.push(NodeKind::Block(vec![return_stmt]));
    let fn_name = tree.identifier("loop");
    let fn_decl = tree.push(NodeKind::FunctionDecl {
        name: Some(fn_name),
        params: vec![param],
        body,
        is_async: false,
        is_generator: false,
    });
    let program = tree.push(NodeKind::Program(vec![fn_decl]));

    let analyzer = crate::ConstraintAnalyzer::new(&tree, "function loop(n) { return loop(n); }");
    let (result, _factory) = analyzer.analyze_program(program);

    assert!(result.diagnostics.is_empty());
}
