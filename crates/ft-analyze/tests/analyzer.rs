use super::*;
use crate::test_support::TestTree;
use ft_common::tree::{DeclKind, NodeKind};

#[test]
fn const_declaration_keeps_its_literal_annotation() {
    let mut tree = TestTree::new();
    let five = tree.number(5.0);
    let x_name = tree.identifier("x");
    let var_decl = tree.push(NodeKind::VarDecl {
        kind: DeclKind::Const,
        name: x_name,
        init: Some(five),
    });
    let program = tree.push(NodeKind::Program(vec![var_decl]));

    let analyzer = Analyzer::new(&tree, "const x = 5;");
    let (result, _factory) = analyzer.analyze_program(program);

    let annotation = result
        .annotations
        .iter()
        .find(|a| a.node == x_name)
        .expect("variable declaration should be annotated");
    assert_eq!(annotation.type_string, "5");
}

#[test]
fn let_declaration_widens_a_joined_conditional_to_a_union() {
    let mut tree = TestTree::new();
    let test = tree.push(NodeKind::BooleanLiteral(true));
    let one = tree.number(1.0);
    let a_str = tree.string("a");
    let conditional = tree.push(NodeKind::Conditional {
        test,
        consequent: one,
        alternate: a_str,
    });
    let x_name = tree.identifier("x");
    let var_decl = tree.push(NodeKind::VarDecl {
        kind: DeclKind::Let,
        name: x_name,
        init: Some(conditional),
    });
    let program = tree.push(NodeKind::Program(vec![var_decl]));

    let analyzer = Analyzer::new(&tree, "let x = true ? 1 : 'a';");
    let (result, _factory) = analyzer.analyze_program(program);

    let annotation = result
        .annotations
        .iter()
        .find(|a| a.node == x_name)
        .expect("variable declaration should be annotated");
    assert_eq!(annotation.type_string, "number | string");
}

/// An unannotated parameter used only via `return a;` should pick up the
/// type of the arguments observed at its call sites once the analyzer's
/// later passes can see them (§4.3's call-site aggregation).
#[test]
fn unannotated_parameter_is_inferred_from_call_sites() {
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

    let callee_ref = tree.identifier("id");
    let arg = tree.number(5.0);
    let call_expr = tree.push(NodeKind::Call {
        callee: callee_ref,
        args: vec![arg],
        optional: false,
    });
    let call_stmt = tree.push(NodeKind::ExprStmt(call_expr));

    let program = tree.push(NodeKind::Program(vec![fn_decl, call_stmt]));

    let analyzer = Analyzer::new(&tree, "function id(a) { return a; } id(5);");
    let (result, _factory) = analyzer.analyze_program(program);

    let call_annotation = result
        .annotations
        .iter()
        .find(|a| a.node == call_expr)
        .expect("the call expression should be annotated");
    assert_eq!(call_annotation.type_string, "number");
}

#[test]
fn no_diagnostics_for_a_well_typed_program() {
    let mut tree = TestTree::new();
    let five = tree.number(5.0);
    let x_name = tree.identifier("x");
    let var_decl = tree.push(NodeKind::VarDecl {
        kind: DeclKind::Const,
        name: x_name,
        init: Some(five),
    });
    let program = tree.push(NodeKind::Program(vec![var_decl]));

    let analyzer = Analyzer::new(&tree, "const x = 5;");
    let (result, _factory) = analyzer.analyze_program(program);

    assert!(result.diagnostics.is_empty());
}
