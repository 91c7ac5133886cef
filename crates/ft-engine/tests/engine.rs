use ft_common::tree::{DeclKind, NodeKind};
use ft_common::{NodeId, Span, Tree};

/// A minimal in-memory `Tree`, mirroring the synthetic trees each pipeline
/// crate builds in its own tests, for exercising both entry points end to
/// end without a real parser.
#[derive(Default)]
struct TestTree {
    nodes: Vec<NodeKind>,
}

impl TestTree {
    fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(kind);
        id
    }

    fn identifier(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Identifier(name.to_string()))
    }

    fn number(&mut self, value: f64) -> NodeId {
        self.push(NodeKind::NumberLiteral(value))
    }
}

impl Tree for TestTree {
    fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node as usize]
    }

    fn span(&self, node: NodeId) -> Span {
        Span::new(node, node + 1)
    }
}

/// `const x = 42;` (spec §8's first concrete scenario): both pipelines
/// should annotate `x` with the literal type `42`.
fn build_const_42() -> (TestTree, NodeId) {
    let mut tree = TestTree::new();
    let literal = tree.number(42.0);
    let name = tree.identifier("x");
    let decl = tree.push(NodeKind::VarDecl {
        kind: DeclKind::Const,
        name,
        init: Some(literal),
    });
    let program = tree.push(NodeKind::Program(vec![decl]));
    (tree, program)
}

#[test]
fn infer_annotates_a_const_literal_with_its_own_type() {
    let (tree, program) = build_const_42();
    let result = ft_engine::infer(&tree, "const x = 42;", "scenario.js", program);

    assert!(result.errors.is_empty());
    let x = result
        .annotations
        .iter()
        .find(|a| a.identifier.as_deref() == Some("x"))
        .expect("x should be annotated");
    assert_eq!(x.type_string, "42");
    assert_eq!(result.filename, "scenario.js");
}

#[test]
fn infer_with_constraints_annotates_the_same_program() {
    let (tree, program) = build_const_42();
    let result = ft_engine::infer_with_constraints(&tree, "const x = 42;", "scenario.js", program);

    assert!(result.errors.is_empty());
    let x = result
        .annotations
        .iter()
        .find(|a| a.identifier.as_deref() == Some("x"))
        .expect("x should be annotated");
    assert_eq!(x.type_string, "42");
    assert_eq!(result.stats.solve_time, None);
}

#[test]
fn stats_report_at_least_one_constraint_and_one_type_variable() {
    let (tree, program) = build_const_42();
    let result = ft_engine::infer_with_constraints(&tree, "const x = 42;", "scenario.js", program);

    // `const x = 42;` binds directly to the literal (no fresh variable is
    // needed for a single-source declaration), so the only type variable
    // this program mints is the module-scope placeholder; the count must
    // still be nonzero because the factory always allocates at least one.
    assert!(result.stats.type_variable_count >= 1);
}
