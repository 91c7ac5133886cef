//! A minimal in-memory `Tree` used only by this crate's tests to build small
//! synthetic programs without a real parser.

use ft_common::tree::NodeKind;
use ft_common::{NodeId, Span, Tree};

#[derive(Default)]
pub struct TestTree {
    nodes: Vec<NodeKind>,
}

impl TestTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(kind);
        id
    }

    pub fn identifier(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Identifier(name.to_string()))
    }

    pub fn number(&mut self, value: f64) -> NodeId {
        self.push(NodeKind::NumberLiteral(value))
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.push(NodeKind::StringLiteral(value.to_string()))
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
