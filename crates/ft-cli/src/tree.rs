//! The concrete `Tree` the parser builds: a flat arena of `NodeKind`s plus
//! one `Span` per node, indexed by `NodeId`.

use ft_common::tree::NodeKind;
use ft_common::{NodeId, Span, Tree};

#[derive(Default)]
pub struct ParsedTree {
    nodes: Vec<NodeKind>,
    spans: Vec<Span>,
}

impl ParsedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(kind);
        self.spans.push(span);
        id
    }
}

impl Tree for ParsedTree {
    fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node as usize]
    }

    fn span(&self, node: NodeId) -> Span {
        self.spans[node as usize]
    }
}
