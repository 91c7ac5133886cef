//! The control-flow graph itself (§3.3): basic blocks, typed terminators,
//! and edges carrying the kind/condition the narrowing pass needs.

use smallvec::SmallVec;

pub use ft_common::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    pub const NONE: BlockId = BlockId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Normal,
    TrueBranch,
    FalseBranch,
    BackEdge,
    Exception,
    Break,
    Continue,
    Finally,
}

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub from: BlockId,
    pub to: BlockId,
    pub kind: EdgeKind,
    /// The guard expression that must hold for this edge to be taken, used
    /// by the narrowing pass (§4.3's "narrowing from edge conditions"). Only
    /// `TrueBranch`/`FalseBranch` edges carry one.
    pub condition: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub enum Terminator {
    /// Falls through to the next block unconditionally (e.g. end of a
    /// non-terminating statement list, or an explicit `goto`-free join).
    Fallthrough(BlockId),
    Branch {
        condition: NodeId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Switch {
        discriminant: NodeId,
        /// `None` case test means the `default:` clause.
        cases: Vec<(Option<NodeId>, BlockId)>,
    },
    Return(Option<NodeId>),
    Throw(NodeId),
    /// A block whose statements never fall off the end and has no successor
    /// (e.g. the synthetic block after an infinite loop with no `break`).
    Unreachable,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub statements: Vec<NodeId>,
    pub terminator: Option<Terminator>,
    pub(crate) predecessors: SmallVec<[usize; 4]>,
    pub(crate) successors: SmallVec<[usize; 4]>,
}

#[derive(Debug, Clone)]
pub struct Cfg {
    pub(crate) blocks: Vec<Block>,
    pub edges: Vec<Edge>,
    pub entry: BlockId,
    pub exit: BlockId,
}

impl Cfg {
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        (0..self.blocks.len()).map(|i| BlockId(i as u32))
    }

    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.block(id)
            .successors
            .iter()
            .map(|&e| self.edges[e].to)
    }

    pub fn predecessors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.block(id)
            .predecessors
            .iter()
            .map(|&e| self.edges[e].from)
    }

    pub fn outgoing_edges(&self, id: BlockId) -> impl Iterator<Item = &Edge> + '_ {
        self.block(id).successors.iter().map(|&e| &self.edges[e])
    }

    pub fn incoming_edges(&self, id: BlockId) -> impl Iterator<Item = &Edge> + '_ {
        self.block(id)
            .predecessors
            .iter()
            .map(|&e| &self.edges[e])
    }

    pub fn is_back_edge(&self, edge: &Edge) -> bool {
        matches!(edge.kind, EdgeKind::BackEdge)
    }
}
