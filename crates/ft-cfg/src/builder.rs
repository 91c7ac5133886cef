//! Incremental CFG construction.
//!
//! The caller walks its own statement tree (functions, `if`, loops,
//! `switch`, `try`, `break`/`continue`, `return`/`throw`) and drives this
//! builder one statement/edge at a time; `ft-cfg` never parses anything
//! itself. A binder can build a flow graph incrementally alongside an AST
//! walk instead of from a pre-built tree.

use crate::graph::{Block, BlockId, Cfg, Edge, EdgeKind, NodeId, Terminator};

pub struct CfgBuilder {
    blocks: Vec<Block>,
    edges: Vec<Edge>,
    current: BlockId,
    /// Per nesting level: (break target, continue target) for `break`/
    /// `continue` statements (with an optional label handled by the caller
    /// before it reaches the builder).
    loop_stack: Vec<(BlockId, BlockId)>,
}

impl CfgBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            blocks: Vec::new(),
            edges: Vec::new(),
            current: BlockId::NONE,
            loop_stack: Vec::new(),
        };
        let entry = builder.new_block();
        builder.current = entry;
        builder
    }

    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::default());
        id
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    /// Whether the current block already has a terminator (e.g. a `break`/
    /// `return`/`throw` already closed it out). Callers that only want to
    /// add a fallthrough edge when a block actually falls off the end
    /// (switch cases, in particular) should check this first.
    pub fn current_has_terminator(&self) -> bool {
        self.blocks[self.current.index()].terminator.is_some()
    }

    pub fn set_current(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn push_statement(&mut self, node: NodeId) {
        self.blocks[self.current.index()].statements.push(node);
    }

    pub fn add_edge(&mut self, from: BlockId, to: BlockId, kind: EdgeKind, condition: Option<NodeId>) {
        if from == BlockId::NONE || to == BlockId::NONE {
            return;
        }
        let edge_idx = self.edges.len();
        self.edges.push(Edge {
            from,
            to,
            kind,
            condition,
        });
        self.blocks[from.index()].successors.push(edge_idx);
        self.blocks[to.index()].predecessors.push(edge_idx);
    }

    /// Terminates the current block with a fallthrough edge to `target` and
    /// makes `target` current.
    pub fn fallthrough_to(&mut self, target: BlockId) {
        self.blocks[self.current.index()].terminator = Some(Terminator::Fallthrough(target));
        self.add_edge(self.current, target, EdgeKind::Normal, None);
        self.current = target;
    }

    /// Emits an `if`/`else` branch: the current block gets a `Branch`
    /// terminator with true/false edges to the given blocks. The caller is
    /// responsible for building each arm and eventually joining them at a
    /// block it creates itself.
    pub fn branch(&mut self, condition: NodeId, then_block: BlockId, else_block: BlockId) {
        self.blocks[self.current.index()].terminator = Some(Terminator::Branch {
            condition,
            then_block,
            else_block,
        });
        self.add_edge(self.current, then_block, EdgeKind::TrueBranch, Some(condition));
        self.add_edge(self.current, else_block, EdgeKind::FalseBranch, Some(condition));
    }

    pub fn switch(&mut self, discriminant: NodeId, cases: Vec<(Option<NodeId>, BlockId)>) {
        for (test, target) in &cases {
            self.add_edge(self.current, *target, EdgeKind::Normal, *test);
        }
        self.blocks[self.current.index()].terminator = Some(Terminator::Switch {
            discriminant,
            cases,
        });
    }

    pub fn ret(&mut self, value: Option<NodeId>) {
        self.blocks[self.current.index()].terminator = Some(Terminator::Return(value));
    }

    pub fn throw(&mut self, value: NodeId) {
        self.blocks[self.current.index()].terminator = Some(Terminator::Throw(value));
    }

    /// Adds a loop back-edge from `from` to `header` and marks the current
    /// block unreachable if nothing falls through (the caller decides that
    /// by still calling `fallthrough_to` for the loop's exit separately).
    pub fn back_edge(&mut self, from: BlockId, header: BlockId) {
        self.add_edge(from, header, EdgeKind::BackEdge, None);
    }

    pub fn enter_loop(&mut self, break_target: BlockId, continue_target: BlockId) {
        self.loop_stack.push((break_target, continue_target));
    }

    pub fn exit_loop(&mut self) {
        self.loop_stack.pop();
    }

    pub fn current_break_target(&self) -> Option<BlockId> {
        self.loop_stack.last().map(|(b, _)| *b)
    }

    pub fn current_continue_target(&self) -> Option<BlockId> {
        self.loop_stack.last().map(|(_, c)| *c)
    }

    pub fn emit_break(&mut self) {
        if let Some(target) = self.current_break_target() {
            self.add_edge(self.current, target, EdgeKind::Break, None);
            self.blocks[self.current.index()].terminator = Some(Terminator::Fallthrough(target));
        }
    }

    pub fn emit_continue(&mut self) {
        if let Some(target) = self.current_continue_target() {
            self.add_edge(self.current, target, EdgeKind::Continue, None);
            self.blocks[self.current.index()].terminator = Some(Terminator::Fallthrough(target));
        }
    }

    pub fn finish(mut self, exit: BlockId) -> Cfg {
        for block in &mut self.blocks {
            if block.terminator.is_none() {
                block.terminator = Some(Terminator::Unreachable);
            }
        }
        Cfg {
            blocks: self.blocks,
            edges: self.edges,
            entry: BlockId(0),
            exit,
        }
    }
}

impl Default for CfgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/builder.rs"]
mod tests;
