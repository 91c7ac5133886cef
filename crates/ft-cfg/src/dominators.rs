//! Dominator computation and reverse-postorder numbering (§4.2).
//!
//! Classic iterative dataflow (Cooper, Harvey & Kennedy's "A Simple, Fast
//! Dominance Algorithm" shape, expressed with bitsets rather than the
//! idom-array formulation since the analyzer also wants full dominator sets
//! for widening-point detection).

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;

use crate::graph::{BlockId, Cfg};

pub struct Dominators {
    /// `dom[b]` is the set of blocks that dominate `b`, including `b`
    /// itself.
    dom: Vec<FixedBitSet>,
}

impl Dominators {
    pub fn compute(cfg: &Cfg) -> Self {
        compute_dominance(cfg, false)
    }

    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dom[b.index()].contains(a.index())
    }

    /// A loop header is any block dominating one of its own predecessors
    /// (i.e. targeted by a back edge); the analyzer widens at these to
    /// guarantee fixed-point termination (§4.3).
    pub fn is_loop_header(&self, cfg: &Cfg, block: BlockId) -> bool {
        cfg.predecessors(block)
            .any(|pred| self.dominates(block, pred))
    }
}

pub struct PostDominators {
    dom: Vec<FixedBitSet>,
}

impl PostDominators {
    pub fn compute(cfg: &Cfg) -> Self {
        let d = compute_dominance(cfg, true);
        PostDominators { dom: d.dom }
    }

    pub fn post_dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dom[b.index()].contains(a.index())
    }
}

fn compute_dominance(cfg: &Cfg, reversed: bool) -> Dominators {
    let n = cfg.block_count();
    let start = if reversed { cfg.exit } else { cfg.entry };
    let order = reverse_postorder_from(cfg, start, reversed);

    let mut dom: Vec<FixedBitSet> = (0..n)
        .map(|_| {
            let mut all = FixedBitSet::with_capacity(n);
            all.insert_range(..);
            all
        })
        .collect();

    let mut start_set = FixedBitSet::with_capacity(n);
    start_set.insert(start.index());
    dom[start.index()] = start_set;

    let mut changed = true;
    while changed {
        changed = false;
        for &block in &order {
            if block == start {
                continue;
            }
            let preds: Vec<BlockId> = if reversed {
                cfg.successors(block).collect()
            } else {
                cfg.predecessors(block).collect()
            };
            if preds.is_empty() {
                continue;
            }
            let mut new_set = dom[preds[0].index()].clone();
            for pred in &preds[1..] {
                new_set.intersect_with(&dom[pred.index()]);
            }
            new_set.insert(block.index());
            if new_set != dom[block.index()] {
                dom[block.index()] = new_set;
                changed = true;
            }
        }
    }

    Dominators { dom }
}

/// Reverse postorder over the (possibly reversed) CFG, used both for the
/// dominator fixed-point iteration order and for the analyzer's worklist
/// traversal order (§4.3: "reverse-post-order fixed-point iteration").
pub fn reverse_postorder_from(cfg: &Cfg, start: BlockId, reversed: bool) -> Vec<BlockId> {
    let mut visited = FxHashMap::default();
    let mut postorder = Vec::with_capacity(cfg.block_count());
    let mut stack = vec![(start, false)];

    while let Some((block, processed)) = stack.pop() {
        if processed {
            postorder.push(block);
            continue;
        }
        if *visited.entry(block).or_insert(false) {
            continue;
        }
        visited.insert(block, true);
        stack.push((block, true));
        let succs: Vec<BlockId> = if reversed {
            cfg.predecessors(block).collect()
        } else {
            cfg.successors(block).collect()
        };
        for succ in succs {
            if !*visited.get(&succ).unwrap_or(&false) {
                stack.push((succ, false));
            }
        }
    }

    postorder.reverse();
    postorder
}

#[cfg(test)]
#[path = "../tests/dominators.rs"]
mod tests;
