//! Control-flow graph construction, dominators and back-edge detection.

pub mod builder;
pub mod dominators;
pub mod graph;

pub use builder::CfgBuilder;
pub use dominators::{reverse_postorder_from, Dominators, PostDominators};
pub use graph::{Block, BlockId, Cfg, Edge, EdgeKind, NodeId, Terminator};
