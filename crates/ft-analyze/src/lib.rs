//! Flow-sensitive iterative type analysis: CFG construction from a generic
//! `ft_common::Tree`, fixed-point transfer over it, and edge-condition
//! narrowing.

pub mod analyzer;
pub mod builtins;
pub mod cfg_from_tree;
pub mod expr;
pub mod narrow;

#[cfg(test)]
mod test_support;

pub use analyzer::{AnalysisResult, Analyzer};
