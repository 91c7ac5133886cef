//! Persistent scope-chain environments and declaration bindings (§3.2).
//!
//! The flow-sensitive analyzer threads an `Environment` through the CFG,
//! branching it with `enter`/`declare`/`assign` and recombining diverged
//! copies at merge points with `Environment::join`.

pub mod binding;
pub mod environment;
pub mod scope;

pub use binding::{Binding, DeclarationKind, NodeId};
pub use environment::Environment;
pub use scope::{Scope, ScopeKind};
