//! Shared spans, positions, diagnostics and limits for the flowtype crates.

pub mod annotation;
pub mod diagnostics;
pub mod limits;
pub mod position;
pub mod span;
pub mod tree;

pub use annotation::{sort_annotations, upsert, Annotation, AnnotationKind};
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticKind};
pub use position::{LineMap, Position};
pub use span::{Span, Spanned};
pub use tree::{NodeId, NodeKind, Tree};
