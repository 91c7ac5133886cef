//! The position-anchored annotation record emitted by both inference
//! engines (§5). `ft-types::format_type` supplies `type_string`; `kind_tag`
//! and `identifier` are filled in by whichever crate is walking the tree
//! (`ft-analyze` or `ft-constraints`) since only it knows the node's surface
//! syntax.

use crate::position::Position;
use crate::span::Span;
use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AnnotationKind {
    VariableDeclaration,
    Parameter,
    FunctionReturn,
    Expression,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Annotation {
    pub node: NodeId,
    pub span: Span,
    pub start: Position,
    pub end: Position,
    pub kind: AnnotationKind,
    /// The declared/referenced identifier's name, when the node names one
    /// (a variable, parameter or function); `None` for bare expressions.
    pub identifier: Option<String>,
    pub type_string: String,
}

/// Ascending-start-order, ties broken by node id so that annotations at the
/// same offset are deterministic (§5's ordering guarantee).
pub fn sort_annotations(annotations: &mut [Annotation]) {
    annotations.sort_by_key(|a| (a.span.start, a.node));
}

/// Inserts `new_annotation`, replacing any existing annotation for the same
/// node rather than duplicating it (§5's "update-or-skip-if-exists").
pub fn upsert(annotations: &mut Vec<Annotation>, new_annotation: Annotation) {
    if let Some(existing) = annotations.iter_mut().find(|a| a.node == new_annotation.node) {
        *existing = new_annotation;
    } else {
        annotations.push(new_annotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(node: NodeId, start: u32, type_string: &str) -> Annotation {
        Annotation {
            node,
            span: Span::new(start, start + 1),
            start: Position::new(0, start),
            end: Position::new(0, start + 1),
            kind: AnnotationKind::Expression,
            identifier: None,
            type_string: type_string.to_string(),
        }
    }

    #[test]
    fn sorts_by_ascending_start_offset() {
        let mut anns = vec![ann(1, 10, "number"), ann(2, 2, "string")];
        sort_annotations(&mut anns);
        assert_eq!(anns[0].node, 2);
        assert_eq!(anns[1].node, 1);
    }

    #[test]
    fn upsert_replaces_existing_node_instead_of_duplicating() {
        let mut anns = vec![ann(1, 0, "number")];
        upsert(&mut anns, ann(1, 0, "string"));
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].type_string, "string");
    }
}
