//! The constraint vocabulary emitted by `generator` (§4.4.2): a single
//! `Flow` kind suffices for the solver, but the generator also emits the
//! higher-level shapes (`HasProperty`, `IsCallable`, `ArrayElement`,
//! `Equal`, `Disjunction`) the solver decomposes into flows.

use std::rc::Rc;

use ft_common::Span;
use ft_types::Ty;

#[derive(Debug, Clone)]
pub enum ConstraintKind {
    /// `lhs ≤ rhs`: `lhs` flows into `rhs`.
    Flow { lhs: Ty, rhs: Ty },
    /// Classical equality, used for the unification phase (literal `+`
    /// alternatives, declaration generalization boundaries).
    Equal { a: Ty, b: Ty },
    /// `object` must carry a property named `name` of type `result`; the
    /// three-way alternative of §4.4.3 (record, function, or array).
    HasProperty { object: Ty, name: Rc<str>, result: Ty },
    /// `callee` must be callable with `args`, producing `result`.
    IsCallable { callee: Ty, args: Vec<Ty>, result: Ty },
    /// `array` must be an array of `element`.
    ArrayElement { array: Ty, element: Ty },
    /// Try each alternative (itself a list of constraints) against a cloned
    /// solver state, in order, and commit the first that succeeds.
    Disjunction(Vec<Vec<ConstraintKind>>),
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub span: Span,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn new(span: Span, kind: ConstraintKind) -> Self {
        Self { span, kind }
    }
}
