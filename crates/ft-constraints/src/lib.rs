//! The MLsub-style constraint path (§4.4): an alternative to `ft-analyze`'s
//! flow-sensitive analyzer that infers the same program through constraint
//! generation and biunification instead of CFG fixed-point iteration.

pub mod builtins;
pub mod constraint;
pub mod generator;
pub mod reconstruct;
pub mod solver;

#[cfg(test)]
mod test_support;

use ft_binder::ScopeKind;
use ft_common::{Annotation, AnnotationKind, Diagnostic, LineMap, NodeId, Tree};
use ft_types::TypeFactory;

use crate::generator::Generator;
use crate::solver::Solver;

pub struct ConstraintAnalysisResult {
    pub annotations: Vec<Annotation>,
    pub diagnostics: Vec<Diagnostic>,
    /// Number of top-level constraints the generator emitted, before the
    /// solver decomposed `Disjunction`/`Equal`/... into flows; exposed so a
    /// caller can report it in `Stats` without re-running the pipeline.
    pub constraint_count: usize,
}

pub struct ConstraintAnalyzer<'t, T: Tree> {
    tree: &'t T,
    line_map: LineMap,
    factory: TypeFactory,
}

impl<'t, T: Tree> ConstraintAnalyzer<'t, T> {
    pub fn new(tree: &'t T, source: &str) -> Self {
        Self {
            tree,
            line_map: LineMap::new(source),
            factory: TypeFactory::new(),
        }
    }

    pub fn into_factory(self) -> TypeFactory {
        self.factory
    }

    /// Runs the full constraint pipeline (§4.4): generate constraints over
    /// the whole program against the builtin environment, solve them in
    /// §4.4.4's phase order, then reconstruct every recorded node's type
    /// from the solved bisubstitution.
    pub fn analyze_program(mut self, program: NodeId) -> (ConstraintAnalysisResult, TypeFactory) {
        let global_env = crate::builtins::global_environment(&mut self.factory);

        let mut generator = Generator::new(&mut self.factory);
        generator.generate_program(self.tree, global_env.enter(ScopeKind::Module), program);
        let (constraints, node_types) = generator.into_parts();
        let constraint_count = constraints.len();

        let mut solver = Solver::new();
        let mut diagnostics = Vec::new();
        solver.solve(&mut self.factory, &constraints, &mut diagnostics);

        let resolved = reconstruct::reconstruct_all(&mut self.factory, solver.bisubstitution(), &node_types);

        let mut annotations: Vec<Annotation> = resolved
            .into_iter()
            .map(|(node, ty)| {
                let span = self.tree.span(node);
                let (start, end) = self.line_map.range_for(span);
                let identifier = match self.tree.kind(node) {
                    ft_common::NodeKind::Identifier(name) => Some(name.clone()),
                    _ => None,
                };
                Annotation {
                    node,
                    span,
                    start,
                    end,
                    kind: AnnotationKind::Expression,
                    identifier,
                    type_string: ft_types::format_type(&ty),
                }
            })
            .collect();
        ft_common::sort_annotations(&mut annotations);

        let result = ConstraintAnalysisResult {
            annotations,
            diagnostics,
            constraint_count,
        };
        (result, self.factory)
    }
}
