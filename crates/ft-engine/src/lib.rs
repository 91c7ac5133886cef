//! The engine's external interface (§6): two pure functions, `infer` and
//! `infer_with_constraints`, each wiring a whole pipeline (builtins through
//! annotation collection) over any `ft_common::Tree` implementor. Neither
//! function touches the wall clock or the filesystem — `ft-cli` is the
//! caller that stamps `Stats::solve_time` and owns the source file.

use ft_common::{Diagnostic, LineMap, NodeId, Tree};

pub use ft_types::format_type;

/// One entry of `AnnotationResult::errors` / `ConstraintInferenceResult::errors`
/// (§6): a `Diagnostic` resolved to a line/column position, the shape callers
/// outside the workspace (an editor, a test harness) actually want.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineError {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub node_kind: Option<String>,
}

fn to_engine_error(line_map: &LineMap, diagnostic: &Diagnostic) -> EngineError {
    let position = line_map.position_for(diagnostic.span.start);
    EngineError {
        message: diagnostic.message.clone(),
        line: position.line,
        column: position.column,
        node_kind: None,
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AnnotationResult {
    pub filename: String,
    pub source: String,
    pub annotations: Vec<ft_common::Annotation>,
    pub errors: Vec<EngineError>,
    /// Reserved for future scope-info reporting; always empty (§6).
    pub scope_info: Option<()>,
}

/// Constraint-count/type-variable-count/solve-time summary named in §6,
/// supplemented here as a first-class struct. `solve_time` is
/// always `None` here; the engine takes no `Instant` dependency so that
/// `infer_with_constraints` stays a pure function, and the caller who *does*
/// own a clock (`ft-cli`) fills it in after the call returns.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct Stats {
    pub constraint_count: usize,
    pub type_variable_count: u32,
    pub solve_time: Option<std::time::Duration>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConstraintInferenceResult {
    pub filename: String,
    pub source: String,
    pub annotations: Vec<ft_common::Annotation>,
    /// The solve result of §6: every diagnostic the solver produced while
    /// decomposing constraints. An empty list is the "substitution applied
    /// cleanly" case; a non-empty one is the "error list" case. The
    /// substitution itself is never surfaced directly — it has already been
    /// applied to produce `annotations` by the time this result exists.
    pub errors: Vec<EngineError>,
    pub stats: Stats,
}

/// `infer` (§6): runs the CFG-based flow-sensitive analyzer over `program`
/// and returns its annotations.
pub fn infer<T: Tree>(tree: &T, source: &str, filename: &str, program: NodeId) -> AnnotationResult {
    let analyzer = ft_analyze::Analyzer::new(tree, source);
    let (result, _factory) = analyzer.analyze_program(program);
    let line_map = LineMap::new(source);
    let errors = result.diagnostics.iter().map(|d| to_engine_error(&line_map, d)).collect();

    AnnotationResult {
        filename: filename.to_string(),
        source: source.to_string(),
        annotations: result.annotations,
        errors,
        scope_info: None,
    }
}

/// `inferWithConstraints` (§6): runs the MLsub-style constraint generator
/// and biunification solver over `program` instead.
pub fn infer_with_constraints<T: Tree>(
    tree: &T,
    source: &str,
    filename: &str,
    program: NodeId,
) -> ConstraintInferenceResult {
    let analyzer = ft_constraints::ConstraintAnalyzer::new(tree, source);
    let (result, factory) = analyzer.analyze_program(program);
    let line_map = LineMap::new(source);
    let errors = result.diagnostics.iter().map(|d| to_engine_error(&line_map, d)).collect();

    ConstraintInferenceResult {
        filename: filename.to_string(),
        source: source.to_string(),
        annotations: result.annotations,
        errors,
        stats: Stats {
            constraint_count: result.constraint_count,
            type_variable_count: factory.type_var_count(),
            solve_time: None,
        },
    }
}

#[cfg(test)]
#[path = "../tests/engine.rs"]
mod tests;
