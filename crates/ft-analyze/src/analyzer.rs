//! The fixed-point flow analyzer (§4.3): drives `ft-cfg`'s CFG per function
//! body to a fixed point in reverse-postorder, widening at loop headers,
//! and recurses into nested function/class bodies as independent units.
//!
//! Parameter types for an undeclared (unannotated) parameter are inferred
//! from the call sites observed anywhere else in the program, via a
//! pre-scan pass followed by the real analysis (§4.3's call-site
//! aggregation).

use rustc_hash::FxHashMap;

use ft_binder::{Binding, DeclarationKind, Environment, ScopeKind};
use ft_cfg::{reverse_postorder_from, Dominators, EdgeKind};
use ft_common::tree::{DeclKind as TreeDeclKind, NodeKind};
use ft_common::{
    limits, Annotation, AnnotationKind, Diagnostic, LineMap, NodeId, Tree,
};
use ft_types::{Param, Ty, TypeFactory};

use crate::cfg_from_tree::build_cfg;
use crate::expr::{declare_param, infer_expr, ExprCx, FunctionTable};

pub struct AnalysisResult {
    pub annotations: Vec<Annotation>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Analyzer<'t, T: Tree> {
    tree: &'t T,
    line_map: LineMap,
    factory: TypeFactory,
    functions: FunctionTable,
    call_args: FxHashMap<NodeId, Vec<Vec<Ty>>>,
    diagnostics: Vec<Diagnostic>,
    annotations: Vec<Annotation>,
}

impl<'t, T: Tree> Analyzer<'t, T> {
    pub fn new(tree: &'t T, source: &str) -> Self {
        Self {
            tree,
            line_map: LineMap::new(source),
            factory: TypeFactory::new(),
            functions: FxHashMap::default(),
            call_args: FxHashMap::default(),
            diagnostics: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn into_factory(self) -> TypeFactory {
        self.factory
    }

    /// Runs `FUNCTION_ANALYSIS_PASSES` full passes over the program: the
    /// first pass analyzes every function with unannotated parameters typed
    /// `any` while recording call-site argument types; each subsequent pass
    /// re-analyzes with those aggregated argument types available, so a
    /// parameter used only at call sites still gets a real inferred type
    /// (§4.3's call-site aggregation).
    pub fn analyze_program(mut self, program: NodeId) -> (AnalysisResult, TypeFactory) {
        let global_env = crate::builtins::global_environment(&mut self.factory);

        for _ in 0..limits::FUNCTION_ANALYSIS_PASSES {
            self.functions.clear();
            self.annotations.clear();
            self.diagnostics.clear();
            let top_level = self.hoist_block(program, &global_env, ScopeKind::Global);
            self.analyze_function_body(program, top_level, &[]);
        }

        let mut annotations = std::mem::take(&mut self.annotations);
        ft_common::sort_annotations(&mut annotations);
        let result = AnalysisResult {
            annotations,
            diagnostics: std::mem::take(&mut self.diagnostics),
        };
        (result, self.factory)
    }

    /// Pre-scans a block for `var`/`function`/`class` declarations and
    /// declares hoisted bindings before any statement actually runs (JS
    /// hoisting semantics, §3.2).
    fn hoist_block(&mut self, body: NodeId, env: &Environment, kind: ScopeKind) -> Environment {
        let mut env = env.enter(kind);
        let stmts = match self.tree.kind(body) {
            NodeKind::Block(s) | NodeKind::Program(s) => s.clone(),
            _ => vec![body],
        };
        for stmt in &stmts {
            match self.tree.kind(*stmt).clone() {
                NodeKind::VarDecl {
                    kind: TreeDeclKind::Var,
                    name,
                    ..
                } => {
                    if let Some(id) = self.identifier_name(name) {
                        env = env.declare(Binding::new(
                            id,
                            name,
                            DeclarationKind::Var,
                            self.factory.undefined(),
                        ));
                    }
                }
                NodeKind::FunctionDecl {
                    name: Some(name), ..
                } => {
                    if let Some(id) = self.identifier_name(name) {
                        let fn_ty = self.analyze_function_decl(*stmt, &env);
                        env = env.declare(Binding::new(id, *stmt, DeclarationKind::Function, fn_ty));
                    }
                }
                _ => {}
            }
        }
        env
    }

    fn identifier_name(&self, node: NodeId) -> Option<String> {
        match self.tree.kind(node) {
            NodeKind::Identifier(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn analyze_function_decl(&mut self, decl: NodeId, enclosing_env: &Environment) -> Ty {
        let NodeKind::FunctionDecl {
            params,
            body,
            is_async,
            is_generator,
            ..
        } = self.tree.kind(decl).clone()
        else {
            return self.factory.any(Some("unsupported-syntax"));
        };
        let observed_args = self.call_args.get(&decl).cloned().unwrap_or_default();
        let (param_list, param_env) = self.bind_params(&params, enclosing_env, &observed_args);
        let return_ty = self.analyze_function_body(body, param_env, &params);
        let return_ty = if is_async {
            self.factory.promise(return_ty)
        } else {
            return_ty
        };
        let fn_ty = self
            .factory
            .function(param_list, return_ty, is_async, is_generator);
        self.functions.insert(decl, fn_ty.clone());
        fn_ty
    }

    fn bind_params(
        &mut self,
        params: &[NodeId],
        enclosing_env: &Environment,
        observed_args: &[Vec<Ty>],
    ) -> (Vec<Param>, Environment) {
        let mut env = enclosing_env.enter(ScopeKind::Function);
        let mut result = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let NodeKind::Param { name, default, rest, .. } = self.tree.kind(*param).clone() else {
                continue;
            };
            let observed: Vec<Ty> = observed_args
                .iter()
                .filter_map(|call| call.get(i).cloned())
                .map(|ty| self.factory.widen(&ty))
                .collect();
            let ty = if !observed.is_empty() {
                self.factory.union(observed)
            } else if let Some(default_expr) = default {
                let mut cx = ExprCx {
                    factory: &mut self.factory,
                    functions: &self.functions,
                    diagnostics: &mut self.diagnostics,
                    call_args: &mut self.call_args,
                };
                infer_expr(self.tree, &mut cx, &env, default_expr).0
            } else {
                self.factory.any(Some("unannotated-parameter"))
            };
            if let Some(id) = self.identifier_name(name) {
                env = declare_param(&env, *param, &id, ty.clone());
                result.push(Param {
                    name: id.into(),
                    ty,
                    optional: default.is_some(),
                    rest,
                });
            } else {
                let mut cx = ExprCx {
                    factory: &mut self.factory,
                    functions: &self.functions,
                    diagnostics: &mut self.diagnostics,
                    call_args: &mut self.call_args,
                };
                env = crate::expr::bind_pattern(self.tree, &mut cx, &env, name, ty.clone(), DeclarationKind::Param);
                result.push(Param {
                    name: format!("arg{i}").into(),
                    ty,
                    optional: default.is_some(),
                    rest,
                });
            }
        }
        (result, env)
    }

    /// Runs the CFG fixed-point for one function body and returns its
    /// inferred return type (the union of every reachable `return`).
    fn analyze_function_body(
        &mut self,
        body: NodeId,
        entry_env: Environment,
        params: &[NodeId],
    ) -> Ty {
        let _ = params;
        let (cfg, _exit) = build_cfg(self.tree, body);
        let dominators = Dominators::compute(&cfg);
        let order = reverse_postorder_from(&cfg, cfg.entry, false);

        let mut block_exit: Vec<Option<Environment>> = vec![None; cfg.block_count()];
        block_exit[cfg.entry.index()] = None;

        let mut entry_for_block: Vec<Option<Environment>> = vec![None; cfg.block_count()];
        entry_for_block[cfg.entry.index()] = Some(entry_env);

        let mut return_types: Vec<Ty> = Vec::new();

        for pass in 0..limits::MAX_FIXED_POINT_PASSES {
            let mut changed = false;
            return_types.clear();

            for &block in &order {
                let incoming_env = if block == cfg.entry {
                    entry_for_block[block.index()].clone().unwrap()
                } else {
                    match self.join_predecessors(&cfg, block, &block_exit) {
                        Some(env) => env,
                        None => continue, // unreachable so far
                    }
                };

                let incoming_env = if dominators.is_loop_header(&cfg, block) && pass > 0 {
                    incoming_env.map_types(|ty| self.factory.widen(ty))
                } else {
                    incoming_env
                };

                let before = entry_for_block[block.index()]
                    .as_ref()
                    .map(|e| e.flatten());
                entry_for_block[block.index()] = Some(incoming_env.clone());

                let exit_env = self.transfer_block(&cfg, block, incoming_env, &mut return_types);

                let exit_changed = match &block_exit[block.index()] {
                    Some(prev) => !flattened_eq(&prev.flatten(), &exit_env.flatten()),
                    None => true,
                };
                let entry_changed = match before {
                    Some(prev) => !flattened_eq(&prev, &entry_for_block[block.index()].as_ref().unwrap().flatten()),
                    None => true,
                };
                if exit_changed || entry_changed {
                    changed = true;
                }
                block_exit[block.index()] = Some(exit_env);
            }

            if !changed {
                break;
            }
            if pass == limits::MAX_FIXED_POINT_PASSES - 1 {
                self.diagnostics
                    .push(Diagnostic::iteration_budget_exceeded(self.tree.span(body)));
            }
        }

        if return_types.is_empty() {
            self.factory.undefined()
        } else {
            self.factory.union(return_types)
        }
    }

    fn join_predecessors(
        &mut self,
        cfg: &ft_cfg::Cfg,
        block: ft_cfg::BlockId,
        block_exit: &[Option<Environment>],
    ) -> Option<Environment> {
        let mut result: Option<Environment> = None;
        for edge in cfg.incoming_edges(block) {
            let Some(pred_env) = &block_exit[edge.from.index()] else {
                continue;
            };
            let edge_env = match (edge.kind, edge.condition) {
                (EdgeKind::TrueBranch, Some(cond)) => {
                    crate::narrow::narrow(self.tree, &mut self.factory, pred_env, cond, true)
                }
                (EdgeKind::FalseBranch, Some(cond)) => {
                    crate::narrow::narrow(self.tree, &mut self.factory, pred_env, cond, false)
                }
                _ => pred_env.clone(),
            };
            result = Some(match result {
                Some(existing) => Environment::join(&existing, &edge_env, &mut self.factory),
                None => edge_env,
            });
        }
        result
    }

    fn transfer_block(
        &mut self,
        cfg: &ft_cfg::Cfg,
        block: ft_cfg::BlockId,
        mut env: Environment,
        return_types: &mut Vec<Ty>,
    ) -> Environment {
        for &stmt in &cfg.block(block).statements.clone() {
            env = self.transfer_statement(stmt, env, return_types);
        }
        env
    }

    fn transfer_statement(
        &mut self,
        node: NodeId,
        env: Environment,
        return_types: &mut Vec<Ty>,
    ) -> Environment {
        match self.tree.kind(node).clone() {
            NodeKind::VarDecl { kind, name, init } => {
                let (ty, mut env) = match init {
                    Some(init_expr) => {
                        let mut cx = ExprCx {
                            factory: &mut self.factory,
                            functions: &self.functions,
                            diagnostics: &mut self.diagnostics,
                            call_args: &mut self.call_args,
                        };
                        infer_expr(self.tree, &mut cx, &env, init_expr)
                    }
                    None => (self.factory.undefined(), env),
                };
                let decl_kind = match kind {
                    TreeDeclKind::Const => DeclarationKind::Const,
                    TreeDeclKind::Let => DeclarationKind::Let,
                    TreeDeclKind::Var => DeclarationKind::Var,
                };
                let widened = if matches!(decl_kind, DeclarationKind::Const) {
                    ty.clone()
                } else {
                    self.factory.widen(&ty)
                };
                env = if let Some(id) = self.identifier_name(name) {
                    match decl_kind {
                        // `var` was hoisted already; just assign.
                        DeclarationKind::Var => env.assign(&id, widened.clone()),
                        _ => env.declare(Binding::new(id, name, decl_kind, widened.clone())),
                    }
                } else {
                    let mut cx = ExprCx {
                        factory: &mut self.factory,
                        functions: &self.functions,
                        diagnostics: &mut self.diagnostics,
                        call_args: &mut self.call_args,
                    };
                    crate::expr::bind_pattern(self.tree, &mut cx, &env, name, widened.clone(), decl_kind)
                };
                self.record_annotation(name, AnnotationKind::VariableDeclaration, &widened);
                env
            }

            NodeKind::ExprStmt(expr) => {
                let mut cx = ExprCx {
                    factory: &mut self.factory,
                    functions: &self.functions,
                    diagnostics: &mut self.diagnostics,
                    call_args: &mut self.call_args,
                };
                let (ty, env) = infer_expr(self.tree, &mut cx, &env, expr);
                self.record_annotation(expr, AnnotationKind::Expression, &ty);
                env
            }

            NodeKind::Return(value) => {
                let (ty, env) = match value {
                    Some(v) => {
                        let mut cx = ExprCx {
                            factory: &mut self.factory,
                            functions: &self.functions,
                            diagnostics: &mut self.diagnostics,
                            call_args: &mut self.call_args,
                        };
                        infer_expr(self.tree, &mut cx, &env, v)
                    }
                    None => (self.factory.undefined(), env),
                };
                return_types.push(ty);
                env
            }

            NodeKind::Throw(value) => {
                let mut cx = ExprCx {
                    factory: &mut self.factory,
                    functions: &self.functions,
                    diagnostics: &mut self.diagnostics,
                    call_args: &mut self.call_args,
                };
                infer_expr(self.tree, &mut cx, &env, value).1
            }

            NodeKind::FunctionDecl { .. } => {
                // Already hoisted and analyzed by `hoist_block`.
                env
            }

            NodeKind::ClassDecl {
                name,
                superclass,
                members,
            } => self.transfer_class_decl(node, name, superclass, members, env),

            NodeKind::Break(_) | NodeKind::Continue(_) => env,

            NodeKind::ForOf { decl_name, iterable, .. }
            | NodeKind::ForIn { decl_name, object: iterable, .. } => {
                let mut cx = ExprCx {
                    factory: &mut self.factory,
                    functions: &self.functions,
                    diagnostics: &mut self.diagnostics,
                    call_args: &mut self.call_args,
                };
                let (iterable_ty, mut env) = infer_expr(self.tree, &mut cx, &env, iterable);
                let element = match &iterable_ty.kind {
                    ft_types::TyKind::Array { element, .. } => element.clone(),
                    _ => self.factory.any(Some("for-in-or-of")),
                };
                if let Some(id) = self.identifier_name(decl_name) {
                    env = env.declare(Binding::new(id, decl_name, DeclarationKind::Let, element.clone()));
                }
                self.record_annotation(decl_name, AnnotationKind::VariableDeclaration, &element);
                env
            }

            _ => env,
        }
    }

    fn transfer_class_decl(
        &mut self,
        node: NodeId,
        name: Option<NodeId>,
        superclass: Option<NodeId>,
        members: Vec<NodeId>,
        env: Environment,
    ) -> Environment {
        let mut instance_props = indexmap::IndexMap::new();

        for member in &members {
            if let NodeKind::FunctionDecl {
                name: Some(member_name),
                params,
                body,
                is_async,
                is_generator,
            } = self.tree.kind(*member).clone()
            {
                let Some(id) = self.identifier_name(member_name) else {
                    continue;
                };
                let (param_list, param_env) = self.bind_params(&params, &env, &[]);
                let return_ty = self.analyze_function_body(body, param_env, &params);
                let method_ty = self
                    .factory
                    .function(param_list, return_ty, is_async, is_generator);
                instance_props.insert(
                    id.into(),
                    ft_types::PropertyType {
                        ty: method_ty,
                        optional: false,
                        readonly: false,
                    },
                );
            }
        }

        let instance_ty = self.factory.object(instance_props);
        let ctor_params = vec![];
        let constructor_ty = self
            .factory
            .function(ctor_params, instance_ty.clone(), false, false);
        let super_ty = superclass.and_then(|s| {
            let id = self.identifier_name(s)?;
            env.lookup(&id).map(|b| b.ty.clone())
        });
        let class_name = name
            .and_then(|n| self.identifier_name(n))
            .unwrap_or_else(|| "anonymous".to_string());
        let class_ty = self.factory.class(
            &class_name,
            constructor_ty,
            instance_ty,
            indexmap::IndexMap::new(),
            super_ty,
        );

        if let Some(n) = name {
            if let Some(id) = self.identifier_name(n) {
                self.record_annotation(n, AnnotationKind::VariableDeclaration, &class_ty);
                return env.declare(Binding::new(id, node, DeclarationKind::Class, class_ty));
            }
        }
        env
    }

    fn record_annotation(&mut self, node: NodeId, kind: AnnotationKind, ty: &Ty) {
        let span = self.tree.span(node);
        let (start, end) = self.line_map.range_for(span);
        let identifier = self.identifier_name(node);
        ft_common::upsert(
            &mut self.annotations,
            Annotation {
                node,
                span,
                start,
                end,
                kind,
                identifier,
                type_string: ft_types::format_type(ty),
            },
        );
    }
}

fn flattened_eq(
    a: &FxHashMap<std::rc::Rc<str>, Binding>,
    b: &FxHashMap<std::rc::Rc<str>, Binding>,
) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(name, binding)| match b.get(name) {
        Some(other) => {
            ft_types::structural_eq(&binding.ty, &other.ty)
                && binding.definitely_assigned == other.definitely_assigned
                && binding.possibly_mutated == other.possibly_mutated
        }
        None => false,
    })
}

#[cfg(test)]
#[path = "../tests/analyzer.rs"]
mod tests;
