//! Constraint generation (§4.4.3): a single pass over the tree with a
//! scope-chain environment from names to schemes or types. Every
//! expression gets a type (either a concrete type computed directly, or a
//! fresh type variable whose eventual shape is pinned down by the flow
//! constraints emitted alongside it); declarations generalize their
//! initializer's type into a scheme at the point they leave scope.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use ft_binder::{Binding, DeclarationKind, Environment, ScopeKind};
use ft_common::tree::{AssignOp, BinaryOp, DeclKind as TreeDeclKind, LogicalOp, NodeKind, UnaryOp};
use ft_common::{NodeId, Span, Tree};
use ft_types::polar::{generalize, instantiate, LevelCounter};
use ft_types::{Param, PropertyType, Ty, TyKind, TypeFactory};

use crate::constraint::{Constraint, ConstraintKind};

pub struct Generator<'f> {
    factory: &'f mut TypeFactory,
    constraints: Vec<Constraint>,
    node_types: FxHashMap<NodeId, Ty>,
    levels: LevelCounter,
    return_stack: Vec<Ty>,
}

impl<'f> Generator<'f> {
    pub fn new(factory: &'f mut TypeFactory) -> Self {
        Self {
            factory,
            constraints: Vec::new(),
            node_types: FxHashMap::default(),
            levels: LevelCounter::default(),
            return_stack: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (Vec<Constraint>, FxHashMap<NodeId, Ty>) {
        (self.constraints, self.node_types)
    }

    pub fn generate_program<T: Tree>(&mut self, tree: &T, env: Environment, program: NodeId) {
        let stmts = match tree.kind(program).clone() {
            NodeKind::Program(s) | NodeKind::Block(s) => s,
            _ => vec![program],
        };
        let mut env = env;
        for stmt in stmts {
            env = self.generate_statement(tree, &env, stmt);
        }
    }

    fn push(&mut self, span: Span, kind: ConstraintKind) {
        self.constraints.push(Constraint::new(span, kind));
    }

    fn record(&mut self, node: NodeId, ty: Ty) {
        self.node_types.insert(node, ty);
    }

    fn identifier_name<T: Tree>(&self, tree: &T, node: NodeId) -> Option<String> {
        match tree.kind(node) {
            NodeKind::Identifier(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Recursively destructures `pattern` against `source_ty`, declaring
    /// every leaf identifier. Mirrors the flow-analyzer's pattern binder,
    /// using `generate_expr` for default-value expressions instead of the
    /// CFG-based transfer function.
    fn bind_pattern<T: Tree>(
        &mut self,
        tree: &T,
        env: &Environment,
        pattern: NodeId,
        source_ty: Ty,
        decl_kind: DeclarationKind,
    ) -> Environment {
        match tree.kind(pattern).clone() {
            NodeKind::Identifier(name) => env.declare(Binding::new(name, pattern, decl_kind, source_ty)),

            NodeKind::AssignmentPattern { target, default } => {
                let default_ty = self.generate_expr(tree, env, default);
                let narrowed = strip_undefined(self.factory, &source_ty);
                let combined = self.factory.union(vec![narrowed, default_ty]);
                self.bind_pattern(tree, env, target, combined, decl_kind)
            }

            NodeKind::ObjectPattern { properties, rest } => {
                let mut env = env.clone();
                let mut bound_names = Vec::with_capacity(properties.len());
                for (key, value) in properties {
                    let Some(prop_name) = property_key_name(tree, key) else {
                        continue;
                    };
                    let prop_ty = match &source_ty.kind {
                        TyKind::Object { properties } => properties
                            .get(prop_name.as_str())
                            .map(|p| p.ty.clone())
                            .unwrap_or_else(|| self.factory.any(Some("missing-property"))),
                        _ if source_ty.is_any() => self.factory.any(None),
                        _ => self.factory.any(Some("missing-property")),
                    };
                    bound_names.push(prop_name);
                    env = self.bind_pattern(tree, &env, value, prop_ty, decl_kind);
                }
                if let Some(rest_pattern) = rest {
                    let mut rest_props = indexmap::IndexMap::new();
                    if let TyKind::Object { properties } = &source_ty.kind {
                        for (name, prop) in properties {
                            if !bound_names.iter().any(|b| b.as_str() == name.as_ref()) {
                                rest_props.insert(name.clone(), prop.clone());
                            }
                        }
                    }
                    let rest_ty = self.factory.object(rest_props);
                    env = self.bind_pattern(tree, &env, rest_pattern, rest_ty, decl_kind);
                }
                env
            }

            NodeKind::ArrayPattern { elements, rest } => {
                let mut env = env.clone();
                let tuple_elements = match &source_ty.kind {
                    TyKind::Array { tuple: Some(elems), .. } => Some(elems.clone()),
                    _ => None,
                };
                let element_ty = match &source_ty.kind {
                    TyKind::Array { element, .. } => element.clone(),
                    _ if source_ty.is_any() => self.factory.any(None),
                    _ => self.factory.any(Some("not-iterable")),
                };
                for (i, slot) in elements.into_iter().enumerate() {
                    let Some(slot_pattern) = slot else {
                        continue;
                    };
                    let slot_ty = tuple_elements
                        .as_ref()
                        .and_then(|elems| elems.get(i).cloned())
                        .unwrap_or_else(|| element_ty.clone());
                    env = self.bind_pattern(tree, &env, slot_pattern, slot_ty, decl_kind);
                }
                if let Some(rest_pattern) = rest {
                    let rest_ty = self.factory.array(element_ty);
                    env = self.bind_pattern(tree, &env, rest_pattern, rest_ty, decl_kind);
                }
                env
            }

            _ => env.clone(),
        }
    }

    fn generate_statement<T: Tree>(&mut self, tree: &T, env: &Environment, node: NodeId) -> Environment {
        let span = tree.span(node);
        match tree.kind(node).clone() {
            NodeKind::VarDecl { kind, name, init } => self.generate_var_decl(tree, env, kind, name, init, span),

            NodeKind::FunctionDecl {
                name,
                params,
                body,
                is_async,
                is_generator,
            } => {
                let (_, env) = self.generate_function(tree, env, node, name, &params, body, is_async, is_generator);
                env
            }

            NodeKind::ClassDecl {
                name,
                superclass,
                members,
            } => self.generate_class_decl(tree, env, node, name, superclass, &members),

            NodeKind::Block(stmts) => {
                let mut inner = env.enter(ScopeKind::Block);
                for s in stmts {
                    inner = self.generate_statement(tree, &inner, s);
                }
                env.clone()
            }

            NodeKind::ExprStmt(expr) => {
                let ty = self.generate_expr(tree, env, expr);
                self.record(expr, ty);
                env.clone()
            }

            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.generate_expr(tree, env, condition);
                self.generate_statement(tree, env, then_branch);
                if let Some(e) = else_branch {
                    self.generate_statement(tree, env, e);
                }
                env.clone()
            }

            NodeKind::While { condition, body } | NodeKind::DoWhile { body, condition } => {
                self.generate_expr(tree, env, condition);
                self.generate_statement(tree, env, body);
                env.clone()
            }

            NodeKind::For {
                init,
                condition,
                update,
                body,
            } => {
                let mut inner = env.enter(ScopeKind::Block);
                if let Some(init) = init {
                    inner = self.generate_statement(tree, &inner, init);
                }
                if let Some(c) = condition {
                    self.generate_expr(tree, &inner, c);
                }
                if let Some(u) = update {
                    self.generate_expr(tree, &inner, u);
                }
                self.generate_statement(tree, &inner, body);
                env.clone()
            }

            NodeKind::ForOf {
                decl_name,
                iterable,
                body,
            }
            | NodeKind::ForIn {
                decl_name,
                object: iterable,
                body,
            } => {
                let iterable_ty = self.generate_expr(tree, env, iterable);
                let element = match &iterable_ty.kind {
                    TyKind::Array { element, .. } => element.clone(),
                    _ => self.factory.any(Some("for-in-or-of")),
                };
                let mut inner = env.enter(ScopeKind::Block);
                if let Some(id) = self.identifier_name(tree, decl_name) {
                    inner = inner.declare(Binding::new(id, decl_name, DeclarationKind::Let, element));
                }
                self.generate_statement(tree, &inner, body);
                env.clone()
            }

            NodeKind::Switch { discriminant, cases } => {
                self.generate_expr(tree, env, discriminant);
                for (test, body) in cases {
                    if let Some(t) = test {
                        self.generate_expr(tree, env, t);
                    }
                    for s in body {
                        self.generate_statement(tree, env, s);
                    }
                }
                env.clone()
            }

            NodeKind::Return(value) => {
                let ty = match value {
                    Some(v) => self.generate_expr(tree, env, v),
                    None => self.factory.undefined(),
                };
                if let Some(ret_var) = self.return_stack.last().cloned() {
                    self.push(span, ConstraintKind::Flow { lhs: ty, rhs: ret_var });
                }
                env.clone()
            }

            NodeKind::Throw(value) => {
                self.generate_expr(tree, env, value);
                env.clone()
            }

            NodeKind::TryStmt {
                block,
                catch_param,
                catch_block,
                finally_block,
            } => {
                self.generate_statement(tree, env, block);
                if let Some(cb) = catch_block {
                    let mut inner = env.enter(ScopeKind::Block);
                    if let Some(param) = catch_param {
                        if let Some(id) = self.identifier_name(tree, param) {
                            let any = self.factory.any(Some("catch-binding"));
                            inner = inner.declare(Binding::new(id, param, DeclarationKind::Let, any));
                        }
                    }
                    self.generate_statement(tree, &inner, cb);
                }
                if let Some(fb) = finally_block {
                    self.generate_statement(tree, env, fb);
                }
                env.clone()
            }

            NodeKind::Labeled { body, .. } => {
                self.generate_statement(tree, env, body);
                env.clone()
            }

            NodeKind::Break(_) | NodeKind::Continue(_) => env.clone(),

            _ => env.clone(),
        }
    }

    fn generate_var_decl<T: Tree>(
        &mut self,
        tree: &T,
        env: &Environment,
        kind: TreeDeclKind,
        name: NodeId,
        init: Option<NodeId>,
        span: Span,
    ) -> Environment {
        let level = self.levels.enter();
        let ident = self.identifier_name(tree, name);
        let declared_ty = match init {
            // Bound directly to the initializer's own type rather than
            // indirected through a fresh variable and a flow constraint:
            // a flow constraint would only be needed if `var` could receive
            // bounds from more than one source, which a single initializer
            // never does.
            Some(init_expr) => self.generate_expr(tree, env, init_expr),
            None => self.factory.fresh_type_var(ident.as_deref().unwrap_or("t"), level),
        };
        let _ = span;
        self.levels.leave();
        let scheme = generalize_if_safe(self.factory, &declared_ty, level);
        self.record(name, scheme.clone());
        let decl_kind = match kind {
            TreeDeclKind::Const => DeclarationKind::Const,
            TreeDeclKind::Let => DeclarationKind::Let,
            TreeDeclKind::Var => DeclarationKind::Var,
        };
        match ident {
            Some(id) => env.declare(Binding::new(id, name, decl_kind, scheme)),
            None => self.bind_pattern(tree, env, name, scheme, decl_kind),
        }
    }

    /// A named or anonymous function: the parameter and return variables
    /// are fresh but the function's overall shape (`(p1...pn) -> r`) is
    /// known before the body is ever walked, so its own name is bound to
    /// that concrete structural type up front — recursive calls inside the
    /// body see the same `fn_ty`, and once the body has contributed its
    /// flows into the return variable, the whole structural type is
    /// generalized for any name it gets bound to outside.
    fn generate_function<T: Tree>(
        &mut self,
        tree: &T,
        env: &Environment,
        node: NodeId,
        name: Option<NodeId>,
        params: &[NodeId],
        body: NodeId,
        is_async: bool,
        is_generator: bool,
    ) -> (Ty, Environment) {
        let _ = tree.span(node);
        let level = self.levels.enter();

        let mut inner_env = env.enter(ScopeKind::Function);
        let mut param_list = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            let NodeKind::Param { name: pname, rest, .. } = tree.kind(*param).clone() else {
                continue;
            };
            if let Some(id) = self.identifier_name(tree, pname) {
                let pty = self.factory.fresh_type_var(&id, level);
                inner_env = inner_env.declare(Binding::new(id.clone(), *param, DeclarationKind::Param, pty.clone()));
                param_list.push(Param {
                    name: id.into(),
                    ty: pty,
                    optional: false,
                    rest,
                });
            } else {
                let pty = self.factory.fresh_type_var("param", level);
                inner_env = self.bind_pattern(tree, &inner_env, pname, pty.clone(), DeclarationKind::Param);
                param_list.push(Param {
                    name: format!("arg{i}").into(),
                    ty: pty,
                    optional: false,
                    rest,
                });
            }
        }

        let return_var = self.factory.fresh_type_var("ret", level);
        let return_ty = if is_async {
            self.factory.promise(return_var.clone())
        } else {
            return_var.clone()
        };
        let fn_ty = self.factory.function(param_list, return_ty, is_async, is_generator);

        if let Some(n) = name {
            if let Some(id) = self.identifier_name(tree, n) {
                inner_env = inner_env.declare(Binding::new(id, n, DeclarationKind::Function, fn_ty.clone()));
            }
        }

        self.return_stack.push(return_var);
        self.generate_statement(tree, &inner_env, body);
        self.return_stack.pop();

        self.levels.leave();
        let scheme = generalize_if_safe(self.factory, &fn_ty, level);

        let result_env = match name.and_then(|n| self.identifier_name(tree, n).map(|id| (n, id))) {
            Some((n, id)) => {
                self.record(n, scheme.clone());
                env.declare(Binding::new(id, node, DeclarationKind::Function, scheme.clone()))
            }
            None => env.clone(),
        };
        (scheme, result_env)
    }

    fn generate_class_decl<T: Tree>(
        &mut self,
        tree: &T,
        env: &Environment,
        node: NodeId,
        name: Option<NodeId>,
        superclass: Option<NodeId>,
        members: &[NodeId],
    ) -> Environment {
        let mut instance_props = indexmap::IndexMap::new();
        for member in members {
            if let NodeKind::FunctionDecl {
                name: Some(member_name),
                params,
                body,
                is_async,
                is_generator,
            } = tree.kind(*member).clone()
            {
                let Some(id) = self.identifier_name(tree, member_name) else {
                    continue;
                };
                let (method_ty, _) =
                    self.generate_function(tree, env, *member, None, &params, body, is_async, is_generator);
                instance_props.insert(
                    id.into(),
                    PropertyType {
                        ty: method_ty,
                        optional: false,
                        readonly: false,
                    },
                );
            }
        }
        let instance_ty = self.factory.object(instance_props);
        let constructor_ty = self.factory.function(vec![], instance_ty.clone(), false, false);
        let super_ty = superclass.and_then(|s| {
            let id = self.identifier_name(tree, s)?;
            env.lookup(&id).map(|b| b.ty.clone())
        });
        let class_name = name
            .and_then(|n| self.identifier_name(tree, n))
            .unwrap_or_else(|| "anonymous".to_string());
        let class_ty = self.factory.class(
            &class_name,
            constructor_ty,
            instance_ty,
            indexmap::IndexMap::new(),
            super_ty,
        );
        if let Some(n) = name {
            if let Some(id) = self.identifier_name(tree, n) {
                self.record(n, class_ty.clone());
                return env.declare(Binding::new(id, node, DeclarationKind::Class, class_ty));
            }
        }
        env.clone()
    }

    fn generate_expr<T: Tree>(&mut self, tree: &T, env: &Environment, node: NodeId) -> Ty {
        let span = tree.span(node);
        let ty = match tree.kind(node).clone() {
            NodeKind::NumberLiteral(v) => self.factory.number_literal(v),
            NodeKind::StringLiteral(ref s) => self.factory.string_literal(s),
            NodeKind::BooleanLiteral(v) => self.factory.boolean_literal(v),
            NodeKind::BigIntLiteral(v) => self.factory.bigint_literal(v),
            NodeKind::NullLiteral => self.factory.null(),
            NodeKind::UndefinedLiteral => self.factory.undefined(),
            NodeKind::ThisExpr => self.factory.any(Some("this")),

            NodeKind::Identifier(ref name) => match env.lookup(name) {
                Some(binding) => instantiate(self.factory, &binding.ty.clone(), self.levels.level()),
                None => self.factory.any(Some("undefined-variable")),
            },

            NodeKind::ArrayLiteral(elements) => {
                let has_spread = elements
                    .iter()
                    .any(|e| matches!(tree.kind(*e), NodeKind::Spread(_)));
                let members: Vec<Ty> = elements.iter().map(|e| self.generate_expr(tree, env, *e)).collect();
                if !has_spread && members.len() <= ft_common::limits::MAX_TUPLE_LENGTH {
                    self.factory.tuple(members)
                } else {
                    let element_ty = self.factory.union(members);
                    self.factory.array(element_ty)
                }
            }

            NodeKind::ObjectLiteral(props) => {
                let mut properties = indexmap::IndexMap::with_capacity(props.len());
                for (key, value, computed) in props {
                    let value_ty = self.generate_expr(tree, env, value);
                    if computed {
                        continue;
                    }
                    if let Some(name) = property_key_name(tree, key) {
                        properties.insert(
                            name.into(),
                            PropertyType {
                                ty: value_ty,
                                optional: false,
                                readonly: false,
                            },
                        );
                    }
                }
                self.factory.object(properties)
            }

            NodeKind::FunctionExpr {
                params,
                body,
                is_async,
                is_generator,
            } => {
                let (ty, _) = self.generate_function(tree, env, node, None, &params, body, is_async, is_generator);
                ty
            }
            NodeKind::ArrowFunction {
                params,
                body,
                is_async,
            } => {
                let (ty, _) = self.generate_function(tree, env, node, None, &params, body, is_async, false);
                ty
            }

            NodeKind::Unary { op, argument } => self.generate_unary(tree, env, op, argument),
            NodeKind::Update { argument, .. } => self.generate_expr(tree, env, argument),
            NodeKind::Binary { op, left, right } => self.generate_binary(tree, env, span, op, left, right),
            NodeKind::Logical { op, left, right } => self.generate_logical(tree, env, op, left, right),

            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.generate_expr(tree, env, test);
                let then_ty = self.generate_expr(tree, env, consequent);
                let else_ty = self.generate_expr(tree, env, alternate);
                self.factory.union(vec![then_ty, else_ty])
            }

            NodeKind::Assignment { op, target, value } => self.generate_assignment(tree, env, op, target, value),

            NodeKind::Sequence(items) => {
                let mut last = self.factory.undefined();
                for item in items {
                    last = self.generate_expr(tree, env, item);
                }
                last
            }

            NodeKind::TemplateLiteral(parts) => {
                for part in parts {
                    self.generate_expr(tree, env, part);
                }
                self.factory.string()
            }

            NodeKind::Member {
                object,
                property,
                computed,
                optional,
            } => self.generate_member(tree, env, span, object, property, computed, optional),

            NodeKind::Call { callee, args, optional } => self.generate_call(tree, env, span, callee, &args, optional),

            NodeKind::New { callee, args } => self.generate_new(tree, env, span, callee, &args),

            NodeKind::Await(argument) => {
                let arg_ty = self.generate_expr(tree, env, argument);
                let level = self.levels.level();
                let inner = self.factory.fresh_type_var("awaited", level);
                let wrapped = self.factory.promise(inner.clone());
                self.push(span, ConstraintKind::Flow { lhs: arg_ty, rhs: wrapped });
                inner
            }

            NodeKind::Yield { argument, .. } => {
                if let Some(arg) = argument {
                    self.generate_expr(tree, env, arg);
                }
                let level = self.levels.level();
                self.factory.fresh_type_var("yield", level)
            }

            NodeKind::Spread(inner) => self.generate_expr(tree, env, inner),

            _ => self.factory.any(Some("unsupported-syntax")),
        };
        self.record(node, ty.clone());
        ty
    }

    fn generate_unary<T: Tree>(&mut self, tree: &T, env: &Environment, op: UnaryOp, argument: NodeId) -> Ty {
        let arg_ty = self.generate_expr(tree, env, argument);
        let _ = arg_ty;
        match op {
            UnaryOp::Typeof => self.factory.string(),
            UnaryOp::Not | UnaryOp::Delete => self.factory.boolean(),
            UnaryOp::Negate | UnaryOp::Plus | UnaryOp::BitNot => self.factory.number(),
            UnaryOp::Void => self.factory.undefined(),
        }
    }

    fn generate_binary<T: Tree>(
        &mut self,
        tree: &T,
        env: &Environment,
        span: Span,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    ) -> Ty {
        let left_ty = self.generate_expr(tree, env, left);
        let right_ty = self.generate_expr(tree, env, right);
        match op {
            // `(L ≤ number ∧ R ≤ number ∧ R=number) ∨ (L ≤ string ∧ R=string)
            // ∨ (R ≤ string ∧ R=string)` — §4.4.3's three alternatives.
            BinaryOp::Add => {
                let level = self.levels.level();
                let result = self.factory.fresh_type_var("t", level);
                let number = self.factory.number();
                let string = self.factory.string();
                let numeric = vec![
                    ConstraintKind::Flow {
                        lhs: left_ty.clone(),
                        rhs: number.clone(),
                    },
                    ConstraintKind::Flow {
                        lhs: right_ty.clone(),
                        rhs: number.clone(),
                    },
                    ConstraintKind::Equal {
                        a: result.clone(),
                        b: number,
                    },
                ];
                let left_string = vec![
                    ConstraintKind::Flow {
                        lhs: left_ty.clone(),
                        rhs: string.clone(),
                    },
                    ConstraintKind::Equal {
                        a: result.clone(),
                        b: string.clone(),
                    },
                ];
                let right_string = vec![
                    ConstraintKind::Flow {
                        lhs: right_ty,
                        rhs: string.clone(),
                    },
                    ConstraintKind::Equal { a: result.clone(), b: string },
                ];
                self.push(span, ConstraintKind::Disjunction(vec![numeric, left_string, right_string]));
                result
            }
            BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Exponent
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::ShiftLeft
            | BinaryOp::ShiftRight
            | BinaryOp::UnsignedShiftRight => {
                let number = self.factory.number();
                self.push(
                    span,
                    ConstraintKind::Flow {
                        lhs: left_ty,
                        rhs: number.clone(),
                    },
                );
                self.push(span, ConstraintKind::Flow { lhs: right_ty, rhs: number.clone() });
                number
            }
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::StrictEqual
            | BinaryOp::StrictNotEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual
            | BinaryOp::In
            | BinaryOp::InstanceOf => {
                let _ = (left_ty, right_ty);
                self.factory.boolean()
            }
        }
    }

    fn generate_logical<T: Tree>(&mut self, tree: &T, env: &Environment, op: LogicalOp, left: NodeId, right: NodeId) -> Ty {
        let left_ty = self.generate_expr(tree, env, left);
        let right_ty = self.generate_expr(tree, env, right);
        match op {
            LogicalOp::And | LogicalOp::Or => self.factory.union(vec![left_ty, right_ty]),
            LogicalOp::NullishCoalesce => {
                let stripped = strip_nullish(self.factory, &left_ty);
                self.factory.union(vec![stripped, right_ty])
            }
        }
    }

    fn generate_member<T: Tree>(
        &mut self,
        tree: &T,
        env: &Environment,
        span: Span,
        object: NodeId,
        property: NodeId,
        computed: bool,
        optional: bool,
    ) -> Ty {
        let object_ty = self.generate_expr(tree, env, object);
        if computed {
            self.generate_expr(tree, env, property);
            let level = self.levels.level();
            let element = self.factory.fresh_type_var("elem", level);
            self.push(
                span,
                ConstraintKind::ArrayElement {
                    array: object_ty,
                    element: element.clone(),
                },
            );
            return with_optional_undefined(self.factory, element, optional);
        }
        let Some(name) = property_key_name(tree, property) else {
            return self.factory.any(Some("unsupported-syntax"));
        };
        let level = self.levels.level();
        let result = self.factory.fresh_type_var(&name, level);
        self.push(
            span,
            ConstraintKind::HasProperty {
                object: object_ty,
                name: Rc::from(name.as_str()),
                result: result.clone(),
            },
        );
        with_optional_undefined(self.factory, result, optional)
    }

    fn generate_call<T: Tree>(
        &mut self,
        tree: &T,
        env: &Environment,
        span: Span,
        callee: NodeId,
        args: &[NodeId],
        optional: bool,
    ) -> Ty {
        let callee_ty = self.generate_expr(tree, env, callee);
        let arg_types: Vec<Ty> = args.iter().map(|a| self.generate_expr(tree, env, *a)).collect();
        let level = self.levels.level();
        let result = self.factory.fresh_type_var("call", level);
        self.push(
            span,
            ConstraintKind::IsCallable {
                callee: callee_ty,
                args: arg_types,
                result: result.clone(),
            },
        );
        with_optional_undefined(self.factory, result, optional)
    }

    fn generate_new<T: Tree>(&mut self, tree: &T, env: &Environment, span: Span, callee: NodeId, args: &[NodeId]) -> Ty {
        let callee_ty = self.generate_expr(tree, env, callee);
        let arg_types: Vec<Ty> = args.iter().map(|a| self.generate_expr(tree, env, *a)).collect();
        let level = self.levels.level();
        let instance = self.factory.fresh_type_var("instance", level);
        self.push(
            span,
            ConstraintKind::IsCallable {
                callee: callee_ty,
                args: arg_types,
                result: instance.clone(),
            },
        );
        instance
    }

    fn generate_assignment<T: Tree>(
        &mut self,
        tree: &T,
        env: &Environment,
        _op: AssignOp,
        target: NodeId,
        value: NodeId,
    ) -> Ty {
        let value_ty = self.generate_expr(tree, env, value);
        let NodeKind::Identifier(name) = tree.kind(target).clone() else {
            return value_ty;
        };
        if let Some(existing) = env.lookup(&name) {
            self.push(
                tree.span(target),
                ConstraintKind::Flow {
                    lhs: value_ty.clone(),
                    rhs: existing.ty.clone(),
                },
            );
        }
        value_ty
    }
}

/// `generalize` freshens a type's free variables by rebuilding the whole
/// structure, which is only sound when `ty` is already a concrete shape
/// (function, object, array...) whose variables are leaves reachable by that
/// rebuild. A bare, still-unresolved type variable has no structure to walk:
/// generalizing one would quantify its own opaque id and later instantiate
/// it into a disconnected fresh variable with none of the bounds the
/// original accumulated during solving. Such bindings (e.g. `let y = someParam;`)
/// are left unquantified and shared monomorphically across their uses instead.
fn generalize_if_safe(factory: &mut TypeFactory, ty: &Ty, boundary_level: u32) -> Ty {
    if matches!(ty.kind, TyKind::TypeVar { .. }) {
        ty.clone()
    } else {
        generalize(factory, ty, boundary_level)
    }
}

fn strip_nullish(factory: &mut TypeFactory, ty: &Ty) -> Ty {
    let members: Vec<Ty> = match ty.as_union_members() {
        Some(members) => members.to_vec(),
        None => vec![ty.clone()],
    };
    factory.union(members.into_iter().filter(|m| !m.is_nullish()).collect())
}

/// Like `strip_nullish`, but keeps `null` — a pattern's default value only
/// applies when the source is exactly `undefined`.
fn strip_undefined(factory: &mut TypeFactory, ty: &Ty) -> Ty {
    let members: Vec<Ty> = match ty.as_union_members() {
        Some(members) => members.to_vec(),
        None => vec![ty.clone()],
    };
    factory.union(
        members
            .into_iter()
            .filter(|m| !matches!(m.kind, TyKind::Undefined))
            .collect(),
    )
}

fn with_optional_undefined(factory: &mut TypeFactory, ty: Ty, optional: bool) -> Ty {
    if optional {
        let undefined = factory.undefined();
        factory.union(vec![ty, undefined])
    } else {
        ty
    }
}

fn property_key_name<T: Tree>(tree: &T, key: NodeId) -> Option<String> {
    match tree.kind(key) {
        NodeKind::Identifier(name) => Some(name.clone()),
        NodeKind::StringLiteral(name) => Some(name.clone()),
        NodeKind::NumberLiteral(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/generator.rs"]
mod tests;
