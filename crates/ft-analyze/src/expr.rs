//! Expression typing (§4.3): the transfer function for every expression
//! node, applied bottom-up against the environment live at that program
//! point.

use rustc_hash::FxHashMap;

use ft_binder::{Binding, DeclarationKind, Environment};
use ft_common::tree::{AssignOp, BinaryOp, LogicalOp, NodeKind, UnaryOp};
use ft_common::{Diagnostic, NodeId, Tree};
use ft_types::{Param, PropertyType, Ty, TyKind, TypeFactory};

/// Function types resolved so far, keyed by the node that introduces them
/// (`FunctionDecl`/`FunctionExpr`/`ArrowFunction`), so a call expression can
/// look up a return type without re-analyzing the callee.
pub type FunctionTable = FxHashMap<NodeId, Ty>;

pub struct ExprCx<'a> {
    pub factory: &'a mut TypeFactory,
    pub functions: &'a FunctionTable,
    pub diagnostics: &'a mut Vec<Diagnostic>,
    pub call_args: &'a mut FxHashMap<NodeId, Vec<Vec<Ty>>>,
}

/// Returns the expression's type and the (possibly updated) environment —
/// only assignments and the short-circuiting operands of `&&`/`||`/`??`
/// actually change it.
pub fn infer_expr<T: Tree>(
    tree: &T,
    cx: &mut ExprCx,
    env: &Environment,
    node: NodeId,
) -> (Ty, Environment) {
    match tree.kind(node).clone() {
        NodeKind::NumberLiteral(v) => (cx.factory.number_literal(v), env.clone()),
        NodeKind::StringLiteral(ref s) => (cx.factory.string_literal(s), env.clone()),
        NodeKind::BooleanLiteral(v) => (cx.factory.boolean_literal(v), env.clone()),
        NodeKind::BigIntLiteral(v) => (cx.factory.bigint_literal(v), env.clone()),
        NodeKind::NullLiteral => (cx.factory.null(), env.clone()),
        NodeKind::UndefinedLiteral => (cx.factory.undefined(), env.clone()),
        NodeKind::ThisExpr => (cx.factory.any(Some("this")), env.clone()),

        NodeKind::Identifier(ref name) => match env.lookup(name) {
            Some(binding) if binding.definitely_assigned => (binding.ty.clone(), env.clone()),
            Some(_) => (cx.factory.undefined(), env.clone()),
            None => (cx.factory.any(Some("undefined-variable")), env.clone()),
        },

        NodeKind::ArrayLiteral(elements) => {
            let mut env = env.clone();
            let has_spread = elements
                .iter()
                .any(|e| matches!(tree.kind(*e), NodeKind::Spread(_)));
            let mut member_types = Vec::with_capacity(elements.len());
            for element in elements {
                let (ty, next_env) = infer_expr(tree, cx, &env, element);
                env = next_env;
                member_types.push(ty);
            }
            if !has_spread && member_types.len() <= ft_common::limits::MAX_TUPLE_LENGTH {
                (cx.factory.tuple(member_types), env)
            } else {
                let element_ty = cx.factory.union(member_types);
                (cx.factory.array(element_ty), env)
            }
        }

        NodeKind::ObjectLiteral(props) => {
            let mut env = env.clone();
            let mut properties = indexmap::IndexMap::with_capacity(props.len());
            for (key, value, computed) in props {
                let (value_ty, next_env) = infer_expr(tree, cx, &env, value);
                env = next_env;
                if computed {
                    continue; // computed keys can't contribute a statically-named property.
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
            (cx.factory.object(properties), env)
        }

        NodeKind::FunctionExpr { .. } | NodeKind::ArrowFunction { .. } => {
            let ty = cx
                .functions
                .get(&node)
                .cloned()
                .unwrap_or_else(|| cx.factory.any(Some("unanalyzed-function")));
            (ty, env.clone())
        }

        NodeKind::Unary { op, argument } => infer_unary(tree, cx, env, op, argument),

        NodeKind::Update { argument, .. } => {
            let (ty, env) = infer_expr(tree, cx, env, argument);
            (ty, env)
        }

        NodeKind::Binary { op, left, right } => infer_binary(tree, cx, env, op, left, right),

        NodeKind::Logical { op, left, right } => infer_logical(tree, cx, env, op, left, right),

        NodeKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            let (_, env_after_test) = infer_expr(tree, cx, env, test);
            let then_env = crate::narrow::narrow(tree, cx.factory, &env_after_test, test, true);
            let else_env = crate::narrow::narrow(tree, cx.factory, &env_after_test, test, false);
            let (then_ty, then_env) = infer_expr(tree, cx, &then_env, consequent);
            let (else_ty, else_env) = infer_expr(tree, cx, &else_env, alternate);
            let result_ty = cx.factory.union(vec![then_ty, else_ty]);
            let merged = Environment::join(&then_env, &else_env, cx.factory);
            (result_ty, merged)
        }

        NodeKind::Assignment { op, target, value } => {
            infer_assignment(tree, cx, env, op, target, value)
        }

        NodeKind::Sequence(items) => {
            let mut env = env.clone();
            let mut last = cx.factory.undefined();
            for item in items {
                let (ty, next_env) = infer_expr(tree, cx, &env, item);
                env = next_env;
                last = ty;
            }
            (last, env)
        }

        NodeKind::TemplateLiteral(parts) => {
            let mut env = env.clone();
            for part in parts {
                let (_, next_env) = infer_expr(tree, cx, &env, part);
                env = next_env;
            }
            (cx.factory.string(), env)
        }

        NodeKind::Member {
            object,
            property,
            computed,
            optional,
        } => infer_member(tree, cx, env, object, property, computed, optional),

        NodeKind::Call {
            callee,
            args,
            optional,
        } => infer_call(tree, cx, env, callee, args, optional),

        NodeKind::New { callee, args } => {
            let (callee_ty, mut env) = infer_expr(tree, cx, env, callee);
            for arg in &args {
                let (_, next_env) = infer_expr(tree, cx, &env, *arg);
                env = next_env;
            }
            let ty = match &callee_ty.kind {
                TyKind::Class { instance, .. } => instance.clone(),
                _ => cx.factory.any(Some("not-constructable")),
            };
            (ty, env)
        }

        NodeKind::Await(argument) => {
            let (ty, env) = infer_expr(tree, cx, env, argument);
            let unwrapped = match &ty.kind {
                TyKind::Promise(inner) => inner.clone(),
                _ => ty,
            };
            (unwrapped, env)
        }

        NodeKind::Yield { argument, .. } => {
            let mut env = env.clone();
            if let Some(arg) = argument {
                let (_, next_env) = infer_expr(tree, cx, &env, arg);
                env = next_env;
            }
            (cx.factory.any(Some("yield-result")), env)
        }

        NodeKind::Spread(inner) => infer_expr(tree, cx, env, inner),

        _ => (cx.factory.any(Some("unsupported-syntax")), env.clone()),
    }
}

fn infer_unary<T: Tree>(
    tree: &T,
    cx: &mut ExprCx,
    env: &Environment,
    op: UnaryOp,
    argument: NodeId,
) -> (Ty, Environment) {
    let (arg_ty, env) = infer_expr(tree, cx, env, argument);
    let ty = match op {
        UnaryOp::Typeof => cx.factory.string(),
        UnaryOp::Not => cx.factory.boolean(),
        UnaryOp::Negate | UnaryOp::Plus => cx.factory.number(),
        UnaryOp::BitNot => cx.factory.number(),
        UnaryOp::Void => cx.factory.undefined(),
        UnaryOp::Delete => cx.factory.boolean(),
    };
    let _ = arg_ty;
    (ty, env)
}

fn infer_binary<T: Tree>(
    tree: &T,
    cx: &mut ExprCx,
    env: &Environment,
    op: BinaryOp,
    left: NodeId,
    right: NodeId,
) -> (Ty, Environment) {
    let (left_ty, env) = infer_expr(tree, cx, env, left);
    let (right_ty, env) = infer_expr(tree, cx, &env, right);

    let ty = match op {
        BinaryOp::Add => {
            if matches!(left_ty.kind, TyKind::String(_)) || matches!(right_ty.kind, TyKind::String(_)) {
                cx.factory.string()
            } else {
                cx.factory.number()
            }
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
        | BinaryOp::UnsignedShiftRight => cx.factory.number(),
        BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::StrictEqual
        | BinaryOp::StrictNotEqual
        | BinaryOp::Less
        | BinaryOp::LessEqual
        | BinaryOp::Greater
        | BinaryOp::GreaterEqual
        | BinaryOp::In
        | BinaryOp::InstanceOf => cx.factory.boolean(),
    };
    (ty, env)
}

fn infer_logical<T: Tree>(
    tree: &T,
    cx: &mut ExprCx,
    env: &Environment,
    op: LogicalOp,
    left: NodeId,
    right: NodeId,
) -> (Ty, Environment) {
    let (left_ty, env_after_left) = infer_expr(tree, cx, env, left);

    let right_env = match op {
        LogicalOp::And => crate::narrow::narrow(tree, cx.factory, &env_after_left, left, true),
        LogicalOp::Or => crate::narrow::narrow(tree, cx.factory, &env_after_left, left, false),
        LogicalOp::NullishCoalesce => env_after_left.clone(),
    };
    let (right_ty, right_env) = infer_expr(tree, cx, &right_env, right);

    let result_ty = match op {
        LogicalOp::And => cx.factory.union(vec![left_ty, right_ty]),
        LogicalOp::Or => cx.factory.union(vec![left_ty, right_ty]),
        LogicalOp::NullishCoalesce => {
            let narrowed_left = strip_nullish(cx.factory, &left_ty);
            cx.factory.union(vec![narrowed_left, right_ty])
        }
    };
    let merged = Environment::join(&env_after_left, &right_env, cx.factory);
    (result_ty, merged)
}

fn strip_nullish(factory: &mut TypeFactory, ty: &Ty) -> Ty {
    let members: Vec<Ty> = match ty.as_union_members() {
        Some(members) => members.to_vec(),
        None => vec![ty.clone()],
    };
    let filtered: Vec<Ty> = members.into_iter().filter(|m| !m.is_nullish()).collect();
    factory.union(filtered)
}

fn infer_member<T: Tree>(
    tree: &T,
    cx: &mut ExprCx,
    env: &Environment,
    object: NodeId,
    property: NodeId,
    computed: bool,
    optional: bool,
) -> (Ty, Environment) {
    let (object_ty, env) = infer_expr(tree, cx, env, object);
    if computed {
        let index = match tree.kind(property) {
            NodeKind::NumberLiteral(v) if *v >= 0.0 => Some(*v as usize),
            _ => None,
        };
        let (_, env) = infer_expr(tree, cx, &env, property);
        let ty = match &object_ty.kind {
            TyKind::Array {
                element,
                tuple: Some(elements),
            } => match index {
                Some(i) => elements.get(i).cloned().unwrap_or_else(|| element.clone()),
                None => element.clone(),
            },
            TyKind::Array { element, .. } => element.clone(),
            _ => cx.factory.any(Some("computed-member")),
        };
        return (with_optional_undefined(cx.factory, ty, optional), env);
    }

    let Some(name) = property_key_name(tree, property) else {
        return (cx.factory.any(Some("unsupported-syntax")), env);
    };

    let ty = match &object_ty.kind {
        TyKind::Object { properties } => match properties.get(name.as_str()) {
            Some(prop) => prop.ty.clone(),
            None => {
                cx.diagnostics.push(Diagnostic::missing_property(
                    tree.span(property),
                    &name,
                    &ft_types::format_type(&object_ty),
                ));
                cx.factory.any(Some("missing-property"))
            }
        },
        TyKind::Class {
            instance,
            static_properties,
            ..
        } => {
            if let TyKind::Object { properties } = &instance.kind {
                if let Some(prop) = properties.get(name.as_str()) {
                    prop.ty.clone()
                } else if let Some(ty) = static_properties.get(name.as_str()) {
                    ty.clone()
                } else {
                    cx.factory.any(Some("missing-property"))
                }
            } else {
                cx.factory.any(Some("missing-property"))
            }
        }
        TyKind::Array { .. } if name == "length" => cx.factory.number(),
        TyKind::String(_) if name == "length" => cx.factory.number(),
        _ if object_ty.is_any() => cx.factory.any(None),
        _ => cx.factory.any(Some("missing-property")),
    };
    (with_optional_undefined(cx.factory, ty, optional), env)
}

fn with_optional_undefined(factory: &mut TypeFactory, ty: Ty, optional: bool) -> Ty {
    if optional {
        factory.union(vec![ty, factory.undefined()])
    } else {
        ty
    }
}

fn infer_call<T: Tree>(
    tree: &T,
    cx: &mut ExprCx,
    env: &Environment,
    callee: NodeId,
    args: Vec<NodeId>,
    optional: bool,
) -> (Ty, Environment) {
    // Record argument types against the callee's *declaration* node so the
    // pre-scan aggregation pass can find them when it later re-analyzes that
    // function with its parameters' inferred types.
    let declaration_key = match tree.kind(callee) {
        NodeKind::Identifier(name) => env.lookup(name).map(|b| b.node).unwrap_or(callee),
        _ => callee,
    };

    let (callee_ty, mut env) = infer_expr(tree, cx, env, callee);
    let mut arg_types = Vec::with_capacity(args.len());
    for arg in &args {
        let (ty, next_env) = infer_expr(tree, cx, &env, *arg);
        env = next_env;
        arg_types.push(ty);
    }
    cx.call_args.entry(declaration_key).or_default().push(arg_types);

    let ty = match &callee_ty.kind {
        TyKind::Function { return_ty, .. } => return_ty.clone(),
        _ if callee_ty.is_any() => cx.factory.any(None),
        _ => {
            cx.diagnostics.push(Diagnostic::not_callable(
                tree.span(callee),
                &ft_types::format_type(&callee_ty),
            ));
            cx.factory.any(Some("not-callable"))
        }
    };
    (with_optional_undefined(cx.factory, ty, optional), env)
}

fn infer_assignment<T: Tree>(
    tree: &T,
    cx: &mut ExprCx,
    env: &Environment,
    op: AssignOp,
    target: NodeId,
    value: NodeId,
) -> (Ty, Environment) {
    let (value_ty, env) = infer_expr(tree, cx, env, value);

    let NodeKind::Identifier(name) = tree.kind(target).clone() else {
        // Member-expression assignment targets aren't tracked in the
        // environment; type the RHS and move on.
        return (value_ty, env);
    };

    let Some(existing) = env.lookup(&name) else {
        return (value_ty, env);
    };

    if matches!(existing.kind, DeclarationKind::Const) && matches!(op, AssignOp::Assign) {
        cx.diagnostics
            .push(Diagnostic::cannot_assign_to_const(tree.span(target), &name));
        return (existing.ty.clone(), env);
    }

    let new_ty = match op {
        AssignOp::Assign => value_ty,
        AssignOp::LogicalAndAssign | AssignOp::LogicalOrAssign | AssignOp::NullishAssign => {
            cx.factory.union(vec![existing.ty.clone(), value_ty])
        }
        AssignOp::AddAssign => {
            if matches!(existing.ty.kind, TyKind::String(_)) || matches!(value_ty.kind, TyKind::String(_)) {
                cx.factory.string()
            } else {
                cx.factory.number()
            }
        }
        AssignOp::SubAssign | AssignOp::MulAssign | AssignOp::DivAssign => cx.factory.number(),
    };
    let widened = cx.factory.widen(&new_ty);
    let env = env.assign(&name, widened.clone());
    (widened, env)
}

fn property_key_name<T: Tree>(tree: &T, key: NodeId) -> Option<String> {
    match tree.kind(key) {
        NodeKind::Identifier(name) => Some(name.clone()),
        NodeKind::StringLiteral(name) => Some(name.clone()),
        NodeKind::NumberLiteral(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Helper for building function parameter lists once their body has been
/// analyzed (used by `analyzer::analyze_function`).
pub fn param_entry(name: &str, ty: Ty, optional: bool, rest: bool) -> Param {
    Param {
        name: name.into(),
        ty,
        optional,
        rest,
    }
}

/// Declares a parameter binding for the start of a function body.
pub fn declare_param(env: &Environment, node: NodeId, name: &str, ty: Ty) -> Environment {
    env.declare(Binding::new(name, node, DeclarationKind::Param, ty))
}

/// Recursively destructures `pattern` against `source_ty`, declaring every
/// leaf identifier it binds. Covers object/array patterns, defaults and rest
/// elements, nested at any depth, for both `VarDecl` names and `Param` names.
pub fn bind_pattern<T: Tree>(
    tree: &T,
    cx: &mut ExprCx,
    env: &Environment,
    pattern: NodeId,
    source_ty: Ty,
    decl_kind: DeclarationKind,
) -> Environment {
    match tree.kind(pattern).clone() {
        NodeKind::Identifier(name) => env.declare(Binding::new(name, pattern, decl_kind, source_ty)),

        NodeKind::AssignmentPattern { target, default } => {
            let (default_ty, _) = infer_expr(tree, cx, env, default);
            let narrowed = strip_undefined(cx.factory, &source_ty);
            let combined = cx.factory.union(vec![narrowed, default_ty]);
            bind_pattern(tree, cx, env, target, combined, decl_kind)
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
                        .unwrap_or_else(|| cx.factory.any(Some("missing-property"))),
                    _ if source_ty.is_any() => cx.factory.any(None),
                    _ => cx.factory.any(Some("missing-property")),
                };
                bound_names.push(prop_name);
                env = bind_pattern(tree, cx, &env, value, prop_ty, decl_kind);
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
                let rest_ty = cx.factory.object(rest_props);
                env = bind_pattern(tree, cx, &env, rest_pattern, rest_ty, decl_kind);
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
                _ if source_ty.is_any() => cx.factory.any(None),
                _ => cx.factory.any(Some("not-iterable")),
            };
            for (i, slot) in elements.into_iter().enumerate() {
                let Some(slot_pattern) = slot else {
                    continue; // elision: `[, b] = arr`
                };
                let slot_ty = tuple_elements
                    .as_ref()
                    .and_then(|elems| elems.get(i).cloned())
                    .unwrap_or_else(|| element_ty.clone());
                env = bind_pattern(tree, cx, &env, slot_pattern, slot_ty, decl_kind);
            }
            if let Some(rest_pattern) = rest {
                let rest_ty = cx.factory.array(element_ty);
                env = bind_pattern(tree, cx, &env, rest_pattern, rest_ty, decl_kind);
            }
            env
        }

        _ => env.clone(),
    }
}

/// The default-value idiom only kicks in when the source is `undefined`
/// (not `null`), so unlike `strip_nullish` this keeps `null` in the union.
fn strip_undefined(factory: &mut TypeFactory, ty: &Ty) -> Ty {
    let members: Vec<Ty> = match ty.as_union_members() {
        Some(members) => members.to_vec(),
        None => vec![ty.clone()],
    };
    let filtered: Vec<Ty> = members
        .into_iter()
        .filter(|m| !matches!(m.kind, TyKind::Undefined))
        .collect();
    factory.union(filtered)
}
