//! Narrowing a binding's type from a branch condition (§4.3).
//!
//! Handles the common guard shapes explicitly: `typeof x === "tag"` (and
//! `!==`), `x === null`/`undefined` (and `!=`/`!==`), the `x != null`
//! idiom, and `&&`/`||` combinations of those.

use ft_binder::Environment;
use ft_common::tree::{BinaryOp, LogicalOp, NodeKind, UnaryOp};
use ft_common::{NodeId, Tree};
use ft_types::{Ty, TyKind, TypeFactory};

pub fn narrow<T: Tree>(
    tree: &T,
    factory: &mut TypeFactory,
    env: &Environment,
    condition: NodeId,
    assume_true: bool,
) -> Environment {
    match tree.kind(condition).clone() {
        NodeKind::Unary {
            op: UnaryOp::Not,
            argument,
        } => narrow(tree, factory, env, argument, !assume_true),

        NodeKind::Logical { op, left, right } => match (op, assume_true) {
            (LogicalOp::And, true) => {
                let env = narrow(tree, factory, env, left, true);
                narrow(tree, factory, &env, right, true)
            }
            (LogicalOp::Or, false) => {
                let env = narrow(tree, factory, env, left, false);
                narrow(tree, factory, &env, right, false)
            }
            // `a && b` false, or `a || b` true: either operand could be the
            // deciding one, so no sound narrowing without path splitting;
            // leave the environment as-is.
            _ => env.clone(),
        },

        NodeKind::Binary { op, left, right } => {
            narrow_binary(tree, factory, env, op, left, right, assume_true)
        }

        _ => env.clone(),
    }
}

fn narrow_binary<T: Tree>(
    tree: &T,
    factory: &mut TypeFactory,
    env: &Environment,
    op: BinaryOp,
    left: NodeId,
    right: NodeId,
    assume_true: bool,
) -> Environment {
    let equality = matches!(
        op,
        BinaryOp::Equal | BinaryOp::StrictEqual | BinaryOp::NotEqual | BinaryOp::StrictNotEqual
    );
    if !equality {
        return env.clone();
    }
    let is_negated = matches!(op, BinaryOp::NotEqual | BinaryOp::StrictNotEqual);
    let matches_branch = assume_true != is_negated;

    if let Some((name, tag)) = typeof_guard(tree, left, right) {
        return narrow_by_typeof(factory, env, &name, &tag, matches_branch);
    }
    if let Some(name) = nullish_guard(tree, left, right) {
        return narrow_by_nullish(factory, env, &name, matches_branch);
    }
    env.clone()
}

fn typeof_guard<T: Tree>(tree: &T, left: NodeId, right: NodeId) -> Option<(String, String)> {
    if let (NodeKind::Unary { op: UnaryOp::Typeof, argument }, NodeKind::StringLiteral(tag)) =
        (tree.kind(left).clone(), tree.kind(right).clone())
    {
        if let NodeKind::Identifier(name) = tree.kind(argument).clone() {
            return Some((name, tag));
        }
    }
    if let (NodeKind::StringLiteral(tag), NodeKind::Unary { op: UnaryOp::Typeof, argument }) =
        (tree.kind(left).clone(), tree.kind(right).clone())
    {
        if let NodeKind::Identifier(name) = tree.kind(argument).clone() {
            return Some((name, tag));
        }
    }
    None
}

fn nullish_guard<T: Tree>(tree: &T, left: NodeId, right: NodeId) -> Option<String> {
    let is_nullish_literal = |n: NodeId| {
        matches!(
            tree.kind(n),
            NodeKind::NullLiteral | NodeKind::UndefinedLiteral
        )
    };
    if let NodeKind::Identifier(name) = tree.kind(left).clone() {
        if is_nullish_literal(right) {
            return Some(name);
        }
    }
    if let NodeKind::Identifier(name) = tree.kind(right).clone() {
        if is_nullish_literal(left) {
            return Some(name);
        }
    }
    None
}

fn narrow_by_typeof(
    factory: &mut TypeFactory,
    env: &Environment,
    name: &str,
    tag: &str,
    keep_matching: bool,
) -> Environment {
    let Some(binding) = env.lookup(name) else {
        return env.clone();
    };
    let members = union_members(&binding.ty);
    let filtered: Vec<Ty> = members
        .into_iter()
        .filter(|m| (typeof_tag(m) == tag) == keep_matching)
        .collect();
    if filtered.is_empty() {
        return env.clone();
    }
    let narrowed = factory.union(filtered);
    env.assign(name, narrowed)
}

fn narrow_by_nullish(
    factory: &mut TypeFactory,
    env: &Environment,
    name: &str,
    keep_nullish: bool,
) -> Environment {
    let Some(binding) = env.lookup(name) else {
        return env.clone();
    };
    let members = union_members(&binding.ty);
    let filtered: Vec<Ty> = members
        .into_iter()
        .filter(|m| m.is_nullish() == keep_nullish)
        .collect();
    if filtered.is_empty() {
        return env.clone();
    }
    let narrowed = factory.union(filtered);
    env.assign(name, narrowed)
}

fn union_members(ty: &Ty) -> Vec<Ty> {
    match ty.as_union_members() {
        Some(members) => members.to_vec(),
        None => vec![ty.clone()],
    }
}

/// The JS `typeof` tag a given type would report at runtime.
fn typeof_tag(ty: &Ty) -> &'static str {
    match &ty.kind {
        TyKind::Number(_) => "number",
        TyKind::String(_) => "string",
        TyKind::Boolean(_) => "boolean",
        TyKind::BigInt(_) => "bigint",
        TyKind::Undefined => "undefined",
        TyKind::Function { .. } | TyKind::Class { .. } => "function",
        // `null`, objects, arrays and everything else all report "object".
        _ => "object",
    }
}

#[cfg(test)]
#[path = "../tests/narrow.rs"]
mod tests;
