//! `formatType` (§6): renders a `Ty` as the human-readable strings that show
//! up in emitted annotations (`number | undefined`, `(x: number) => boolean`,
//! `Array<T>`, `{ a: number; b: string }`, ...).

use std::fmt::Write as _;

use crate::ty::{Ty, TyKind};

pub fn format_type(ty: &Ty) -> String {
    let mut out = String::new();
    write_type(ty, &mut out, false);
    out
}

/// `parenthesize_union` wraps the rendering in parens when it appears as a
/// member of a union/intersection/array/promise where `|` would otherwise be
/// ambiguous (e.g. `Array<number | string>` vs `Array<(number | string)>`
/// never needs it, but `(number | string)[]`-style renderings would).
fn write_type(ty: &Ty, out: &mut String, parenthesize_union: bool) {
    match &ty.kind {
        TyKind::Never => out.push_str("never"),
        TyKind::Unknown => out.push_str("unknown"),
        TyKind::Any { .. } => out.push_str("any"),
        TyKind::Null => out.push_str("null"),
        TyKind::Undefined => out.push_str("undefined"),

        TyKind::Number(None) => out.push_str("number"),
        TyKind::Number(Some(bits)) => {
            let _ = write!(out, "{}", f64::from_bits(*bits));
        }
        TyKind::String(None) => out.push_str("string"),
        TyKind::String(Some(s)) => {
            let _ = write!(out, "\"{}\"", escape_string_literal(s));
        }
        TyKind::Boolean(None) => out.push_str("boolean"),
        TyKind::Boolean(Some(b)) => {
            let _ = write!(out, "{b}");
        }
        TyKind::BigInt(None) => out.push_str("bigint"),
        TyKind::BigInt(Some(v)) => {
            let _ = write!(out, "{v}n");
        }

        TyKind::Array {
            element,
            tuple: Some(members),
        } => {
            let _ = members;
            out.push('[');
            for (i, m) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(m, out, false);
            }
            out.push(']');
            let _ = element;
        }
        TyKind::Array {
            element,
            tuple: None,
        } => {
            out.push_str("Array<");
            write_type(element, out, false);
            out.push('>');
        }

        TyKind::Object { properties } => {
            if properties.is_empty() {
                out.push_str("{}");
            } else {
                out.push_str("{ ");
                for (i, (name, prop)) in properties.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if prop.readonly {
                        out.push_str("readonly ");
                    }
                    out.push_str(name);
                    if prop.optional {
                        out.push('?');
                    }
                    out.push_str(": ");
                    write_type(&prop.ty, out, false);
                }
                out.push_str(" }");
            }
        }

        TyKind::Function {
            params,
            return_ty,
            is_async,
            ..
        } => {
            if *is_async {
                out.push_str("async ");
            }
            out.push('(');
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if p.rest {
                    out.push_str("...");
                }
                out.push_str(&p.name);
                if p.optional {
                    out.push('?');
                }
                out.push_str(": ");
                write_type(&p.ty, out, false);
            }
            out.push_str(") => ");
            write_type(return_ty, out, false);
        }

        TyKind::Class { name, .. } => out.push_str(name),

        TyKind::Promise(inner) => {
            out.push_str("Promise<");
            write_type(inner, out, false);
            out.push('>');
        }

        TyKind::Union(members) => {
            if parenthesize_union {
                out.push('(');
            }
            for (i, m) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_type(m, out, true);
            }
            if parenthesize_union {
                out.push(')');
            }
        }

        TyKind::Intersection(members) => {
            for (i, m) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(" & ");
                }
                write_type(m, out, true);
            }
        }

        TyKind::TypeVar { display_name, .. } => {
            let _ = write!(out, "'{display_name}");
        }

        TyKind::Recursive { body, .. } => write_type(body, out, parenthesize_union),

        TyKind::Scheme { body, .. } => write_type(body, out, parenthesize_union),
    }
}

fn escape_string_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
#[path = "../tests/format.rs"]
mod tests;
