//! The builtin global environment (§4.5) for the constraint-based path.
//! Mirrors the flow analyzer's builtin set exactly; kept as a separate,
//! self-contained module here because the constraint generator has no
//! dependency on `ft-analyze`.

use ft_binder::{Binding, DeclarationKind, Environment, ScopeKind};
use ft_types::{Param, PropertyType, TypeFactory};

pub fn global_environment(factory: &mut TypeFactory) -> Environment {
    let env = Environment::new(ScopeKind::Global);

    let log_params = vec![Param {
        name: "args".into(),
        ty: factory.any(None),
        optional: false,
        rest: true,
    }];
    let undefined_ty = factory.undefined();
    let log_fn = factory.function(log_params, undefined_ty, false, false);

    let mut console_props = indexmap::IndexMap::new();
    for method in ["log", "warn", "error", "info", "debug"] {
        console_props.insert(
            method.into(),
            PropertyType {
                ty: log_fn.clone(),
                optional: false,
                readonly: true,
            },
        );
    }
    let console_ty = factory.object(console_props);

    let mut math_props = indexmap::IndexMap::new();
    let unary_numeric = factory.function(
        vec![Param {
            name: "x".into(),
            ty: factory.number(),
            optional: false,
            rest: false,
        }],
        factory.number(),
        false,
        false,
    );
    for method in ["floor", "ceil", "round", "abs", "sqrt", "trunc", "sign"] {
        math_props.insert(
            method.into(),
            PropertyType {
                ty: unary_numeric.clone(),
                optional: false,
                readonly: true,
            },
        );
    }
    let variadic_numeric = factory.function(
        vec![Param {
            name: "values".into(),
            ty: factory.number(),
            optional: false,
            rest: true,
        }],
        factory.number(),
        false,
        false,
    );
    math_props.insert(
        "max".into(),
        PropertyType {
            ty: variadic_numeric.clone(),
            optional: false,
            readonly: true,
        },
    );
    math_props.insert(
        "min".into(),
        PropertyType {
            ty: variadic_numeric,
            optional: false,
            readonly: true,
        },
    );
    math_props.insert(
        "PI".into(),
        PropertyType {
            ty: factory.number(),
            optional: false,
            readonly: true,
        },
    );
    math_props.insert(
        "random".into(),
        PropertyType {
            ty: factory.function(vec![], factory.number(), false, false),
            optional: false,
            readonly: true,
        },
    );
    let math_ty = factory.object(math_props);

    let json_stringify_param_ty = factory.any(None);
    let json_stringify_ret_ty = factory.string();
    let json_stringify = factory.function(
        vec![Param {
            name: "value".into(),
            ty: json_stringify_param_ty,
            optional: false,
            rest: false,
        }],
        json_stringify_ret_ty,
        false,
        false,
    );
    let json_parse_param_ty = factory.string();
    let json_parse_ret_ty = factory.any(None);
    let json_parse = factory.function(
        vec![Param {
            name: "text".into(),
            ty: json_parse_param_ty,
            optional: false,
            rest: false,
        }],
        json_parse_ret_ty,
        false,
        false,
    );
    let mut json_props = indexmap::IndexMap::new();
    json_props.insert(
        "stringify".into(),
        PropertyType {
            ty: json_stringify,
            optional: false,
            readonly: true,
        },
    );
    json_props.insert(
        "parse".into(),
        PropertyType {
            ty: json_parse,
            optional: false,
            readonly: true,
        },
    );
    let json_ty = factory.object(json_props);

    let print_params = vec![Param {
        name: "args".into(),
        ty: factory.any(None),
        optional: false,
        rest: true,
    }];
    let print_undefined_ty = factory.undefined();
    let print_fn = factory.function(print_params, print_undefined_ty, false, false);

    let date_ty = date_type(factory);
    let object_ty = object_namespace_type(factory);
    let array_ty = array_namespace_type(factory);
    let string_ty = string_namespace_type(factory);
    let number_ty = number_namespace_type(factory);
    let boolean_ty = boolean_namespace_type(factory);

    env.declare(Binding::new("console", 0, DeclarationKind::Const, console_ty))
        .declare(Binding::new("Math", 0, DeclarationKind::Const, math_ty))
        .declare(Binding::new("JSON", 0, DeclarationKind::Const, json_ty))
        .declare(Binding::new("print", 0, DeclarationKind::Const, print_fn))
        .declare(Binding::new("Date", 0, DeclarationKind::Const, date_ty))
        .declare(Binding::new("Object", 0, DeclarationKind::Const, object_ty))
        .declare(Binding::new("Array", 0, DeclarationKind::Const, array_ty))
        .declare(Binding::new("String", 0, DeclarationKind::Const, string_ty))
        .declare(Binding::new("Number", 0, DeclarationKind::Const, number_ty))
        .declare(Binding::new("Boolean", 0, DeclarationKind::Const, boolean_ty))
        .declare(Binding::new(
            "undefined",
            0,
            DeclarationKind::Const,
            factory.undefined(),
        ))
        .declare(Binding::new("NaN", 0, DeclarationKind::Const, factory.number()))
        .declare(Binding::new(
            "Infinity",
            0,
            DeclarationKind::Const,
            factory.number(),
        ))
}

fn date_type(factory: &mut TypeFactory) -> ft_types::Ty {
    let no_args_number = factory.function(vec![], factory.number(), false, false);
    let mut instance_props = indexmap::IndexMap::new();
    for method in ["getTime", "getFullYear", "getMonth", "getDate", "getHours", "getMinutes", "getSeconds"] {
        instance_props.insert(
            method.into(),
            PropertyType {
                ty: no_args_number.clone(),
                optional: false,
                readonly: true,
            },
        );
    }
    let to_string = factory.function(vec![], factory.string(), false, false);
    instance_props.insert(
        "toISOString".into(),
        PropertyType {
            ty: to_string,
            optional: false,
            readonly: true,
        },
    );
    let instance = factory.object(instance_props);
    let constructor_param_ty = factory.any(None);
    let constructor = factory.function(
        vec![Param {
            name: "args".into(),
            ty: constructor_param_ty,
            optional: false,
            rest: true,
        }],
        instance.clone(),
        false,
        false,
    );
    let mut static_properties = indexmap::IndexMap::new();
    static_properties.insert("now".into(), no_args_number);
    factory.class("Date", constructor, instance, static_properties, None)
}

fn object_namespace_type(factory: &mut TypeFactory) -> ft_types::Ty {
    let keys_fn_param_ty = factory.any(None);
    let keys_fn_string_ty = factory.string();
    let keys_fn_ret_ty = factory.array(keys_fn_string_ty);
    let keys_fn = factory.function(
        vec![Param {
            name: "value".into(),
            ty: keys_fn_param_ty,
            optional: false,
            rest: false,
        }],
        keys_fn_ret_ty,
        false,
        false,
    );
    let mut props = indexmap::IndexMap::new();
    props.insert(
        "keys".into(),
        PropertyType {
            ty: keys_fn,
            optional: false,
            readonly: true,
        },
    );
    let values_fn_param_ty = factory.any(None);
    let values_fn_any_ty = factory.any(None);
    let values_fn_ret_ty = factory.array(values_fn_any_ty);
    let values_fn = factory.function(
        vec![Param {
            name: "value".into(),
            ty: values_fn_param_ty,
            optional: false,
            rest: false,
        }],
        values_fn_ret_ty,
        false,
        false,
    );
    props.insert(
        "values".into(),
        PropertyType {
            ty: values_fn,
            optional: false,
            readonly: true,
        },
    );
    let assign_fn_param_ty = factory.any(None);
    let assign_fn_ret_ty = factory.any(None);
    let assign_fn = factory.function(
        vec![Param {
            name: "targets".into(),
            ty: assign_fn_param_ty,
            optional: false,
            rest: true,
        }],
        assign_fn_ret_ty,
        false,
        false,
    );
    props.insert(
        "assign".into(),
        PropertyType {
            ty: assign_fn,
            optional: false,
            readonly: true,
        },
    );
    factory.object(props)
}

fn array_namespace_type(factory: &mut TypeFactory) -> ft_types::Ty {
    let is_array_param_ty = factory.any(None);
    let is_array_ret_ty = factory.boolean();
    let is_array = factory.function(
        vec![Param {
            name: "value".into(),
            ty: is_array_param_ty,
            optional: false,
            rest: false,
        }],
        is_array_ret_ty,
        false,
        false,
    );
    let from_fn_param_ty = factory.any(None);
    let from_fn_any_ty = factory.any(None);
    let from_fn_ret_ty = factory.array(from_fn_any_ty);
    let from_fn = factory.function(
        vec![Param {
            name: "iterable".into(),
            ty: from_fn_param_ty,
            optional: false,
            rest: false,
        }],
        from_fn_ret_ty,
        false,
        false,
    );
    let mut props = indexmap::IndexMap::new();
    props.insert(
        "isArray".into(),
        PropertyType {
            ty: is_array,
            optional: false,
            readonly: true,
        },
    );
    props.insert(
        "from".into(),
        PropertyType {
            ty: from_fn,
            optional: false,
            readonly: true,
        },
    );
    factory.object(props)
}

fn string_namespace_type(factory: &mut TypeFactory) -> ft_types::Ty {
    let from_char_code = factory.function(
        vec![Param {
            name: "codes".into(),
            ty: factory.number(),
            optional: false,
            rest: true,
        }],
        factory.string(),
        false,
        false,
    );
    let mut props = indexmap::IndexMap::new();
    props.insert(
        "fromCharCode".into(),
        PropertyType {
            ty: from_char_code,
            optional: false,
            readonly: true,
        },
    );
    factory.object(props)
}

fn number_namespace_type(factory: &mut TypeFactory) -> ft_types::Ty {
    let is_finite_param_ty = factory.any(None);
    let is_finite_ret_ty = factory.boolean();
    let is_finite = factory.function(
        vec![Param {
            name: "value".into(),
            ty: is_finite_param_ty,
            optional: false,
            rest: false,
        }],
        is_finite_ret_ty,
        false,
        false,
    );
    let mut props = indexmap::IndexMap::new();
    for name in ["isFinite", "isInteger", "isNaN"] {
        props.insert(
            name.into(),
            PropertyType {
                ty: is_finite.clone(),
                optional: false,
                readonly: true,
            },
        );
    }
    props.insert(
        "MAX_SAFE_INTEGER".into(),
        PropertyType {
            ty: factory.number(),
            optional: false,
            readonly: true,
        },
    );
    factory.object(props)
}

fn boolean_namespace_type(factory: &mut TypeFactory) -> ft_types::Ty {
    let coerce_param_ty = factory.any(None);
    let coerce_ret_ty = factory.boolean();
    let coerce = factory.function(
        vec![Param {
            name: "value".into(),
            ty: coerce_param_ty,
            optional: false,
            rest: false,
        }],
        coerce_ret_ty,
        false,
        false,
    );
    let mut props = indexmap::IndexMap::new();
    props.insert(
        "valueOf".into(),
        PropertyType {
            ty: coerce,
            optional: false,
            readonly: true,
        },
    );
    factory.object(props)
}

#[cfg(test)]
#[path = "../tests/builtins.rs"]
mod tests;
