//! The closed, versioned function table.
//!
//! Every callable function is listed in [`TABLE`]; lookup failures and
//! arity violations are expression-level defects that fail the owning
//! constraint regardless of the data under evaluation.

use crate::context::EvalContext;
use crate::error::{EvalError, EvalResult};
use crate::eval::Evaluator;
use crate::value::{node_text, XpValue};

/// Implementation signature: evaluated arguments in, value out.
pub type FnImpl = fn(&Evaluator, &EvalContext, Vec<XpValue>) -> EvalResult<XpValue>;

/// One entry of the function table.
#[derive(Debug)]
pub struct NamedFunction {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub eval: FnImpl,
}

/// The function table. Closed set: there is no registration mechanism.
pub static TABLE: &[NamedFunction] = &[
    // String family
    NamedFunction { name: "concat", min_args: 2, max_args: usize::MAX, eval: fn_concat },
    NamedFunction { name: "starts-with", min_args: 2, max_args: 2, eval: fn_starts_with },
    NamedFunction { name: "contains", min_args: 2, max_args: 2, eval: fn_contains },
    NamedFunction { name: "substring", min_args: 2, max_args: 3, eval: fn_substring },
    NamedFunction { name: "substring-before", min_args: 2, max_args: 2, eval: fn_substring_before },
    NamedFunction { name: "substring-after", min_args: 2, max_args: 2, eval: fn_substring_after },
    NamedFunction { name: "string-length", min_args: 0, max_args: 1, eval: fn_string_length },
    NamedFunction { name: "normalize-space", min_args: 0, max_args: 1, eval: fn_normalize_space },
    NamedFunction { name: "translate", min_args: 3, max_args: 3, eval: fn_translate },
    NamedFunction { name: "string", min_args: 0, max_args: 1, eval: fn_string },
    // Boolean family
    NamedFunction { name: "boolean", min_args: 1, max_args: 1, eval: fn_boolean },
    NamedFunction { name: "not", min_args: 1, max_args: 1, eval: fn_not },
    NamedFunction { name: "true", min_args: 0, max_args: 0, eval: fn_true },
    NamedFunction { name: "false", min_args: 0, max_args: 0, eval: fn_false },
    // Numeric family
    NamedFunction { name: "number", min_args: 0, max_args: 1, eval: fn_number },
    NamedFunction { name: "floor", min_args: 1, max_args: 1, eval: fn_floor },
    NamedFunction { name: "ceiling", min_args: 1, max_args: 1, eval: fn_ceiling },
    NamedFunction { name: "round", min_args: 1, max_args: 1, eval: fn_round },
    // Node-set family
    NamedFunction { name: "count", min_args: 1, max_args: 1, eval: fn_count },
    NamedFunction { name: "sum", min_args: 1, max_args: 1, eval: fn_sum },
    NamedFunction { name: "current", min_args: 0, max_args: 0, eval: fn_current },
    // Schema-language extensions
    NamedFunction { name: "derived-from", min_args: 2, max_args: 2, eval: fn_derived_from },
    NamedFunction {
        name: "derived-from-or-self",
        min_args: 2,
        max_args: 2,
        eval: fn_derived_from_or_self,
    },
    NamedFunction { name: "enum-value", min_args: 0, max_args: 1, eval: fn_enum_value },
];

/// Look up a function and check the call's arity.
pub fn lookup(name: &str, given: usize) -> EvalResult<&'static NamedFunction> {
    let func = TABLE
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| EvalError::unknown_function(name))?;
    if given < func.min_args || given > func.max_args {
        let expected = if func.min_args == func.max_args {
            format!("{}", func.min_args)
        } else if func.max_args == usize::MAX {
            format!("at least {}", func.min_args)
        } else {
            format!("{}..{}", func.min_args, func.max_args)
        };
        return Err(EvalError::arity(name, given, expected));
    }
    Ok(func)
}

// ========== String family ==========

fn fn_concat(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.to_text(ctx.tree));
    }
    Ok(XpValue::Text(out))
}

fn fn_starts_with(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let haystack = args[0].to_text(ctx.tree);
    let needle = args[1].to_text(ctx.tree);
    Ok(XpValue::Boolean(haystack.starts_with(&needle)))
}

fn fn_contains(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let haystack = args[0].to_text(ctx.tree);
    let needle = args[1].to_text(ctx.tree);
    Ok(XpValue::Boolean(haystack.contains(&needle)))
}

fn fn_substring(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let text = args[0].to_text(ctx.tree);
    let start = round_half_up(args[1].to_number(ctx.tree));
    let end = match args.get(2) {
        Some(len) => start + round_half_up(len.to_number(ctx.tree)),
        None => f64::INFINITY,
    };
    if start.is_nan() || end.is_nan() {
        return Ok(XpValue::Text(String::new()));
    }
    // Positions are 1-based: keep chars at positions p with start <= p < end.
    let out: String = text
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let p = (i + 1) as f64;
            p >= start && p < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(XpValue::Text(out))
}

fn fn_substring_before(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let text = args[0].to_text(ctx.tree);
    let sep = args[1].to_text(ctx.tree);
    let out = text.find(&sep).map(|i| text[..i].to_string()).unwrap_or_default();
    Ok(XpValue::Text(out))
}

fn fn_substring_after(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let text = args[0].to_text(ctx.tree);
    let sep = args[1].to_text(ctx.tree);
    let out = text
        .find(&sep)
        .map(|i| text[i + sep.len()..].to_string())
        .unwrap_or_default();
    Ok(XpValue::Text(out))
}

fn fn_string_length(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let text = arg_or_context_text(ctx, &args);
    Ok(XpValue::Number(text.chars().count() as f64))
}

fn fn_normalize_space(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let text = arg_or_context_text(ctx, &args);
    let out = text.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(XpValue::Text(out))
}

fn fn_translate(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let text = args[0].to_text(ctx.tree);
    let from: Vec<char> = args[1].to_text(ctx.tree).chars().collect();
    let to: Vec<char> = args[2].to_text(ctx.tree).chars().collect();
    let out: String = text
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(i) => to.get(i).copied(),
            None => Some(c),
        })
        .collect();
    Ok(XpValue::Text(out))
}

fn fn_string(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Text(arg_or_context_text(ctx, &args)))
}

// ========== Boolean family ==========

fn fn_boolean(_: &Evaluator, _: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Boolean(args[0].to_boolean()))
}

fn fn_not(_: &Evaluator, _: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Boolean(!args[0].to_boolean()))
}

fn fn_true(_: &Evaluator, _: &EvalContext, _: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Boolean(true))
}

fn fn_false(_: &Evaluator, _: &EvalContext, _: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Boolean(false))
}

// ========== Numeric family ==========

fn fn_number(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let n = match args.first() {
        Some(arg) => arg.to_number(ctx.tree),
        None => XpValue::Text(node_text(ctx.tree, ctx.context)).to_number(ctx.tree),
    };
    Ok(XpValue::Number(n))
}

fn fn_floor(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Number(args[0].to_number(ctx.tree).floor()))
}

fn fn_ceiling(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Number(args[0].to_number(ctx.tree).ceil()))
}

fn fn_round(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Number(round_half_up(args[0].to_number(ctx.tree))))
}

// ========== Node-set family ==========

fn fn_count(_: &Evaluator, _: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let nodes = args[0]
        .as_nodes()
        .ok_or_else(|| EvalError::node_set_required("count"))?;
    Ok(XpValue::Number(nodes.len() as f64))
}

fn fn_sum(_: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let nodes = args[0]
        .as_nodes()
        .ok_or_else(|| EvalError::node_set_required("sum"))?;
    let mut total = 0.0;
    for &idx in nodes {
        total += XpValue::Text(node_text(ctx.tree, idx)).to_number(ctx.tree);
    }
    Ok(XpValue::Number(total))
}

fn fn_current(_: &Evaluator, ctx: &EvalContext, _: Vec<XpValue>) -> EvalResult<XpValue> {
    Ok(XpValue::Nodes(vec![ctx.current()]))
}

// ========== Schema-language extensions ==========

fn fn_derived_from(ev: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    derived_from(ev, ctx, args, false)
}

fn fn_derived_from_or_self(
    ev: &Evaluator,
    ctx: &EvalContext,
    args: Vec<XpValue>,
) -> EvalResult<XpValue> {
    derived_from(ev, ctx, args, true)
}

fn derived_from(
    ev: &Evaluator,
    ctx: &EvalContext,
    args: Vec<XpValue>,
    or_self: bool,
) -> EvalResult<XpValue> {
    let value = match &args[0] {
        XpValue::Nodes(nodes) => match nodes.first() {
            Some(&idx) => node_text(ctx.tree, idx),
            None => return Ok(XpValue::Boolean(false)),
        },
        other => other.to_text(ctx.tree),
    };
    let base = args[1].to_text(ctx.tree);
    Ok(XpValue::Boolean(ev.schema().is_derived_from(&value, &base, or_self)))
}

fn fn_enum_value(ev: &Evaluator, ctx: &EvalContext, args: Vec<XpValue>) -> EvalResult<XpValue> {
    let node = match args.first() {
        Some(XpValue::Nodes(nodes)) => match nodes.first() {
            Some(&idx) => idx,
            None => return Ok(XpValue::Number(f64::NAN)),
        },
        Some(_) => return Ok(XpValue::Number(f64::NAN)),
        None => ctx.context,
    };
    let value = node_text(ctx.tree, node);
    let schema_id = match ctx.tree.schema_of(node) {
        Some(id) => id,
        None => return Ok(XpValue::Number(f64::NAN)),
    };
    let n = ev
        .schema()
        .node(schema_id)
        .enum_value(&value)
        .map(|v| v as f64)
        .unwrap_or(f64::NAN);
    Ok(XpValue::Number(n))
}

// ========== Helpers ==========

fn arg_or_context_text(ctx: &EvalContext, args: &[XpValue]) -> String {
    match args.first() {
        Some(arg) => arg.to_text(ctx.tree),
        None => node_text(ctx.tree, ctx.context),
    }
}

/// XPath round(): half rounds toward positive infinity.
pub(crate) fn round_half_up(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}
