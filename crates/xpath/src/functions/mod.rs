//! The built-in function library (spec.md §5). Grounded in the teacher's
//! `xpath31::functions` module split (one file per functional area) and
//! filled out against `examples/original_source/elementpath`'s function
//! namespaces for the XPath 2.0/3.0/3.1 surface the teacher itself doesn't
//! cover (higher-order functions, maps/arrays, `math:*`).
//!
//! Every function takes its arguments pre-evaluated (the caller in
//! [`crate::engine`] evaluates argument expressions before reaching here)
//! plus the ambient [`crate::engine::EvaluationContext`] for the handful of
//! functions that are context-dependent (`fn:position`, `fn:last`, node
//! constructors relative to the context node).

pub mod casting;
pub(crate) mod datetime;
mod format;
pub mod hof;
mod maps_arrays;
mod math;
mod nodes;
mod numeric;
mod qnames;
mod regexp;
mod sequences;
mod strings;

use crate::ast::QName;
use crate::engine::EvaluationContext;
use crate::error::XPathError;
use crate::types::{AtomicValue, XdmValue};
use xpath_core::DataSourceNode;

/// Dispatches a static function call by (namespace prefix, local name,
/// arity). Prefixes are resolved loosely here: `map:`/`array:`/`math:` are
/// recognized literally since the default-function-namespace mechanism
/// (spec.md §3.5) already routes unprefixed calls to `fn:`.
pub fn call_function<'d, N: DataSourceNode<'d>>(
    name: &QName,
    args: &[XdmValue<N>],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    let local = name.local_part.as_str();
    match name.prefix.as_deref() {
        Some("map") => return maps_arrays::call_map(local, args, ctx),
        Some("array") => return maps_arrays::call_array(local, args, ctx),
        Some("math") => return math::call(local, args),
        _ => {}
    }
    match local {
        "true" => Ok(XdmValue::from_bool(true)),
        "false" => Ok(XdmValue::from_bool(false)),
        "not" => boolean_not(args),
        "boolean" => boolean_cast(args),
        "error" => call_error(args),
        "trace" => call_trace(args),

        s if strings::handles(s) => strings::call(s, args),
        s if numeric::handles(s) => numeric::call(s, args),
        s if sequences::handles(s) => sequences::call(s, args, ctx),
        s if nodes::handles(s) => nodes::call(s, args, ctx),
        s if qnames::handles(s) => qnames::call(s, args),
        s if regexp::handles(s) => regexp::call(s, args),
        s if datetime::handles(s) => datetime::call(s, args, ctx),
        s if format::handles(s) => format::call(s, args),
        s if hof::handles(s) => hof::call(s, args, ctx),

        other => Err(XPathError::unknown_function(other.to_string(), args.len())),
    }
}

fn boolean_not<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let ebv = crate::operators::effective_boolean_value(&args[0])?;
    Ok(XdmValue::from_bool(!ebv))
}

fn boolean_cast<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let ebv = crate::operators::effective_boolean_value(&args[0])?;
    Ok(XdmValue::from_bool(ebv))
}

/// `fn:error()`: zero, one, two or three arguments — message, code, extra.
/// Always returns `Err`, so the return type is nominal.
fn call_error<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let message = args
        .first()
        .and_then(|v| v.single().cloned())
        .map(|item| match item {
            crate::types::XdmItem::Atomic(a) => a.to_string_value(),
            _ => String::new(),
        })
        .unwrap_or_else(|| "raised by fn:error()".to_string());
    Err(XPathError::new(xpath_core::error::ErrorCode::FOER0000, message))
}

fn call_trace<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let label = args
        .get(1)
        .and_then(|v| v.single())
        .map(|item| match item {
            crate::types::XdmItem::Atomic(a) => a.to_string_value(),
            _ => String::new(),
        })
        .unwrap_or_default();
    for item in args[0].items() {
        if let crate::types::XdmItem::Atomic(a) = item {
            log::debug!("trace {}: {}", label, a.to_string_value());
        } else {
            log::debug!("trace {}: <non-atomic item>", label);
        }
    }
    Ok(args[0].clone())
}

/// `fn:string()` applied to a single argument (spec.md §4.4): atomizes a
/// node argument (to its untyped-atomic typed value) before stringifying it,
/// the same function-conversion rule `single_atomic` callers that don't need
/// node support skip.
pub(crate) fn single_string<'d, N: DataSourceNode<'d>>(value: &XdmValue<N>) -> Result<String, XPathError> {
    if value.is_empty() {
        return Ok(String::new());
    }
    Ok(crate::engine::atomize_single(value)?.to_string_value())
}

pub(crate) fn optional_string<'d, N: DataSourceNode<'d>>(value: Option<&XdmValue<N>>) -> Result<Option<String>, XPathError> {
    match value {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => Ok(Some(crate::engine::atomize_single(v)?.to_string_value())),
    }
}

pub(crate) fn atomic_string(s: impl Into<String>) -> AtomicValue {
    AtomicValue::String(s.into())
}
