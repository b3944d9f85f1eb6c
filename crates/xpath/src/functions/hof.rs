//! Higher-order functions (spec.md §5.8): invoking `function(*)` items, and
//! the sequence-processing functions built on top of that invocation
//! (`for-each`, `filter`, `fold-left`, `fold-right`, `for-each-pair`). The
//! teacher has no function-item concept to ground this on directly, so the
//! invocation dispatch is grounded in `engine::evaluate`'s own handling of
//! `DynamicFunctionCall`/`ArrowExpr`, which this module is called from.

use crate::engine::{self, single_integer, EvaluationContext};
use crate::error::{self, XPathError};
use crate::types::{AtomicValue, QNameValue, XdmFunction, XdmItem, XdmValue};
use xpath_core::DataSourceNode;

pub fn handles(name: &str) -> bool {
    matches!(
        name,
        "for-each" | "filter" | "fold-left" | "fold-right" | "for-each-pair" | "function-lookup" | "function-name" | "function-arity"
    )
}

pub fn call<'d, N: DataSourceNode<'d>>(
    name: &str,
    args: &[XdmValue<N>],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    match name {
        "for-each" => {
            let f = single_function(&args[1])?;
            let mut out = Vec::new();
            for item in args[0].items() {
                out.push(invoke_function(&f, &[XdmValue::from_item(item.clone())], ctx)?);
            }
            Ok(XdmValue::concat(out))
        }
        "filter" => {
            let f = single_function(&args[1])?;
            let mut out = Vec::new();
            for item in args[0].items() {
                let kept = invoke_function(&f, &[XdmValue::from_item(item.clone())], ctx)?;
                if crate::operators::effective_boolean_value(&kept)? {
                    out.push(item.clone());
                }
            }
            Ok(XdmValue::from_items(out))
        }
        "fold-left" => {
            let f = single_function(&args[2])?;
            let mut acc = args[1].clone();
            for item in args[0].items() {
                acc = invoke_function(&f, &[acc, XdmValue::from_item(item.clone())], ctx)?;
            }
            Ok(acc)
        }
        "fold-right" => {
            let f = single_function(&args[2])?;
            let mut acc = args[1].clone();
            for item in args[0].items().iter().rev() {
                acc = invoke_function(&f, &[XdmValue::from_item(item.clone()), acc], ctx)?;
            }
            Ok(acc)
        }
        "for-each-pair" => {
            let f = single_function(&args[2])?;
            let mut out = Vec::new();
            for (a, b) in args[0].items().iter().zip(args[1].items()) {
                out.push(invoke_function(&f, &[XdmValue::from_item(a.clone()), XdmValue::from_item(b.clone())], ctx)?);
            }
            Ok(XdmValue::concat(out))
        }
        "function-lookup" => {
            let local = super::single_string(&args[0])?;
            let arity = single_integer(&args[1])? as usize;
            Ok(XdmValue::from_item(XdmItem::Function(XdmFunction::named_ref(None, local, arity))))
        }
        "function-name" => match single_function(&args[0])? {
            XdmFunction::Builtin { name, .. } | XdmFunction::NamedRef { local_name: name, .. } => {
                Ok(XdmValue::from_atomic(AtomicValue::QName(QNameValue { prefix: None, local: name, namespace: None })))
            }
            _ => Ok(XdmValue::empty()),
        },
        "function-arity" => Ok(XdmValue::from_atomic(AtomicValue::Integer(single_function(&args[0])?.arity() as i64))),
        _ => unreachable!("hof::call dispatched to an unhandled name"),
    }
}

pub(crate) fn single_function<N: Clone>(value: &XdmValue<N>) -> Result<XdmFunction<N>, XPathError> {
    match value.single() {
        Some(XdmItem::Function(f)) => Ok(f.clone()),
        Some(_) => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, "expected a function item")),
        None => Err(error::cardinality("1", value.len())),
    }
}

/// Invokes any [`XdmFunction`] with already-evaluated arguments. Called
/// directly from `engine::invoke_value` for dynamic calls and arrow-operator
/// targets, and recursively from the sequence functions above.
pub fn invoke_function<'d, N: DataSourceNode<'d>>(
    f: &XdmFunction<N>,
    args: &[XdmValue<N>],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    match f {
        XdmFunction::Builtin { name, arity } => {
            check_arity(name, *arity, args.len())?;
            super::call_function(&crate::ast::QName::new(name.clone()), args, ctx)
        }
        XdmFunction::NamedRef { namespace, local_name, arity } => {
            check_arity(local_name, *arity, args.len())?;
            let name = match namespace {
                Some(ns) => crate::ast::QName::with_prefix(ns.clone(), local_name.clone()),
                None => crate::ast::QName::new(local_name.clone()),
            };
            super::call_function(&name, args, ctx)
        }
        XdmFunction::Inline { params, body, captured_variables } => {
            if params.len() != args.len() {
                return Err(error::cardinality(&params.len().to_string(), args.len()));
            }
            let mut local_variables = std::collections::HashMap::new();
            for (k, v) in captured_variables {
                local_variables.insert(k.clone(), v.clone());
            }
            for (param, value) in params.iter().zip(args) {
                local_variables.insert(param.name.clone(), value.clone());
            }
            let inner: EvaluationContext<'d, N> = EvaluationContext {
                dynamic: ctx.dynamic,
                focus: ctx.focus.clone(),
                local_variables,
            };
            engine::evaluate(body, &inner)
        }
        XdmFunction::Partial { base, bound_args } => {
            let mut full = Vec::with_capacity(bound_args.len());
            let mut supplied = args.iter();
            for slot in bound_args {
                match slot {
                    Some(v) => full.push(v.clone()),
                    None => full.push(supplied.next().cloned().ok_or_else(|| error::cardinality(&bound_args.len().to_string(), args.len()))?),
                }
            }
            invoke_function(base, &full, ctx)
        }
    }
}

fn check_arity(name: &str, expected: usize, actual: usize) -> Result<(), XPathError> {
    if expected != actual {
        return Err(error::function_error(name, format!("expects {} argument(s), got {}", expected, actual)));
    }
    Ok(())
}
