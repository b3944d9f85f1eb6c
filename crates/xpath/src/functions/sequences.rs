//! `fn:` sequence functions (spec.md §5.5). Grounded in the teacher's
//! `xpath1::functions` node-set cardinality helpers (`count`, `last`-style
//! position checks), generalized to the full XDM sequence model plus the
//! 2.0+ additions (`distinct-values`, `subsequence`, `index-of`,
//! `deep-equal`, `sum`/`avg`/`min`/`max`, `head`/`tail`).

use crate::engine::{single_atomic, single_integer, EvaluationContext};
use crate::error::{self, XPathError};
use crate::types::{AtomicValue, XdmItem, XdmValue};
use xpath_core::DataSourceNode;

pub fn handles(name: &str) -> bool {
    matches!(
        name,
        "count"
            | "empty"
            | "exists"
            | "distinct-values"
            | "reverse"
            | "subsequence"
            | "insert-before"
            | "remove"
            | "index-of"
            | "deep-equal"
            | "sum"
            | "avg"
            | "min"
            | "max"
            | "zero-or-one"
            | "one-or-more"
            | "exactly-one"
            | "head"
            | "tail"
    )
}

pub fn call<'d, N: DataSourceNode<'d>>(
    name: &str,
    args: &[XdmValue<N>],
    _ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    match name {
        "count" => Ok(XdmValue::from_atomic(AtomicValue::Integer(args[0].len() as i64))),
        "empty" => Ok(XdmValue::from_bool(args[0].is_empty())),
        "exists" => Ok(XdmValue::from_bool(!args[0].is_empty())),
        "distinct-values" => distinct_values(&args[0]),
        "reverse" => Ok(XdmValue::from_items(args[0].items().iter().rev().cloned().collect())),
        "subsequence" => subsequence(args),
        "insert-before" => insert_before(args),
        "remove" => remove(args),
        "index-of" => index_of(args),
        "deep-equal" => deep_equal(args),
        "sum" => sum(args),
        "avg" => avg(args),
        "min" => min_max(args, true),
        "max" => min_max(args, false),
        "zero-or-one" => {
            if args[0].len() > 1 {
                return Err(error::cardinality("0 or 1", args[0].len()));
            }
            Ok(args[0].clone())
        }
        "one-or-more" => {
            if args[0].is_empty() {
                return Err(error::cardinality("1 or more", 0));
            }
            Ok(args[0].clone())
        }
        "exactly-one" => {
            if args[0].len() != 1 {
                return Err(error::cardinality("1", args[0].len()));
            }
            Ok(args[0].clone())
        }
        "head" => Ok(args[0].items().first().map(|i| XdmValue::from_item(i.clone())).unwrap_or_else(XdmValue::empty)),
        "tail" => Ok(XdmValue::from_items(args[0].items().iter().skip(1).cloned().collect())),
        _ => unreachable!("sequences::call dispatched to an unhandled name"),
    }
}

fn distinct_values<N: Clone>(value: &XdmValue<N>) -> Result<XdmValue<N>, XPathError> {
    let mut seen: Vec<AtomicValue> = Vec::new();
    let mut out = Vec::new();
    for item in value.items() {
        let a = match item {
            XdmItem::Atomic(a) => a.clone(),
            other => return Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("distinct-values requires atomizable items, got {}", other_type_name(other)))),
        };
        if !seen.iter().any(|s| atomics_deep_equal(s, &a)) {
            seen.push(a.clone());
            out.push(XdmItem::Atomic(a));
        }
    }
    Ok(XdmValue::from_items(out))
}

fn other_type_name<N>(item: &XdmItem<N>) -> &'static str {
    match item {
        XdmItem::Node(_) => "node()",
        XdmItem::Map(_) => "map(*)",
        XdmItem::Array(_) => "array(*)",
        XdmItem::Function(_) => "function(*)",
        XdmItem::Atomic(_) => "xs:anyAtomicType",
    }
}

fn subsequence<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let items = args[0].items();
    let start = single_atomic(&args[1])?.to_double().unwrap_or(1.0).round();
    let length = args.get(2).map(|v| single_atomic(v)).transpose()?.and_then(|a| a.to_double()).map(|l| l.round());

    let first = (start.max(1.0) as i64 - 1).max(0);
    let end = match length {
        Some(l) => ((start + l).max(1.0) as i64 - 1).min(items.len() as i64),
        None => items.len() as i64,
    };
    if first >= items.len() as i64 || end <= first {
        return Ok(XdmValue::empty());
    }
    Ok(XdmValue::from_items(items[first as usize..end as usize].to_vec()))
}

fn insert_before<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let pos = single_integer(&args[1])?;
    let mut items = args[0].items().to_vec();
    let idx = (pos - 1).clamp(0, items.len() as i64) as usize;
    let mut inserted = args[2].items().to_vec();
    let tail = items.split_off(idx);
    items.append(&mut inserted);
    items.extend(tail);
    Ok(XdmValue::from_items(items))
}

fn remove<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let pos = single_integer(&args[1])?;
    let items = args[0].items();
    if pos < 1 || pos as usize > items.len() {
        return Ok(XdmValue::from_items(items.to_vec()));
    }
    let mut out = items.to_vec();
    out.remove((pos - 1) as usize);
    Ok(XdmValue::from_items(out))
}

fn index_of<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let target = single_atomic(&args[1])?;
    let mut out = Vec::new();
    for (i, item) in args[0].items().iter().enumerate() {
        if let XdmItem::Atomic(a) = item {
            if atomics_deep_equal(a, &target) {
                out.push(XdmItem::Atomic(AtomicValue::Integer((i + 1) as i64)));
            }
        }
    }
    Ok(XdmValue::from_items(out))
}

fn atomics_deep_equal(a: &AtomicValue, b: &AtomicValue) -> bool {
    if a.is_numeric() && b.is_numeric() {
        return a.to_double() == b.to_double();
    }
    a == b
}

/// `fn:deep-equal`: structural equality across nodes, atomics, maps and
/// arrays. Node comparison falls back to string-value equality, which is
/// coarser than full structural node comparison but adequate without a
/// schema-aware type system to drive it.
fn deep_equal<'d, N: DataSourceNode<'d>>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let (a, b) = (&args[0], &args[1]);
    if a.len() != b.len() {
        return Ok(XdmValue::from_bool(false));
    }
    for (x, y) in a.items().iter().zip(b.items()) {
        if !deep_equal_item(x, y) {
            return Ok(XdmValue::from_bool(false));
        }
    }
    Ok(XdmValue::from_bool(true))
}

fn deep_equal_item<'d, N: DataSourceNode<'d>>(a: &XdmItem<N>, b: &XdmItem<N>) -> bool {
    match (a, b) {
        (XdmItem::Atomic(x), XdmItem::Atomic(y)) => atomics_deep_equal(x, y),
        (XdmItem::Node(x), XdmItem::Node(y)) => x == y || x.string_value() == y.string_value(),
        (XdmItem::Map(x), XdmItem::Map(y)) => {
            x.size() == y.size()
                && x.entries().all(|(k, v)| y.get(k).is_some_and(|yv| {
                    v.len() == yv.len() && v.items().iter().zip(yv.items()).all(|(a, b)| deep_equal_item(a, b))
                }))
        }
        (XdmItem::Array(x), XdmItem::Array(y)) => {
            x.size() == y.size()
                && x.members().iter().zip(y.members()).all(|(xv, yv)| {
                    xv.len() == yv.len() && xv.items().iter().zip(yv.items()).all(|(a, b)| deep_equal_item(a, b))
                })
        }
        _ => false,
    }
}

fn sum<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    if args[0].is_empty() {
        return Ok(args.get(1).cloned().unwrap_or_else(|| XdmValue::from_atomic(AtomicValue::Integer(0))));
    }
    let mut total = 0.0;
    let mut all_integer = true;
    for item in args[0].items() {
        let a = match item {
            XdmItem::Atomic(a) => a,
            _ => return Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, "fn:sum requires a sequence of atomic values")),
        };
        if !matches!(a, AtomicValue::Integer(_)) {
            all_integer = false;
        }
        total += a.to_double().ok_or_else(|| XPathError::new(xpath_core::error::ErrorCode::XPTY0004, "fn:sum requires numeric operands"))?;
    }
    Ok(XdmValue::from_atomic(if all_integer { AtomicValue::Integer(total as i64) } else { AtomicValue::Double(total) }))
}

fn avg<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    if args[0].is_empty() {
        return Ok(XdmValue::empty());
    }
    let total = match sum(args)?.single() {
        Some(XdmItem::Atomic(a)) => a.to_double().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(XdmValue::from_atomic(AtomicValue::Double(total / args[0].len() as f64)))
}

fn min_max<N: Clone>(args: &[XdmValue<N>], want_min: bool) -> Result<XdmValue<N>, XPathError> {
    if args[0].is_empty() {
        return Ok(XdmValue::empty());
    }
    let mut best: Option<AtomicValue> = None;
    for item in args[0].items() {
        let a = match item {
            XdmItem::Atomic(a) => a.clone(),
            _ => return Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, "fn:min/fn:max require atomic values")),
        };
        best = Some(match best {
            None => a,
            Some(current) => {
                let (cd, ad) = (current.to_double(), a.to_double());
                match (cd, ad) {
                    (Some(c), Some(v)) if (want_min && v < c) || (!want_min && v > c) => a,
                    (Some(_), Some(_)) => current,
                    _ if a.to_string_value() < current.to_string_value() => if want_min { a } else { current },
                    _ => if want_min { current } else { a },
                }
            }
        });
    }
    Ok(XdmValue::from_atomic(best.expect("non-empty sequence checked above")))
}
