//! `fn:` string functions (spec.md §5.2). Grounded in the teacher's
//! `xpath1::functions::strings` (`concat`/`substring`/`contains`/
//! `normalize-space`/`translate`), extended with the 2.0+ additions
//! (`upper-case`, `lower-case`, `string-join`, `starts-with`/`ends-with`,
//! `codepoints-to-string`/`string-to-codepoints`, `compare`).

use super::{atomic_string, single_string};
use crate::error::{self, XPathError};
use crate::types::{AtomicValue, XdmItem, XdmValue};
use xpath_core::DataSourceNode;

pub fn handles(name: &str) -> bool {
    matches!(
        name,
        "concat"
            | "string-length"
            | "upper-case"
            | "lower-case"
            | "contains"
            | "starts-with"
            | "ends-with"
            | "substring"
            | "substring-before"
            | "substring-after"
            | "translate"
            | "normalize-space"
            | "string-join"
            | "codepoints-to-string"
            | "string-to-codepoints"
            | "compare"
            | "string"
    )
}

pub fn call<'d, N: DataSourceNode<'d>>(name: &str, args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    match name {
        "concat" => {
            let mut out = String::new();
            for a in args {
                out.push_str(&single_string(a)?);
            }
            Ok(XdmValue::from_atomic(atomic_string(out)))
        }
        "string" => {
            let s = match args.first() {
                Some(v) if !v.is_empty() => single_string(v)?,
                _ => String::new(),
            };
            Ok(XdmValue::from_atomic(atomic_string(s)))
        }
        "string-length" => {
            let s = single_string(&args[0])?;
            Ok(XdmValue::from_atomic(AtomicValue::Integer(s.chars().count() as i64)))
        }
        "upper-case" => Ok(XdmValue::from_atomic(atomic_string(single_string(&args[0])?.to_uppercase()))),
        "lower-case" => Ok(XdmValue::from_atomic(atomic_string(single_string(&args[0])?.to_lowercase()))),
        "contains" => {
            let (h, n) = (single_string(&args[0])?, single_string(&args[1])?);
            Ok(XdmValue::from_bool(h.contains(&n)))
        }
        "starts-with" => {
            let (h, n) = (single_string(&args[0])?, single_string(&args[1])?);
            Ok(XdmValue::from_bool(h.starts_with(&n)))
        }
        "ends-with" => {
            let (h, n) = (single_string(&args[0])?, single_string(&args[1])?);
            Ok(XdmValue::from_bool(h.ends_with(&n)))
        }
        "substring" => substring(args),
        "substring-before" => {
            let (h, n) = (single_string(&args[0])?, single_string(&args[1])?);
            let result = h.find(&n).map(|i| h[..i].to_string()).unwrap_or_default();
            Ok(XdmValue::from_atomic(atomic_string(result)))
        }
        "substring-after" => {
            let (h, n) = (single_string(&args[0])?, single_string(&args[1])?);
            let result = h.find(&n).map(|i| h[i + n.len()..].to_string()).unwrap_or_default();
            Ok(XdmValue::from_atomic(atomic_string(result)))
        }
        "translate" => translate(args),
        "normalize-space" => {
            let s = single_string(&args[0])?;
            Ok(XdmValue::from_atomic(atomic_string(s.split_whitespace().collect::<Vec<_>>().join(" "))))
        }
        "string-join" => string_join(args),
        "codepoints-to-string" => {
            let chars: Result<String, XPathError> = args[0]
                .items()
                .iter()
                .map(|item| match item {
                    XdmItem::Atomic(AtomicValue::Integer(i)) => {
                        char::from_u32(*i as u32).map(String::from).ok_or_else(|| error::function_error("codepoints-to-string", "not a valid codepoint"))
                    }
                    _ => Err(error::function_error("codepoints-to-string", "expects a sequence of integers")),
                })
                .collect();
            Ok(XdmValue::from_atomic(atomic_string(chars?)))
        }
        "string-to-codepoints" => {
            let s = single_string(&args[0])?;
            Ok(XdmValue::from_items(s.chars().map(|c| XdmItem::Atomic(AtomicValue::Integer(c as i64))).collect()))
        }
        "compare" => {
            let (a, b) = (single_string(&args[0])?, single_string(&args[1])?);
            Ok(XdmValue::from_atomic(AtomicValue::Integer(match a.cmp(&b) {
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => 1,
            })))
        }
        _ => unreachable!("strings::call dispatched to an unhandled name"),
    }
}

fn substring<'d, N: DataSourceNode<'d>>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let s: Vec<char> = single_string(&args[0])?.chars().collect();
    let start = crate::engine::single_atomic(&args[1])?.to_double().unwrap_or(1.0).round();
    let len = args
        .get(2)
        .map(|v| crate::engine::single_atomic(v).and_then(|a| a.to_double().ok_or_else(|| error::function_error("substring", "length is not numeric"))))
        .transpose()?
        .map(|l| l.round());

    let first = start.max(1.0) as i64 - 1;
    let end = match len {
        Some(l) => ((start + l).max(1.0) as i64 - 1).min(s.len() as i64),
        None => s.len() as i64,
    };
    if first >= s.len() as i64 || end <= first {
        return Ok(XdmValue::from_atomic(atomic_string(String::new())));
    }
    let (first, end) = (first.max(0) as usize, end.max(0) as usize);
    Ok(XdmValue::from_atomic(atomic_string(s[first..end].iter().collect::<String>())))
}

fn translate<'d, N: DataSourceNode<'d>>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let s = single_string(&args[0])?;
    let from: Vec<char> = single_string(&args[1])?.chars().collect();
    let to: Vec<char> = single_string(&args[2])?.chars().collect();
    let result: String = s
        .chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(idx) => to.get(idx).copied(),
            None => Some(c),
        })
        .collect();
    Ok(XdmValue::from_atomic(atomic_string(result)))
}

fn string_join<'d, N: DataSourceNode<'d>>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    let sep = if args.len() > 1 { single_string(&args[1])? } else { String::new() };
    let parts: Result<Vec<String>, XPathError> = args[0].items().iter().map(|item| crate::engine::atomize_item(item).map(|a| a.to_string_value())).collect();
    Ok(XdmValue::from_atomic(atomic_string(parts?.join(&sep))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpath_core::test_support::MockNode;

    #[test]
    fn substring_clamps_to_bounds() {
        let args: Vec<XdmValue<MockNode<'static>>> = vec![
            XdmValue::from_atomic(atomic_string("motor car")),
            XdmValue::from_atomic(AtomicValue::Integer(4)),
        ];
        let result = call("substring", &args).unwrap();
        assert_eq!(result, XdmValue::from_atomic(atomic_string("tor car")));
    }

    #[test]
    fn translate_maps_and_drops_characters() {
        let args: Vec<XdmValue<MockNode<'static>>> = vec![
            XdmValue::from_atomic(atomic_string("bar")),
            XdmValue::from_atomic(atomic_string("abc")),
            XdmValue::from_atomic(atomic_string("ABC")),
        ];
        let result = call("translate", &args).unwrap();
        assert_eq!(result, XdmValue::from_atomic(atomic_string("BAr")));
    }
}
