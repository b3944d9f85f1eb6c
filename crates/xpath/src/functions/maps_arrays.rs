//! `map:*`/`array:*` (spec.md §5.9, §5.10). The teacher has no analogue for
//! either data structure; grounded directly in [`crate::types::map::XdmMap`]
//! and [`crate::types::array::XdmArray`], which already carry the XDM
//! persistent-collection semantics these functions wrap.

use crate::engine::{single_integer, EvaluationContext};
use crate::error::{self, XPathError};
use crate::types::{AtomicValue, XdmArray, XdmItem, XdmMap, XdmValue};
use xpath_core::DataSourceNode;

pub fn call_map<'d, N: DataSourceNode<'d>>(
    local: &str,
    args: &[XdmValue<N>],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    match local {
        "merge" => {
            let maps = as_maps(&args[0])?;
            Ok(XdmValue::from_item(XdmItem::Map(XdmMap::merge(maps))))
        }
        "get" => {
            let map = as_map(&args[0])?;
            let key = crate::engine::single_atomic(&args[1])?;
            Ok(map.get(&key).cloned().unwrap_or_else(XdmValue::empty))
        }
        "put" => {
            let map = as_map(&args[0])?;
            let key = crate::engine::single_atomic(&args[1])?;
            Ok(XdmValue::from_item(XdmItem::Map(map.put(key, args[2].clone()))))
        }
        "remove" => {
            let map = as_map(&args[0])?;
            let mut current = map.clone();
            for item in args[1].items() {
                if let XdmItem::Atomic(key) = item {
                    current = current.remove(key);
                }
            }
            Ok(XdmValue::from_item(XdmItem::Map(current)))
        }
        "contains" => {
            let map = as_map(&args[0])?;
            let key = crate::engine::single_atomic(&args[1])?;
            Ok(XdmValue::from_bool(map.contains_key(&key)))
        }
        "keys" => {
            let map = as_map(&args[0])?;
            Ok(XdmValue::from_items(map.keys().cloned().map(XdmItem::Atomic).collect()))
        }
        "size" => {
            let map = as_map(&args[0])?;
            Ok(XdmValue::from_atomic(AtomicValue::Integer(map.size() as i64)))
        }
        "for-each" => {
            let map = as_map(&args[0])?;
            let f = crate::functions::hof::single_function(&args[1])?;
            let mut out = Vec::new();
            for (k, v) in map.entries() {
                let call_args = [XdmValue::from_atomic(k.clone()), v.clone()];
                out.push(crate::functions::hof::invoke_function(&f, &call_args, ctx)?);
            }
            Ok(XdmValue::concat(out))
        }
        _ => unreachable!("maps_arrays::call_map dispatched to an unhandled name"),
    }
}

pub fn call_array<'d, N: DataSourceNode<'d>>(
    local: &str,
    args: &[XdmValue<N>],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    match local {
        "size" => Ok(XdmValue::from_atomic(AtomicValue::Integer(as_array(&args[0])?.size() as i64))),
        "get" => Ok(as_array(&args[0])?.get(single_integer(&args[1])?)?.clone()),
        "put" => Ok(wrap(as_array(&args[0])?.put(single_integer(&args[1])?, args[2].clone())?)),
        "append" => Ok(wrap(as_array(&args[0])?.append(args[1].clone()))),
        "insert-before" => Ok(wrap(as_array(&args[0])?.insert_before(single_integer(&args[1])?, args[2].clone())?)),
        "remove" => Ok(wrap(as_array(&args[0])?.remove(single_integer(&args[1])?)?)),
        "subarray" => {
            let length = args.get(2).map(single_integer).transpose()?;
            Ok(wrap(as_array(&args[0])?.subarray(single_integer(&args[1])?, length)?))
        }
        "head" => Ok(as_array(&args[0])?.head()?.clone()),
        "tail" => Ok(wrap(as_array(&args[0])?.tail()?)),
        "reverse" => Ok(wrap(as_array(&args[0])?.reverse())),
        "join" => {
            let arrays = args[0]
                .items()
                .iter()
                .map(|item| match item {
                    XdmItem::Array(a) => Ok(a.clone()),
                    other => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("array:join expects arrays, got {}", other.type_name()))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(wrap(XdmArray::join(arrays)))
        }
        "flatten" => {
            let mut out = Vec::new();
            flatten(&args[0], &mut out);
            Ok(XdmValue::from_items(out))
        }
        "for-each" => {
            let array = as_array(&args[0])?;
            let f = crate::functions::hof::single_function(&args[1])?;
            let mut members = Vec::with_capacity(array.size());
            for member in array.members() {
                members.push(crate::functions::hof::invoke_function(&f, &[member.clone()], ctx)?);
            }
            Ok(wrap(XdmArray::from_members(members)))
        }
        _ => unreachable!("maps_arrays::call_array dispatched to an unhandled name"),
    }
}

fn wrap<N: Clone>(array: XdmArray<N>) -> XdmValue<N> {
    XdmValue::from_item(XdmItem::Array(array))
}

fn as_map<N: Clone>(value: &XdmValue<N>) -> Result<XdmMap<N>, XPathError> {
    match value.single() {
        Some(XdmItem::Map(m)) => Ok(m.clone()),
        Some(other) => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("expected a map, got {}", other_type_name(other)))),
        None => Err(error::cardinality("1", value.len())),
    }
}

fn as_maps<N: Clone>(value: &XdmValue<N>) -> Result<Vec<XdmMap<N>>, XPathError> {
    value
        .items()
        .iter()
        .map(|item| match item {
            XdmItem::Map(m) => Ok(m.clone()),
            other => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("expected a map, got {}", other_type_name(other)))),
        })
        .collect()
}

fn as_array<N: Clone>(value: &XdmValue<N>) -> Result<XdmArray<N>, XPathError> {
    match value.single() {
        Some(XdmItem::Array(a)) => Ok(a.clone()),
        Some(other) => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("expected an array, got {}", other_type_name(other)))),
        None => Err(error::cardinality("1", value.len())),
    }
}

fn other_type_name<N>(item: &XdmItem<N>) -> &'static str {
    match item {
        XdmItem::Node(_) => "node()",
        XdmItem::Atomic(_) => "xs:anyAtomicType",
        XdmItem::Array(_) => "array(*)",
        XdmItem::Function(_) => "function(*)",
        XdmItem::Map(_) => "map(*)",
    }
}

fn flatten<N: Clone>(value: &XdmValue<N>, out: &mut Vec<XdmItem<N>>) {
    for item in value.items() {
        match item {
            XdmItem::Array(a) => {
                for member in a.members() {
                    flatten(member, out);
                }
            }
            other => out.push(other.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_get_is_one_based() {
        let array: XdmValue<()> = wrap(XdmArray::from_members(vec![
            XdmValue::from_atomic(AtomicValue::Integer(10)),
            XdmValue::from_atomic(AtomicValue::Integer(20)),
        ]));
        let a = as_array(&array).unwrap();
        assert_eq!(a.get(1).unwrap(), &XdmValue::from_atomic(AtomicValue::Integer(10)));
    }

    #[test]
    fn map_put_does_not_mutate_original_through_wrapper() {
        let map: XdmValue<()> = XdmValue::from_item(XdmItem::Map(XdmMap::new()));
        let m = as_map(&map).unwrap();
        let m2 = m.put(AtomicValue::Integer(1), XdmValue::from_atomic(AtomicValue::String("x".into())));
        assert_eq!(m.size(), 0);
        assert_eq!(m2.size(), 1);
    }
}
