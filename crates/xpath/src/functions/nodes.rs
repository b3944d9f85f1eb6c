//! Node-accessor and context functions (spec.md §5.1, §5.6). Grounded in the
//! teacher's `xpath1::functions::nodes` (`name`, `position`, `last`), which
//! already reads these off the evaluation context the same way.

use super::single_string;
use crate::engine::{single_atomic, EvaluationContext};
use crate::error::{self, XPathError};
use crate::types::{AtomicValue, QNameValue, XdmItem, XdmValue};
use xpath_core::{DataSourceNode, NodeType};

pub fn handles(name: &str) -> bool {
    matches!(
        name,
        "name"
            | "local-name"
            | "namespace-uri"
            | "root"
            | "base-uri"
            | "lang"
            | "generate-id"
            | "data"
            | "position"
            | "last"
            | "nilled"
            | "document-uri"
            | "node-name"
            | "id"
            | "idref"
            | "path"
    )
}

pub fn call<'d, N: DataSourceNode<'d>>(
    name: &str,
    args: &[XdmValue<N>],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    match name {
        "position" => {
            let focus = ctx.focus.as_ref().ok_or_else(XPathError::no_context_item)?;
            Ok(XdmValue::from_atomic(AtomicValue::Integer(focus.position as i64)))
        }
        "last" => {
            let focus = ctx.focus.as_ref().ok_or_else(XPathError::no_context_item)?;
            Ok(XdmValue::from_atomic(AtomicValue::Integer(focus.size as i64)))
        }
        "name" => {
            let node = context_or_arg_node(args, ctx)?;
            Ok(XdmValue::from_atomic(AtomicValue::String(
                node.map(|n| qualified_name_string(&n)).unwrap_or_default(),
            )))
        }
        "local-name" => {
            let node = context_or_arg_node(args, ctx)?;
            Ok(XdmValue::from_atomic(AtomicValue::String(
                node.and_then(|n| n.name().map(|q| q.local_part.to_string())).unwrap_or_default(),
            )))
        }
        "namespace-uri" => {
            let node = context_or_arg_node(args, ctx)?;
            Ok(XdmValue::from_atomic(AtomicValue::AnyUri(
                node.and_then(|n| n.name().and_then(|q| q.namespace_uri)).unwrap_or_default().to_string(),
            )))
        }
        "node-name" => {
            let node = context_or_arg_node(args, ctx)?;
            match node.and_then(|n| n.name()) {
                Some(q) => Ok(XdmValue::from_atomic(AtomicValue::QName(QNameValue {
                    prefix: q.prefix.map(str::to_string),
                    local: q.local_part.to_string(),
                    namespace: q.namespace_uri.map(str::to_string),
                }))),
                None => Ok(XdmValue::empty()),
            }
        }
        "root" => {
            let node = context_or_arg_node(args, ctx)?.ok_or_else(XPathError::no_context_item)?;
            let mut r = node;
            while let Some(p) = r.parent() {
                r = p;
            }
            Ok(XdmValue::from_node(r))
        }
        "base-uri" => {
            let node = context_or_arg_node(args, ctx)?;
            Ok(match node.and_then(|n| n.base_uri()) {
                Some(uri) => XdmValue::from_atomic(AtomicValue::AnyUri(uri)),
                None => XdmValue::empty(),
            })
        }
        "document-uri" => {
            let node = context_or_arg_node(args, ctx)?;
            Ok(match node.filter(|n| n.node_type() == NodeType::Document).and_then(|n| n.base_uri()) {
                Some(uri) => XdmValue::from_atomic(AtomicValue::AnyUri(uri)),
                None => XdmValue::empty(),
            })
        }
        "nilled" => Ok(XdmValue::from_bool(false)),
        "data" => {
            let mut out = Vec::new();
            for item in args[0].items() {
                out.push(match item {
                    XdmItem::Atomic(a) => a.clone(),
                    XdmItem::Node(n) => AtomicValue::UntypedAtomic(n.string_value()),
                    other => return Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("fn:data cannot atomize a {}", other.type_name()))),
                });
            }
            Ok(XdmValue::from_items(out.into_iter().map(XdmItem::Atomic).collect()))
        }
        "generate-id" => {
            let node = context_or_arg_node(args, ctx)?;
            Ok(XdmValue::from_atomic(AtomicValue::String(node.map(|n| format!("n{}", n.document_order_index())).unwrap_or_default())))
        }
        "lang" => {
            let wanted = single_string(&args[0])?.to_lowercase();
            let mut node = Some(ctx.context_node_or_arg(args.get(1))?);
            while let Some(n) = node {
                if let Some(lang) = n.attributes().find(|a| a.name().is_some_and(|q| q.local_part == "lang")).map(|a| a.string_value().to_lowercase()) {
                    return Ok(XdmValue::from_bool(lang == wanted || lang.starts_with(&format!("{}-", wanted))));
                }
                node = n.parent();
            }
            Ok(XdmValue::from_bool(false))
        }
        "path" => {
            let node = context_or_arg_node(args, ctx)?.ok_or_else(XPathError::no_context_item)?;
            Ok(XdmValue::from_atomic(AtomicValue::String(path_expression(node))))
        }
        "id" | "idref" => id_or_idref(name, args, ctx),
        _ => unreachable!("nodes::call dispatched to an unhandled name"),
    }
}

fn context_or_arg_node<'d, N: DataSourceNode<'d>>(args: &[XdmValue<N>], ctx: &EvaluationContext<'d, N>) -> Result<Option<N>, XPathError> {
    match args.first() {
        Some(v) if !v.is_empty() => match v.single() {
            Some(XdmItem::Node(n)) => Ok(Some(*n)),
            Some(_) => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, "expected a node argument")),
            None => Err(error::cardinality("1", v.len())),
        },
        Some(_) => Ok(None),
        None => match &ctx.focus {
            Some(f) => match &f.context_item {
                XdmItem::Node(n) => Ok(Some(*n)),
                _ => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0020, "context item is not a node")),
            },
            None => Err(XPathError::no_context_item()),
        },
    }
}

impl<'a, N: DataSourceNode<'a>> EvaluationContext<'a, N> {
    fn context_node_or_arg(&self, arg: Option<&XdmValue<N>>) -> Result<N, XPathError> {
        match arg {
            Some(v) if !v.is_empty() => match v.single() {
                Some(XdmItem::Node(n)) => Ok(*n),
                _ => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, "expected a node argument")),
            },
            _ => match &self.focus {
                Some(f) => match &f.context_item {
                    XdmItem::Node(n) => Ok(*n),
                    _ => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0020, "context item is not a node")),
                },
                None => Err(XPathError::no_context_item()),
            },
        }
    }
}

fn qualified_name_string<'a, N: DataSourceNode<'a>>(node: &N) -> String {
    node.name()
        .map(|q| match q.prefix {
            Some(p) => format!("{}:{}", p, q.local_part),
            None => q.local_part.to_string(),
        })
        .unwrap_or_default()
}

fn path_expression<'a, N: DataSourceNode<'a>>(node: N) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        segments.push(match n.node_type() {
            NodeType::Document => String::new(),
            NodeType::Attribute => format!("@{}", qualified_name_string(&n)),
            _ => qualified_name_string(&n),
        });
        current = n.parent();
    }
    segments.reverse();
    format!("/{}", segments.join("/"))
}

fn id_or_idref<'d, N: DataSourceNode<'d>>(which: &str, args: &[XdmValue<N>], ctx: &EvaluationContext<'d, N>) -> Result<XdmValue<N>, XPathError> {
    let ids: Vec<String> = args[0]
        .items()
        .iter()
        .flat_map(|item| match item {
            XdmItem::Atomic(a) => a.to_string_value().split_whitespace().map(str::to_string).collect::<Vec<_>>(),
            _ => Vec::new(),
        })
        .collect();
    let root = context_or_arg_node(&args[1..], ctx)?.ok_or_else(XPathError::no_context_item)?;
    let mut top = root;
    while let Some(p) = top.parent() {
        top = p;
    }
    let mut matches = Vec::new();
    let mut stack = vec![top];
    while let Some(n) = stack.pop() {
        let predicate = if which == "id" { n.is_id() } else { n.is_idref() };
        if predicate && ids.iter().any(|id| id == &n.string_value()) {
            matches.push(if which == "id" { n.parent().unwrap_or(n) } else { n });
        }
        stack.extend(n.attributes());
        stack.extend(n.children());
    }
    matches.sort_by_key(|n| n.document_order_index());
    matches.dedup_by_key(|n| n.document_order_index());
    Ok(XdmValue::from_nodes(matches))
}
