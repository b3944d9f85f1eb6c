//! The dynamic evaluator (spec.md §3.6, §4.3–§4.5): walks an [`Expression`]
//! against a [`DynamicContext`]/focus pair and produces an [`XdmValue`].
//! Mirrors the shape of the teacher's `xpath1::engine::evaluate`
//! (match-on-`Expression`, a context carried by reference, nested contexts
//! rebuilt per predicate) generalized to the full XDM value model.

use crate::ast::*;
use crate::error::{self, XPathError};
use crate::functions;
use crate::operators;
use crate::types::*;
use chrono::{FixedOffset, Utc};
use std::collections::{HashMap, HashSet};
use xpath_core::axes;
use xpath_core::error::ErrorCode;
use xpath_core::{DataSourceNode, NodeType};

/// The dynamic context proper (spec.md §3.6): state that does not change
/// as evaluation descends into sub-expressions, only as a new top-level
/// evaluation begins.
#[derive(Clone)]
pub struct DynamicContext<N> {
    pub variables: HashMap<String, XdmValue<N>>,
    pub current_datetime: chrono::DateTime<FixedOffset>,
    pub implicit_timezone: FixedOffset,
}

impl<N> Default for DynamicContext<N> {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            variables: HashMap::new(),
            current_datetime: now.with_timezone(&FixedOffset::east_opt(0).unwrap()),
            implicit_timezone: FixedOffset::east_opt(0).unwrap(),
        }
    }
}

/// The focus (spec.md §3.6): the context item, its position, and the size
/// of the sequence it was drawn from. `None` before any path/predicate
/// establishes one — evaluating `.` or a step with no focus is `XPDY0002`.
#[derive(Clone)]
pub struct Focus<N> {
    pub context_item: XdmItem<N>,
    pub position: usize,
    pub size: usize,
}

#[derive(Clone)]
pub struct EvaluationContext<'a, N> {
    pub dynamic: &'a DynamicContext<N>,
    pub focus: Option<Focus<N>>,
    pub local_variables: HashMap<String, XdmValue<N>>,
}

impl<'a, N: Clone> EvaluationContext<'a, N> {
    pub fn new(dynamic: &'a DynamicContext<N>) -> Self {
        Self { dynamic, focus: None, local_variables: HashMap::new() }
    }

    pub fn with_context_node(dynamic: &'a DynamicContext<N>, node: N) -> Self {
        Self {
            dynamic,
            focus: Some(Focus { context_item: XdmItem::Node(node), position: 1, size: 1 }),
            local_variables: HashMap::new(),
        }
    }

    fn with_focus(&self, item: XdmItem<N>, position: usize, size: usize) -> Self {
        Self {
            dynamic: self.dynamic,
            focus: Some(Focus { context_item: item, position, size }),
            local_variables: self.local_variables.clone(),
        }
    }

    fn with_variable(&self, name: String, value: XdmValue<N>) -> Self {
        let mut ctx = self.clone();
        ctx.local_variables.insert(name, value);
        ctx
    }

    fn lookup_variable(&self, name: &str) -> Option<&XdmValue<N>> {
        self.local_variables.get(name).or_else(|| self.dynamic.variables.get(name))
    }

    fn context_node(&self) -> Result<&N, XPathError> {
        match &self.focus {
            Some(Focus { context_item: XdmItem::Node(n), .. }) => Ok(n),
            Some(_) => Err(XPathError::new(ErrorCode::XPTY0020, "context item is not a node")),
            None => Err(XPathError::no_context_item()),
        }
    }
}

/// Evaluates `expr`, the crate's other main entry point alongside
/// [`crate::parser::parse`].
pub fn evaluate<'d, N>(expr: &Expression, ctx: &EvaluationContext<'d, N>) -> Result<XdmValue<N>, XPathError>
where
    N: DataSourceNode<'d>,
{
    match expr {
        Expression::Literal(lit) => Ok(XdmValue::from_atomic(literal_to_atomic(lit)?)),
        Expression::ContextItem => match &ctx.focus {
            Some(f) => Ok(XdmValue::from_item(f.context_item.clone())),
            None => Err(XPathError::no_context_item()),
        },
        Expression::Variable(name) => ctx
            .lookup_variable(name)
            .cloned()
            .ok_or_else(|| error::unknown_variable(name)),
        Expression::LocationPath(path) => evaluate_location_path(path, ctx),
        Expression::FunctionCall { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                values.push(evaluate(a, ctx)?);
            }
            functions::call_function(name, &values, ctx)
        }
        Expression::PartialApply { name, args } => {
            let mut bound = Vec::with_capacity(args.len());
            for a in args {
                bound.push(match a {
                    Some(e) => Some(evaluate(e, ctx)?),
                    None => None,
                });
            }
            let arity = args.len();
            Ok(XdmValue::from_item(XdmItem::Function(XdmFunction::Partial {
                base: Box::new(XdmFunction::named_ref(name.prefix.clone(), &name.local_part, arity)),
                bound_args: bound,
            })))
        }
        Expression::DynamicFunctionCall { function_expr, args } => {
            let func_value = evaluate(function_expr, ctx)?;
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                values.push(evaluate(a, ctx)?);
            }
            invoke_value(&func_value, &values, ctx)
        }
        Expression::BinaryOp { left, op, right } => operators::evaluate_binary(*op, left, right, ctx),
        Expression::UnaryOp { op, expr } => {
            let value = evaluate(expr, ctx)?;
            operators::evaluate_unary(*op, &value)
        }
        Expression::Sequence(items) => {
            let mut out = Vec::new();
            for e in items {
                out.push(evaluate(e, ctx)?);
            }
            Ok(XdmValue::concat(out))
        }
        Expression::RangeExpr { start, end } => {
            let s = single_integer(&evaluate(start, ctx)?)?;
            let e = single_integer(&evaluate(end, ctx)?)?;
            if s > e {
                return Ok(XdmValue::empty());
            }
            Ok(XdmValue::from_items((s..=e).map(|i| XdmItem::Atomic(AtomicValue::Integer(i))).collect()))
        }
        Expression::FilterExpr { base, predicates } => {
            let base_value = evaluate(base, ctx)?;
            apply_predicates(base_value.into_items(), predicates, ctx)
        }
        Expression::SimpleMapExpr { base, mapping } => {
            let base_value = evaluate(base, ctx)?;
            let items = base_value.into_items();
            let size = items.len();
            let mut out = Vec::new();
            for (i, item) in items.into_iter().enumerate() {
                let inner = ctx.with_focus(item, i + 1, size);
                out.push(evaluate(mapping, &inner)?);
            }
            Ok(XdmValue::concat(out))
        }
        Expression::LetExpr { bindings, return_expr } => {
            let mut inner = ctx.clone();
            for (name, value_expr) in bindings {
                let value = evaluate(value_expr, &inner)?;
                inner = inner.with_variable(name.clone(), value);
            }
            evaluate(return_expr, &inner)
        }
        Expression::ForExpr { bindings, return_expr } => evaluate_for(bindings, return_expr, ctx, 0, ctx.clone()),
        Expression::IfExpr { condition, then_expr, else_expr } => {
            let cond = evaluate(condition, ctx)?;
            if operators::effective_boolean_value(&cond)? {
                evaluate(then_expr, ctx)
            } else {
                evaluate(else_expr, ctx)
            }
        }
        Expression::QuantifiedExpr { quantifier, bindings, satisfies } => {
            evaluate_quantified(*quantifier, bindings, satisfies, ctx, 0, ctx.clone())
        }
        Expression::MapConstructor(entries) => {
            let mut map = XdmMap::new();
            for entry in entries {
                let key = single_atomic(&evaluate(&entry.key, ctx)?)?;
                let value = evaluate(&entry.value, ctx)?;
                map = map.put(key, value);
            }
            Ok(XdmValue::from_item(XdmItem::Map(map)))
        }
        Expression::ArrayConstructor(ArrayConstructorKind::Square(items)) => {
            let mut members = Vec::with_capacity(items.len());
            for e in items {
                members.push(evaluate(e, ctx)?);
            }
            Ok(XdmValue::from_item(XdmItem::Array(XdmArray::from_members(members))))
        }
        Expression::ArrayConstructor(ArrayConstructorKind::Curly(body)) => {
            let value = evaluate(body, ctx)?;
            let members = value.into_items().into_iter().map(XdmValue::from_item).collect();
            Ok(XdmValue::from_item(XdmItem::Array(XdmArray::from_members(members))))
        }
        Expression::InlineFunction { params, body, .. } => {
            let captured = ctx.local_variables.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            Ok(XdmValue::from_item(XdmItem::Function(XdmFunction::inline(params.clone(), (**body).clone(), captured))))
        }
        Expression::NamedFunctionRef { name, arity } => Ok(XdmValue::from_item(XdmItem::Function(
            XdmFunction::named_ref(name.prefix.clone(), &name.local_part, *arity),
        ))),
        Expression::ArrowExpr { base, steps } => {
            let mut value = evaluate(base, ctx)?;
            for step in steps {
                let mut args = vec![value];
                for a in &step.args {
                    args.push(evaluate(a, ctx)?);
                }
                value = match &step.function {
                    ArrowTarget::Named(name) => functions::call_function(name, &args, ctx)?,
                    ArrowTarget::Dynamic(expr) => {
                        let f = evaluate(expr, ctx)?;
                        invoke_value(&f, &args, ctx)?
                    }
                };
            }
            Ok(value)
        }
        Expression::LookupExpr { base, key } => {
            let base_value = evaluate(base, ctx)?;
            evaluate_lookup(&base_value, key, ctx)
        }
        Expression::UnaryLookup(key) => match &ctx.focus {
            Some(f) => evaluate_lookup(&XdmValue::from_item(f.context_item.clone()), key, ctx),
            None => Err(XPathError::no_context_item()),
        },
        Expression::InstanceOf { expr, sequence_type } => {
            let value = evaluate(expr, ctx)?;
            Ok(XdmValue::from_bool(matches_sequence_type(&value, sequence_type)))
        }
        Expression::TreatAs { expr, sequence_type } => {
            let value = evaluate(expr, ctx)?;
            if matches_sequence_type(&value, sequence_type) {
                Ok(value)
            } else {
                Err(XPathError::new(ErrorCode::XPDY0002, "treat as: value does not match the declared type"))
            }
        }
        Expression::CastAs { expr, single_type } => {
            let value = evaluate(expr, ctx)?;
            crate::functions::casting::cast_as(&value, single_type)
        }
        Expression::CastableAs { expr, single_type } => {
            let value = evaluate(expr, ctx);
            match value {
                Ok(v) => Ok(XdmValue::from_bool(crate::functions::casting::cast_as(&v, single_type).is_ok())),
                Err(_) => Ok(XdmValue::from_bool(false)),
            }
        }
    }
}

fn evaluate_for<'d, N: DataSourceNode<'d>>(
    bindings: &[(String, Option<String>, Box<Expression>)],
    return_expr: &Expression,
    outer: &EvaluationContext<'d, N>,
    idx: usize,
    acc: EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    if idx == bindings.len() {
        return evaluate(return_expr, &acc);
    }
    let (name, pos_name, value_expr) = &bindings[idx];
    let sequence = evaluate(value_expr, &acc)?;
    let items = sequence.into_items();
    let mut out = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let mut inner = acc.with_variable(name.clone(), XdmValue::from_item(item));
        if let Some(p) = pos_name {
            inner = inner.with_variable(p.clone(), XdmValue::from_atomic(AtomicValue::Integer((i + 1) as i64)));
        }
        out.push(evaluate_for(bindings, return_expr, outer, idx + 1, inner)?);
    }
    Ok(XdmValue::concat(out))
}

fn evaluate_quantified<'d, N: DataSourceNode<'d>>(
    quantifier: Quantifier,
    bindings: &[(String, Box<Expression>)],
    satisfies: &Expression,
    outer: &EvaluationContext<'d, N>,
    idx: usize,
    acc: EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    if idx == bindings.len() {
        let result = operators::effective_boolean_value(&evaluate(satisfies, &acc)?)?;
        return Ok(XdmValue::from_bool(result));
    }
    let (name, value_expr) = &bindings[idx];
    let sequence = evaluate(value_expr, &acc)?;
    for item in sequence.into_items() {
        let inner = acc.with_variable(name.clone(), XdmValue::from_item(item));
        let result = evaluate_quantified(quantifier, bindings, satisfies, outer, idx + 1, inner)?;
        let satisfied = operators::effective_boolean_value(&result)?;
        match quantifier {
            Quantifier::Some if satisfied => return Ok(XdmValue::from_bool(true)),
            Quantifier::Every if !satisfied => return Ok(XdmValue::from_bool(false)),
            _ => {}
        }
    }
    Ok(XdmValue::from_bool(matches!(quantifier, Quantifier::Every)))
}

fn evaluate_lookup<'d, N: DataSourceNode<'d>>(
    base: &XdmValue<N>,
    key: &LookupKey,
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    let mut out = Vec::new();
    for item in base.items() {
        match item {
            XdmItem::Map(m) => match key {
                LookupKey::Wildcard => {
                    for v in m.values() {
                        out.push(v.clone());
                    }
                }
                LookupKey::NCName(n) => {
                    if let Some(v) = m.get(&AtomicValue::String(n.clone())) {
                        out.push(v.clone());
                    }
                }
                LookupKey::Integer(n) => {
                    if let Some(v) = m.get(&AtomicValue::Integer(*n)) {
                        out.push(v.clone());
                    }
                }
                LookupKey::Parenthesized(expr) => {
                    let k = single_atomic(&evaluate(expr, ctx)?)?;
                    if let Some(v) = m.get(&k) {
                        out.push(v.clone());
                    }
                }
            },
            XdmItem::Array(a) => match key {
                LookupKey::Wildcard => {
                    for v in a.members() {
                        out.push(v.clone());
                    }
                }
                LookupKey::Integer(n) => out.push(a.get(*n)?.clone()),
                LookupKey::Parenthesized(expr) => {
                    let n = single_integer(&evaluate(expr, ctx)?)?;
                    out.push(a.get(n)?.clone());
                }
                LookupKey::NCName(_) => return Err(error::function_error("?", "an array accepts only integer lookup keys")),
            },
            _ => return Err(XPathError::new(ErrorCode::XPTY0004, "'?' requires a map or array")),
        }
    }
    Ok(XdmValue::concat(out))
}

pub fn invoke_value<'d, N: DataSourceNode<'d>>(
    func: &XdmValue<N>,
    args: &[XdmValue<N>],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    let item = func.single().ok_or_else(|| XPathError::new(ErrorCode::XPTY0004, "expected a single function item"))?;
    match item {
        XdmItem::Function(f) => functions::hof::invoke_function(f, args, ctx),
        XdmItem::Map(m) => {
            let key = single_atomic(args.first().ok_or_else(|| error::cardinality("1", 0))?)?;
            Ok(m.get(&key).cloned().unwrap_or_else(XdmValue::empty))
        }
        XdmItem::Array(a) => {
            let idx = single_integer(args.first().ok_or_else(|| error::cardinality("1", 0))?)?;
            Ok(a.get(idx)?.clone())
        }
        _ => Err(XPathError::new(ErrorCode::XPTY0004, "item is not callable")),
    }
}

fn evaluate_location_path<'d, N: DataSourceNode<'d>>(
    path: &LocationPath,
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    let mut current: Vec<N> = if let Some(start) = &path.start_point {
        let value = evaluate(start, ctx)?;
        value
            .into_items()
            .into_iter()
            .map(|i| match i {
                XdmItem::Node(n) => Ok(n),
                _ => Err(XPathError::new(ErrorCode::XPTY0019, "path step requires a node sequence")),
            })
            .collect::<Result<_, _>>()?
    } else if path.is_absolute {
        let node = *ctx.context_node()?;
        let mut root = node;
        while let Some(p) = root.parent() {
            root = p;
        }
        vec![root]
    } else {
        vec![*ctx.context_node()?]
    };

    if path.is_absolute && path.steps.is_empty() {
        return Ok(XdmValue::from_nodes(current));
    }

    for step in &path.steps {
        current = evaluate_step(step, &current, ctx)?;
    }
    Ok(XdmValue::from_nodes(current))
}

fn evaluate_step<'d, N: DataSourceNode<'d>>(
    step: &Step,
    context_nodes: &[N],
    ctx: &EvaluationContext<'d, N>,
) -> Result<Vec<N>, XPathError> {
    let mut collected = Vec::new();
    for &node in context_nodes {
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        collect_axis_nodes(step.axis, node, &mut seen, &mut results);
        results.retain(|n| matches_node_test(*n, &step.node_test, step.axis));
        collected.extend(results);
    }
    if step.axis.is_reverse() {
        collected.sort_by_key(|n| std::cmp::Reverse(n.document_order_index()));
    } else {
        collected.sort_by_key(|n| n.document_order_index());
    }
    collected.dedup_by_key(|n| n.document_order_index());
    apply_node_predicates(collected, &step.predicates, step.axis, ctx)
}

fn collect_axis_nodes<'a, N: DataSourceNode<'a>>(axis: Axis, node: N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    match axis {
        Axis::Child => axes::collect_child_nodes(node, seen, results),
        Axis::Descendant => axes::collect_descendant_nodes(node, seen, results),
        Axis::DescendantOrSelf => axes::collect_descendant_or_self_nodes(node, seen, results),
        Axis::Attribute => axes::collect_attribute_nodes(node, seen, results),
        Axis::Parent => axes::collect_parent_nodes(node, seen, results),
        Axis::Ancestor => axes::collect_ancestor_nodes(node, seen, results),
        Axis::AncestorOrSelf => axes::collect_ancestor_or_self_nodes(node, seen, results),
        Axis::SelfAxis => axes::collect_self_nodes(node, seen, results),
        Axis::FollowingSibling => axes::collect_following_sibling_nodes(node, seen, results),
        Axis::PrecedingSibling => axes::collect_preceding_sibling_nodes(node, seen, results),
        Axis::Following => axes::collect_following_nodes(node, seen, results),
        Axis::Preceding => axes::collect_preceding_nodes(node, seen, results),
        Axis::Namespace => axes::collect_namespace_nodes(node, seen, results),
    }
}

fn matches_node_test<'a, N: DataSourceNode<'a>>(node: N, test: &NodeTest, axis: Axis) -> bool {
    let principal_attribute = matches!(axis, Axis::Attribute);
    match test {
        NodeTest::Wildcard => {
            if principal_attribute {
                node.node_type() == NodeType::Attribute
            } else {
                node.node_type() == NodeType::Element
            }
        }
        NodeTest::PrefixWildcard(prefix) => node.name().is_some_and(|n| n.prefix == Some(prefix.as_str())),
        NodeTest::LocalWildcard(local) => node.name().is_some_and(|n| n.local_part == local),
        NodeTest::Name { prefix, local } => node.name().is_some_and(|n| {
            n.local_part == local && n.prefix == prefix.as_deref()
        }),
        NodeTest::Kind(kind) => matches_kind_test(node, kind),
    }
}

fn matches_kind_test<'a, N: DataSourceNode<'a>>(node: N, kind: &KindTest) -> bool {
    match kind {
        KindTest::AnyKind => true,
        KindTest::Text => node.node_type() == NodeType::Text,
        KindTest::Comment => node.node_type() == NodeType::Comment,
        KindTest::NamespaceNode => node.node_type() == NodeType::Namespace,
        KindTest::ProcessingInstruction(target) => {
            node.node_type() == NodeType::ProcessingInstruction
                && target.as_ref().is_none_or(|t| node.name().is_some_and(|n| n.local_part == t))
        }
        KindTest::Document(_) => node.node_type() == NodeType::Document,
        KindTest::Element(name, _) => {
            node.node_type() == NodeType::Element
                && name.as_ref().is_none_or(|n| node.name().is_some_and(|actual| actual.local_part == n))
        }
        KindTest::Attribute(name, _) => {
            node.node_type() == NodeType::Attribute
                && name.as_ref().is_none_or(|n| node.name().is_some_and(|actual| actual.local_part == n))
        }
        KindTest::SchemaElement(name) => node.node_type() == NodeType::Element && node.name().is_some_and(|n| n.local_part == name),
        KindTest::SchemaAttribute(name) => node.node_type() == NodeType::Attribute && node.name().is_some_and(|n| n.local_part == name),
    }
}

fn apply_node_predicates<'d, N: DataSourceNode<'d>>(
    nodes: Vec<N>,
    predicates: &[Expression],
    _axis: Axis,
    ctx: &EvaluationContext<'d, N>,
) -> Result<Vec<N>, XPathError> {
    let mut current = nodes;
    for pred in predicates {
        let size = current.len();
        let mut kept = Vec::new();
        for (i, node) in current.into_iter().enumerate() {
            let inner = ctx.with_focus(XdmItem::Node(node), i + 1, size);
            let value = evaluate(pred, &inner)?;
            if predicate_matches(&value, i + 1)? {
                kept.push(node);
            }
        }
        current = kept;
    }
    Ok(current)
}

fn apply_predicates<'d, N: DataSourceNode<'d>>(
    items: Vec<XdmItem<N>>,
    predicates: &[Expression],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    let mut current = items;
    for pred in predicates {
        let size = current.len();
        let mut kept = Vec::new();
        for (i, item) in current.into_iter().enumerate() {
            let inner = ctx.with_focus(item.clone(), i + 1, size);
            let value = evaluate(pred, &inner)?;
            if predicate_matches(&value, i + 1)? {
                kept.push(item);
            }
        }
        current = kept;
    }
    Ok(XdmValue::from_items(current))
}

/// A predicate keeps an item either when its value is a single integer
/// equal to the item's 1-based position, or (otherwise) its effective
/// boolean value is true (spec.md §4.3 "Predicates").
fn predicate_matches<N>(value: &XdmValue<N>, position: usize) -> Result<bool, XPathError>
where
    N: Clone,
{
    if let Some(XdmItem::Atomic(AtomicValue::Integer(n))) = value.single() {
        return Ok(*n == position as i64);
    }
    if let Some(XdmItem::Atomic(AtomicValue::Double(d))) = value.single() {
        return Ok(*d == position as f64);
    }
    operators::effective_boolean_value(value)
}

/// `instance of`/`treat as` cardinality-and-item-type check (spec.md §3.2).
/// Item-type matching for kind tests/maps/arrays/functions is deliberately
/// coarse (by XDM category, not full schema-aware matching) since the
/// evaluator has no schema processor.
fn matches_sequence_type<'d, N>(value: &XdmValue<N>, sequence_type: &SequenceType) -> bool
where
    N: Clone + DataSourceNode<'d>,
{
    if matches!(sequence_type.item_type, ItemType::EmptySequence) {
        return value.is_empty();
    }
    let len = value.len();
    let cardinality_ok = match sequence_type.occurrence {
        OccurrenceIndicator::ExactlyOne => len == 1,
        OccurrenceIndicator::ZeroOrOne => len <= 1,
        OccurrenceIndicator::ZeroOrMore => true,
        OccurrenceIndicator::OneOrMore => len >= 1,
    };
    cardinality_ok && value.items().iter().all(|item| matches_item_type(item, &sequence_type.item_type))
}

fn matches_item_type<'d, N>(item: &XdmItem<N>, item_type: &ItemType) -> bool
where
    N: DataSourceNode<'d>,
{
    match item_type {
        ItemType::Item | ItemType::EmptySequence => true,
        ItemType::AtomicOrUnion(qname) => match item {
            XdmItem::Atomic(a) => {
                qname.local_part == "anyAtomicType" || a.type_name().ends_with(qname.local_part.as_str())
            }
            _ => false,
        },
        ItemType::KindTest(kind) => matches!(item, XdmItem::Node(n) if matches_kind_test(*n, kind)),
        ItemType::MapTest(..) => matches!(item, XdmItem::Map(_)),
        ItemType::ArrayTest(_) => matches!(item, XdmItem::Array(_)),
        ItemType::FunctionTest(..) => matches!(item, XdmItem::Function(_) | XdmItem::Map(_) | XdmItem::Array(_)),
        ItemType::ParenthesizedItemType(inner) => matches_item_type(item, inner),
    }
}

fn literal_to_atomic(lit: &Literal) -> Result<AtomicValue, XPathError> {
    Ok(match lit {
        Literal::String(s) => AtomicValue::String(s.clone()),
        Literal::Integer(i) => AtomicValue::Integer(*i),
        Literal::Double(d) => AtomicValue::Double(*d),
        Literal::Decimal(s) => AtomicValue::Decimal(
            s.parse().map_err(|_| XPathError::parse(format!("invalid decimal literal '{}'", s)))?,
        ),
    })
}

pub fn single_atomic<N: Clone>(value: &XdmValue<N>) -> Result<AtomicValue, XPathError> {
    match value.single() {
        Some(XdmItem::Atomic(a)) => Ok(a.clone()),
        Some(_) => Err(XPathError::new(ErrorCode::XPTY0004, "expected an atomic value")),
        None => Err(error::cardinality("1", value.len())),
    }
}

/// Atomizes a single item (spec.md §3.1/§4.3): atomic values pass through
/// unchanged, nodes are reduced to their typed value (`xs:untypedAtomic`
/// over [`DataSourceNode::string_value`] for untyped/schema-less nodes, as
/// `fn:data` does), and function items are rejected with `FOTY0013`.
pub fn atomize_item<'d, N: DataSourceNode<'d>>(item: &XdmItem<N>) -> Result<AtomicValue, XPathError> {
    match item {
        XdmItem::Atomic(a) => Ok(a.clone()),
        XdmItem::Node(n) => Ok(AtomicValue::UntypedAtomic(n.string_value())),
        XdmItem::Map(_) => Err(XPathError::new(ErrorCode::XPTY0004, "a map cannot be atomized")),
        XdmItem::Array(_) => Err(XPathError::new(ErrorCode::XPTY0004, "an array cannot be atomized")),
        XdmItem::Function(_) => Err(XPathError::new(ErrorCode::XPTY0004, "a function item cannot be atomized")),
    }
}

/// Atomizes a singleton value: nodes are converted to their typed value
/// before the usual single-item cardinality check runs.
pub fn atomize_single<'d, N: DataSourceNode<'d>>(value: &XdmValue<N>) -> Result<AtomicValue, XPathError> {
    match value.single() {
        Some(item) => atomize_item(item),
        None => Err(error::cardinality("1", value.len())),
    }
}

pub fn single_integer<N: Clone>(value: &XdmValue<N>) -> Result<i64, XPathError> {
    match single_atomic(value)? {
        AtomicValue::Integer(i) => Ok(i),
        AtomicValue::Double(d) => Ok(d as i64),
        AtomicValue::Decimal(d) => Ok(d.to_string().parse::<f64>().unwrap_or(0.0) as i64),
        other => Err(XPathError::new(ErrorCode::XPTY0004, format!("expected an integer, got {}", other.type_name()))),
    }
}
