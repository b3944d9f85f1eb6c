//! The XDM item and sequence types (spec.md §3.1): every value that flows
//! through the evaluator is a flat `XdmValue` of `XdmItem`s — there is no
//! nested-sequence value, per XDM's "sequences do not nest" rule.

use super::array::XdmArray;
use super::atomic::AtomicValue;
use super::function::XdmFunction;
use super::map::XdmMap;
use std::hash::{Hash, Hasher};
use xpath_core::DataSourceNode;

#[derive(Debug, Clone)]
pub enum XdmItem<N> {
    Node(N),
    Atomic(AtomicValue),
    Map(XdmMap<N>),
    Array(XdmArray<N>),
    Function(XdmFunction<N>),
}

impl<N: Clone> XdmItem<N> {
    pub fn is_node(&self) -> bool {
        matches!(self, XdmItem::Node(_))
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, XdmItem::Atomic(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, XdmItem::Map(_) | XdmItem::Array(_) | XdmItem::Function(_))
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            XdmItem::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_atomic(&self) -> Option<&AtomicValue> {
        match self {
            XdmItem::Atomic(a) => Some(a),
            _ => None,
        }
    }

    pub fn type_name<'n>(&self) -> &'static str
    where
        N: DataSourceNode<'n>,
    {
        match self {
            XdmItem::Node(_) => "node()",
            XdmItem::Atomic(a) => a.type_name(),
            XdmItem::Map(_) => "map(*)",
            XdmItem::Array(_) => "array(*)",
            XdmItem::Function(_) => "function(*)",
        }
    }
}

impl<'a, N: DataSourceNode<'a>> XdmItem<N> {
    /// `fn:string()` applied to a single item (spec.md §3.4): the node's
    /// string value, or the atomic value's lexical form.
    pub fn string_value(&self) -> String {
        match self {
            XdmItem::Node(n) => n.string_value(),
            XdmItem::Atomic(a) => a.to_string_value(),
            XdmItem::Map(_) | XdmItem::Array(_) | XdmItem::Function(_) => String::new(),
        }
    }
}

impl<N: PartialEq> PartialEq for XdmItem<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (XdmItem::Node(a), XdmItem::Node(b)) => a == b,
            (XdmItem::Atomic(a), XdmItem::Atomic(b)) => a == b,
            (XdmItem::Map(a), XdmItem::Map(b)) => a == b,
            (XdmItem::Array(a), XdmItem::Array(b)) => a == b,
            (XdmItem::Function(a), XdmItem::Function(b)) => a == b,
            _ => false,
        }
    }
}
impl<N: Eq> Eq for XdmItem<N> {}

impl<N: Hash> Hash for XdmItem<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            XdmItem::Node(n) => n.hash(state),
            XdmItem::Atomic(a) => format!("{:?}", a).hash(state),
            XdmItem::Map(m) => m.hash(state),
            XdmItem::Array(a) => a.hash(state),
            XdmItem::Function(f) => f.hash(state),
        }
    }
}

/// A flat sequence of zero or more items. XDM forbids nested sequences:
/// constructors that would otherwise nest (`(1, (2, 3))`) flatten eagerly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XdmValue<N> {
    items: Vec<XdmItem<N>>,
}

impl<N: Clone> XdmValue<N> {
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_item(item: XdmItem<N>) -> Self {
        Self { items: vec![item] }
    }

    pub fn from_items(items: Vec<XdmItem<N>>) -> Self {
        Self { items }
    }

    pub fn from_atomic(value: AtomicValue) -> Self {
        Self::from_item(XdmItem::Atomic(value))
    }

    pub fn from_node(node: N) -> Self {
        Self::from_item(XdmItem::Node(node))
    }

    pub fn from_nodes(nodes: Vec<N>) -> Self {
        Self { items: nodes.into_iter().map(XdmItem::Node).collect() }
    }

    pub fn from_bool(b: bool) -> Self {
        Self::from_atomic(AtomicValue::Boolean(b))
    }

    pub fn items(&self) -> &[XdmItem<N>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<XdmItem<N>> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn single(&self) -> Option<&XdmItem<N>> {
        if self.items.len() == 1 {
            self.items.first()
        } else {
            None
        }
    }

    pub fn concat(sequences: Vec<XdmValue<N>>) -> Self {
        let mut items = Vec::new();
        for seq in sequences {
            items.extend(seq.items);
        }
        Self { items }
    }

    pub fn push(&mut self, item: XdmItem<N>) {
        self.items.push(item);
    }
}
