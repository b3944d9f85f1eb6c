//! AST fragments shared by every grammar layer: axes, node tests and the
//! operator vocabulary. The full `Expression` tree lives one layer up, in
//! the `xpath` crate, since its shape grows with each XPath version; these
//! pieces do not change once XPath 1.0 introduces them.

/// The axis of movement from the context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
    Namespace,
}

impl Axis {
    /// True for the axes whose document-order orientation is reversed
    /// (`parent`, `ancestor`, `ancestor-or-self`, `preceding`,
    /// `preceding-sibling`) — §4.3 "Axes".
    pub fn is_reverse(&self) -> bool {
        matches!(
            self,
            Axis::Parent
                | Axis::Ancestor
                | Axis::AncestorOrSelf
                | Axis::Preceding
                | Axis::PrecedingSibling
        )
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Axis::Child => "child",
            Axis::Descendant => "descendant",
            Axis::DescendantOrSelf => "descendant-or-self",
            Axis::Attribute => "attribute",
            Axis::Parent => "parent",
            Axis::Ancestor => "ancestor",
            Axis::AncestorOrSelf => "ancestor-or-self",
            Axis::SelfAxis => "self",
            Axis::FollowingSibling => "following-sibling",
            Axis::PrecedingSibling => "preceding-sibling",
            Axis::Following => "following",
            Axis::Preceding => "preceding",
            Axis::Namespace => "namespace",
        }
    }
}

/// A test applied to nodes encountered along an axis.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// `prefix:local`, `local` or `Q{uri}local` — a qualified-name test.
    Name {
        prefix: Option<String>,
        local: String,
    },
    /// `*` — any node of the principal node kind for the axis.
    Wildcard,
    /// `prefix:*` — any local name in the given namespace.
    PrefixWildcard(String),
    /// `*:local` — the given local name in any namespace.
    LocalWildcard(String),
    /// `node()`, `text()`, `comment()`, `processing-instruction(target?)`,
    /// `element(name?, type?)`, `attribute(name?, type?)`,
    /// `document-node(..)`, `schema-element(name)`, `schema-attribute(name)`,
    /// `namespace-node()`.
    Kind(KindTest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum KindTest {
    AnyKind,
    Text,
    Comment,
    NamespaceNode,
    ProcessingInstruction(Option<String>),
    Document(Option<Box<KindTest>>),
    Element(Option<String>, Option<String>),
    Attribute(Option<String>, Option<String>),
    SchemaElement(String),
    SchemaAttribute(String),
}

/// A single step in a location path, e.g. `child::foo[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<Expr> {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expr>,
}

/// A full location path: `/a/b`, `a//b`, `$v/a`, `..`, `.`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath<Expr> {
    /// The expression the path is relative to (e.g. `$v` in `$v/a`).
    /// `None` means "the context item or the document root", disambiguated
    /// by `is_absolute`.
    pub start_point: Option<Box<Expr>>,
    /// True for paths beginning with `/` or `//`.
    pub is_absolute: bool,
    pub steps: Vec<Step<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

/// The operator vocabulary for binary expressions across every XPath
/// version: arithmetic, the three comparison families (value/general/node),
/// logical, and sequence-combining operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,

    // General comparisons (implicitly iterate both operands).
    GeneralEq,
    GeneralNe,
    GeneralLt,
    GeneralLe,
    GeneralGt,
    GeneralGe,

    // Value comparisons (`eq`/`ne`/`lt`/`le`/`gt`/`ge`), singleton cardinality.
    ValueEq,
    ValueNe,
    ValueLt,
    ValueLe,
    ValueGt,
    ValueGe,

    // Node comparisons.
    NodeIs,
    NodePrecedes,
    NodeFollows,

    Plus,
    Minus,
    Multiply,
    Divide,
    IntegerDivide,
    Modulo,

    Union,
    Intersect,
    Except,
}

impl BinaryOperator {
    pub fn is_value_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::ValueEq
                | BinaryOperator::ValueNe
                | BinaryOperator::ValueLt
                | BinaryOperator::ValueLe
                | BinaryOperator::ValueGt
                | BinaryOperator::ValueGe
        )
    }

    pub fn is_general_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::GeneralEq
                | BinaryOperator::GeneralNe
                | BinaryOperator::GeneralLt
                | BinaryOperator::GeneralLe
                | BinaryOperator::GeneralGt
                | BinaryOperator::GeneralGe
        )
    }

    pub fn is_node_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::NodeIs | BinaryOperator::NodePrecedes | BinaryOperator::NodeFollows
        )
    }
}
