//! The expression tree produced by the parser (spec.md §4.2). Grows on top
//! of the shared axis/node-test/operator vocabulary in `xpath_core::ast`;
//! everything version-specific (FLWOR, sequence types, maps/arrays,
//! higher-order function syntax, the arrow/lookup operators) lives here
//! since it differs between XPath 1.0 and 3.1.

use std::fmt;

pub use xpath_core::ast::{Axis, BinaryOperator, KindTest, NodeTest, UnaryOperator};

pub type Step = xpath_core::ast::Step<Expression>;
pub type LocationPath = xpath_core::ast::LocationPath<Expression>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    ContextItem,
    LocationPath(LocationPath),
    Variable(String),
    FunctionCall {
        name: QName,
        args: Vec<Expression>,
    },
    DynamicFunctionCall {
        function_expr: Box<Expression>,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },

    Sequence(Vec<Expression>),
    RangeExpr {
        start: Box<Expression>,
        end: Box<Expression>,
    },
    FilterExpr {
        base: Box<Expression>,
        predicates: Vec<Expression>,
    },
    SimpleMapExpr {
        base: Box<Expression>,
        mapping: Box<Expression>,
    },

    LetExpr {
        bindings: Vec<(String, Box<Expression>)>,
        return_expr: Box<Expression>,
    },
    ForExpr {
        bindings: Vec<(String, Option<String>, Box<Expression>)>,
        return_expr: Box<Expression>,
    },
    IfExpr {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
    },
    QuantifiedExpr {
        quantifier: Quantifier,
        bindings: Vec<(String, Box<Expression>)>,
        satisfies: Box<Expression>,
    },

    MapConstructor(Vec<MapEntry>),
    ArrayConstructor(ArrayConstructorKind),
    InlineFunction {
        params: Vec<Param>,
        return_type: Option<SequenceType>,
        body: Box<Expression>,
    },
    NamedFunctionRef {
        name: QName,
        arity: usize,
    },
    /// A function call with one or more `?` argument placeholders:
    /// `f(1, ?, 3)` — a partial application.
    PartialApply {
        name: QName,
        args: Vec<Option<Expression>>,
    },

    ArrowExpr {
        base: Box<Expression>,
        steps: Vec<ArrowStep>,
    },
    LookupExpr {
        base: Box<Expression>,
        key: LookupKey,
    },
    UnaryLookup(LookupKey),

    InstanceOf {
        expr: Box<Expression>,
        sequence_type: SequenceType,
    },
    TreatAs {
        expr: Box<Expression>,
        sequence_type: SequenceType,
    },
    CastAs {
        expr: Box<Expression>,
        single_type: SingleType,
    },
    CastableAs {
        expr: Box<Expression>,
        single_type: SingleType,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(String),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local_part: String,
}

impl QName {
    pub fn new(local_part: impl Into<String>) -> Self {
        Self { prefix: None, local_part: local_part.into() }
    }

    pub fn with_prefix(prefix: impl Into<String>, local_part: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()), local_part: local_part.into() }
    }

    /// Parses `prefix:local`, `*:local`, `prefix:*` or a bare `local` token
    /// as produced by the lexer.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((p, l)) => Self::with_prefix(p, l),
            None => Self::new(text),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local_part),
            None => write!(f, "{}", self.local_part),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Some,
    Every,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Box<Expression>,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayConstructorKind {
    Square(Vec<Expression>),
    Curly(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_decl: Option<SequenceType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowStep {
    pub function: ArrowTarget,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowTarget {
    Named(QName),
    Dynamic(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupKey {
    Wildcard,
    NCName(String),
    Integer(i64),
    Parenthesized(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceType {
    pub item_type: ItemType,
    pub occurrence: OccurrenceIndicator,
}

impl SequenceType {
    pub fn single(item_type: ItemType) -> Self {
        Self { item_type, occurrence: OccurrenceIndicator::ExactlyOne }
    }
    pub fn zero_or_one(item_type: ItemType) -> Self {
        Self { item_type, occurrence: OccurrenceIndicator::ZeroOrOne }
    }
    pub fn zero_or_more(item_type: ItemType) -> Self {
        Self { item_type, occurrence: OccurrenceIndicator::ZeroOrMore }
    }
    pub fn one_or_more(item_type: ItemType) -> Self {
        Self { item_type, occurrence: OccurrenceIndicator::OneOrMore }
    }
    pub fn empty_sequence() -> Self {
        Self { item_type: ItemType::EmptySequence, occurrence: OccurrenceIndicator::ExactlyOne }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemType {
    Item,
    EmptySequence,
    AtomicOrUnion(QName),
    KindTest(KindTest),
    FunctionTest(Option<Vec<SequenceType>>, Option<Box<SequenceType>>),
    MapTest(Option<QName>, Option<Box<SequenceType>>),
    ArrayTest(Option<Box<SequenceType>>),
    ParenthesizedItemType(Box<ItemType>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceIndicator {
    ExactlyOne,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleType {
    pub type_name: QName,
    pub optional: bool,
}

impl Expression {
    pub fn binary_op(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp { left: Box::new(left), op, right: Box::new(right) }
    }

    pub fn lookup(base: Expression, key: LookupKey) -> Self {
        Expression::LookupExpr { base: Box::new(base), key }
    }
}
