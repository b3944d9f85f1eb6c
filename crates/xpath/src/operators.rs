//! Operator evaluation (spec.md §3.3, §4.4): logical short-circuiting, the
//! three comparison families, arithmetic with XSD numeric promotion, and the
//! node-sequence set operators. Mirrors the dispatch shape of the teacher's
//! `xpath31::operators::evaluate_binary`, generalized from 1.0's
//! string/number/boolean-only world to the full atomic-type lattice.

use crate::ast::{BinaryOperator, Expression, UnaryOperator};
use crate::engine::{self, EvaluationContext};
use crate::error::{self, XPathError};
use crate::types::{AtomicValue, XdmItem, XdmValue};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashSet;
use xpath_core::error::ErrorCode;
use xpath_core::DataSourceNode;

pub fn evaluate_binary<'d, N: DataSourceNode<'d>>(
    op: BinaryOperator,
    left: &Expression,
    right: &Expression,
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    match op {
        BinaryOperator::Or => {
            let lhs = effective_boolean_value(&engine::evaluate(left, ctx)?)?;
            if lhs {
                return Ok(XdmValue::from_bool(true));
            }
            let rhs = effective_boolean_value(&engine::evaluate(right, ctx)?)?;
            Ok(XdmValue::from_bool(rhs))
        }
        BinaryOperator::And => {
            let lhs = effective_boolean_value(&engine::evaluate(left, ctx)?)?;
            if !lhs {
                return Ok(XdmValue::from_bool(false));
            }
            let rhs = effective_boolean_value(&engine::evaluate(right, ctx)?)?;
            Ok(XdmValue::from_bool(rhs))
        }
        _ if op.is_general_comparison() => {
            let lhs = engine::evaluate(left, ctx)?;
            let rhs = engine::evaluate(right, ctx)?;
            evaluate_general_comparison(op, &lhs, &rhs)
        }
        _ if op.is_value_comparison() => {
            let lhs = engine::evaluate(left, ctx)?;
            let rhs = engine::evaluate(right, ctx)?;
            if lhs.is_empty() || rhs.is_empty() {
                return Ok(XdmValue::empty());
            }
            let a = engine::atomize_single(&lhs)?;
            let b = engine::atomize_single(&rhs)?;
            Ok(XdmValue::from_bool(compare_atomics(op, &a, &b)?))
        }
        _ if op.is_node_comparison() => {
            let lhs = engine::evaluate(left, ctx)?;
            let rhs = engine::evaluate(right, ctx)?;
            if lhs.is_empty() || rhs.is_empty() {
                return Ok(XdmValue::empty());
            }
            evaluate_node_comparison(op, &lhs, &rhs)
        }
        BinaryOperator::Union | BinaryOperator::Intersect | BinaryOperator::Except => {
            let lhs = engine::evaluate(left, ctx)?;
            let rhs = engine::evaluate(right, ctx)?;
            evaluate_set_operation(op, lhs, rhs)
        }
        BinaryOperator::Plus
        | BinaryOperator::Minus
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::IntegerDivide
        | BinaryOperator::Modulo => {
            let lhs = engine::evaluate(left, ctx)?;
            let rhs = engine::evaluate(right, ctx)?;
            if lhs.is_empty() || rhs.is_empty() {
                return Ok(XdmValue::empty());
            }
            let a = engine::atomize_single(&lhs)?;
            let b = engine::atomize_single(&rhs)?;
            Ok(XdmValue::from_atomic(evaluate_arithmetic(op, &a, &b)?))
        }
    }
}

pub fn evaluate_unary<'d, N: DataSourceNode<'d>>(op: UnaryOperator, value: &XdmValue<N>) -> Result<XdmValue<N>, XPathError> {
    if value.is_empty() {
        return Ok(XdmValue::empty());
    }
    let a = engine::atomize_single(value)?;
    let negated = match op {
        UnaryOperator::Plus => a,
        UnaryOperator::Minus => negate(&a)?,
    };
    Ok(XdmValue::from_atomic(negated))
}

fn negate(value: &AtomicValue) -> Result<AtomicValue, XPathError> {
    Ok(match value {
        AtomicValue::Integer(i) => AtomicValue::Integer(-i),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(-*d),
        AtomicValue::Float(f) => AtomicValue::Float(-*f),
        AtomicValue::Double(d) => AtomicValue::Double(-*d),
        AtomicValue::YearMonthDuration(m) => AtomicValue::YearMonthDuration(-m),
        AtomicValue::DayTimeDuration(s) => AtomicValue::DayTimeDuration(-*s),
        other => return Err(XPathError::new(ErrorCode::XPTY0004, format!("unary '-' is not defined for {}", other.type_name()))),
    })
}

/// `fn:boolean()` / the effective boolean value rule (spec.md §3.3): a
/// boolean is itself, a non-empty string is true, a non-zero/non-NaN number
/// is true, a non-empty node sequence is true, anything else is a type
/// error (`FORG0006`).
pub fn effective_boolean_value<N: Clone>(value: &XdmValue<N>) -> Result<bool, XPathError> {
    if value.is_empty() {
        return Ok(false);
    }
    if let Some(XdmItem::Node(_)) = value.items().first() {
        return Ok(true);
    }
    match value.single() {
        Some(XdmItem::Atomic(a)) => a
            .to_boolean()
            .or_else(|| a.to_double().map(|d| d != 0.0 && !d.is_nan()))
            .ok_or_else(|| error::ebv_error(format!("cannot derive an effective boolean value from {}", a.type_name()))),
        Some(_) => Err(error::ebv_error("a map, array or function has no effective boolean value")),
        None => Err(error::ebv_error("effective boolean value of a sequence of more than one item requires a leading node")),
    }
}

fn evaluate_general_comparison<'d, N: DataSourceNode<'d>>(op: BinaryOperator, lhs: &XdmValue<N>, rhs: &XdmValue<N>) -> Result<XdmValue<N>, XPathError> {
    for l in lhs.items() {
        for r in rhs.items() {
            let a = engine::atomize_item(l)?;
            let b = engine::atomize_item(r)?;
            if compare_atomics(general_to_value(op), &a, &b)? {
                return Ok(XdmValue::from_bool(true));
            }
        }
    }
    Ok(XdmValue::from_bool(false))
}

fn general_to_value(op: BinaryOperator) -> BinaryOperator {
    match op {
        BinaryOperator::GeneralEq => BinaryOperator::ValueEq,
        BinaryOperator::GeneralNe => BinaryOperator::ValueNe,
        BinaryOperator::GeneralLt => BinaryOperator::ValueLt,
        BinaryOperator::GeneralLe => BinaryOperator::ValueLe,
        BinaryOperator::GeneralGt => BinaryOperator::ValueGt,
        BinaryOperator::GeneralGe => BinaryOperator::ValueGe,
        other => other,
    }
}

fn compare_atomics(op: BinaryOperator, a: &AtomicValue, b: &AtomicValue) -> Result<bool, XPathError> {
    if op == BinaryOperator::ValueEq || op == BinaryOperator::ValueNe {
        let eq = atomic_eq(a, b)?;
        return Ok(if op == BinaryOperator::ValueEq { eq } else { !eq });
    }
    let ordering = atomic_cmp(a, b)?;
    Ok(match op {
        BinaryOperator::ValueLt => ordering == Ordering::Less,
        BinaryOperator::ValueLe => ordering != Ordering::Greater,
        BinaryOperator::ValueGt => ordering == Ordering::Greater,
        BinaryOperator::ValueGe => ordering != Ordering::Less,
        _ => unreachable!("non-comparison operator reached compare_atomics"),
    })
}

/// Symmetric untyped-atomic promotion for comparisons (spec.md §4.4, §8
/// "untyped promotion symmetry"): an `xs:untypedAtomic` operand compared
/// against a numeric operand is promoted to `xs:double`; compared against any
/// other typed atomic, it is cast to that operand's type. Two untyped
/// atomics, or an untyped atomic against a string, are left alone and
/// compared lexically by the existing string arms.
fn promote_untyped_for_comparison(a: &AtomicValue, b: &AtomicValue) -> Result<(AtomicValue, AtomicValue), XPathError> {
    use AtomicValue::*;
    let cast_to_other = |untyped: &AtomicValue, other: &AtomicValue| -> Result<AtomicValue, XPathError> {
        if other.is_numeric() {
            return untyped
                .to_double()
                .map(Double)
                .ok_or_else(|| XPathError::new(ErrorCode::FORG0001, format!("cannot promote '{}' to xs:double", untyped.to_string_value())));
        }
        crate::functions::casting::cast_atomic(untyped, other.type_name().trim_start_matches("xs:"))
    };
    Ok(match (a, b) {
        (UntypedAtomic(_), UntypedAtomic(_)) | (UntypedAtomic(_), String(_)) | (String(_), UntypedAtomic(_)) => (a.clone(), b.clone()),
        (UntypedAtomic(_), _) => (cast_to_other(a, b)?, b.clone()),
        (_, UntypedAtomic(_)) => (a.clone(), cast_to_other(b, a)?),
        _ => (a.clone(), b.clone()),
    })
}

fn atomic_eq(a: &AtomicValue, b: &AtomicValue) -> Result<bool, XPathError> {
    use AtomicValue::*;
    let (a, b) = promote_untyped_for_comparison(a, b)?;
    let (a, b) = (&a, &b);
    Ok(match (a, b) {
        (Boolean(x), Boolean(y)) => x == y,
        (String(x) | UntypedAtomic(x) | AnyUri(x), String(y) | UntypedAtomic(y) | AnyUri(y)) => x == y,
        (QName(x), QName(y)) | (Notation(x), Notation(y)) => x.local == y.local && x.namespace == y.namespace,
        (Base64Binary(x), Base64Binary(y)) | (HexBinary(x), HexBinary(y)) => x == y,
        _ if a.is_numeric() && b.is_numeric() => atomic_cmp(a, b)? == Ordering::Equal,
        _ if a.is_duration() && b.is_duration() => duration_cmp(a, b)? == Ordering::Equal,
        _ => return Err(XPathError::new(ErrorCode::XPTY0004, format!("cannot compare {} to {}", a.type_name(), b.type_name()))),
    })
}

fn atomic_cmp(a: &AtomicValue, b: &AtomicValue) -> Result<Ordering, XPathError> {
    use AtomicValue::*;
    let (a, b) = promote_untyped_for_comparison(a, b)?;
    let (a, b) = (&a, &b);
    match (a, b) {
        (String(x) | UntypedAtomic(x), String(y) | UntypedAtomic(y)) => Ok(x.cmp(y)),
        _ if a.is_numeric() && b.is_numeric() => numeric_cmp(a, b),
        _ if a.is_duration() && b.is_duration() => duration_cmp(a, b),
        (Date(x), Date(y)) => Ok(x.value.cmp(&y.value)),
        (Time(x), Time(y)) => Ok(x.value.cmp(&y.value)),
        (DateTime(x), DateTime(y)) => Ok(x.value.cmp(&y.value)),
        _ => Err(XPathError::new(ErrorCode::XPTY0004, format!("{} is not ordered relative to {}", a.type_name(), b.type_name()))),
    }
}

fn numeric_cmp(a: &AtomicValue, b: &AtomicValue) -> Result<Ordering, XPathError> {
    let (x, y) = (a.to_double(), b.to_double());
    match (x, y) {
        (Some(x), Some(y)) => x.partial_cmp(&y).ok_or_else(|| XPathError::new(ErrorCode::FOCA0002, "NaN is not ordered")),
        _ => Err(XPathError::new(ErrorCode::XPTY0004, "operand is not numeric")),
    }
}

fn duration_seconds(v: &AtomicValue) -> Option<Decimal> {
    match v {
        AtomicValue::DayTimeDuration(s) => Some(*s),
        AtomicValue::YearMonthDuration(m) => Some(Decimal::from(*m) * Decimal::from(30 * 86400)),
        AtomicValue::Duration { months, seconds } => Some(Decimal::from(*months) * Decimal::from(30 * 86400) + *seconds),
        _ => None,
    }
}

fn duration_cmp(a: &AtomicValue, b: &AtomicValue) -> Result<Ordering, XPathError> {
    match (duration_seconds(a), duration_seconds(b)) {
        (Some(x), Some(y)) => Ok(x.cmp(&y)),
        _ => Err(XPathError::new(ErrorCode::XPTY0004, "duration operands are not comparable")),
    }
}

fn single_node<'d, N: DataSourceNode<'d>>(value: &XdmValue<N>) -> Result<N, XPathError> {
    match value.single() {
        Some(XdmItem::Node(n)) => Ok(*n),
        Some(_) => Err(XPathError::new(ErrorCode::XPTY0004, "node comparison requires node operands")),
        None => Err(error::cardinality("1", value.len())),
    }
}

fn evaluate_node_comparison<'d, N: DataSourceNode<'d>>(
    op: BinaryOperator,
    lhs: &XdmValue<N>,
    rhs: &XdmValue<N>,
) -> Result<XdmValue<N>, XPathError> {
    let a = single_node(lhs)?;
    let b = single_node(rhs)?;
    let result = match op {
        BinaryOperator::NodeIs => a == b,
        BinaryOperator::NodePrecedes => a.document_order_index() < b.document_order_index(),
        BinaryOperator::NodeFollows => a.document_order_index() > b.document_order_index(),
        _ => unreachable!("non-node-comparison operator reached evaluate_node_comparison"),
    };
    Ok(XdmValue::from_bool(result))
}

/// `|`/`union`, `intersect`, `except` (spec.md §4.4): set operations over
/// node sequences, returned in document order with duplicates removed.
fn evaluate_set_operation<'d, N: DataSourceNode<'d>>(
    op: BinaryOperator,
    lhs: XdmValue<N>,
    rhs: XdmValue<N>,
) -> Result<XdmValue<N>, XPathError> {
    let as_nodes = |value: XdmValue<N>| -> Result<Vec<N>, XPathError> {
        value
            .into_items()
            .into_iter()
            .map(|item| match item {
                XdmItem::Node(n) => Ok(n),
                other => Err(XPathError::new(ErrorCode::XPTY0004, format!("'{}' is not a node and cannot be combined in a set operation", other.type_name()))),
            })
            .collect()
    };
    let left_nodes = as_nodes(lhs)?;
    let right_nodes = as_nodes(rhs)?;
    let right_set: HashSet<N> = right_nodes.iter().copied().collect();

    let mut combined: Vec<N> = match op {
        BinaryOperator::Union => {
            let mut all = left_nodes;
            all.extend(right_nodes);
            all
        }
        BinaryOperator::Intersect => left_nodes.into_iter().filter(|n| right_set.contains(n)).collect(),
        BinaryOperator::Except => left_nodes.into_iter().filter(|n| !right_set.contains(n)).collect(),
        _ => unreachable!("non-set operator reached evaluate_set_operation"),
    };
    combined.sort_by_key(|n| n.document_order_index());
    combined.dedup_by_key(|n| n.document_order_index());
    Ok(XdmValue::from_nodes(combined))
}

#[derive(Clone, Copy)]
enum NumericPair {
    Integer(i64, i64),
    Decimal(Decimal, Decimal),
    Float(f32, f32),
    Double(f64, f64),
}

/// `xs:untypedAtomic` operands (from atomized nodes) are promoted to
/// `xs:double` before numeric operations apply (spec.md §4.4).
fn promote_untyped_numeric(v: &AtomicValue) -> Result<AtomicValue, XPathError> {
    match v {
        AtomicValue::UntypedAtomic(_) => v
            .to_double()
            .map(AtomicValue::Double)
            .ok_or_else(|| XPathError::new(ErrorCode::FORG0001, format!("cannot promote '{}' to xs:double", v.to_string_value()))),
        other => Ok(other.clone()),
    }
}

fn promote(a: &AtomicValue, b: &AtomicValue) -> Result<NumericPair, XPathError> {
    use AtomicValue::*;
    let a = promote_untyped_numeric(a)?;
    let b = promote_untyped_numeric(b)?;
    let rank = |v: &AtomicValue| match v {
        Integer(_) => 0,
        Decimal(_) => 1,
        Float(_) => 2,
        Double(_) => 3,
        _ => -1,
    };
    let (ra, rb) = (rank(&a), rank(&b));
    if ra < 0 || rb < 0 {
        return Err(XPathError::new(ErrorCode::XPTY0004, format!("'{}' and '{}' are not both numeric", a.type_name(), b.type_name())));
    }
    let widest = ra.max(rb);
    Ok(match widest {
        0 => NumericPair::Integer(as_i64(&a), as_i64(&b)),
        1 => NumericPair::Decimal(as_decimal(&a), as_decimal(&b)),
        2 => NumericPair::Float(as_f32(&a), as_f32(&b)),
        _ => NumericPair::Double(as_f64(&a), as_f64(&b)),
    })
}

fn as_i64(v: &AtomicValue) -> i64 {
    match v {
        AtomicValue::Integer(i) => *i,
        _ => 0,
    }
}
fn as_decimal(v: &AtomicValue) -> Decimal {
    match v {
        AtomicValue::Integer(i) => Decimal::from(*i),
        AtomicValue::Decimal(d) => *d,
        _ => Decimal::ZERO,
    }
}
fn as_f32(v: &AtomicValue) -> f32 {
    match v {
        AtomicValue::Integer(i) => *i as f32,
        AtomicValue::Decimal(d) => d.to_string().parse().unwrap_or(0.0),
        AtomicValue::Float(f) => *f,
        _ => 0.0,
    }
}
fn as_f64(v: &AtomicValue) -> f64 {
    v.to_double().unwrap_or(0.0)
}

fn evaluate_arithmetic(op: BinaryOperator, a: &AtomicValue, b: &AtomicValue) -> Result<AtomicValue, XPathError> {
    if let Some(result) = evaluate_date_time_duration_arithmetic(op, a, b)? {
        return Ok(result);
    }
    if a.is_duration() || b.is_duration() {
        return evaluate_duration_arithmetic(op, a, b);
    }
    let pair = promote(a, b)?;
    Ok(match (op, pair) {
        (BinaryOperator::Plus, NumericPair::Integer(x, y)) => AtomicValue::Integer(checked(x.checked_add(y))?),
        (BinaryOperator::Minus, NumericPair::Integer(x, y)) => AtomicValue::Integer(checked(x.checked_sub(y))?),
        (BinaryOperator::Multiply, NumericPair::Integer(x, y)) => AtomicValue::Integer(checked(x.checked_mul(y))?),
        (BinaryOperator::IntegerDivide, NumericPair::Integer(x, y)) => {
            if y == 0 {
                return Err(error::div_by_zero());
            }
            AtomicValue::Integer(x / y)
        }
        (BinaryOperator::Modulo, NumericPair::Integer(x, y)) => {
            if y == 0 {
                return Err(error::div_by_zero());
            }
            AtomicValue::Integer(x % y)
        }
        (BinaryOperator::Divide, NumericPair::Integer(x, y)) => {
            if y == 0 {
                return Err(error::div_by_zero());
            }
            AtomicValue::Decimal(Decimal::from(x) / Decimal::from(y))
        }

        (BinaryOperator::Plus, NumericPair::Decimal(x, y)) => AtomicValue::Decimal(x + y),
        (BinaryOperator::Minus, NumericPair::Decimal(x, y)) => AtomicValue::Decimal(x - y),
        (BinaryOperator::Multiply, NumericPair::Decimal(x, y)) => AtomicValue::Decimal(x * y),
        (BinaryOperator::Divide, NumericPair::Decimal(x, y)) => {
            if y.is_zero() {
                return Err(error::div_by_zero());
            }
            AtomicValue::Decimal(x / y)
        }
        (BinaryOperator::IntegerDivide, NumericPair::Decimal(x, y)) => {
            if y.is_zero() {
                return Err(error::div_by_zero());
            }
            AtomicValue::Integer((x / y).trunc().to_string().parse::<f64>().unwrap_or(0.0) as i64)
        }
        (BinaryOperator::Modulo, NumericPair::Decimal(x, y)) => {
            if y.is_zero() {
                return Err(error::div_by_zero());
            }
            AtomicValue::Decimal(x % y)
        }

        (BinaryOperator::Plus, NumericPair::Float(x, y)) => AtomicValue::Float(x + y),
        (BinaryOperator::Minus, NumericPair::Float(x, y)) => AtomicValue::Float(x - y),
        (BinaryOperator::Multiply, NumericPair::Float(x, y)) => AtomicValue::Float(x * y),
        (BinaryOperator::Divide, NumericPair::Float(x, y)) => AtomicValue::Float(x / y),
        (BinaryOperator::IntegerDivide, NumericPair::Float(x, y)) => {
            if y == 0.0 {
                return Err(error::div_by_zero());
            }
            AtomicValue::Integer((x / y).trunc() as i64)
        }
        (BinaryOperator::Modulo, NumericPair::Float(x, y)) => AtomicValue::Float(x % y),

        (BinaryOperator::Plus, NumericPair::Double(x, y)) => AtomicValue::Double(x + y),
        (BinaryOperator::Minus, NumericPair::Double(x, y)) => AtomicValue::Double(x - y),
        (BinaryOperator::Multiply, NumericPair::Double(x, y)) => AtomicValue::Double(x * y),
        (BinaryOperator::Divide, NumericPair::Double(x, y)) => AtomicValue::Double(x / y),
        (BinaryOperator::IntegerDivide, NumericPair::Double(x, y)) => {
            if y == 0.0 || y.is_nan() {
                return Err(error::div_by_zero());
            }
            AtomicValue::Integer((x / y).trunc() as i64)
        }
        (BinaryOperator::Modulo, NumericPair::Double(x, y)) => AtomicValue::Double(x % y),
        _ => unreachable!("comparison/logical operators do not reach evaluate_arithmetic"),
    })
}

/// `xs:date`/`xs:dateTime`/`xs:time` combined with a duration or with each
/// other (spec.md §3.2, §4.2): delegates the calendar-aware rollover math to
/// [`crate::functions::datetime`], which already needs the same
/// month/day-length logic for its component accessors. Returns `None` for
/// any combination that isn't a date/time/duration one, letting the caller
/// fall through to plain numeric or same-kind duration arithmetic.
fn evaluate_date_time_duration_arithmetic(op: BinaryOperator, a: &AtomicValue, b: &AtomicValue) -> Result<Option<AtomicValue>, XPathError> {
    use crate::functions::datetime::{add_duration_to_date, add_duration_to_date_time};
    use crate::types::atomic::Timezoned;

    match (op, a, b) {
        (BinaryOperator::Plus, AtomicValue::DateTime(t), duration) | (BinaryOperator::Plus, duration, AtomicValue::DateTime(t)) if duration.is_duration() => {
            Ok(Some(AtomicValue::DateTime(Timezoned { value: add_duration_to_date_time(t.value, duration, false)?, tz: t.tz })))
        }
        (BinaryOperator::Minus, AtomicValue::DateTime(t), duration) if duration.is_duration() => {
            Ok(Some(AtomicValue::DateTime(Timezoned { value: add_duration_to_date_time(t.value, duration, true)?, tz: t.tz })))
        }
        (BinaryOperator::Minus, AtomicValue::DateTime(x), AtomicValue::DateTime(y)) => {
            Ok(Some(AtomicValue::DayTimeDuration(Decimal::from((x.value - y.value).num_seconds()))))
        }

        (BinaryOperator::Plus, AtomicValue::Date(d), duration) | (BinaryOperator::Plus, duration, AtomicValue::Date(d)) if duration.is_duration() => {
            Ok(Some(AtomicValue::Date(Timezoned { value: add_duration_to_date(d.value, duration, false)?, tz: d.tz })))
        }
        (BinaryOperator::Minus, AtomicValue::Date(d), duration) if duration.is_duration() => {
            Ok(Some(AtomicValue::Date(Timezoned { value: add_duration_to_date(d.value, duration, true)?, tz: d.tz })))
        }
        (BinaryOperator::Minus, AtomicValue::Date(x), AtomicValue::Date(y)) => {
            Ok(Some(AtomicValue::DayTimeDuration(Decimal::from((x.value - y.value).num_seconds()))))
        }

        (BinaryOperator::Plus, AtomicValue::Time(t), duration) | (BinaryOperator::Plus, duration, AtomicValue::Time(t)) if duration.is_duration() => {
            Ok(Some(AtomicValue::Time(Timezoned { value: shift_time(t.value, duration, false)?, tz: t.tz })))
        }
        (BinaryOperator::Minus, AtomicValue::Time(t), duration) if duration.is_duration() => {
            Ok(Some(AtomicValue::Time(Timezoned { value: shift_time(t.value, duration, true)?, tz: t.tz })))
        }
        (BinaryOperator::Minus, AtomicValue::Time(x), AtomicValue::Time(y)) => {
            Ok(Some(AtomicValue::DayTimeDuration(Decimal::from((x.value - y.value).num_seconds()))))
        }
        _ => Ok(None),
    }
}

fn shift_time(time: chrono::NaiveTime, duration: &AtomicValue, negate: bool) -> Result<chrono::NaiveTime, XPathError> {
    let anchor = chrono::NaiveDate::from_ymd_opt(1972, 12, 31).expect("fixed XSD time anchor date").and_time(time);
    Ok(crate::functions::datetime::add_duration_to_date_time(anchor, duration, negate)?.time())
}

fn checked(result: Option<i64>) -> Result<i64, XPathError> {
    result.ok_or_else(|| XPathError::new(ErrorCode::FOAR0002, "integer arithmetic overflow"))
}

/// Duration/date-time arithmetic (spec.md §3.2): addition and subtraction of
/// two durations of the same kind, and scaling/dividing a duration by a plain
/// number. Date/time-plus-duration combinations are handled earlier in
/// [`evaluate_arithmetic`] by [`evaluate_date_time_duration_arithmetic`].
fn evaluate_duration_arithmetic(op: BinaryOperator, a: &AtomicValue, b: &AtomicValue) -> Result<AtomicValue, XPathError> {
    match (op, a, b) {
        (BinaryOperator::Plus, AtomicValue::YearMonthDuration(x), AtomicValue::YearMonthDuration(y)) => {
            Ok(AtomicValue::YearMonthDuration(x + y))
        }
        (BinaryOperator::Minus, AtomicValue::YearMonthDuration(x), AtomicValue::YearMonthDuration(y)) => {
            Ok(AtomicValue::YearMonthDuration(x - y))
        }
        (BinaryOperator::Plus, AtomicValue::DayTimeDuration(x), AtomicValue::DayTimeDuration(y)) => {
            Ok(AtomicValue::DayTimeDuration(x + y))
        }
        (BinaryOperator::Minus, AtomicValue::DayTimeDuration(x), AtomicValue::DayTimeDuration(y)) => {
            Ok(AtomicValue::DayTimeDuration(x - y))
        }
        (BinaryOperator::Multiply, AtomicValue::YearMonthDuration(x), other) | (BinaryOperator::Multiply, other, AtomicValue::YearMonthDuration(x)) => {
            let factor = other.to_double().ok_or_else(|| XPathError::new(ErrorCode::XPTY0004, "expected a numeric scale factor"))?;
            Ok(AtomicValue::YearMonthDuration((*x as f64 * factor).round() as i64))
        }
        (BinaryOperator::Multiply, AtomicValue::DayTimeDuration(x), other) | (BinaryOperator::Multiply, other, AtomicValue::DayTimeDuration(x)) => {
            let factor = Decimal::try_from(other.to_double().ok_or_else(|| XPathError::new(ErrorCode::XPTY0004, "expected a numeric scale factor"))?)
                .map_err(|_| XPathError::new(ErrorCode::FOCA0002, "scale factor is not representable as a decimal"))?;
            Ok(AtomicValue::DayTimeDuration(x * factor))
        }
        (BinaryOperator::Divide, AtomicValue::DayTimeDuration(x), other) if !other.is_duration() => {
            let divisor = other.to_double().ok_or_else(|| XPathError::new(ErrorCode::XPTY0004, "expected a numeric divisor"))?;
            if divisor == 0.0 {
                return Err(error::div_by_zero());
            }
            let divisor = Decimal::try_from(divisor).map_err(|_| XPathError::new(ErrorCode::FOCA0002, "divisor is not representable as a decimal"))?;
            Ok(AtomicValue::DayTimeDuration(x / divisor))
        }
        (BinaryOperator::Divide, AtomicValue::DayTimeDuration(x), AtomicValue::DayTimeDuration(y)) => {
            if y.is_zero() {
                return Err(error::div_by_zero());
            }
            Ok(AtomicValue::Decimal(x / y))
        }
        _ => Err(XPathError::new(
            ErrorCode::XPTY0004,
            format!("'{:?}' is not defined between {} and {}", op, a.type_name(), b.type_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_two_integers() {
        let result = evaluate_arithmetic(BinaryOperator::Plus, &AtomicValue::Integer(2), &AtomicValue::Integer(3)).unwrap();
        assert_eq!(result, AtomicValue::Integer(5));
    }

    #[test]
    fn integer_division_by_zero_is_an_error() {
        let err = evaluate_arithmetic(BinaryOperator::IntegerDivide, &AtomicValue::Integer(1), &AtomicValue::Integer(0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::FOAR0001);
    }

    #[test]
    fn division_of_two_integers_promotes_to_decimal() {
        let result = evaluate_arithmetic(BinaryOperator::Divide, &AtomicValue::Integer(1), &AtomicValue::Integer(4)).unwrap();
        assert_eq!(result, AtomicValue::Decimal(Decimal::new(25, 2)));
    }

    #[test]
    fn value_comparison_promotes_integer_and_double() {
        let ok = compare_atomics(BinaryOperator::ValueEq, &AtomicValue::Integer(2), &AtomicValue::Double(2.0)).unwrap();
        assert!(ok);
    }

    #[test]
    fn untyped_atomic_promotes_to_double_for_arithmetic() {
        let result = evaluate_arithmetic(BinaryOperator::Plus, &AtomicValue::UntypedAtomic("2".into()), &AtomicValue::Integer(1)).unwrap();
        assert_eq!(result, AtomicValue::Double(3.0));
    }

    #[test]
    fn untyped_atomic_is_cast_to_the_other_operand_type_for_comparison() {
        let ok = compare_atomics(BinaryOperator::ValueEq, &AtomicValue::UntypedAtomic("42".into()), &AtomicValue::Integer(42)).unwrap();
        assert!(ok);
    }

    #[test]
    fn two_untyped_atomics_compare_lexically() {
        let ok = compare_atomics(BinaryOperator::ValueEq, &AtomicValue::UntypedAtomic("abc".into()), &AtomicValue::UntypedAtomic("abc".into())).unwrap();
        assert!(ok);
    }

    #[test]
    fn general_comparison_atomizes_node_operands() {
        use xpath_core::test_support::{create_test_tree, MockNode};

        let tree = create_test_tree();
        let root = MockNode { id: 0, tree: &tree };
        let lhs = XdmValue::from_nodes(vec![root]);
        let rhs = XdmValue::from_atomic(AtomicValue::String("HelloWorld".into()));
        let result = evaluate_general_comparison(BinaryOperator::GeneralEq, &lhs, &rhs).unwrap();
        assert_eq!(result, XdmValue::from_bool(true));
    }
}
