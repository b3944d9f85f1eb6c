//! `fn:` numeric functions (spec.md §5.3): `abs`, `ceiling`, `floor`,
//! `round`, `round-half-to-even`. Grounded in the teacher's
//! `xpath1::functions::numbers`, type-preserving the way F&O requires
//! (an `xs:integer` in gives an `xs:integer` out).

use crate::engine::single_atomic;
use crate::error::XPathError;
use crate::types::{AtomicValue, XdmValue};
use rust_decimal::Decimal;

pub fn handles(name: &str) -> bool {
    matches!(name, "abs" | "ceiling" | "floor" | "round" | "round-half-to-even")
}

pub fn call<N: Clone>(name: &str, args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    if args[0].is_empty() {
        return Ok(XdmValue::empty());
    }
    let value = single_atomic(&args[0])?;
    let result = match name {
        "abs" => map_numeric(&value, |d| d.abs(), f64::abs),
        "ceiling" => map_numeric(&value, |d| d.ceil(), f64::ceil),
        "floor" => map_numeric(&value, |d| d.floor(), f64::floor),
        "round" => {
            let precision = args.get(1).map(|v| single_atomic(v)).transpose()?.and_then(|a| match a {
                AtomicValue::Integer(i) => Some(i),
                _ => None,
            });
            round(&value, precision.unwrap_or(0))
        }
        "round-half-to-even" => round_half_to_even(&value),
        _ => unreachable!("numeric::call dispatched to an unhandled name"),
    }?;
    Ok(XdmValue::from_atomic(result))
}

fn map_numeric(value: &AtomicValue, decimal_op: impl Fn(Decimal) -> Decimal, float_op: impl Fn(f64) -> f64) -> Result<AtomicValue, XPathError> {
    Ok(match value {
        AtomicValue::Integer(i) => AtomicValue::Integer(*i),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(decimal_op(*d)),
        AtomicValue::Float(f) => AtomicValue::Float(float_op(*f as f64) as f32),
        AtomicValue::Double(d) => AtomicValue::Double(float_op(*d)),
        other => return Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("{} is not numeric", other.type_name()))),
    })
}

/// `fn:round`: half-rounds away from zero (F&O's "round half up"), to the
/// given decimal precision (negative precision rounds to tens/hundreds/...).
fn round(value: &AtomicValue, precision: i64) -> Result<AtomicValue, XPathError> {
    let scale = Decimal::from(10i64.checked_pow(precision.unsigned_abs().min(18) as u32).unwrap_or(1));
    let scaled = |d: Decimal| -> Decimal {
        if precision >= 0 {
            (d * scale).round() / scale
        } else {
            (d / scale).round() * scale
        }
    };
    Ok(match value {
        AtomicValue::Integer(i) => AtomicValue::Integer(*i),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(scaled(*d)),
        AtomicValue::Float(f) => AtomicValue::Float(round_f64(*f as f64, precision) as f32),
        AtomicValue::Double(d) => AtomicValue::Double(round_f64(*d, precision)),
        other => return Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("{} is not numeric", other.type_name()))),
    })
}

fn round_f64(value: f64, precision: i64) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

fn round_half_to_even(value: &AtomicValue) -> Result<AtomicValue, XPathError> {
    Ok(match value {
        AtomicValue::Integer(i) => AtomicValue::Integer(*i),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(d.round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointNearestEven)),
        AtomicValue::Float(f) => AtomicValue::Float(round_half_even_f64(*f as f64) as f32),
        AtomicValue::Double(d) => AtomicValue::Double(round_half_even_f64(*d)),
        other => return Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("{} is not numeric", other.type_name()))),
    })
}

fn round_half_even_f64(value: f64) -> f64 {
    let floor = value.floor();
    let diff = value - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_rounds_half_away_from_zero() {
        let args: Vec<XdmValue<()>> = vec![XdmValue::from_atomic(AtomicValue::Decimal(Decimal::new(25, 1)))];
        let result = call("round", &args).unwrap();
        assert_eq!(result, XdmValue::from_atomic(AtomicValue::Decimal(Decimal::from(3))));
    }

    #[test]
    fn abs_preserves_integer_type() {
        let args: Vec<XdmValue<()>> = vec![XdmValue::from_atomic(AtomicValue::Integer(-5))];
        let result = call("abs", &args).unwrap();
        assert_eq!(result, XdmValue::from_atomic(AtomicValue::Integer(5)));
    }
}
