//! `cast as`/`castable as` (spec.md §3.2, §4.5): lexical-space conversion
//! between `xs:anyAtomicType` subtypes. Only the conversions reachable from
//! an untyped/schema-less data source are implemented; schema-validated
//! casts (e.g. to a user-defined restriction) are out of scope, per the
//! engine having no schema processor.

use crate::ast::SingleType;
use crate::engine::single_atomic;
use crate::error::{self, XPathError};
use crate::types::{AtomicValue, XdmValue};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn cast_as<N: Clone>(value: &XdmValue<N>, single_type: &SingleType) -> Result<XdmValue<N>, XPathError> {
    if value.is_empty() {
        if single_type.optional {
            return Ok(XdmValue::empty());
        }
        return Err(error::cardinality("1", 0));
    }
    let source = single_atomic(value)?;
    let target = single_type.type_name.local_part.as_str();
    cast_atomic(&source, target).map(XdmValue::from_atomic)
}

pub fn cast_atomic(source: &AtomicValue, target: &str) -> Result<AtomicValue, XPathError> {
    let lexical = source.to_string_value();
    let invalid = || error::invalid_cast(source.type_name(), target);
    Ok(match target {
        "string" | "untypedAtomic" | "anyURI" | "NOTATION" => {
            if target == "untypedAtomic" {
                AtomicValue::UntypedAtomic(lexical)
            } else if target == "anyURI" {
                AtomicValue::AnyUri(lexical)
            } else {
                AtomicValue::String(lexical)
            }
        }
        "boolean" => AtomicValue::Boolean(source.to_boolean().ok_or_else(invalid)?),
        "integer" | "long" | "int" | "short" | "byte" | "nonNegativeInteger" | "positiveInteger" => {
            let f: f64 = lexical.trim().parse().map_err(|_| invalid())?;
            AtomicValue::Integer(f as i64)
        }
        "decimal" => AtomicValue::Decimal(Decimal::from_str(lexical.trim()).map_err(|_| invalid())?),
        "float" => AtomicValue::Float(lexical.trim().parse().map_err(|_| invalid())?),
        "double" => AtomicValue::Double(parse_xsd_double(&lexical).ok_or_else(invalid)?),
        other => return Err(error::invalid_cast(source.type_name(), other)),
    })
}

fn parse_xsd_double(text: &str) -> Option<f64> {
    match text.trim() {
        "NaN" => Some(f64::NAN),
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_string_to_integer() {
        let result = cast_atomic(&AtomicValue::String("42".into()), "integer").unwrap();
        assert_eq!(result, AtomicValue::Integer(42));
    }

    #[test]
    fn rejects_non_numeric_string_as_integer() {
        assert!(cast_atomic(&AtomicValue::String("abc".into()), "integer").is_err());
    }

    #[test]
    fn casts_double_infinity_lexical_form() {
        let result = cast_atomic(&AtomicValue::String("INF".into()), "double").unwrap();
        assert_eq!(result, AtomicValue::Double(f64::INFINITY));
    }
}
