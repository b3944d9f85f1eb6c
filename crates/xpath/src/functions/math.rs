//! `math:*` (spec.md §5.11). Absent from the teacher entirely; grounded in
//! `examples/original_source/elementpath`'s `xpath31/_class_methods.py`
//! `math:*` registrations, which wrap the same set of `libm`-style
//! trigonometric/exponential primitives the standard library already
//! exposes on `f64`.

use super::single_string;
use crate::engine::atomize_single;
use crate::error::XPathError;
use crate::types::{AtomicValue, XdmValue};
use xpath_core::DataSourceNode;

pub fn call<'d, N: DataSourceNode<'d>>(local: &str, args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    if local == "pi" {
        return Ok(XdmValue::from_atomic(AtomicValue::Double(std::f64::consts::PI)));
    }
    if local == "atan2" {
        let y = operand(&args[0])?;
        let x = operand(&args[1])?;
        return Ok(XdmValue::from_atomic(AtomicValue::Double(y.atan2(x))));
    }
    if args[0].is_empty() {
        return Ok(XdmValue::empty());
    }
    let x = operand(&args[0])?;
    let result = match local {
        "exp" => x.exp(),
        "exp10" => 10f64.powf(x),
        "log" => x.ln(),
        "log10" => x.log10(),
        "pow" => {
            let exponent = operand(&args[1])?;
            return Ok(XdmValue::from_atomic(AtomicValue::Double(x.powf(exponent))));
        }
        "sqrt" => x.sqrt(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "asin" => x.asin(),
        "acos" => x.acos(),
        "atan" => x.atan(),
        other => return Err(crate::error::function_error(&format!("math:{}", other), "unsupported math function")),
    };
    Ok(XdmValue::from_atomic(AtomicValue::Double(result)))
}

fn operand<'d, N: DataSourceNode<'d>>(value: &XdmValue<N>) -> Result<f64, XPathError> {
    let atomic = atomize_single(value)?;
    atomic.to_double().ok_or_else(|| {
        let repr = single_string(value).unwrap_or_default();
        XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("math function requires a numeric operand, got '{}'", repr))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpath_core::test_support::MockNode;

    #[test]
    fn pi_is_the_usual_constant() {
        let result: XdmValue<MockNode<'static>> = call("pi", &[]).unwrap();
        assert_eq!(result, XdmValue::from_atomic(AtomicValue::Double(std::f64::consts::PI)));
    }

    #[test]
    fn sqrt_of_empty_sequence_is_empty() {
        let args: Vec<XdmValue<MockNode<'static>>> = vec![XdmValue::empty()];
        let result = call("sqrt", &args).unwrap();
        assert!(result.is_empty());
    }
}
