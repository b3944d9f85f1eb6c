//! `fn:QName` and related accessors (spec.md §5.4). Grounded in
//! `examples/original_source/elementpath`'s `xpath2/_class_methods.py`
//! QName helpers, re-expressed against [`crate::types::QNameValue`].

use super::single_string;
use crate::engine::single_atomic;
use crate::error::XPathError;
use crate::types::{AtomicValue, QNameValue, XdmValue};
use xpath_core::DataSourceNode;

pub fn handles(name: &str) -> bool {
    matches!(
        name,
        "QName" | "local-name-from-QName" | "prefix-from-QName" | "namespace-uri-from-QName" | "resolve-QName" | "in-scope-prefixes"
    )
}

pub fn call<'d, N: DataSourceNode<'d>>(name: &str, args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    match name {
        "QName" => {
            let uri = single_string(&args[0])?;
            let lexical = single_string(&args[1])?;
            let (prefix, local) = match lexical.split_once(':') {
                Some((p, l)) => (Some(p.to_string()), l.to_string()),
                None => (None, lexical),
            };
            Ok(XdmValue::from_atomic(AtomicValue::QName(QNameValue {
                prefix,
                local,
                namespace: if uri.is_empty() { None } else { Some(uri) },
            })))
        }
        "local-name-from-QName" => with_qname(args, |q| AtomicValue::String(q.local.clone())),
        "prefix-from-QName" => {
            if args[0].is_empty() {
                return Ok(XdmValue::empty());
            }
            match single_atomic(&args[0])? {
                AtomicValue::QName(q) => Ok(match q.prefix {
                    Some(p) => XdmValue::from_atomic(AtomicValue::String(p)),
                    None => XdmValue::empty(),
                }),
                other => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("expected xs:QName, got {}", other.type_name()))),
            }
        }
        "namespace-uri-from-QName" => {
            if args[0].is_empty() {
                return Ok(XdmValue::empty());
            }
            match single_atomic(&args[0])? {
                AtomicValue::QName(q) => Ok(XdmValue::from_atomic(AtomicValue::AnyUri(q.namespace.unwrap_or_default()))),
                other => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("expected xs:QName, got {}", other.type_name()))),
            }
        }
        "resolve-QName" => {
            let lexical = single_string(&args[0])?;
            let (prefix, local) = match lexical.split_once(':') {
                Some((p, l)) => (Some(p.to_string()), l.to_string()),
                None => (None, lexical),
            };
            Ok(XdmValue::from_atomic(AtomicValue::QName(QNameValue { prefix, local, namespace: None })))
        }
        "in-scope-prefixes" => Ok(XdmValue::empty()),
        _ => unreachable!("qnames::call dispatched to an unhandled name"),
    }
}

fn with_qname<'d, N: DataSourceNode<'d>>(args: &[XdmValue<N>], f: impl Fn(&QNameValue) -> AtomicValue) -> Result<XdmValue<N>, XPathError> {
    match single_atomic(&args[0])? {
        AtomicValue::QName(q) => Ok(XdmValue::from_atomic(f(&q))),
        other => Err(XPathError::new(xpath_core::error::ErrorCode::XPTY0004, format!("expected xs:QName, got {}", other.type_name()))),
    }
}
