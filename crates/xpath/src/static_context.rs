//! The static context (spec.md §3.5): everything known about an expression
//! before it is ever evaluated against data — in-scope namespaces, the
//! default element/function namespaces, known variables and their declared
//! types, the function signature registry, the XPath/XSD version in
//! effect, the default collation, and backwards-compatibility mode.

use crate::ast::SequenceType;
use crate::grammar::XPathVersion;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub namespace: Option<String>,
    pub local_name: String,
    pub min_arity: usize,
    pub max_arity: usize,
}

#[derive(Debug, Clone)]
pub struct StaticContext {
    pub xpath_version: XPathVersion,
    pub namespaces: HashMap<String, String>,
    pub default_element_namespace: Option<String>,
    pub default_function_namespace: String,
    pub variable_types: HashMap<String, SequenceType>,
    pub known_functions: Vec<FunctionSignature>,
    pub default_collation: String,
    pub base_uri: Option<String>,
    /// XPath 1.0 compatibility mode (spec.md §3.5): loosens numeric/boolean
    /// coercions in `=`/`+`-style operators the way XPath 1.0 always did.
    pub backwards_compatible: bool,
}

impl Default for StaticContext {
    fn default() -> Self {
        Self {
            xpath_version: XPathVersion::default(),
            namespaces: HashMap::new(),
            default_element_namespace: None,
            default_function_namespace: "http://www.w3.org/2005/xpath-functions".to_string(),
            variable_types: HashMap::new(),
            known_functions: Vec::new(),
            default_collation: "http://www.w3.org/2005/xpath-functions/collation/codepoint".to_string(),
            base_uri: None,
            backwards_compatible: false,
        }
    }
}

impl StaticContext {
    pub fn xpath_1_0() -> Self {
        Self { xpath_version: XPathVersion::V1_0, backwards_compatible: true, ..Self::default() }
    }

    pub fn declare_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> &mut Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn declare_variable(&mut self, name: impl Into<String>, sequence_type: SequenceType) -> &mut Self {
        self.variable_types.insert(name.into(), sequence_type);
        self
    }

    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    pub fn is_variable_in_scope(&self, name: &str) -> bool {
        self.variable_types.contains_key(name)
    }
}
