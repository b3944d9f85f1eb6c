//! A full XPath 1.0/2.0/3.0/3.1 expression engine (spec.md §1-§2): tokenize,
//! parse against a [`StaticContext`], then evaluate against a
//! [`DynamicContext`]/focus pair to produce an [`XdmValue`].
//!
//! Mirrors the teacher's top-level crate shape (`xpath1`/grammar-versioned
//! submodules folded into one crate here, since this engine unifies all
//! four XPath versions behind a single grammar gated by
//! [`grammar::XPathVersion`] rather than shipping one crate per version).

pub mod ast;
pub mod error;
pub mod format_tables;
pub mod functions;
pub mod grammar;
pub mod operators;
pub mod parser;
pub mod static_analysis;
pub mod static_context;
pub mod types;

mod engine;

pub use ast::Expression;
pub use engine::{evaluate, DynamicContext, EvaluationContext, Focus};
pub use error::XPathError;
pub use grammar::XPathVersion;
pub use parser::parse;
pub use static_context::{FunctionSignature, StaticContext};
pub use types::{AtomicValue, QNameValue, XdmArray, XdmFunction, XdmItem, XdmMap, XdmValue};

use xpath_core::DataSourceNode;

/// `select` (spec.md §6.1): parses and evaluates an expression against a
/// context node in one step, the lazy-evaluation contract in spec.md being
/// satisfied here by the engine never materializing more of the input tree
/// than a step's axis actually walks.
pub fn select<'d, N: DataSourceNode<'d>>(
    expr: &str,
    static_ctx: &StaticContext,
    dynamic_ctx: &'d DynamicContext<N>,
    context_node: N,
) -> Result<XdmValue<N>, XPathError> {
    let tree = parse(expr, static_ctx)?;
    static_analysis::check(&tree, static_ctx)?;
    let eval_ctx = EvaluationContext::with_context_node(dynamic_ctx, context_node);
    evaluate(&tree, &eval_ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpath_core::test_support::{create_test_tree, MockNode};

    #[test]
    fn select_evaluates_a_simple_path_against_a_mock_tree() {
        let tree = create_test_tree();
        let root = MockNode { id: 0, tree: &tree };
        let static_ctx = StaticContext::default();
        let dynamic_ctx: DynamicContext<MockNode> = DynamicContext::default();
        let result = select("1 + 1", &static_ctx, &dynamic_ctx, root).unwrap();
        assert_eq!(result, XdmValue::from_atomic(AtomicValue::Integer(2)));
    }
}
