//! The abstraction over a navigable, read-only XML-shaped tree (spec.md §3.3,
//! §6.2). Every axis, comparison and built-in function in the crates above
//! is written exclusively against [`DataSourceNode`], so the engine can run
//! over any host tree (a DOM, a VDOM, an in-memory test fixture) that
//! implements it.
//!
//! `'a` is the lifetime of the underlying data source.

use std::hash::Hash;

/// A qualified name: an optional namespace prefix plus a local part, and
/// (when known) the expanded namespace URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
    pub namespace_uri: Option<&'a str>,
}

impl<'a> QName<'a> {
    pub fn expanded_name(&self) -> (Option<&'a str>, &'a str) {
        (self.namespace_uri, self.local_part)
    }
}

/// The node kind, aligned with the XDM data model (spec.md §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

/// The universal contract for a node in a read-only, hierarchical data
/// source.
///
/// Implementors must provide a total, stable ordering (`Ord`) that is
/// *document order* (spec.md §3.3): a depth-first, left-to-right traversal
/// from the document root, with attributes and namespace nodes ordered
/// immediately after the element that owns them. The evaluator relies on
/// this for path-result dedup/sort and for the `<<`/`>>` node comparisons.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// `None` for node kinds that have no name (document, text, comment);
    /// for a processing instruction this is its target.
    fn name(&self) -> Option<QName<'a>>;

    /// The XPath 1.0 `string()` value: text content for text/comment/PI
    /// nodes, the attribute value for attributes, and the concatenation of
    /// all descendant text nodes for elements and the document.
    fn string_value(&self) -> String;

    /// The typed value (spec.md §3.1 "atomization"): `None` means "use
    /// `string_value` as an `xs:untypedAtomic`", which is the correct
    /// behaviour for a schema-less tree and is what the default
    /// implementation of `typed_value_is_untyped` assumes.
    fn typed_value_is_untyped(&self) -> bool {
        true
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// In-scope namespace nodes (prefix, uri) visible at this node. Empty
    /// for non-element nodes.
    fn namespaces(&self) -> Box<dyn Iterator<Item = (Option<&'a str>, &'a str)> + 'a> {
        Box::new(std::iter::empty())
    }

    fn parent(&self) -> Option<Self>;

    /// A position assigned at tree-build time such that comparing two
    /// nodes' indices reproduces document order without re-traversing the
    /// tree (design note in spec.md §9: "document order is better
    /// implemented as an integer assigned at tree-build time").
    fn document_order_index(&self) -> u64;

    /// The node's base URI, if known (used by `fn:base-uri`,
    /// `fn:resolve-uri`).
    fn base_uri(&self) -> Option<String> {
        None
    }

    /// True when this node has an `xs:ID`-typed attribute value (used by
    /// `fn:id`/`fn:idref`); a schema-less host may always return `false`.
    fn is_id(&self) -> bool {
        false
    }

    fn is_idref(&self) -> bool {
        false
    }
}

// Test utilities: a minimal in-memory tree implementing `DataSourceNode`,
// shared by every downstream crate's unit and integration tests.
pub mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::HashMap;
    use std::hash::Hasher;

    #[derive(Debug, Clone)]
    struct MockNodeData<'a> {
        node_type: NodeType,
        name: Option<QName<'a>>,
        value: String,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    #[derive(Debug)]
    pub struct MockTree<'a> {
        nodes: HashMap<usize, MockNodeData<'a>>,
        parent_map: HashMap<usize, usize>,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree<'a>,
    }

    impl<'a> PartialEq for MockNode<'a> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl<'a> Eq for MockNode<'a> {}

    impl<'a> PartialOrd for MockNode<'a> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl<'a> Ord for MockNode<'a> {
        fn cmp(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl<'a> Hash for MockNode<'a> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[&self.id].node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            self.tree.nodes[&self.id].name
        }

        fn string_value(&self) -> String {
            self.tree.nodes[&self.id].value.clone()
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            let ids = tree.nodes[&self.id].attributes.clone();
            Box::new(ids.into_iter().map(move |id| MockNode { id, tree }))
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            let ids = tree.nodes[&self.id].children.clone();
            Box::new(ids.into_iter().map(move |id| MockNode { id, tree }))
        }

        fn parent(&self) -> Option<Self> {
            self.tree
                .parent_map
                .get(&self.id)
                .map(|&pid| MockNode { id: pid, tree: self.tree })
        }

        fn document_order_index(&self) -> u64 {
            self.id as u64
        }

        fn is_id(&self) -> bool {
            self.tree.nodes[&self.id].name.is_some_and(|n| n.local_part == "id")
                && self.node_type() == NodeType::Attribute
        }
    }

    /// ```text
    /// <root> <!-- id 0 -->
    ///   <para id="p1" xml:lang="en">Hello</para> <!-- id 1, attrs 2&3, text 4 -->
    ///   <!-- comment node --> <!-- id 8 -->
    ///   <div></div> <!-- id 5 -->
    ///   <?pi-target pi-value?> <!-- id 9 -->
    ///   <para>World</para> <!-- id 6, text 7 -->
    /// </root>
    /// ```
    pub fn create_test_tree<'a>() -> MockTree<'a> {
        let mut nodes = HashMap::new();
        let mut parent_map = HashMap::new();

        nodes.insert(
            0,
            MockNodeData {
                node_type: NodeType::Document,
                name: None,
                value: "HelloWorld".to_string(),
                children: vec![1, 8, 5, 9, 6],
                attributes: vec![],
            },
        );
        nodes.insert(
            1,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some(QName { prefix: None, local_part: "para", namespace_uri: None }),
                value: "Hello".to_string(),
                children: vec![4],
                attributes: vec![2, 3],
            },
        );
        parent_map.insert(1, 0);

        nodes.insert(
            2,
            MockNodeData {
                node_type: NodeType::Attribute,
                name: Some(QName { prefix: None, local_part: "id", namespace_uri: None }),
                value: "p1".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(2, 1);

        nodes.insert(
            3,
            MockNodeData {
                node_type: NodeType::Attribute,
                name: Some(QName { prefix: Some("xml"), local_part: "lang", namespace_uri: None }),
                value: "en".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(3, 1);

        nodes.insert(
            4,
            MockNodeData {
                node_type: NodeType::Text,
                name: None,
                value: "Hello".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(4, 1);

        nodes.insert(
            5,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some(QName { prefix: None, local_part: "div", namespace_uri: None }),
                value: String::new(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(5, 0);

        nodes.insert(
            6,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some(QName { prefix: None, local_part: "para", namespace_uri: None }),
                value: "World".to_string(),
                children: vec![7],
                attributes: vec![],
            },
        );
        parent_map.insert(6, 0);

        nodes.insert(
            7,
            MockNodeData {
                node_type: NodeType::Text,
                name: None,
                value: "World".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(7, 6);

        nodes.insert(
            8,
            MockNodeData {
                node_type: NodeType::Comment,
                name: None,
                value: " comment ".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(8, 0);

        nodes.insert(
            9,
            MockNodeData {
                node_type: NodeType::ProcessingInstruction,
                name: Some(QName { prefix: None, local_part: "pi-target", namespace_uri: None }),
                value: "pi-value".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(9, 0);

        MockTree { nodes, parent_map }
    }
}
