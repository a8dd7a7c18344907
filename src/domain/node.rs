//! Node tree built from a parser AST.
//!
//! Nodes live in an arena owned by [`NodeTree`]. Children are stored as ordered id lists and
//! the parent link is an id into the same arena, so upward lookups never create ownership
//! cycles. Ids are arena indices: unique within one tree and increasing in construction order.

use std::collections::BTreeMap;
use std::fmt;

/// Index of a node inside its [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar or positional value stored on a node instead of becoming a child.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// `[start, end]` byte offsets, or the `{0: start, 1: end}` shape used on comments.
    Range(u64, u64),
    Regex { pattern: String, flags: String },
    /// A list-valued field with no elements (e.g. `params: []`).
    EmptyList,
}

impl Attribute {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One element of the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Syntactic kind, taken from the AST `type` field.
    pub kind: String,
    /// Parent field that produced this node; `None` for the root.
    pub field_tag: Option<String>,
    /// True when the node came from an array-valued field.
    pub from_list: bool,
    pub attributes: BTreeMap<String, Attribute>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(
        id: NodeId,
        kind: String,
        field_tag: Option<String>,
        from_list: bool,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            kind,
            field_tag,
            from_list,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            parent,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.get(key)
    }
}

/// Arena-backed tree for a single source file.
///
/// A tree starts as a lone root and is filled in once by
/// [`TreeBuilder::build`](crate::domain::builder::TreeBuilder::build); after that it is sealed
/// and exposes no mutation.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<Node>,
    built: bool,
}

impl NodeTree {
    /// Create a fresh, unbuilt tree holding only its root.
    pub fn new(root_kind: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(NodeId(0), root_kind.into(), None, false, None)],
            built: false,
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// All nodes in construction order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.node(id).children.iter().map(move |c| self.node(*c))
    }

    pub fn first_child(&self, id: NodeId) -> Option<&Node> {
        self.node(id).children.first().map(|c| self.node(*c))
    }

    pub fn parent(&self, id: NodeId) -> Option<&Node> {
        self.node(id).parent.map(|p| self.node(p))
    }

    /// Pre-order walk over `id` and its descendants.
    pub fn preorder(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![id],
        }
    }

    /// First node of the given kind among the strict descendants of `id`, in pre-order.
    pub fn find_descendant(&self, id: NodeId, kind: &str) -> Option<&Node> {
        self.preorder(id).skip(1).find(|n| n.kind == kind)
    }

    /// [`find_descendant`](Self::find_descendant) for every node at once, indexed by id.
    /// One pass over the arena; children always sit after their parent.
    pub fn first_descendants(&self, kind: &str) -> Vec<Option<NodeId>> {
        let mut first = vec![None; self.nodes.len()];
        for node in self.nodes.iter().rev() {
            let found = node.children.iter().find_map(|child| {
                if self.nodes[child.0].kind == kind {
                    Some(*child)
                } else {
                    first[child.0]
                }
            });
            first[node.id.0] = found;
        }
        first
    }

    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        kind: String,
        field_tag: &str,
        from_list: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, kind, Some(field_tag.to_string()), from_list, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn set_attribute(&mut self, id: NodeId, key: &str, value: Attribute) {
        self.nodes[id.0].attributes.insert(key.to_string(), value);
    }

    pub(crate) fn seal(&mut self) {
        self.built = true;
    }
}

/// Iterator returned by [`NodeTree::preorder`].
pub struct Preorder<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> NodeTree {
        // Program -> ExpressionStatement -> CallExpression -> [Identifier, Literal]
        let mut tree = NodeTree::new("Program");
        let stmt = tree.add_child(tree.root_id(), "ExpressionStatement".into(), "body", true);
        let call = tree.add_child(stmt, "CallExpression".into(), "expression", false);
        let callee = tree.add_child(call, "Identifier".into(), "callee", false);
        tree.set_attribute(callee, "name", Attribute::Str("foo".into()));
        tree.add_child(call, "Literal".into(), "arguments", true);
        tree
    }

    #[test]
    fn test_ids_follow_construction_order() {
        let tree = sample_tree();
        let ids: Vec<usize> = tree.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_parent_links() {
        let tree = sample_tree();
        let call = tree.node(NodeId(2));
        assert_eq!(tree.parent(call.id).unwrap().kind, "ExpressionStatement");
        assert!(tree.parent(tree.root_id()).is_none());
        for node in tree.iter().skip(1) {
            let parent = tree.parent(node.id).unwrap();
            assert_eq!(parent.children().iter().filter(|c| **c == node.id).count(), 1);
        }
    }

    #[test]
    fn test_preorder_and_descendant_search() {
        let tree = sample_tree();
        let kinds: Vec<&str> = tree.preorder(tree.root_id()).map(|n| n.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["Program", "ExpressionStatement", "CallExpression", "Identifier", "Literal"]
        );

        let ident = tree.find_descendant(tree.root_id(), "Identifier").unwrap();
        assert_eq!(ident.attribute("name").and_then(Attribute::as_str), Some("foo"));
        // The starting node itself is not a candidate.
        assert!(tree.find_descendant(NodeId(3), "Identifier").is_none());
    }

    #[test]
    fn test_first_descendants_match_search() {
        let mut tree = sample_tree();
        // a second identifier under the literal, after the callee in pre-order
        tree.add_child(NodeId(4), "Identifier".into(), "argument", false);
        let first = tree.first_descendants("Identifier");
        for node in tree.iter() {
            assert_eq!(
                first[node.id.0],
                tree.find_descendant(node.id, "Identifier").map(|n| n.id),
                "mismatch at {}",
                node.id
            );
        }
        assert_eq!(first[2], Some(NodeId(3)));
        assert_eq!(first[4], Some(NodeId(5)));
        assert_eq!(first[3], None);
    }

    #[test]
    fn test_fresh_tree_is_unbuilt() {
        let tree = NodeTree::new("Program");
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_built());
        assert!(tree.root().field_tag.is_none());
    }
}
