//! The shared in-memory value tree used by the BSON codec and by the
//! pointer/patch engines.

use crate::binary::Binary;
use crate::error::{Error, Result};

/// The dual double/integer view of a numeric node.
///
/// Whether a given `Number` is encoded as a BSON double or a BSON int64 is
/// decided at encode time from `double.fract() == 0.0`, never from a stored
/// flag, so a `Number` built from an integer and one built from an
/// integral-valued double behave identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
    pub double: f64,
    pub int: i64,
}

impl Number {
    /// Builds a `Number` from an integer; both views agree exactly.
    pub fn from_int(int: i64) -> Self {
        Number {
            double: int as f64,
            int,
        }
    }

    /// Builds a `Number` from a double; the integer view is a
    /// truncate-toward-zero cast, meaningful only when `is_integral()`.
    pub fn from_double(double: f64) -> Self {
        Number {
            double,
            int: double as i64,
        }
    }

    /// `true` if this value should be encoded as a BSON int64 rather than a
    /// BSON double.
    pub fn is_integral(&self) -> bool {
        self.double.fract() == 0.0
    }
}

/// The kind of value a [`Node`] holds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(Vec<Node>),
    Binary(Binary),
    Uuid([u8; 16]),
}

/// Structural equality, hand-written rather than derived so that it matches
/// §3's data-model invariant instead of contradicting it: `Array` order is
/// semantic (children compare position-by-position, via `Vec`'s derived
/// comparison over [`Node`]'s own `PartialEq`), while `Object` order is not
/// (children compare by matching key regardless of position, the same way
/// [`crate::patch`]'s `test`-op comparison does).
impl PartialEq for NodeKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeKind::Null, NodeKind::Null) => true,
            (NodeKind::Bool(a), NodeKind::Bool(b)) => a == b,
            (NodeKind::Number(a), NodeKind::Number(b)) => a == b,
            (NodeKind::String(a), NodeKind::String(b)) => a == b,
            (NodeKind::Array(a), NodeKind::Array(b)) => a == b,
            (NodeKind::Object(a), NodeKind::Object(b)) => objects_equal(a, b),
            (NodeKind::Binary(a), NodeKind::Binary(b)) => a == b,
            (NodeKind::Uuid(a), NodeKind::Uuid(b)) => a == b,
            _ => false,
        }
    }
}

/// Two `Object` child lists are equal when they have the same length and
/// every member of `a` has a same-keyed, equal-valued counterpart in `b`.
/// Order doesn't matter; a member's own `key` is the join condition, not
/// part of the recursive value comparison (mirroring
/// `crate::patch::compare_nodes`'s member-lookup-by-key).
fn objects_equal(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len()
        && a.iter().all(|member| {
            b.iter()
                .any(|other| other.key == member.key && other == member)
        })
}

/// One node of the tree: a value plus an optional key.
///
/// The key is meaningful only when this node is a direct child of an
/// `Object` node; a node's key is ignored when it is a child of an `Array`
/// (the encoder regenerates the positional key for array children, and the
/// pointer resolver addresses array children purely by index).
#[derive(Debug, Clone)]
pub struct Node {
    pub key: Option<String>,
    pub kind: NodeKind,
}

/// A `Node`'s `key` is never part of its own equality: it is meaningful only
/// as the join condition an `Object` parent uses to find which child to
/// compare (see `objects_equal` above), never as a property of the child
/// itself — an `Array` child's key is conventionally ignored outright (§3),
/// and an `Object` child's key has already been matched by the time its
/// value is compared.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Node {
    fn leaf(kind: NodeKind) -> Self {
        Node { key: None, kind }
    }

    pub fn null() -> Self {
        Node::leaf(NodeKind::Null)
    }

    pub fn bool(value: bool) -> Self {
        Node::leaf(NodeKind::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Node::leaf(NodeKind::Number(Number::from_int(value)))
    }

    pub fn double(value: f64) -> Self {
        Node::leaf(NodeKind::Number(Number::from_double(value)))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::leaf(NodeKind::String(value.into()))
    }

    pub fn binary(subtype: u8, data: Vec<u8>) -> Self {
        Node::leaf(NodeKind::Binary(Binary::new(subtype, data)))
    }

    pub fn uuid(bytes: [u8; 16]) -> Self {
        Node::leaf(NodeKind::Uuid(bytes))
    }

    pub fn array(children: Vec<Node>) -> Self {
        Node::leaf(NodeKind::Array(children))
    }

    pub fn object(children: Vec<Node>) -> Self {
        Node::leaf(NodeKind::Object(children))
    }

    /// Sets this node's key. Only meaningful once this node becomes a child
    /// of an `Object`.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// `true` if this node is an `Array` or `Object`.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Array(_) | NodeKind::Object(_))
    }

    /// A read-only view of this node's children, or an empty slice for a leaf.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Array(children) | NodeKind::Object(children) => children,
            _ => &[],
        }
    }

    /// A mutable view of this node's children list, or `None` for a leaf.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Array(children) | NodeKind::Object(children) => Some(children),
            _ => None,
        }
    }

    /// Appends `child` to this node's children.
    ///
    /// Errors if this node is not an `Array`/`Object`.
    pub fn push(&mut self, child: Node) -> Result<()> {
        self.children_mut()
            .ok_or_else(Error::not_a_container)?
            .push(child);
        Ok(())
    }

    /// Inserts `child` at `index`, shifting later children up.
    ///
    /// Errors if this node is not an `Array`/`Object`, or if `index` is
    /// greater than the current child count.
    pub fn insert_at(&mut self, index: usize, child: Node) -> Result<()> {
        let children = self.children_mut().ok_or_else(Error::not_a_container)?;
        if index > children.len() {
            return Err(Error::malformed_bytes(format!(
                "insertion index {index} out of bounds"
            )));
        }
        children.insert(index, child);
        Ok(())
    }

    /// Removes and returns the child at `index`.
    ///
    /// Errors if this node is not an `Array`/`Object`, or `index` is out of
    /// bounds.
    pub fn detach_at(&mut self, index: usize) -> Result<Node> {
        let children = self.children_mut().ok_or_else(Error::not_a_container)?;
        if index >= children.len() {
            return Err(Error::malformed_bytes(format!(
                "detach index {index} out of bounds"
            )));
        }
        Ok(children.remove(index))
    }

    /// Removes and returns the first direct `Object` child whose key matches
    /// `key`, case-sensitively.
    pub fn detach_key(&mut self, key: &str) -> Option<Node> {
        let children = self.children_mut()?;
        let idx = children.iter().position(|c| c.key.as_deref() == Some(key))?;
        Some(children.remove(idx))
    }

    /// Deep-clones this subtree.
    ///
    /// Every `Node` owns its children outright, so this is a thin documented
    /// wrapper over `Clone::clone`: patch's `copy`/`add` operations are
    /// specified in terms of "deep-duplicate", and this is the one place
    /// that guarantee is named.
    pub fn duplicate(&self) -> Node {
        self.clone()
    }

    /// The child at `index`, for an `Array` node.
    pub fn get_array_item(&self, index: usize) -> Option<&Node> {
        match &self.kind {
            NodeKind::Array(children) => children.get(index),
            _ => None,
        }
    }

    /// The first direct child with a matching key (case-sensitive), for an
    /// `Object` node.
    pub fn get_object_item(&self, key: &str) -> Option<&Node> {
        match &self.kind {
            NodeKind::Object(children) => children.iter().find(|c| c.key.as_deref() == Some(key)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_classification_is_computed_not_stored() {
        let from_int = Number::from_int(5);
        let from_double = Number::from_double(5.0);
        assert!(from_int.is_integral());
        assert!(from_double.is_integral());
        assert_eq!(from_int.int, from_double.int);

        let fractional = Number::from_double(5.5);
        assert!(!fractional.is_integral());
    }

    #[test]
    fn push_and_detach_round_trip() {
        let mut obj = Node::object(vec![]);
        obj.push(Node::int(1).with_key("a")).unwrap();
        obj.push(Node::int(2).with_key("b")).unwrap();
        assert_eq!(obj.get_object_item("a").unwrap().kind, NodeKind::Number(Number::from_int(1)));

        let detached = obj.detach_key("a").unwrap();
        assert_eq!(detached.kind, NodeKind::Number(Number::from_int(1)));
        assert!(obj.get_object_item("a").is_none());
    }

    #[test]
    fn push_on_leaf_errors() {
        let mut leaf = Node::null();
        assert!(leaf.push(Node::int(1)).is_err());
    }

    #[test]
    fn array_child_key_is_ignored_by_convention() {
        // An Array's children may carry a `key`, but it has no meaning —
        // lookups on an Array go by position only.
        let arr = Node::array(vec![Node::int(1).with_key("ignored"), Node::int(2)]);
        assert_eq!(arr.get_array_item(0).unwrap().kind, NodeKind::Number(Number::from_int(1)));
    }

    #[test]
    fn object_equality_ignores_child_order() {
        let a = Node::object(vec![Node::int(1).with_key("a"), Node::int(2).with_key("b")]);
        let b = Node::object(vec![Node::int(2).with_key("b"), Node::int(1).with_key("a")]);
        assert_eq!(a, b);
    }

    #[test]
    fn object_equality_still_distinguishes_different_values_same_keys() {
        let a = Node::object(vec![Node::int(1).with_key("a"), Node::int(2).with_key("b")]);
        let b = Node::object(vec![Node::int(2).with_key("a"), Node::int(1).with_key("b")]);
        assert_ne!(a, b);
    }

    #[test]
    fn array_equality_is_order_sensitive() {
        let a = Node::array(vec![Node::int(1), Node::int(2)]);
        let b = Node::array(vec![Node::int(2), Node::int(1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn node_equality_ignores_own_key() {
        assert_eq!(Node::int(1), Node::int(1).with_key("a"));
    }
}
