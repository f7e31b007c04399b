//! RFC 6902 JSON Patch application and diff generation over a [`Node`] tree.

use std::fmt;
use std::mem::discriminant;

use crate::node::{Node, NodeKind};
use crate::pointer;

/// A failure applying or validating a patch sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchError {
    /// A patch object was missing `op`/`path`, or the top-level patches
    /// value was not an `Array`.
    Malformed,
    /// `op` was not one of `add`/`remove`/`replace`/`move`/`copy`/`test`.
    UnknownOp,
    /// A `move`/`copy` patch was missing `from`.
    MissingFrom,
    /// `path` (or `from`)'s parent does not resolve, or the target index/key
    /// does not exist for an operation that requires it to.
    ParentNotFound,
    /// Reserved for allocation-failure parity with the reference
    /// implementation; unreachable under this crate's `Clone`-based
    /// duplication.
    DuplicationFailure,
    /// An `add`/`replace` patch was missing `value`.
    MissingValue,
    /// A `test` patch's value did not match.
    TestFailed { kind: TestFailureKind },
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchError::Malformed => write!(f, "malformed patch document"),
            PatchError::UnknownOp => write!(f, "unknown patch op"),
            PatchError::MissingFrom => write!(f, "patch is missing \"from\""),
            PatchError::ParentNotFound => write!(f, "patch target could not be resolved"),
            PatchError::DuplicationFailure => write!(f, "failed to duplicate patch value"),
            PatchError::MissingValue => write!(f, "patch is missing \"value\""),
            PatchError::TestFailed { kind } => write!(f, "test operation failed: {kind:?}"),
        }
    }
}

impl std::error::Error for PatchError {}

/// The specific way a `test` operation's comparison failed, mirroring the
/// distinct negative result codes of the reference implementation's compare
/// routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestFailureKind {
    TypeMismatch,
    NumberMismatch,
    StringMismatch,
    ArraySizeMismatch,
    ObjectSizeMismatch,
    ObjectKeyMissing,
}

fn get_str_field<'a>(patch: &'a Node, key: &str) -> Option<&'a str> {
    match &patch.get_object_item(key)?.kind {
        NodeKind::String(s) => Some(s.as_str()),
        _ => None,
    }
}

fn get_field<'a>(patch: &'a Node, key: &str) -> Option<&'a Node> {
    patch.get_object_item(key)
}

/// Applies an `Array` of RFC 6902 patch operations to `root` in order.
///
/// Stops at the first failing operation and returns its error; prior
/// mutations are **not** rolled back.
pub fn apply(root: &mut Node, patches: &Node) -> Result<(), PatchError> {
    let ops = match &patches.kind {
        NodeKind::Array(items) => items,
        _ => return Err(PatchError::Malformed),
    };
    for patch in ops {
        apply_one(root, patch)?;
    }
    Ok(())
}

fn apply_one(root: &mut Node, patch: &Node) -> Result<(), PatchError> {
    let op = get_str_field(patch, "op").ok_or(PatchError::Malformed)?;
    let path = get_str_field(patch, "path").ok_or(PatchError::Malformed)?;

    match op {
        "add" => {
            let value = get_field(patch, "value").ok_or(PatchError::MissingValue)?;
            do_add(root, path, value.duplicate())
        }
        "remove" => do_remove(root, path).map(|_| ()),
        "replace" => {
            let value = get_field(patch, "value").ok_or(PatchError::MissingValue)?;
            do_remove(root, path)?;
            do_add(root, path, value.duplicate())
        }
        "move" => {
            let from = get_str_field(patch, "from").ok_or(PatchError::MissingFrom)?;
            let moved = do_remove(root, from)?;
            do_add(root, path, moved)
        }
        "copy" => {
            let from = get_str_field(patch, "from").ok_or(PatchError::MissingFrom)?;
            let copied = pointer::resolve(root, from)
                .ok_or(PatchError::ParentNotFound)?
                .duplicate();
            do_add(root, path, copied)
        }
        "test" => {
            let value = get_field(patch, "value").ok_or(PatchError::MissingValue)?;
            let found = pointer::resolve(root, path).ok_or(PatchError::ParentNotFound)?;
            compare_nodes(found, value).map_err(|kind| PatchError::TestFailed { kind })
        }
        _ => Err(PatchError::UnknownOp),
    }
}

fn do_add(root: &mut Node, path: &str, value: Node) -> Result<(), PatchError> {
    let tokens = pointer::parse_pointer(path);
    let last = tokens.last().cloned().ok_or(PatchError::ParentNotFound)?;
    let parent_pointer = pointer::format_pointer(&tokens[..tokens.len() - 1]);
    let parent =
        pointer::resolve_mut(root, &parent_pointer).ok_or(PatchError::ParentNotFound)?;

    match &mut parent.kind {
        NodeKind::Array(children) => {
            if last == "-" {
                children.push(value);
            } else {
                if !pointer::is_valid_index(&last) {
                    return Err(PatchError::ParentNotFound);
                }
                let idx: usize = last.parse().map_err(|_| PatchError::ParentNotFound)?;
                if idx > children.len() {
                    return Err(PatchError::ParentNotFound);
                }
                children.insert(idx, value);
            }
            Ok(())
        }
        NodeKind::Object(children) => {
            if let Some(pos) = children.iter().position(|c| c.key.as_deref() == Some(last.as_str())) {
                children.remove(pos);
            }
            children.push(value.with_key(last));
            Ok(())
        }
        _ => Err(PatchError::ParentNotFound),
    }
}

fn do_remove(root: &mut Node, path: &str) -> Result<Node, PatchError> {
    let tokens = pointer::parse_pointer(path);
    let last = tokens.last().cloned().ok_or(PatchError::ParentNotFound)?;
    let parent_pointer = pointer::format_pointer(&tokens[..tokens.len() - 1]);
    let parent =
        pointer::resolve_mut(root, &parent_pointer).ok_or(PatchError::ParentNotFound)?;

    match &mut parent.kind {
        NodeKind::Array(children) => {
            if !pointer::is_valid_index(&last) {
                return Err(PatchError::ParentNotFound);
            }
            let idx: usize = last.parse().map_err(|_| PatchError::ParentNotFound)?;
            if idx >= children.len() {
                return Err(PatchError::ParentNotFound);
            }
            Ok(children.remove(idx))
        }
        NodeKind::Object(children) => {
            let pos = children
                .iter()
                .position(|c| c.key.as_deref() == Some(last.as_str()))
                .ok_or(PatchError::ParentNotFound)?;
            Ok(children.remove(pos))
        }
        _ => Err(PatchError::ParentNotFound),
    }
}

/// Structural/value equality used by the `test` op, mirroring the distinct
/// mismatch codes of the reference's compare routine.
fn compare_nodes(a: &Node, b: &Node) -> Result<(), TestFailureKind> {
    if discriminant(&a.kind) != discriminant(&b.kind) {
        return Err(TestFailureKind::TypeMismatch);
    }
    match (&a.kind, &b.kind) {
        (NodeKind::Null, NodeKind::Null) => Ok(()),
        (NodeKind::Bool(x), NodeKind::Bool(y)) => {
            // cJSON represents true/false as distinct item "type" values, so
            // a value mismatch here is, in the reference, a type mismatch.
            if x == y {
                Ok(())
            } else {
                Err(TestFailureKind::TypeMismatch)
            }
        }
        (NodeKind::Number(x), NodeKind::Number(y)) => {
            if x.int == y.int && x.double == y.double {
                Ok(())
            } else {
                Err(TestFailureKind::NumberMismatch)
            }
        }
        (NodeKind::String(x), NodeKind::String(y)) => {
            if x == y {
                Ok(())
            } else {
                Err(TestFailureKind::StringMismatch)
            }
        }
        (NodeKind::Array(x), NodeKind::Array(y)) => {
            if x.len() != y.len() {
                return Err(TestFailureKind::ArraySizeMismatch);
            }
            for (xi, yi) in x.iter().zip(y.iter()) {
                compare_nodes(xi, yi)?;
            }
            Ok(())
        }
        (NodeKind::Object(x), NodeKind::Object(y)) => {
            if x.len() != y.len() {
                return Err(TestFailureKind::ObjectSizeMismatch);
            }
            for member in x {
                let key = member.key.as_deref().unwrap_or("");
                let other = y
                    .iter()
                    .find(|c| c.key.as_deref() == Some(key))
                    .ok_or(TestFailureKind::ObjectKeyMissing)?;
                compare_nodes(member, other)?;
            }
            Ok(())
        }
        (NodeKind::Binary(x), NodeKind::Binary(y)) => {
            if x == y {
                Ok(())
            } else {
                Err(TestFailureKind::TypeMismatch)
            }
        }
        (NodeKind::Uuid(x), NodeKind::Uuid(y)) => {
            if x == y {
                Ok(())
            } else {
                Err(TestFailureKind::TypeMismatch)
            }
        }
        _ => Err(TestFailureKind::TypeMismatch),
    }
}

fn push_op(patches: &mut Vec<Node>, op: &str, path: &str, value: Option<Node>) {
    let mut members = vec![
        Node::string(op).with_key("op"),
        Node::string(path).with_key("path"),
    ];
    if let Some(v) = value {
        members.push(v.with_key("value"));
    }
    patches.push(Node::object(members));
}

/// Generates an `Array` of RFC 6902 patch operations that, applied to
/// `from`, produce a tree structurally equal to `to` — except for the
/// documented array-removal index-drift case below.
///
/// Array diffs walk `from` and `to` in parallel by position using a single
/// shared, continuously-incrementing index counter; once one array runs
/// out, leftover `from` items become `remove` ops addressed at
/// `{path}/{index}` using that same counter, **not** adjusted for the fact
/// that an earlier `remove` in this same sequence shifts later indices down
/// when replayed. A diff against an array that differs in more than one
/// position this way produces a patch sequence whose later removes target
/// stale indices when applied in order. This reproduces the reference
/// implementation's actual behavior rather than "fixing" it.
pub fn diff(from: &Node, to: &Node) -> Node {
    let mut patches = Vec::new();
    compare_to_patch(&mut patches, "", from, to);
    Node::array(patches)
}

fn compare_to_patch(patches: &mut Vec<Node>, path: &str, from: &Node, to: &Node) {
    if discriminant(&from.kind) != discriminant(&to.kind) {
        push_op(patches, "replace", path, Some(to.duplicate()));
        return;
    }
    match (&from.kind, &to.kind) {
        (NodeKind::Null, NodeKind::Null) => {}
        (NodeKind::Bool(a), NodeKind::Bool(b)) => {
            if a != b {
                push_op(patches, "replace", path, Some(to.duplicate()));
            }
        }
        (NodeKind::Number(a), NodeKind::Number(b)) => {
            if a.int != b.int || a.double != b.double {
                push_op(patches, "replace", path, Some(to.duplicate()));
            }
        }
        (NodeKind::String(a), NodeKind::String(b)) => {
            if a != b {
                push_op(patches, "replace", path, Some(to.duplicate()));
            }
        }
        (NodeKind::Binary(a), NodeKind::Binary(b)) => {
            if a != b {
                push_op(patches, "replace", path, Some(to.duplicate()));
            }
        }
        (NodeKind::Uuid(a), NodeKind::Uuid(b)) => {
            if a != b {
                push_op(patches, "replace", path, Some(to.duplicate()));
            }
        }
        (NodeKind::Array(a), NodeKind::Array(b)) => diff_array(patches, path, a, b),
        (NodeKind::Object(a), NodeKind::Object(b)) => diff_object(patches, path, a, b),
        _ => push_op(patches, "replace", path, Some(to.duplicate())),
    }
}

fn diff_array(patches: &mut Vec<Node>, path: &str, from: &[Node], to: &[Node]) {
    let overlap = from.len().min(to.len());
    let mut index = 0usize;

    for i in 0..overlap {
        let child_path = format!("{path}/{index}");
        compare_to_patch(patches, &child_path, &from[i], &to[i]);
        index += 1;
    }

    for item in from.iter().skip(overlap) {
        let _ = item;
        let child_path = format!("{path}/{index}");
        push_op(patches, "remove", &child_path, None);
        index += 1;
    }

    for item in to.iter().skip(overlap) {
        push_op(patches, "add", &format!("{path}/-"), Some(item.duplicate()));
    }
}

fn diff_object(patches: &mut Vec<Node>, path: &str, from: &[Node], to: &[Node]) {
    for member in from {
        let key = member.key.as_deref().unwrap_or("");
        match to.iter().find(|c| c.key.as_deref() == Some(key)) {
            Some(other) => {
                let child_path = format!("{path}/{}", pointer::escape_token(key));
                compare_to_patch(patches, &child_path, member, other);
            }
            None => {
                let child_path = format!("{path}/{}", pointer::escape_token(key));
                push_op(patches, "remove", &child_path, None);
            }
        }
    }
    for member in to {
        let key = member.key.as_deref().unwrap_or("");
        if !from.iter().any(|c| c.key.as_deref() == Some(key)) {
            let child_path = format!("{path}/{}", pointer::escape_token(key));
            push_op(patches, "add", &child_path, Some(member.duplicate()));
        }
    }
}

/// A convenience builder for hand-constructing a patch `Array` without going
/// through [`diff`].
#[derive(Default)]
pub struct PatchBuilder {
    ops: Vec<Node>,
}

impl PatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_add(&mut self, path: impl Into<String>, value: Node) -> &mut Self {
        push_op(&mut self.ops, "add", &path.into(), Some(value));
        self
    }

    pub fn push_remove(&mut self, path: impl Into<String>) -> &mut Self {
        push_op(&mut self.ops, "remove", &path.into(), None);
        self
    }

    pub fn push_replace(&mut self, path: impl Into<String>, value: Node) -> &mut Self {
        push_op(&mut self.ops, "replace", &path.into(), Some(value));
        self
    }

    pub fn push_move(&mut self, from: impl Into<String>, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        self.ops.push(Node::object(vec![
            Node::string("move").with_key("op"),
            Node::string(path).with_key("path"),
            Node::string(from.into()).with_key("from"),
        ]));
        self
    }

    pub fn push_copy(&mut self, from: impl Into<String>, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        self.ops.push(Node::object(vec![
            Node::string("copy").with_key("op"),
            Node::string(path).with_key("path"),
            Node::string(from.into()).with_key("from"),
        ]));
        self
    }

    pub fn push_test(&mut self, path: impl Into<String>, value: Node) -> &mut Self {
        push_op(&mut self.ops, "test", &path.into(), Some(value));
        self
    }

    pub fn build(self) -> Node {
        Node::array(self.ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_to_array_scenario_s5() {
        let mut root = Node::array(vec![Node::int(1), Node::int(2)]);
        let patches = PatchBuilder::new().push_add("/-", Node::int(3)).build();
        apply(&mut root, &patches).unwrap();
        assert_eq!(root, Node::array(vec![Node::int(1), Node::int(2), Node::int(3)]));
    }

    #[test]
    fn top_level_patches_must_be_array() {
        let mut root = Node::object(vec![]);
        let not_an_array = Node::object(vec![]);
        assert_eq!(apply(&mut root, &not_an_array), Err(PatchError::Malformed));
    }

    #[test]
    fn diff_produces_remove_and_add_scenario_s6() {
        let from = Node::object(vec![Node::int(1).with_key("a"), Node::int(2).with_key("b")]);
        let to = Node::object(vec![Node::int(1).with_key("a"), Node::int(3).with_key("c")]);
        let patches = diff(&from, &to);
        let mut applied = from.clone();
        apply(&mut applied, &patches).unwrap();
        assert_eq!(applied.get_object_item("a").unwrap().kind, crate::node::NodeKind::Number(crate::node::Number::from_int(1)));
        assert_eq!(applied.get_object_item("c").unwrap().kind, crate::node::NodeKind::Number(crate::node::Number::from_int(3)));
        assert!(applied.get_object_item("b").is_none());
    }

    #[test]
    fn diff_of_identical_trees_is_empty_and_is_a_fixpoint() {
        let tree = Node::object(vec![Node::int(1).with_key("a")]);
        let patches = diff(&tree, &tree);
        assert_eq!(patches, Node::array(vec![]));
        let mut applied = tree.clone();
        apply(&mut applied, &patches).unwrap();
        assert_eq!(applied, tree);
    }

    #[test]
    fn diff_of_reordered_object_is_empty_and_apply_reconstructs_to() {
        // Same keys/values as `to`, different order: diff should see no
        // member-level change (Object order is non-semantic, §3), and
        // applying that empty patch to `from` should still be `==` to `to`
        // under Node's order-independent Object equality.
        let from = Node::object(vec![Node::int(1).with_key("a"), Node::int(2).with_key("b")]);
        let to = Node::object(vec![Node::int(2).with_key("b"), Node::int(1).with_key("a")]);
        let patches = diff(&from, &to);
        assert_eq!(patches, Node::array(vec![]));
        let mut applied = from.clone();
        apply(&mut applied, &patches).unwrap();
        assert_eq!(applied, to);
    }

    #[test]
    fn move_relocates_node() {
        let mut root = Node::object(vec![
            Node::int(1).with_key("a"),
            Node::object(vec![]).with_key("b"),
        ]);
        let patches = PatchBuilder::new().push_move("/a", "/b/a").build();
        apply(&mut root, &patches).unwrap();
        assert!(root.get_object_item("a").is_none());
        assert!(root.get_object_item("b").unwrap().get_object_item("a").is_some());
    }

    #[test]
    fn test_op_reports_number_mismatch() {
        let root = Node::object(vec![Node::int(1).with_key("a")]);
        let patches = PatchBuilder::new().push_test("/a", Node::int(2)).build();
        let err = apply(&mut root.clone(), &patches).unwrap_err();
        assert_eq!(
            err,
            PatchError::TestFailed {
                kind: TestFailureKind::NumberMismatch
            }
        );
    }
}
