//! RFC 6901 JSON Pointer resolution over a [`Node`] tree.
//!
//! Deliberately deviates from RFC 6901 in one respect, inherited unchanged
//! from the reference C implementation: object-key matching is
//! case-insensitive. This is documented here, not "fixed", since it is an
//! intentional, preserved behavior.

use crate::node::{Node, NodeKind};

/// Unescapes one pointer token: `~1` -> `/`, `~0` -> `~`.
pub fn unescape_token(token: &str) -> String {
    // Order matters: unescape ~1 before ~0 so that `~01` doesn't become `/`.
    token.replace("~1", "/").replace("~0", "~")
}

/// Escapes one pointer token: `~` -> `~0`, `/` -> `~1`.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Splits a pointer string (e.g. `"/a/b~1c/0"`) into unescaped tokens.
/// The empty string parses to an empty token list (the document root).
pub fn parse_pointer(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        Vec::new()
    } else {
        pointer[1..].split('/').map(unescape_token).collect()
    }
}

/// Joins tokens back into a pointer string.
pub fn format_pointer(tokens: &[String]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push('/');
        out.push_str(&escape_token(token));
    }
    out
}

fn case_insensitive_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// `true` if `token` is a valid array index: all ASCII digits, with no
/// leading zero unless the token is exactly `"0"`.
pub fn is_valid_index(token: &str) -> bool {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    token == "0" || !token.starts_with('0')
}

/// Resolves `pointer` against `root`, returning the addressed node if found.
///
/// The token `"-"` (one-past-end of an array) never resolves to an existing
/// node; it is only meaningful to [`crate::patch::apply`]'s `add` operation.
pub fn resolve<'a>(root: &'a Node, pointer: &str) -> Option<&'a Node> {
    let tokens = parse_pointer(pointer);
    resolve_tokens(root, &tokens)
}

fn resolve_tokens<'a>(root: &'a Node, tokens: &[String]) -> Option<&'a Node> {
    let mut current = root;
    for token in tokens {
        current = match &current.kind {
            NodeKind::Array(children) => {
                if !is_valid_index(token) {
                    return None;
                }
                let index: usize = token.parse().ok()?;
                children.get(index)?
            }
            NodeKind::Object(children) => children
                .iter()
                .find(|c| c.key.as_deref().is_some_and(|k| case_insensitive_eq(k, token)))?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`resolve`], used internally by [`crate::patch`].
pub fn resolve_mut<'a>(root: &'a mut Node, pointer: &str) -> Option<&'a mut Node> {
    let tokens = parse_pointer(pointer);
    resolve_tokens_mut(root, &tokens)
}

fn resolve_tokens_mut<'a>(root: &'a mut Node, tokens: &[String]) -> Option<&'a mut Node> {
    let mut current = root;
    for token in tokens {
        current = match &mut current.kind {
            NodeKind::Array(children) => {
                if !is_valid_index(token) {
                    return None;
                }
                let index: usize = token.parse().ok()?;
                children.get_mut(index)?
            }
            NodeKind::Object(children) => children
                .iter_mut()
                .find(|c| c.key.as_deref().is_some_and(|k| case_insensitive_eq(k, token)))?,
            _ => return None,
        };
    }
    Some(current)
}

/// Finds the RFC 6901 pointer string addressing the node in `root`
/// identical (by pointer identity, not structural equality) to `target`.
///
/// Performs a pre-order depth-first search. Array children contribute their
/// numeric index to the path; object children contribute their escaped key.
pub fn reverse_pointer(root: &Node, target: &Node) -> Option<String> {
    let mut path = Vec::new();
    if find_path(root, target, &mut path) {
        Some(format_pointer(&path))
    } else {
        None
    }
}

fn find_path(current: &Node, target: &Node, path: &mut Vec<String>) -> bool {
    if std::ptr::eq(current, target) {
        return true;
    }
    match &current.kind {
        NodeKind::Array(children) => {
            for (index, child) in children.iter().enumerate() {
                path.push(index.to_string());
                if find_path(child, target, path) {
                    return true;
                }
                path.pop();
            }
            false
        }
        NodeKind::Object(children) => {
            for child in children {
                path.push(child.key.clone().unwrap_or_default());
                if find_path(child, target, path) {
                    return true;
                }
                path.pop();
            }
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn escape_round_trips() {
        let key = "a/b~c";
        assert_eq!(unescape_token(&escape_token(key)), key);
    }

    #[test]
    fn resolves_escaped_slash_scenario_s4() {
        let root = Node::object(vec![Node::int(42).with_key("a/b")]);
        let found = resolve(&root, "/a~1b").unwrap();
        assert_eq!(found.kind, crate::node::NodeKind::Number(crate::node::Number::from_int(42)));
    }

    #[test]
    fn object_lookup_is_case_insensitive() {
        let root = Node::object(vec![Node::int(1).with_key("Foo")]);
        assert!(resolve(&root, "/foo").is_some());
        assert!(resolve(&root, "/FOO").is_some());
    }

    #[test]
    fn reverse_pointer_finds_nested_node() {
        let root = Node::object(vec![Node::array(vec![Node::int(1), Node::int(2)]).with_key("arr")]);
        let target = root.get_object_item("arr").unwrap().get_array_item(1).unwrap();
        let pointer = reverse_pointer(&root, target).unwrap();
        assert_eq!(pointer, "/arr/1");
        assert!(std::ptr::eq(resolve(&root, &pointer).unwrap(), target));
    }

    #[test]
    fn dash_token_never_resolves() {
        let root = Node::array(vec![Node::int(1)]);
        assert!(resolve(&root, "/-").is_none());
    }
}
