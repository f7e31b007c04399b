//! Computes the exact encoded byte length of a [`Node`] tree, so the encoder
//! can allocate its output buffer at exactly the right size instead of
//! growing it as it goes.

use crate::hexutil;
use crate::node::{Node, NodeKind};
use crate::CodecOptions;

/// The number of decimal digits in the key the encoder will generate for the
/// array child at position `index` (`"0"`, `"1"`, ... `"9"`, `"10"`, ...).
///
/// Implemented as bucket arithmetic rather than `index.to_string().len()`:
/// the first 10 positions (`0..=9`) need 1 digit, the next 90 (`10..=99`)
/// need 2, the next 900 (`100..=999`) need 3, and so on. This is the same
/// helper the encoder calls when writing array keys, so the two can never
/// disagree about how wide a given index's key is.
pub fn array_key_digits(index: usize) -> usize {
    let mut digits = 1usize;
    let mut bucket_ceiling = 10usize;
    while index >= bucket_ceiling {
        digits += 1;
        match bucket_ceiling.checked_mul(10) {
            Some(next) => bucket_ceiling = next,
            None => break,
        }
    }
    digits
}

/// The key string the encoder writes for the array child at position
/// `index`. Called by both `sizer` (to size the key) and `encoder` (to write
/// it), so the two can never disagree about what an array key looks like;
/// the `debug_assert` ties this function's output back to
/// `array_key_digits`'s bucket arithmetic rather than letting them drift
/// independently.
pub fn array_key(index: usize) -> String {
    let key = index.to_string();
    debug_assert_eq!(key.len(), array_key_digits(index));
    key
}

/// Returns the exact encoded size, in bytes, of `node` as a BSON document
/// root. `node` must be an `Array` or `Object`; use [`element_payload_size`]
/// for a non-root value.
pub fn size_of(node: &Node, opts: CodecOptions) -> usize {
    document_size(node, opts)
}

fn document_size(node: &Node, opts: CodecOptions) -> usize {
    let is_array = matches!(node.kind, NodeKind::Array(_));
    let children = node.children();

    // 4-byte length prefix + 1-byte terminator.
    let mut size = 4usize + 1;

    for (index, child) in children.iter().enumerate() {
        let key_len = if is_array {
            array_key_digits(index)
        } else {
            child.key.as_deref().unwrap_or("").len()
        };
        // type byte + key bytes + key NUL terminator + payload.
        size += 1 + key_len + 1 + element_payload_size(child, opts);
    }

    size
}

/// The encoded payload size of a single element, excluding its type byte and
/// key bytes.
pub fn element_payload_size(node: &Node, opts: CodecOptions) -> usize {
    match &node.kind {
        NodeKind::Null => 0,
        NodeKind::Bool(_) => 1,
        NodeKind::Number(_) => 8,
        NodeKind::String(s) => {
            if opts.detect_uuids && hexutil::is_uuid_string(s) {
                // int32 length + 1 subtype byte + 16 raw UUID bytes.
                4 + 1 + 16
            } else {
                4 + s.len() + 1
            }
        }
        NodeKind::Array(_) | NodeKind::Object(_) => document_size(node, opts),
        NodeKind::Binary(b) => 4 + 1 + b.data.len(),
        NodeKind::Uuid(_) => 4 + 1 + 16,
    }
}
