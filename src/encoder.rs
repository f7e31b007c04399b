//! Writes a [`Node`] tree as a BSON document.

use crate::error::{Error, Result};
use crate::hexutil;
use crate::node::{Node, NodeKind};
use crate::sizer::{self, element_payload_size};
use crate::spec::{
    ELEMENT_TYPE_ARRAY, ELEMENT_TYPE_BINARY, ELEMENT_TYPE_BOOLEAN, ELEMENT_TYPE_DOUBLE,
    ELEMENT_TYPE_EMBEDDED_DOCUMENT, ELEMENT_TYPE_INT64, ELEMENT_TYPE_NULL, ELEMENT_TYPE_STRING,
};
use crate::CodecOptions;

/// Encodes `node` (which must be an `Array` or `Object`) as a BSON document.
///
/// The output buffer is allocated at exactly [`sizer::size_of`] bytes and
/// filled in a single pass; there is no caller-provided buffer to underrun,
/// so this can only fail if `node` is not a container.
pub fn encode(node: &Node, opts: CodecOptions) -> Result<Vec<u8>> {
    if !node.is_container() {
        return Err(Error::not_a_container());
    }
    let mut buf = Vec::with_capacity(sizer::size_of(node, opts));
    write_document(&mut buf, node, opts);
    Ok(buf)
}

fn write_document(buf: &mut Vec<u8>, node: &Node, opts: CodecOptions) {
    let start = buf.len();
    // Placeholder length, back-patched once we know the real size.
    buf.extend_from_slice(&[0u8; 4]);

    let is_array = matches!(node.kind, NodeKind::Array(_));
    for (index, child) in node.children().iter().enumerate() {
        let key = if is_array {
            sizer::array_key(index)
        } else {
            child.key.clone().unwrap_or_default()
        };
        write_element(buf, &key, child, opts);
    }

    buf.push(0x00);

    let len = (buf.len() - start) as i32;
    buf[start..start + 4].copy_from_slice(&len.to_le_bytes());
}

fn write_cstring(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0x00);
}

fn write_string_element(buf: &mut Vec<u8>, s: &str) {
    // int32 length (including NUL terminator) + bytes + NUL.
    buf.extend_from_slice(&((s.len() as i32) + 1).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    buf.push(0x00);
}

fn write_element(buf: &mut Vec<u8>, key: &str, node: &Node, opts: CodecOptions) {
    // Reserve the type byte, fill it in once we know which one to write.
    let type_pos = buf.len();
    buf.push(0x00);
    write_cstring(buf, key);

    let type_byte = match &node.kind {
        NodeKind::Null => ELEMENT_TYPE_NULL,
        NodeKind::Bool(b) => {
            buf.push(if *b { 0x01 } else { 0x00 });
            ELEMENT_TYPE_BOOLEAN
        }
        NodeKind::Number(n) => {
            if n.is_integral() {
                buf.extend_from_slice(&n.int.to_le_bytes());
                ELEMENT_TYPE_INT64
            } else {
                buf.extend_from_slice(&n.double.to_le_bytes());
                ELEMENT_TYPE_DOUBLE
            }
        }
        NodeKind::String(s) => {
            if opts.detect_uuids && hexutil::is_uuid_string(s) {
                let bytes = hexutil::uuid_string_to_bytes(s)
                    .expect("is_uuid_string already validated the format");
                write_binary_payload(buf, 0x04, &bytes);
                ELEMENT_TYPE_BINARY
            } else {
                write_string_element(buf, s);
                ELEMENT_TYPE_STRING
            }
        }
        NodeKind::Array(_) => {
            write_document(buf, node, opts);
            ELEMENT_TYPE_ARRAY
        }
        NodeKind::Object(_) => {
            write_document(buf, node, opts);
            // §4.3 / §9: the original C source emits the array tag (0x04)
            // for both Object and Array payloads. That is a wire-format bug
            // and is not reproduced here.
            ELEMENT_TYPE_EMBEDDED_DOCUMENT
        }
        NodeKind::Binary(b) => {
            write_binary_payload(buf, b.subtype, &b.data);
            ELEMENT_TYPE_BINARY
        }
        NodeKind::Uuid(bytes) => {
            write_binary_payload(buf, 0x04, bytes);
            ELEMENT_TYPE_BINARY
        }
    };

    buf[type_pos] = type_byte;

    debug_assert_eq!(
        buf.len() - type_pos - 1 - key.len() - 1,
        element_payload_size(node, opts),
        "encoder and sizer disagree on payload size"
    );
}

fn write_binary_payload(buf: &mut Vec<u8>, subtype: u8, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as i32).to_le_bytes());
    buf.push(subtype);
    buf.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_empty_document_as_scenario_s1() {
        let doc = Node::object(vec![]);
        let bytes = encode(&doc, CodecOptions::default()).unwrap();
        assert_eq!(bytes, vec![0x05, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn encodes_single_int_field_as_scenario_s2() {
        let doc = Node::object(vec![Node::int(1).with_key("a")]);
        let bytes = encode(&doc, CodecOptions::default()).unwrap();
        let expected: Vec<u8> = vec![
            0x10, 0x00, 0x00, 0x00, // length = 16
            0x12, // int64 type
            b'a', 0x00, // key
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 1i64 LE
            0x00, // terminator
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn object_uses_document_tag_not_array_tag() {
        let doc = Node::object(vec![Node::object(vec![]).with_key("nested")]);
        let bytes = encode(&doc, CodecOptions::default()).unwrap();
        // type byte for the nested element is right after the 4-byte length
        // prefix, key "nested" (7 bytes incl. NUL).
        let type_byte = bytes[4];
        assert_eq!(type_byte, ELEMENT_TYPE_EMBEDDED_DOCUMENT);
    }

    #[test]
    fn array_buffer_is_exactly_sized() {
        let arr = Node::array(vec![Node::int(1), Node::int(2), Node::int(3)]);
        let sized = sizer::size_of(&arr, CodecOptions::default());
        let bytes = encode(&arr, CodecOptions::default()).unwrap();
        assert_eq!(bytes.len(), sized);
        assert_eq!(i32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize, sized);
        assert_eq!(*bytes.last().unwrap(), 0x00);
    }

    #[test]
    fn rejects_leaf_root() {
        assert!(encode(&Node::int(1), CodecOptions::default()).is_err());
    }
}
