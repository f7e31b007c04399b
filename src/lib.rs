//! A BSON encoder/decoder and a JSON Pointer / JSON Patch engine, built over
//! a single shared in-memory tree type ([`Node`]).
//!
//! ```rust
//! use treeson::{decoder, encoder, node::Node, CodecOptions};
//!
//! let doc = Node::object(vec![Node::int(1).with_key("a")]);
//! let bytes = encoder::encode(&doc, CodecOptions::default()).unwrap();
//! let decoded = decoder::decode(&bytes, CodecOptions::default()).unwrap();
//! assert_eq!(doc, decoded);
//! ```

pub mod binary;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod hexutil;
pub mod node;
pub mod patch;
pub mod pointer;
pub mod sizer;
pub mod spec;

#[doc(inline)]
pub use crate::{
    binary::Binary,
    error::{Error, ErrorKind, Result},
    node::{Node, NodeKind, Number},
};

/// Per-call configuration replacing the reference implementation's two
/// process-wide global toggles (`shouldDetectUUIDsInStrings`,
/// `shouldUseExtendedTypes`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {
    /// When encoding, treat a `String` node whose value is a canonical
    /// 8-4-4-4-12 hex UUID as BSON binary subtype `0x04` instead of a plain
    /// string.
    pub detect_uuids: bool,

    /// When decoding, surface BSON binary values as [`NodeKind::Binary`] /
    /// [`NodeKind::Uuid`] nodes instead of lossily converting them to
    /// hex-encoded `String` nodes.
    pub use_extended_types: bool,
}

#[cfg(test)]
mod tests;
