//! The `Binary` extension type: an opaque BSON binary value with a subtype
//! tag, surfaced on a [`crate::node::Node`] only when
//! [`crate::CodecOptions::use_extended_types`] is enabled.

use std::fmt::{self, Display};

use crate::hexutil;

/// A BSON binary value: a subtype tag plus the raw bytes.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: u8,
    /// The binary bytes.
    pub data: Vec<u8>,
}

impl Binary {
    /// Creates a new [`Binary`] with the given subtype tag and bytes.
    pub fn new(subtype: u8, data: Vec<u8>) -> Self {
        Binary { subtype, data }
    }
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "Binary(0x{:02x}, {})",
            self.subtype,
            hexutil::bytes_to_hex(&self.data)
        )
    }
}
