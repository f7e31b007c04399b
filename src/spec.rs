//! BSON wire-format tag constants.
//!
//! Mirrors the tag tables in the BSON specification (and in the `cBSON_*`
//! macros of the C implementation this crate grew out of): one `u8` constant
//! per element type tag, plus the binary subtype tags.

/// 64-bit binary floating point.
pub const ELEMENT_TYPE_DOUBLE: u8 = 0x01;
/// UTF-8 string.
pub const ELEMENT_TYPE_STRING: u8 = 0x02;
/// Embedded document.
pub const ELEMENT_TYPE_EMBEDDED_DOCUMENT: u8 = 0x03;
/// Array.
pub const ELEMENT_TYPE_ARRAY: u8 = 0x04;
/// Binary data.
pub const ELEMENT_TYPE_BINARY: u8 = 0x05;
/// Undefined (deprecated); decodes as [`crate::node::NodeKind::Null`].
pub const ELEMENT_TYPE_UNDEFINED: u8 = 0x06;
/// ObjectId; unsupported, always a decode error.
pub const ELEMENT_TYPE_OBJECT_ID: u8 = 0x07;
/// Boolean.
pub const ELEMENT_TYPE_BOOLEAN: u8 = 0x08;
/// UTC datetime; decodes as a plain integer (milliseconds).
pub const ELEMENT_TYPE_UTC_DATETIME: u8 = 0x09;
/// Null value.
pub const ELEMENT_TYPE_NULL: u8 = 0x0A;
/// Regular expression (pattern, options).
pub const ELEMENT_TYPE_REGEX: u8 = 0x0B;
/// DBPointer (deprecated); unsupported, always a decode error.
pub const ELEMENT_TYPE_DB_POINTER: u8 = 0x0C;
/// JavaScript code; decodes like a string.
pub const ELEMENT_TYPE_JAVASCRIPT_CODE: u8 = 0x0D;
/// Symbol (deprecated); decodes like a string.
pub const ELEMENT_TYPE_SYMBOL: u8 = 0x0E;
/// JavaScript code with scope (deprecated); unsupported, always a decode error.
pub const ELEMENT_TYPE_JAVASCRIPT_CODE_WITH_SCOPE: u8 = 0x0F;
/// 32-bit integer.
pub const ELEMENT_TYPE_INT32: u8 = 0x10;
/// Replication timestamp; decodes as a plain integer.
pub const ELEMENT_TYPE_TIMESTAMP: u8 = 0x11;
/// 64-bit integer.
pub const ELEMENT_TYPE_INT64: u8 = 0x12;
/// Minimum key sentinel; decodes as [`crate::node::NodeKind::Null`].
pub const ELEMENT_TYPE_MIN_KEY: u8 = 0xFF;
/// Maximum key sentinel; decodes as [`crate::node::NodeKind::Null`].
pub const ELEMENT_TYPE_MAX_KEY: u8 = 0x7F;

/// A decoded document's key sequence, as used to classify it as an object
/// element type versus an array element type on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum ElementType {
    Double = ELEMENT_TYPE_DOUBLE,
    String = ELEMENT_TYPE_STRING,
    EmbeddedDocument = ELEMENT_TYPE_EMBEDDED_DOCUMENT,
    Array = ELEMENT_TYPE_ARRAY,
    Binary = ELEMENT_TYPE_BINARY,
    Undefined = ELEMENT_TYPE_UNDEFINED,
    ObjectId = ELEMENT_TYPE_OBJECT_ID,
    Boolean = ELEMENT_TYPE_BOOLEAN,
    UtcDatetime = ELEMENT_TYPE_UTC_DATETIME,
    Null = ELEMENT_TYPE_NULL,
    RegularExpression = ELEMENT_TYPE_REGEX,
    DbPointer = ELEMENT_TYPE_DB_POINTER,
    JavaScriptCode = ELEMENT_TYPE_JAVASCRIPT_CODE,
    Symbol = ELEMENT_TYPE_SYMBOL,
    JavaScriptCodeWithScope = ELEMENT_TYPE_JAVASCRIPT_CODE_WITH_SCOPE,
    Int32 = ELEMENT_TYPE_INT32,
    Timestamp = ELEMENT_TYPE_TIMESTAMP,
    Int64 = ELEMENT_TYPE_INT64,
    MinKey = ELEMENT_TYPE_MIN_KEY,
    MaxKey = ELEMENT_TYPE_MAX_KEY,
}

impl ElementType {
    /// Parses a BSON type tag byte into an [`ElementType`], if recognized.
    ///
    /// A `None` return means the tag is entirely unknown (not just
    /// unsupported) and decoding should fail with a malformed-bytes error
    /// rather than an unsupported-element error.
    pub fn from(tag: u8) -> Option<ElementType> {
        use ElementType::*;
        Some(match tag {
            ELEMENT_TYPE_DOUBLE => Double,
            ELEMENT_TYPE_STRING => String,
            ELEMENT_TYPE_EMBEDDED_DOCUMENT => EmbeddedDocument,
            ELEMENT_TYPE_ARRAY => Array,
            ELEMENT_TYPE_BINARY => Binary,
            ELEMENT_TYPE_UNDEFINED => Undefined,
            ELEMENT_TYPE_OBJECT_ID => ObjectId,
            ELEMENT_TYPE_BOOLEAN => Boolean,
            ELEMENT_TYPE_UTC_DATETIME => UtcDatetime,
            ELEMENT_TYPE_NULL => Null,
            ELEMENT_TYPE_REGEX => RegularExpression,
            ELEMENT_TYPE_DB_POINTER => DbPointer,
            ELEMENT_TYPE_JAVASCRIPT_CODE => JavaScriptCode,
            ELEMENT_TYPE_SYMBOL => Symbol,
            ELEMENT_TYPE_JAVASCRIPT_CODE_WITH_SCOPE => JavaScriptCodeWithScope,
            ELEMENT_TYPE_INT32 => Int32,
            ELEMENT_TYPE_TIMESTAMP => Timestamp,
            ELEMENT_TYPE_INT64 => Int64,
            ELEMENT_TYPE_MIN_KEY => MinKey,
            ELEMENT_TYPE_MAX_KEY => MaxKey,
            _ => return None,
        })
    }

    /// `true` if this tag is recognized by the wire format but not
    /// implemented by this crate's decoder.
    pub fn is_unsupported(self) -> bool {
        matches!(
            self,
            ElementType::ObjectId | ElementType::DbPointer | ElementType::JavaScriptCodeWithScope
        )
    }
}

/// BSON binary subtype tag: `0x00` generic through `0x05` MD5, plus the
/// user-defined range `0x80..=0xFF`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BinarySubtype {
    Generic,
    Function,
    BinaryOld,
    UuidOld,
    Uuid,
    Md5,
    UserDefined(u8),
}

impl From<BinarySubtype> for u8 {
    fn from(subtype: BinarySubtype) -> Self {
        match subtype {
            BinarySubtype::Generic => 0x00,
            BinarySubtype::Function => 0x01,
            BinarySubtype::BinaryOld => 0x02,
            BinarySubtype::UuidOld => 0x03,
            BinarySubtype::Uuid => 0x04,
            BinarySubtype::Md5 => 0x05,
            BinarySubtype::UserDefined(tag) => tag,
        }
    }
}

impl From<u8> for BinarySubtype {
    fn from(tag: u8) -> Self {
        match tag {
            0x00 => BinarySubtype::Generic,
            0x01 => BinarySubtype::Function,
            0x02 => BinarySubtype::BinaryOld,
            0x03 => BinarySubtype::UuidOld,
            0x04 => BinarySubtype::Uuid,
            0x05 => BinarySubtype::Md5,
            other => BinarySubtype::UserDefined(other),
        }
    }
}
