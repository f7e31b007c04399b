//! Hex formatting and UUID-in-string detection.
//!
//! Grounded on the original C codec's `bson_is_string_uuid` /
//! `encode_hex_string` / `decode_hex_string` / `bson_uuid_value_from_string`
//! helpers, re-expressed atop the `hex` and `uuid` crates instead of
//! hand-rolled nibble arithmetic.

use crate::error::{Error, Result};

/// `true` if `s` is a canonical 8-4-4-4-12 hex UUID string (case-insensitive),
/// e.g. `"550e8400-e29b-41d4-a716-446655440000"`.
pub fn is_uuid_string(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, &b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if b != b'-' {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            }
        }
    }
    true
}

/// Parses a canonical UUID string into its 16 raw bytes.
///
/// Assumes `is_uuid_string(s)` has already been checked; returns a
/// malformed-bytes error if parsing fails anyway.
pub fn uuid_string_to_bytes(s: &str) -> Result<[u8; 16]> {
    let uuid = uuid::Uuid::parse_str(s)
        .map_err(|e| Error::malformed_bytes(format!("invalid UUID string: {e}")))?;
    Ok(*uuid.as_bytes())
}

/// Formats 16 raw bytes as a canonical lowercase UUID string.
pub fn uuid_bytes_to_string(bytes: &[u8; 16]) -> String {
    uuid::Uuid::from_bytes(*bytes).to_string()
}

/// Formats arbitrary bytes as a lowercase hex string, for binary subtypes
/// other than UUID when extended types are disabled.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Parses a lowercase (or uppercase) hex string back into bytes.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| Error::malformed_bytes(format!("invalid hex string: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_canonical_uuid() {
        assert!(is_uuid_string("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_uuid_string("550E8400-E29B-41D4-A716-446655440000"));
    }

    #[test]
    fn rejects_non_uuid() {
        assert!(!is_uuid_string("not-a-uuid"));
        assert!(!is_uuid_string("550e8400-e29b-41d4-a716-44665544000")); // too short
        assert!(!is_uuid_string("550e8400xe29b-41d4-a716-446655440000")); // bad separator
    }

    #[test]
    fn uuid_round_trips() {
        let s = "550e8400-e29b-41d4-a716-446655440000";
        let bytes = uuid_string_to_bytes(s).unwrap();
        assert_eq!(uuid_bytes_to_string(&bytes), s);
    }

    #[test]
    fn hex_round_trips() {
        let bytes = vec![0u8, 1, 2, 254, 255];
        let s = bytes_to_hex(&bytes);
        assert_eq!(hex_to_bytes(&s).unwrap(), bytes);
    }
}
