// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Null-terminated strings ("zstrings") in an 8-bit text encoding.
//!
//! The payload of a zstring subrecord is the encoded text followed by exactly
//! one `0x00`. The text itself must not contain a null byte.

use encoding_rs::Encoding;

use crate::{CodecError, Result};

/// Decode a zstring payload.
///
/// Fails with a malformed string error when the final byte is not a null
/// terminator, when a null appears before the end, or when the bytes are not
/// valid in `encoding`.
pub fn decode_zstring(payload: &[u8], encoding: &'static Encoding, context: &str) -> Result<String> {
    let Some((&last, text)) = payload.split_last() else {
        return Err(CodecError::malformed_string(context, "empty payload"));
    };
    if last != 0 {
        return Err(CodecError::malformed_string(
            context,
            "missing null terminator",
        ));
    }
    if let Some(pos) = text.iter().position(|&b| b == 0) {
        return Err(CodecError::malformed_string(
            context,
            format!("embedded null at byte {pos}"),
        ));
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(text)
        .map(|s| s.into_owned())
        .ok_or_else(|| {
            CodecError::malformed_string(context, format!("invalid {} text", encoding.name()))
        })
}

/// Encode text as a zstring payload (text bytes plus terminator).
pub fn encode_zstring(text: &str, encoding: &'static Encoding, out: &mut Vec<u8>) -> Result<()> {
    if text.contains('\0') {
        return Err(CodecError::encode("zstring", "text contains a null character"));
    }
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        return Err(CodecError::encode(
            "zstring",
            format!("{text:?} is not representable in {}", encoding.name()),
        ));
    }
    out.extend_from_slice(&bytes);
    out.push(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1252};

    #[test]
    fn test_decode_zstring() {
        let s = decode_zstring(b"Ciirta's Robes\0", WINDOWS_1252, "FULL").unwrap();
        assert_eq!(s, "Ciirta's Robes");
        assert_eq!(s.len(), 14);
    }

    #[test]
    fn test_decode_high_bytes() {
        let s = decode_zstring(b"Caf\xe9\0", WINDOWS_1252, "FULL").unwrap();
        assert_eq!(s, "Caf\u{e9}");
    }

    #[test]
    fn test_decode_missing_terminator() {
        let err = decode_zstring(b"abc", WINDOWS_1252, "EDID").unwrap_err();
        assert!(matches!(err, CodecError::MalformedString { .. }));
        let err = decode_zstring(b"", WINDOWS_1252, "EDID").unwrap_err();
        assert!(matches!(err, CodecError::MalformedString { .. }));
    }

    #[test]
    fn test_decode_embedded_null() {
        let err = decode_zstring(b"ab\0c\0", WINDOWS_1252, "EDID").unwrap_err();
        assert!(err.to_string().contains("embedded null"));
    }

    #[test]
    fn test_decode_invalid_sequence() {
        let err = decode_zstring(b"\xff\xfe\0", UTF_8, "EDID").unwrap_err();
        assert!(matches!(err, CodecError::MalformedString { .. }));
    }

    #[test]
    fn test_encode_zstring() {
        let mut out = Vec::new();
        encode_zstring("Caf\u{e9}", WINDOWS_1252, &mut out).unwrap();
        assert_eq!(out, b"Caf\xe9\0");
    }

    #[test]
    fn test_encode_rejects_null_and_unmappable() {
        let mut out = Vec::new();
        assert!(encode_zstring("a\0b", WINDOWS_1252, &mut out).is_err());
        assert!(encode_zstring("\u{4e2d}", WINDOWS_1252, &mut out).is_err());
    }
}
