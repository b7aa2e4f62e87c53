// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! zlib compression of record bodies.
//!
//! A compressed record body is `decompressed_size: u32` followed by a
//! standard zlib stream covering the rest of the declared body.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::debug;

use crate::{CodecError, Result};

/// Upper bound on the preallocation per compressed input byte.
const PREALLOC_RATIO: usize = 16;

/// Inflate `compressed`, expecting exactly `expected_size` bytes of output.
///
/// The declared size is a hard ceiling: a stream that inflates past it is
/// a compression failure as soon as the first extra byte appears. With
/// `verify` set, a short stream is a failure too; otherwise it is accepted
/// as-is.
pub fn inflate(compressed: &[u8], expected_size: u32, verify: bool, context: &str) -> Result<Vec<u8>> {
    debug!(
        context,
        compressed = compressed.len(),
        expected = expected_size,
        "inflating record body"
    );
    let limit = u64::from(expected_size);
    let capacity = (expected_size as usize).min(compressed.len().saturating_mul(PREALLOC_RATIO));
    let mut out = Vec::with_capacity(capacity);
    ZlibDecoder::new(compressed)
        .take(limit + 1)
        .read_to_end(&mut out)
        .map_err(|e| CodecError::compression(context, format!("zlib inflate failed: {e}")))?;

    if out.len() as u64 > limit {
        return Err(CodecError::compression(
            context,
            format!("inflates past the declared {expected_size} bytes"),
        ));
    }
    if verify && out.len() != expected_size as usize {
        return Err(CodecError::compression(
            context,
            format!(
                "inflated to {} bytes, declared {} bytes",
                out.len(),
                expected_size
            ),
        ));
    }
    Ok(out)
}

/// Deflate `data` at the given zlib level (0-9).
pub fn deflate(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder
        .write_all(data)
        .map_err(|e| CodecError::encode("zlib", e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CodecError::encode("zlib", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_inflate() {
        let data = b"EDID\x05\x00robe\0".repeat(20);
        let packed = deflate(&data, 6).unwrap();
        assert!(packed.len() < data.len());
        let unpacked = inflate(&packed, data.len() as u32, true, "test").unwrap();
        assert_eq!(unpacked, data);
    }

    #[test]
    fn test_inflate_size_mismatch() {
        let packed = deflate(b"abcdef", 6).unwrap();
        let err = inflate(&packed, 10, true, "test").unwrap_err();
        assert!(matches!(err, CodecError::CompressionFailure { .. }));
        // Lenient mode keeps what was inflated.
        assert_eq!(inflate(&packed, 10, false, "test").unwrap(), b"abcdef");
    }

    #[test]
    fn test_inflate_stops_at_declared_size() {
        let packed = deflate(&vec![0u8; 1 << 20], 9).unwrap();
        assert!(packed.len() < 4096);
        for verify in [true, false] {
            match inflate(&packed, 4, verify, "test").unwrap_err() {
                CodecError::CompressionFailure { message, .. } => {
                    assert!(message.contains("declared 4 bytes"), "{message}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        // Exact fit is still fine.
        let out = inflate(&packed, 1 << 20, true, "test").unwrap();
        assert_eq!(out.len(), 1 << 20);
    }

    #[test]
    fn test_inflate_corrupt_stream() {
        let err = inflate(b"\x00\x01\x02\x03garbage", 4, true, "test").unwrap_err();
        assert!(matches!(err, CodecError::CompressionFailure { .. }));
    }
}
