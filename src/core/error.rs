// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for tes4codec.
//!
//! Every decode and encode operation reports one of a small set of kinds:
//! - Truncated data and malformed strings (recoverable per record)
//! - Structural invariant violations (a group where a record belongs, ...)
//! - Size mismatches from strict byte accounting
//! - Compression failures on compressed record bodies

use std::fmt;

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TruncatedData,
    MalformedString,
    StructuralInvariant,
    SizeMismatch,
    CompressionFailure,
    UnknownFlag,
    Unsupported,
    Encode,
    Io,
    Other,
}

/// Errors that can occur while decoding or encoding a container.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// Declared size exceeds the bytes that are actually available
    TruncatedData {
        /// What was being decoded
        context: String,
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Offset of the read, relative to the enclosing region
        offset: u64,
    },

    /// zstring without a terminator, or bytes invalid for the text encoding
    MalformedString {
        /// Subrecord or field being decoded
        context: String,
        /// What is wrong with it
        reason: String,
    },

    /// A node's type tag violates a structural constraint
    StructuralInvariant {
        /// What the decoder expected at this position
        expected: String,
        /// What it found
        found: String,
        /// Offset of the offending node
        offset: u64,
    },

    /// Strict byte accounting failed after decoding a bounded region
    SizeMismatch {
        /// Region being accounted
        context: String,
        /// Declared size
        expected: u64,
        /// Bytes actually consumed
        actual: u64,
    },

    /// Inflating a compressed record body failed
    CompressionFailure {
        /// Record being decompressed
        context: String,
        /// Error message
        message: String,
    },

    /// Lookup of a flag name that the flag set does not define
    UnknownFlag {
        /// Requested flag name
        flag: String,
    },

    /// Unsupported type or feature
    Unsupported {
        /// What is not supported
        feature: String,
    },

    /// Encoding error on the write path
    EncodeError {
        /// Encoder context
        context: String,
        /// Error message
        message: String,
    },

    /// Opening, mapping, reading or writing a file failed
    Io {
        /// Path or stream involved
        context: String,
        /// Error message
        message: String,
    },

    /// Other error
    Other(String),
}

impl CodecError {
    /// Create a truncated data error.
    pub fn truncated(
        context: impl Into<String>,
        requested: usize,
        available: usize,
        offset: u64,
    ) -> Self {
        CodecError::TruncatedData {
            context: context.into(),
            requested,
            available,
            offset,
        }
    }

    /// Create a malformed string error.
    pub fn malformed_string(context: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::MalformedString {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create a structural invariant error.
    pub fn structural(expected: impl Into<String>, found: impl Into<String>, offset: u64) -> Self {
        CodecError::StructuralInvariant {
            expected: expected.into(),
            found: found.into(),
            offset,
        }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(context: impl Into<String>, expected: u64, actual: u64) -> Self {
        CodecError::SizeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create a compression failure.
    pub fn compression(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::CompressionFailure {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an unknown flag error.
    pub fn unknown_flag(flag: impl Into<String>) -> Self {
        CodecError::UnknownFlag { flag: flag.into() }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        CodecError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::EncodeError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(context: impl Into<String>, err: std::io::Error) -> Self {
        CodecError::Io {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::TruncatedData { .. } => ErrorKind::TruncatedData,
            CodecError::MalformedString { .. } => ErrorKind::MalformedString,
            CodecError::StructuralInvariant { .. } => ErrorKind::StructuralInvariant,
            CodecError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            CodecError::CompressionFailure { .. } => ErrorKind::CompressionFailure,
            CodecError::UnknownFlag { .. } => ErrorKind::UnknownFlag,
            CodecError::Unsupported { .. } => ErrorKind::Unsupported,
            CodecError::EncodeError { .. } => ErrorKind::Encode,
            CodecError::Io { .. } => ErrorKind::Io,
            CodecError::Other(_) => ErrorKind::Other,
        }
    }

    /// Whether a record decoder may stop at this error and keep what it has.
    ///
    /// Only truncated data and malformed strings are recoverable at record
    /// granularity; everything else aborts the node being decoded.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TruncatedData | ErrorKind::MalformedString
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::TruncatedData {
                context,
                requested,
                available,
                offset,
            } => vec![
                ("context", context.clone()),
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("offset", offset.to_string()),
            ],
            CodecError::MalformedString { context, reason } => {
                vec![("context", context.clone()), ("reason", reason.clone())]
            }
            CodecError::StructuralInvariant {
                expected,
                found,
                offset,
            } => vec![
                ("expected", expected.clone()),
                ("found", found.clone()),
                ("offset", offset.to_string()),
            ],
            CodecError::SizeMismatch {
                context,
                expected,
                actual,
            } => vec![
                ("context", context.clone()),
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
            CodecError::CompressionFailure { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::UnknownFlag { flag } => vec![("flag", flag.clone())],
            CodecError::Unsupported { feature } => vec![("feature", feature.clone())],
            CodecError::EncodeError { context, message } | CodecError::Io { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::TruncatedData {
                context,
                requested,
                available,
                offset,
            } => write!(
                f,
                "Truncated data in {context}: requested {requested} bytes at offset {offset}, but only {available} bytes available"
            ),
            CodecError::MalformedString { context, reason } => {
                write!(f, "Malformed string in {context}: {reason}")
            }
            CodecError::StructuralInvariant {
                expected,
                found,
                offset,
            } => write!(
                f,
                "Structural invariant violated at offset {offset}: expected {expected}, found {found}"
            ),
            CodecError::SizeMismatch {
                context,
                expected,
                actual,
            } => write!(
                f,
                "Size mismatch in {context}: declared {expected} bytes, consumed {actual} bytes"
            ),
            CodecError::CompressionFailure { context, message } => {
                write!(f, "Decompression failed for {context}: {message}")
            }
            CodecError::UnknownFlag { flag } => write!(f, "Unknown flag: '{flag}'"),
            CodecError::Unsupported { feature } => {
                write!(f, "Unsupported feature: '{feature}'")
            }
            CodecError::EncodeError { context, message } => {
                write!(f, "{context} encode error: {message}")
            }
            CodecError::Io { context, message } => write!(f, "I/O error on {context}: {message}"),
            CodecError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::io("stream", err)
    }
}

/// Result type for tes4codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_error() {
        let err = CodecError::truncated("subrecord EDID", 12, 4, 26);
        assert_eq!(err.kind(), ErrorKind::TruncatedData);
        assert_eq!(
            err.to_string(),
            "Truncated data in subrecord EDID: requested 12 bytes at offset 26, but only 4 bytes available"
        );
    }

    #[test]
    fn test_malformed_string_error() {
        let err = CodecError::malformed_string("FULL", "missing null terminator");
        assert_eq!(err.kind(), ErrorKind::MalformedString);
        assert_eq!(
            err.to_string(),
            "Malformed string in FULL: missing null terminator"
        );
    }

    #[test]
    fn test_structural_error() {
        let err = CodecError::structural("record", "GRUP", 40);
        assert_eq!(err.kind(), ErrorKind::StructuralInvariant);
        assert_eq!(
            err.to_string(),
            "Structural invariant violated at offset 40: expected record, found GRUP"
        );
    }

    #[test]
    fn test_size_mismatch_error() {
        let err = CodecError::size_mismatch("group CLOT", 100, 96);
        assert_eq!(err.kind(), ErrorKind::SizeMismatch);
        assert_eq!(
            err.to_string(),
            "Size mismatch in group CLOT: declared 100 bytes, consumed 96 bytes"
        );
    }

    #[test]
    fn test_compression_error() {
        let err = CodecError::compression("record 0x00000C01", "corrupt deflate stream");
        assert_eq!(err.kind(), ErrorKind::CompressionFailure);
        assert_eq!(
            err.to_string(),
            "Decompression failed for record 0x00000C01: corrupt deflate stream"
        );
    }

    #[test]
    fn test_unknown_flag_error() {
        let err = CodecError::unknown_flag("d");
        assert_eq!(err.kind(), ErrorKind::UnknownFlag);
        assert_eq!(err.to_string(), "Unknown flag: 'd'");
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(CodecError::truncated("x", 1, 0, 0).is_recoverable());
        assert!(CodecError::malformed_string("x", "y").is_recoverable());
        assert!(!CodecError::structural("a", "b", 0).is_recoverable());
        assert!(!CodecError::compression("a", "b").is_recoverable());
        assert!(!CodecError::size_mismatch("a", 1, 2).is_recoverable());
    }

    #[test]
    fn test_log_fields_truncated() {
        let err = CodecError::truncated("ctx", 100, 50, 10);
        let fields = err.log_fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], ("context", "ctx".to_string()));
        assert_eq!(fields[1], ("requested", "100".to_string()));
        assert_eq!(fields[2], ("available", "50".to_string()));
        assert_eq!(fields[3], ("offset", "10".to_string()));
    }

    #[test]
    fn test_log_fields_structural() {
        let err = CodecError::structural("TES4", "GRUP", 0);
        let fields = err.log_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].0, "expected");
        assert_eq!(fields[1].1, "GRUP");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CodecError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.to_string(), "I/O error on stream: file not found");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_clone() {
        let err1 = CodecError::size_mismatch("ctx", 1, 2);
        let err2 = err1.clone();
        assert_eq!(err1.to_string(), err2.to_string());
    }
}
