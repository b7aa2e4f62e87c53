// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoder and writer configuration.
//!
//! [`DecodeOptions`] is a small `Copy` value threaded through every view.
//! It can be built fluently or loaded from a TOML [`DecodeConfig`]:
//!
//! ```toml
//! strict = true
//! verify_decompressed_size = true
//! text_encoding = "windows-1252"
//! max_depth = 16
//! ```

use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use serde::Deserialize;
use thiserror::Error;

use super::error::CodecError;

/// Default nesting limit for group recursion.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown text encoding label '{0}'")]
    UnknownEncoding(String),
}

impl From<ConfigError> for CodecError {
    fn from(err: ConfigError) -> Self {
        CodecError::Other(err.to_string())
    }
}

/// Options controlling how a container is decoded.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Report byte-accounting mismatches in group bodies as hard errors
    pub strict: bool,
    /// Require inflated record bodies to match their declared size
    pub verify_decompressed_size: bool,
    /// Encoding of zstring payloads
    pub text_encoding: &'static Encoding,
    /// Maximum group nesting depth
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict: false,
            verify_decompressed_size: true,
            text_encoding: WINDOWS_1252,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Lenient defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict byte accounting.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable verification of inflated body sizes.
    pub fn verify_decompressed_size(mut self, verify: bool) -> Self {
        self.verify_decompressed_size = verify;
        self
    }

    /// Set the zstring encoding.
    pub fn text_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.text_encoding = encoding;
        self
    }

    /// Set the group nesting limit.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Serialized form of [`DecodeOptions`].
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    pub strict: Option<bool>,
    pub verify_decompressed_size: Option<bool>,
    /// WHATWG encoding label, e.g. `"windows-1252"`
    pub text_encoding: Option<String>,
    pub max_depth: Option<usize>,
}

impl DecodeConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply the configured values on top of `base`.
    pub fn apply(&self, base: DecodeOptions) -> Result<DecodeOptions, ConfigError> {
        let mut options = base;
        if let Some(strict) = self.strict {
            options.strict = strict;
        }
        if let Some(verify) = self.verify_decompressed_size {
            options.verify_decompressed_size = verify;
        }
        if let Some(label) = &self.text_encoding {
            options.text_encoding = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| ConfigError::UnknownEncoding(label.clone()))?;
        }
        if let Some(depth) = self.max_depth {
            options.max_depth = depth;
        }
        Ok(options)
    }
}

impl TryFrom<DecodeConfig> for DecodeOptions {
    type Error = ConfigError;

    fn try_from(config: DecodeConfig) -> Result<Self, Self::Error> {
        config.apply(DecodeOptions::default())
    }
}

/// Options for the write path.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Force compression on (`Some(true)`) or off (`Some(false)`) for every
    /// record; `None` keeps each record's own is-compressed flag
    pub compress_records: Option<bool>,
    /// zlib level, 0-9
    pub compression_level: u32,
    /// Emit top-level groups in the canonical label order
    pub canonical_group_order: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress_records: None,
            compression_level: 6,
            canonical_group_order: false,
        }
    }
}
