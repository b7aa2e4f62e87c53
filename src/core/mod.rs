// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout tes4codec.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Error taxonomy shared by every decoder
//! - [`Tag`] - Four-byte type tags
//! - [`FieldValue`] - Decoded subrecord payload values
//! - [`DecodeOptions`] - Decoder configuration

pub mod config;
pub mod error;
pub mod tag;
pub mod value;

pub use config::{ConfigError, DecodeConfig, DecodeOptions, WriteOptions};
pub use error::{CodecError, ErrorKind, Result};
pub use tag::Tag;
pub use value::{FieldValue, FormId, ItemData};
