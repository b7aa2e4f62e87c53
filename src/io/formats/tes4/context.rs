// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared decoding context.

use crate::core::config::DecodeOptions;
use crate::schema::{default_schema, SchemaTable};

/// Schema table and options carried by every view.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub schema: &'a SchemaTable,
    pub options: DecodeOptions,
}

impl<'a> DecodeContext<'a> {
    pub fn new(schema: &'a SchemaTable, options: DecodeOptions) -> Self {
        Self { schema, options }
    }
}

impl DecodeContext<'static> {
    /// Built-in schema with the given options.
    pub fn with_options(options: DecodeOptions) -> Self {
        Self::new(default_schema(), options)
    }
}

impl Default for DecodeContext<'static> {
    fn default() -> Self {
        Self::with_options(DecodeOptions::default())
    }
}
