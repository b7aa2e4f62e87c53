// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven subrecord interpretation.
//!
//! This module provides:
//! - [`Interpreter`] - two-way payload interpretations
//! - [`catalog`] - the static declaration list
//! - [`SchemaTable`] - the expanded lookup, with a process-wide default

pub mod catalog;
pub mod interpreter;
pub mod table;

pub use catalog::{Declaration, BIPED_FLAGS, HEADER_DATA, OFFSET_ENTRY, WILDCARD};
pub use interpreter::Interpreter;
pub use table::{default_schema, Resolution, SchemaTable, SchemaTableBuilder};
