// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # tes4codec
//!
//! Reader and writer for TES4 plugin (`.esp`) and master (`.esm`) files.
//!
//! A file is a `TES4` header record followed by nested groups of records,
//! each record holding a sequence of typed subrecords. Decoding is lazy and
//! zero-copy over a borrowed (usually memory-mapped) buffer:
//! - **Containers, groups, records** in [`io::formats::tes4`](crate::io::formats::tes4)
//! - **Subrecord interpretation** through the [`schema`] table
//! - **Byte views** and the bounded sub-stream in [`encoding`]
//! - **Tree view** for presentation layers in [`tree`]
//!
//! ## Example: Listing records
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tes4codec::{Container, MmapArena, Tag};
//!
//! let arena = MmapArena::open("Oblivion.esm")?;
//! let container = Container::new(arena.data())?;
//! if let Some(group) = container.group(Tag::new(b"CLOT"))? {
//!     for record in group.records()? {
//!         println!("{} {}", record.form_id(), record.label());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Repacking
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tes4codec::{Container, ContainerWriter, MmapArena, WriteOptions};
//!
//! let arena = MmapArena::open("input.esp")?;
//! let container = Container::new(arena.data())?;
//! let options = WriteOptions {
//!     compress_records: Some(false),
//!     ..WriteOptions::default()
//! };
//! let mut writer = ContainerWriter::create("output.esp", options)?;
//! writer.copy_container(&container)?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{
    CodecError, DecodeConfig, DecodeOptions, ErrorKind, FieldValue, FormId, ItemData, Result, Tag,
    WriteOptions,
};

// Byte views, bounded reads, text and compression
pub mod encoding;

// Subrecord interpretation
pub mod schema;

// I/O types (arena, detection, container format)
pub mod io;

// Re-export key I/O types
pub use io::formats::tes4::{
    Child, Container, ContainerWriter, DecodeContext, Group, GroupBuilder, GroupKind, Record,
    RecordBuilder, SubRecord, SubRecordBuilder, VcInfo,
};
pub use io::{detect_kind, FileKind, MmapArena};

// Presentation contract
pub mod tree;

pub use schema::{default_schema, Interpreter, SchemaTable};
pub use tree::{Node, TreeSource};
