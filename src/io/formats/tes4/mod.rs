// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TES4 container implementation.
//!
//! This module provides a lazy, zero-copy decoder and a matching writer:
//! - Container header and top-level group scan
//! - Groups and records decoded on demand, memoized per view
//! - zlib-compressed record bodies
//! - Builders that re-encode decoded data byte for byte

// Header layouts, flag bits and the canonical group order
pub mod constants;

// Schema and options shared by every view
pub mod context;

// Decoded views
pub mod container;
pub mod group;
pub mod record;
pub mod subrecord;

// Writer implementation
pub mod writer;

// Re-exports
pub use container::Container;
pub use context::DecodeContext;
pub use group::{Child, ChildIter, Group, GroupChildren, GroupKind};
pub use record::{Record, RecordFields, VcInfo};
pub use subrecord::{SubRecord, SubRecordIter};
pub use writer::{ChildBuilder, ContainerWriter, GroupBuilder, RecordBuilder, SubRecordBuilder};
