// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for TES4 containers.
//!
//! This module provides memory-mapped file access, file kind detection and
//! the container format itself.

pub mod arena;
pub mod detection;
pub mod formats;

// Re-exports
pub use arena::MmapArena;
pub use detection::{detect_from_header, detect_kind, is_tes4_file, FileKind};
pub use formats::tes4::{Container, ContainerWriter, Group, Record, SubRecord};
