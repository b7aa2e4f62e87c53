// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! File format implementations.
//!
//! - [`tes4`]: TES4 plugin (`.esp`) and master (`.esm`) containers

pub mod tes4;
