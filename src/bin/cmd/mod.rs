// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod inspect;
mod repack;

pub use inspect::InspectCmd;
pub use repack::RepackCmd;
