// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;

use tes4codec::{DecodeConfig, DecodeOptions, FormId, MmapArena};

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Options shared by every command.
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// TOML decoder configuration
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Treat byte-accounting mismatches as errors
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log decoding details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    /// Decoder options: defaults, then the config file, then `--strict`.
    pub fn decode_options(&self) -> Result<DecodeOptions> {
        let mut options = DecodeOptions::default();
        if let Some(path) = &self.config {
            let config = DecodeConfig::from_file(path)?;
            options = config.apply(options)?;
        }
        if self.strict {
            options = options.strict(true);
        }
        Ok(options)
    }
}

/// Map a file for decoding.
pub fn open_arena(path: &Path) -> Result<MmapArena> {
    MmapArena::open(path).with_context(|| format!("cannot open {}", path.display()))
}

/// Parse a form id written in hex, with or without a `0x` prefix.
pub fn parse_form_id(s: &str) -> CliResult<FormId> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16)
        .map(FormId)
        .map_err(|_| anyhow::anyhow!("Invalid form id: {s}"))
}

/// Format a byte count to human-readable string.
pub fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;

    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}
