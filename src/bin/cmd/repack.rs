// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Repack command - re-encode a container through the writer.

use std::path::PathBuf;

use clap::Args;

use crate::common::{format_size, open_arena, GlobalOpts, Result};
use tes4codec::{Container, ContainerWriter, WriteOptions};

/// Re-encode a container.
#[derive(Args, Clone, Debug)]
pub struct RepackCmd {
    /// Input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Compress every record body
    #[arg(long, conflicts_with = "decompress")]
    compress: bool,

    /// Store every record body uncompressed
    #[arg(long)]
    decompress: bool,

    /// zlib level for compressed bodies (0-9)
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
    level: u32,

    /// Sort top-level groups into the canonical order
    #[arg(long)]
    canonical_order: bool,
}

impl RepackCmd {
    fn write_options(&self) -> WriteOptions {
        let compress_records = match (self.compress, self.decompress) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        WriteOptions {
            compress_records,
            compression_level: self.level,
            canonical_group_order: self.canonical_order,
        }
    }

    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        println!("Repacking:");
        println!("  Input:  {}", self.input.display());
        println!("  Output: {}", self.output.display());

        let arena = open_arena(&self.input)?;
        let container = Container::with_options(arena.data(), global.decode_options()?)?;
        println!("  Groups: {}", container.groups()?.len());

        let mut writer = ContainerWriter::create(&self.output, self.write_options())?;
        writer.copy_container(&container)?;
        writer.finish()?;

        let written = std::fs::metadata(&self.output)?.len() as usize;
        println!(
            "  Size:   {} -> {}",
            format_size(container.total_size()),
            format_size(written)
        );
        Ok(())
    }
}
