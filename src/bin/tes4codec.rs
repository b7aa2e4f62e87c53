// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # tes4codec CLI
//!
//! Command-line tool for TES4 plugin and master files.
//!
//! ## Usage
//!
//! ```sh
//! # Show header and group summary
//! tes4codec inspect info Oblivion.esm
//!
//! # List clothing records named like a robe
//! tes4codec inspect records mod.esp CLOT --filter Robe
//!
//! # Dump one record
//! tes4codec inspect record mod.esp 01000800 --json
//!
//! # Re-encode with every record uncompressed
//! tes4codec repack mod.esp out.esp --decompress
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{InspectCmd, RepackCmd};
use common::{GlobalOpts, Result};
use tracing_subscriber::EnvFilter;

/// tes4codec - TES4 plugin toolkit
///
/// Inspect and re-encode .esp and .esm files.
#[derive(Parser, Clone)]
#[command(name = "tes4codec")]
#[command(about = "Inspect and re-encode TES4 plugin and master files", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Inspect file contents (info, groups, records, record, tree)
    #[command(subcommand)]
    Inspect(InspectCmd),

    /// Re-encode a file, optionally changing compression or group order
    Repack(RepackCmd),
}

const DEFAULT_LOG: &str = "tes4codec=warn";

/// Filter directives: `--verbose` first, then `RUST_LOG`, then warnings only.
fn log_directives(verbose: bool, env: Option<String>) -> String {
    if verbose {
        "tes4codec=debug".to_string()
    } else {
        env.unwrap_or_else(|| DEFAULT_LOG.to_string())
    }
}

fn init_logging(verbose: bool) {
    let directives = log_directives(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match cli.command {
        Commands::Inspect(cmd) => cmd.run(&cli.global),
        Commands::Repack(cmd) => cmd.run(&cli.global),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
