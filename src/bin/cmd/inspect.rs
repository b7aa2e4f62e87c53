// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show header, groups, records and the tree view.

use std::path::PathBuf;

use clap::Subcommand;
use regex::Regex;
use serde::Serialize;

use crate::common::{format_size, open_arena, parse_form_id, GlobalOpts, Result};
use tes4codec::{Container, FieldValue, FormId, Node, Record, Tag, TreeSource, VcInfo};

/// Inspect file contents.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Show the file header and a group summary
    Info {
        /// Input file (.esp or .esm)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List top-level groups
    Groups {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List the records of one top-level group
    Records {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Group label, e.g. CLOT
        #[arg(value_name = "LABEL")]
        label: String,

        /// Only records whose editor id or name matches this regex
        #[arg(short, long)]
        filter: Option<String>,

        /// Stop after this many records
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show every subrecord of one record
    Record {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Form id in hex
        #[arg(value_name = "FORMID")]
        form_id: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the tree view
    Tree {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Maximum depth to descend
        #[arg(short, long, default_value_t = 2)]
        depth: usize,
    },
}

impl InspectCmd {
    pub fn run(self, global: &GlobalOpts) -> Result<()> {
        match self {
            InspectCmd::Info { input } => cmd_info(input, global),
            InspectCmd::Groups { input } => cmd_groups(input, global),
            InspectCmd::Records {
                input,
                label,
                filter,
                limit,
                json,
            } => cmd_records(input, label, filter, limit, json, global),
            InspectCmd::Record {
                input,
                form_id,
                json,
            } => cmd_record(input, form_id, json, global),
            InspectCmd::Tree { input, depth } => cmd_tree(input, depth, global),
        }
    }
}

/// One line of `inspect records`.
#[derive(Serialize)]
struct RecordSummary {
    #[serde(rename = "type")]
    tag: Tag,
    form_id: FormId,
    flags: u32,
    editor_id: Option<String>,
    name: Option<String>,
    compressed: bool,
}

impl RecordSummary {
    fn from_record(record: &Record<'_>) -> Result<Self> {
        Ok(Self {
            tag: record.tag(),
            form_id: record.form_id(),
            flags: record.flags().bits(),
            editor_id: record.editor_id()?,
            name: record.full_name()?,
            compressed: record.is_compressed(),
        })
    }
}

#[derive(Serialize)]
struct FieldDump {
    #[serde(rename = "type")]
    tag: Tag,
    size: usize,
    interpreter: &'static str,
    value: FieldValue,
}

#[derive(Serialize)]
struct RecordDump {
    #[serde(flatten)]
    summary: RecordSummary,
    vc_info: VcInfo,
    subrecords: Vec<FieldDump>,
    diagnostic: Option<String>,
}

/// Cmd: Show file info
fn cmd_info(input: PathBuf, global: &GlobalOpts) -> Result<()> {
    let arena = open_arena(&input)?;
    let container = Container::with_options(arena.data(), global.decode_options()?)?;
    let header = container.header();

    println!("=== {} ===", input.display());
    println!("Kind: {}", container.kind().as_str());
    println!("Size: {}", format_size(container.total_size()));
    println!("Flags: {}", header.flags());
    if let Some(hedr) = container.header_data()? {
        for name in ["version", "num_records", "next_object_id"] {
            if let Some(value) = hedr.field(name) {
                println!("{name}: {value}");
            }
        }
    }
    if let Some(author) = container.author()? {
        println!("Author: {author}");
    }
    if let Some(description) = container.description()? {
        println!("Description: {description}");
    }
    let masters = container.masters()?;
    if !masters.is_empty() {
        println!("Masters:");
        for master in masters {
            println!("  {master}");
        }
    }

    println!();
    let groups = container.groups()?;
    println!("Groups: {}", groups.len());
    for group in groups {
        println!("  {} | {}", group.label(), format_size(group.total_size()));
    }
    if let Some(e) = container.diagnostic() {
        println!();
        println!("Scan stopped early: {e}");
    }

    Ok(())
}

/// Cmd: List top-level groups
fn cmd_groups(input: PathBuf, global: &GlobalOpts) -> Result<()> {
    let arena = open_arena(&input)?;
    let container = Container::with_options(arena.data(), global.decode_options()?)?;

    println!("=== Groups in {} ===", input.display());
    println!();
    for group in container.groups()? {
        println!(
            "{} | {} | {} | {} children",
            group.label(),
            group.kind(),
            format_size(group.total_size()),
            group.child_count()?
        );
    }

    Ok(())
}

/// Cmd: List records of one group
fn cmd_records(
    input: PathBuf,
    label: String,
    filter: Option<String>,
    limit: Option<usize>,
    json: bool,
    global: &GlobalOpts,
) -> Result<()> {
    let label: Tag = label.parse()?;
    let pattern = filter.as_deref().map(Regex::new).transpose()?;

    let arena = open_arena(&input)?;
    let container = Container::with_options(arena.data(), global.decode_options()?)?;
    let group = container
        .group(label)?
        .ok_or_else(|| anyhow::anyhow!("No top-level group labelled {label}"))?;

    let mut shown = 0;
    for record in group.records()? {
        if limit.is_some_and(|n| shown >= n) {
            break;
        }
        let summary = RecordSummary::from_record(&record)?;
        if let Some(re) = &pattern {
            let matched = [&summary.editor_id, &summary.name]
                .iter()
                .any(|s| s.as_deref().is_some_and(|s| re.is_match(s)));
            if !matched {
                continue;
            }
        }

        if json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            println!(
                "[{}] {} {} | {}",
                summary.form_id,
                summary.tag,
                summary.editor_id.as_deref().unwrap_or("-"),
                record.label()
            );
        }
        shown += 1;
    }

    Ok(())
}

/// Cmd: Dump one record
fn cmd_record(input: PathBuf, form_id: String, json: bool, global: &GlobalOpts) -> Result<()> {
    let form_id = parse_form_id(&form_id)?;
    let arena = open_arena(&input)?;
    let container = Container::with_options(arena.data(), global.decode_options()?)?;
    let record = container
        .find_record(form_id)?
        .ok_or_else(|| anyhow::anyhow!("No record with form id {form_id}"))?;

    let fields = record.decode_fields()?;
    let mut subrecords = Vec::with_capacity(fields.subrecords.len());
    for sub in &fields.subrecords {
        subrecords.push(FieldDump {
            tag: sub.tag(),
            size: sub.size(),
            interpreter: sub.interpreter().name(),
            // Fall back to the raw payload so one bad field does not hide the rest
            value: sub
                .value()
                .unwrap_or_else(|_| FieldValue::Bytes(sub.payload().to_vec())),
        });
    }
    let dump = RecordDump {
        summary: RecordSummary::from_record(&record)?,
        vc_info: record.vc_info(),
        subrecords,
        diagnostic: fields.diagnostic.as_ref().map(|e| e.to_string()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    println!("=== {} [{}] ===", dump.summary.tag, dump.summary.form_id);
    println!("Flags: {}", record.flags());
    if let Some(date) = dump.vc_info.approximate_date() {
        println!("Last edited: {}", date.format("%Y-%m"));
    }
    if let Some(size) = record.decompressed_size() {
        println!("Compressed: {} -> {} bytes", record.size(), size);
    }
    println!();
    for field in &dump.subrecords {
        println!(
            "{} ({} bytes, {}): {}",
            field.tag, field.size, field.interpreter, field.value
        );
    }
    if let Some(diagnostic) = &dump.diagnostic {
        println!();
        println!("Subrecords stopped early: {diagnostic}");
    }

    Ok(())
}

/// Cmd: Print the tree view
fn cmd_tree(input: PathBuf, depth: usize, global: &GlobalOpts) -> Result<()> {
    let arena = open_arena(&input)?;
    let container = Container::with_options(arena.data(), global.decode_options()?)?;
    print_node(&Node::root(&container), 0, depth)
}

fn print_node(node: &Node<'_, '_>, level: usize, max_depth: usize) -> Result<()> {
    let count = node.child_count()?;
    if node.is_leaf() {
        println!("{}{} {}", "  ".repeat(level), node.tag(), node.display_label());
    } else {
        println!("{}{} ({count})", "  ".repeat(level), node.display_label());
    }
    if level >= max_depth {
        return Ok(());
    }
    for child in node.children() {
        print_node(&child?, level + 1, max_depth)?;
    }
    Ok(())
}
