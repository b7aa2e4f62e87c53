// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The expanded (record type, subrecord type) lookup table.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use super::catalog::{Declaration, DEFAULT_DECLARATIONS, WILDCARD};
use super::interpreter::Interpreter;
use crate::core::tag::Tag;
use crate::{CodecError, Result};

/// Where a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Entry declared for the owning record type
    Specific,
    /// Entry declared for every record type
    Wildcard,
    /// No entry; the payload stays raw
    Fallback,
}

/// Read-only mapping from (record type, subrecord type) to an interpreter.
///
/// Built once from a list of declarations. Lookups try the specific pair,
/// then the wildcard record type, then fall back to raw bytes.
#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    specific: HashMap<(Tag, Tag), Interpreter>,
    wildcard: HashMap<Tag, Interpreter>,
}

impl SchemaTable {
    /// Start an empty builder.
    pub fn builder() -> SchemaTableBuilder {
        SchemaTableBuilder::default()
    }

    /// Table holding the built-in declarations.
    pub fn with_defaults() -> Self {
        let mut builder = Self::builder();
        for decl in DEFAULT_DECLARATIONS {
            builder.push(decl);
        }
        builder.build()
    }

    /// Interpreter for `subrecord` inside a `record`, with its provenance.
    pub fn resolve(&self, record: Tag, subrecord: Tag) -> (Interpreter, Resolution) {
        if let Some(interp) = self.specific.get(&(record, subrecord)) {
            return (*interp, Resolution::Specific);
        }
        if let Some(interp) = self.wildcard.get(&subrecord) {
            return (*interp, Resolution::Wildcard);
        }
        (Interpreter::Raw, Resolution::Fallback)
    }

    /// Interpreter for `subrecord` inside a `record`.
    pub fn lookup(&self, record: Tag, subrecord: Tag) -> Interpreter {
        self.resolve(record, subrecord).0
    }

    /// Number of expanded entries.
    pub fn len(&self) -> usize {
        self.specific.len() + self.wildcard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every expanded entry, wildcard entries keyed by `*`.
    pub fn entries(&self) -> Vec<(String, Tag, Interpreter)> {
        let mut entries: Vec<_> = self
            .wildcard
            .iter()
            .map(|(sub, interp)| (WILDCARD.to_string(), *sub, *interp))
            .chain(
                self.specific
                    .iter()
                    .map(|((rec, sub), interp)| (rec.to_string(), *sub, *interp)),
            )
            .collect();
        entries.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
        entries
    }
}

/// Fluent builder for a [`SchemaTable`].
///
/// Later declarations override earlier ones for the same pair.
#[derive(Debug, Default)]
pub struct SchemaTableBuilder {
    table: SchemaTable,
}

impl SchemaTableBuilder {
    /// Seed the builder with the built-in declarations.
    pub fn defaults(mut self) -> Self {
        for decl in DEFAULT_DECLARATIONS {
            self.push(decl);
        }
        self
    }

    /// Declare `interpreter` for every pair in `records` x `subrecords`.
    ///
    /// A record type of `*` declares a wildcard entry.
    pub fn declare(
        mut self,
        records: &[&str],
        subrecords: &[&str],
        interpreter: Interpreter,
    ) -> Result<Self> {
        for sub in subrecords {
            let sub: Tag = sub.parse()?;
            for rec in records {
                if *rec == WILDCARD {
                    self.table.wildcard.insert(sub, interpreter);
                } else {
                    let rec: Tag = rec.parse()?;
                    self.table.specific.insert((rec, sub), interpreter);
                }
            }
        }
        Ok(self)
    }

    fn push(&mut self, decl: &Declaration) {
        for sub in decl.subrecords {
            for rec in decl.records {
                match rec {
                    None => {
                        self.table.wildcard.insert(*sub, decl.interpreter);
                    }
                    Some(rec) => {
                        self.table.specific.insert((*rec, *sub), decl.interpreter);
                    }
                }
            }
        }
    }

    pub fn build(self) -> SchemaTable {
        debug!(entries = self.table.len(), "schema table built");
        self.table
    }
}

static DEFAULT_SCHEMA: OnceLock<SchemaTable> = OnceLock::new();

/// Process-wide table of built-in declarations, built on first use.
pub fn default_schema() -> &'static SchemaTable {
    DEFAULT_SCHEMA.get_or_init(SchemaTable::with_defaults)
}

impl std::str::FromStr for Interpreter {
    type Err = CodecError;

    /// Parse a scalar interpreter name (`zstring`, `u32`, `u64`, `formid`,
    /// `item_data`, `raw`).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zstring" => Ok(Interpreter::ZString),
            "u32" => Ok(Interpreter::UInt32),
            "u64" => Ok(Interpreter::UInt64),
            "formid" => Ok(Interpreter::FormId),
            "item_data" => Ok(Interpreter::ItemData),
            "raw" => Ok(Interpreter::Raw),
            other => Err(CodecError::unsupported(format!("interpreter '{other}'"))),
        }
    }
}
