// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Top-level container decoding.
//!
//! A container is the `TES4` file-header record followed by top-level
//! groups up to the end of the buffer. The group list is scanned once and
//! memoized; everything below it stays lazy.

use std::cell::OnceCell;
use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use super::constants::RECORD_FLAG_ESM;
use super::context::DecodeContext;
use super::group::Group;
use super::record::Record;
use crate::core::config::DecodeOptions;
use crate::core::error::ErrorKind;
use crate::core::tag::Tag;
use crate::core::value::{FieldValue, FormId};
use crate::io::detection::{detect_from_header, FileKind};
use crate::{CodecError, Result};

/// Top-level groups scanned from a container, with the error that ended
/// the scan early.
#[derive(Debug, Clone)]
struct GroupIndex<'a> {
    groups: Vec<Group<'a>>,
    error: Option<CodecError>,
}

/// A decoded container over a borrowed buffer.
pub struct Container<'a> {
    data: &'a [u8],
    header: Record<'a>,
    ctx: DecodeContext<'a>,
    index: OnceCell<GroupIndex<'a>>,
}

impl<'a> Container<'a> {
    /// Decode with the built-in schema and default options.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        Self::with_context(data, DecodeContext::default())
    }

    /// Decode with the built-in schema and the given options.
    pub fn with_options(data: &'a [u8], options: DecodeOptions) -> Result<Self> {
        Self::with_context(data, DecodeContext::with_options(options))
    }

    /// Decode the file header.
    ///
    /// # Errors
    ///
    /// Structural invariant when the first record is not `TES4`; truncated
    /// data when the buffer is shorter than the header record.
    pub fn with_context(data: &'a [u8], ctx: DecodeContext<'a>) -> Result<Self> {
        let header = Record::decode(data, 0, ctx)?;
        if header.tag() != Tag::TES4 {
            return Err(CodecError::structural(
                "file header TES4",
                header.tag().to_string(),
                0,
            ));
        }
        Ok(Self {
            data,
            header,
            ctx,
            index: OnceCell::new(),
        })
    }

    /// The `TES4` header record.
    pub fn header(&self) -> &Record<'a> {
        &self.header
    }

    pub fn context(&self) -> DecodeContext<'a> {
        self.ctx
    }

    /// Buffer length.
    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Whether the header carries the master flag.
    pub fn is_master(&self) -> bool {
        self.header.flags().contains(RECORD_FLAG_ESM)
    }

    pub fn kind(&self) -> FileKind {
        detect_from_header(self.data)
    }

    /// `HEDR` of the header record.
    pub fn header_data(&self) -> Result<Option<FieldValue>> {
        self.header.value(Tag::new(b"HEDR"))
    }

    /// `CNAM` author.
    pub fn author(&self) -> Result<Option<String>> {
        self.header
            .subrecord(Tag::new(b"CNAM"))?
            .map(|sub| sub.zstring())
            .transpose()
    }

    /// `SNAM` description.
    pub fn description(&self) -> Result<Option<String>> {
        self.header
            .subrecord(Tag::new(b"SNAM"))?
            .map(|sub| sub.zstring())
            .transpose()
    }

    /// `MAST` master file names, in load order.
    pub fn masters(&self) -> Result<Vec<String>> {
        self.header
            .subrecords_of(Tag::new(b"MAST"))?
            .iter()
            .map(|sub| sub.zstring())
            .collect()
    }

    /// Top-level groups, scanned once.
    ///
    /// In lenient mode this is every group decoded before the scan stopped
    /// (see [`Container::diagnostic`]).
    ///
    /// # Errors
    ///
    /// In strict mode, the error that stopped the scan: structural
    /// violations as-is, anything else as a size mismatch.
    pub fn groups(&self) -> Result<&[Group<'a>]> {
        let index = self.index();
        match &index.error {
            Some(e) if self.ctx.options.strict => Err(e.clone()),
            _ => Ok(&index.groups),
        }
    }

    /// Why the top-level scan stopped early.
    pub fn diagnostic(&self) -> Option<&CodecError> {
        self.index().error.as_ref()
    }

    fn index(&self) -> &GroupIndex<'a> {
        self.index.get_or_init(|| self.scan())
    }

    fn scan(&self) -> GroupIndex<'a> {
        let mut groups: Vec<Group<'a>> = Vec::new();
        let mut seen = HashSet::new();
        let mut offset = self.header.total_size();
        let mut error = None;

        while offset < self.data.len() {
            match Group::decode(&self.data[offset..], offset as u64, 0, self.ctx) {
                Ok(group) => {
                    if !seen.insert(group.label()) {
                        warn!(
                            label = %group.label(),
                            offset,
                            "duplicate top-level group label; lookups return the first"
                        );
                    }
                    offset += group.total_size();
                    groups.push(group);
                }
                Err(e) => {
                    warn!(offset, error = %e, "top-level scan stopped early");
                    let accounting =
                        self.ctx.options.strict && e.kind() != ErrorKind::StructuralInvariant;
                    error = Some(if accounting {
                        CodecError::size_mismatch(
                            format!("container top level ({e})"),
                            (self.data.len() - self.header.total_size()) as u64,
                            (offset - self.header.total_size()) as u64,
                        )
                    } else {
                        e
                    });
                    break;
                }
            }
        }
        debug!(groups = groups.len(), "indexed top-level groups");
        GroupIndex { groups, error }
    }

    /// First top-level group with the given label.
    pub fn group(&self, label: Tag) -> Result<Option<&Group<'a>>> {
        Ok(self.groups()?.iter().find(|g| g.label() == label))
    }

    /// Top-level labels, in file order.
    pub fn labels(&self) -> Result<Vec<Tag>> {
        Ok(self.groups()?.iter().map(|g| g.label()).collect())
    }

    /// Find a record by form id anywhere in the container.
    ///
    /// # Errors
    ///
    /// A structural violation that cut the scan short, when the record is
    /// not among the groups decoded before it.
    pub fn find_record(&self, form_id: FormId) -> Result<Option<Record<'a>>> {
        for group in self.groups()? {
            if let Some(record) = group.find_record(form_id)? {
                return Ok(Some(record));
            }
        }
        match self.diagnostic() {
            Some(e) if e.kind() == ErrorKind::StructuralInvariant => Err(e.clone()),
            _ => Ok(None),
        }
    }
}

impl fmt::Debug for Container<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("size", &self.data.len())
            .field("header", &self.header)
            .field("indexed", &self.index.get().map(|i| i.groups.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &[u8; 4], flags: u32, form_id: u32, body: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&form_id.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(body);
        out
    }

    fn group(label: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = b"GRUP".to_vec();
        out.extend_from_slice(&((body.len() + 20) as u32).to_le_bytes());
        out.extend_from_slice(label);
        out.extend_from_slice(&0i32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    fn sub(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn sample() -> Vec<u8> {
        let mut hedr = 1.0f32.to_le_bytes().to_vec();
        hedr.extend_from_slice(&2i32.to_le_bytes());
        hedr.extend_from_slice(&0x800u32.to_le_bytes());
        let header_body = [
            sub(b"HEDR", &hedr),
            sub(b"CNAM", b"someone\0"),
            sub(b"MAST", b"Oblivion.esm\0"),
        ]
        .concat();
        [
            record(b"TES4", 0, 0, &header_body),
            group(b"GMST", &record(b"GMST", 0, 0x100, &sub(b"EDID", b"fJumpHeight\0"))),
            group(b"CLAS", &record(b"CLAS", 0, 0x200, &[])),
        ]
        .concat()
    }

    #[test]
    fn test_header_and_groups() {
        let bytes = sample();
        let container = Container::new(&bytes).unwrap();
        assert_eq!(container.total_size(), bytes.len());
        assert!(!container.is_master());
        assert_eq!(container.kind(), FileKind::Plugin);
        assert_eq!(container.author().unwrap().as_deref(), Some("someone"));
        assert_eq!(container.masters().unwrap(), vec!["Oblivion.esm".to_string()]);
        let hedr = container.header_data().unwrap().unwrap();
        assert_eq!(hedr.field("num_records"), Some(&FieldValue::Int32(2)));

        assert_eq!(
            container.labels().unwrap(),
            vec![Tag::new(b"GMST"), Tag::new(b"CLAS")]
        );
        assert!(container.group(Tag::new(b"CLAS")).unwrap().is_some());
        assert!(container.group(Tag::new(b"WEAP")).unwrap().is_none());
        assert!(container.diagnostic().is_none());
    }

    #[test]
    fn test_find_record() {
        let bytes = sample();
        let container = Container::new(&bytes).unwrap();
        let rec = container.find_record(FormId(0x100)).unwrap().unwrap();
        assert_eq!(rec.editor_id().unwrap().as_deref(), Some("fJumpHeight"));
        assert!(container.find_record(FormId(0x999)).unwrap().is_none());
    }

    #[test]
    fn test_wrong_header_tag() {
        let bytes = record(b"CLOT", 0, 0, &[]);
        let err = Container::new(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::StructuralInvariant { offset: 0, .. }));
        let bytes = group(b"GMST", &[]);
        assert!(Container::new(&bytes).is_err());
    }

    #[test]
    fn test_duplicate_labels_first_wins() {
        let mut bytes = record(b"TES4", 0, 0, &[]);
        bytes.extend(group(b"GMST", &record(b"GMST", 0, 1, &[])));
        bytes.extend(group(b"GMST", &record(b"GMST", 0, 2, &[])));
        let container = Container::new(&bytes).unwrap();
        assert_eq!(container.groups().unwrap().len(), 2);
        let first = container.group(Tag::new(b"GMST")).unwrap().unwrap();
        assert_eq!(first.offset(), 20);
    }

    #[test]
    fn test_truncated_trailing_group() {
        let mut bytes = sample();
        bytes.extend_from_slice(b"GRUP\xff\x00\x00\x00WEAP");
        bytes.extend_from_slice(&[0; 8]);

        let container = Container::new(&bytes).unwrap();
        assert_eq!(container.groups().unwrap().len(), 2);
        assert!(matches!(
            container.diagnostic(),
            Some(CodecError::TruncatedData { .. })
        ));

        let strict = Container::with_options(&bytes, DecodeOptions::new().strict(true)).unwrap();
        assert!(matches!(
            strict.groups().unwrap_err(),
            CodecError::SizeMismatch { .. }
        ));
    }

    #[test]
    fn test_record_at_top_level_is_structural() {
        let mut bytes = sample();
        bytes.extend(record(b"WEAP", 0, 3, &[]));
        let container = Container::new(&bytes).unwrap();
        assert_eq!(
            container.labels().unwrap(),
            vec![Tag::new(b"GMST"), Tag::new(b"CLAS")]
        );
        assert!(container.index.get().is_some());
        let first = container.groups().unwrap().as_ptr();
        assert_eq!(container.groups().unwrap().as_ptr(), first);
        assert_eq!(
            container.diagnostic().unwrap().kind(),
            ErrorKind::StructuralInvariant
        );

        assert!(container.find_record(FormId(0x100)).unwrap().is_some());
        assert_eq!(
            container.find_record(FormId(0x999)).unwrap_err().kind(),
            ErrorKind::StructuralInvariant
        );

        let strict = Container::with_options(&bytes, DecodeOptions::new().strict(true)).unwrap();
        assert_eq!(
            strict.groups().unwrap_err().kind(),
            ErrorKind::StructuralInvariant
        );
        assert_eq!(
            strict.diagnostic().unwrap().kind(),
            ErrorKind::StructuralInvariant
        );
    }
}
