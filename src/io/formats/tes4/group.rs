// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Group decoding.
//!
//! A group is a 20-byte header (`GRUP`, self-inclusive size, label, kind,
//! stamp) followed by either records or nested groups. Which one is decided
//! by peeking the first four body bytes for the group marker: a body that
//! opens with a group holds only groups. A body that opens with a record
//! may still carry the child groups of its records (a `CELL` followed by
//! its cell-children group).

use std::cell::OnceCell;
use std::fmt;
use std::io::Cursor;

use serde::Serialize;
use tracing::{trace, warn};

use super::constants::{
    GROUP_HEADER, GROUP_HEADER_SIZE, GRP_KIND, GRP_LABEL, GRP_SIZE, GRP_STAMP, GRP_TYPE,
};
use super::context::DecodeContext;
use super::record::Record;
use crate::core::error::ErrorKind;
use crate::core::tag::Tag;
use crate::core::value::FormId;
use crate::encoding::bounded::BoundedReader;
use crate::encoding::view::StructView;
use crate::{CodecError, Result};

/// Classification of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Top,
    WorldChildren,
    InteriorCellBlock,
    InteriorCellSubBlock,
    ExteriorCellBlock,
    ExteriorCellSubBlock,
    CellChildren,
    TopicChildren,
    CellPersistentChildren,
    CellTemporaryChildren,
    CellVisibleDistantChildren,
    /// Value outside the known range, kept as stored
    Unknown(i32),
}

impl GroupKind {
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => GroupKind::Top,
            1 => GroupKind::WorldChildren,
            2 => GroupKind::InteriorCellBlock,
            3 => GroupKind::InteriorCellSubBlock,
            4 => GroupKind::ExteriorCellBlock,
            5 => GroupKind::ExteriorCellSubBlock,
            6 => GroupKind::CellChildren,
            7 => GroupKind::TopicChildren,
            8 => GroupKind::CellPersistentChildren,
            9 => GroupKind::CellTemporaryChildren,
            10 => GroupKind::CellVisibleDistantChildren,
            other => GroupKind::Unknown(other),
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            GroupKind::Top => 0,
            GroupKind::WorldChildren => 1,
            GroupKind::InteriorCellBlock => 2,
            GroupKind::InteriorCellSubBlock => 3,
            GroupKind::ExteriorCellBlock => 4,
            GroupKind::ExteriorCellSubBlock => 5,
            GroupKind::CellChildren => 6,
            GroupKind::TopicChildren => 7,
            GroupKind::CellPersistentChildren => 8,
            GroupKind::CellTemporaryChildren => 9,
            GroupKind::CellVisibleDistantChildren => 10,
            GroupKind::Unknown(v) => *v,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupKind::Top => "top",
            GroupKind::WorldChildren => "world_children",
            GroupKind::InteriorCellBlock => "interior_cell_block",
            GroupKind::InteriorCellSubBlock => "interior_cell_subblock",
            GroupKind::ExteriorCellBlock => "exterior_cell_block",
            GroupKind::ExteriorCellSubBlock => "exterior_cell_subblock",
            GroupKind::CellChildren => "cell_children",
            GroupKind::TopicChildren => "topic_children",
            GroupKind::CellPersistentChildren => "cell_persistent_children",
            GroupKind::CellTemporaryChildren => "cell_temporary_children",
            GroupKind::CellVisibleDistantChildren => "cell_visible_distant_children",
            GroupKind::Unknown(_) => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, GroupKind::Unknown(_))
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::Unknown(v) => write!(f, "unknown({v})"),
            known => f.write_str(known.name()),
        }
    }
}

impl Serialize for GroupKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A child of a group.
#[derive(Debug, Clone)]
pub enum Child<'a> {
    Group(Group<'a>),
    Record(Record<'a>),
}

impl<'a> Child<'a> {
    /// Bytes this child occupies in its parent's body.
    pub fn total_size(&self) -> usize {
        match self {
            Child::Group(g) => g.total_size(),
            Child::Record(r) => r.total_size(),
        }
    }

    pub fn offset(&self) -> u64 {
        match self {
            Child::Group(g) => g.offset(),
            Child::Record(r) => r.offset(),
        }
    }

    pub fn as_group(&self) -> Option<&Group<'a>> {
        match self {
            Child::Group(g) => Some(g),
            Child::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record<'a>> {
        match self {
            Child::Record(r) => Some(r),
            Child::Group(_) => None,
        }
    }
}

/// Children decoded from one group, with the reason decoding stopped early
/// in lenient mode.
#[derive(Debug)]
pub struct GroupChildren<'a> {
    pub children: Vec<Child<'a>>,
    pub diagnostic: Option<CodecError>,
}

impl GroupChildren<'_> {
    /// The structural violation that cut the children short, if any.
    pub fn structural_error(&self) -> Option<&CodecError> {
        self.diagnostic
            .as_ref()
            .filter(|e| e.kind() == ErrorKind::StructuralInvariant)
    }
}

/// A view of one group.
#[derive(Clone)]
pub struct Group<'a> {
    header: StructView<'a>,
    /// Header and body
    data: &'a [u8],
    offset: u64,
    depth: usize,
    ctx: DecodeContext<'a>,
    child_count: OnceCell<usize>,
}

impl<'a> Group<'a> {
    /// Decode the group header at the start of `data`.
    ///
    /// `depth` is 0 for top-level groups.
    ///
    /// # Errors
    ///
    /// - Structural invariant if the tag is not `GRUP`, the size is smaller
    ///   than the header, or nesting exceeds the configured depth
    /// - Truncated data if the declared size runs past `data`
    pub fn decode(data: &'a [u8], offset: u64, depth: usize, ctx: DecodeContext<'a>) -> Result<Self> {
        let header = GROUP_HEADER.view(data, offset)?;
        let tag = header.tag(&GRP_TYPE);
        if !tag.is_group() {
            return Err(CodecError::structural(
                "group marker GRUP",
                format!("record type {tag}"),
                offset,
            ));
        }
        if depth > ctx.options.max_depth {
            return Err(CodecError::structural(
                format!("group nesting depth <= {}", ctx.options.max_depth),
                format!("depth {depth}"),
                offset,
            ));
        }
        let size = header.u32(&GRP_SIZE) as usize;
        if size < GROUP_HEADER_SIZE {
            return Err(CodecError::structural(
                format!("group size >= {GROUP_HEADER_SIZE}"),
                format!("size {size}"),
                offset,
            ));
        }
        if data.len() < size {
            return Err(CodecError::truncated(
                format!("group {}", header.tag(&GRP_LABEL)),
                size,
                data.len(),
                offset,
            ));
        }

        let group = Self {
            header,
            data: &data[..size],
            offset,
            depth,
            ctx,
            child_count: OnceCell::new(),
        };
        if let GroupKind::Unknown(value) = group.kind() {
            warn!(label = %group.label(), offset, value, "unknown group kind");
        }
        trace!(label = %group.label(), kind = %group.kind(), size, offset, "group");
        Ok(group)
    }

    /// Four-byte label. For top-level groups this is the record type held.
    pub fn label(&self) -> Tag {
        self.header.tag(&GRP_LABEL)
    }

    /// Raw label bytes as a number (form id or block coordinates for
    /// non-top groups).
    pub fn label_value(&self) -> u32 {
        self.header.u32(&GRP_LABEL)
    }

    pub fn kind(&self) -> GroupKind {
        GroupKind::from_i32(self.header.int(&GRP_KIND) as i32)
    }

    pub fn stamp(&self) -> u32 {
        self.header.u32(&GRP_STAMP)
    }

    /// Declared size, header included.
    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    pub fn body_size(&self) -> usize {
        self.data.len() - GROUP_HEADER_SIZE
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn header(&self) -> &StructView<'a> {
        &self.header
    }

    /// Header and body as stored.
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }

    pub fn body(&self) -> &'a [u8] {
        &self.data[GROUP_HEADER_SIZE..]
    }

    /// Whether the body holds nested groups rather than records.
    pub fn has_subgroups(&self) -> bool {
        self.body().starts_with(Tag::GRUP.as_bytes())
    }

    /// Iterate the children.
    ///
    /// A child that fails to decode is yielded once as an error and ends the
    /// sequence. Strict accounting is applied by [`Group::decode_children`].
    pub fn children(&self) -> ChildIter<'a> {
        ChildIter {
            window: BoundedReader::over(self.body(), 0, self.body_size() as u64),
            base: self.offset + GROUP_HEADER_SIZE as u64,
            nested: self.has_subgroups(),
            depth: self.depth + 1,
            ctx: self.ctx,
            failed: false,
        }
    }

    /// Decode every child under the configured accounting policy.
    ///
    /// In lenient mode decoding stops at the first failing child and the
    /// failure is returned as a diagnostic next to the children decoded
    /// before it. In strict mode structural violations propagate as-is and
    /// any other failure becomes a size mismatch.
    pub fn decode_children(&self) -> Result<GroupChildren<'a>> {
        let mut children = Vec::new();
        let mut iter = self.children();
        let mut diagnostic = None;
        for item in iter.by_ref() {
            match item {
                Ok(child) => children.push(child),
                Err(e) => {
                    diagnostic = Some(e);
                    break;
                }
            }
        }

        let Some(e) = diagnostic else {
            return Ok(GroupChildren {
                children,
                diagnostic: None,
            });
        };
        let consumed = iter.consumed();
        if self.ctx.options.strict {
            if e.kind() == ErrorKind::StructuralInvariant {
                return Err(e);
            }
            return Err(CodecError::size_mismatch(
                format!("group {} at offset {} ({e})", self.label(), self.offset),
                self.body_size() as u64,
                consumed,
            ));
        }
        warn!(
            label = %self.label(),
            offset = self.offset,
            declared = self.body_size(),
            consumed,
            error = %e,
            "group body decoding stopped early"
        );
        Ok(GroupChildren {
            children,
            diagnostic: Some(e),
        })
    }

    /// Number of children, computed once per view.
    pub fn child_count(&self) -> Result<usize> {
        if let Some(count) = self.child_count.get() {
            return Ok(*count);
        }
        let count = self.decode_children()?.children.len();
        Ok(*self.child_count.get_or_init(|| count))
    }

    /// Child at `index`, re-walking the body.
    pub fn child_at(&self, index: usize) -> Result<Option<Child<'a>>> {
        self.children().nth(index).transpose()
    }

    /// Every record in this group and its nested groups, depth first.
    ///
    /// # Errors
    ///
    /// Any structural violation in the subtree, since the list would be
    /// incomplete.
    pub fn records(&self) -> Result<Vec<Record<'a>>> {
        let mut out = Vec::new();
        self.collect_records(&mut out)?;
        Ok(out)
    }

    fn collect_records(&self, out: &mut Vec<Record<'a>>) -> Result<()> {
        let decoded = self.decode_children()?;
        if let Some(e) = decoded.structural_error() {
            return Err(e.clone());
        }
        for child in decoded.children {
            match child {
                Child::Record(r) => out.push(r),
                Child::Group(g) => g.collect_records(out)?,
            }
        }
        Ok(())
    }

    /// Find a record by form id, searching nested groups.
    ///
    /// # Errors
    ///
    /// A structural violation in the subtree, when the record is not among
    /// the children decoded before it.
    pub fn find_record(&self, form_id: FormId) -> Result<Option<Record<'a>>> {
        let decoded = self.decode_children()?;
        for child in &decoded.children {
            match child {
                Child::Record(r) if r.form_id() == form_id => return Ok(Some(r.clone())),
                Child::Record(_) => {}
                Child::Group(g) => {
                    if let Some(r) = g.find_record(form_id)? {
                        return Ok(Some(r));
                    }
                }
            }
        }
        match decoded.structural_error() {
            Some(e) => Err(e.clone()),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("label", &self.label())
            .field("kind", &self.kind())
            .field("size", &self.total_size())
            .field("offset", &self.offset)
            .finish()
    }
}

/// Iterator over the children of one group.
pub struct ChildIter<'a> {
    window: BoundedReader<Cursor<&'a [u8]>>,
    /// Absolute offset of the body
    base: u64,
    nested: bool,
    depth: usize,
    ctx: DecodeContext<'a>,
    failed: bool,
}

impl ChildIter<'_> {
    /// Body bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.window.position()
    }
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = Result<Child<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.window.is_exhausted() {
            return None;
        }
        let offset = self.base + self.window.position();
        let rest = self.window.peek(self.window.remaining() as usize);
        // Record bodies may interleave the child groups of the record
        // before them (cell, world and topic children).
        let child = if self.nested || rest.starts_with(Tag::GRUP.as_bytes()) {
            Group::decode(rest, offset, self.depth, self.ctx).map(Child::Group)
        } else {
            Record::decode(rest, offset, self.ctx).map(Child::Record)
        };
        match child {
            Ok(child) => {
                self.window.read_slice(child.total_size());
                Some(Ok(child))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for ChildIter<'_> {}
