// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record decoding.
//!
//! A record is a 20-byte header followed by `size` body bytes holding a
//! sequence of subrecords. When the is-compressed flag is set the body is a
//! `u32` inflated size followed by a zlib stream; the stream is inflated on
//! first access and kept for the lifetime of the view.
//!
//! Decoding is best-effort below the record: a truncated or malformed
//! subrecord ends the sequence and is reported alongside the subrecords
//! decoded before it.

use std::cell::OnceCell;
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{trace, warn};

use super::constants::{
    COMPRESSED_SIZE_PREFIX, NO_NAME, RECORD_FLAGS, RECORD_FLAG_COMPRESSED, RECORD_FLAG_DELETED,
    RECORD_HEADER, RECORD_HEADER_SIZE, REC_FLAGS, REC_FORMID, REC_SIZE, REC_TYPE, REC_VC_DAY,
    REC_VC_MONTH, REC_VC_OWNER,
};
use super::context::DecodeContext;
use super::subrecord::{SubRecord, SubRecordIter};
use crate::core::tag::Tag;
use crate::core::value::{FieldValue, FormId};
use crate::encoding::compression;
use crate::encoding::view::{Flags, StructView};
use crate::{CodecError, Result};

/// Version-control stamp of a record.
///
/// Rarely meaningful in shipped files; `month` counts months since
/// December 2002.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VcInfo {
    pub day: u8,
    pub month: u8,
    pub owner: u16,
}

impl VcInfo {
    /// Calendar date of the stamp, if it names one.
    ///
    /// Month 1 is January 2003. A day outside the month falls back to the
    /// first of the month; month 0 has no date.
    pub fn approximate_date(&self) -> Option<NaiveDate> {
        if self.month == 0 {
            return None;
        }
        let months = self.month as i32 - 1;
        let year = 2003 + months / 12;
        let month = (months % 12) as u32 + 1;
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(first.with_day(self.day as u32).unwrap_or(first))
    }
}

/// Subrecords decoded from one record, with the reason decoding stopped
/// early if it did.
#[derive(Debug)]
pub struct RecordFields<'r> {
    pub subrecords: Vec<SubRecord<'r>>,
    pub diagnostic: Option<CodecError>,
}

impl RecordFields<'_> {
    /// Whether the whole body was decoded.
    pub fn is_complete(&self) -> bool {
        self.diagnostic.is_none()
    }
}

/// A view of one record.
#[derive(Clone)]
pub struct Record<'a> {
    header: StructView<'a>,
    /// Header and declared body
    data: &'a [u8],
    offset: u64,
    ctx: DecodeContext<'a>,
    inflated: OnceCell<Vec<u8>>,
    subrecord_count: OnceCell<usize>,
}

impl<'a> Record<'a> {
    /// Decode the record header at the start of `data`.
    ///
    /// # Errors
    ///
    /// - Structural invariant if the header carries the group marker
    /// - Truncated data if the header or declared body runs past `data`
    pub fn decode(data: &'a [u8], offset: u64, ctx: DecodeContext<'a>) -> Result<Self> {
        let header = RECORD_HEADER.view(data, offset)?;
        let tag = header.tag(&REC_TYPE);
        if tag.is_group() {
            return Err(CodecError::structural("record", "group marker GRUP", offset));
        }
        let size = header.u32(&REC_SIZE) as usize;
        let total = RECORD_HEADER_SIZE + size;
        if data.len() < total {
            return Err(CodecError::truncated(
                format!("{tag} record body"),
                size,
                data.len() - RECORD_HEADER_SIZE,
                offset + RECORD_HEADER_SIZE as u64,
            ));
        }
        trace!(tag = %tag, size, offset, "record");

        Ok(Self {
            header,
            data: &data[..total],
            offset,
            ctx,
            inflated: OnceCell::new(),
            subrecord_count: OnceCell::new(),
        })
    }

    pub fn tag(&self) -> Tag {
        self.header.tag(&REC_TYPE)
    }

    /// Declared body size.
    pub fn size(&self) -> u32 {
        self.header.u32(&REC_SIZE)
    }

    /// Header plus declared body; the distance to the next sibling.
    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    /// Absolute offset of the header.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn flags(&self) -> Flags {
        RECORD_FLAGS.wrap(self.header.u32(&REC_FLAGS))
    }

    pub fn form_id(&self) -> FormId {
        FormId(self.header.u32(&REC_FORMID))
    }

    pub fn vc_info(&self) -> VcInfo {
        VcInfo {
            day: self.header.uint(&REC_VC_DAY) as u8,
            month: self.header.uint(&REC_VC_MONTH) as u8,
            owner: self.header.u16(&REC_VC_OWNER),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags().contains(RECORD_FLAG_COMPRESSED)
    }

    pub fn is_deleted(&self) -> bool {
        self.flags().contains(RECORD_FLAG_DELETED)
    }

    /// The header view.
    pub fn header(&self) -> &StructView<'a> {
        &self.header
    }

    /// Header and declared body as stored.
    pub fn raw(&self) -> &'a [u8] {
        self.data
    }

    /// Declared body as stored (still compressed if the flag is set).
    pub fn raw_body(&self) -> &'a [u8] {
        &self.data[RECORD_HEADER_SIZE..]
    }

    /// Declared inflated size of a compressed body.
    pub fn decompressed_size(&self) -> Option<u32> {
        let body = self.raw_body();
        (self.is_compressed() && body.len() >= COMPRESSED_SIZE_PREFIX)
            .then(|| LittleEndian::read_u32(body))
    }

    pub fn context(&self) -> DecodeContext<'a> {
        self.ctx
    }

    /// Subrecord bytes, inflating a compressed body on first use.
    pub fn body(&self) -> Result<&[u8]> {
        if !self.is_compressed() {
            return Ok(self.raw_body());
        }
        if let Some(body) = self.inflated.get() {
            return Ok(body);
        }
        let inflated = self.inflate()?;
        Ok(self.inflated.get_or_init(|| inflated))
    }

    fn inflate(&self) -> Result<Vec<u8>> {
        let body = self.raw_body();
        let context = format!("{} record {}", self.tag(), self.form_id());
        if body.len() < COMPRESSED_SIZE_PREFIX {
            return Err(CodecError::truncated(
                context,
                COMPRESSED_SIZE_PREFIX,
                body.len(),
                self.offset + RECORD_HEADER_SIZE as u64,
            ));
        }
        let expected = LittleEndian::read_u32(body);
        compression::inflate(
            &body[COMPRESSED_SIZE_PREFIX..],
            expected,
            self.ctx.options.verify_decompressed_size,
            &context,
        )
    }

    /// Iterate the subrecords of the body.
    ///
    /// # Errors
    ///
    /// Compression failure when a compressed body cannot be inflated.
    pub fn subrecords(&self) -> Result<SubRecordIter<'_>> {
        Ok(SubRecordIter::new(self.body()?, self.tag(), self.ctx))
    }

    /// Decode every subrecord, stopping at the first one that fails.
    ///
    /// The failure is returned as a diagnostic next to the subrecords decoded
    /// before it, and logged.
    pub fn decode_fields(&self) -> Result<RecordFields<'_>> {
        let mut subrecords = Vec::new();
        let mut diagnostic = None;
        for item in self.subrecords()? {
            match item {
                Ok(sub) => subrecords.push(sub),
                Err(e) if e.is_recoverable() => {
                    warn!(
                        record = %self.tag(),
                        form_id = %self.form_id(),
                        offset = self.offset,
                        decoded = subrecords.len(),
                        error = %e,
                        "subrecord decoding stopped early"
                    );
                    diagnostic = Some(e);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(RecordFields {
            subrecords,
            diagnostic,
        })
    }

    /// Number of subrecords decoded before the end of the body or the first
    /// failure. Computed once per view.
    pub fn subrecord_count(&self) -> Result<usize> {
        if let Some(count) = self.subrecord_count.get() {
            return Ok(*count);
        }
        let count = self.subrecords()?.take_while(|item| item.is_ok()).count();
        Ok(*self.subrecord_count.get_or_init(|| count))
    }

    /// First subrecord with the given tag.
    pub fn subrecord(&self, tag: Tag) -> Result<Option<SubRecord<'_>>> {
        for item in self.subrecords()? {
            let sub = item?;
            if sub.tag() == tag {
                return Ok(Some(sub));
            }
        }
        Ok(None)
    }

    /// Every subrecord with the given tag, in body order.
    pub fn subrecords_of(&self, tag: Tag) -> Result<Vec<SubRecord<'_>>> {
        let mut found = Vec::new();
        for item in self.subrecords()? {
            let sub = item?;
            if sub.tag() == tag {
                found.push(sub);
            }
        }
        Ok(found)
    }

    /// Decoded value of the first subrecord with the given tag.
    pub fn value(&self, tag: Tag) -> Result<Option<FieldValue>> {
        self.subrecord(tag)?.map(|sub| sub.value()).transpose()
    }

    /// `EDID` editor id.
    pub fn editor_id(&self) -> Result<Option<String>> {
        self.subrecord(Tag::EDID)?.map(|sub| sub.zstring()).transpose()
    }

    /// `FULL` display name.
    pub fn full_name(&self) -> Result<Option<String>> {
        self.subrecord(Tag::FULL)?.map(|sub| sub.zstring()).transpose()
    }

    /// Display name, or the no-name sentinel when there is none or it cannot
    /// be read.
    pub fn label(&self) -> String {
        match self.full_name() {
            Ok(Some(name)) => name,
            _ => NO_NAME.to_string(),
        }
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("tag", &self.tag())
            .field("form_id", &self.form_id())
            .field("size", &self.size())
            .field("flags", &self.flags().bits())
            .field("offset", &self.offset)
            .finish()
    }
}
