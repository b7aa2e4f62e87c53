// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Subrecord decoding.
//!
//! A subrecord is `type: char4, size: u16` followed by `size` payload bytes.
//! The payload is interpreted through the schema table keyed by the owning
//! record's type.

use std::fmt;
use std::io::Cursor;

use tracing::trace;

use super::constants::{SUBRECORD_HEADER, SUBRECORD_HEADER_SIZE, SUB_SIZE, SUB_TYPE};
use super::context::DecodeContext;
use crate::core::tag::Tag;
use crate::core::value::FieldValue;
use crate::encoding::bounded::BoundedReader;
use crate::schema::Interpreter;
use crate::{CodecError, Result};

/// A decoded subrecord borrowing its payload.
#[derive(Clone, Copy)]
pub struct SubRecord<'a> {
    tag: Tag,
    payload: &'a [u8],
    record_type: Tag,
    offset: u64,
    ctx: DecodeContext<'a>,
}

impl<'a> SubRecord<'a> {
    /// Decode the subrecord at the start of `data`.
    ///
    /// `offset` is the position of `data` within the record body and is only
    /// used in diagnostics. Fails with truncated data when the header or the
    /// declared payload runs past the end of `data`.
    pub fn decode(
        data: &'a [u8],
        offset: u64,
        record_type: Tag,
        ctx: DecodeContext<'a>,
    ) -> Result<Self> {
        let header = SUBRECORD_HEADER.view(data, offset)?;
        let tag = header.tag(&SUB_TYPE);
        let size = header.u16(&SUB_SIZE) as usize;

        let mut window = BoundedReader::over(data, SUBRECORD_HEADER_SIZE, size as u64);
        let payload = window.read_slice(size);
        if payload.len() < size {
            return Err(CodecError::truncated(
                format!("{record_type}.{tag} payload"),
                size,
                payload.len(),
                offset + SUBRECORD_HEADER_SIZE as u64,
            ));
        }
        trace!(record = %record_type, tag = %tag, size, offset, "subrecord");

        Ok(Self {
            tag,
            payload,
            record_type,
            offset,
            ctx,
        })
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Type of the record owning this subrecord.
    pub fn record_type(&self) -> Tag {
        self.record_type
    }

    /// Declared payload size.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Header plus payload.
    pub fn total_size(&self) -> usize {
        SUBRECORD_HEADER_SIZE + self.payload.len()
    }

    /// Offset within the (inflated) record body.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Interpreter selected by the schema table.
    pub fn interpreter(&self) -> Interpreter {
        self.ctx.schema.lookup(self.record_type, self.tag)
    }

    /// Decode the payload through the schema table.
    pub fn value(&self) -> Result<FieldValue> {
        self.interpreter().decode(
            self.payload,
            self.ctx.options.text_encoding,
            &format!("{}.{}", self.record_type, self.tag),
        )
    }

    /// Payload as a zstring, whatever the schema says.
    pub fn zstring(&self) -> Result<String> {
        crate::encoding::text::decode_zstring(
            self.payload,
            self.ctx.options.text_encoding,
            &format!("{}.{}", self.record_type, self.tag),
        )
    }

    /// Payload read through the bounded sub-stream.
    pub fn reader(&self) -> BoundedReader<Cursor<&'a [u8]>> {
        BoundedReader::over(self.payload, 0, self.payload.len() as u64)
    }

    /// Encoded form: header followed by payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_size());
        out.extend_from_slice(self.tag.as_bytes());
        out.extend_from_slice(&(self.payload.len() as u16).to_le_bytes());
        out.extend_from_slice(self.payload);
        out
    }
}

impl fmt::Debug for SubRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubRecord")
            .field("tag", &self.tag)
            .field("size", &self.payload.len())
            .field("offset", &self.offset)
            .finish()
    }
}

/// Sequence of subrecords filling one record body.
///
/// Stops at the end of the body. A decode failure is yielded once and ends
/// the sequence; bytes after it are never interpreted.
pub struct SubRecordIter<'a> {
    window: BoundedReader<Cursor<&'a [u8]>>,
    record_type: Tag,
    ctx: DecodeContext<'a>,
    failed: bool,
}

impl<'a> SubRecordIter<'a> {
    pub fn new(body: &'a [u8], record_type: Tag, ctx: DecodeContext<'a>) -> Self {
        Self {
            window: BoundedReader::over(body, 0, body.len() as u64),
            record_type,
            ctx,
            failed: false,
        }
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.window.position()
    }
}

impl<'a> Iterator for SubRecordIter<'a> {
    type Item = Result<SubRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.window.is_exhausted() {
            return None;
        }
        let offset = self.window.position();
        let rest = self.window.peek(self.window.remaining() as usize);
        match SubRecord::decode(rest, offset, self.record_type, self.ctx) {
            Ok(sub) => {
                self.window.read_slice(sub.total_size());
                Some(Ok(sub))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for SubRecordIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::ItemData;

    fn sub(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn clot() -> Tag {
        Tag::new(b"CLOT")
    }

    #[test]
    fn test_decode_full_name() {
        let bytes = sub(b"FULL", b"Ciirta's Robes\0");
        let ctx = DecodeContext::default();
        let sub = SubRecord::decode(&bytes, 0, clot(), ctx).unwrap();
        assert_eq!(sub.tag(), Tag::FULL);
        assert_eq!(sub.size(), 15);
        assert_eq!(sub.total_size(), 21);
        assert_eq!(
            sub.value().unwrap(),
            FieldValue::ZString("Ciirta's Robes".into())
        );
        assert_eq!(sub.to_bytes(), bytes);
    }

    #[test]
    fn test_decode_item_data() {
        let mut payload = 8u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&4.0f32.to_le_bytes());
        let bytes = sub(b"DATA", &payload);
        let sub = SubRecord::decode(&bytes, 0, clot(), DecodeContext::default()).unwrap();
        assert_eq!(
            sub.value().unwrap().as_item_data(),
            Some(ItemData {
                gold_value: 8,
                weight: 4.0
            })
        );
    }

    #[test]
    fn test_unknown_pair_is_raw() {
        let bytes = sub(b"XNAM", &[1, 2, 3]);
        let sub = SubRecord::decode(&bytes, 0, clot(), DecodeContext::default()).unwrap();
        assert_eq!(sub.interpreter(), Interpreter::Raw);
        assert_eq!(sub.value().unwrap(), FieldValue::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = sub(b"EDID", b"robe\0");
        bytes.truncate(8);
        let err = SubRecord::decode(&bytes, 40, clot(), DecodeContext::default()).unwrap_err();
        match err {
            CodecError::TruncatedData {
                requested,
                available,
                offset,
                ..
            } => {
                assert_eq!(requested, 5);
                assert_eq!(available, 2);
                assert_eq!(offset, 46);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_terminator_is_malformed() {
        let bytes = sub(b"EDID", b"robe");
        let sub = SubRecord::decode(&bytes, 0, clot(), DecodeContext::default()).unwrap();
        assert!(matches!(
            sub.value().unwrap_err(),
            CodecError::MalformedString { .. }
        ));
    }

    #[test]
    fn test_iter_consumes_exact_body() {
        let mut body = sub(b"EDID", b"robe\0");
        body.extend(sub(b"FULL", b"Robe\0"));
        let mut iter = SubRecordIter::new(&body, clot(), DecodeContext::default());
        let tags: Vec<Tag> = iter.by_ref().map(|s| s.unwrap().tag()).collect();
        assert_eq!(tags, vec![Tag::EDID, Tag::FULL]);
        assert_eq!(iter.consumed(), body.len() as u64);
    }

    #[test]
    fn test_iter_stops_after_error() {
        let mut body = sub(b"EDID", b"robe\0");
        body.extend_from_slice(b"FULL\x10\x00Rob");
        let items: Vec<_> = SubRecordIter::new(&body, clot(), DecodeContext::default()).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(CodecError::TruncatedData { .. })));
    }

    #[test]
    fn test_payload_reader_is_bounded() {
        use std::io::Read;
        let mut bytes = sub(b"EDID", b"ab\0");
        bytes.extend(sub(b"FULL", b"xyz\0"));
        let sub = SubRecord::decode(&bytes, 0, clot(), DecodeContext::default()).unwrap();
        let mut buf = Vec::new();
        sub.reader().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"ab\0");
    }
}
