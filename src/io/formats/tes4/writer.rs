// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Container writer.
//!
//! Builders mirror the decoded views: [`SubRecordBuilder`] inside
//! [`RecordBuilder`] inside [`GroupBuilder`], all collected by a
//! [`ContainerWriter`] that emits the `TES4` header followed by the
//! top-level groups. Sizes are computed while encoding; compressed records
//! are deflated with zlib behind a 4-byte inflated-size prefix.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tes4codec::io::formats::tes4::writer::{
//!     ContainerWriter, GroupBuilder, RecordBuilder, SubRecordBuilder,
//! };
//! use tes4codec::{FormId, Tag, WriteOptions};
//!
//! let mut writer = ContainerWriter::create("out.esp", WriteOptions::default())?;
//! writer.set_header(RecordBuilder::new(Tag::TES4, FormId(0)))?;
//!
//! let mut robe = RecordBuilder::new(Tag::new(b"CLOT"), FormId(0x0100_0800));
//! robe.push(SubRecordBuilder::zstring_default(Tag::FULL, "Ciirta's Robes")?);
//! let mut group = GroupBuilder::top(Tag::new(b"CLOT"));
//! group.push_record(robe);
//! writer.add_group(group);
//!
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::debug;

use super::constants::{group_rank, GROUP_HEADER_SIZE, RECORD_FLAG_COMPRESSED};
use super::container::Container;
use super::group::{Child, Group, GroupKind};
use super::record::{Record, VcInfo};
use super::subrecord::SubRecord;
use crate::core::config::WriteOptions;
use crate::core::tag::Tag;
use crate::core::value::{FieldValue, FormId};
use crate::encoding::{compression, text};
use crate::schema::SchemaTable;
use crate::{CodecError, Result};

/// One subrecord to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRecordBuilder {
    tag: Tag,
    payload: Vec<u8>,
}

impl SubRecordBuilder {
    /// Subrecord with a raw payload.
    pub fn new(tag: Tag, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// zstring subrecord in the given encoding.
    pub fn zstring(tag: Tag, value: &str, encoding: &'static Encoding) -> Result<Self> {
        let mut payload = Vec::with_capacity(value.len() + 1);
        text::encode_zstring(value, encoding, &mut payload)?;
        Ok(Self::new(tag, payload))
    }

    /// zstring subrecord in windows-1252.
    pub fn zstring_default(tag: Tag, value: &str) -> Result<Self> {
        Self::zstring(tag, value, WINDOWS_1252)
    }

    /// Subrecord whose payload is `value` encoded through the schema entry
    /// for (`record_type`, `tag`).
    pub fn value(
        record_type: Tag,
        tag: Tag,
        value: &FieldValue,
        schema: &SchemaTable,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let payload = schema.lookup(record_type, tag).encode(value, encoding)?;
        Ok(Self::new(tag, payload))
    }

    /// Copy of a decoded subrecord.
    pub fn from_subrecord(sub: &SubRecord<'_>) -> Self {
        Self::new(sub.tag(), sub.payload())
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Append the encoded subrecord to `out`.
    ///
    /// # Errors
    ///
    /// Payloads longer than `u16::MAX` cannot be represented.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        let size = u16::try_from(self.payload.len()).map_err(|_| {
            CodecError::encode(
                format!("subrecord {}", self.tag),
                format!("payload of {} bytes exceeds {}", self.payload.len(), u16::MAX),
            )
        })?;
        out.extend_from_slice(self.tag.as_bytes());
        out.write_u16::<LittleEndian>(size)?;
        out.extend_from_slice(&self.payload);
        Ok(())
    }
}

/// One record to encode.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    tag: Tag,
    flags: u32,
    form_id: FormId,
    vc_info: VcInfo,
    subrecords: Vec<SubRecordBuilder>,
}

impl RecordBuilder {
    pub fn new(tag: Tag, form_id: FormId) -> Self {
        Self {
            tag,
            flags: 0,
            form_id,
            vc_info: VcInfo::default(),
            subrecords: Vec::new(),
        }
    }

    /// Rebuild a decoded record.
    ///
    /// # Errors
    ///
    /// Fails if the body cannot be inflated or a subrecord cannot be decoded,
    /// since the rebuilt record would silently drop data.
    pub fn from_record(record: &Record<'_>) -> Result<Self> {
        let fields = record.decode_fields()?;
        if let Some(e) = fields.diagnostic {
            return Err(e);
        }
        Ok(Self {
            tag: record.tag(),
            flags: record.flags().bits(),
            form_id: record.form_id(),
            vc_info: record.vc_info(),
            subrecords: fields
                .subrecords
                .iter()
                .map(SubRecordBuilder::from_subrecord)
                .collect(),
        })
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Replace the flag word.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Set or clear one flag mask.
    pub fn set_flag(&mut self, mask: u32, on: bool) -> &mut Self {
        if on {
            self.flags |= mask;
        } else {
            self.flags &= !mask;
        }
        self
    }

    pub fn with_vc_info(mut self, vc_info: VcInfo) -> Self {
        self.vc_info = vc_info;
        self
    }

    pub fn push(&mut self, sub: SubRecordBuilder) -> &mut Self {
        self.subrecords.push(sub);
        self
    }

    pub fn subrecords(&self) -> &[SubRecordBuilder] {
        &self.subrecords
    }

    /// Uncompressed body: the encoded subrecords.
    pub fn body(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        for sub in &self.subrecords {
            sub.encode(&mut body)?;
        }
        Ok(body)
    }

    /// Append the encoded record to `out`.
    pub fn encode(&self, options: &WriteOptions, out: &mut Vec<u8>) -> Result<()> {
        if self.tag.is_group() {
            return Err(CodecError::encode(
                "record",
                "GRUP is reserved for group headers",
            ));
        }
        let compress = options
            .compress_records
            .unwrap_or(self.flags & RECORD_FLAG_COMPRESSED != 0);
        let flags = if compress {
            self.flags | RECORD_FLAG_COMPRESSED
        } else {
            self.flags & !RECORD_FLAG_COMPRESSED
        };

        let body = self.body()?;
        let body = if compress {
            let inflated_size = u32::try_from(body.len())
                .map_err(|_| CodecError::encode(format!("record {}", self.tag), "body too large"))?;
            let mut packed = inflated_size.to_le_bytes().to_vec();
            packed.extend(compression::deflate(&body, options.compression_level)?);
            packed
        } else {
            body
        };
        let size = u32::try_from(body.len())
            .map_err(|_| CodecError::encode(format!("record {}", self.tag), "body too large"))?;

        out.extend_from_slice(self.tag.as_bytes());
        out.write_u32::<LittleEndian>(size)?;
        out.write_u32::<LittleEndian>(flags)?;
        out.write_u32::<LittleEndian>(self.form_id.0)?;
        out.write_u8(self.vc_info.day)?;
        out.write_u8(self.vc_info.month)?;
        out.write_u16::<LittleEndian>(self.vc_info.owner)?;
        out.extend_from_slice(&body);
        Ok(())
    }
}

/// A child of a group under construction.
#[derive(Debug, Clone)]
pub enum ChildBuilder {
    Record(RecordBuilder),
    Group(GroupBuilder),
}

/// One group to encode.
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    label: [u8; 4],
    kind: GroupKind,
    stamp: u32,
    children: Vec<ChildBuilder>,
}

impl GroupBuilder {
    pub fn new(label: [u8; 4], kind: GroupKind) -> Self {
        Self {
            label,
            kind,
            stamp: 0,
            children: Vec::new(),
        }
    }

    /// Top-level group holding records of type `label`.
    pub fn top(label: Tag) -> Self {
        Self::new(label.0, GroupKind::Top)
    }

    /// Rebuild a decoded group and everything under it.
    pub fn from_group(group: &Group<'_>) -> Result<Self> {
        let decoded = group.decode_children()?;
        if let Some(e) = decoded.diagnostic {
            return Err(e);
        }
        let mut builder = Self::new(group.label().0, group.kind()).with_stamp(group.stamp());
        for child in &decoded.children {
            match child {
                Child::Record(r) => builder.push_record(RecordBuilder::from_record(r)?),
                Child::Group(g) => builder.push_group(GroupBuilder::from_group(g)?),
            };
        }
        Ok(builder)
    }

    pub fn label(&self) -> Tag {
        Tag(self.label)
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn with_stamp(mut self, stamp: u32) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn push_record(&mut self, record: RecordBuilder) -> &mut Self {
        self.children.push(ChildBuilder::Record(record));
        self
    }

    pub fn push_group(&mut self, group: GroupBuilder) -> &mut Self {
        self.children.push(ChildBuilder::Group(group));
        self
    }

    pub fn children(&self) -> &[ChildBuilder] {
        &self.children
    }

    /// Append the encoded group to `out`; the size field is patched after
    /// the children are written.
    pub fn encode(&self, options: &WriteOptions, out: &mut Vec<u8>) -> Result<()> {
        let start = out.len();
        out.extend_from_slice(Tag::GRUP.as_bytes());
        out.write_u32::<LittleEndian>(0)?;
        out.extend_from_slice(&self.label);
        out.write_i32::<LittleEndian>(self.kind.as_i32())?;
        out.write_u32::<LittleEndian>(self.stamp)?;
        for child in &self.children {
            match child {
                ChildBuilder::Record(r) => r.encode(options, out)?,
                ChildBuilder::Group(g) => g.encode(options, out)?,
            }
        }
        let size = u32::try_from(out.len() - start).map_err(|_| {
            CodecError::encode(format!("group {}", self.label()), "group too large")
        })?;
        debug_assert!(size as usize >= GROUP_HEADER_SIZE);
        out[start + 4..start + 8].copy_from_slice(&size.to_le_bytes());
        Ok(())
    }
}

/// Writes a complete container.
///
/// Groups are buffered until [`finish`](ContainerWriter::finish) so they
/// can be emitted in canonical order.
pub struct ContainerWriter<W: Write> {
    writer: W,
    options: WriteOptions,
    header: Option<RecordBuilder>,
    groups: Vec<GroupBuilder>,
}

impl ContainerWriter<BufWriter<File>> {
    /// Create a file writer.
    pub fn create<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            CodecError::encode(
                "ContainerWriter",
                format!("Failed to create file '{}': {e}", path.display()),
            )
        })?;
        Ok(Self::new(BufWriter::new(file), options))
    }
}

impl ContainerWriter<Vec<u8>> {
    /// Writer collecting into memory.
    pub fn in_memory(options: WriteOptions) -> Self {
        Self::new(Vec::new(), options)
    }

    /// Encode into a byte vector.
    pub fn to_vec(self) -> Result<Vec<u8>> {
        self.finish()
    }
}

impl<W: Write> ContainerWriter<W> {
    pub fn new(writer: W, options: WriteOptions) -> Self {
        Self {
            writer,
            options,
            header: None,
            groups: Vec::new(),
        }
    }

    /// Set the file header record, which must be `TES4`.
    pub fn set_header(&mut self, header: RecordBuilder) -> Result<()> {
        if header.tag() != Tag::TES4 {
            return Err(CodecError::encode(
                "ContainerWriter",
                format!("file header must be TES4, got {}", header.tag()),
            ));
        }
        self.header = Some(header);
        Ok(())
    }

    pub fn add_group(&mut self, group: GroupBuilder) {
        self.groups.push(group);
    }

    /// Take the header and every top-level group of a decoded container.
    pub fn copy_container(&mut self, container: &Container<'_>) -> Result<()> {
        self.set_header(RecordBuilder::from_record(container.header())?)?;
        if let Some(e) = container.diagnostic() {
            return Err(e.clone());
        }
        for group in container.groups()? {
            self.add_group(GroupBuilder::from_group(group)?);
        }
        Ok(())
    }

    /// Encode everything and flush; returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        let header = self
            .header
            .take()
            .ok_or_else(|| CodecError::encode("ContainerWriter", "no TES4 header set"))?;
        if self.options.canonical_group_order {
            self.groups.sort_by_key(|g| group_rank(g.label()));
        }

        let mut buffer = Vec::new();
        header.encode(&self.options, &mut buffer)?;
        for group in &self.groups {
            group.encode(&self.options, &mut buffer)?;
        }
        self.writer.write_all(&buffer)?;
        self.writer.flush()?;
        debug!(
            groups = self.groups.len(),
            bytes = buffer.len(),
            "container written"
        );
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::ItemData;
    use crate::schema::default_schema;
    use crate::Container;

    fn robe() -> RecordBuilder {
        let mut rec = RecordBuilder::new(Tag::new(b"CLOT"), FormId(0x0100_0800));
        rec.push(SubRecordBuilder::zstring_default(Tag::EDID, "ClothesRobe").unwrap())
            .push(SubRecordBuilder::zstring_default(Tag::FULL, "Ciirta's Robes").unwrap())
            .push(
                SubRecordBuilder::value(
                    Tag::new(b"CLOT"),
                    Tag::DATA,
                    &FieldValue::ItemData(ItemData {
                        gold_value: 8,
                        weight: 4.0,
                    }),
                    default_schema(),
                    WINDOWS_1252,
                )
                .unwrap(),
            );
        rec
    }

    fn build(options: WriteOptions, groups: Vec<GroupBuilder>) -> Vec<u8> {
        let mut writer = ContainerWriter::in_memory(options);
        writer
            .set_header(RecordBuilder::new(Tag::TES4, FormId(0)))
            .unwrap();
        for g in groups {
            writer.add_group(g);
        }
        writer.finish().unwrap()
    }

    #[test]
    fn test_subrecord_encoding() {
        let mut out = Vec::new();
        SubRecordBuilder::zstring_default(Tag::FULL, "Robe")
            .unwrap()
            .encode(&mut out)
            .unwrap();
        assert_eq!(out, b"FULL\x05\x00Robe\0");
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let sub = SubRecordBuilder::new(Tag::DATA, vec![0u8; u16::MAX as usize + 1]);
        let err = sub.encode(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, CodecError::EncodeError { .. }));
    }

    #[test]
    fn test_written_container_decodes() {
        let mut group = GroupBuilder::top(Tag::new(b"CLOT"));
        group.push_record(robe());
        let bytes = build(WriteOptions::default(), vec![group]);

        let container = Container::new(&bytes).unwrap();
        let clot = container.group(Tag::new(b"CLOT")).unwrap().unwrap();
        assert_eq!(clot.total_size(), bytes.len() - 20);
        let rec = clot.child_at(0).unwrap().unwrap();
        let rec = rec.as_record().unwrap();
        assert_eq!(rec.full_name().unwrap().as_deref(), Some("Ciirta's Robes"));
        assert_eq!(
            rec.value(Tag::DATA).unwrap().unwrap().as_item_data(),
            Some(ItemData {
                gold_value: 8,
                weight: 4.0
            })
        );
    }

    #[test]
    fn test_forced_compression() {
        let mut group = GroupBuilder::top(Tag::new(b"CLOT"));
        group.push_record(robe());
        let options = WriteOptions {
            compress_records: Some(true),
            ..WriteOptions::default()
        };
        let bytes = build(options, vec![group]);

        let container = Container::new(&bytes).unwrap();
        let rec = container.find_record(FormId(0x0100_0800)).unwrap().unwrap();
        assert!(rec.is_compressed());
        assert_eq!(
            rec.decompressed_size(),
            Some(robe().body().unwrap().len() as u32)
        );
        assert_eq!(rec.label(), "Ciirta's Robes");
        // The header record is compressed too when forced.
        assert!(container.header().is_compressed());
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let mut group = GroupBuilder::top(Tag::new(b"CLOT"));
        group.push_record(robe().with_vc_info(VcInfo {
            day: 1,
            month: 2,
            owner: 3,
        }));
        let bytes = build(WriteOptions::default(), vec![group]);

        let container = Container::new(&bytes).unwrap();
        let mut writer = ContainerWriter::in_memory(WriteOptions::default());
        writer.copy_container(&container).unwrap();
        assert_eq!(writer.finish().unwrap(), bytes);
    }

    #[test]
    fn test_canonical_order() {
        let groups = vec![
            GroupBuilder::top(Tag::new(b"CLOT")),
            GroupBuilder::top(Tag::new(b"XXXX")),
            GroupBuilder::top(Tag::new(b"GMST")),
        ];
        let options = WriteOptions {
            canonical_group_order: true,
            ..WriteOptions::default()
        };
        let bytes = build(options, groups);
        let container = Container::new(&bytes).unwrap();
        assert_eq!(
            container.labels().unwrap(),
            vec![Tag::new(b"GMST"), Tag::new(b"CLOT"), Tag::new(b"XXXX")]
        );
    }

    #[test]
    fn test_header_must_be_tes4() {
        let mut writer = ContainerWriter::in_memory(WriteOptions::default());
        assert!(writer.set_header(robe()).is_err());
        assert!(ContainerWriter::in_memory(WriteOptions::default())
            .finish()
            .is_err());
    }

    #[test]
    fn test_group_tag_rejected_for_records() {
        let rec = RecordBuilder::new(Tag::GRUP, FormId(1));
        assert!(rec.encode(&WriteOptions::default(), &mut Vec::new()).is_err());
    }
}
