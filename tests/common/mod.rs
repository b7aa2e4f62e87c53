// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use encoding_rs::WINDOWS_1252;
use tes4codec::io::formats::tes4::constants::{RECORD_FLAG_COMPRESSED, RECORD_FLAG_ESM};
use tes4codec::schema::BIPED_FLAGS;
use tes4codec::{
    default_schema, ContainerWriter, FieldValue, FormId, GroupBuilder, GroupKind, ItemData,
    RecordBuilder, SubRecordBuilder, Tag, VcInfo, WriteOptions,
};

// ============================================================================
// Fixture ids
// ============================================================================

pub const GMST_JUMP: FormId = FormId(0x0000_0100);
pub const GMST_SWIM: FormId = FormId(0x0000_0101);
pub const CLAS_KNIGHT: FormId = FormId(0x0000_0200);
pub const CLOT_ROBE: FormId = FormId(0x0100_0800);
pub const CLOT_RING: FormId = FormId(0x0100_0801);
pub const CELL_TAVERN: FormId = FormId(0x0100_0900);
pub const REFR_CHAIR: FormId = FormId(0x0100_0901);

pub const ROBE_NAME: &str = "Ciirta's Robes";

// ============================================================================
// Builders
// ============================================================================

pub fn zstring(tag: &[u8; 4], text: &str) -> SubRecordBuilder {
    SubRecordBuilder::zstring(Tag::new(tag), text, WINDOWS_1252).unwrap()
}

fn value(record: &[u8; 4], tag: &[u8; 4], value: FieldValue) -> SubRecordBuilder {
    SubRecordBuilder::value(
        Tag::new(record),
        Tag::new(tag),
        &value,
        default_schema(),
        WINDOWS_1252,
    )
    .unwrap()
}

/// `TES4` header with HEDR, author, description and one master.
pub fn header(master: bool) -> RecordBuilder {
    let hedr = FieldValue::Struct(vec![
        ("version".into(), FieldValue::Float32(1.0)),
        ("num_records".into(), FieldValue::Int32(7)),
        ("next_object_id".into(), FieldValue::UInt32(0x0100_0A00)),
    ]);
    let mut rec = RecordBuilder::new(Tag::TES4, FormId(0));
    rec.set_flag(RECORD_FLAG_ESM, master);
    rec.push(value(b"TES4", b"HEDR", hedr))
        .push(zstring(b"CNAM", "Sample Author"))
        .push(zstring(b"SNAM", "Test plugin"))
        .push(zstring(b"MAST", "Oblivion.esm"))
        .push(value(b"TES4", b"DATA", FieldValue::UInt64(1_024)));
    rec
}

fn gmst(form_id: FormId, editor_id: &str) -> RecordBuilder {
    let mut rec = RecordBuilder::new(Tag::new(b"GMST"), form_id);
    rec.push(zstring(b"EDID", editor_id))
        .push(SubRecordBuilder::new(Tag::DATA, 1.5f32.to_le_bytes().to_vec()));
    rec
}

/// Clothing record; `compressed` sets the is-compressed flag.
pub fn clothing(form_id: FormId, editor_id: &str, name: &str, compressed: bool) -> RecordBuilder {
    let mut rec = RecordBuilder::new(Tag::new(b"CLOT"), form_id).with_vc_info(VcInfo {
        day: 12,
        month: 5,
        owner: 0,
    });
    rec.set_flag(RECORD_FLAG_COMPRESSED, compressed);
    rec.push(zstring(b"EDID", editor_id))
        .push(zstring(b"FULL", name))
        .push(value(
            b"CLOT",
            b"BMDT",
            FieldValue::Flags(BIPED_FLAGS.wrap(0x0001_0000)),
        ))
        .push(zstring(b"MODL", "clothes\\robe.nif"))
        .push(value(
            b"CLOT",
            b"DATA",
            FieldValue::ItemData(ItemData {
                gold_value: 8,
                weight: 4.0,
            }),
        ));
    rec
}

/// Interior cell block holding a cell record followed by its children.
fn cell_block() -> GroupBuilder {
    let mut chair = RecordBuilder::new(Tag::new(b"REFR"), REFR_CHAIR);
    chair.push(SubRecordBuilder::new(
        Tag::new(b"NAME"),
        0x0000_0300u32.to_le_bytes().to_vec(),
    ));

    let mut temporary = GroupBuilder::new(
        CELL_TAVERN.0.to_le_bytes(),
        GroupKind::CellTemporaryChildren,
    );
    temporary.push_record(chair);
    let mut children = GroupBuilder::new(CELL_TAVERN.0.to_le_bytes(), GroupKind::CellChildren);
    children.push_group(temporary);

    let mut cell = RecordBuilder::new(Tag::new(b"CELL"), CELL_TAVERN);
    cell.push(zstring(b"EDID", "TavernCell"))
        .push(zstring(b"FULL", "The Tavern"));

    let mut sub_block = GroupBuilder::new(0u32.to_le_bytes(), GroupKind::InteriorCellSubBlock);
    sub_block.push_record(cell).push_group(children);
    let mut block = GroupBuilder::new(0u32.to_le_bytes(), GroupKind::InteriorCellBlock);
    block.push_group(sub_block);
    block
}

/// Top-level groups of the sample container, in file order.
pub fn sample_groups() -> Vec<GroupBuilder> {
    let mut gmst_group = GroupBuilder::top(Tag::new(b"GMST"));
    gmst_group
        .push_record(gmst(GMST_JUMP, "fJumpHeightMin"))
        .push_record(gmst(GMST_SWIM, "fSwimSpeed"));

    let mut clas_group = GroupBuilder::top(Tag::new(b"CLAS"));
    let mut knight = RecordBuilder::new(Tag::new(b"CLAS"), CLAS_KNIGHT);
    knight.push(zstring(b"EDID", "Knight")).push(zstring(b"FULL", "Knight"));
    clas_group.push_record(knight);

    let mut clot_group = GroupBuilder::top(Tag::new(b"CLOT"));
    clot_group
        .push_record(clothing(CLOT_ROBE, "ClothesRobe", ROBE_NAME, false))
        .push_record(clothing(CLOT_RING, "RingGold", "Gold Ring", true));

    let mut cell_group = GroupBuilder::top(Tag::new(b"CELL"));
    cell_group.push_group(cell_block());

    vec![gmst_group, clas_group, clot_group, cell_group]
}

/// Encode the sample container.
pub fn sample_with(options: WriteOptions, master: bool) -> Vec<u8> {
    let mut writer = ContainerWriter::in_memory(options);
    writer.set_header(header(master)).unwrap();
    for group in sample_groups() {
        writer.add_group(group);
    }
    writer.to_vec().unwrap()
}

pub fn sample() -> Vec<u8> {
    sample_with(WriteOptions::default(), false)
}

// ============================================================================
// Temp files
// ============================================================================

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Unique path under the system temp dir.
pub fn temp_path(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "tes4codec_test_{}_{}_{}",
        std::process::id(),
        n,
        name
    ))
}

/// Write `bytes` to a fresh temp file.
pub fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
    let path = temp_path(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
