// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TES4 container constants.
//!
//! Header layouts, record flag bits and the canonical top-level group
//! order, shared by the decoders and the writer.

use crate::core::tag::Tag;
use crate::encoding::view::{FieldKind, FieldSpec, FlagSet, Layout};

/// Record header: type, size, flags, formid, vc_info.
pub const RECORD_HEADER_SIZE: usize = 20;
/// Group header: `GRUP`, size, label, group_kind, stamp.
pub const GROUP_HEADER_SIZE: usize = 20;
/// Subrecord header: type, size.
pub const SUBRECORD_HEADER_SIZE: usize = 6;
/// Prefix of a compressed record body holding the inflated size.
pub const COMPRESSED_SIZE_PREFIX: usize = 4;

// Record header fields

pub const REC_TYPE: FieldSpec = FieldSpec::new("type", 0, 4, FieldKind::FixedStr);
pub const REC_SIZE: FieldSpec = FieldSpec::new("size", 4, 4, FieldKind::UInt);
pub const REC_FLAGS: FieldSpec = FieldSpec::new("flags", 8, 4, FieldKind::UInt);
pub const REC_FORMID: FieldSpec = FieldSpec::new("formid", 12, 4, FieldKind::UInt);
pub const REC_VC_DAY: FieldSpec = FieldSpec::new("vc_day", 16, 1, FieldKind::UInt);
pub const REC_VC_MONTH: FieldSpec = FieldSpec::new("vc_month", 17, 1, FieldKind::UInt);
pub const REC_VC_OWNER: FieldSpec = FieldSpec::new("vc_owner", 18, 2, FieldKind::UInt);

pub static RECORD_HEADER: Layout = Layout {
    name: "record_header",
    size: RECORD_HEADER_SIZE,
    fields: &[
        REC_TYPE,
        REC_SIZE,
        REC_FLAGS,
        REC_FORMID,
        REC_VC_DAY,
        REC_VC_MONTH,
        REC_VC_OWNER,
    ],
};

// Group header fields

pub const GRP_TYPE: FieldSpec = FieldSpec::new("type", 0, 4, FieldKind::FixedStr);
pub const GRP_SIZE: FieldSpec = FieldSpec::new("size", 4, 4, FieldKind::UInt);
pub const GRP_LABEL: FieldSpec = FieldSpec::new("label", 8, 4, FieldKind::FixedStr);
pub const GRP_KIND: FieldSpec = FieldSpec::new("group_kind", 12, 4, FieldKind::Int);
pub const GRP_STAMP: FieldSpec = FieldSpec::new("stamp", 16, 4, FieldKind::UInt);

pub static GROUP_HEADER: Layout = Layout {
    name: "group_header",
    size: GROUP_HEADER_SIZE,
    fields: &[GRP_TYPE, GRP_SIZE, GRP_LABEL, GRP_KIND, GRP_STAMP],
};

// Subrecord header fields

pub const SUB_TYPE: FieldSpec = FieldSpec::new("type", 0, 4, FieldKind::FixedStr);
pub const SUB_SIZE: FieldSpec = FieldSpec::new("size", 4, 2, FieldKind::UInt);

pub static SUBRECORD_HEADER: Layout = Layout {
    name: "subrecord_header",
    size: SUBRECORD_HEADER_SIZE,
    fields: &[SUB_TYPE, SUB_SIZE],
};

// Record flag bits

pub const RECORD_FLAG_ESM: u32 = 0x0000_0001;
pub const RECORD_FLAG_DELETED: u32 = 0x0000_0020;
pub const RECORD_FLAG_CAST_SHADOWS: u32 = 0x0000_0200;
/// Quest item on base objects, persistent reference on placed ones.
pub const RECORD_FLAG_QUEST_ITEM: u32 = 0x0000_0400;
pub const RECORD_FLAG_INITIALLY_DISABLED: u32 = 0x0000_0800;
pub const RECORD_FLAG_IGNORED: u32 = 0x0000_1000;
pub const RECORD_FLAG_VISIBLE_WHEN_DISTANT: u32 = 0x0000_8000;
pub const RECORD_FLAG_DANGEROUS: u32 = 0x0002_0000;
pub const RECORD_FLAG_COMPRESSED: u32 = 0x0004_0000;
pub const RECORD_FLAG_CANT_WAIT: u32 = 0x0008_0000;

/// Named record flags. `persistent` aliases `quest_item`.
pub static RECORD_FLAGS: FlagSet = FlagSet {
    name: "record_flags",
    flags: &[
        ("isesm", RECORD_FLAG_ESM),
        ("deleted", RECORD_FLAG_DELETED),
        ("cast_shadows", RECORD_FLAG_CAST_SHADOWS),
        ("quest_item", RECORD_FLAG_QUEST_ITEM),
        ("persistent", RECORD_FLAG_QUEST_ITEM),
        ("initially_disabled", RECORD_FLAG_INITIALLY_DISABLED),
        ("ignored", RECORD_FLAG_IGNORED),
        ("visible_when_distant", RECORD_FLAG_VISIBLE_WHEN_DISTANT),
        ("dangerous_off_limits", RECORD_FLAG_DANGEROUS),
        ("is_compressed", RECORD_FLAG_COMPRESSED),
        ("cant_wait", RECORD_FLAG_CANT_WAIT),
    ],
};

/// Label shown for records without a `FULL` name.
pub const NO_NAME: &str = "#NO NAME#";

/// Canonical order of top-level groups in a master file.
pub const GROUP_ORDER: &[Tag] = &[
    Tag::new(b"GMST"),
    Tag::new(b"GLOB"),
    Tag::new(b"CLAS"),
    Tag::new(b"FACT"),
    Tag::new(b"HAIR"),
    Tag::new(b"EYES"),
    Tag::new(b"RACE"),
    Tag::new(b"SOUN"),
    Tag::new(b"SKIL"),
    Tag::new(b"MGEF"),
    Tag::new(b"SCPT"),
    Tag::new(b"LTEX"),
    Tag::new(b"ENCH"),
    Tag::new(b"SPEL"),
    Tag::new(b"BSGN"),
    Tag::new(b"ACTI"),
    Tag::new(b"APPA"),
    Tag::new(b"ARMO"),
    Tag::new(b"BOOK"),
    Tag::new(b"CLOT"),
    Tag::new(b"CONT"),
    Tag::new(b"DOOR"),
    Tag::new(b"INGR"),
    Tag::new(b"LIGH"),
    Tag::new(b"MISC"),
    Tag::new(b"STAT"),
    Tag::new(b"GRAS"),
    Tag::new(b"TREE"),
    Tag::new(b"FLOR"),
    Tag::new(b"FURN"),
    Tag::new(b"WEAP"),
    Tag::new(b"AMMO"),
    Tag::new(b"NPC_"),
    Tag::new(b"CREA"),
    Tag::new(b"LVLC"),
    Tag::new(b"SLGM"),
    Tag::new(b"KEYM"),
    Tag::new(b"ALCH"),
    Tag::new(b"SBSP"),
    Tag::new(b"SGST"),
    Tag::new(b"LVLI"),
    Tag::new(b"WTHR"),
    Tag::new(b"CLMT"),
    Tag::new(b"REGN"),
    Tag::new(b"CELL"),
    Tag::new(b"WRLD"),
    Tag::new(b"DIAL"),
    Tag::new(b"QUST"),
    Tag::new(b"IDLE"),
    Tag::new(b"PACK"),
    Tag::new(b"CSTY"),
    Tag::new(b"LSCR"),
    Tag::new(b"LVSP"),
    Tag::new(b"ANIO"),
    Tag::new(b"WATR"),
    Tag::new(b"EFSH"),
];

/// Position of `label` in [`GROUP_ORDER`]; unknown labels sort last.
pub fn group_rank(label: Tag) -> usize {
    GROUP_ORDER
        .iter()
        .position(|t| *t == label)
        .unwrap_or(GROUP_ORDER.len())
}
