// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Built-in subrecord declarations.

use super::interpreter::Interpreter;
use crate::core::tag::Tag;
use crate::encoding::view::{FlagSet, Scalar, TupleFormat};

/// Record type that matches every record.
pub const WILDCARD: &str = "*";

/// One declaration: every record type in `records` (`None` is the wildcard)
/// crossed with every subrecord type in `subrecords`.
#[derive(Debug)]
pub struct Declaration {
    pub records: &'static [Option<Tag>],
    pub subrecords: &'static [Tag],
    pub interpreter: Interpreter,
}

/// `HEDR` of the file header.
pub static HEADER_DATA: TupleFormat = TupleFormat {
    name: "header_data",
    fields: &[
        ("version", Scalar::F32),
        ("num_records", Scalar::I32),
        ("next_object_id", Scalar::U32),
    ],
};

/// One entry of the file header's `OFST` table.
pub static OFFSET_ENTRY: TupleFormat = TupleFormat {
    name: "offset_entry",
    fields: &[
        ("offset", Scalar::Bytes(3)),
        ("type_num", Scalar::I8),
        ("record_type", Scalar::Bytes(4)),
    ],
};

/// Body slots hidden by clothing and armor (`BMDT`).
pub static BIPED_FLAGS: FlagSet = FlagSet {
    name: "biped_flags",
    flags: &[
        ("hide_rings", 0x0001_0000),
        ("hide_amulet", 0x0002_0000),
        ("nonplayable", 0x0040_0000),
        ("default", 0xCD00_0000),
    ],
};

const ITEM_RECORDS: &[Option<Tag>] = &[Some(Tag::new(b"CLOT")), Some(Tag::new(b"ARMO"))];
const HEADER_RECORD: &[Option<Tag>] = &[Some(Tag::TES4)];

pub static DEFAULT_DECLARATIONS: &[Declaration] = &[
    Declaration {
        records: &[None],
        subrecords: &[Tag::EDID, Tag::FULL],
        interpreter: Interpreter::ZString,
    },
    Declaration {
        records: HEADER_RECORD,
        subrecords: &[Tag::new(b"HEDR")],
        interpreter: Interpreter::Struct(&HEADER_DATA),
    },
    Declaration {
        records: HEADER_RECORD,
        subrecords: &[Tag::new(b"OFST")],
        interpreter: Interpreter::Array(&OFFSET_ENTRY),
    },
    Declaration {
        records: HEADER_RECORD,
        subrecords: &[Tag::new(b"SNAM"), Tag::new(b"CNAM"), Tag::new(b"MAST")],
        interpreter: Interpreter::ZString,
    },
    // Size of the preceding master file.
    Declaration {
        records: HEADER_RECORD,
        subrecords: &[Tag::DATA],
        interpreter: Interpreter::UInt64,
    },
    Declaration {
        records: ITEM_RECORDS,
        subrecords: &[
            Tag::new(b"MODL"),
            Tag::new(b"MOD2"),
            Tag::new(b"MOD3"),
            Tag::new(b"MOD4"),
            Tag::new(b"ICON"),
            Tag::new(b"ICO2"),
        ],
        interpreter: Interpreter::ZString,
    },
    Declaration {
        records: ITEM_RECORDS,
        subrecords: &[Tag::new(b"ENAM")],
        interpreter: Interpreter::FormId,
    },
    Declaration {
        records: ITEM_RECORDS,
        subrecords: &[Tag::DATA],
        interpreter: Interpreter::ItemData,
    },
    Declaration {
        records: ITEM_RECORDS,
        subrecords: &[Tag::new(b"BMDT")],
        interpreter: Interpreter::Flags(&BIPED_FLAGS),
    },
];
