// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded field value type system.
//!
//! Subrecord payloads are interpreted through the schema table into a
//! [`FieldValue`]. Values are owned, serde-serializable, and carry enough
//! information to be encoded back into the exact payload bytes.

use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::encoding::view::Flags;

/// A 32-bit form identifier naming a record across the container.
///
/// The top byte is the load-order index of the owning master.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FormId(pub u32);

impl FormId {
    /// Load-order index of the owning master file.
    pub fn mod_index(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Object index within the owning master.
    pub fn object_index(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl fmt::Debug for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormId({:#010X})", self.0)
    }
}

impl std::str::FromStr for FormId {
    type Err = std::num::ParseIntError;

    /// Parse hex, with or without a `0x` prefix.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u32::from_str_radix(digits, 16).map(FormId)
    }
}

impl Serialize for FormId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Value and weight of an item (`DATA` on clothing and armor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemData {
    pub gold_value: u32,
    pub weight: f32,
}

/// Unified value type for decoded subrecord payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Null-terminated string in the configured text encoding
    ZString(String),

    UInt8(u8),
    Int8(i8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    UInt64(u64),
    Float32(f32),

    /// Reference to another record
    FormId(FormId),

    /// Gold value and weight pair
    ItemData(ItemData),

    /// Named bit flags
    Flags(Flags),

    /// Packed tuple with named members, in declaration order
    Struct(Vec<(String, FieldValue)>),

    /// Repeated packed tuples
    Array(Vec<FieldValue>),

    /// Uninterpreted payload
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Short type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::ZString(_) => "zstring",
            FieldValue::UInt8(_) => "u8",
            FieldValue::Int8(_) => "i8",
            FieldValue::UInt16(_) => "u16",
            FieldValue::Int16(_) => "i16",
            FieldValue::UInt32(_) => "u32",
            FieldValue::Int32(_) => "i32",
            FieldValue::UInt64(_) => "u64",
            FieldValue::Float32(_) => "f32",
            FieldValue::FormId(_) => "formid",
            FieldValue::ItemData(_) => "item_data",
            FieldValue::Flags(_) => "flags",
            FieldValue::Struct(_) => "struct",
            FieldValue::Array(_) => "array",
            FieldValue::Bytes(_) => "bytes",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::ZString(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of any unsigned scalar that fits in 32 bits (and form ids).
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            FieldValue::UInt8(v) => Some(*v as u32),
            FieldValue::UInt16(v) => Some(*v as u32),
            FieldValue::UInt32(v) => Some(*v),
            FieldValue::FormId(id) => Some(id.0),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            FieldValue::Float32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_form_id(&self) -> Option<FormId> {
        match self {
            FieldValue::FormId(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_item_data(&self) -> Option<ItemData> {
        match self {
            FieldValue::ItemData(data) => Some(*data),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<&Flags> {
        match self {
            FieldValue::Flags(flags) => Some(flags),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Look up a named member of a struct value.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        match self {
            FieldValue::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::ZString(s) => write!(f, "{s:?}"),
            FieldValue::UInt8(v) => write!(f, "{v}"),
            FieldValue::Int8(v) => write!(f, "{v}"),
            FieldValue::UInt16(v) => write!(f, "{v}"),
            FieldValue::Int16(v) => write!(f, "{v}"),
            FieldValue::UInt32(v) => write!(f, "{v}"),
            FieldValue::Int32(v) => write!(f, "{v}"),
            FieldValue::UInt64(v) => write!(f, "{v}"),
            FieldValue::Float32(v) => write!(f, "{v}"),
            FieldValue::FormId(id) => write!(f, "[{id}]"),
            FieldValue::ItemData(d) => {
                write!(f, "gold_value={}, weight={}", d.gold_value, d.weight)
            }
            FieldValue::Flags(flags) => write!(f, "{flags}"),
            FieldValue::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            FieldValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            FieldValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::ZString(s) => serializer.serialize_str(s),
            FieldValue::UInt8(v) => serializer.serialize_u8(*v),
            FieldValue::Int8(v) => serializer.serialize_i8(*v),
            FieldValue::UInt16(v) => serializer.serialize_u16(*v),
            FieldValue::Int16(v) => serializer.serialize_i16(*v),
            FieldValue::UInt32(v) => serializer.serialize_u32(*v),
            FieldValue::Int32(v) => serializer.serialize_i32(*v),
            FieldValue::UInt64(v) => serializer.serialize_u64(*v),
            FieldValue::Float32(v) => serializer.serialize_f32(*v),
            FieldValue::FormId(id) => id.serialize(serializer),
            FieldValue::ItemData(d) => d.serialize(serializer),
            FieldValue::Flags(flags) => flags.serialize(serializer),
            FieldValue::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            FieldValue::Array(items) => items.serialize(serializer),
            FieldValue::Bytes(b) => serializer.serialize_str(&hex::encode(b)),
        }
    }
}

impl Serialize for Flags {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Flags", 2)?;
        st.serialize_field("bits", &format!("{:#010x}", self.bits()))?;
        let set: Vec<&str> = self
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| name)
            .collect();
        st.serialize_field("set", &set)?;
        st.end()
    }
}
