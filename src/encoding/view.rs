// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Typed, offset-based views over borrowed bytes.
//!
//! Fixed headers are described by static [`Layout`] tables: each field has a
//! byte offset, a width and an interpretation. A [`StructView`] checks once,
//! at construction, that the region is at least as long as the layout; every
//! field read after that is infallible and copies nothing but the scalar.
//!
//! The same module provides the two composite interpretations shared by
//! headers and subrecord payloads:
//! - [`FlagSet`] / [`Flags`]: named bit tests against a mask table
//! - [`TupleFormat`]: packed little-endian tuples with named members

use std::fmt;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::core::tag::Tag;
use crate::core::value::FieldValue;
use crate::{CodecError, Result};

// ============================================================================
// Flags
// ============================================================================

/// A static table of named bit masks.
#[derive(Debug, PartialEq, Eq)]
pub struct FlagSet {
    /// Name of the set, used in diagnostics
    pub name: &'static str,
    /// `(flag name, mask)` pairs; masks may overlap or share bits
    pub flags: &'static [(&'static str, u32)],
}

impl FlagSet {
    /// Mask registered for `name`.
    pub fn mask(&self, name: &str) -> Option<u32> {
        self.flags
            .iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, mask)| *mask)
    }

    /// Interpret `bits` against this set.
    pub fn wrap(&'static self, bits: u32) -> Flags {
        Flags { bits, set: self }
    }

    /// Build a flag word from flag names.
    pub fn compose(&'static self, names: &[&str]) -> Result<Flags> {
        let mut bits = 0;
        for name in names {
            bits |= self
                .mask(name)
                .ok_or_else(|| CodecError::unknown_flag(*name))?;
        }
        Ok(self.wrap(bits))
    }
}

/// A flag word interpreted through a [`FlagSet`].
///
/// A flag reads as set when its mask ANDed with the word is nonzero, so a
/// multi-bit mask is set when any of its bits is.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    bits: u32,
    set: &'static FlagSet,
}

impl Flags {
    /// Raw flag word.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// The mask table these flags are read through.
    pub fn flag_set(&self) -> &'static FlagSet {
        self.set
    }

    /// Test a named flag.
    ///
    /// Undefined names are an error rather than `false`.
    pub fn get(&self, name: &str) -> Result<bool> {
        self.set
            .mask(name)
            .map(|mask| self.bits & mask != 0)
            .ok_or_else(|| CodecError::unknown_flag(name))
    }

    /// Test a raw mask.
    pub fn contains(&self, mask: u32) -> bool {
        self.bits & mask != 0
    }

    /// Return a copy with `mask` set or cleared.
    pub fn with(&self, mask: u32, on: bool) -> Self {
        let bits = if on { self.bits | mask } else { self.bits & !mask };
        Self { bits, set: self.set }
    }

    /// Every defined flag with its state, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.set
            .flags
            .iter()
            .map(move |(name, mask)| (*name, self.bits & mask != 0))
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Flags ")?;
        for (i, (name, on)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={on}")?;
        }
        write!(f, ">")
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on: Vec<&str> = self.iter().filter(|(_, on)| *on).map(|(n, _)| n).collect();
        if on.is_empty() {
            write!(f, "{:#x}", self.bits)
        } else {
            write!(f, "{:#x} ({})", self.bits, on.join("|"))
        }
    }
}

// ============================================================================
// Packed tuples
// ============================================================================

/// Scalar member of a packed tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    F32,
    /// Opaque fixed-width byte run
    Bytes(usize),
}

impl Scalar {
    /// Encoded width in bytes.
    pub const fn width(&self) -> usize {
        match self {
            Scalar::U8 | Scalar::I8 => 1,
            Scalar::U16 | Scalar::I16 => 2,
            Scalar::U32 | Scalar::I32 | Scalar::F32 => 4,
            Scalar::U64 => 8,
            Scalar::Bytes(n) => *n,
        }
    }

    /// Decode from exactly `self.width()` bytes.
    fn decode(&self, bytes: &[u8]) -> FieldValue {
        match self {
            Scalar::U8 => FieldValue::UInt8(bytes[0]),
            Scalar::I8 => FieldValue::Int8(bytes[0] as i8),
            Scalar::U16 => FieldValue::UInt16(LittleEndian::read_u16(bytes)),
            Scalar::I16 => FieldValue::Int16(LittleEndian::read_i16(bytes)),
            Scalar::U32 => FieldValue::UInt32(LittleEndian::read_u32(bytes)),
            Scalar::I32 => FieldValue::Int32(LittleEndian::read_i32(bytes)),
            Scalar::U64 => FieldValue::UInt64(LittleEndian::read_u64(bytes)),
            Scalar::F32 => FieldValue::Float32(LittleEndian::read_f32(bytes)),
            Scalar::Bytes(n) => FieldValue::Bytes(bytes[..*n].to_vec()),
        }
    }

    fn encode(&self, value: &FieldValue, out: &mut Vec<u8>) -> Result<()> {
        match (self, value) {
            (Scalar::U8, FieldValue::UInt8(v)) => out.push(*v),
            (Scalar::I8, FieldValue::Int8(v)) => out.push(*v as u8),
            (Scalar::U16, FieldValue::UInt16(v)) => out.write_u16::<LittleEndian>(*v)?,
            (Scalar::I16, FieldValue::Int16(v)) => out.write_i16::<LittleEndian>(*v)?,
            (Scalar::U32, FieldValue::UInt32(v)) => out.write_u32::<LittleEndian>(*v)?,
            (Scalar::I32, FieldValue::Int32(v)) => out.write_i32::<LittleEndian>(*v)?,
            (Scalar::U64, FieldValue::UInt64(v)) => out.write_u64::<LittleEndian>(*v)?,
            (Scalar::F32, FieldValue::Float32(v)) => out.write_f32::<LittleEndian>(*v)?,
            (Scalar::Bytes(n), FieldValue::Bytes(b)) if b.len() == *n => out.extend_from_slice(b),
            (scalar, value) => {
                return Err(CodecError::encode(
                    "packed tuple",
                    format!("cannot encode {} as {:?}", value.type_name(), scalar),
                ))
            }
        }
        Ok(())
    }
}

/// A packed little-endian tuple descriptor with named members.
#[derive(Debug, PartialEq, Eq)]
pub struct TupleFormat {
    pub name: &'static str,
    pub fields: &'static [(&'static str, Scalar)],
}

impl TupleFormat {
    /// Total encoded width.
    pub fn size(&self) -> usize {
        self.fields.iter().map(|(_, s)| s.width()).sum()
    }

    /// Decode the first `self.size()` bytes of `bytes` into a struct value.
    pub fn decode(&self, bytes: &[u8]) -> Result<FieldValue> {
        let size = self.size();
        if bytes.len() < size {
            return Err(CodecError::truncated(self.name, size, bytes.len(), 0));
        }
        let mut offset = 0;
        let mut members = Vec::with_capacity(self.fields.len());
        for (name, scalar) in self.fields {
            let width = scalar.width();
            members.push((
                name.to_string(),
                scalar.decode(&bytes[offset..offset + width]),
            ));
            offset += width;
        }
        Ok(FieldValue::Struct(members))
    }

    /// Encode a struct value produced by [`TupleFormat::decode`].
    pub fn encode(&self, value: &FieldValue, out: &mut Vec<u8>) -> Result<()> {
        let FieldValue::Struct(members) = value else {
            return Err(CodecError::encode(
                self.name,
                format!("expected struct, got {}", value.type_name()),
            ));
        };
        if members.len() != self.fields.len() {
            return Err(CodecError::encode(
                self.name,
                format!(
                    "expected {} members, got {}",
                    self.fields.len(),
                    members.len()
                ),
            ));
        }
        for ((name, scalar), (member_name, member)) in self.fields.iter().zip(members) {
            if name != member_name {
                return Err(CodecError::encode(
                    self.name,
                    format!("expected member '{name}', got '{member_name}'"),
                ));
            }
            scalar.encode(member, out)?;
        }
        Ok(())
    }
}

// ============================================================================
// Static layouts
// ============================================================================

/// How a header field is interpreted.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Fixed-length Latin-1 text
    FixedStr,
    /// Unsigned little-endian integer (1, 2, 4 or 8 bytes)
    UInt,
    /// Signed little-endian integer (1, 2, 4 or 8 bytes)
    Int,
    /// IEEE-754 single
    Float32,
    /// Flag word (4 bytes) read through a mask table
    Flags(&'static FlagSet),
    /// Packed tuple
    Tuple(&'static TupleFormat),
}

/// One field of a fixed layout.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, offset: usize, width: usize, kind: FieldKind) -> Self {
        Self {
            name,
            offset,
            width,
            kind,
        }
    }

    const fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// A fixed-size header described as a table of fields.
#[derive(Debug)]
pub struct Layout {
    pub name: &'static str,
    pub size: usize,
    pub fields: &'static [FieldSpec],
}

impl Layout {
    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether every field lies within `size` and has a width its kind can read.
    pub fn is_consistent(&self) -> bool {
        self.fields.iter().all(|f| {
            f.end() <= self.size
                && match f.kind {
                    FieldKind::UInt | FieldKind::Int => matches!(f.width, 1 | 2 | 4 | 8),
                    FieldKind::Float32 | FieldKind::Flags(_) => f.width == 4,
                    FieldKind::Tuple(t) => t.size() == f.width,
                    FieldKind::FixedStr => true,
                }
        })
    }

    /// View `bytes` through this layout.
    ///
    /// Fails with truncated data when `bytes` is shorter than the layout.
    pub fn view<'a>(&'static self, bytes: &'a [u8], offset: u64) -> Result<StructView<'a>> {
        if bytes.len() < self.size {
            return Err(CodecError::truncated(
                self.name,
                self.size,
                bytes.len(),
                offset,
            ));
        }
        Ok(StructView {
            layout: self,
            bytes: &bytes[..self.size],
        })
    }
}

/// A length-checked view of one fixed layout.
#[derive(Clone, Copy)]
pub struct StructView<'a> {
    layout: &'static Layout,
    bytes: &'a [u8],
}

impl<'a> StructView<'a> {
    /// The layout this view reads through.
    pub fn layout(&self) -> &'static Layout {
        self.layout
    }

    /// The bytes covered by the layout.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Raw bytes of one field.
    pub fn raw(&self, spec: &FieldSpec) -> &'a [u8] {
        &self.bytes[spec.offset..spec.offset + spec.width]
    }

    pub fn tag(&self, spec: &FieldSpec) -> Tag {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&self.raw(spec)[..4]);
        Tag(tag)
    }

    /// Fixed-length Latin-1 text.
    pub fn fixed_str(&self, spec: &FieldSpec) -> String {
        self.raw(spec).iter().map(|&b| b as char).collect()
    }

    pub fn uint(&self, spec: &FieldSpec) -> u64 {
        let raw = self.raw(spec);
        match raw.len() {
            1 => raw[0] as u64,
            2 => LittleEndian::read_u16(raw) as u64,
            4 => LittleEndian::read_u32(raw) as u64,
            _ => LittleEndian::read_u64(raw),
        }
    }

    pub fn u32(&self, spec: &FieldSpec) -> u32 {
        self.uint(spec) as u32
    }

    pub fn u16(&self, spec: &FieldSpec) -> u16 {
        self.uint(spec) as u16
    }

    pub fn int(&self, spec: &FieldSpec) -> i64 {
        let raw = self.raw(spec);
        match raw.len() {
            1 => raw[0] as i8 as i64,
            2 => LittleEndian::read_i16(raw) as i64,
            4 => LittleEndian::read_i32(raw) as i64,
            _ => LittleEndian::read_i64(raw),
        }
    }

    pub fn f32(&self, spec: &FieldSpec) -> f32 {
        LittleEndian::read_f32(self.raw(spec))
    }

    /// Flag word; `spec` must be a [`FieldKind::Flags`] field.
    pub fn flags(&self, spec: &FieldSpec) -> Option<Flags> {
        match spec.kind {
            FieldKind::Flags(set) => Some(set.wrap(LittleEndian::read_u32(self.raw(spec)))),
            _ => None,
        }
    }

    /// Decode any field by its declared kind.
    pub fn value(&self, spec: &FieldSpec) -> Result<FieldValue> {
        Ok(match spec.kind {
            FieldKind::FixedStr => FieldValue::ZString(self.fixed_str(spec)),
            FieldKind::UInt => match spec.width {
                1 => FieldValue::UInt8(self.uint(spec) as u8),
                2 => FieldValue::UInt16(self.uint(spec) as u16),
                4 => FieldValue::UInt32(self.uint(spec) as u32),
                _ => FieldValue::UInt64(self.uint(spec)),
            },
            FieldKind::Int => FieldValue::Int32(self.int(spec) as i32),
            FieldKind::Float32 => FieldValue::Float32(self.f32(spec)),
            FieldKind::Flags(set) => FieldValue::Flags(set.wrap(self.u32(spec))),
            FieldKind::Tuple(format) => format.decode(self.raw(spec))?,
        })
    }

    /// Decode a field by name.
    pub fn get(&self, name: &str) -> Result<FieldValue> {
        let spec = self.layout.field(name).ok_or_else(|| {
            CodecError::Other(format!("layout {} has no field '{name}'", self.layout.name))
        })?;
        self.value(spec)
    }
}

impl fmt::Debug for StructView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct(self.layout.name);
        for spec in self.layout.fields {
            match self.value(spec) {
                Ok(v) => dbg.field(spec.name, &v),
                Err(_) => dbg.field(spec.name, &"<invalid>"),
            };
        }
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ABC: FlagSet = FlagSet {
        name: "abc",
        flags: &[("a", 0b010), ("b", 0b001), ("c", 0b011)],
    };

    static PAIR: TupleFormat = TupleFormat {
        name: "pair",
        fields: &[("a", Scalar::U8), ("b", Scalar::Bytes(1))],
    };

    static DUMMY: Layout = Layout {
        name: "dummy",
        size: 6,
        fields: &[
            FieldSpec::new("num", 0, 2, FieldKind::UInt),
            FieldSpec::new("pair", 0, 2, FieldKind::Tuple(&PAIR)),
            FieldSpec::new("flags", 2, 4, FieldKind::Flags(&ABC)),
            FieldSpec::new("text", 3, 3, FieldKind::FixedStr),
        ],
    };

    // 0x42 0x00 | 0b101 | "Hel"
    const DATA: &[u8] = b"\x42\x00\x05\x00\x00\x00HelloWorld!\0";

    #[test]
    fn test_flags_named_bits() {
        let flags = ABC.wrap(0b101);
        assert!(!flags.get("a").unwrap());
        assert!(flags.get("b").unwrap());
        assert!(flags.get("c").unwrap());
    }

    #[test]
    fn test_flags_unknown_name_is_error() {
        let flags = ABC.wrap(0b101);
        let err = flags.get("d").unwrap_err();
        assert!(matches!(err, CodecError::UnknownFlag { .. }));
    }

    #[test]
    fn test_flags_debug_and_compose() {
        let flags = ABC.compose(&["a", "b"]).unwrap();
        assert_eq!(flags.bits(), 0b011);
        assert_eq!(format!("{:?}", flags), "<Flags a=true, b=true, c=true>");
        assert!(ABC.compose(&["zz"]).is_err());
        assert_eq!(flags.with(0b010, false).bits(), 0b001);
    }

    #[test]
    fn test_layout_is_consistent() {
        assert!(DUMMY.is_consistent());
        static BAD: Layout = Layout {
            name: "bad",
            size: 4,
            fields: &[FieldSpec::new("x", 2, 4, FieldKind::UInt)],
        };
        assert!(!BAD.is_consistent());
    }

    #[test]
    fn test_view_fields() {
        let view = DUMMY.view(DATA, 0).unwrap();
        assert_eq!(view.get("num").unwrap(), FieldValue::UInt16(0x42));
        let flags = view.flags(DUMMY.field("flags").unwrap()).unwrap();
        assert!(flags.get("b").unwrap());
        assert!(!flags.get("a").unwrap());
        // Bytes 3..6 are the high bytes of the flag word.
        assert_eq!(view.fixed_str(DUMMY.field("text").unwrap()), "\0\0\0");
    }

    #[test]
    fn test_view_tuple() {
        let view = DUMMY.view(DATA, 0).unwrap();
        let pair = view.get("pair").unwrap();
        assert_eq!(pair.field("a"), Some(&FieldValue::UInt8(0x42)));
        assert_eq!(pair.field("b"), Some(&FieldValue::Bytes(vec![0])));
    }

    #[test]
    fn test_view_too_short() {
        let err = DUMMY.view(&DATA[..5], 7).unwrap_err();
        match err {
            CodecError::TruncatedData {
                requested,
                available,
                offset,
                ..
            } => {
                assert_eq!(requested, 6);
                assert_eq!(available, 5);
                assert_eq!(offset, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_view_unknown_field() {
        let view = DUMMY.view(DATA, 0).unwrap();
        assert!(view.get("nope").is_err());
    }

    #[test]
    fn test_tuple_encode_matches_decode() {
        let bytes = [0x07u8, 0x09];
        let value = PAIR.decode(&bytes).unwrap();
        let mut out = Vec::new();
        PAIR.encode(&value, &mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_tuple_encode_rejects_wrong_shape() {
        let mut out = Vec::new();
        assert!(PAIR.encode(&FieldValue::UInt8(1), &mut out).is_err());
        let wrong = FieldValue::Struct(vec![
            ("a".into(), FieldValue::UInt16(1)),
            ("b".into(), FieldValue::Bytes(vec![0])),
        ]);
        assert!(PAIR.encode(&wrong, &mut out).is_err());
    }
}
