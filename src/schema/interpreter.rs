// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Payload interpreters.
//!
//! An [`Interpreter`] turns the payload bytes of one subrecord into a
//! [`FieldValue`] and back. Every interpreter is exact: encoding a decoded
//! value reproduces the original payload byte for byte.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use encoding_rs::Encoding;

use crate::core::value::{FieldValue, FormId, ItemData};
use crate::encoding::text::{decode_zstring, encode_zstring};
use crate::encoding::view::{FlagSet, TupleFormat};
use crate::{CodecError, Result};

/// How a subrecord payload is interpreted.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Interpreter {
    /// Null-terminated string
    ZString,
    /// Little-endian `u32`
    UInt32,
    /// Little-endian `u64`
    UInt64,
    /// Reference to another record
    FormId,
    /// `{gold_value: u32, weight: f32}`
    ItemData,
    /// 32-bit flag word read through a mask table
    Flags(&'static FlagSet),
    /// One packed tuple
    Struct(&'static TupleFormat),
    /// Back-to-back packed tuples filling the whole payload
    Array(&'static TupleFormat),
    /// Uninterpreted bytes
    Raw,
}

impl Interpreter {
    /// Short name used in listings.
    pub fn name(&self) -> &'static str {
        match self {
            Interpreter::ZString => "zstring",
            Interpreter::UInt32 => "u32",
            Interpreter::UInt64 => "u64",
            Interpreter::FormId => "formid",
            Interpreter::ItemData => "item_data",
            Interpreter::Flags(set) => set.name,
            Interpreter::Struct(format) => format.name,
            Interpreter::Array(format) => format.name,
            Interpreter::Raw => "raw",
        }
    }

    /// Payload width for fixed-size interpreters.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Interpreter::UInt32 | Interpreter::FormId | Interpreter::Flags(_) => Some(4),
            Interpreter::UInt64 | Interpreter::ItemData => Some(8),
            Interpreter::Struct(format) => Some(format.size()),
            Interpreter::ZString | Interpreter::Array(_) | Interpreter::Raw => None,
        }
    }

    /// Decode a payload.
    ///
    /// A payload shorter than a fixed-size interpretation is truncated data;
    /// a longer one is a size mismatch, since decoding it would drop bytes.
    pub fn decode(
        &self,
        payload: &[u8],
        encoding: &'static Encoding,
        context: &str,
    ) -> Result<FieldValue> {
        if let Some(size) = self.fixed_size() {
            check_width(payload, size, context)?;
        }
        Ok(match self {
            Interpreter::ZString => FieldValue::ZString(decode_zstring(payload, encoding, context)?),
            Interpreter::UInt32 => FieldValue::UInt32(LittleEndian::read_u32(payload)),
            Interpreter::UInt64 => FieldValue::UInt64(LittleEndian::read_u64(payload)),
            Interpreter::FormId => FieldValue::FormId(FormId(LittleEndian::read_u32(payload))),
            Interpreter::ItemData => FieldValue::ItemData(ItemData {
                gold_value: LittleEndian::read_u32(&payload[0..4]),
                weight: LittleEndian::read_f32(&payload[4..8]),
            }),
            Interpreter::Flags(set) => FieldValue::Flags(set.wrap(LittleEndian::read_u32(payload))),
            Interpreter::Struct(format) => format.decode(payload)?,
            Interpreter::Array(format) => {
                let size = format.size();
                if size == 0 || payload.len() % size != 0 {
                    return Err(CodecError::size_mismatch(
                        format!("{context} ({} array)", format.name),
                        (payload.len() / size.max(1) * size) as u64,
                        payload.len() as u64,
                    ));
                }
                FieldValue::Array(
                    payload
                        .chunks_exact(size)
                        .map(|chunk| format.decode(chunk))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            Interpreter::Raw => FieldValue::Bytes(payload.to_vec()),
        })
    }

    /// Encode a value into payload bytes.
    pub fn encode(&self, value: &FieldValue, encoding: &'static Encoding) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.fixed_size().unwrap_or(16));
        match (self, value) {
            (Interpreter::ZString, FieldValue::ZString(s)) => encode_zstring(s, encoding, &mut out)?,
            (Interpreter::UInt32, FieldValue::UInt32(v)) => out.write_u32::<LittleEndian>(*v)?,
            (Interpreter::UInt64, FieldValue::UInt64(v)) => out.write_u64::<LittleEndian>(*v)?,
            (Interpreter::FormId, FieldValue::FormId(id)) => out.write_u32::<LittleEndian>(id.0)?,
            (Interpreter::ItemData, FieldValue::ItemData(data)) => {
                out.write_u32::<LittleEndian>(data.gold_value)?;
                out.write_f32::<LittleEndian>(data.weight)?;
            }
            (Interpreter::Flags(set), FieldValue::Flags(flags)) if flags.flag_set() == *set => {
                out.write_u32::<LittleEndian>(flags.bits())?
            }
            (Interpreter::Struct(format), value) => format.encode(value, &mut out)?,
            (Interpreter::Array(format), FieldValue::Array(items)) => {
                for item in items {
                    format.encode(item, &mut out)?;
                }
            }
            (Interpreter::Raw, FieldValue::Bytes(bytes)) => out.extend_from_slice(bytes),
            (interpreter, value) => {
                return Err(CodecError::encode(
                    interpreter.name(),
                    format!("cannot encode a {} value", value.type_name()),
                ))
            }
        }
        Ok(out)
    }
}

fn check_width(payload: &[u8], size: usize, context: &str) -> Result<()> {
    if payload.len() < size {
        return Err(CodecError::truncated(context, size, payload.len(), 0));
    }
    if payload.len() > size {
        return Err(CodecError::size_mismatch(
            context,
            size as u64,
            payload.len() as u64,
        ));
    }
    Ok(())
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interpreter({})", self.name())
    }
}
