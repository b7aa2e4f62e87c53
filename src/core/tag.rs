// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Four-byte type tags.
//!
//! Groups, records and subrecords all start with a 4-character tag such as
//! `GRUP`, `CLOT` or `EDID`. Tags are stored as raw bytes and rendered as
//! Latin-1 so that any byte value round-trips.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::error::CodecError;

/// A 4-byte type tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Marker of every group header.
    pub const GRUP: Tag = Tag(*b"GRUP");
    /// Type of the file header record.
    pub const TES4: Tag = Tag(*b"TES4");
    /// Display name subrecord.
    pub const FULL: Tag = Tag(*b"FULL");
    /// Editor id subrecord.
    pub const EDID: Tag = Tag(*b"EDID");
    /// Generic data subrecord.
    pub const DATA: Tag = Tag(*b"DATA");

    /// Build a tag from a 4-byte literal.
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Tag(*bytes)
    }

    /// Build a tag from the first four bytes of a slice.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let head: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        Some(Tag(head))
    }

    /// Raw tag bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether this is the group marker.
    pub fn is_group(&self) -> bool {
        *self == Tag::GRUP
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(\"{self}\")")
    }
}

impl FromStr for Tag {
    type Err = CodecError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return Err(CodecError::Other(format!(
                "tag must be exactly 4 bytes, got {:?}",
                s
            )));
        }
        let mut tag = [0u8; 4];
        tag.copy_from_slice(bytes);
        Ok(Tag(tag))
    }
}

impl From<[u8; 4]> for Tag {
    fn from(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        other.as_bytes() == self.0
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
