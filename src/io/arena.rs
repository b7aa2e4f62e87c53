// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Memory-mapped plugin files.
//!
//! The `MmapArena` owns the mapping of one plugin or master file; every
//! container, group and record view borrows from it, so the borrow checker
//! guarantees the mapping outlives the views.
//!
//! # Ownership Model
//!
//! ```text
//! MmapArena (owns mmap)
//!   ↓
//! Container<'arena> (borrows the whole file)
//!   ↓
//! Group<'arena> / Record<'arena> / SubRecord<'arena>
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tes4codec::io::arena::MmapArena;
//! use tes4codec::Container;
//!
//! let arena = MmapArena::open("Oblivion.esm")?;
//! let container = Container::new(arena.data())?;
//! println!("{} top-level groups", container.groups()?.len());
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use tracing::debug;

use crate::CodecError;

/// A read-only memory mapping of one file.
///
/// Slices handed out by the arena are tied to its lifetime.
pub struct MmapArena {
    mmap: memmap2::Mmap,
    /// File path for diagnostics
    path: String,
}

impl MmapArena {
    /// Open and map a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file = File::open(path_ref).map_err(|e| CodecError::io(path_str.clone(), e))?;

        // The mapping is owned by the arena and only lent out through
        // borrows tied to it.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| CodecError::io(path_str.clone(), e))?;
        debug!(path = %path_str, len = mmap.len(), "mapped file");

        Ok(Self {
            mmap,
            path: path_str,
        })
    }

    /// File path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The whole mapped file.
    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Bounds-checked sub-slice.
    ///
    /// # Errors
    ///
    /// Returns truncated data if the range runs past the end of the file.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8], CodecError> {
        let available = self.mmap.len().saturating_sub(offset);
        match offset.checked_add(len) {
            Some(end) if end <= self.mmap.len() => Ok(&self.mmap[offset..end]),
            _ => Err(CodecError::truncated(
                self.path.clone(),
                len,
                available,
                offset as u64,
            )),
        }
    }
}

impl Deref for MmapArena {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.mmap
    }
}

impl AsRef<[u8]> for MmapArena {
    fn as_ref(&self) -> &[u8] {
        &self.mmap
    }
}

impl std::fmt::Debug for MmapArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapArena")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}
