// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bounded sub-stream over an underlying reader.
//!
//! [`BoundedReader`] restricts reads to a byte window so that an inner
//! decoder (one subrecord payload, one group body) can never observe bytes
//! that belong to a sibling or to the parent, even when its own size
//! accounting is wrong. Reads are clamped to the remaining budget; once the
//! budget is spent every read returns zero bytes.
//!
//! Positions and seeks are relative to the window origin.
//!
//! # Example
//!
//! ```
//! use std::io::{Cursor, Read};
//! use tes4codec::encoding::bounded::BoundedReader;
//!
//! let mut inner = Cursor::new(&b"abcdefgh"[..]);
//! let mut window = BoundedReader::new(&mut inner, 3).unwrap();
//! let mut buf = [0u8; 8];
//! assert_eq!(window.read(&mut buf).unwrap(), 3);
//! assert_eq!(&buf[..3], b"abc");
//! assert!(window.is_exhausted());
//! assert_eq!(window.read(&mut buf).unwrap(), 0);
//! ```

use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// A reader that never reads past `limit` bytes from its origin.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    /// Absolute position of the window start in `inner`
    origin: u64,
    /// Window length
    limit: u64,
    /// Position relative to `origin`
    pos: u64,
}

impl<R: Read + Seek> BoundedReader<R> {
    /// Open a window of `limit` bytes starting at the reader's current position.
    pub fn new(mut inner: R, limit: u64) -> io::Result<Self> {
        let origin = inner.stream_position()?;
        Ok(Self {
            inner,
            origin,
            limit,
            pos: 0,
        })
    }
}

impl<R> BoundedReader<R> {
    /// Window length in bytes.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Bytes left before the boundary.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.pos)
    }

    /// Whether the budget has been spent.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Position relative to the window origin.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Unwrap the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<'a> BoundedReader<Cursor<&'a [u8]>> {
    /// Window over a borrowed slice starting at `offset`.
    ///
    /// The window is additionally clamped to the end of the slice.
    pub fn over(data: &'a [u8], offset: usize, limit: u64) -> Self {
        let origin = offset.min(data.len()) as u64;
        let mut inner = Cursor::new(data);
        inner.set_position(origin);
        Self {
            inner,
            origin,
            limit: limit.min(data.len() as u64 - origin),
            pos: 0,
        }
    }

    /// Borrow up to `n` bytes without copying.
    ///
    /// Returns fewer than `n` bytes when the window (or slice) ends first,
    /// and an empty slice once exhausted.
    pub fn read_slice(&mut self, n: usize) -> &'a [u8] {
        let data: &'a [u8] = *self.inner.get_ref();
        let start = (self.origin + self.pos) as usize;
        let avail = (self.remaining() as usize).min(data.len().saturating_sub(start));
        let take = n.min(avail);
        let slice = &data[start..start + take];
        self.pos += take as u64;
        self.inner.set_position((start + take) as u64);
        slice
    }

    /// Borrow the rest of the window without copying.
    pub fn rest(&mut self) -> &'a [u8] {
        let n = self.remaining() as usize;
        self.read_slice(n)
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> &'a [u8] {
        let data: &'a [u8] = *self.inner.get_ref();
        let start = ((self.origin + self.pos) as usize).min(data.len());
        let avail = (self.remaining() as usize).min(data.len() - start);
        &data[start..start + n.min(avail)]
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let max = (buf.len() as u64).min(remaining) as usize;
        let n = self.inner.read(&mut buf[..max])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Seek> Seek for BoundedReader<R> {
    /// Seek within the window; positions past the boundary clamp to it.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target: i128 = match pos {
            SeekFrom::Start(n) => n as i128,
            SeekFrom::Current(delta) => self.pos as i128 + delta as i128,
            SeekFrom::End(delta) => self.limit as i128 + delta as i128,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of bounded window",
            ));
        }
        let clamped = (target as u64).min(self.limit);
        self.inner.seek(SeekFrom::Start(self.origin + clamped))?;
        self.pos = clamped;
        Ok(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian, ReadBytesExt};

    #[test]
    fn test_read_clamped_to_budget() {
        let data = b"0123456789";
        let mut inner = Cursor::new(&data[..]);
        inner.set_position(2);
        let mut window = BoundedReader::new(&mut inner, 4).unwrap();

        let mut buf = [0u8; 10];
        let n = window.read(&mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buf[..4], b"2345");
        assert!(window.is_exhausted());
        assert_eq!(window.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_exact_past_boundary_fails_without_leaking() {
        let data = b"abcdef";
        let mut window = BoundedReader::over(data, 0, 3);
        let mut buf = [0u8; 4];
        assert!(window.read_exact(&mut buf).is_err());
        // The sibling bytes are still unread in the underlying cursor.
        assert_eq!(window.into_inner().position(), 3);
    }

    #[test]
    fn test_position_and_seek_relative() {
        let data = b"xxHEADERyy";
        let mut window = BoundedReader::over(data, 2, 6);
        assert_eq!(window.position(), 0);
        window.seek(SeekFrom::Start(4)).unwrap();
        assert_eq!(window.position(), 4);
        assert_eq!(window.read_slice(10), b"ER");
        window.seek(SeekFrom::Start(1)).unwrap();
        assert_eq!(window.read_u8().unwrap(), b'E');
        assert_eq!(window.seek(SeekFrom::Start(100)).unwrap(), 6);
        assert!(window.seek(SeekFrom::Current(-10)).is_err());
        assert_eq!(window.seek(SeekFrom::End(-2)).unwrap(), 4);
    }

    #[test]
    fn test_read_slice_is_zero_copy_and_clamped() {
        let data = b"ABCDEFGH";
        let mut window = BoundedReader::over(data, 1, 5);
        let first = window.read_slice(2);
        assert_eq!(first, b"BC");
        assert_eq!(first.as_ptr(), data[1..].as_ptr());
        assert_eq!(window.peek(100), b"DEF");
        assert_eq!(window.rest(), b"DEF");
        assert_eq!(window.read_slice(1), b"");
    }

    #[test]
    fn test_over_clamps_to_slice_end() {
        let data = b"ABC";
        let mut window = BoundedReader::over(data, 1, 100);
        assert_eq!(window.limit(), 2);
        assert_eq!(window.rest(), b"BC");

        let window = BoundedReader::over(data, 10, 5);
        assert_eq!(window.limit(), 0);
        assert!(window.is_exhausted());
    }

    #[test]
    fn test_byteorder_reads_respect_window() {
        let mut data = Vec::new();
        data.extend(&7u32.to_le_bytes());
        data.extend(&9u32.to_le_bytes());
        let mut window = BoundedReader::over(&data, 0, 6);
        assert_eq!(window.read_u32::<LittleEndian>().unwrap(), 7);
        assert!(window.read_u32::<LittleEndian>().is_err());
    }
}
