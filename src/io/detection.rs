// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Plugin and master file detection.
//!
//! A file is recognized by its leading file-header record (`TES4`); the
//! master bit of that record's flags separates masters from plugins. When
//! the header cannot be read, the `.esm` / `.esp` extension decides.
//!
//! # Example
//!
//! ```rust,no_run
//! use tes4codec::io::detection::{detect_kind, FileKind};
//!
//! let kind = detect_kind("Oblivion.esm")?;
//! assert_eq!(kind, FileKind::Master);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::io::formats::tes4::constants::{RECORD_FLAG_ESM, RECORD_HEADER_SIZE};
use crate::CodecError;

/// Kind of a container file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Master file (`.esm`)
    Master,
    /// Plugin file (`.esp`)
    Plugin,
    Unknown,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Master => "master",
            FileKind::Plugin => "plugin",
            FileKind::Unknown => "unknown",
        }
    }
}

/// Detect the kind of a file from its header, falling back to its extension.
pub fn detect_kind<P: AsRef<Path>>(path: P) -> Result<FileKind, CodecError> {
    let path_ref = path.as_ref();

    match detect_from_magic(path_ref) {
        Ok(FileKind::Unknown) | Err(_) => Ok(detect_from_extension(path_ref)),
        Ok(kind) => Ok(kind),
    }
}

/// Detect the kind from the in-memory file header.
pub fn detect_from_header(header: &[u8]) -> FileKind {
    if header.len() < RECORD_HEADER_SIZE || &header[..4] != b"TES4" {
        return FileKind::Unknown;
    }
    if LittleEndian::read_u32(&header[8..12]) & RECORD_FLAG_ESM != 0 {
        FileKind::Master
    } else {
        FileKind::Plugin
    }
}

fn detect_from_magic(path: &Path) -> Result<FileKind, CodecError> {
    let mut file = File::open(path)
        .map_err(|e| CodecError::encode("FormatDetection", format!("Failed to open file: {e}")))?;

    let mut header = [0u8; RECORD_HEADER_SIZE];
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..]).map_err(|e| {
            CodecError::encode("FormatDetection", format!("Failed to read header: {e}"))
        })?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    Ok(detect_from_header(&header[..filled]))
}

fn detect_from_extension(path: &Path) -> FileKind {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "esm" => FileKind::Master,
            "esp" => FileKind::Plugin,
            _ => FileKind::Unknown,
        })
        .unwrap_or(FileKind::Unknown)
}

/// Whether a file looks like a plugin or master.
pub fn is_tes4_file<P: AsRef<Path>>(path: P) -> bool {
    !matches!(detect_kind(path), Ok(FileKind::Unknown) | Err(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_temp_file(name: &str, ext: &str, data: &[u8]) -> String {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "tes4codec_test_detect_{}_{}.{}",
            std::process::id(),
            name,
            ext
        ));
        {
            let mut temp_file = File::create(&path).unwrap();
            temp_file.write_all(data).unwrap();
            temp_file.flush().unwrap();
        }
        path.to_str().unwrap().to_string()
    }

    fn header(flags: u32) -> Vec<u8> {
        let mut bytes = b"TES4".to_vec();
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&flags.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        bytes
    }

    #[test]
    fn test_detect_master_from_flags() {
        // The header wins over a misleading extension.
        let path = create_temp_file("magic_master", "esp", &header(0x01));
        assert_eq!(detect_kind(&path).unwrap(), FileKind::Master);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_detect_plugin_from_flags() {
        let path = create_temp_file("magic_plugin", "bin", &header(0));
        assert_eq!(detect_kind(&path).unwrap(), FileKind::Plugin);
        assert!(is_tes4_file(&path));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_detect_from_extension() {
        let path = create_temp_file("ext_esm", "esm", b"short");
        assert_eq!(detect_kind(&path).unwrap(), FileKind::Master);
        let _ = std::fs::remove_file(&path);

        let path = create_temp_file("ext_esp", "ESP", b"short");
        assert_eq!(detect_kind(&path).unwrap(), FileKind::Plugin);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unknown_format() {
        let path = create_temp_file("unknown", "xyz", b"unknown content here");
        assert_eq!(detect_kind(&path).unwrap(), FileKind::Unknown);
        assert!(!is_tes4_file(&path));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_uses_extension() {
        assert_eq!(
            detect_kind("/nonexistent/Oblivion.esm").unwrap(),
            FileKind::Master
        );
    }
}
