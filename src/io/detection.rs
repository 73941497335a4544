// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Format detection using magic numbers and file analysis.
//!
//! # Supported Formats
//!
//! - **MCAP**: `\x89MCAP0\r\n` at the start of the file
//! - **ROS1 Bag**: `#ROSBAG V2.0` version line
//! - **rosbag2 SQLite**: SQLite database header (`SQLite format 3\0`)
//!
//! A rosbag2 recording is usually a directory holding `metadata.yaml` next to
//! one or more storage files; [`resolve_storage_paths`] maps such a directory
//! to the storage files that make up the recording, in split order.
//!
//! # Example
//!
//! ```rust,no_run
//! use odomcodec::io::detection::detect_format;
//! use odomcodec::io::metadata::LogFormat;
//!
//! let format = detect_format("run9.db3")?;
//! assert_eq!(format, LogFormat::Rosbag2Sqlite);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::ExportError;

use super::metadata::LogFormat;

/// MCAP magic bytes (`\x89MCAP0\r\n`).
pub const MCAP_MAGIC: &[u8] = b"\x89MCAP0\r\n";

/// ROS1 bag version line prefix.
pub const ROSBAG_MAGIC: &[u8] = b"#ROSBAG";

/// SQLite database header.
pub const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

/// Detect the storage format of a log file.
///
/// Magic numbers are checked first; the file extension is the fallback.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<LogFormat, ExportError> {
    let path_ref = path.as_ref();

    match detect_from_magic(path_ref) {
        Ok(LogFormat::Unknown) | Err(_) => {}
        Ok(format) => return Ok(format),
    }

    Ok(detect_from_extension(path_ref))
}

/// Map a rosbag2 directory to its storage files.
///
/// A regular file is returned as the only element. For a directory, every
/// `.mcap` or `.db3` file is returned in split order (`run_0`, `run_1`, ...,
/// `run_10`); a directory without one is an unsupported input.
pub fn resolve_storage_paths<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>, ExportError> {
    let path_ref = path.as_ref();
    if !path_ref.is_dir() {
        return Ok(vec![path_ref.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path_ref).map_err(|e| {
        ExportError::log_read("FormatDetection", format!("Failed to list directory: {e}"))
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            matches!(
                detect_from_extension(p),
                LogFormat::Mcap | LogFormat::Rosbag2Sqlite
            )
        })
        .collect();
    candidates.sort_by_cached_key(|p| split_key(p));

    if candidates.is_empty() {
        return Err(ExportError::unsupported(format!(
            "directory '{}' contains no .mcap or .db3 storage file",
            path_ref.display()
        )));
    }
    Ok(candidates)
}

/// Sort key for rosbag2 split files: `<prefix>_<index>.<ext>`.
///
/// Files without a numeric suffix sort by name after the prefix comparison.
fn split_key(path: &Path) -> (String, Option<u64>, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.rsplit_once('_') {
        Some((prefix, index)) => match index.parse::<u64>() {
            Ok(index) => (prefix.to_string(), Some(index), name),
            Err(_) => (stem.clone(), None, name),
        },
        None => (stem.clone(), None, name),
    }
}

/// Detect format by reading file magic numbers.
fn detect_from_magic(path: &Path) -> Result<LogFormat, ExportError> {
    let mut file = File::open(path).map_err(|e| {
        ExportError::log_read("FormatDetection", format!("Failed to open file: {e}"))
    })?;

    let mut header = [0u8; 16];
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..]).map_err(|e| {
            ExportError::log_read("FormatDetection", format!("Failed to read header: {e}"))
        })?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    let header = &header[..filled];

    if header.starts_with(MCAP_MAGIC) {
        return Ok(LogFormat::Mcap);
    }
    if header.starts_with(ROSBAG_MAGIC) {
        return Ok(LogFormat::Bag);
    }
    if header.starts_with(SQLITE_MAGIC) {
        return Ok(LogFormat::Rosbag2Sqlite);
    }

    Ok(LogFormat::Unknown)
}

/// Detect format from file extension (fallback).
fn detect_from_extension(path: &Path) -> LogFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "mcap" => LogFormat::Mcap,
            "bag" => LogFormat::Bag,
            "db3" => LogFormat::Rosbag2Sqlite,
            _ => LogFormat::Unknown,
        })
        .unwrap_or(LogFormat::Unknown)
}
