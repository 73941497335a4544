// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Unified log source with automatic format detection.
//!
//! [`LogSource::open`] is the single entry point for reading a recorded log:
//! it verifies the input exists, resolves rosbag2 directories to their storage
//! file, detects the storage format and opens the matching backend.
//!
//! # Example
//!
//! ```rust,no_run
//! use odomcodec::io::LogSource;
//!
//! let source = LogSource::open("run9.db3")?;
//! let mut reader = source.reader()?;
//! while reader.has_next() {
//!     let record = reader.read_next()?;
//!     println!("{} @ {}", record.channel, record.timestamp);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod sequential;

pub use sequential::SequentialReader;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::io::detection::{detect_format, resolve_storage_paths};
use crate::io::formats::{BagStorage, McapStorage, SqliteStorage};
use crate::io::metadata::{ChannelInfo, LogFormat, LogRecord};
use crate::io::traits::{LogStorage, RecordStream};
use crate::{ExportError, Result};

/// An opened log, ready for one or more sequential passes.
///
/// A rosbag2 recording split across several storage files is read as one
/// log: the files are replayed back to back in split order. File handles
/// (or mappings, or database connections) are held for as long as the source
/// is alive and released when it is dropped.
pub struct LogSource {
    /// Path as given by the caller
    input: PathBuf,
    /// Format-specific storage backends, in split order (never empty)
    storages: Vec<Box<dyn LogStorage>>,
}

fn open_storage(path: &Path) -> Result<Box<dyn LogStorage>> {
    let storage: Box<dyn LogStorage> = match detect_format(path)? {
        LogFormat::Mcap => Box::new(McapStorage::open(path)?),
        LogFormat::Bag => Box::new(BagStorage::open(path)?),
        LogFormat::Rosbag2Sqlite => Box::new(SqliteStorage::open(path)?),
        LogFormat::Unknown => {
            return Err(ExportError::unsupported(format!(
                "unrecognized log format: '{}'",
                path.display()
            )))
        }
    };
    Ok(storage)
}

/// Merge per-file channel listings: one entry per topic, counts summed.
fn merge_channels(listings: Vec<Vec<ChannelInfo>>) -> Vec<ChannelInfo> {
    let mut merged: Vec<ChannelInfo> = Vec::new();
    for channel in listings.into_iter().flatten() {
        match merged.iter_mut().find(|c| c.topic == channel.topic) {
            Some(existing) => existing.message_count += channel.message_count,
            None => merged.push(channel),
        }
    }
    merged
}

impl LogSource {
    /// Open a log for reading.
    ///
    /// Existence is checked before anything else; a missing path fails with
    /// [`ExportError::InputNotFound`] without touching the filesystem further.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let input = path.as_ref();
        if !input.exists() {
            return Err(ExportError::input_not_found(input));
        }

        let storages = resolve_storage_paths(input)?
            .iter()
            .map(|p| open_storage(p))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            input = %input.display(),
            files = storages.len(),
            storage = storages.first().map(|s| s.path()).unwrap_or_default(),
            "opened log source"
        );

        Ok(Self {
            input: input.to_path_buf(),
            storages,
        })
    }

    /// Path the source was opened with.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Path of the first storage file read.
    pub fn storage_path(&self) -> &str {
        self.storages.first().map(|s| s.path()).unwrap_or_default()
    }

    /// Paths of every storage file, in the order they are read.
    pub fn storage_paths(&self) -> Vec<&str> {
        self.storages.iter().map(|s| s.path()).collect()
    }

    /// Storage format of the first storage file.
    pub fn format(&self) -> LogFormat {
        self.storages
            .first()
            .map(|s| s.format())
            .unwrap_or(LogFormat::Unknown)
    }

    /// List the channels recorded in the log, with message counts.
    pub fn channels(&self) -> Result<Vec<ChannelInfo>> {
        let listings = self
            .storages
            .iter()
            .map(|s| s.channels())
            .collect::<Result<Vec<_>>>()?;
        Ok(merge_channels(listings))
    }

    /// List the channels known without reading message data.
    ///
    /// See [`LogStorage::indexed_channels`].
    pub fn indexed_channels(&self) -> Result<Vec<ChannelInfo>> {
        let listings = self
            .storages
            .iter()
            .map(|s| s.indexed_channels())
            .collect::<Result<Vec<_>>>()?;
        Ok(merge_channels(listings))
    }

    /// Start a sequential pass over every record in recording order.
    pub fn reader(&self) -> Result<SequentialReader<'_>> {
        Ok(SequentialReader::new(Box::new(ChainedRecords::new(
            &self.storages,
        )?)))
    }
}

/// Record streams of several storage files, drained one after another.
///
/// The next file's stream is opened only once the previous one is exhausted.
struct ChainedRecords<'a> {
    remaining: std::slice::Iter<'a, Box<dyn LogStorage>>,
    current: Option<Box<dyn RecordStream + 'a>>,
    /// Set after an error so the chain stops
    failed: bool,
}

impl<'a> ChainedRecords<'a> {
    fn new(storages: &'a [Box<dyn LogStorage>]) -> Result<Self> {
        let mut remaining = storages.iter();
        let current = match remaining.next() {
            Some(storage) => Some(storage.records()?),
            None => None,
        };
        Ok(Self {
            remaining,
            current,
            failed: false,
        })
    }
}

impl Iterator for ChainedRecords<'_> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let current = self.current.as_mut()?;
            if let Some(item) = current.next() {
                self.failed = item.is_err();
                return Some(item);
            }
            self.current = None;
            let storage = self.remaining.next()?;
            match storage.records() {
                Ok(stream) => self.current = Some(stream),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
