// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential MCAP storage using the mcap crate.
//!
//! rosbag2's `mcap` storage plugin writes plain MCAP files, so this backend
//! covers both ROS 2 recordings and any other MCAP log whose channels use
//! `cdr` or `ros1` message encoding.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use tracing::{debug, warn};

use crate::io::formats::signed_timestamp;
use crate::io::metadata::{ChannelInfo, LogFormat, LogRecord, MessageEncoding};
use crate::io::traits::{LogStorage, RecordStream};
use crate::{ExportError, Result};

/// Memory-mapped MCAP file read front to back with `mcap::MessageStream`.
pub struct McapStorage {
    /// File path
    path: String,
    /// Memory-mapped file
    mmap: memmap2::Mmap,
}

impl McapStorage {
    /// Open an MCAP file for sequential reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file = File::open(path_ref).map_err(|e| {
            ExportError::log_read("McapStorage", format!("Failed to open file: {e}"))
        })?;

        // SAFETY: the mapping is read-only and the file is not modified while
        // the storage is alive.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| {
            ExportError::log_read("McapStorage", format!("Failed to mmap file: {e}"))
        })?;

        debug!(path = %path_str, bytes = mmap.len(), "opened MCAP storage");

        Ok(Self {
            path: path_str,
            mmap,
        })
    }

    /// Channels from the summary section, or `None` when the file has no
    /// readable summary (typically a recording that was not closed cleanly).
    fn summary_channels(&self) -> Option<Vec<ChannelInfo>> {
        let summary = match mcap::Summary::read(&self.mmap) {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                debug!(context = "McapStorage", "MCAP file has no summary section");
                return None;
            }
            Err(e) => {
                warn!(
                    context = "McapStorage",
                    error = %e,
                    "Failed to read MCAP summary"
                );
                return None;
            }
        };

        let counts = summary
            .stats
            .as_ref()
            .map(|s| s.channel_message_counts.clone())
            .unwrap_or_default();

        let mut ids: Vec<u16> = summary.channels.keys().copied().collect();
        ids.sort_unstable();

        Some(
            ids.into_iter()
                .filter_map(|id| summary.channels.get(&id).map(|c| (id, c)))
                .map(|(id, channel)| {
                    ChannelInfo::new(
                        channel.topic.clone(),
                        channel
                            .schema
                            .as_ref()
                            .map(|s| s.name.clone())
                            .unwrap_or_default(),
                        channel.message_encoding.clone(),
                    )
                    .with_message_count(counts.get(&id).copied().unwrap_or(0))
                })
                .collect(),
        )
    }

    /// Scan the file to build channel information when no summary is available.
    fn scan_channels(&self) -> Result<Vec<ChannelInfo>> {
        let stream = mcap::MessageStream::new(&self.mmap).map_err(|e| {
            ExportError::log_read(
                "McapStorage",
                format!("Failed to create message stream: {e}"),
            )
        })?;

        let mut channels: BTreeMap<u16, ChannelInfo> = BTreeMap::new();
        for result in stream {
            let message = result.map_err(|e| {
                ExportError::log_read("McapStorage", format!("Read error: {e}"))
            })?;
            let channel = &message.channel;
            channels
                .entry(channel.id)
                .or_insert_with(|| {
                    ChannelInfo::new(
                        channel.topic.clone(),
                        channel
                            .schema
                            .as_ref()
                            .map(|s| s.name.clone())
                            .unwrap_or_default(),
                        channel.message_encoding.clone(),
                    )
                })
                .message_count += 1;
        }

        Ok(channels.into_values().collect())
    }
}

impl LogStorage for McapStorage {
    fn path(&self) -> &str {
        &self.path
    }

    fn format(&self) -> LogFormat {
        LogFormat::Mcap
    }

    fn channels(&self) -> Result<Vec<ChannelInfo>> {
        match self.summary_channels() {
            Some(channels) => Ok(channels),
            None => self.scan_channels(),
        }
    }

    fn indexed_channels(&self) -> Result<Vec<ChannelInfo>> {
        Ok(self.summary_channels().unwrap_or_default())
    }

    fn records(&self) -> Result<Box<dyn RecordStream + '_>> {
        Ok(Box::new(McapRecords::new(&self.mmap)?))
    }
}

/// Record iterator over an MCAP message stream.
pub struct McapRecords<'a> {
    stream: mcap::MessageStream<'a>,
}

impl<'a> McapRecords<'a> {
    fn new(data: &'a [u8]) -> Result<Self> {
        let stream = mcap::MessageStream::new(data).map_err(|e| {
            ExportError::log_read(
                "McapRecords",
                format!("Failed to create message stream: {e}"),
            )
        })?;
        Ok(Self { stream })
    }
}

impl Iterator for McapRecords<'_> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let message = match self.stream.next()? {
            Ok(m) => m,
            Err(e) => {
                return Some(Err(ExportError::log_read(
                    "McapRecords",
                    format!("Read error: {e}"),
                )))
            }
        };

        let timestamp = match signed_timestamp(message.log_time, "McapRecords") {
            Ok(t) => t,
            Err(e) => return Some(Err(e)),
        };

        Some(Ok(LogRecord {
            channel: message.channel.topic.clone(),
            payload: message.data.into_owned(),
            timestamp,
            encoding: MessageEncoding::from_channel_encoding(&message.channel.message_encoding),
        }))
    }
}
