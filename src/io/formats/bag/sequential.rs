// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential ROS1 bag storage using the rosbag crate.
//!
//! Chunks are visited in file order. Each chunk is decompressed once, its
//! message records are copied out, and the chunk is dropped before the next
//! one is loaded, so at most one chunk's payloads are held at a time.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

use tracing::debug;

use crate::io::formats::signed_timestamp;
use crate::io::metadata::{ChannelInfo, LogFormat, LogRecord, MessageEncoding};
use crate::io::traits::{LogStorage, RecordStream};
use crate::{ExportError, Result};

/// ROS1 bag encoding string reported for every connection.
const ROS1_ENCODING: &str = "ros1";

/// Connection metadata needed to turn a message record into a [`LogRecord`].
#[derive(Debug, Clone)]
struct Connection {
    topic: String,
    message_type: String,
}

/// ROS1 bag file opened with the rosbag crate.
pub struct BagStorage {
    /// File path
    path: String,
    /// Bag file reader
    bag: rosbag::RosBag,
    /// Connections from the index section, keyed by connection id
    connections: BTreeMap<u32, Connection>,
}

impl BagStorage {
    /// Open a ROS1 bag file for sequential reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let bag = rosbag::RosBag::new(path_ref)
            .map_err(|e| ExportError::log_read("BagStorage", format!("Failed to open bag: {e}")))?;

        let mut connections = BTreeMap::new();
        for record in bag.index_records() {
            let record = record.map_err(|e| {
                ExportError::log_read("BagStorage", format!("Failed to read index: {e}"))
            })?;
            if let rosbag::IndexRecord::Connection(conn) = record {
                connections.entry(conn.id).or_insert_with(|| Connection {
                    topic: conn.topic.to_string(),
                    message_type: conn.tp.to_string(),
                });
            }
        }

        debug!(path = %path_str, connections = connections.len(), "opened ROS1 bag storage");

        Ok(Self {
            path: path_str,
            bag,
            connections,
        })
    }
}

impl LogStorage for BagStorage {
    fn path(&self) -> &str {
        &self.path
    }

    fn format(&self) -> LogFormat {
        LogFormat::Bag
    }

    fn channels(&self) -> Result<Vec<ChannelInfo>> {
        // ROS1 allows several connections (callers) per topic; list each topic once.
        let mut seen = std::collections::HashSet::new();
        Ok(self
            .connections
            .values()
            .filter(|c| seen.insert(c.topic.clone()))
            .map(|c| ChannelInfo::new(c.topic.clone(), c.message_type.clone(), ROS1_ENCODING))
            .collect())
    }

    fn indexed_channels(&self) -> Result<Vec<ChannelInfo>> {
        // Connections come from the index section read at open time.
        self.channels()
    }

    fn records(&self) -> Result<Box<dyn RecordStream + '_>> {
        Ok(Box::new(BagRecords {
            chunks: self.bag.chunk_records(),
            topics: self
                .connections
                .iter()
                .map(|(&id, c)| (id, c.topic.clone()))
                .collect(),
            pending: VecDeque::new(),
            failed: false,
        }))
    }
}

/// Record iterator over the chunks of a ROS1 bag.
pub struct BagRecords<'a> {
    chunks: rosbag::ChunkRecordsIterator<'a>,
    /// Connection id to topic, extended by connection records found in chunks
    topics: HashMap<u32, String>,
    /// Records copied out of the current chunk
    pending: VecDeque<LogRecord>,
    /// Set after an error so the iterator stops
    failed: bool,
}

impl BagRecords<'_> {
    /// Load the next chunk's messages into `pending`.
    ///
    /// Returns `Ok(false)` once the chunk section is exhausted.
    fn load_next_chunk(&mut self) -> Result<bool> {
        for record in self.chunks.by_ref() {
            let record = record.map_err(|e| {
                ExportError::log_read("BagRecords", format!("Failed to read record: {e}"))
            })?;

            let rosbag::ChunkRecord::Chunk(chunk) = record else {
                continue;
            };

            for msg in chunk.messages() {
                let msg = msg.map_err(|e| {
                    ExportError::log_read("BagRecords", format!("Failed to read message: {e}"))
                })?;
                match msg {
                    rosbag::MessageRecord::Connection(conn) => {
                        self.topics
                            .entry(conn.id)
                            .or_insert_with(|| conn.topic.to_string());
                    }
                    rosbag::MessageRecord::MessageData(data) => {
                        let topic = self.topics.get(&data.conn_id).ok_or_else(|| {
                            ExportError::log_read(
                                "BagRecords",
                                format!("message references unknown connection {}", data.conn_id),
                            )
                        })?;
                        self.pending.push_back(LogRecord {
                            channel: topic.clone(),
                            payload: data.data.to_vec(),
                            timestamp: signed_timestamp(data.time, "BagRecords")?,
                            encoding: Some(MessageEncoding::Ros1),
                        });
                    }
                }
            }

            if !self.pending.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Iterator for BagRecords<'_> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.pending.is_empty() {
            match self.load_next_chunk() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        self.pending.pop_front().map(Ok)
    }
}
