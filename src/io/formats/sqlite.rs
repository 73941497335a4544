// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag2 SQLite storage (`.db3`).
//!
//! The rosbag2 `sqlite3` storage plugin keeps two tables:
//!
//! ```text
//! topics(id INTEGER PRIMARY KEY, name TEXT, type TEXT, serialization_format TEXT, ...)
//! messages(id INTEGER PRIMARY KEY, topic_id INTEGER, timestamp INTEGER, data BLOB)
//! ```
//!
//! Messages are replayed ordered by `(timestamp, id)`, matching rosbag2's
//! sequential reader. Rows are fetched in pages with keyset pagination so the
//! whole table is never materialized.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;

use crate::io::metadata::{ChannelInfo, LogFormat, LogRecord, MessageEncoding};
use crate::io::traits::{LogStorage, RecordStream};
use crate::{ExportError, Result};

/// Number of rows fetched per page.
const PAGE_SIZE: i64 = 1024;

const SELECT_TOPICS: &str = "SELECT id, name, type, serialization_format FROM topics ORDER BY id";

const SELECT_CHANNELS: &str = "SELECT t.name, t.type, t.serialization_format, COUNT(m.id) \
     FROM topics t LEFT JOIN messages m ON m.topic_id = t.id \
     GROUP BY t.id ORDER BY t.id";

const SELECT_PAGE: &str = "SELECT id, topic_id, timestamp, data FROM messages \
     WHERE timestamp > ?1 OR (timestamp = ?1 AND id > ?2) \
     ORDER BY timestamp, id LIMIT ?3";

fn sql_error(context: &str, e: rusqlite::Error) -> ExportError {
    ExportError::log_read(context, format!("SQLite error: {e}"))
}

/// rosbag2 SQLite database opened read-only.
pub struct SqliteStorage {
    /// File path
    path: String,
    /// Read-only connection
    conn: Connection,
}

impl SqliteStorage {
    /// Open a rosbag2 `.db3` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let conn = Connection::open_with_flags(
            path_ref,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| sql_error("SqliteStorage", e))?;

        // Fail at open time if this is not a rosbag2 database.
        conn.prepare(SELECT_TOPICS)
            .map_err(|e| sql_error("SqliteStorage", e))?;

        debug!(path = %path_str, "opened rosbag2 SQLite storage");

        Ok(Self {
            path: path_str,
            conn,
        })
    }

    fn topic_table(&self) -> Result<HashMap<i64, (String, Option<MessageEncoding>)>> {
        let mut stmt = self
            .conn
            .prepare(SELECT_TOPICS)
            .map_err(|e| sql_error("SqliteStorage", e))?;
        let rows = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let format: String = row.get(3)?;
                Ok((id, name, format))
            })
            .map_err(|e| sql_error("SqliteStorage", e))?;

        let mut topics = HashMap::new();
        for row in rows {
            let (id, name, format) = row.map_err(|e| sql_error("SqliteStorage", e))?;
            topics.insert(id, (name, MessageEncoding::from_channel_encoding(&format)));
        }
        Ok(topics)
    }
}

impl LogStorage for SqliteStorage {
    fn path(&self) -> &str {
        &self.path
    }

    fn format(&self) -> LogFormat {
        LogFormat::Rosbag2Sqlite
    }

    fn channels(&self) -> Result<Vec<ChannelInfo>> {
        let mut stmt = self
            .conn
            .prepare(SELECT_CHANNELS)
            .map_err(|e| sql_error("SqliteStorage", e))?;
        let rows = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let message_type: String = row.get(1)?;
                let format: String = row.get(2)?;
                let count: i64 = row.get(3)?;
                Ok(ChannelInfo::new(name, message_type, format)
                    .with_message_count(u64::try_from(count).unwrap_or(0)))
            })
            .map_err(|e| sql_error("SqliteStorage", e))?;

        let channels = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| sql_error("SqliteStorage", e))?;
        Ok(channels)
    }

    fn indexed_channels(&self) -> Result<Vec<ChannelInfo>> {
        let mut stmt = self
            .conn
            .prepare(SELECT_TOPICS)
            .map_err(|e| sql_error("SqliteStorage", e))?;
        let rows = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let message_type: String = row.get(2)?;
                let format: String = row.get(3)?;
                Ok(ChannelInfo::new(name, message_type, format))
            })
            .map_err(|e| sql_error("SqliteStorage", e))?;

        let channels = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| sql_error("SqliteStorage", e))?;
        Ok(channels)
    }

    fn records(&self) -> Result<Box<dyn RecordStream + '_>> {
        Ok(Box::new(SqliteRecords {
            conn: &self.conn,
            topics: self.topic_table()?,
            after: (i64::MIN, i64::MIN),
            pending: VecDeque::new(),
            exhausted: false,
        }))
    }
}

/// Paged record iterator over the `messages` table.
pub struct SqliteRecords<'a> {
    conn: &'a Connection,
    /// topic id to (topic name, payload encoding)
    topics: HashMap<i64, (String, Option<MessageEncoding>)>,
    /// `(timestamp, id)` of the last row handed out
    after: (i64, i64),
    pending: VecDeque<LogRecord>,
    exhausted: bool,
}

impl SqliteRecords<'_> {
    fn fetch_page(&mut self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached(SELECT_PAGE)
            .map_err(|e| sql_error("SqliteRecords", e))?;
        let rows = stmt
            .query_map(params![self.after.0, self.after.1, PAGE_SIZE], |row| {
                let id: i64 = row.get(0)?;
                let topic_id: i64 = row.get(1)?;
                let timestamp: i64 = row.get(2)?;
                let data: Vec<u8> = row.get(3)?;
                Ok((id, topic_id, timestamp, data))
            })
            .map_err(|e| sql_error("SqliteRecords", e))?;

        let mut fetched = 0;
        for row in rows {
            let (id, topic_id, timestamp, data) =
                row.map_err(|e| sql_error("SqliteRecords", e))?;
            let (channel, encoding) = self.topics.get(&topic_id).cloned().ok_or_else(|| {
                ExportError::log_read(
                    "SqliteRecords",
                    format!("message {id} references unknown topic id {topic_id}"),
                )
            })?;
            self.after = (timestamp, id);
            self.pending.push_back(LogRecord {
                channel,
                payload: data,
                timestamp,
                encoding,
            });
            fetched += 1;
        }

        if fetched < PAGE_SIZE {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl Iterator for SqliteRecords<'_> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.pending.pop_front().map(Ok)
    }
}
