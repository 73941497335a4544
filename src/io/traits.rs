// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core traits for log storage backends.
//!
//! Each supported storage format implements [`LogStorage`]. The rest of the
//! crate only ever sees channel listings and a sequential stream of
//! [`LogRecord`]s, so adding a format never touches the pipeline.

use crate::Result;

use super::metadata::{ChannelInfo, LogFormat, LogRecord};

/// Streaming iterator over log records in recording order.
pub trait RecordStream: Iterator<Item = Result<LogRecord>> {}

// Blanket implementation for any matching type
impl<T> RecordStream for T where T: Iterator<Item = Result<LogRecord>> {}

/// An opened, read-only log storage file.
///
/// # Example
///
/// ```no_run
/// use odomcodec::io::traits::LogStorage;
///
/// fn count_records(storage: &dyn LogStorage) -> odomcodec::Result<usize> {
///     let mut count = 0;
///     for record in storage.records()? {
///         record?;
///         count += 1;
///     }
///     Ok(count)
/// }
/// ```
pub trait LogStorage {
    /// Get the storage file path.
    fn path(&self) -> &str;

    /// Get the storage format.
    fn format(&self) -> LogFormat;

    /// List the channels recorded in the log, with message counts.
    ///
    /// Backends may scan message data when the log carries no index.
    fn channels(&self) -> Result<Vec<ChannelInfo>>;

    /// List the channels known from index or metadata records alone.
    ///
    /// Never reads message data. Message counts are zero where the storage
    /// does not record them, and a log without an index yields an empty list.
    fn indexed_channels(&self) -> Result<Vec<ChannelInfo>>;

    /// Start a fresh sequential pass over every record in the log.
    ///
    /// Records are yielded in recording order and are not filtered.
    fn records(&self) -> Result<Box<dyn RecordStream + '_>>;
}
