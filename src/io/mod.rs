// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for recorded message logs.
//!
//! This module provides the log-reading stage of the export pipeline:
//! format detection, per-format storage backends and a sequential reader
//! that yields `(channel, payload, timestamp)` records in recording order.

pub mod detection;
pub mod formats;
pub mod metadata;

// Re-exports
pub use detection::{detect_format, resolve_storage_paths};
pub use metadata::{ChannelInfo, LogFormat, LogRecord, MessageEncoding};

// Traits for storage backends
pub mod traits;
pub use traits::{LogStorage, RecordStream};

// Unified reader with auto-detection
pub mod reader;
pub use reader::{LogSource, SequentialReader};
