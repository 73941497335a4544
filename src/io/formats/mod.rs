// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Storage format implementations.

pub mod bag;
pub mod mcap;
pub mod sqlite;

pub use bag::BagStorage;
pub use mcap::McapStorage;
pub use sqlite::SqliteStorage;

use crate::{ExportError, Result};

/// Convert an unsigned nanosecond timestamp to the signed representation used
/// by [`LogRecord`](crate::io::metadata::LogRecord).
pub(crate) fn signed_timestamp(nanos: u64, context: &str) -> Result<i64> {
    i64::try_from(nanos).map_err(|_| {
        ExportError::log_read(
            context,
            format!("timestamp {nanos} ns does not fit in a signed 64-bit value"),
        )
    })
}
