// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential reader with `has_next` / `read_next` access.

use crate::io::metadata::LogRecord;
use crate::io::traits::RecordStream;
use crate::{ExportError, Result};

/// Drains a record stream strictly in recording order.
///
/// `has_next` looks one record ahead; a read error counts as a pending item so
/// that the following `read_next` surfaces it. There is no seeking.
pub struct SequentialReader<'a> {
    stream: Box<dyn RecordStream + 'a>,
    peeked: Option<Result<LogRecord>>,
    drained: bool,
}

impl<'a> SequentialReader<'a> {
    /// Wrap a record stream.
    pub fn new(stream: Box<dyn RecordStream + 'a>) -> Self {
        Self {
            stream,
            peeked: None,
            drained: false,
        }
    }

    /// Whether another record (or a pending read error) is available.
    pub fn has_next(&mut self) -> bool {
        if self.peeked.is_none() && !self.drained {
            self.peeked = self.stream.next();
            if self.peeked.is_none() {
                self.drained = true;
            }
        }
        self.peeked.is_some()
    }

    /// Read the next record.
    ///
    /// Calling this on a drained reader is a programming error and reported
    /// as an invariant violation.
    pub fn read_next(&mut self) -> Result<LogRecord> {
        if !self.has_next() {
            return Err(ExportError::invariant_violation(
                "read_next called on a drained log reader",
            ));
        }
        match self.peeked.take() {
            Some(result) => result,
            None => Err(ExportError::invariant_violation(
                "log reader lost its look-ahead record",
            )),
        }
    }
}

impl Iterator for SequentialReader<'_> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.read_next())
        } else {
            None
        }
    }
}
