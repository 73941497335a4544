// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cursor for reading CDR and ROS1 serialized payloads.
//!
//! The two wire formats differ only in framing:
//! - **CDR** (ROS 2): a 4-byte encapsulation header selects the byte order;
//!   primitives are naturally aligned relative to the end of that header.
//! - **ROS1**: no header, always little-endian, no alignment padding.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use odomcodec::encoding::cdr::CdrCursor;
//! use odomcodec::io::MessageEncoding;
//!
//! let data = vec![0x00, 0x01, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00]; // CDR header + value
//! let mut cursor = CdrCursor::new(&data, MessageEncoding::Cdr)?;
//! assert_eq!(cursor.read_u32()?, 42);
//! # Ok(())
//! # }
//! ```

use crate::io::metadata::MessageEncoding;
use crate::{ExportError, Result};

/// Size of the CDR encapsulation header (4 bytes).
pub const CDR_HEADER_SIZE: usize = 4;

/// Upper bound on string lengths accepted from a payload.
const MAX_STRING_LENGTH: usize = 1 << 20;

/// Encapsulation identifiers (byte 1 of the header) this cursor understands.
///
/// `0x00`/`0x01` are plain XCDR1 big/little endian; `0x06`/`0x07` are plain
/// XCDR2, which caps alignment at 4 bytes.
fn encapsulation(kind: u8) -> Option<(bool, usize)> {
    match kind {
        0x00 => Some((false, 8)),
        0x01 => Some((true, 8)),
        0x06 => Some((false, 4)),
        0x07 => Some((true, 4)),
        _ => None,
    }
}

/// Read cursor over one serialized payload.
pub struct CdrCursor<'a> {
    /// The data buffer (includes the CDR header, if any)
    data: &'a [u8],
    /// Current read position
    offset: usize,
    /// Origin offset for alignment calculation
    origin: usize,
    /// Whether the data uses little endian encoding
    little_endian: bool,
    /// Largest alignment applied (8 for XCDR1, 4 for XCDR2, 1 for ROS1)
    max_alignment: usize,
}

impl<'a> CdrCursor<'a> {
    /// Create a cursor for a payload in the given wire encoding.
    ///
    /// For CDR the encapsulation header is validated and skipped.
    pub fn new(data: &'a [u8], encoding: MessageEncoding) -> Result<Self> {
        match encoding {
            MessageEncoding::Ros1 => Ok(Self {
                data,
                offset: 0,
                origin: 0,
                little_endian: true,
                max_alignment: 1,
            }),
            MessageEncoding::Cdr => {
                if data.len() < CDR_HEADER_SIZE {
                    return Err(ExportError::decode(
                        "encapsulation",
                        0,
                        format!(
                            "payload of {} bytes cannot hold a 4-byte CDR header",
                            data.len()
                        ),
                    ));
                }
                let (little_endian, max_alignment) =
                    encapsulation(data[1]).filter(|_| data[0] == 0).ok_or_else(|| {
                        ExportError::decode(
                            "encapsulation",
                            0,
                            format!(
                                "unsupported CDR encapsulation 0x{:02x}{:02x}",
                                data[0], data[1]
                            ),
                        )
                    })?;
                Ok(Self {
                    data,
                    offset: CDR_HEADER_SIZE,
                    origin: CDR_HEADER_SIZE,
                    little_endian,
                    max_alignment,
                })
            }
        }
    }

    /// Get the current position relative to the data start.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Align to the specified boundary, relative to the origin.
    pub fn align(&mut self, size: usize) -> Result<()> {
        let size = size.min(self.max_alignment);
        if size <= 1 {
            return Ok(());
        }
        let alignment = (self.offset - self.origin) % size;
        if alignment > 0 {
            let padding = size - alignment;
            if padding > self.remaining() {
                return Err(ExportError::buffer_too_short(
                    padding,
                    self.remaining(),
                    self.offset as u64,
                ));
            }
            self.offset += padding;
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.align(N)?;
        if N > self.remaining() {
            return Err(ExportError::buffer_too_short(
                N,
                self.remaining(),
                self.offset as u64,
            ));
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        Ok(bytes)
    }

    /// Read a u32 value.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take::<4>()?;
        Ok(if self.little_endian {
            u32::from_le_bytes(bytes)
        } else {
            u32::from_be_bytes(bytes)
        })
    }

    /// Read an i32 value.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    /// Read an f64 value.
    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take::<8>()?;
        Ok(if self.little_endian {
            f64::from_le_bytes(bytes)
        } else {
            f64::from_be_bytes(bytes)
        })
    }

    /// Read a fixed-size array of f64 values.
    pub fn read_f64_array<const N: usize>(&mut self) -> Result<[f64; N]> {
        let mut values = [0.0; N];
        for value in values.iter_mut() {
            *value = self.read_f64()?;
        }
        Ok(values)
    }

    /// Read a length-prefixed string.
    ///
    /// CDR lengths count a trailing NUL, which is stripped; ROS1 lengths do not.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.offset as u64;
        let len = self.read_u32()? as usize;
        if len > MAX_STRING_LENGTH {
            return Err(ExportError::decode(
                "string",
                start,
                format!("string length {len} exceeds limit {MAX_STRING_LENGTH}"),
            ));
        }
        if len > self.remaining() {
            return Err(ExportError::buffer_too_short(
                len,
                self.remaining(),
                self.offset as u64,
            ));
        }
        let mut bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;

        if self.max_alignment > 1 {
            bytes = match bytes.split_last() {
                Some((0, rest)) => rest,
                Some(_) => {
                    return Err(ExportError::decode(
                        "string",
                        start,
                        "CDR string is not NUL-terminated",
                    ))
                }
                None => bytes,
            };
        }

        String::from_utf8(bytes.to_vec())
            .map_err(|e| ExportError::decode("string", start, format!("invalid UTF-8: {e}")))
    }
}
