// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Encoder producing CDR (little-endian XCDR1) or ROS1 payloads.
//!
//! Used to build recordings and round-trip the decoder; the layout rules are
//! the mirror image of [`CdrCursor`](super::CdrCursor).

use super::CDR_HEADER_SIZE;
use crate::io::metadata::MessageEncoding;

/// Default initial capacity for the encoder buffer.
const DEFAULT_CAPACITY: usize = 64;

/// CDR encapsulation header: plain CDR, little endian, no options.
const CDR_LE_HEADER: [u8; CDR_HEADER_SIZE] = [0x00, 0x01, 0x00, 0x00];

/// Payload encoder.
///
/// # Example
///
/// ```no_run
/// # fn main() {
/// use odomcodec::encoding::cdr::CdrEncoder;
/// use odomcodec::io::MessageEncoding;
///
/// let mut encoder = CdrEncoder::new(MessageEncoding::Cdr);
/// encoder.int32(42).string("odom");
/// let data = encoder.finish();
/// # }
/// ```
pub struct CdrEncoder {
    /// Output buffer
    buffer: Vec<u8>,
    /// Origin offset for alignment calculation
    origin: usize,
    /// Whether primitives are padded to their natural alignment
    aligned: bool,
}

impl CdrEncoder {
    /// Create an encoder for the given wire encoding.
    ///
    /// CDR payloads start with the 4-byte encapsulation header.
    #[must_use]
    pub fn new(encoding: MessageEncoding) -> Self {
        let mut buffer = Vec::with_capacity(DEFAULT_CAPACITY);
        let aligned = match encoding {
            MessageEncoding::Cdr => {
                buffer.extend_from_slice(&CDR_LE_HEADER);
                true
            }
            MessageEncoding::Ros1 => false,
        };
        Self {
            origin: buffer.len(),
            buffer,
            aligned,
        }
    }

    /// Get the current size of the encoded data.
    #[must_use]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Consume the encoder and return the encoded data.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }

    fn align(&mut self, size: usize) {
        if !self.aligned {
            return;
        }
        let alignment = (self.buffer.len() - self.origin) % size;
        if alignment > 0 {
            self.buffer.resize(self.buffer.len() + size - alignment, 0);
        }
    }

    /// Write a 32-bit unsigned integer.
    pub fn uint32(&mut self, value: u32) -> &mut Self {
        self.align(4);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 32-bit signed integer.
    pub fn int32(&mut self, value: i32) -> &mut Self {
        self.align(4);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a 64-bit float.
    pub fn float64(&mut self, value: f64) -> &mut Self {
        self.align(8);
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Write a sequence of 64-bit floats without a length prefix.
    pub fn float64_array(&mut self, values: &[f64]) -> &mut Self {
        for &value in values {
            self.float64(value);
        }
        self
    }

    /// Write a length-prefixed string.
    ///
    /// CDR strings carry a trailing NUL that is counted in the length.
    pub fn string(&mut self, value: &str) -> &mut Self {
        if self.aligned {
            self.uint32(value.len() as u32 + 1);
            self.buffer.extend_from_slice(value.as_bytes());
            self.buffer.push(0);
        } else {
            self.uint32(value.len() as u32);
            self.buffer.extend_from_slice(value.as_bytes());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::cdr::CdrCursor;

    #[test]
    fn test_cdr_header_written() {
        let encoder = CdrEncoder::new(MessageEncoding::Cdr);
        assert_eq!(encoder.finish(), CDR_LE_HEADER.to_vec());
    }

    #[test]
    fn test_ros1_has_no_header() {
        let encoder = CdrEncoder::new(MessageEncoding::Ros1);
        assert_eq!(encoder.size(), 0);
    }

    #[test]
    fn test_cdr_padding_before_f64() {
        let mut encoder = CdrEncoder::new(MessageEncoding::Cdr);
        encoder.uint32(1).float64(2.0);
        let data = encoder.finish();
        // header(4) + u32(4) + pad(4) + f64(8)
        assert_eq!(data.len(), 20);
        assert_eq!(&data[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_ros1_string_without_nul() {
        let mut encoder = CdrEncoder::new(MessageEncoding::Ros1);
        encoder.string("map");
        assert_eq!(encoder.finish(), vec![3, 0, 0, 0, b'm', b'a', b'p']);
    }

    #[test]
    fn test_cursor_reads_encoder_output() {
        for encoding in [MessageEncoding::Cdr, MessageEncoding::Ros1] {
            let mut encoder = CdrEncoder::new(encoding);
            encoder
                .int32(-5)
                .string("base_link")
                .float64(3.25)
                .float64_array(&[1.0, 2.0]);
            let data = encoder.finish();

            let mut cursor = CdrCursor::new(&data, encoding).unwrap();
            assert_eq!(cursor.read_i32().unwrap(), -5);
            assert_eq!(cursor.read_string().unwrap(), "base_link");
            assert_eq!(cursor.read_f64().unwrap(), 3.25);
            assert_eq!(cursor.read_f64_array::<2>().unwrap(), [1.0, 2.0]);
            assert_eq!(cursor.remaining(), 0);
        }
    }
}
