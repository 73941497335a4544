// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR (Common Data Representation) module.
//!
//! Provides the primitive reader and writer shared by the ROS 2 (CDR) and
//! ROS 1 wire encodings.

pub mod cursor;
pub mod encoder;

pub use cursor::{CdrCursor, CDR_HEADER_SIZE};
pub use encoder::CdrEncoder;
