// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MCAP format implementation.
//!
//! Reading is delegated to the mcap crate's `MessageStream`, which yields
//! messages in file order and handles chunk decompression.

pub mod sequential;

pub use sequential::{McapRecords, McapStorage};
