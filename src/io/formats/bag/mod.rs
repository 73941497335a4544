// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 bag format implementation.
//!
//! Payloads in ROS1 bags use ROS1 serialization, so every record produced
//! here carries [`MessageEncoding::Ros1`](crate::io::metadata::MessageEncoding::Ros1).

pub mod sequential;

pub use sequential::{BagRecords, BagStorage};
