// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout odomcodec.
//!
//! This module provides the foundational types for the library:
//! - [`ExportError`] - Error taxonomy shared by every pipeline stage
//! - [`PoseSample`] - One decoded odometry sample

pub mod error;
pub mod sample;

pub use error::{ExportError, Result};
pub use sample::{PoseSample, Quaternion, Vector3};
