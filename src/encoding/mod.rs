// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Payload decoding.
//!
//! - [`cdr`] - alignment-aware cursor and encoder for CDR and ROS1 payloads
//! - [`odometry`] - the `nav_msgs/Odometry` message and [`RecordDecoder`]

pub mod cdr;
pub mod odometry;

pub use cdr::{CdrCursor, CdrEncoder};
pub use odometry::{
    Header, OdometryMessage, PoseWithCovariance, RecordDecoder, Time, TwistWithCovariance,
};
