// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded pose/twist sample types.

/// A 3-component vector (`geometry_msgs/Point` or `geometry_msgs/Vector3`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// An orientation quaternion (`geometry_msgs/Quaternion`).
///
/// Values are carried exactly as recorded. No normalization or validity
/// check is applied anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// One odometry sample: the 13 scalar values extracted per matching record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseSample {
    /// `pose.pose.position`
    pub position: Vector3,
    /// `pose.pose.orientation`
    pub orientation: Quaternion,
    /// `twist.twist.linear`
    pub linear_velocity: Vector3,
    /// `twist.twist.angular`
    pub angular_velocity: Vector3,
}

impl PoseSample {
    pub fn new(
        position: Vector3,
        orientation: Quaternion,
        linear_velocity: Vector3,
        angular_velocity: Vector3,
    ) -> Self {
        Self {
            position,
            orientation,
            linear_velocity,
            angular_velocity,
        }
    }
}
