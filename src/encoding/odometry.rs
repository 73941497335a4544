// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `nav_msgs/Odometry` codec.
//!
//! Wire layout (both encodings, after the header):
//!
//! ```text
//! string child_frame_id
//! geometry_msgs/PoseWithCovariance pose
//!   Point position          (3 x float64)
//!   Quaternion orientation  (4 x float64)
//!   float64[36] covariance
//! geometry_msgs/TwistWithCovariance twist
//!   Vector3 linear          (3 x float64)
//!   Vector3 angular         (3 x float64)
//!   float64[36] covariance
//! ```
//!
//! The header differs between ROS 1 (`seq`, `time{secs,nsecs}`, `frame_id`)
//! and ROS 2 (`stamp{int32 sec, uint32 nanosec}`, `frame_id`).

use super::cdr::{CdrCursor, CdrEncoder};
use crate::core::{PoseSample, Quaternion, Vector3};
use crate::io::metadata::{LogRecord, MessageEncoding};
use crate::{ExportError, Result};

/// Message type name as registered by ROS 2.
pub const ODOMETRY_TYPE_ROS2: &str = "nav_msgs/msg/Odometry";

/// Message type name as registered by ROS 1.
pub const ODOMETRY_TYPE_ROS1: &str = "nav_msgs/Odometry";

/// Number of entries in a 6x6 row-major covariance matrix.
pub const COVARIANCE_LEN: usize = 36;

/// `builtin_interfaces/Time` (or ROS 1 `time`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Time {
    pub sec: i64,
    pub nanosec: u32,
}

/// `std_msgs/Header`.
///
/// `seq` only exists on the ROS 1 wire and is zero for CDR payloads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    pub seq: u32,
    pub stamp: Time,
    pub frame_id: String,
}

/// `geometry_msgs/PoseWithCovariance`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseWithCovariance {
    pub position: Vector3,
    pub orientation: Quaternion,
    pub covariance: [f64; COVARIANCE_LEN],
}

impl Default for PoseWithCovariance {
    fn default() -> Self {
        Self {
            position: Vector3::default(),
            orientation: Quaternion::default(),
            covariance: [0.0; COVARIANCE_LEN],
        }
    }
}

/// `geometry_msgs/TwistWithCovariance`.
#[derive(Debug, Clone, PartialEq)]
pub struct TwistWithCovariance {
    pub linear: Vector3,
    pub angular: Vector3,
    pub covariance: [f64; COVARIANCE_LEN],
}

impl Default for TwistWithCovariance {
    fn default() -> Self {
        Self {
            linear: Vector3::default(),
            angular: Vector3::default(),
            covariance: [0.0; COVARIANCE_LEN],
        }
    }
}

/// A fully decoded `nav_msgs/Odometry` message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OdometryMessage {
    pub header: Header,
    pub child_frame_id: String,
    pub pose: PoseWithCovariance,
    pub twist: TwistWithCovariance,
}

/// Attach the name of the message field being decoded to a cursor error.
fn in_field<T>(field: &str, result: Result<T>) -> Result<T> {
    result.map_err(|err| match err {
        ExportError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        } => ExportError::decode(
            field,
            cursor_pos,
            format!("needed {requested} bytes, {available} available"),
        ),
        ExportError::DecodeError {
            field: inner,
            cursor_pos,
            cause,
        } => ExportError::decode(format!("{field}.{inner}"), cursor_pos, cause),
        other => other,
    })
}

fn read_vector3(cursor: &mut CdrCursor<'_>) -> Result<Vector3> {
    let [x, y, z] = cursor.read_f64_array::<3>()?;
    Ok(Vector3::new(x, y, z))
}

fn read_quaternion(cursor: &mut CdrCursor<'_>) -> Result<Quaternion> {
    let [x, y, z, w] = cursor.read_f64_array::<4>()?;
    Ok(Quaternion::new(x, y, z, w))
}

fn read_header(cursor: &mut CdrCursor<'_>, encoding: MessageEncoding) -> Result<Header> {
    let (seq, stamp) = match encoding {
        MessageEncoding::Cdr => {
            let sec = cursor.read_i32()?;
            let nanosec = cursor.read_u32()?;
            (
                0,
                Time {
                    sec: i64::from(sec),
                    nanosec,
                },
            )
        }
        MessageEncoding::Ros1 => {
            let seq = cursor.read_u32()?;
            let secs = cursor.read_u32()?;
            let nsecs = cursor.read_u32()?;
            (
                seq,
                Time {
                    sec: i64::from(secs),
                    nanosec: nsecs,
                },
            )
        }
    };
    let frame_id = cursor.read_string()?;
    Ok(Header {
        seq,
        stamp,
        frame_id,
    })
}

impl OdometryMessage {
    /// Decode a serialized payload.
    ///
    /// Bytes following the twist covariance are ignored.
    pub fn decode(payload: &[u8], encoding: MessageEncoding) -> Result<Self> {
        let mut cursor = CdrCursor::new(payload, encoding)?;
        let c = &mut cursor;

        let header = in_field("header", read_header(c, encoding))?;
        let child_frame_id = in_field("child_frame_id", c.read_string())?;

        let position = in_field("pose.pose.position", read_vector3(c))?;
        let orientation = in_field("pose.pose.orientation", read_quaternion(c))?;
        let pose_covariance = in_field("pose.covariance", c.read_f64_array::<COVARIANCE_LEN>())?;

        let linear = in_field("twist.twist.linear", read_vector3(c))?;
        let angular = in_field("twist.twist.angular", read_vector3(c))?;
        let twist_covariance = in_field("twist.covariance", c.read_f64_array::<COVARIANCE_LEN>())?;

        Ok(Self {
            header,
            child_frame_id,
            pose: PoseWithCovariance {
                position,
                orientation,
                covariance: pose_covariance,
            },
            twist: TwistWithCovariance {
                linear,
                angular,
                covariance: twist_covariance,
            },
        })
    }

    /// Serialize into the given wire encoding.
    ///
    /// Fails only when the header stamp does not fit the target wire type.
    pub fn encode(&self, encoding: MessageEncoding) -> Result<Vec<u8>> {
        let mut encoder = CdrEncoder::new(encoding);
        let stamp = self.header.stamp;
        match encoding {
            MessageEncoding::Cdr => {
                let sec = i32::try_from(stamp.sec).map_err(|_| {
                    ExportError::decode(
                        "header.stamp.sec",
                        0,
                        format!("{} does not fit a CDR int32", stamp.sec),
                    )
                })?;
                encoder.int32(sec).uint32(stamp.nanosec);
            }
            MessageEncoding::Ros1 => {
                let secs = u32::try_from(stamp.sec).map_err(|_| {
                    ExportError::decode(
                        "header.stamp.sec",
                        0,
                        format!("{} does not fit a ROS1 uint32", stamp.sec),
                    )
                })?;
                encoder.uint32(self.header.seq).uint32(secs).uint32(stamp.nanosec);
            }
        }

        let p = &self.pose;
        let t = &self.twist;
        encoder
            .string(&self.header.frame_id)
            .string(&self.child_frame_id)
            .float64_array(&[p.position.x, p.position.y, p.position.z])
            .float64_array(&[
                p.orientation.x,
                p.orientation.y,
                p.orientation.z,
                p.orientation.w,
            ])
            .float64_array(&p.covariance)
            .float64_array(&[t.linear.x, t.linear.y, t.linear.z])
            .float64_array(&[t.angular.x, t.angular.y, t.angular.z])
            .float64_array(&t.covariance);

        Ok(encoder.finish())
    }
}

impl From<&OdometryMessage> for PoseSample {
    fn from(msg: &OdometryMessage) -> Self {
        PoseSample::new(
            msg.pose.position,
            msg.pose.orientation,
            msg.twist.linear,
            msg.twist.angular,
        )
    }
}

impl From<PoseSample> for OdometryMessage {
    fn from(sample: PoseSample) -> Self {
        Self {
            pose: PoseWithCovariance {
                position: sample.position,
                orientation: sample.orientation,
                ..Default::default()
            },
            twist: TwistWithCovariance {
                linear: sample.linear_velocity,
                angular: sample.angular_velocity,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Decodes odometry records into [`PoseSample`]s.
///
/// Stateless: the same record always decodes to the same sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordDecoder;

impl RecordDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one record known to belong to the odometry channel.
    pub fn decode(&self, record: &LogRecord) -> Result<PoseSample> {
        let encoding = record.encoding.ok_or_else(|| {
            ExportError::decode(
                "encoding",
                0,
                format!(
                    "channel '{}' uses a message encoding that cannot be decoded",
                    record.channel
                ),
            )
        })?;
        let message = OdometryMessage::decode(&record.payload, encoding)?;
        Ok(PoseSample::from(&message))
    }
}
