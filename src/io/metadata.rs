// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared metadata types for all supported log formats.
//!
//! Every storage backend (MCAP, ROS1 bag, rosbag2 SQLite) is reduced to the
//! same vocabulary: a list of [`ChannelInfo`] and a stream of [`LogRecord`].

/// Wire encoding of a record payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageEncoding {
    /// ROS 2 CDR with a 4-byte encapsulation header
    Cdr,
    /// ROS1 serialization (little-endian, unaligned, no header)
    Ros1,
}

impl MessageEncoding {
    /// Map a channel's encoding string to a known payload encoding.
    pub fn from_channel_encoding(encoding: &str) -> Option<Self> {
        match encoding.to_lowercase().as_str() {
            "cdr" => Some(MessageEncoding::Cdr),
            "ros1" => Some(MessageEncoding::Ros1),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageEncoding::Cdr => "cdr",
            MessageEncoding::Ros1 => "ros1",
        }
    }
}

impl std::fmt::Display for MessageEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record yielded by a log reader, in recording order.
///
/// Records are ephemeral: the pipeline decodes and drops them immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Channel (topic) name, e.g. "/Odometry"
    pub channel: String,
    /// Raw serialized payload
    pub payload: Vec<u8>,
    /// Record timestamp (nanoseconds since Unix epoch)
    pub timestamp: i64,
    /// Payload wire encoding (`None` when the channel uses an encoding this
    /// crate cannot decode, e.g. protobuf or json)
    pub encoding: Option<MessageEncoding>,
}

impl LogRecord {
    /// Create a new LogRecord.
    pub fn new(
        channel: impl Into<String>,
        payload: Vec<u8>,
        timestamp: i64,
        encoding: Option<MessageEncoding>,
    ) -> Self {
        Self {
            channel: channel.into(),
            payload,
            timestamp,
            encoding,
        }
    }
}

/// Information about a channel/topic in a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Topic name (e.g., "/Odometry")
    pub topic: String,
    /// Message type name (e.g., "nav_msgs/msg/Odometry")
    pub message_type: String,
    /// Encoding string as stored in the log (e.g., "cdr", "ros1")
    pub encoding: String,
    /// Number of messages on this channel (0 if unknown)
    pub message_count: u64,
}

impl ChannelInfo {
    /// Create a new ChannelInfo.
    pub fn new(
        topic: impl Into<String>,
        message_type: impl Into<String>,
        encoding: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            message_type: message_type.into(),
            encoding: encoding.into(),
            message_count: 0,
        }
    }

    /// Set the message count.
    pub fn with_message_count(mut self, count: u64) -> Self {
        self.message_count = count;
        self
    }

    /// Whether this channel carries `nav_msgs/Odometry`, in either the ROS1
    /// (`nav_msgs/Odometry`) or ROS 2 (`nav_msgs/msg/Odometry`) spelling.
    pub fn is_odometry(&self) -> bool {
        matches!(
            self.message_type.as_str(),
            "nav_msgs/Odometry" | "nav_msgs/msg/Odometry"
        )
    }
}

/// Detected log storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// MCAP format
    Mcap,
    /// ROS1 bag format
    Bag,
    /// rosbag2 SQLite storage (`.db3`)
    Rosbag2Sqlite,
    /// Unknown format
    Unknown,
}

impl LogFormat {
    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Mcap => "mcap",
            LogFormat::Bag => "bag",
            LogFormat::Rosbag2Sqlite => "db3",
            LogFormat::Unknown => "",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Mcap => write!(f, "MCAP"),
            LogFormat::Bag => write!(f, "ROS1 Bag"),
            LogFormat::Rosbag2Sqlite => write!(f, "rosbag2 SQLite"),
            LogFormat::Unknown => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_encoding_from_channel() {
        assert_eq!(
            MessageEncoding::from_channel_encoding("cdr"),
            Some(MessageEncoding::Cdr)
        );
        assert_eq!(
            MessageEncoding::from_channel_encoding("ROS1"),
            Some(MessageEncoding::Ros1)
        );
        assert_eq!(MessageEncoding::from_channel_encoding("json"), None);
    }

    #[test]
    fn test_channel_info_is_odometry() {
        assert!(ChannelInfo::new("/Odometry", "nav_msgs/msg/Odometry", "cdr").is_odometry());
        assert!(ChannelInfo::new("/odom", "nav_msgs/Odometry", "ros1").is_odometry());
        assert!(!ChannelInfo::new("/imu", "sensor_msgs/msg/Imu", "cdr").is_odometry());
    }

    #[test]
    fn test_channel_info_builder() {
        let info = ChannelInfo::new("/Odometry", "nav_msgs/msg/Odometry", "cdr")
            .with_message_count(42);
        assert_eq!(info.topic, "/Odometry");
        assert_eq!(info.encoding, "cdr");
        assert_eq!(info.message_count, 42);
    }

    #[test]
    fn test_log_format() {
        assert_eq!(LogFormat::Rosbag2Sqlite.extension(), "db3");
        assert_eq!(format!("{}", LogFormat::Mcap), "MCAP");
        assert_eq!(format!("{}", LogFormat::Bag), "ROS1 Bag");
    }
}
