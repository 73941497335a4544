// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! Logs are synthesized on the fly in a per-test scratch directory:
//! MCAP files through `mcap::Writer`, rosbag2 `.db3` files through
//! `rusqlite`, and ROS1 bags record by record, with payloads produced by
//! [`OdometryMessage::encode`].

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use odomcodec::{MessageEncoding, OdometryMessage, PoseSample, Quaternion, Vector3};

pub const ODOMETRY_TOPIC: &str = "/Odometry";
pub const ODOMETRY_TYPE: &str = "nav_msgs/msg/Odometry";

// ============================================================================
// Scratch directories
// ============================================================================

/// Temporary directory removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "odomcodec_test_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("create scratch dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Names of the entries currently in the directory, sorted.
    pub fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.path)
            .expect("read scratch dir")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

// ============================================================================
// Samples and payloads
// ============================================================================

/// The reference sample: pos (1,2,3), identity orientation,
/// linear (0.1,0.2,0.3), angular (0.01,0.02,0.03).
pub fn reference_sample() -> PoseSample {
    PoseSample::new(
        Vector3::new(1.0, 2.0, 3.0),
        Quaternion::new(0.0, 0.0, 0.0, 1.0),
        Vector3::new(0.1, 0.2, 0.3),
        Vector3::new(0.01, 0.02, 0.03),
    )
}

/// A sample whose every field is derived from `i`, so order is observable.
pub fn indexed_sample(i: usize) -> PoseSample {
    let v = i as f64;
    PoseSample::new(
        Vector3::new(v, v + 0.5, -v),
        Quaternion::new(0.0, 0.0, (v / 100.0).sin(), (v / 100.0).cos()),
        Vector3::new(v * 0.1, 0.0, 0.0),
        Vector3::new(0.0, 0.0, v * 0.01),
    )
}

/// Serialize a sample as a full `nav_msgs/Odometry` payload.
pub fn odometry_payload(sample: &PoseSample, encoding: MessageEncoding) -> Vec<u8> {
    let mut message = OdometryMessage::from(*sample);
    message.header.frame_id = "odom".to_string();
    message.child_frame_id = "base_link".to_string();
    message.encode(encoding).expect("encode odometry")
}

// ============================================================================
// Log fixtures
// ============================================================================

/// One message to place in a synthesized log.
#[derive(Debug, Clone)]
pub struct FixtureMessage {
    pub topic: String,
    pub timestamp: i64,
    pub payload: Vec<u8>,
}

impl FixtureMessage {
    pub fn new(topic: &str, timestamp: i64, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.to_string(),
            timestamp,
            payload,
        }
    }

    /// An odometry message on `/Odometry` in CDR.
    pub fn odometry(timestamp: i64, sample: &PoseSample) -> Self {
        Self::new(
            ODOMETRY_TOPIC,
            timestamp,
            odometry_payload(sample, MessageEncoding::Cdr),
        )
    }

    /// An odometry message on `/Odometry` in ROS1 serialization.
    pub fn odometry_ros1(timestamp: i64, sample: &PoseSample) -> Self {
        Self::new(
            ODOMETRY_TOPIC,
            timestamp,
            odometry_payload(sample, MessageEncoding::Ros1),
        )
    }
}

/// Topic declaration: name and message type.
pub type FixtureTopic = (&'static str, &'static str);

/// Standard topic set: odometry plus two unrelated topics.
pub fn standard_topics() -> Vec<FixtureTopic> {
    vec![
        (ODOMETRY_TOPIC, ODOMETRY_TYPE),
        ("/imu", "sensor_msgs/msg/Imu"),
        ("/rosout", "rcl_interfaces/msg/Log"),
    ]
}

/// Write an MCAP log with `cdr` channels. Messages are written in slice order.
pub fn write_mcap(path: &Path, topics: &[FixtureTopic], messages: &[FixtureMessage]) {
    write_mcap_with(path, mcap::WriteOptions::new(), topics, messages);
}

/// Write an MCAP log with no summary section, as left by a recorder that
/// never closed the file cleanly.
pub fn write_mcap_without_summary(
    path: &Path,
    topics: &[FixtureTopic],
    messages: &[FixtureMessage],
) {
    let options = mcap::WriteOptions::new()
        .emit_summary_records(false)
        .emit_summary_offsets(false);
    write_mcap_with(path, options, topics, messages);
}

fn write_mcap_with(
    path: &Path,
    options: mcap::WriteOptions,
    topics: &[FixtureTopic],
    messages: &[FixtureMessage],
) {
    let file = File::create(path).expect("create mcap");
    let mut writer = options.create(BufWriter::new(file)).expect("mcap writer");

    let mut channel_ids = BTreeMap::new();
    for (topic, message_type) in topics {
        let schema_id = writer
            .add_schema(message_type, "ros2msg", b"")
            .expect("add schema");
        let channel_id = writer
            .add_channel(schema_id, topic, "cdr", &BTreeMap::new())
            .expect("add channel");
        channel_ids.insert(topic.to_string(), channel_id);
    }

    for (sequence, message) in messages.iter().enumerate() {
        let channel_id = channel_ids[&message.topic];
        writer
            .write_to_known_channel(
                &mcap::records::MessageHeader {
                    channel_id,
                    sequence: sequence as u32,
                    log_time: message.timestamp as u64,
                    publish_time: message.timestamp as u64,
                },
                &message.payload,
            )
            .expect("write message");
    }
    writer.finish().expect("finish mcap");
}

/// Write a rosbag2 SQLite log. Row ids follow slice order.
pub fn write_db3(path: &Path, topics: &[FixtureTopic], messages: &[FixtureMessage]) {
    let _ = std::fs::remove_file(path);
    let mut conn = rusqlite::Connection::open(path).expect("create db3");
    conn.execute_batch(
        "CREATE TABLE schema(schema_version INTEGER PRIMARY KEY, ros_distro TEXT NOT NULL);
         CREATE TABLE topics(id INTEGER PRIMARY KEY, name TEXT NOT NULL, type TEXT NOT NULL,
             serialization_format TEXT NOT NULL, offered_qos_profiles TEXT NOT NULL);
         CREATE TABLE messages(id INTEGER PRIMARY KEY, topic_id INTEGER NOT NULL,
             timestamp INTEGER NOT NULL, data BLOB NOT NULL);
         CREATE INDEX timestamp_idx ON messages (timestamp ASC);
         INSERT INTO schema VALUES (3, 'humble');",
    )
    .expect("create rosbag2 tables");

    let tx = conn.transaction().expect("begin");
    for (i, (topic, message_type)) in topics.iter().enumerate() {
        tx.execute(
            "INSERT INTO topics (id, name, type, serialization_format, offered_qos_profiles) \
             VALUES (?1, ?2, ?3, 'cdr', '')",
            rusqlite::params![i as i64 + 1, topic, message_type],
        )
        .expect("insert topic");
    }
    for message in messages {
        let topic_id = topics
            .iter()
            .position(|(name, _)| *name == message.topic)
            .expect("message topic declared") as i64
            + 1;
        tx.execute(
            "INSERT INTO messages (topic_id, timestamp, data) VALUES (?1, ?2, ?3)",
            rusqlite::params![topic_id, message.timestamp, message.payload],
        )
        .expect("insert message");
    }
    tx.commit().expect("commit");
}

/// Lay out a rosbag2 directory (`metadata.yaml` + `<name>_0.db3`).
pub fn write_rosbag2_dir(dir: &Path, topics: &[FixtureTopic], messages: &[FixtureMessage]) {
    write_rosbag2_split(dir, topics, &[messages]);
}

/// Lay out a rosbag2 directory split into one `<name>_<i>.db3` per part.
pub fn write_rosbag2_split(dir: &Path, topics: &[FixtureTopic], parts: &[&[FixtureMessage]]) {
    std::fs::create_dir_all(dir).expect("create bag dir");
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "bag".to_string());

    let mut metadata = String::from(
        "rosbag2_bagfile_information:\n  version: 5\n  storage_identifier: sqlite3\n  relative_file_paths:\n",
    );
    for (i, part) in parts.iter().enumerate() {
        let file_name = format!("{name}_{i}.db3");
        metadata.push_str(&format!("    - {file_name}\n"));
        write_db3(&dir.join(&file_name), topics, part);
    }
    std::fs::write(dir.join("metadata.yaml"), metadata).expect("write metadata.yaml");
}

// ============================================================================
// ROS1 bag writer
// ============================================================================

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// One `name=value` header field with its length prefix.
fn bag_field(name: &str, value: &[u8]) -> Vec<u8> {
    let mut field = Vec::with_capacity(4 + name.len() + 1 + value.len());
    field.extend_from_slice(&((name.len() + 1 + value.len()) as u32).to_le_bytes());
    field.extend_from_slice(name.as_bytes());
    field.push(b'=');
    field.extend_from_slice(value);
    field
}

/// A record: header length, header fields, data length, data.
fn bag_record(fields: &[Vec<u8>], data: &[u8]) -> Vec<u8> {
    let header = fields.concat();
    let mut record = Vec::with_capacity(8 + header.len() + data.len());
    record.extend_from_slice(&(header.len() as u32).to_le_bytes());
    record.extend_from_slice(&header);
    record.extend_from_slice(&(data.len() as u32).to_le_bytes());
    record.extend_from_slice(data);
    record
}

/// ROS1 `time`: seconds then nanoseconds, both u32.
fn bag_time(timestamp: i64) -> [u8; 8] {
    let mut time = [0u8; 8];
    time[..4].copy_from_slice(&((timestamp / NANOS_PER_SEC) as u32).to_le_bytes());
    time[4..].copy_from_slice(&((timestamp % NANOS_PER_SEC) as u32).to_le_bytes());
    time
}

fn bag_connection(id: u32, topic: &str, message_type: &str) -> Vec<u8> {
    let data = [
        bag_field("topic", topic.as_bytes()),
        bag_field("type", message_type.as_bytes()),
        bag_field("md5sum", b"cd5e73d190d741a2f92e81eda573aca7"),
        bag_field("message_definition", b""),
    ]
    .concat();
    bag_record(
        &[
            bag_field("op", &[0x07]),
            bag_field("conn", &id.to_le_bytes()),
            bag_field("topic", topic.as_bytes()),
        ],
        &data,
    )
}

/// Write a ROS1 bag (format 2.0) holding one uncompressed chunk.
///
/// Connection ids follow `topics` order; messages are written in slice order
/// and their payloads are taken as ROS1-serialized.
pub fn write_ros1_bag(path: &Path, topics: &[FixtureTopic], messages: &[FixtureMessage]) {
    const BAG_HEADER_LEN: usize = 4096;
    const VERSION_LINE: &[u8] = b"#ROSBAG V2.0\n";

    let conn_id = |topic: &str| -> u32 {
        topics
            .iter()
            .position(|(name, _)| *name == topic)
            .expect("message topic declared") as u32
    };

    // Chunk body: connections first, then message data.
    let mut chunk = Vec::new();
    for (id, (topic, message_type)) in topics.iter().enumerate() {
        chunk.extend(bag_connection(id as u32, topic, message_type));
    }
    let mut index: BTreeMap<u32, Vec<u8>> = BTreeMap::new();
    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for message in messages {
        let conn = conn_id(&message.topic);
        let entry = index.entry(conn).or_default();
        entry.extend_from_slice(&bag_time(message.timestamp));
        entry.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
        *counts.entry(conn).or_default() += 1;
        chunk.extend(bag_record(
            &[
                bag_field("op", &[0x02]),
                bag_field("conn", &conn.to_le_bytes()),
                bag_field("time", &bag_time(message.timestamp)),
            ],
            &message.payload,
        ));
    }

    let chunk_pos = (VERSION_LINE.len() + BAG_HEADER_LEN) as u64;
    let mut body = bag_record(
        &[
            bag_field("op", &[0x05]),
            bag_field("compression", b"none"),
            bag_field("size", &(chunk.len() as u32).to_le_bytes()),
        ],
        &chunk,
    );
    for (conn, entries) in &index {
        body.extend(bag_record(
            &[
                bag_field("op", &[0x04]),
                bag_field("ver", &1u32.to_le_bytes()),
                bag_field("conn", &conn.to_le_bytes()),
                bag_field("count", &counts[conn].to_le_bytes()),
            ],
            entries,
        ));
    }
    let index_pos = chunk_pos + body.len() as u64;

    // Index section: connections, then the chunk info.
    let mut index_section = Vec::new();
    for (id, (topic, message_type)) in topics.iter().enumerate() {
        index_section.extend(bag_connection(id as u32, topic, message_type));
    }
    let start_time = messages.iter().map(|m| m.timestamp).min().unwrap_or(0);
    let end_time = messages.iter().map(|m| m.timestamp).max().unwrap_or(0);
    let mut chunk_info = Vec::new();
    for (conn, count) in &counts {
        chunk_info.extend_from_slice(&conn.to_le_bytes());
        chunk_info.extend_from_slice(&count.to_le_bytes());
    }
    index_section.extend(bag_record(
        &[
            bag_field("op", &[0x06]),
            bag_field("ver", &1u32.to_le_bytes()),
            bag_field("chunk_pos", &chunk_pos.to_le_bytes()),
            bag_field("start_time", &bag_time(start_time)),
            bag_field("end_time", &bag_time(end_time)),
            bag_field("count", &(counts.len() as u32).to_le_bytes()),
        ],
        &chunk_info,
    ));

    // Bag header record, padded with spaces to its conventional 4096 bytes.
    let header_fields = [
        bag_field("op", &[0x03]),
        bag_field("index_pos", &index_pos.to_le_bytes()),
        bag_field("conn_count", &(topics.len() as u32).to_le_bytes()),
        bag_field("chunk_count", &1u32.to_le_bytes()),
    ];
    let header_len: usize = header_fields.iter().map(Vec::len).sum();
    let padding = vec![b' '; BAG_HEADER_LEN - 8 - header_len];
    let bag_header = bag_record(&header_fields, &padding);

    let mut file = Vec::new();
    file.extend_from_slice(VERSION_LINE);
    file.extend(bag_header);
    file.extend(body);
    file.extend(index_section);
    std::fs::write(path, file).expect("write bag");
}
