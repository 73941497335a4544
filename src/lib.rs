// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Odomcodec
//!
//! Extracts odometry time series from recorded robot logs into a
//! self-describing container.
//!
//! Supported inputs:
//! - **MCAP** in [`io::formats::mcap`](crate::io::formats::mcap)
//! - **ROS1 bag** in [`io::formats::bag`](crate::io::formats::bag)
//! - **rosbag2 SQLite** (`.db3`) in [`io::formats::sqlite`](crate::io::formats::sqlite)
//!
//! ## Architecture
//!
//! The export is a single linear pass through four stages:
//! - `io/` - log reading: format detection and a sequential record reader
//! - `encoding/` - CDR / ROS1 decoding of `nav_msgs/Odometry` payloads
//! - `series/` - per-field time-series accumulation
//! - `container/` - container writers (HDF5 by default, native) and the native reader
//!
//! [`Pipeline`] wires them together.
//!
//! ## Example: Exporting a rosbag2 recording
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use odomcodec::{ExportOptions, Pipeline};
//!
//! let options = ExportOptions::new("recordings/run9", "run9.otc").with_topic("/Odometry");
//! let report = Pipeline::new(options).run()?;
//! println!("{} samples -> {}", report.samples_written, report.output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Reading a container back
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use odomcodec::container::ContainerReader;
//!
//! let reader = ContainerReader::open("run9.otc")?;
//! let timestamps = reader.read_i64("timestamps")?;
//! let x = reader.read_f64("positions/x")?;
//! assert_eq!(timestamps.len(), x.len());
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{ExportError, PoseSample, Quaternion, Result, Vector3};

// Log reading
pub mod io;

pub use io::{ChannelInfo, LogFormat, LogRecord, LogSource, MessageEncoding, SequentialReader};

// Payload decoding
pub mod encoding;

pub use encoding::{OdometryMessage, RecordDecoder};

// Time-series accumulation
pub mod series;

pub use series::{FieldDescriptor, FinalizedSeries, TimeSeries, FIELDS, GROUPS};

// Container output
pub mod container;

pub use container::{
    ContainerFormat, ContainerMetadata, ContainerReader, ContainerSink, ContainerWriter,
};

// Configuration
pub mod config;

pub use config::{ConfigError, ExportConfig};

// Pipeline driver
pub mod pipeline;

pub use pipeline::{ExportOptions, ExportReport, Pipeline, PipelineState, DEFAULT_TOPIC};
