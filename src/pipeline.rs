// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Export pipeline driver.
//!
//! One linear pass: open the log, decode and accumulate every record on the
//! odometry topic, finalize the series, write the container.
//!
//! Two policies are fixed here:
//! - Records on any other topic are skipped without logging.
//! - A record on the odometry topic that fails to decode aborts the run; no
//!   container is produced.
//!
//! # Example
//!
//! ```rust,no_run
//! use odomcodec::{ExportOptions, Pipeline};
//!
//! let mut pipeline = Pipeline::new(ExportOptions::new("run9.db3", "run9.otc"));
//! let report = pipeline.run()?;
//! println!("{} samples written", report.samples_written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::container::{ContainerFormat, ContainerMetadata, ContainerWriter};
use crate::encoding::RecordDecoder;
use crate::io::LogSource;
use crate::series::TimeSeries;
use crate::Result;

/// Topic exported when none is configured.
pub const DEFAULT_TOPIC: &str = "/Odometry";

/// Records between progress callbacks.
const PROGRESS_INTERVAL: u64 = 1024;

/// Upper bound on the capacity reserved up front from channel statistics.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 20;

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Created, not yet run
    Idle,
    CheckingInput,
    Reading,
    Finalizing,
    Writing,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether the pipeline has stopped.
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::CheckingInput => "checking_input",
            PipelineState::Reading => "reading",
            PipelineState::Finalizing => "finalizing",
            PipelineState::Writing => "writing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// What to export and where.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Input log (file or rosbag2 directory)
    pub input: PathBuf,
    /// Output container path
    pub output: PathBuf,
    /// Exact-match topic filter
    pub topic: String,
    /// Container description attribute; the default text when `None`
    pub description: Option<String>,
    /// Container backend; chosen from the output extension when `None`
    pub format: Option<ContainerFormat>,
}

impl ExportOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            topic: DEFAULT_TOPIC.to_string(),
            description: None,
            format: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_format(mut self, format: ContainerFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Container written
    pub output: PathBuf,
    /// Backend used
    pub format: ContainerFormat,
    /// Records read from the log, on all topics
    pub records_read: u64,
    /// Samples in every output sequence
    pub samples_written: usize,
}

/// Single-use export driver.
pub struct Pipeline {
    options: ExportOptions,
    state: PipelineState,
    progress: Option<Box<dyn FnMut(u64)>>,
}

impl Pipeline {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            state: PipelineState::Idle,
            progress: None,
        }
    }

    /// Install a callback receiving the running count of records read.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(u64) + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the export.
    ///
    /// Any error leaves the pipeline in [`PipelineState::Failed`]; a pipeline
    /// that already ran cannot be run again.
    pub fn run(&mut self) -> Result<ExportReport> {
        if self.state != PipelineState::Idle {
            return Err(crate::ExportError::invariant_violation(format!(
                "pipeline already ran (state: {})",
                self.state
            )));
        }
        match self.execute() {
            Ok(report) => {
                self.transition(PipelineState::Done);
                Ok(report)
            }
            Err(e) => {
                error!(
                    state = %self.state,
                    error = %e,
                    input = %self.options.input.display(),
                    "export failed"
                );
                self.transition(PipelineState::Failed);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: PipelineState) {
        info!(from = %self.state, to = %next, "pipeline state");
        self.state = next;
    }

    fn report_progress(&mut self, records_read: u64) {
        if let Some(callback) = self.progress.as_mut() {
            callback(records_read);
        }
    }

    fn execute(&mut self) -> Result<ExportReport> {
        self.transition(PipelineState::CheckingInput);
        let source = LogSource::open(&self.options.input)?;
        let topic = self.options.topic.clone();

        // Index metadata only; the log itself is read exactly once below.
        let channels = source.indexed_channels()?;
        let capacity = match channels.iter().find(|c| c.topic == topic) {
            Some(channel) => {
                if !channel.is_odometry() {
                    warn!(
                        topic = %topic,
                        message_type = %channel.message_type,
                        "topic is not nav_msgs/Odometry; decoding it as odometry anyway"
                    );
                }
                usize::try_from(channel.message_count)
                    .unwrap_or(0)
                    .min(MAX_PREALLOCATED_SAMPLES)
            }
            None => 0,
        };

        self.transition(PipelineState::Reading);
        let decoder = RecordDecoder::new();
        let mut series = TimeSeries::with_capacity(capacity);
        let mut records_read = 0u64;
        {
            let mut reader = source.reader()?;
            while reader.has_next() {
                let record = reader.read_next()?;
                records_read += 1;
                if record.channel == topic {
                    let sample = decoder.decode(&record)?;
                    series.append(record.timestamp, &sample);
                }
                if records_read % PROGRESS_INTERVAL == 0 {
                    self.report_progress(records_read);
                }
            }
        }
        self.report_progress(records_read);
        if series.is_empty() {
            info!(topic = %topic, "no records on topic; the container will be empty");
        }
        debug!(
            records_read,
            samples = series.len(),
            files = source.storage_paths().len(),
            "log drained"
        );
        drop(source);

        self.transition(PipelineState::Finalizing);
        let series = series.finalize();

        self.transition(PipelineState::Writing);
        let mut metadata = ContainerMetadata::new(self.options.input.display().to_string());
        if let Some(description) = &self.options.description {
            metadata = metadata.with_description(description.clone());
        }
        let writer = match self.options.format {
            Some(format) => ContainerWriter::with_format(format),
            None => ContainerWriter::new(),
        };
        let format = writer.write(&series, &metadata, &self.options.output)?;

        Ok(ExportReport {
            output: self.options.output.clone(),
            format,
            records_read,
            samples_written: series.len(),
        })
    }
}
