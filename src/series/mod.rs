// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Time-series accumulation of decoded samples.
//!
//! [`FIELDS`] is the single definition of the exported schema: the order of
//! the table is the column order in [`TimeSeries`], and the `group`/`name`
//! pairs are the dataset paths written to the container.

use crate::core::PoseSample;
use crate::{ExportError, Result};

/// Name of the root-level timestamp dataset.
pub const TIMESTAMPS: &str = "timestamps";

/// Container groups, in write order.
pub const GROUPS: [&str; 4] = [
    "positions",
    "orientations",
    "linear_velocities",
    "angular_velocities",
];

/// One exported scalar column.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    /// Group the dataset lives in
    pub group: &'static str,
    /// Dataset name within the group
    pub name: &'static str,
    /// Accessor extracting the value from a sample
    pub get: fn(&PoseSample) -> f64,
}

impl FieldDescriptor {
    /// `group/name` path of the dataset.
    pub fn path(&self) -> String {
        format!("{}/{}", self.group, self.name)
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("group", &self.group)
            .field("name", &self.name)
            .finish()
    }
}

macro_rules! field {
    ($group:literal, $name:literal, $($access:ident).+) => {
        FieldDescriptor {
            group: $group,
            name: $name,
            get: |s: &PoseSample| s.$($access).+,
        }
    };
}

/// Every exported column.
pub static FIELDS: [FieldDescriptor; 13] = [
    field!("positions", "x", position.x),
    field!("positions", "y", position.y),
    field!("positions", "z", position.z),
    field!("orientations", "x", orientation.x),
    field!("orientations", "y", orientation.y),
    field!("orientations", "z", orientation.z),
    field!("orientations", "w", orientation.w),
    field!("linear_velocities", "x", linear_velocity.x),
    field!("linear_velocities", "y", linear_velocity.y),
    field!("linear_velocities", "z", linear_velocity.z),
    field!("angular_velocities", "x", angular_velocity.x),
    field!("angular_velocities", "y", angular_velocity.y),
    field!("angular_velocities", "z", angular_velocity.z),
];

/// Growing per-field sequences, index-aligned with a timestamp sequence.
///
/// The whole run is held in memory until [`finalize`](Self::finalize).
#[derive(Debug, Clone)]
pub struct TimeSeries {
    timestamps: Vec<i64>,
    columns: Vec<Vec<f64>>,
}

impl Default for TimeSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-size every sequence, e.g. from a channel's message count.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            columns: FIELDS.iter().map(|_| Vec::with_capacity(capacity)).collect(),
        }
    }

    /// Append one sample; every sequence grows by exactly one element.
    pub fn append(&mut self, timestamp: i64, sample: &PoseSample) {
        self.timestamps.push(timestamp);
        for (column, field) in self.columns.iter_mut().zip(FIELDS.iter()) {
            column.push((field.get)(sample));
        }
    }

    /// Number of samples appended so far.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Freeze the sequences into fixed-length arrays.
    ///
    /// Consumes the accumulator, so nothing can be appended afterwards.
    pub fn finalize(self) -> FinalizedSeries {
        FinalizedSeries {
            timestamps: self.timestamps.into_boxed_slice(),
            columns: self
                .columns
                .into_iter()
                .map(Vec::into_boxed_slice)
                .collect(),
        }
    }
}

/// Fixed-length arrays ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedSeries {
    timestamps: Box<[i64]>,
    columns: Vec<Box<[f64]>>,
}

impl FinalizedSeries {
    /// Timestamps in nanoseconds, in recording order.
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Values of one field, looked up by group and dataset name.
    pub fn field(&self, group: &str, name: &str) -> Option<&[f64]> {
        FIELDS
            .iter()
            .position(|f| f.group == group && f.name == name)
            .and_then(|i| self.columns.get(i))
            .map(|c| &c[..])
    }

    /// Every field paired with its values, in [`FIELDS`] order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &[f64])> {
        FIELDS.iter().zip(self.columns.iter().map(|c| &c[..]))
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Verify every column has as many entries as the timestamp array.
    pub fn check_lengths(&self) -> Result<()> {
        if self.columns.len() != FIELDS.len() {
            return Err(ExportError::invariant_violation(format!(
                "expected {} columns, found {}",
                FIELDS.len(),
                self.columns.len()
            )));
        }
        for (field, values) in self.columns() {
            if values.len() != self.timestamps.len() {
                return Err(ExportError::invariant_violation(format!(
                    "{} has {} values but there are {} timestamps",
                    field.path(),
                    values.len(),
                    self.timestamps.len()
                )));
            }
        }
        Ok(())
    }
}
