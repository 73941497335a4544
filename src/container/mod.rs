// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Container output stage.
//!
//! A container holds one root-level `timestamps` dataset (`int64`, nanoseconds),
//! one group per [`GROUPS`] entry with a `float64` dataset per axis, and three
//! string attributes on the root: `creation_date`, `source_bag` and
//! `description`. These names are the compatibility surface for consumers.
//!
//! Two backends implement [`ContainerSink`]:
//! - `h5` - HDF5 via the C library, behind the default `hdf5` cargo feature
//! - [`native`] - a self-describing single-file format readable with
//!   [`ContainerReader`], selected by the `.otc` extension or explicitly

pub mod layout;
pub mod native;
pub mod reader;

#[cfg(feature = "hdf5")]
pub mod h5;

pub use layout::{DType, DatasetEntry};
pub use native::NativeSink;
pub use reader::ContainerReader;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::series::{FinalizedSeries, GROUPS, TIMESTAMPS};
use crate::{ExportError, Result};

/// Root attribute holding the ISO-8601 creation time.
pub const ATTR_CREATION_DATE: &str = "creation_date";

/// Root attribute holding the input path as given.
pub const ATTR_SOURCE_BAG: &str = "source_bag";

/// Root attribute holding a free-text description.
pub const ATTR_DESCRIPTION: &str = "description";

/// Description used when none is configured.
pub const DEFAULT_DESCRIPTION: &str = "Odometry data extracted from ROS2 bag file";

/// Destination for named arrays and scalar attributes.
///
/// Dataset paths are `/`-separated; a dataset's group must be created first.
pub trait ContainerSink {
    /// Create a group.
    fn create_group(&mut self, name: &str) -> Result<()>;

    /// Write a one-dimensional `int64` dataset.
    fn write_i64(&mut self, path: &str, data: &[i64]) -> Result<()>;

    /// Write a one-dimensional `float64` dataset.
    fn write_f64(&mut self, path: &str, data: &[f64]) -> Result<()>;

    /// Set a string attribute on the root.
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()>;

    /// Flush and close the container.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Container backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// Native single-file container, read back with [`ContainerReader`]
    Native,
    /// HDF5 (requires the `hdf5` feature, enabled by default)
    Hdf5,
}

impl Default for ContainerFormat {
    /// HDF5 when the build supports it, native otherwise.
    fn default() -> Self {
        if cfg!(feature = "hdf5") {
            ContainerFormat::Hdf5
        } else {
            ContainerFormat::Native
        }
    }
}

impl ContainerFormat {
    /// Pick a backend from the output file extension.
    ///
    /// `.otc` selects native, `.h5` and `.hdf5` select HDF5, and anything else
    /// gets the [default](ContainerFormat::default) backend.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("otc") => ContainerFormat::Native,
            Some("h5") | Some("hdf5") => ContainerFormat::Hdf5,
            _ => ContainerFormat::default(),
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::Native => "otc",
            ContainerFormat::Hdf5 => "h5",
        }
    }

    /// Whether this build can write the format.
    pub fn is_available(self) -> bool {
        match self {
            ContainerFormat::Native => true,
            ContainerFormat::Hdf5 => cfg!(feature = "hdf5"),
        }
    }

    fn create_sink(self, path: &Path) -> Result<Box<dyn ContainerSink>> {
        match self {
            ContainerFormat::Native => Ok(Box::new(NativeSink::create(path)?)),
            #[cfg(feature = "hdf5")]
            ContainerFormat::Hdf5 => Ok(Box::new(h5::Hdf5Sink::create(path)?)),
            #[cfg(not(feature = "hdf5"))]
            ContainerFormat::Hdf5 => Err(hdf5_unavailable()),
        }
    }
}

#[cfg(not(feature = "hdf5"))]
fn hdf5_unavailable() -> ExportError {
    ExportError::unsupported("HDF5 output (rebuild with `--features hdf5`)")
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerFormat::Native => write!(f, "native"),
            ContainerFormat::Hdf5 => write!(f, "hdf5"),
        }
    }
}

impl FromStr for ContainerFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "otc" => Ok(ContainerFormat::Native),
            "hdf5" | "h5" => Ok(ContainerFormat::Hdf5),
            other => Err(ExportError::config(format!(
                "unknown container format '{other}' (expected 'native' or 'hdf5')"
            ))),
        }
    }
}

/// Descriptive attributes stored on the container root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMetadata {
    pub creation_date: String,
    pub source_bag: String,
    pub description: String,
}

impl ContainerMetadata {
    /// Metadata for a container produced now from `source_bag`.
    pub fn new(source_bag: impl Into<String>) -> Self {
        Self {
            creation_date: chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            source_bag: source_bag.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attribute name/value pairs in write order.
    pub fn attributes(&self) -> [(&'static str, &str); 3] {
        [
            (ATTR_CREATION_DATE, &self.creation_date),
            (ATTR_SOURCE_BAG, &self.source_bag),
            (ATTR_DESCRIPTION, &self.description),
        ]
    }
}

/// Write the fixed layout into any sink.
///
/// Objects are created groups first, then datasets, then root attributes.
pub fn write_layout(
    sink: &mut dyn ContainerSink,
    series: &FinalizedSeries,
    metadata: &ContainerMetadata,
) -> Result<()> {
    for group in GROUPS {
        sink.create_group(group)?;
    }
    sink.write_i64(TIMESTAMPS, series.timestamps())?;
    for (field, values) in series.columns() {
        sink.write_f64(&field.path(), values)?;
    }
    for (name, value) in metadata.attributes() {
        sink.set_attribute(name, value)?;
    }
    Ok(())
}

/// Sibling path the container is written to before the final rename.
fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| ExportError::write(path, "output path has no file name"))?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(temp_name))
}

/// Writes finalized series into a container file.
///
/// The container is built in a temporary file next to the target and renamed
/// into place once complete, so the target is either the previous file or a
/// complete new container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerWriter {
    format: Option<ContainerFormat>,
}

impl ContainerWriter {
    /// Writer choosing the backend from the output extension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with a fixed backend.
    pub fn with_format(format: ContainerFormat) -> Self {
        Self {
            format: Some(format),
        }
    }

    /// Backend that will be used for `path`.
    pub fn format_for(&self, path: &Path) -> ContainerFormat {
        self.format.unwrap_or_else(|| ContainerFormat::from_path(path))
    }

    /// Write `series` and `metadata` to `path`, replacing any existing file.
    pub fn write<P: AsRef<Path>>(
        &self,
        series: &FinalizedSeries,
        metadata: &ContainerMetadata,
        path: P,
    ) -> Result<ContainerFormat> {
        let path = path.as_ref();
        series.check_lengths()?;

        let format = self.format_for(path);
        let temp = temp_path_for(path)?;
        debug!(temp = %temp.display(), format = %format, "writing container");

        let written = format.create_sink(&temp).and_then(|mut sink| {
            write_layout(sink.as_mut(), series, metadata)?;
            sink.finish()
        });
        if let Err(e) = written {
            discard(&temp);
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp, path) {
            discard(&temp);
            return Err(ExportError::write(
                path,
                format!("Failed to move container into place: {e}"),
            ));
        }

        info!(
            path = %path.display(),
            format = %format,
            samples = series.len(),
            "container written"
        );
        Ok(format)
    }
}

fn discard(temp: &Path) {
    if let Err(e) = fs::remove_file(temp) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %temp.display(), error = %e, "failed to remove temporary container");
        }
    }
}
