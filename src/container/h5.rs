// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! HDF5 backend (cargo feature `hdf5`).
//!
//! Produces the same group/dataset/attribute layout as the native container,
//! using `int64`/`float64` datasets and variable-length UTF-8 scalar
//! attributes on the root group.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use hdf5::types::VarLenUnicode;
use tracing::debug;

use super::ContainerSink;
use crate::{ExportError, Result};

/// Writer backed by the HDF5 C library.
pub struct Hdf5Sink {
    file: hdf5::File,
    path: PathBuf,
}

impl Hdf5Sink {
    /// Create (or truncate) an HDF5 file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = hdf5::File::create(&path)
            .map_err(|e| ExportError::write(&path, format!("Failed to create HDF5 file: {e}")))?;
        Ok(Self { file, path })
    }

    fn hdf5_error(&self, what: &str, e: hdf5::Error) -> ExportError {
        ExportError::write(&self.path, format!("{what}: {e}"))
    }
}

impl ContainerSink for Hdf5Sink {
    fn create_group(&mut self, name: &str) -> Result<()> {
        self.file
            .create_group(name)
            .map_err(|e| self.hdf5_error(&format!("Failed to create group '{name}'"), e))?;
        Ok(())
    }

    fn write_i64(&mut self, path: &str, data: &[i64]) -> Result<()> {
        self.file
            .new_dataset_builder()
            .with_data(data)
            .create(path)
            .map_err(|e| self.hdf5_error(&format!("Failed to write dataset '{path}'"), e))?;
        debug!(dataset = path, len = data.len(), "wrote HDF5 dataset");
        Ok(())
    }

    fn write_f64(&mut self, path: &str, data: &[f64]) -> Result<()> {
        self.file
            .new_dataset_builder()
            .with_data(data)
            .create(path)
            .map_err(|e| self.hdf5_error(&format!("Failed to write dataset '{path}'"), e))?;
        debug!(dataset = path, len = data.len(), "wrote HDF5 dataset");
        Ok(())
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        let value = VarLenUnicode::from_str(value).map_err(|e| {
            ExportError::write(&self.path, format!("Invalid attribute '{name}': {e}"))
        })?;
        self.file
            .new_attr::<VarLenUnicode>()
            .shape(())
            .create(name)
            .and_then(|attr| attr.write_scalar(&value))
            .map_err(|e| self.hdf5_error(&format!("Failed to write attribute '{name}'"), e))
    }

    fn finish(self: Box<Self>) -> Result<()> {
        self.file
            .flush()
            .map_err(|e| self.hdf5_error("Failed to flush HDF5 file", e))?;
        debug!(path = %self.path.display(), "finished HDF5 container");
        Ok(())
    }
}
