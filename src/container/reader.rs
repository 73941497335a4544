// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Random-access reader for native containers.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use memmap2::Mmap;

use super::layout::{ContainerIndex, DType, DatasetEntry, FORMAT_VERSION, MAGIC, TRAILER_LEN};
use crate::{ExportError, Result};

/// A native container opened for reading.
///
/// The file is memory-mapped; only the index is parsed up front and each
/// dataset is read (and checksum-verified) on demand.
pub struct ContainerReader {
    path: PathBuf,
    mmap: Mmap,
    index: ContainerIndex,
}

impl ContainerReader {
    /// Open a container and parse its index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|e| ExportError::container_read(&path, format!("Failed to open file: {e}")))?;

        // SAFETY: The mapping is read-only and lives as long as the reader.
        // Concurrent modification of the file is not supported.
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| ExportError::container_read(&path, format!("Failed to mmap file: {e}")))?;

        let index = parse_index(&path, &mmap)?;
        Ok(Self { path, mmap, index })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root-level string attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.index.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.index.attributes.get(name).map(String::as_str)
    }

    /// Names of the root-level groups.
    pub fn groups(&self) -> Vec<String> {
        self.index.root.groups.keys().cloned().collect()
    }

    /// Names of the datasets directly inside `group` (`""` for the root).
    pub fn datasets(&self, group: &str) -> Result<Vec<String>> {
        let entry = self.index.root.group(group).ok_or_else(|| {
            ExportError::container_read(&self.path, format!("no group '{group}'"))
        })?;
        Ok(entry.datasets.keys().cloned().collect())
    }

    /// Every dataset in the container with its full path.
    pub fn all_datasets(&self) -> Vec<(String, &DatasetEntry)> {
        let mut out = Vec::new();
        self.index.root.walk_datasets("", &mut out);
        out
    }

    /// Index entry for a dataset path such as `positions/x`.
    pub fn dataset(&self, path: &str) -> Result<&DatasetEntry> {
        self.index.root.dataset(path).ok_or_else(|| {
            ExportError::container_read(&self.path, format!("no dataset '{path}'"))
        })
    }

    fn blob(&self, path: &str, dtype: DType) -> Result<(&DatasetEntry, &[u8])> {
        let entry = self.dataset(path)?;
        if entry.dtype != dtype {
            return Err(ExportError::container_read(
                &self.path,
                format!("dataset '{path}' is {}, not {dtype}", entry.dtype),
            ));
        }
        let start = usize::try_from(entry.offset).ok();
        let len = usize::try_from(entry.length).ok();
        let blob = match (start, len) {
            (Some(start), Some(len)) => start
                .checked_add(len)
                .and_then(|end| self.mmap.get(start..end)),
            _ => None,
        }
        .ok_or_else(|| {
            ExportError::container_read(
                &self.path,
                format!("dataset '{path}' lies outside the file"),
            )
        })?;

        if blob.len() as u64 != entry.len() * dtype.size() as u64 {
            return Err(ExportError::container_read(
                &self.path,
                format!("dataset '{path}' length does not match its shape"),
            ));
        }
        if crc32fast::hash(blob) != entry.crc32 {
            return Err(ExportError::container_read(
                &self.path,
                format!("checksum mismatch in dataset '{path}'"),
            ));
        }
        Ok((entry, blob))
    }

    /// Read an `int64` dataset.
    pub fn read_i64(&self, path: &str) -> Result<Vec<i64>> {
        let (_, blob) = self.blob(path, DType::Int64)?;
        let mut values = vec![0i64; blob.len() / DType::Int64.size()];
        LittleEndian::read_i64_into(blob, &mut values);
        Ok(values)
    }

    /// Read a `float64` dataset.
    pub fn read_f64(&self, path: &str) -> Result<Vec<f64>> {
        let (_, blob) = self.blob(path, DType::Float64)?;
        let mut values = vec![0f64; blob.len() / DType::Float64.size()];
        LittleEndian::read_f64_into(blob, &mut values);
        Ok(values)
    }

    /// Verify the checksum of every dataset.
    pub fn verify(&self) -> Result<()> {
        for (path, entry) in self.all_datasets() {
            self.blob(&path, entry.dtype)?;
        }
        Ok(())
    }
}

fn parse_index(path: &Path, data: &[u8]) -> Result<ContainerIndex> {
    let corrupt = |message: String| ExportError::container_read(path, message);

    if data.len() < MAGIC.len() + TRAILER_LEN || &data[..MAGIC.len()] != MAGIC {
        return Err(corrupt("not an odomcodec container".to_string()));
    }
    let trailer = &data[data.len() - TRAILER_LEN..];
    if &trailer[TRAILER_LEN - MAGIC.len()..] != MAGIC {
        return Err(corrupt("missing trailer magic (truncated file?)".to_string()));
    }

    let mut cursor = Cursor::new(trailer);
    let index_offset = cursor.read_u64::<LittleEndian>()?;
    let index_len = cursor.read_u64::<LittleEndian>()?;
    let index_crc = cursor.read_u32::<LittleEndian>()?;
    let version = cursor.read_u32::<LittleEndian>()?;

    if version != FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported container version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let index_end = data.len() - TRAILER_LEN;
    let index = usize::try_from(index_offset)
        .ok()
        .zip(usize::try_from(index_len).ok())
        .and_then(|(start, len)| Some(start..start.checked_add(len)?))
        .filter(|range| range.start >= MAGIC.len() && range.end == index_end)
        .map(|range| &data[range])
        .ok_or_else(|| corrupt("index location is out of range".to_string()))?;

    if crc32fast::hash(index) != index_crc {
        return Err(corrupt("index checksum mismatch".to_string()));
    }

    serde_json::from_slice(index).map_err(|e| corrupt(format!("invalid index: {e}")))
}
