// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Native container writer.
//!
//! Datasets are streamed to disk as they are written; the index is kept in
//! memory and appended by [`finish`](ContainerSink::finish) together with the
//! fixed-size trailer. See [`layout`](super::layout) for the byte layout.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tracing::debug;

use super::layout::{
    padding_for, split_parent, ContainerIndex, DType, DatasetEntry, GroupEntry, FORMAT_VERSION,
    MAGIC,
};
use super::ContainerSink;
use crate::{ExportError, Result};

/// Writer for the native container format.
pub struct NativeSink {
    writer: BufWriter<File>,
    path: PathBuf,
    /// Current write position (tracked manually since BufWriter doesn't expose stream_position)
    position: u64,
    index: ContainerIndex,
}

impl NativeSink {
    /// Create (or truncate) the file at `path` and write the leading magic.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .map_err(|e| ExportError::write(&path, format!("Failed to create file: {e}")))?;

        let mut sink = Self {
            writer: BufWriter::new(file),
            path,
            position: 0,
            index: ContainerIndex::default(),
        };
        sink.write_bytes(MAGIC)?;
        Ok(sink)
    }

    fn io_error(&self, e: std::io::Error) -> ExportError {
        ExportError::write(&self.path, format!("I/O error: {e}"))
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        if let Err(e) = self.writer.write_all(data) {
            return Err(self.io_error(e));
        }
        self.position += data.len() as u64;
        Ok(())
    }

    /// Find the group a dataset path belongs to, and the dataset name.
    fn parent_of<'p>(&mut self, path: &'p str) -> Result<(&mut GroupEntry, &'p str)> {
        let (parent, name) = split_parent(path);
        if name.is_empty() {
            return Err(ExportError::write(
                &self.path,
                format!("invalid dataset path '{path}'"),
            ));
        }
        let target = self.path.clone();
        let group = self.index.root.group_mut(parent).ok_or_else(|| {
            ExportError::write(&target, format!("group '{parent}' does not exist"))
        })?;
        if group.datasets.contains_key(name) || group.groups.contains_key(name) {
            return Err(ExportError::write(
                &target,
                format!("'{path}' already exists"),
            ));
        }
        Ok((group, name))
    }

    fn write_dataset(&mut self, path: &str, dtype: DType, count: usize, blob: &[u8]) -> Result<()> {
        // Validate the path before touching the file.
        self.parent_of(path)?;

        let padding = padding_for(self.position) as usize;
        self.write_bytes(&[0u8; 8][..padding])?;
        let offset = self.position;
        self.write_bytes(blob)?;

        let entry = DatasetEntry {
            dtype,
            shape: vec![count as u64],
            offset,
            length: blob.len() as u64,
            crc32: crc32fast::hash(blob),
        };
        let (group, name) = self.parent_of(path)?;
        group.datasets.insert(name.to_string(), entry);

        debug!(dataset = path, dtype = %dtype, len = count, offset, "wrote dataset");
        Ok(())
    }
}

impl ContainerSink for NativeSink {
    fn create_group(&mut self, name: &str) -> Result<()> {
        let (parent, _) = self.parent_of(name)?;
        let (_, child) = split_parent(name);
        parent
            .groups
            .insert(child.to_string(), GroupEntry::default());
        Ok(())
    }

    fn write_i64(&mut self, path: &str, data: &[i64]) -> Result<()> {
        let mut blob = vec![0u8; data.len() * DType::Int64.size()];
        LittleEndian::write_i64_into(data, &mut blob);
        self.write_dataset(path, DType::Int64, data.len(), &blob)
    }

    fn write_f64(&mut self, path: &str, data: &[f64]) -> Result<()> {
        let mut blob = vec![0u8; data.len() * DType::Float64.size()];
        LittleEndian::write_f64_into(data, &mut blob);
        self.write_dataset(path, DType::Float64, data.len(), &blob)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.index
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        let index = serde_json::to_vec(&self.index)
            .map_err(|e| ExportError::write(&self.path, format!("Failed to encode index: {e}")))?;
        let index_offset = self.position;
        self.write_bytes(&index)?;

        let mut trailer = Vec::with_capacity(super::layout::TRAILER_LEN);
        trailer.write_u64::<LittleEndian>(index_offset)?;
        trailer.write_u64::<LittleEndian>(index.len() as u64)?;
        trailer.write_u32::<LittleEndian>(crc32fast::hash(&index))?;
        trailer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        trailer.extend_from_slice(MAGIC);
        self.write_bytes(&trailer)?;

        let path = self.path.clone();
        let file = self
            .writer
            .into_inner()
            .map_err(|e| ExportError::write(&path, format!("Failed to flush: {}", e.error())))?;
        file.sync_all()
            .map_err(|e| ExportError::write(&path, format!("Failed to sync: {e}")))?;

        debug!(
            path = %path.display(),
            index_offset,
            index_len = index.len(),
            "finished native container"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "odomcodec_test_native_{}_{}.otc",
            std::process::id(),
            name
        ))
    }

    #[test]
    fn test_dataset_requires_existing_group() {
        let path = temp_path("missing_group");
        let mut sink = NativeSink::create(&path).unwrap();
        let err = sink.write_f64("positions/x", &[1.0]).unwrap_err();
        assert!(matches!(err, ExportError::WriteError { .. }));

        sink.create_group("positions").unwrap();
        sink.write_f64("positions/x", &[1.0]).unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_duplicate_dataset_rejected() {
        let path = temp_path("duplicate");
        let mut sink = NativeSink::create(&path).unwrap();
        sink.write_i64("timestamps", &[1, 2]).unwrap();
        assert!(sink.write_i64("timestamps", &[3]).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_blobs_are_aligned() {
        let path = temp_path("aligned");
        let mut sink = NativeSink::create(&path).unwrap();
        sink.write_i64("a", &[1, 2, 3]).unwrap();
        sink.write_f64("b", &[]).unwrap();
        sink.write_f64("c", &[0.5]).unwrap();

        for name in ["a", "b", "c"] {
            let entry = sink.index.root.dataset(name).unwrap();
            assert_eq!(entry.offset % 8, 0, "{name}");
        }
        assert_eq!(sink.index.root.dataset("a").unwrap().offset, 8);
        assert_eq!(sink.index.root.dataset("b").unwrap().shape, vec![0]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_finish_writes_trailer_magic() {
        let path = temp_path("trailer");
        let mut sink = Box::new(NativeSink::create(&path).unwrap());
        sink.set_attribute("description", "unit test").unwrap();
        sink.write_i64("timestamps", &[7]).unwrap();
        sink.finish().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], MAGIC);
        assert_eq!(&bytes[bytes.len() - 8..], MAGIC);
        let _ = std::fs::remove_file(&path);
    }
}
