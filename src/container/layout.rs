// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! On-disk layout of the native container.
//!
//! ```text
//! +----------------------+ 0
//! | MAGIC (8)            |
//! +----------------------+
//! | dataset blobs        |  each starts on an 8-byte boundary, little endian
//! +----------------------+ index_offset
//! | JSON index           |  attributes + group/dataset tree
//! +----------------------+
//! | index_offset  u64    |
//! | index_len     u64    |
//! | index_crc32   u32    |
//! | version       u32    |
//! | MAGIC (8)            |
//! +----------------------+ EOF
//! ```
//!
//! The trailer sits at a fixed distance from the end of the file, so a reader
//! finds the index with one seek and can then read any dataset directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// File magic, written at both ends of the container.
pub const MAGIC: &[u8; 8] = b"\x89ODOMC\r\n";

/// Current layout version.
pub const FORMAT_VERSION: u32 = 1;

/// Size of the fixed trailer, including the closing magic.
pub const TRAILER_LEN: usize = 8 + 8 + 4 + 4 + MAGIC.len();

/// Alignment of every dataset blob.
pub const DATA_ALIGNMENT: u64 = 8;

/// Element type of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Int64,
    Float64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        8
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DType::Int64 => write!(f, "int64"),
            DType::Float64 => write!(f, "float64"),
        }
    }
}

/// Location and checksum of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub dtype: DType,
    pub shape: Vec<u64>,
    /// Absolute byte offset of the first element
    pub offset: u64,
    /// Length of the blob in bytes
    pub length: u64,
    /// CRC32 of the blob
    pub crc32: u32,
}

impl DatasetEntry {
    /// Number of elements.
    pub fn len(&self) -> u64 {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A group: named child groups and datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    #[serde(default)]
    pub groups: BTreeMap<String, GroupEntry>,
    #[serde(default)]
    pub datasets: BTreeMap<String, DatasetEntry>,
}

impl GroupEntry {
    /// Walk a `/`-separated group path.
    pub fn group(&self, path: &str) -> Option<&GroupEntry> {
        split_path(path).try_fold(self, |group, name| group.groups.get(name))
    }

    /// Mutable variant of [`group`](Self::group).
    pub fn group_mut(&mut self, path: &str) -> Option<&mut GroupEntry> {
        split_path(path).try_fold(self, |group, name| group.groups.get_mut(name))
    }

    /// Look up a dataset by `/`-separated path.
    pub fn dataset(&self, path: &str) -> Option<&DatasetEntry> {
        let (parent, name) = split_parent(path);
        self.group(parent)?.datasets.get(name)
    }

    /// Visit every dataset with its full path.
    pub fn walk_datasets<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a DatasetEntry)>) {
        for (name, entry) in &self.datasets {
            out.push((join_path(prefix, name), entry));
        }
        for (name, group) in &self.groups {
            group.walk_datasets(&join_path(prefix, name), out);
        }
    }
}

/// The JSON index stored before the trailer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerIndex {
    pub attributes: BTreeMap<String, String>,
    pub root: GroupEntry,
}

/// Iterate the non-empty components of a `/`-separated path.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Split `a/b/c` into (`a/b`, `c`).
pub fn split_parent(path: &str) -> (&str, &str) {
    let trimmed = path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", trimmed),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Padding needed to bring `position` to the next dataset boundary.
pub fn padding_for(position: u64) -> u64 {
    (DATA_ALIGNMENT - position % DATA_ALIGNMENT) % DATA_ALIGNMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(offset: u64) -> DatasetEntry {
        DatasetEntry {
            dtype: DType::Float64,
            shape: vec![2],
            offset,
            length: 16,
            crc32: 0,
        }
    }

    #[test]
    fn test_trailer_len() {
        assert_eq!(TRAILER_LEN, 32);
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(8), 0);
        assert_eq!(padding_for(9), 7);
        assert_eq!(padding_for(15), 1);
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("positions/x"), ("positions", "x"));
        assert_eq!(split_parent("timestamps"), ("", "timestamps"));
        assert_eq!(split_parent("/a/b/c"), ("a/b", "c"));
    }

    #[test]
    fn test_group_tree_lookup() {
        let mut root = GroupEntry::default();
        root.datasets.insert("timestamps".into(), entry(8));
        let mut positions = GroupEntry::default();
        positions.datasets.insert("x".into(), entry(24));
        root.groups.insert("positions".into(), positions);

        assert_eq!(root.dataset("timestamps").unwrap().offset, 8);
        assert_eq!(root.dataset("positions/x").unwrap().offset, 24);
        assert!(root.dataset("positions/w").is_none());
        assert!(root.group("orientations").is_none());

        let mut all = Vec::new();
        root.walk_datasets("", &mut all);
        let paths: Vec<&str> = all.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["timestamps", "positions/x"]);
    }

    #[test]
    fn test_index_json_shape() {
        let mut index = ContainerIndex::default();
        index
            .attributes
            .insert("description".into(), "test".into());
        index.root.datasets.insert("timestamps".into(), entry(8));

        let json = serde_json::to_string(&index).unwrap();
        assert!(json.contains("\"dtype\":\"float64\""));
        let back: ContainerIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);
    }
}
