// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Export configuration file.
//!
//! ```toml
//! input = "recordings/run9"
//! output = "run9.otc"
//! topic = "/Odometry"
//! description = "Lab run 9"
//! format = "native"   # or "hdf5"
//! ```
//!
//! Every key is optional; command-line arguments take precedence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::container::ContainerFormat;
use crate::pipeline::{ExportOptions, DEFAULT_TOPIC};
use crate::ExportError;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting '{0}'")]
    Missing(&'static str),

    #[error("Topic must not be empty")]
    EmptyTopic,
}

impl From<ConfigError> for ExportError {
    fn from(e: ConfigError) -> Self {
        ExportError::config(e.to_string())
    }
}

/// Export settings as read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub topic: String,
    pub description: Option<String>,
    pub format: Option<ContainerFormat>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            topic: DEFAULT_TOPIC.to_string(),
            description: None,
            format: None,
        }
    }
}

impl ExportConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Build pipeline options; `input` and `output` must be set and the
    /// topic must not be empty.
    pub fn into_options(self) -> Result<ExportOptions, ConfigError> {
        let input = self.input.ok_or(ConfigError::Missing("input"))?;
        let output = self.output.ok_or(ConfigError::Missing("output"))?;
        if self.topic.is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        Ok(ExportOptions {
            input,
            output,
            topic: self.topic,
            description: self.description,
            format: self.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ExportConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExportConfig::default());
        assert_eq!(config.topic, "/Odometry");
    }

    #[test]
    fn test_full_config() {
        let config = ExportConfig::from_toml_str(
            r#"
            input = "run9.db3"
            output = "run9.h5"
            topic = "/odom"
            description = "lab run"
            format = "hdf5"
            "#,
        )
        .unwrap();
        let options = config.into_options().unwrap();
        assert_eq!(options.input, PathBuf::from("run9.db3"));
        assert_eq!(options.output, PathBuf::from("run9.h5"));
        assert_eq!(options.topic, "/odom");
        assert_eq!(options.description.as_deref(), Some("lab run"));
        assert_eq!(options.format, Some(ContainerFormat::Hdf5));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            ExportConfig::from_toml_str("topics = \"/odom\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(ExportConfig::from_toml_str("format = \"parquet\"").is_err());
    }

    #[test]
    fn test_empty_topic_rejected() {
        let config = ExportConfig::from_toml_str(
            r#"
            input = "run9.db3"
            output = "run9.h5"
            topic = ""
            "#,
        )
        .unwrap();
        assert!(matches!(config.into_options(), Err(ConfigError::EmptyTopic)));
    }

    #[test]
    fn test_empty_topic_rejected_without_file() {
        let config = ExportConfig {
            input: Some(PathBuf::from("a.db3")),
            output: Some(PathBuf::from("b.otc")),
            topic: String::new(),
            ..ExportConfig::default()
        };
        assert!(matches!(config.into_options(), Err(ConfigError::EmptyTopic)));
    }

    #[test]
    fn test_missing_output() {
        let config = ExportConfig::from_toml_str("input = \"a.mcap\"").unwrap();
        let err = config.into_options().unwrap_err();
        assert_eq!(err.to_string(), "Missing required setting 'output'");

        let export_err: ExportError = err.into();
        assert!(matches!(export_err, ExportError::Config { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ExportConfig::load(Path::new("/nonexistent/odomcodec.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
