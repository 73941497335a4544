// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for odomcodec.
//!
//! Every stage of the export pipeline reports failures through [`ExportError`]:
//! - Input discovery and log reading
//! - Payload decoding
//! - Container writing
//!
//! None of these errors are recovered from inside the pipeline; each one ends
//! the run.

use std::fmt;
use std::path::Path;

/// Errors that can occur while exporting odometry from a log.
#[derive(Debug, Clone)]
pub enum ExportError {
    /// Input log path does not exist
    InputNotFound {
        /// Path that was checked
        path: String,
    },

    /// The log storage could not be read
    LogRead {
        /// Reader context (e.g., "McapLogSource")
        context: String,
        /// Error message
        message: String,
    },

    /// Buffer too short for requested read
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Payload does not match the odometry schema
    DecodeError {
        /// Field being decoded
        field: String,
        /// Cursor position when error occurred
        cursor_pos: u64,
        /// Underlying error
        cause: String,
    },

    /// Container could not be created or finalized
    WriteError {
        /// Target path
        path: String,
        /// Error message
        message: String,
    },

    /// Container could not be opened or is corrupt
    ContainerRead {
        /// Container path
        path: String,
        /// Error message
        message: String,
    },

    /// Unsupported format or feature
    Unsupported {
        /// What is not supported
        feature: String,
    },

    /// Invalid configuration
    Config {
        /// Error message
        message: String,
    },

    /// Internal invariant violation (indicates a bug, not bad input)
    InvariantViolation {
        /// Description of the invariant that was violated
        invariant: String,
    },

    /// Other error
    Other(String),
}

impl ExportError {
    /// Create an "input not found" error.
    pub fn input_not_found(path: impl AsRef<Path>) -> Self {
        ExportError::InputNotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create a log read error.
    pub fn log_read(context: impl Into<String>, message: impl Into<String>) -> Self {
        ExportError::LogRead {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        ExportError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a decode error for a specific field.
    pub fn decode(field: impl Into<String>, cursor_pos: u64, cause: impl Into<String>) -> Self {
        ExportError::DecodeError {
            field: field.into(),
            cursor_pos,
            cause: cause.into(),
        }
    }

    /// Create a write error.
    pub fn write(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ExportError::WriteError {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a container read error.
    pub fn container_read(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ExportError::ContainerRead {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        ExportError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ExportError::Config {
            message: message.into(),
        }
    }

    /// Create an invariant violation error.
    pub fn invariant_violation(invariant: impl Into<String>) -> Self {
        ExportError::InvariantViolation {
            invariant: invariant.into(),
        }
    }

    /// Whether this error came from decoding a payload.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ExportError::DecodeError { .. } | ExportError::BufferTooShort { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ExportError::InputNotFound { path } => vec![("path", path.clone())],
            ExportError::LogRead { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            ExportError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            ExportError::DecodeError {
                field,
                cursor_pos,
                cause,
            } => vec![
                ("field", field.clone()),
                ("cursor", cursor_pos.to_string()),
                ("cause", cause.clone()),
            ],
            ExportError::WriteError { path, message }
            | ExportError::ContainerRead { path, message } => {
                vec![("path", path.clone()), ("message", message.clone())]
            }
            ExportError::Unsupported { feature } => vec![("feature", feature.clone())],
            ExportError::Config { message } => vec![("message", message.clone())],
            ExportError::InvariantViolation { invariant } => {
                vec![("invariant", invariant.clone())]
            }
            ExportError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::InputNotFound { path } => write!(f, "Input log not found: '{path}'"),
            ExportError::LogRead { context, message } => {
                write!(f, "Log read error in {context}: {message}")
            }
            ExportError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => write!(
                f,
                "Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available"
            ),
            ExportError::DecodeError {
                field,
                cursor_pos,
                cause,
            } => write!(
                f,
                "Failed to decode field '{field}' (cursor_pos: {cursor_pos}): {cause}"
            ),
            ExportError::WriteError { path, message } => {
                write!(f, "Failed to write container '{path}': {message}")
            }
            ExportError::ContainerRead { path, message } => {
                write!(f, "Failed to read container '{path}': {message}")
            }
            ExportError::Unsupported { feature } => {
                write!(f, "Unsupported feature: '{feature}'")
            }
            ExportError::Config { message } => write!(f, "Configuration error: {message}"),
            ExportError::InvariantViolation { invariant } => {
                write!(f, "Invariant violation: {invariant}")
            }
            ExportError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Other(format!("IO error: {err}"))
    }
}

/// Result type for odomcodec operations.
pub type Result<T> = std::result::Result<T, ExportError>;
