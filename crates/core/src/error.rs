// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/error.rs
use thiserror::Error;

/// Errors raised while assembling configs and preparing datasets.
///
/// All of these are configuration-time failures: they are returned to the
/// caller immediately and never retried.
#[derive(Debug, Error)]
pub enum MedimgError {
    /// Malformed proportions or option values.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A required column is absent from the dataset table.
    #[error("missing column '{column}' in dataset table")]
    MissingColumn { column: String },

    #[error("unknown config '{0}'")]
    UnknownConfig(String),

    /// Malformed CSV input. `line` is 1-based and counts the header.
    #[error("CSV line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
}

impl MedimgError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        MedimgError::InvalidConfiguration(msg.into())
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        MedimgError::MissingColumn { column: column.into() }
    }
}

pub type Result<T> = std::result::Result<T, MedimgError>;
