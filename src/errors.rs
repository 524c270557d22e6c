// src/errors.rs

//! Crate-wide error type.
//!
//! Every failure during graph construction is raised synchronously and
//! names the job or report it concerns. Nothing here is retried; retry only
//! applies to task execution, which belongs to the backend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperboyError {
    /// Malformed transport encoding (base64, UTF-8 or JSON).
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Missing, malformed or duplicate required fields.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internally inconsistent scheduling parameters or defaults.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PaperboyError>;
