use std::path::PathBuf;
use thiserror::Error;

use crate::core::parser::ParseError;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    /// Path is not valid UTF-8 and cannot be tilde-expanded.
    #[error("Invalid path encoding: {0}")]
    InvalidPath(PathBuf),
    /// An option the engine reads has a value it cannot use.
    #[error("Invalid value '{value}' for option {key} on line {line}")]
    InvalidValue {
        key: String,
        value: String,
        line: usize,
    },
    /// The file could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// File watching could not be set up.
    #[error("Failed to watch config: {0}")]
    Watch(#[from] notify::Error),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
