//! Error types shared by every codec and the file pipeline.
//!
//! Each variant is a distinct failure domain. None of them are transient:
//! compression and decompression are deterministic, so callers should report
//! the error and stop rather than retry.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all operations in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The source path does not exist.
    #[error("input file '{}' not found", .0.display())]
    NotFound(PathBuf),

    /// The source text has zero length.
    #[error("input is empty")]
    EmptyInput,

    /// The artifact bytes are not a recognizable container.
    #[error("invalid compressed artifact: {0}")]
    Format(String),

    /// An LZW code stream references a code the dictionary cannot resolve.
    #[error("corrupt compressed data: {0}")]
    CorruptData(String),

    /// The LZW dictionary outgrew the configured code width.
    #[error("dictionary exceeded the maximum code width of {max_code_width} bits")]
    CapacityExceeded { max_code_width: u8 },

    /// Bad configuration or input the selected codec cannot represent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
