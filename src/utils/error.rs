//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! The parse engine itself has no error type: malformed lines are skipped,
//! never surfaced (see `parser::engine`).

use thiserror::Error;

/// Errors that can occur while loading a log file
#[derive(Error, Debug)]
pub enum LogReadError {
    #[error("Failed to read log file: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Not a log file: {0}")]
    NotALogFile(String),

    #[error("Log file is empty")]
    EmptyFile,
}

/// Errors that can occur during report output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
