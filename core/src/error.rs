//! Error types for the portify-core library.

use thiserror::Error;

/// Result type alias for portify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the library to its callers.
#[derive(Error, Debug)]
pub enum Error {
    /// The connection table could not be read.
    #[error("Error scanning ports: {0}")]
    Scan(#[from] ScanError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that can occur while querying the OS connection table.
///
/// Only `PermissionDenied` from the bulk query is recoverable: the
/// enumerator then walks processes one by one.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scanning tool could not be started at all.
    #[error("Tool unavailable: {0}")]
    ToolUnavailable(String),

    /// The scanning command ran but reported failure.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// The OS refused the bulk query.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Platform not supported.
    #[error("Platform not supported")]
    PlatformNotSupported,
}

/// Per-process failures while resolving, sampling or signalling a PID.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The process does not exist (or exited while we looked at it).
    #[error("Process with PID {0} not found")]
    NoSuchProcess(u32),

    /// The OS refused access to the process.
    #[error("Access denied for PID {0}")]
    AccessDenied(u32),

    /// The tool used to probe the process could not run at all.
    #[error("Probe unavailable: {0}")]
    Unavailable(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl ProbeError {
    /// Whether this failure is the expected, per-item kind that a scan
    /// absorbs by degrading the record.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProbeError::NoSuchProcess(_) | ProbeError::AccessDenied(_))
    }
}
