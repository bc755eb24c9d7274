//! Error types for clip-stitch
//!
//! This module provides the error taxonomy for a stitch job:
//! - Download failures (network, missing remote resource, timeout)
//! - External media tool failures, carrying the tool's captured diagnostics
//! - Filesystem failures while preparing or publishing files
//! - Request/configuration validation failures
//!
//! Every variant maps to a stable machine-readable code through [`ErrorCode`],
//! which is what the JSON failure result carries next to the message.

use crate::types::Stage;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for clip-stitch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for clip-stitch
///
/// Each variant includes enough context for the failure message reported to the
/// caller to be useful on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// The job request is unusable (no clips, no audio, bad output name, bad URL)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "process_timeout")
        key: Option<String>,
    },

    /// Download did not complete (connection failure, non-success status, body read error)
    #[error("failed to fetch {url}: {reason}")]
    Network {
        /// The URL being fetched
        url: String,
        /// What went wrong
        reason: String,
        /// HTTP status returned by the server, if a response was received
        status: Option<u16>,
    },

    /// The remote resource does not exist (HTTP 404/410)
    #[error("resource not found: {url}")]
    NotFound {
        /// The URL that could not be resolved
        url: String,
    },

    /// A download or tool invocation exceeded its time limit
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        /// What was being done (e.g., "download of https://…", "ffmpeg concat")
        operation: String,
        /// The limit that was exceeded
        after: Duration,
    },

    /// The external media tool exited unsuccessfully
    #[error("ffmpeg {stage} failed ({}): {diagnostics}", exit_label(.status))]
    Process {
        /// Pipeline stage the tool was running for
        stage: Stage,
        /// Exit code, `None` if the process was terminated by a signal
        status: Option<i32>,
        /// Captured diagnostic output of the tool
        diagnostics: String,
    },

    /// The external media tool could not be located or started
    #[error("media tool unavailable: {0}")]
    ToolUnavailable(String),

    /// I/O error
    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    /// Output file already exists and the collision policy forbids replacing it
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The path where the collision occurred
        path: PathBuf,
        /// The reason for the collision
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The job was cancelled before it finished
    #[error("job cancelled")]
    Cancelled,

    /// Anything else
    #[error("{0}")]
    Unexpected(String),
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl Error {
    /// Build a [`Error::Network`] or [`Error::Timeout`] from a reqwest failure
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Error::Timeout {
                operation: format!("download of {url}"),
                after: timeout,
            };
        }

        let reason = if err.is_connect() {
            format!("connection failed: {err}")
        } else if err.is_body() || err.is_decode() {
            format!("failed to read response body: {err}")
        } else {
            err.to_string()
        };

        Error::Network {
            url: url.to_string(),
            reason,
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

/// Map errors to stable machine-readable codes
///
/// The code accompanies the human-readable message in the JSON failure result so
/// callers can branch without parsing text.
pub trait ErrorCode {
    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ErrorCode for Error {
    fn error_code(&self) -> &str {
        match self {
            Error::InvalidRequest(_) => "invalid_request",
            Error::Config { .. } => "config_error",
            Error::Network { .. } => "network_error",
            Error::NotFound { .. } => "not_found",
            Error::Timeout { .. } => "timeout",
            Error::Process { .. } => "process_error",
            Error::ToolUnavailable(_) => "tool_unavailable",
            Error::Filesystem(_) => "filesystem_error",
            Error::FileCollision { .. } => "file_collision",
            Error::Serialization(_) => "invalid_request",
            Error::Cancelled => "cancelled",
            Error::Unexpected(_) => "unexpected_error",
        }
    }
}
