//! Error types for the Hanlex library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`HanlexError`] enum. Errors from the resource synchronization job carry a
//! [`SyncFailure`] reason and are normally recovered inside the job; they
//! only surface when a caller drives a cycle directly.
//!
//! # Examples
//!
//! ```
//! use hanlex::error::{HanlexError, Result};
//!
//! fn lookup(name: &str) -> Result<()> {
//!     Err(HanlexError::unknown_scheme(name))
//! }
//!
//! assert_eq!(
//!     lookup("nope").unwrap_err().to_string(),
//!     "Unknown scheme: nope"
//! );
//! ```

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for Hanlex operations.
#[derive(Error, Debug)]
pub enum HanlexError {
    /// A tokenizer or analyzer name that is not registered, or whose
    /// availability predicate is currently false.
    #[error("Unknown scheme: {0}")]
    UnknownScheme(String),

    /// Input text that could not be decoded as UTF-8.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A resource synchronization cycle failed.
    #[error("Resource sync error ({reason}): {message}")]
    ResourceSync {
        /// Classified failure reason.
        reason: SyncFailure,
        /// Human readable detail.
        message: String,
    },

    /// Summary extraction failed. Never propagated into search results.
    #[error("Summary error: {0}")]
    Summary(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration, fatal at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with HanlexError.
pub type Result<T> = std::result::Result<T, HanlexError>;

/// Why a resource synchronization cycle failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncFailure {
    /// The resource server could not be reached or answered non-200.
    Network,
    /// The downloaded body did not match the advertised checksum.
    ChecksumMismatch,
    /// The payload could not be decoded or reported `success: false`.
    ParseError,
    /// The download exceeded the configured timeout.
    Timeout,
    /// The cycle was aborted by shutdown.
    Cancelled,
}

impl SyncFailure {
    /// Stable identifier used in logs and sync records.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncFailure::Network => "network",
            SyncFailure::ChecksumMismatch => "checksum-mismatch",
            SyncFailure::ParseError => "parse-error",
            SyncFailure::Timeout => "timeout",
            SyncFailure::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HanlexError {
    /// Create a new unknown scheme error.
    pub fn unknown_scheme<S: Into<String>>(name: S) -> Self {
        HanlexError::UnknownScheme(name.into())
    }

    /// Create a new malformed input error.
    pub fn malformed_input<S: Into<String>>(msg: S) -> Self {
        HanlexError::MalformedInput(msg.into())
    }

    /// Create a new resource sync error.
    pub fn sync<S: Into<String>>(reason: SyncFailure, msg: S) -> Self {
        HanlexError::ResourceSync {
            reason,
            message: msg.into(),
        }
    }

    /// Create a new summary error.
    pub fn summary<S: Into<String>>(msg: S) -> Self {
        HanlexError::Summary(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        HanlexError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        HanlexError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HanlexError::Other(msg.into())
    }

    /// The sync failure reason, if this is a sync error.
    pub fn sync_failure(&self) -> Option<SyncFailure> {
        match self {
            HanlexError::ResourceSync { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = HanlexError::unknown_scheme("mynlp-cws");
        assert_eq!(error.to_string(), "Unknown scheme: mynlp-cws");

        let error = HanlexError::analysis("Test analysis error");
        assert_eq!(error.to_string(), "Analysis error: Test analysis error");

        let error = HanlexError::sync(SyncFailure::ChecksumMismatch, "word");
        assert_eq!(
            error.to_string(),
            "Resource sync error (checksum-mismatch): word"
        );
        assert_eq!(error.sync_failure(), Some(SyncFailure::ChecksumMismatch));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = HanlexError::from(io_error);

        match error {
            HanlexError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_sync_failure_serde() {
        let json = serde_json::to_string(&SyncFailure::ParseError).unwrap();
        assert_eq!(json, "\"parse-error\"");
    }
}
