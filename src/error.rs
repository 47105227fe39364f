//! Error types for the sensor data client
//!
//! Every public operation fails with one of four caller-facing categories:
//! configuration, validation, upload and read. Lower-level failures (HTTP,
//! JSON, token exchange) are carried as the source of the upload/read error
//! that triggered them.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for sensor client operations
pub type Result<T> = std::result::Result<T, SensorError>;

/// Error types for sensor client operations
#[derive(Error, Debug)]
pub enum SensorError {
    /// Missing or invalid credential, database URL or settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing or malformed call arguments
    #[error("Validation error: {0}")]
    Validation(String),

    /// A write to the remote store was rejected
    #[error("Upload to '{path}' failed: {source}")]
    Upload {
        path: String,
        #[source]
        source: Box<SensorError>,
    },

    /// A read from the remote store was rejected
    #[error("Read of '{path}' failed: {source}")]
    Read {
        path: String,
        #[source]
        source: Box<SensorError>,
    },

    /// Token exchange or database rejected the credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Remote store answered with a non-success status
    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error category, stable for callers that branch on failures
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Upload,
    Read,
    Authentication,
    Transport,
    Data,
}

impl ErrorCategory {
    /// Category name as used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Upload => "upload",
            ErrorCategory::Read => "read",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Transport => "transport",
            ErrorCategory::Data => "data",
        }
    }
}

impl SensorError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an authentication error
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a remote status error
    pub fn remote<S: Into<String>>(status: u16, msg: S) -> Self {
        Self::Remote {
            status,
            message: msg.into(),
        }
    }

    /// Wrap a store failure as an upload error for `path`
    pub fn upload<P: Into<String>>(path: P, source: SensorError) -> Self {
        Self::Upload {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a store failure as a read error for `path`
    pub fn read<P: Into<String>>(path: P, source: SensorError) -> Self {
        Self::Read {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Map the error to its category
    pub fn category(&self) -> ErrorCategory {
        match self {
            SensorError::Configuration(_) => ErrorCategory::Configuration,
            SensorError::Validation(_) => ErrorCategory::Validation,
            SensorError::Upload { .. } => ErrorCategory::Upload,
            SensorError::Read { .. } => ErrorCategory::Read,
            SensorError::Authentication(_) => ErrorCategory::Authentication,
            SensorError::Remote { .. } | SensorError::Http(_) | SensorError::Io(_) => {
                ErrorCategory::Transport
            }
            SensorError::Json(_) => ErrorCategory::Data,
        }
    }

    /// Whether a caller could reasonably retry the same call.
    ///
    /// The client never retries on its own; this is only a hint.
    pub fn is_retryable(&self) -> bool {
        match self {
            SensorError::Upload { source, .. } | SensorError::Read { source, .. } => {
                source.is_retryable()
            }
            SensorError::Remote { status, .. } => *status == 429 || *status >= 500,
            SensorError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Whether the root cause is a rejected credential
    pub fn is_auth_error(&self) -> bool {
        match self {
            SensorError::Upload { source, .. } | SensorError::Read { source, .. } => {
                source.is_auth_error()
            }
            SensorError::Authentication(_) => true,
            SensorError::Remote { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }
}
