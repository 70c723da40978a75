//! Error types for docscout

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a document could not be acquired
///
/// These never escape the command surface: once retries are exhausted the
/// last one is rendered into a failure report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL is blocked by prefix list
    #[error("Blocked URL: prefix not allowed")]
    BlockedUrl,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Declared or streamed body exceeds the response size ceiling
    #[error("Response too large: {size} bytes exceeds limit of {limit} bytes")]
    ResponseTooLarge { size: u64, limit: u64 },

    /// Body too short to be a real document
    #[error("Response body too short ({length} characters), the page is likely empty or a placeholder")]
    EmptyBody { length: usize },

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else {
            FetchError::RequestError(err.to_string())
        }
    }

    /// Whether another sub-attempt could change the outcome
    ///
    /// Validation failures are decided before any request is made.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            FetchError::MissingUrl | FetchError::InvalidUrlScheme | FetchError::BlockedUrl
        )
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Errors surfaced at the command boundary
///
/// Acquisition problems and malformed arguments are reported as text, so
/// only an unknown command name ends up here.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}
