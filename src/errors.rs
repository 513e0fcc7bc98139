//! Error types for the dashboard

use std::fmt;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug)]
pub enum DashboardError {
    /// Configuration error
    Config(String),

    /// Submitted form values were rejected before reaching a backend
    Validation(String),

    /// Requested resource does not exist
    NotFound(String),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DashboardError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            DashboardError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DashboardError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {}

/// Uniform failure of a single backend call.
///
/// Every transport problem the HTTP client wrapper can run into is folded into
/// one of these four kinds, so callers never see a raw `reqwest::Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// No response within the configured timeout
    Timeout { url: String },

    /// The backend could not be reached at all
    ConnectionRefused { url: String, message: String },

    /// The backend answered with a non-2xx status
    BadStatus { url: String, status: u16, body: String },

    /// The backend answered 2xx but the body was not usable JSON
    MalformedBody { url: String, message: String },
}

impl ClientError {
    /// Short machine-readable kind, used by the UI banner.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Timeout { .. } => "timeout",
            ClientError::ConnectionRefused { .. } => "connection-refused",
            ClientError::BadStatus { .. } => "bad-status",
            ClientError::MalformedBody { .. } => "malformed-body",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ClientError::Timeout { url }
            | ClientError::ConnectionRefused { url, .. }
            | ClientError::BadStatus { url, .. }
            | ClientError::MalformedBody { url, .. } => url,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Timeout { url } => write!(f, "request to {} timed out", url),
            ClientError::ConnectionRefused { url, message } => {
                write!(f, "could not connect to {}: {}", url, message)
            }
            ClientError::BadStatus { url, status, body } => {
                if body.is_empty() {
                    write!(f, "{} returned status {}", url, status)
                } else {
                    write!(f, "{} returned status {}: {}", url, status, body)
                }
            }
            ClientError::MalformedBody { url, message } => {
                write!(f, "malformed response from {}: {}", url, message)
            }
        }
    }
}

impl std::error::Error for ClientError {}

/// Failure of a datastore query.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The datastore could not be reached or refused the connection
    Connection(String),

    /// The query itself failed
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "connection error: {}", msg),
            StoreError::Query(msg) => write!(f, "query failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
