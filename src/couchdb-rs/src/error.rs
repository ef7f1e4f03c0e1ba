//! Error types for the CouchDB client.

use thiserror::Error;

/// Description used for the no-response sentinel.
pub const INTERNAL_ERROR: &str = "Internal Error";

/// A classified failure of a single CouchDB call.
///
/// `id` and `rev` are set when the call concerned a specific document and are
/// `None` for server-level calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouchError {
    /// No response was obtained (or the server answered with nothing usable).
    /// Carries no status code.
    #[error("{reason}")]
    Internal {
        reason: String,
        id: Option<String>,
        rev: Option<String>,
    },

    /// The server answered with a status outside the operation's success set.
    #[error("HTTP {status}: {reason}")]
    Status {
        status: u16,
        /// Error kind reported by the server (`conflict`, `not_found`, ...)
        error: Option<String>,
        reason: String,
        id: Option<String>,
        rev: Option<String>,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("Failed to decode response: {message}")]
    Decode {
        status: Option<u16>,
        message: String,
        id: Option<String>,
        rev: Option<String>,
    },

    /// The request body or a header could not be encoded; nothing was sent.
    #[error("Failed to encode request: {message}")]
    Encode {
        message: String,
        id: Option<String>,
        rev: Option<String>,
    },
}

impl CouchError {
    /// The HTTP status code, or `None` for the internal sentinel and encode failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CouchError::Status { status, .. } => Some(*status),
            CouchError::Decode { status, .. } => *status,
            CouchError::Internal { .. } | CouchError::Encode { .. } => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            CouchError::Internal { id, .. }
            | CouchError::Status { id, .. }
            | CouchError::Decode { id, .. }
            | CouchError::Encode { id, .. } => id.as_deref(),
        }
    }

    pub fn rev(&self) -> Option<&str> {
        match self {
            CouchError::Internal { rev, .. }
            | CouchError::Status { rev, .. }
            | CouchError::Decode { rev, .. }
            | CouchError::Encode { rev, .. } => rev.as_deref(),
        }
    }

    /// Human-readable description.
    pub fn reason(&self) -> &str {
        match self {
            CouchError::Internal { reason, .. } | CouchError::Status { reason, .. } => reason,
            CouchError::Decode { message, .. } | CouchError::Encode { message, .. } => message,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CouchError::Internal { .. })
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Failure of the transport to produce any response.
#[derive(Debug, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A header value that is not valid header text (control characters, non-ASCII).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for header {name}")]
pub struct InvalidHeader {
    name: String,
}

impl InvalidHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Lowercase header name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, CouchError>;
