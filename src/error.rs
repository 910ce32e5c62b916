//! Client error types.

use thiserror::Error;
use tonic::{Code, Status};

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The server or the RPC layer rejected the request.
    #[error("request failed: {0}")]
    Request(#[from] Status),

    /// Connecting to the server failed.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The requested column or super column does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A value could not be decoded.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Maps a read-path status, turning `NOT_FOUND` into [`Error::NotFound`].
    pub(crate) fn from_read(status: Status) -> Self {
        if status.code() == Code::NotFound {
            Self::not_found(status.message())
        } else {
            Self::Request(status)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The status the server answered with, if this is a request error.
    pub fn status(&self) -> Option<&Status> {
        match self {
            Self::Request(status) => Some(status),
            _ => None,
        }
    }
}
