//! Error types shared by every provider adapter.

use thiserror::Error;

/// Errors surfaced by provider adapters, normalizers and the uploader.
///
/// Nothing in this crate retries or recovers locally: every failure reaches
/// the caller with enough context (status code, raw vendor message) to pick
/// its own retry policy.
#[derive(Error, Debug)]
pub enum Error {
    /// The vendor answered with a non-200 status or a body that could not
    /// be decoded.
    #[error("Provider error ({status}): {message}")]
    Provider {
        /// HTTP status code returned by the vendor.
        status: u16,
        /// Raw body or decode failure description.
        message: String,
    },

    /// Invalid or missing configuration, rejected before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any other failure during an upload.
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// A moderation check flagged or failed, so the request was refused.
    #[error("Moderation error: {0}")]
    Moderation(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error occurred while reading a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status carried by a [`Error::Provider`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;
