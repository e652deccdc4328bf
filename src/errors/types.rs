//! Error type definitions for the ChannelX core
//!
//! A single error kind crosses component boundaries: a fetch failure
//! carrying a human-readable message. Transport errors, non-success HTTP
//! statuses and decode errors all collapse into it; nothing downstream
//! needs to tell them apart, and no error is ever thrown across a
//! component boundary as a panic.

use thiserror::Error;

/// Result alias for operations that can fail with a [`FetchError`].
pub type FetchResult<T> = Result<T, FetchError>;

/// Failure reported by the remote channel source.
///
/// Cloneable so the repository can cache the failure and replay it to
/// observers that subscribe later.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    /// Create a fetch error with a custom message
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Create an error for a non-success HTTP response
    pub fn http_status(status: reqwest::StatusCode) -> Self {
        Self::new(format!("HTTP error: {}", status))
    }

    /// The human-readable message carried by this error
    pub fn message(&self) -> &str {
        &self.message
    }
}
