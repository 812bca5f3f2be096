//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::SessionStateError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by a `TestApi` implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiError {
    /// The server answered with `success: false`.
    #[error("{message}")]
    Rejected { message: String },
    #[error("test not found or not assigned")]
    NotFound,
    #[error("request failed with status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The test exists but needs a flow this client does not provide.
    #[error("unsupported test: {0}")]
    Unsupported(String),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl ApiError {
    /// Message suitable for the error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message } | Self::Status { message, .. } if !message.is_empty() => {
                message.clone()
            }
            Self::NotFound => "This test is not available.".to_string(),
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Errors emitted by `AttemptService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    /// Fetching the test or starting the attempt failed; no session exists.
    #[error("failed to load test: {0}")]
    LoadFailed(#[source] ApiError),
    /// The session is back in progress with answers and timer untouched.
    #[error("failed to submit: {0}")]
    SubmitFailed(#[source] ApiError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AttemptError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::LoadFailed(err) | Self::SubmitFailed(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Errors emitted while assembling `AppServices`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
