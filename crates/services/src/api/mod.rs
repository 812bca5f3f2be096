//! REST boundary to the exam server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use exam_core::SubmissionTicket;
use exam_core::model::{ResultRecord, Test, TestId, TestListing, TestResult};

use crate::error::ApiError;

mod config;
mod dto;
mod http;

pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_PREFIX, DEFAULT_TIMEOUT_SECS};
pub use http::HttpTestApi;

/// Server acknowledgement of a started attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptStart {
    /// Missing when the server does not report one; callers fall back to their clock.
    pub started_at: Option<DateTime<Utc>>,
}

/// Calls the student-facing exam endpoints.
#[async_trait]
pub trait TestApi: Send + Sync {
    /// Fetch a validated test definition.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown or unassigned tests, and other
    /// `ApiError` variants for transport or payload failures.
    async fn fetch_test(&self, id: &TestId) -> Result<Test, ApiError>;

    /// Tell the server the attempt has begun.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    async fn start_attempt(&self, id: &TestId) -> Result<AttemptStart, ApiError>;

    /// Send frozen answers and receive the score.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for server-side validation failures and
    /// other `ApiError` variants for transport or payload failures.
    async fn submit_attempt(&self, ticket: &SubmissionTicket) -> Result<TestResult, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    async fn list_tests(&self) -> Result<Vec<TestListing>, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the call fails.
    async fn list_results(&self) -> Result<Vec<ResultRecord>, ApiError>;
}
