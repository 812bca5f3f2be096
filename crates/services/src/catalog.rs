use std::sync::Arc;

use exam_core::model::{ResultRecord, TestListing};

use crate::api::TestApi;
use crate::error::ApiError;

/// Read-only views of the student's assigned tests and past results.
#[derive(Clone)]
pub struct CatalogService {
    api: Arc<dyn TestApi>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: Arc<dyn TestApi>) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the server call fails.
    pub async fn list_tests(&self) -> Result<Vec<TestListing>, ApiError> {
        let tests = self.api.list_tests().await?;
        tracing::debug!(count = tests.len(), "tests listed");
        Ok(tests)
    }

    /// Results, newest attempt first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server call fails.
    pub async fn list_results(&self) -> Result<Vec<ResultRecord>, ApiError> {
        let mut results = self.api.list_results().await?;
        results.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        tracing::debug!(count = results.len(), "results listed");
        Ok(results)
    }
}
