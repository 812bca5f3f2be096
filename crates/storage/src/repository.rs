use async_trait::async_trait;
use chrono::{DateTime, Utc};
use exam_core::model::{Answer, TestId};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Local scratch copy of an in-progress attempt.
///
/// A draft only applies to the attempt it was taken from: the same test id
/// and the same server `started_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptDraft {
    pub test_id: TestId,
    pub started_at: DateTime<Utc>,
    pub answers: Vec<Answer>,
    pub flagged: BTreeSet<usize>,
    pub current: usize,
    pub saved_at: DateTime<Utc>,
}

impl AttemptDraft {
    /// Whether this draft belongs to the attempt that started at `started_at`.
    #[must_use]
    pub fn matches(&self, test_id: &TestId, started_at: DateTime<Utc>) -> bool {
        &self.test_id == test_id && self.started_at == started_at
    }
}

/// Repository contract for attempt drafts, keyed by test id.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Insert or replace the draft for `draft.test_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the draft cannot be stored.
    async fn save_draft(&self, draft: &AttemptDraft) -> Result<(), StorageError>;

    /// Fetch the draft for a test, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored row is corrupt.
    async fn load_draft(&self, test_id: &TestId) -> Result<Option<AttemptDraft>, StorageError>;

    /// Remove the draft for a test. Deleting a missing draft is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn delete_draft(&self, test_id: &TestId) -> Result<(), StorageError>;
}

/// Simple in-memory draft store for tests and offline prototyping.
#[derive(Clone, Default)]
pub struct InMemoryDraftRepository {
    drafts: Arc<Mutex<HashMap<TestId, AttemptDraft>>>,
}

impl InMemoryDraftRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftRepository for InMemoryDraftRepository {
    async fn save_draft(&self, draft: &AttemptDraft) -> Result<(), StorageError> {
        let mut guard = self
            .drafts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(draft.test_id.clone(), draft.clone());
        Ok(())
    }

    async fn load_draft(&self, test_id: &TestId) -> Result<Option<AttemptDraft>, StorageError> {
        let guard = self
            .drafts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(test_id).cloned())
    }

    async fn delete_draft(&self, test_id: &TestId) -> Result<(), StorageError> {
        let mut guard = self
            .drafts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(test_id);
        Ok(())
    }
}

/// Draft storage behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub drafts: Arc<dyn DraftRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            drafts: Arc::new(InMemoryDraftRepository::new()),
        }
    }
}
