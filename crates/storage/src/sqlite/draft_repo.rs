use async_trait::async_trait;
use exam_core::model::TestId;

use crate::repository::{AttemptDraft, DraftRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{answers_to_json, flagged_to_json, index_to_i64, map_draft_row};

#[async_trait]
impl DraftRepository for SqliteRepository {
    async fn save_draft(&self, draft: &AttemptDraft) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO attempt_drafts (
                test_id,
                started_at,
                answers,
                flagged,
                current_index,
                saved_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(test_id) DO UPDATE SET
                started_at = excluded.started_at,
                answers = excluded.answers,
                flagged = excluded.flagged,
                current_index = excluded.current_index,
                saved_at = excluded.saved_at
            ",
        )
        .bind(draft.test_id.as_str())
        .bind(draft.started_at)
        .bind(answers_to_json(&draft.answers)?)
        .bind(flagged_to_json(&draft.flagged)?)
        .bind(index_to_i64(draft.current)?)
        .bind(draft.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::debug!(test_id = %draft.test_id, "draft saved");
        Ok(())
    }

    async fn load_draft(&self, test_id: &TestId) -> Result<Option<AttemptDraft>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT test_id, started_at, answers, flagged, current_index, saved_at
            FROM attempt_drafts
            WHERE test_id = ?1
            ",
        )
        .bind(test_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_draft_row).transpose()
    }

    async fn delete_draft(&self, test_id: &TestId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM attempt_drafts WHERE test_id = ?1")
            .bind(test_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
