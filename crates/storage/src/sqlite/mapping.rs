use std::collections::BTreeSet;

use exam_core::model::{Answer, TestId};
use sqlx::Row;

use crate::repository::{AttemptDraft, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn index_to_i64(v: usize) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization("current_index overflow".into()))
}

fn index_from_i64(v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization("current_index sign overflow".into()))
}

pub(crate) fn answers_to_json(answers: &[Answer]) -> Result<String, StorageError> {
    serde_json::to_string(answers).map_err(ser)
}

pub(crate) fn flagged_to_json(flagged: &BTreeSet<usize>) -> Result<String, StorageError> {
    serde_json::to_string(flagged).map_err(ser)
}

pub(crate) fn map_draft_row(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptDraft, StorageError> {
    let test_id = TestId::new(row.try_get::<String, _>("test_id").map_err(ser)?).map_err(ser)?;
    let answers: Vec<Answer> =
        serde_json::from_str(&row.try_get::<String, _>("answers").map_err(ser)?).map_err(ser)?;
    let flagged: BTreeSet<usize> =
        serde_json::from_str(&row.try_get::<String, _>("flagged").map_err(ser)?).map_err(ser)?;

    Ok(AttemptDraft {
        test_id,
        started_at: row.try_get("started_at").map_err(ser)?,
        answers,
        flagged,
        current: index_from_i64(row.try_get("current_index").map_err(ser)?)?,
        saved_at: row.try_get("saved_at").map_err(ser)?,
    })
}
