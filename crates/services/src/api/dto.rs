//! Wire shapes for the exam REST API.
//!
//! Everything the server sends is decoded into these lenient structs first and
//! then validated into domain records, so malformed payloads surface as
//! `ApiError::InvalidResponse` instead of reaching session state.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use exam_core::model::{
    GradedBy, Question, ResultId, ResultRecord, ResultStatus, Test, TestId, TestListing,
    TestResult,
};

use crate::error::ApiError;

fn invalid(err: impl std::fmt::Display) -> ApiError {
    ApiError::InvalidResponse(err.to_string())
}

//
// ─── ENVELOPE ──────────────────────────────────────────────────────────────────
//

/// `{ success | ok, data, message | error }`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default, alias = "ok")]
    success: Option<bool>,
    data: Option<T>,
    #[serde(default, alias = "error")]
    message: Option<String>,
}

impl<T> Envelope<T> {
    pub(crate) fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    pub(crate) fn into_data(self) -> Result<T, ApiError> {
        if self.success != Some(true) {
            return Err(ApiError::Rejected {
                message: self.message().unwrap_or("request failed").to_string(),
            });
        }
        self.data
            .ok_or_else(|| ApiError::InvalidResponse("response has no data".into()))
    }
}

/// Body of an error response whose payload type is unknown.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

//
// ─── TEST ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OptionDto {
    Text(String),
    Object { text: Option<String> },
}

impl OptionDto {
    fn into_text(self, question: usize, option: usize) -> Result<String, ApiError> {
        match self {
            Self::Text(text) | Self::Object { text: Some(text) } => Ok(text),
            Self::Object { text: None } => Err(ApiError::InvalidResponse(format!(
                "question {question} option {option} has no text"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionDto {
    #[serde(alias = "question")]
    text: String,
    #[serde(default)]
    options: Vec<OptionDto>,
    #[serde(default)]
    is_multiple_answer: bool,
    #[serde(default)]
    is_coding: bool,
    #[serde(default)]
    explanation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TestDto {
    #[serde(default, alias = "_id")]
    id: Option<String>,
    #[serde(alias = "title")]
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    duration_minutes: Option<i64>,
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

impl TestDto {
    /// `requested` is the id from the request path; the body's own id wins
    /// when present.
    ///
    /// # Errors
    ///
    /// `Unsupported` for coding tests, `InvalidResponse` for anything that does
    /// not form a valid test.
    pub(crate) fn into_test(self, requested: &TestId) -> Result<Test, ApiError> {
        if self.questions.iter().any(|q| q.is_coding) {
            return Err(ApiError::Unsupported(
                "coding tests must be taken in the coding workspace".into(),
            ));
        }
        let id = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => TestId::new(id).map_err(invalid)?,
            None => requested.clone(),
        };
        let duration = self
            .duration_minutes
            .and_then(|m| u32::try_from(m).ok())
            .unwrap_or(0);

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(qi, q)| {
                let options = q
                    .options
                    .into_iter()
                    .enumerate()
                    .map(|(oi, o)| o.into_text(qi, oi))
                    .collect::<Result<Vec<_>, _>>()?;
                let has_explanation = q.explanation.as_ref().is_some_and(|e| !e.is_null());
                Ok(Question::new(q.text, options, q.is_multiple_answer)
                    .with_explanation_available(has_explanation))
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Test::new(id, self.name, self.kind.unwrap_or_default(), duration, questions)
            .map_err(invalid)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartDto {
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultDto {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    correct_count: Option<u32>,
    #[serde(default)]
    total: Option<u32>,
    #[serde(default, alias = "timeTaken")]
    time_taken_seconds: Option<f64>,
}

fn whole_secs(raw: Option<f64>) -> Option<u64> {
    raw.filter(|s| s.is_finite() && *s > 0.0).map(|s| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let secs = s.floor() as u64;
        secs
    })
}

fn percent(raw: Option<f64>) -> Option<u32> {
    raw.filter(|s| s.is_finite()).map(|s| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = s.round().clamp(0.0, 100.0) as u32;
        pct
    })
}

/// A whole `score` no larger than `total` is a correct count.
fn score_as_count(score: Option<f64>, total: Option<u32>) -> Option<u32> {
    let (score, total) = (score?, total?);
    if score.fract() != 0.0 || score < 0.0 || score > f64::from(total) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = score as u32;
    Some(count)
}

impl ResultDto {
    /// `{score, total}` carries the correct count in `score`; with
    /// `correctCount` present, `score` is the server's percentage.
    pub(crate) fn into_result(self) -> Result<TestResult, ApiError> {
        let (score_percent, correct_count) = match self.correct_count {
            Some(correct) => (percent(self.score), Some(correct)),
            None => match score_as_count(self.score, self.total) {
                Some(correct) => (None, Some(correct)),
                None => (percent(self.score), None),
            },
        };
        TestResult::new(
            score_percent,
            correct_count,
            self.total,
            whole_secs(self.time_taken_seconds),
        )
        .map_err(invalid)
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TestListingDto {
    #[serde(alias = "_id")]
    id: String,
    #[serde(alias = "title")]
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    questions: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    question_count: Option<u32>,
    #[serde(default, alias = "duration")]
    duration_minutes: Option<u32>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "attemptedCount")]
    attempts: Option<u32>,
    #[serde(default, alias = "allowedAttempts")]
    max_attempts: Option<u32>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    result_available: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    creator_role: Option<String>,
}

impl TestListingDto {
    pub(crate) fn into_listing(self) -> Result<TestListing, ApiError> {
        let question_count = self
            .questions
            .as_ref()
            .and_then(|qs| u32::try_from(qs.len()).ok())
            .filter(|n| *n > 0)
            .or(self.question_count);
        let graded_by = match self.creator_role.as_deref() {
            Some("faculty") => GradedBy::Faculty,
            _ => GradedBy::Institution,
        };

        Ok(TestListing {
            id: TestId::new(self.id).map_err(invalid)?,
            name: self.name,
            kind: self.kind.unwrap_or_default(),
            question_count,
            duration_minutes: self.duration_minutes,
            due_at: self.due_date,
            attempts: self.attempts.unwrap_or(0),
            max_attempts: self.max_attempts.filter(|m| *m > 0),
            completed: self.completed,
            result_available: self.result_available,
            score: percent(self.score),
            graded_by,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultRecordDto {
    #[serde(alias = "_id")]
    id: String,
    test_id: String,
    #[serde(default)]
    test_name: Option<String>,
    started_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    time_taken_seconds: Option<f64>,
    #[serde(default)]
    correct_count: u32,
    #[serde(default)]
    total: u32,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    status: Option<String>,
}

impl ResultRecordDto {
    pub(crate) fn into_record(self) -> Result<ResultRecord, ApiError> {
        let status = match self.status.as_deref() {
            Some("in-progress") => ResultStatus::InProgress,
            _ => ResultStatus::Completed,
        };
        Ok(ResultRecord {
            id: ResultId::new(self.id).map_err(invalid)?,
            test_id: TestId::new(self.test_id).map_err(invalid)?,
            test_name: self.test_name.filter(|n| !n.trim().is_empty()),
            started_at: self.started_at,
            completed_at: self.completed_at,
            time_taken_secs: whole_secs(self.time_taken_seconds),
            correct_count: self.correct_count,
            total: self.total,
            score: percent(self.score).unwrap_or(0),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_test(value: serde_json::Value) -> Result<Test, ApiError> {
        let envelope: Envelope<TestDto> = serde_json::from_value(value).unwrap();
        envelope.into_data()?.into_test(&TestId::new("requested").unwrap())
    }

    #[test]
    fn test_payload_accepts_string_and_object_options() {
        let test = decode_test(json!({
            "success": true,
            "data": {
                "_id": "65f1",
                "name": "Quant Basics",
                "type": "aptitude",
                "questions": [
                    { "text": "2+2?", "options": ["3", "4"], "explanation": "count" },
                    { "text": "Primes?", "options": [{ "text": "2" }, { "text": "4" }, { "text": "5" }],
                      "isMultipleAnswer": true }
                ]
            }
        }))
        .unwrap();

        assert_eq!(test.id().as_str(), "65f1");
        assert_eq!(test.duration_minutes(), 30);
        assert!(test.questions()[0].explanation_available());
        assert!(!test.questions()[0].is_multiple_answer());
        assert_eq!(test.questions()[1].options(), ["2", "4", "5"]);
        assert!(test.questions()[1].is_multiple_answer());
    }

    #[test]
    fn test_payload_without_id_takes_requested_id() {
        let test = decode_test(json!({
            "success": true,
            "data": {
                "name": "Sample",
                "type": "mcq",
                "durationMinutes": 1,
                "questions": [
                    { "text": "Pick one", "options": ["a", "b"], "isMultipleAnswer": false }
                ]
            }
        }))
        .unwrap();

        assert_eq!(test.id().as_str(), "requested");
        assert_eq!(test.name(), "Sample");
        assert_eq!(test.duration_minutes(), 1);
    }

    #[test]
    fn envelope_without_data_decodes() {
        let envelope: Envelope<TestDto> =
            serde_json::from_value(json!({ "success": true })).unwrap();
        assert!(matches!(
            envelope.into_data(),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn coding_tests_are_unsupported() {
        let err = decode_test(json!({
            "success": true,
            "data": { "_id": "c1", "name": "Code", "questions": [
                { "text": "Write fizzbuzz", "isCoding": true }
            ]}
        }))
        .unwrap_err();
        assert!(matches!(err, ApiError::Unsupported(_)));
    }

    #[test]
    fn empty_question_list_is_invalid() {
        let err = decode_test(json!({
            "success": true,
            "data": { "_id": "e1", "name": "Empty", "durationMinutes": 10, "questions": [] }
        }))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn unsuccessful_envelope_is_rejected_with_message() {
        let envelope: Envelope<TestDto> =
            serde_json::from_value(json!({ "success": false, "message": "Test closed" })).unwrap();
        assert_eq!(
            envelope.into_data().unwrap_err(),
            ApiError::Rejected {
                message: "Test closed".into()
            }
        );

        let envelope: Envelope<StartDto> =
            serde_json::from_value(json!({ "ok": false, "error": "nope" })).unwrap();
        assert_eq!(envelope.message(), Some("nope"));
    }

    #[test]
    fn result_payload_normalizes_numbers() {
        let dto: ResultDto = serde_json::from_value(json!({
            "score": 66.7, "correctCount": 2, "total": 3, "timeTaken": 95.9
        }))
        .unwrap();
        let result = dto.into_result().unwrap();
        assert_eq!(result.score_percent(), Some(67));
        assert_eq!(result.time_taken_secs(), Some(95));
        assert_eq!(result.percentage(), 67);

        let dto: ResultDto =
            serde_json::from_value(json!({ "correctCount": 4, "total": 3 })).unwrap();
        assert!(dto.into_result().is_err());
    }

    #[test]
    fn score_without_correct_count_is_a_count() {
        let dto: ResultDto = serde_json::from_value(json!({
            "score": 2, "total": 3, "timeTakenSeconds": 95
        }))
        .unwrap();
        let result = dto.into_result().unwrap();
        assert_eq!(result.correct_count(), Some(2));
        assert_eq!(result.percentage(), 67);

        let dto: ResultDto = serde_json::from_value(json!({ "score": 80, "total": 3 })).unwrap();
        assert_eq!(dto.into_result().unwrap().percentage(), 80);

        let dto: ResultDto = serde_json::from_value(json!({ "score": 55 })).unwrap();
        assert_eq!(dto.into_result().unwrap().percentage(), 55);
    }

    #[test]
    fn listing_payload_prefers_question_array_length() {
        let dto: TestListingDto = serde_json::from_value(json!({
            "_id": "l1",
            "name": "Verbal",
            "questions": [{}, {}, {}],
            "questionCount": 10,
            "duration": 25,
            "attemptedCount": 1,
            "allowedAttempts": 0,
            "creatorRole": "faculty"
        }))
        .unwrap();
        let listing = dto.into_listing().unwrap();
        assert_eq!(listing.question_count, Some(3));
        assert_eq!(listing.duration_minutes, Some(25));
        assert_eq!(listing.attempts, 1);
        assert_eq!(listing.max_attempts, None);
        assert_eq!(listing.graded_by, GradedBy::Faculty);
    }

    #[test]
    fn result_record_status_and_defaults() {
        let dto: ResultRecordDto = serde_json::from_value(json!({
            "_id": "r1",
            "testId": "t1",
            "testName": "",
            "startedAt": "2024-03-01T10:00:00Z",
            "status": "in-progress",
            "score": 40
        }))
        .unwrap();
        let record = dto.into_record().unwrap();
        assert_eq!(record.status, ResultStatus::InProgress);
        assert_eq!(record.test_name, None);
        assert_eq!(record.score, 40);
        assert_eq!(record.time_taken_secs, None);
    }
}
