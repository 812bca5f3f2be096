use exam_core::model::{
    ListingAction, ResultRecord, ResultStatus, TestId, TestListing, format_time_taken,
};

use crate::vm::time_fmt::{format_datetime, format_optional_datetime};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCardVm {
    pub id: TestId,
    pub name: String,
    pub kind: String,
    pub graded_by: &'static str,
    pub questions: String,
    pub duration: String,
    pub due: String,
    pub attempts: String,
    pub score: Option<String>,
    pub action_label: &'static str,
    /// The action opens the attempt screen; otherwise it is informational.
    pub can_open: bool,
    pub shows_result: bool,
}

impl From<&TestListing> for TestCardVm {
    fn from(item: &TestListing) -> Self {
        let action = item.action();
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            kind: item.kind.clone(),
            graded_by: item.graded_by.label(),
            questions: item
                .question_count
                .map_or_else(|| "—".to_string(), |n| n.to_string()),
            duration: item
                .duration_minutes
                .map_or_else(|| "— min".to_string(), |m| format!("{m} min")),
            due: format_optional_datetime(item.due_at),
            attempts: item.attempts_label(),
            score: item.score.map(|s| format!("{s}%")),
            action_label: action.label(),
            can_open: action.opens_attempt(),
            shows_result: action == ListingAction::ViewResult,
        }
    }
}

#[must_use]
pub fn map_test_cards(items: &[TestListing]) -> Vec<TestCardVm> {
    items.iter().map(TestCardVm::from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRowVm {
    pub key: String,
    pub test_name: String,
    pub started_at: String,
    pub completed_at: String,
    pub time_taken: String,
    pub correct: String,
    pub score: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
}

impl From<&ResultRecord> for ResultRowVm {
    fn from(item: &ResultRecord) -> Self {
        let (status_label, status_class) = match item.status {
            ResultStatus::Completed => ("completed", "status status--done"),
            ResultStatus::InProgress => ("in progress", "status status--open"),
        };
        Self {
            key: item.id.to_string(),
            test_name: item
                .test_name
                .clone()
                .unwrap_or_else(|| item.test_id.to_string()),
            started_at: format_datetime(item.started_at),
            completed_at: format_optional_datetime(item.completed_at),
            time_taken: format_time_taken(item.time_taken_secs),
            correct: format!("{}/{}", item.correct_count, item.total),
            score: format!("{}%", item.score),
            status_label,
            status_class,
        }
    }
}

#[must_use]
pub fn map_result_rows(items: &[ResultRecord]) -> Vec<ResultRowVm> {
    items.iter().map(ResultRowVm::from).collect()
}
