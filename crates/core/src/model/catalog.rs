use chrono::{DateTime, Utc};

use crate::model::ids::{ResultId, TestId};

/// Who created (and grades) an assigned test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradedBy {
    #[default]
    Institution,
    Faculty,
}

impl GradedBy {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Institution => "Institution",
            Self::Faculty => "Faculty Graded",
        }
    }
}

/// What the student can do next with an assigned test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAction {
    Start,
    Continue,
    Completed,
    ViewResult,
}

impl ListingAction {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Continue => "Continue",
            Self::Completed => "Completed",
            Self::ViewResult => "View Result",
        }
    }

    /// Whether the action opens an attempt.
    #[must_use]
    pub fn opens_attempt(self) -> bool {
        matches!(self, Self::Start | Self::Continue)
    }
}

/// One row of the student's assigned-tests list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestListing {
    pub id: TestId,
    pub name: String,
    pub kind: String,
    pub question_count: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub due_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub max_attempts: Option<u32>,
    pub completed: bool,
    pub result_available: bool,
    pub score: Option<u32>,
    pub graded_by: GradedBy,
}

impl TestListing {
    #[must_use]
    pub fn action(&self) -> ListingAction {
        if self.completed {
            if self.result_available {
                ListingAction::ViewResult
            } else {
                ListingAction::Completed
            }
        } else if self.attempts > 0 {
            ListingAction::Continue
        } else {
            ListingAction::Start
        }
    }

    /// `"2 / 3"` when a cap exists, otherwise just the count.
    #[must_use]
    pub fn attempts_label(&self) -> String {
        match self.max_attempts {
            Some(max) => format!("{} / {max}", self.attempts),
            None => self.attempts.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Completed,
    InProgress,
}

/// One row of the student's results history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub id: ResultId,
    pub test_id: TestId,
    pub test_name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_taken_secs: Option<u64>,
    pub correct_count: u32,
    pub total: u32,
    pub score: u32,
    pub status: ResultStatus,
}
