mod answer;
mod catalog;
mod ids;
mod result;

pub use ids::{IdError, ResultId, TestId};

pub use answer::{Answer, AnswerSheet};
pub use catalog::{GradedBy, ListingAction, ResultRecord, ResultStatus, TestListing};
pub use result::{ScoreBand, TestResult, TestResultError, format_time_taken};
pub use test::{DEFAULT_DURATION_MINUTES, Question, Test, TestError, option_label};
