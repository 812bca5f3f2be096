pub mod countdown;
pub mod error;
pub mod integrity;
pub mod model;
pub mod session;
pub mod time;

pub use countdown::{Countdown, LOW_TIME_SECS, TickOutcome, format_clock};
pub use error::Error;
pub use integrity::{IntegrityLog, MAX_VIOLATIONS, Violation, ViolationKind, ViolationOutcome};
pub use session::{
    AttemptPhase, QuestionStatus, SessionPhase, SessionProgress, SessionStateError,
    SubmissionReason, SubmissionTicket, TestSession, TickAction,
};
pub use time::Clock;
