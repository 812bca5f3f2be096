use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::countdown::{Countdown, TickOutcome};
use crate::integrity::{IntegrityLog, ViolationKind, ViolationOutcome};
use crate::model::{Answer, AnswerSheet, Question, Test, TestId, TestResult};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Invalid use of a session. These are caller bugs or stale UI events, and
/// leave the session untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("question {index} is out of range (test has {len})")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("option {option} is out of range for question {question} ({count} options)")]
    OptionOutOfRange {
        question: usize,
        option: usize,
        count: usize,
    },

    #[error("question {index} does not accept this kind of answer")]
    AnswerKindMismatch { index: usize },

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("no submission is in flight")]
    NotSubmitting,

    #[error("attempt already submitted")]
    Terminal,
}

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Submitting,
    Terminal,
}

/// Full attempt lifecycle including the states that exist before a session does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Loading,
    InProgress,
    Submitting,
    Terminal,
    Failed,
}

impl From<SessionPhase> for AttemptPhase {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::InProgress => Self::InProgress,
            SessionPhase::Submitting => Self::Submitting,
            SessionPhase::Terminal => Self::Terminal,
        }
    }
}

impl AttemptPhase {
    /// Whether the countdown should still be ticking.
    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, Self::InProgress | Self::Submitting)
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionReason {
    Manual,
    AutoTime,
    AutoViolation,
}

/// Frozen outbound body for one submit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionTicket {
    #[serde(skip)]
    pub test_id: TestId,
    pub responses: AnswerSheet,
    pub started_at: DateTime<Utc>,
    pub violation_count: u32,
    pub violation_log: Vec<String>,
    #[serde(rename = "submissionReason")]
    pub reason: SubmissionReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    None,
    /// The countdown just reached zero; the caller must submit.
    AutoSubmit,
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub flagged: usize,
    pub visited: usize,
}

/// Palette state for one question, in display priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Current,
    Answered,
    Flagged,
    Visited,
    NotVisited,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One student's attempt at a test, from a loaded test to a scored result.
///
/// Purely in-memory and synchronous. Network calls and the one-second timer
/// live outside; they feed results and ticks back in through
/// [`TestSession::complete`], [`TestSession::submit_failed`] and
/// [`TestSession::tick`].
#[derive(Debug, Clone)]
pub struct TestSession {
    test: Test,
    answers: AnswerSheet,
    visited: BTreeSet<usize>,
    flagged: BTreeSet<usize>,
    current: usize,
    countdown: Countdown,
    started_at: DateTime<Utc>,
    phase: SessionPhase,
    integrity: IntegrityLog,
    /// Set once the countdown has reached zero.
    auto_submit_due: bool,
    auto_submit_fired: bool,
    submit_count: u32,
    last_error: Option<String>,
    result: Option<TestResult>,
}

impl TestSession {
    #[must_use]
    pub fn new(test: Test, started_at: DateTime<Utc>) -> Self {
        let answers = AnswerSheet::for_questions(test.questions());
        let countdown = Countdown::from_minutes(test.duration_minutes());
        Self {
            test,
            answers,
            visited: BTreeSet::from([0]),
            flagged: BTreeSet::new(),
            current: 0,
            countdown,
            started_at,
            phase: SessionPhase::InProgress,
            integrity: IntegrityLog::new(),
            auto_submit_due: false,
            auto_submit_fired: false,
            submit_count: 0,
            last_error: None,
            result: None,
        }
    }

    /// Re-apply saved progress to a fresh session.
    ///
    /// Returns `false` and leaves the session unchanged if the saved answers
    /// no longer fit the test or the pointer is out of range.
    pub fn restore_progress(
        &mut self,
        answers: Vec<Answer>,
        flagged: BTreeSet<usize>,
        current: usize,
    ) -> bool {
        let len = self.test.question_count();
        if self.phase != SessionPhase::InProgress || current >= len {
            return false;
        }
        if flagged.iter().any(|i| *i >= len) {
            return false;
        }
        let Some(sheet) = AnswerSheet::restore(self.test.questions(), answers) else {
            return false;
        };

        self.visited.extend(
            sheet
                .as_slice()
                .iter()
                .enumerate()
                .filter(|(_, a)| a.is_answered())
                .map(|(i, _)| i),
        );
        self.visited.insert(current);
        self.answers = sheet;
        self.flagged = flagged;
        self.current = current;
        true
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn test(&self) -> &Test {
        &self.test
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index)
    }

    #[must_use]
    pub fn visited(&self) -> &BTreeSet<usize> {
        &self.visited
    }

    #[must_use]
    pub fn flagged(&self) -> &BTreeSet<usize> {
        &self.flagged
    }

    #[must_use]
    pub fn is_flagged(&self, index: usize) -> bool {
        self.flagged.contains(&index)
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `current` is always a valid index: it starts at 0 on a non-empty
        // test and every mutation is bounds-checked.
        &self.test.questions()[self.current]
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase == SessionPhase::Terminal
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.phase == SessionPhase::Submitting
    }

    #[must_use]
    pub fn integrity(&self) -> &IntegrityLog {
        &self.integrity
    }

    /// Message from the most recent failed submission, cleared on the next attempt.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of submit requests started so far.
    #[must_use]
    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    #[must_use]
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.test.question_count();
        let answered = self.answers.answered_count();
        SessionProgress {
            total,
            answered,
            unanswered: total - answered,
            flagged: self.flagged.len(),
            visited: self.visited.len(),
        }
    }

    #[must_use]
    pub fn question_status(&self, index: usize) -> QuestionStatus {
        if index == self.current {
            QuestionStatus::Current
        } else if self.answers.get(index).is_some_and(Answer::is_answered) {
            QuestionStatus::Answered
        } else if self.flagged.contains(&index) {
            QuestionStatus::Flagged
        } else if self.visited.contains(&index) {
            QuestionStatus::Visited
        } else {
            QuestionStatus::NotVisited
        }
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────
    //

    /// Record `option` as the only choice for a single-answer question.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` for out-of-range indices, a multi-answer
    /// question, or a session that is submitting or terminal.
    pub fn select_single(&mut self, question: usize, option: usize) -> Result<(), SessionStateError> {
        self.ensure_editable()?;
        self.check_option(question, option)?;
        match self.answers.get_mut(question) {
            Some(Answer::Single(choice)) => *choice = Some(option),
            _ => return Err(SessionStateError::AnswerKindMismatch { index: question }),
        }
        self.visited.insert(question);
        Ok(())
    }

    /// Add or remove `option` from a multi-answer question's selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` for out-of-range indices, a single-answer
    /// question, or a session that is submitting or terminal.
    pub fn toggle_multiple(&mut self, question: usize, option: usize) -> Result<(), SessionStateError> {
        self.ensure_editable()?;
        self.check_option(question, option)?;
        match self.answers.get_mut(question) {
            Some(Answer::Multi(choices)) => {
                if !choices.remove(&option) {
                    choices.insert(option);
                }
            }
            _ => return Err(SessionStateError::AnswerKindMismatch { index: question }),
        }
        self.visited.insert(question);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionStateError` for an out-of-range index or a session that
    /// is submitting or terminal.
    pub fn toggle_flag(&mut self, question: usize) -> Result<(), SessionStateError> {
        self.ensure_editable()?;
        self.check_question(question)?;
        if !self.flagged.remove(&question) {
            self.flagged.insert(question);
        }
        Ok(())
    }

    /// Reset every answer to unanswered. Flags and visits are kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` when the session is submitting or terminal.
    pub fn clear_all_answers(&mut self) -> Result<(), SessionStateError> {
        self.ensure_editable()?;
        self.answers.clear_all();
        Ok(())
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────
    //

    /// Move the pointer to `target`. Browsing stays possible while a
    /// submission is in flight.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` for an out-of-range index or a terminal session.
    pub fn navigate(&mut self, target: usize) -> Result<(), SessionStateError> {
        if self.is_terminal() {
            return Err(SessionStateError::Terminal);
        }
        self.check_question(target)?;
        self.current = target;
        self.visited.insert(target);
        Ok(())
    }

    /// Step back one question; returns whether the pointer moved.
    pub fn previous(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.navigate(self.current - 1).is_ok()
    }

    /// Step forward one question; returns whether the pointer moved.
    pub fn next(&mut self) -> bool {
        if self.current + 1 >= self.test.question_count() {
            return false;
        }
        self.navigate(self.current + 1).is_ok()
    }

    /// Move to the lowest-index unanswered question, if any.
    pub fn jump_to_next_unanswered(&mut self) -> Option<usize> {
        let target = self.answers.first_unanswered()?;
        self.navigate(target).ok()?;
        Some(target)
    }

    //
    // ─── TIMER ─────────────────────────────────────────────────────────────
    //

    /// Advance the countdown by one second.
    ///
    /// Returns [`TickAction::AutoSubmit`] at most once per session, on the
    /// first tick at zero with no submission outstanding. A submission in
    /// flight when time runs out defers it: if that request fails, the next
    /// tick requests the automatic submit.
    pub fn tick(&mut self) -> TickAction {
        if self.is_terminal() {
            return TickAction::None;
        }
        if self.countdown.tick() == TickOutcome::Expired {
            self.auto_submit_due = true;
        }
        if !self.auto_submit_due
            || self.auto_submit_fired
            || self.phase != SessionPhase::InProgress
        {
            return TickAction::None;
        }
        self.auto_submit_fired = true;
        TickAction::AutoSubmit
    }

    //
    // ─── INTEGRITY ─────────────────────────────────────────────────────────
    //

    /// Count a violation. Ignored (returns `None`) unless the attempt is in progress.
    pub fn record_violation(
        &mut self,
        kind: ViolationKind,
        at: DateTime<Utc>,
    ) -> Option<ViolationOutcome> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        Some(self.integrity.record(kind, at))
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────
    //

    /// Freeze the current answers into an outbound request and enter `Submitting`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::SubmissionInFlight` if a request is already
    /// outstanding, or `SessionStateError::Terminal` after a successful submit.
    pub fn begin_submit(
        &mut self,
        reason: SubmissionReason,
    ) -> Result<SubmissionTicket, SessionStateError> {
        match self.phase {
            SessionPhase::Terminal => return Err(SessionStateError::Terminal),
            SessionPhase::Submitting => return Err(SessionStateError::SubmissionInFlight),
            SessionPhase::InProgress => {}
        }
        self.phase = SessionPhase::Submitting;
        self.submit_count += 1;
        self.last_error = None;

        Ok(SubmissionTicket {
            test_id: self.test.id().clone(),
            responses: self.answers.clone(),
            started_at: self.started_at,
            violation_count: self.integrity.count(),
            violation_log: self.integrity.log_lines(),
            reason,
        })
    }

    /// Return to `InProgress` after a rejected or failed submit. Answers and
    /// the countdown are left exactly as they were.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NotSubmitting` when no request is outstanding.
    pub fn submit_failed(&mut self, message: impl Into<String>) -> Result<(), SessionStateError> {
        if self.phase != SessionPhase::Submitting {
            return Err(SessionStateError::NotSubmitting);
        }
        self.phase = SessionPhase::InProgress;
        self.last_error = Some(message.into());
        Ok(())
    }

    /// Store the scored result and enter the terminal phase.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NotSubmitting` when no request is outstanding.
    pub fn complete(&mut self, result: TestResult) -> Result<(), SessionStateError> {
        if self.phase != SessionPhase::Submitting {
            return Err(SessionStateError::NotSubmitting);
        }
        self.phase = SessionPhase::Terminal;
        self.result = Some(result);
        Ok(())
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────
    //

    fn ensure_editable(&self) -> Result<(), SessionStateError> {
        match self.phase {
            SessionPhase::InProgress => Ok(()),
            SessionPhase::Submitting => Err(SessionStateError::SubmissionInFlight),
            SessionPhase::Terminal => Err(SessionStateError::Terminal),
        }
    }

    fn check_question(&self, index: usize) -> Result<&Question, SessionStateError> {
        self.test
            .question(index)
            .ok_or(SessionStateError::QuestionOutOfRange {
                index,
                len: self.test.question_count(),
            })
    }

    fn check_option(&self, question: usize, option: usize) -> Result<(), SessionStateError> {
        let count = self.check_question(question)?.option_count();
        if option >= count {
            return Err(SessionStateError::OptionOutOfRange {
                question,
                option,
                count,
            });
        }
        Ok(())
    }
}
