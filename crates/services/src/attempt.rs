use std::sync::Arc;

use exam_core::model::{TestId, TestResult};
use exam_core::{
    SubmissionReason, SubmissionTicket, TestSession, TickAction, ViolationKind, ViolationOutcome,
};
use storage::repository::{AttemptDraft, DraftRepository};

use crate::Clock;
use crate::api::TestApi;
use crate::error::{ApiError, AttemptError};

/// A freshly started attempt.
#[derive(Debug, Clone)]
pub struct LoadedAttempt {
    pub session: TestSession,
    /// Answers, flags and position were recovered from a local draft.
    pub restored: bool,
}

/// Outcome of one countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub remaining: u32,
    pub low_time: bool,
    /// The caller must start a submission with `SubmissionReason::AutoTime`.
    pub auto_submit: bool,
}

/// Outcome of one integrity violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationReport {
    pub outcome: ViolationOutcome,
    pub warning: Option<String>,
    /// The caller must start a submission with `SubmissionReason::AutoViolation`.
    pub auto_submit: bool,
}

/// Drives one attempt against the server: load, answer, tick, submit.
///
/// The session itself stays with the caller. Every method either borrows it
/// synchronously or works on a detached value (`SubmissionTicket`,
/// `AttemptDraft`), so a UI can run the network half on a task without
/// holding the session across an await.
#[derive(Clone)]
pub struct AttemptService {
    clock: Clock,
    api: Arc<dyn TestApi>,
    drafts: Arc<dyn DraftRepository>,
}

impl AttemptService {
    #[must_use]
    pub fn new(clock: Clock, api: Arc<dyn TestApi>, drafts: Arc<dyn DraftRepository>) -> Self {
        Self { clock, api, drafts }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch the test, start the attempt, and restore a matching draft.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::LoadFailed` if either server call fails; no
    /// session is created in that case.
    pub async fn load(&self, test_id: &TestId) -> Result<LoadedAttempt, AttemptError> {
        let test = self.api.fetch_test(test_id).await.map_err(|err| {
            tracing::warn!(%test_id, error = %err, "test fetch failed");
            AttemptError::LoadFailed(err)
        })?;
        let start = self.api.start_attempt(test_id).await.map_err(|err| {
            tracing::warn!(%test_id, error = %err, "attempt start failed");
            AttemptError::LoadFailed(err)
        })?;
        let started_at = start.started_at.unwrap_or_else(|| self.clock.now());

        let mut session = TestSession::new(test, started_at);
        let restored = self.restore_draft(&mut session).await;
        tracing::info!(
            %test_id,
            questions = session.test().question_count(),
            seconds = session.remaining_secs(),
            restored,
            "attempt loaded"
        );
        Ok(LoadedAttempt { session, restored })
    }

    async fn restore_draft(&self, session: &mut TestSession) -> bool {
        let test_id = session.test().id().clone();
        let draft = match self.drafts.load_draft(&test_id).await {
            Ok(Some(draft)) => draft,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(%test_id, error = %err, "draft lookup failed");
                return false;
            }
        };

        if draft.matches(&test_id, session.started_at())
            && session.restore_progress(draft.answers, draft.flagged, draft.current)
        {
            tracing::debug!(%test_id, "draft restored");
            return true;
        }

        tracing::debug!(%test_id, "discarding stale draft");
        self.discard_draft(&test_id).await;
        false
    }

    /// Submit in one call: guard, send, then settle the session.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Session` if a submission is already in flight or
    /// the attempt is terminal, and `AttemptError::SubmitFailed` if the server
    /// call fails (the session is back in progress, answers intact).
    pub async fn submit(
        &self,
        session: &mut TestSession,
        reason: SubmissionReason,
    ) -> Result<TestResult, AttemptError> {
        let ticket = session.begin_submit(reason)?;
        let outcome = self.send(&ticket).await;
        let result = self.finish(session, outcome)?;
        self.discard_draft(&ticket.test_id).await;
        Ok(result)
    }

    /// Network half of a submission.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` from the server call unchanged.
    pub async fn send(&self, ticket: &SubmissionTicket) -> Result<TestResult, ApiError> {
        tracing::info!(
            test_id = %ticket.test_id,
            reason = ?ticket.reason,
            violations = ticket.violation_count,
            "submitting attempt"
        );
        self.api.submit_attempt(ticket).await
    }

    /// Apply a submission outcome to the session.
    ///
    /// On success the result gets a locally measured time taken if the server
    /// omitted one.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::SubmitFailed` for a failed outcome, and
    /// `AttemptError::Session` if no submission was in flight.
    pub fn finish(
        &self,
        session: &mut TestSession,
        outcome: Result<TestResult, ApiError>,
    ) -> Result<TestResult, AttemptError> {
        match outcome {
            Ok(result) => {
                let elapsed = self.clock.elapsed_secs_since(session.started_at());
                let result = result.with_fallback_time_taken(elapsed);
                session.complete(result)?;
                tracing::info!(
                    test_id = %session.test().id(),
                    percentage = result.percentage(),
                    "attempt submitted"
                );
                Ok(result)
            }
            Err(err) => {
                session.submit_failed(err.user_message())?;
                tracing::warn!(
                    test_id = %session.test().id(),
                    error = %err,
                    remaining = session.remaining_secs(),
                    "submit failed"
                );
                Err(AttemptError::SubmitFailed(err))
            }
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&self, session: &mut TestSession) -> TickReport {
        let action = session.tick();
        let remaining = session.remaining_secs();
        if action == TickAction::AutoSubmit {
            tracing::info!(test_id = %session.test().id(), "time is up, auto-submitting");
        } else {
            tracing::trace!(remaining, "tick");
        }
        TickReport {
            remaining,
            low_time: session.countdown().is_low(),
            auto_submit: action == TickAction::AutoSubmit,
        }
    }

    /// Record a focus loss or fullscreen exit. `None` when the attempt is not
    /// in progress.
    pub fn record_violation(
        &self,
        session: &mut TestSession,
        kind: ViolationKind,
    ) -> Option<ViolationReport> {
        let outcome = session.record_violation(kind, self.clock.now())?;
        let warning = session.integrity().warning_for(outcome);
        let auto_submit = outcome == ViolationOutcome::LimitReached;
        tracing::info!(
            test_id = %session.test().id(),
            ?kind,
            count = session.integrity().count(),
            auto_submit,
            "integrity violation"
        );
        Some(ViolationReport {
            outcome,
            warning,
            auto_submit,
        })
    }

    /// Snapshot the session for local storage; `None` once terminal.
    #[must_use]
    pub fn draft_of(&self, session: &TestSession) -> Option<AttemptDraft> {
        if session.is_terminal() {
            return None;
        }
        Some(AttemptDraft {
            test_id: session.test().id().clone(),
            started_at: session.started_at(),
            answers: session.answers().as_slice().to_vec(),
            flagged: session.flagged().clone(),
            current: session.current(),
            saved_at: self.clock.now(),
        })
    }

    /// Best-effort draft write. Failures are logged and otherwise ignored.
    pub async fn store_draft(&self, draft: AttemptDraft) {
        if let Err(err) = self.drafts.save_draft(&draft).await {
            tracing::warn!(test_id = %draft.test_id, error = %err, "draft save failed");
        }
    }

    pub async fn save_draft(&self, session: &TestSession) {
        if let Some(draft) = self.draft_of(session) {
            self.store_draft(draft).await;
        }
    }

    /// Best-effort draft removal.
    pub async fn discard_draft(&self, test_id: &TestId) {
        if let Err(err) = self.drafts.delete_draft(test_id).await {
            tracing::warn!(%test_id, error = %err, "draft delete failed");
        }
    }
}
