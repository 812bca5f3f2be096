use exam_core::model::{ScoreBand, TestResult, format_time_taken, option_label};
use exam_core::{
    AttemptPhase, MAX_VIOLATIONS, QuestionStatus, SessionPhase, SubmissionReason,
    SubmissionTicket, TestSession, ViolationKind,
};
use services::{ApiError, AttemptService, LoadedAttempt, TickFlow};

use crate::vm::markdown_vm::question_html;

/// Student actions on the attempt screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptIntent {
    /// Pick or toggle an option on the current question.
    Choose(usize),
    Previous,
    Next,
    GoTo(usize),
    ToggleFlag,
    NextUnanswered,
    RequestClear,
    ConfirmClear,
    CancelClear,
    Submit,
    DismissWarning,
}

/// What the view must do after an intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentEffect {
    None,
    /// Answers changed; persist a draft.
    SaveDraft,
    /// Send this ticket to the server, then call [`AttemptVm::finish`].
    Send(SubmissionTicket),
}

/// Result of one timer tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickStep {
    pub flow: TickFlow,
    pub send: Option<SubmissionTicket>,
}

impl TickStep {
    /// Tick whatever the attempt view holds. Before the attempt has loaded
    /// the timer idles; once loading has failed it stops.
    pub fn for_view(
        vm: Option<&mut AttemptVm>,
        load_failed: bool,
        attempts: &AttemptService,
    ) -> Self {
        match vm {
            Some(vm) => vm.tick(attempts),
            None => Self {
                flow: if load_failed {
                    TickFlow::Stop
                } else {
                    TickFlow::Continue
                },
                send: None,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    pub label: String,
    pub text: String,
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub number: usize,
    pub total: usize,
    pub html: String,
    pub multiple: bool,
    pub input_type: &'static str,
    pub answered: bool,
    pub flagged: bool,
    pub explanation_note: Option<&'static str>,
    pub options: Vec<OptionVm>,
    pub can_previous: bool,
    pub can_next: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteItemVm {
    pub index: usize,
    pub number: usize,
    pub class: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerVm {
    pub label: String,
    pub class: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub percentage: u32,
    pub title: &'static str,
    pub tone: &'static str,
    pub correct: String,
    pub time_taken: String,
}

impl ResultVm {
    #[must_use]
    pub fn from_result(result: &TestResult) -> Self {
        let band = result.band();
        let tone = match band {
            ScoreBand::Excellent | ScoreBand::Great => "result--high",
            ScoreBand::GoodEffort => "result--mid",
            ScoreBand::NeedsImprovement | ScoreBand::KeepPracticing => "result--low",
        };
        let count = |value: Option<u32>| value.map_or_else(|| "—".to_string(), |v| v.to_string());
        Self {
            percentage: result.percentage(),
            title: band.title(),
            tone,
            correct: format!("{}/{}", count(result.correct_count()), count(result.total())),
            time_taken: format_time_taken(result.time_taken_secs()),
        }
    }
}

/// Presentation state for one attempt. Owns the session; the view owns this.
#[derive(Clone, Debug)]
pub struct AttemptVm {
    session: TestSession,
    restored: bool,
    confirm_clear: bool,
    warning: Option<String>,
}

impl AttemptVm {
    #[must_use]
    pub fn new(loaded: LoadedAttempt) -> Self {
        Self {
            session: loaded.session,
            restored: loaded.restored,
            confirm_clear: false,
            warning: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &TestSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> AttemptPhase {
        self.session.phase().into()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.session.test().name()
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        self.session.test().kind()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.session.test().question_count()
    }

    #[must_use]
    pub fn restored(&self) -> bool {
        self.restored
    }

    #[must_use]
    pub fn confirm_clear(&self) -> bool {
        self.confirm_clear
    }

    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.session.last_error()
    }

    #[must_use]
    pub fn violation_badge(&self) -> Option<String> {
        let count = self.session.integrity().count();
        (count > 0).then(|| format!("Violations: {count}/{MAX_VIOLATIONS}"))
    }

    #[must_use]
    pub fn question(&self) -> QuestionVm {
        let index = self.session.current();
        let question = self.session.current_question();
        let answer = self.session.answer(index);
        let total = self.question_count();

        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(i, text)| OptionVm {
                index: i,
                label: option_label(i),
                text: text.clone(),
                checked: answer.is_some_and(|a| a.contains(i)),
            })
            .collect();

        QuestionVm {
            number: index + 1,
            total,
            html: question_html(question.text()),
            multiple: question.is_multiple_answer(),
            input_type: if question.is_multiple_answer() {
                "checkbox"
            } else {
                "radio"
            },
            answered: answer.is_some_and(|a| a.is_answered()),
            flagged: self.session.is_flagged(index),
            explanation_note: question
                .explanation_available()
                .then_some("Explanation available after submission"),
            options,
            can_previous: index > 0,
            can_next: index + 1 < total,
        }
    }

    #[must_use]
    pub fn palette(&self) -> Vec<PaletteItemVm> {
        (0..self.question_count())
            .map(|index| PaletteItemVm {
                index,
                number: index + 1,
                class: match self.session.question_status(index) {
                    QuestionStatus::Current => "palette-item palette-item--current",
                    QuestionStatus::Answered => "palette-item palette-item--answered",
                    QuestionStatus::Flagged => "palette-item palette-item--flagged",
                    QuestionStatus::Visited => "palette-item palette-item--visited",
                    QuestionStatus::NotVisited => "palette-item",
                },
            })
            .collect()
    }

    #[must_use]
    pub fn progress_label(&self) -> String {
        let progress = self.session.progress();
        format!("Answered: {}/{}", progress.answered, progress.total)
    }

    #[must_use]
    pub fn flagged_label(&self) -> String {
        format!("Flagged: {}", self.session.progress().flagged)
    }

    #[must_use]
    pub fn timer(&self) -> TimerVm {
        let countdown = self.session.countdown();
        TimerVm {
            label: countdown.label(),
            class: if countdown.is_low() {
                "timer timer--low"
            } else {
                "timer"
            },
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.session.phase() == SessionPhase::InProgress
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.session.is_submitting() {
            "Submitting..."
        } else if self.error().is_some() {
            "Retry Submit"
        } else {
            "Submit Test"
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<ResultVm> {
        self.session.result().map(ResultVm::from_result)
    }

    /// Apply a student action. Rejected actions (stale clicks while
    /// submitting, out-of-range palette entries) are ignored.
    pub fn apply(&mut self, intent: AttemptIntent) -> IntentEffect {
        let current = self.session.current();
        let changed = match intent {
            AttemptIntent::Choose(option) => {
                let outcome = if self.session.current_question().is_multiple_answer() {
                    self.session.toggle_multiple(current, option)
                } else {
                    self.session.select_single(current, option)
                };
                outcome.is_ok()
            }
            AttemptIntent::Previous => self.session.previous(),
            AttemptIntent::Next => self.session.next(),
            AttemptIntent::GoTo(index) => self.session.navigate(index).is_ok(),
            AttemptIntent::ToggleFlag => self.session.toggle_flag(current).is_ok(),
            AttemptIntent::NextUnanswered => self.session.jump_to_next_unanswered().is_some(),
            AttemptIntent::RequestClear => {
                self.confirm_clear = self.can_submit();
                false
            }
            AttemptIntent::CancelClear => {
                self.confirm_clear = false;
                false
            }
            AttemptIntent::ConfirmClear => {
                self.confirm_clear = false;
                self.session.clear_all_answers().is_ok()
            }
            AttemptIntent::DismissWarning => {
                self.warning = None;
                false
            }
            AttemptIntent::Submit => {
                return self.begin(SubmissionReason::Manual);
            }
        };
        if changed {
            IntentEffect::SaveDraft
        } else {
            IntentEffect::None
        }
    }

    fn begin(&mut self, reason: SubmissionReason) -> IntentEffect {
        match self.session.begin_submit(reason) {
            Ok(ticket) => {
                self.confirm_clear = false;
                IntentEffect::Send(ticket)
            }
            Err(_) => IntentEffect::None,
        }
    }

    fn begin_ticket(&mut self, reason: SubmissionReason) -> Option<SubmissionTicket> {
        match self.begin(reason) {
            IntentEffect::Send(ticket) => Some(ticket),
            _ => None,
        }
    }

    /// Advance the timer by one second.
    pub fn tick(&mut self, attempts: &AttemptService) -> TickStep {
        if self.session.is_terminal() {
            return TickStep {
                flow: TickFlow::Stop,
                send: None,
            };
        }
        let report = attempts.tick(&mut self.session);
        let send = if report.auto_submit {
            self.begin_ticket(SubmissionReason::AutoTime)
        } else {
            None
        };
        TickStep {
            flow: TickFlow::Continue,
            send,
        }
    }

    /// Record a focus loss or fullscreen exit reported by the window.
    pub fn violation(
        &mut self,
        attempts: &AttemptService,
        kind: ViolationKind,
    ) -> Option<SubmissionTicket> {
        let report = attempts.record_violation(&mut self.session, kind)?;
        self.warning = report.warning;
        if report.auto_submit {
            self.begin_ticket(SubmissionReason::AutoViolation)
        } else {
            None
        }
    }

    /// Settle a submission sent earlier. Returns whether the attempt is now terminal.
    pub fn finish(
        &mut self,
        attempts: &AttemptService,
        outcome: Result<TestResult, ApiError>,
    ) -> bool {
        if let Err(err) = attempts.finish(&mut self.session, outcome) {
            tracing::debug!(error = %err, "submission not settled");
        }
        if self.session.is_terminal() {
            self.warning = None;
        }
        self.session.is_terminal()
    }
}
