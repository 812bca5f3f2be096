//! Soft anti-misuse bookkeeping for an attempt.
//!
//! The client cannot stop a student from leaving the test window, it can only
//! count it. Each departure is a violation; at [`MAX_VIOLATIONS`] the attempt is
//! submitted automatically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_VIOLATIONS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    /// Window lost focus or the page was hidden.
    FocusLost,
    FullscreenExit,
}

impl ViolationKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FocusLost => "Tab switch detected!",
            Self::FullscreenExit => "Fullscreen exited!",
        }
    }

    #[must_use]
    pub fn hint(self) -> &'static str {
        match self {
            Self::FocusLost => "Do not switch tabs or windows.",
            Self::FullscreenExit => "Stay in fullscreen mode.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub at: DateTime<Utc>,
}

impl Violation {
    /// `[HH:MM:SS] label`
    #[must_use]
    pub fn log_line(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.kind.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationOutcome {
    Warned { count: u32 },
    /// The limit was hit by this violation; an automatic submission is due.
    LimitReached,
    /// Recorded after the limit was already reached.
    OverLimit { count: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityLog {
    entries: Vec<Violation>,
}

impl IntegrityLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: ViolationKind, at: DateTime<Utc>) -> ViolationOutcome {
        self.entries.push(Violation { kind, at });
        let count = self.count();
        match count.cmp(&MAX_VIOLATIONS) {
            std::cmp::Ordering::Less => ViolationOutcome::Warned { count },
            std::cmp::Ordering::Equal => ViolationOutcome::LimitReached,
            std::cmp::Ordering::Greater => ViolationOutcome::OverLimit { count },
        }
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        u32::try_from(self.entries.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn entries(&self) -> &[Violation] {
        &self.entries
    }

    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.entries.iter().map(Violation::log_line).collect()
    }

    /// Banner text shown after a violation.
    #[must_use]
    pub fn warning_for(&self, outcome: ViolationOutcome) -> Option<String> {
        let last = self.entries.last()?;
        Some(match outcome {
            ViolationOutcome::Warned { count } => format!(
                "⚠️ {} Violation {count}/{MAX_VIOLATIONS}. {}",
                last.kind.label(),
                last.kind.hint()
            ),
            ViolationOutcome::LimitReached | ViolationOutcome::OverLimit { .. } => {
                "🚨 Max violations reached! Submitting test automatically...".to_string()
            }
        })
    }
}
