use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestResultError {
    #[error("correct count ({correct}) exceeds total ({total})")]
    CountExceedsTotal { correct: u32, total: u32 },

    #[error("score {0} is outside 0..=100")]
    ScoreOutOfRange(u32),
}

/// Scored outcome returned by the server for a submitted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestResult {
    score_percent: Option<u32>,
    correct_count: Option<u32>,
    total: Option<u32>,
    time_taken_secs: Option<u64>,
}

impl TestResult {
    /// Build a result from the fields the server reported.
    ///
    /// # Errors
    ///
    /// Returns `TestResultError` when counts are inconsistent or the score is
    /// not a percentage.
    pub fn new(
        score_percent: Option<u32>,
        correct_count: Option<u32>,
        total: Option<u32>,
        time_taken_secs: Option<u64>,
    ) -> Result<Self, TestResultError> {
        if let Some(score) = score_percent.filter(|score| *score > 100) {
            return Err(TestResultError::ScoreOutOfRange(score));
        }
        if let (Some(correct), Some(total)) = (correct_count, total) {
            if correct > total {
                return Err(TestResultError::CountExceedsTotal { correct, total });
            }
        }
        Ok(Self {
            score_percent,
            correct_count,
            total,
            time_taken_secs,
        })
    }

    #[must_use]
    pub fn score_percent(&self) -> Option<u32> {
        self.score_percent
    }

    #[must_use]
    pub fn correct_count(&self) -> Option<u32> {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> Option<u64> {
        self.time_taken_secs
    }

    /// Rounded percentage shown to the student.
    ///
    /// Derived from `correct / total` when both are known, otherwise the
    /// server's own score, otherwise zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage(&self) -> u32 {
        match (self.correct_count, self.total) {
            // 0..=100 after the constructor's count check.
            (Some(correct), Some(total)) if total > 0 => {
                (f64::from(correct) * 100.0 / f64::from(total)).round() as u32
            }
            _ => self.score_percent.unwrap_or(0),
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.percentage() >= 50
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_percentage(self.percentage())
    }

    /// Time taken as reported, or measured locally when the server left it out.
    #[must_use]
    pub fn with_fallback_time_taken(mut self, measured_secs: u64) -> Self {
        if self.time_taken_secs.is_none_or(|secs| secs == 0) {
            self.time_taken_secs = Some(measured_secs);
        }
        self
    }
}

/// Qualitative bucket for a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Great,
    GoodEffort,
    NeedsImprovement,
    KeepPracticing,
}

impl ScoreBand {
    #[must_use]
    pub fn for_percentage(pct: u32) -> Self {
        match pct {
            90.. => Self::Excellent,
            75..=89 => Self::Great,
            50..=74 => Self::GoodEffort,
            30..=49 => Self::NeedsImprovement,
            _ => Self::KeepPracticing,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent — Keep it up!",
            Self::Great => "Great job!",
            Self::GoodEffort => "Good effort",
            Self::NeedsImprovement => "Needs improvement",
            Self::KeepPracticing => "Keep practicing",
        }
    }
}

/// `"{m}m {s}s"`, or an em dash when nothing meaningful was recorded.
#[must_use]
pub fn format_time_taken(secs: Option<u64>) -> String {
    match secs {
        Some(secs) if secs > 0 => format!("{}m {}s", secs / 60, secs % 60),
        _ => "—".to_string(),
    }
}
