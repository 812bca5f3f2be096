/// Remaining-time threshold that triggers the low-time warning.
pub const LOW_TIME_SECS: u32 = 5 * 60;

/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    /// Produced once, on the tick that reaches zero.
    Expired,
    /// Already at zero; nothing changes.
    Idle,
}

/// Per-attempt countdown in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn from_minutes(minutes: u32) -> Self {
        Self::from_secs(minutes.saturating_mul(60))
    }

    #[must_use]
    pub fn from_secs(secs: u32) -> Self {
        Self { remaining: secs }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    #[must_use]
    pub fn is_low(&self) -> bool {
        self.remaining <= LOW_TIME_SECS
    }

    pub fn tick(&mut self) -> TickOutcome {
        match self.remaining {
            0 => TickOutcome::Idle,
            1 => {
                self.remaining = 0;
                TickOutcome::Expired
            }
            n => {
                self.remaining = n - 1;
                TickOutcome::Running {
                    remaining: self.remaining,
                }
            }
        }
    }

    /// `m:ss`
    #[must_use]
    pub fn label(&self) -> String {
        format_clock(self.remaining)
    }
}

#[must_use]
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
