use chrono::{DateTime, Duration, Utc};

/// Wall clock used to time answers.
///
/// `Fixed` keeps response times deterministic in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Time elapsed since `start`, clamped at zero if the clock went backwards.
    #[must_use]
    pub fn elapsed_since(&self, start: DateTime<Utc>) -> Duration {
        (self.now() - start).max(Duration::zero())
    }

    /// Move a fixed clock forward. No effect on `Clock::System`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
#[cfg(any(test, feature = "test-util"))]
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

#[cfg(any(test, feature = "test-util"))]
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(FIXED_TEST_TIMESTAMP)
}

#[cfg(any(test, feature = "test-util"))]
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
