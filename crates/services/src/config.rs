use std::time::Duration;

/// Seconds per question when the caller gives nothing usable.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 10;

/// Per-question answer window, always at least one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLimit(u32);

impl Default for TimeLimit {
    fn default() -> Self {
        Self(DEFAULT_TIME_LIMIT_SECS)
    }
}

impl TimeLimit {
    /// Non-positive or oversized values fall back to `fallback`.
    #[must_use]
    pub fn from_secs(secs: i64, fallback: TimeLimit) -> Self {
        u32::try_from(secs)
            .ok()
            .filter(|s| *s > 0)
            .map_or(fallback, Self)
    }

    /// Parse user-entered text, falling back on anything that is not a
    /// positive integer.
    #[must_use]
    pub fn from_input(raw: &str, fallback: TimeLimit) -> Self {
        raw.trim()
            .parse::<i64>()
            .map_or(fallback, |secs| Self::from_secs(secs, fallback))
    }

    #[must_use]
    pub fn secs(&self) -> u32 {
        self.0
    }
}

/// Knobs for the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub default_time_limit: TimeLimit,
    pub tick_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_time_limit: TimeLimit::default(),
            tick_period: Duration::from_secs(1),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_default_time_limit(mut self, secs: i64) -> Self {
        self.default_time_limit = TimeLimit::from_secs(secs, self.default_time_limit);
        self
    }

    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        if !period.is_zero() {
            self.tick_period = period;
        }
        self
    }
}
