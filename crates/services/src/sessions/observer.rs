use chrono::Duration;

use drill_core::model::{MissedFact, Question, ResultMatrix};

/// Outcome of one answered or timed-out question.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub question: Question,
    /// Parsed answer, `None` when the countdown expired.
    pub given: Option<i64>,
    pub was_correct: bool,
    /// Time from issuing the question to the answer; `None` on timeout.
    pub response_time: Option<Duration>,
}

impl Feedback {
    /// Solved equation in the order the question was shown, e.g. `"7 × 3 = 21"`.
    #[must_use]
    pub fn equation(&self) -> String {
        self.question.equation()
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.given.is_none()
    }
}

/// Receives state changes for rendering.
///
/// Implemented by the presentation layer; called synchronously from the
/// session event loop, so implementations should not block.
pub trait SessionObserver: Send + Sync {
    fn on_question_changed(&self, first: u8, second: u8);

    fn on_tick(&self, seconds_remaining: u32);

    fn on_feedback(&self, feedback: &Feedback);

    fn on_matrix_changed(&self, matrix: &ResultMatrix);

    fn on_error_list_changed(&self, missed: &[MissedFact]);

    /// The session ended through `stop`.
    fn on_stopped(&self) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_question_changed(&self, _first: u8, _second: u8) {}

    fn on_tick(&self, _seconds_remaining: u32) {}

    fn on_feedback(&self, _feedback: &Feedback) {}

    fn on_matrix_changed(&self, _matrix: &ResultMatrix) {}

    fn on_error_list_changed(&self, _missed: &[MissedFact]) {}
}
