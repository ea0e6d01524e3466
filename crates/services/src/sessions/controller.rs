use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use drill_core::model::{Question, ResultMatrix};
use drill_core::{Clock, QuestionSelector};
use storage::ResultStore;

use super::countdown::{Countdown, Tick};
use super::observer::{Feedback, SessionObserver};
use super::progress::SessionProgress;
use crate::config::{SessionConfig, TimeLimit};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been started yet.
    Idle,
    /// A question is on screen and its countdown is running.
    AwaitingAnswer,
    /// The user stopped the session.
    Stopped,
}

/// Result of `submit_answer`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// No session is running.
    NotRunning,
    /// The input was not an integer; the question stays active.
    Unparsed,
    Answered(Feedback),
}

/// Result of handling a countdown tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The tick belonged to a cancelled countdown or an inactive session.
    Stale,
    Counting { seconds_remaining: u32 },
    /// Time ran out; the fact was recorded as missed and a new question issued.
    TimedOut(Feedback),
}

#[derive(Debug, Clone, Copy)]
struct ActiveQuestion {
    question: Question,
    issued_at: DateTime<Utc>,
    remaining: u32,
}

#[derive(Debug, Clone, Copy)]
struct Session {
    time_limit: TimeLimit,
    current: ActiveQuestion,
    progress: SessionProgress,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Drives the question lifecycle: issue, count down, record, repeat.
///
/// Owns the in-memory matrix and the countdown handle. Every answered or
/// timed-out question mutates the matrix once, persists it once, and notifies
/// the observer of the matrix, the missed-fact list, the feedback and the next
/// question, in that order.
pub struct SessionController {
    store: ResultStore,
    matrix: ResultMatrix,
    selector: QuestionSelector,
    rng: StdRng,
    clock: Clock,
    config: SessionConfig,
    observer: Arc<dyn SessionObserver>,
    countdown: Countdown,
    state: SessionState,
    session: Option<Session>,
}

impl SessionController {
    /// Load persisted results and build an idle controller.
    ///
    /// Ticks from the countdown arrive on the returned receiver and must be
    /// fed back through [`SessionController::on_tick`].
    pub async fn load(
        store: ResultStore,
        observer: Arc<dyn SessionObserver>,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let matrix = store.load().await;
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            store,
            matrix,
            selector: QuestionSelector::new(),
            rng: StdRng::from_os_rng(),
            clock: Clock::default(),
            config,
            observer,
            countdown: Countdown::new(config.tick_period, tx),
            state: SessionState::Idle,
            session: None,
        };
        (controller, rx)
    }

    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn matrix(&self) -> &ResultMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn current_question(&self) -> Option<Question> {
        self.session.map(|s| s.current.question)
    }

    #[must_use]
    pub fn time_remaining(&self) -> Option<u32> {
        self.session.map(|s| s.current.remaining)
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<TimeLimit> {
        self.session.map(|s| s.time_limit)
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.session.map(|s| s.progress)
    }

    /// True while a countdown task is scheduled.
    #[must_use]
    pub fn countdown_pending(&self) -> bool {
        self.countdown.is_pending()
    }

    /// Re-send the matrix and missed-fact list, e.g. for the first render.
    pub fn refresh(&self) {
        self.publish_results();
    }

    /// Start (or restart) a session and issue the first question.
    ///
    /// Non-positive limits fall back to the configured default. The matrix
    /// carries over between sessions; only session state is reset.
    pub fn start(&mut self, time_limit_secs: i64) -> Question {
        let time_limit = TimeLimit::from_secs(time_limit_secs, self.config.default_time_limit);
        tracing::info!(time_limit = time_limit.secs(), "session started");

        self.state = SessionState::AwaitingAnswer;
        self.issue_question(time_limit, SessionProgress::default())
    }

    /// End the session and cancel its countdown. Calling it again is a no-op.
    pub fn stop(&mut self) {
        self.countdown.cancel();
        if self.state != SessionState::AwaitingAnswer {
            return;
        }
        if let Some(progress) = self.progress() {
            tracing::info!(
                answered = progress.answered,
                correct = progress.correct,
                "session stopped"
            );
        }
        self.state = SessionState::Stopped;
        self.session = None;
        self.observer.on_stopped();
    }

    /// Clear every record and persist the empty matrix.
    ///
    /// A running session keeps its current question and countdown.
    pub async fn reset(&mut self) {
        self.matrix = self.store.reset().await;
        tracing::info!("results reset");
        self.publish_results();
    }

    /// Check `raw` against the current question.
    ///
    /// Only the leading integer is read, so `"21abc"` answers 21 and `"4.5"`
    /// answers 4. Input with no leading digits is ignored without touching
    /// the matrix or the countdown.
    pub async fn submit_answer(&mut self, raw: &str) -> SubmitOutcome {
        let Some(session) = self.active_session() else {
            return SubmitOutcome::NotRunning;
        };
        let Some(value) = parse_answer(raw) else {
            tracing::debug!(input = raw, "ignoring non-numeric answer");
            return SubmitOutcome::Unparsed;
        };

        let current = session.current;
        let feedback = Feedback {
            question: current.question,
            given: Some(value),
            was_correct: current.question.is_correct(value),
            response_time: Some(self.clock.elapsed_since(current.issued_at)),
        };
        self.resolve(session, feedback.clone()).await;
        SubmitOutcome::Answered(feedback)
    }

    /// Advance the countdown by one period.
    ///
    /// Expiry counts as a wrong answer and moves on to the next question.
    pub async fn on_tick(&mut self, tick: Tick) -> TickOutcome {
        let Some(mut session) = self.active_session() else {
            return TickOutcome::Stale;
        };
        if !self.countdown.is_current(tick) {
            return TickOutcome::Stale;
        }

        let remaining = session.current.remaining.saturating_sub(1);
        session.current.remaining = remaining;
        self.session = Some(session);
        self.observer.on_tick(remaining);

        if remaining > 0 {
            return TickOutcome::Counting {
                seconds_remaining: remaining,
            };
        }

        // Cancelling first keeps a queued tick from firing a second expiry.
        self.countdown.cancel();
        tracing::debug!(fact = %session.current.question.key(), "question timed out");
        let feedback = Feedback {
            question: session.current.question,
            given: None,
            was_correct: false,
            response_time: None,
        };
        self.resolve(session, feedback.clone()).await;
        TickOutcome::TimedOut(feedback)
    }

    fn active_session(&self) -> Option<Session> {
        if self.state == SessionState::AwaitingAnswer {
            self.session
        } else {
            None
        }
    }

    async fn resolve(&mut self, mut session: Session, feedback: Feedback) {
        self.countdown.cancel();

        let key = feedback.question.key();
        let record = self.matrix.record(key, feedback.was_correct);
        tracing::debug!(
            fact = %key,
            correct = feedback.was_correct,
            attempts = record.attempts(),
            "answer recorded"
        );
        if let Err(err) = self.store.save(&self.matrix).await {
            tracing::warn!(error = %err, "failed to persist results; keeping in-memory state");
        }
        self.publish_results();

        session.progress.count(feedback.was_correct, feedback.timed_out());
        self.observer.on_feedback(&feedback);

        self.issue_question(session.time_limit, session.progress);
    }

    fn issue_question(&mut self, time_limit: TimeLimit, progress: SessionProgress) -> Question {
        let question = self.selector.pick(&self.matrix, &mut self.rng);
        let generation = self.countdown.restart();
        self.session = Some(Session {
            time_limit,
            current: ActiveQuestion {
                question,
                issued_at: self.clock.now(),
                remaining: time_limit.secs(),
            },
            progress,
        });
        tracing::debug!(fact = %question.key(), generation, "question issued");

        self.observer.on_question_changed(question.first(), question.second());
        self.observer.on_tick(time_limit.secs());
        question
    }

    fn publish_results(&self) {
        self.observer.on_matrix_changed(&self.matrix);
        self.observer.on_error_list_changed(&self.matrix.missed_facts());
    }
}

/// Leading optionally-signed integer of `raw` after trimming.
///
/// Digit runs too long for `i64` saturate.
fn parse_answer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
