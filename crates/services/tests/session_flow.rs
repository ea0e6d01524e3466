use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use drill_core::model::{FactKey, MissedFact, ResultMatrix};
use drill_core::time::fixed_clock;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::session::{Tick, TickOutcome};
use services::{
    AppServices, Clock, Feedback, SessionConfig, SessionController, SessionObserver,
    SessionState, SubmitOutcome,
};
use storage::repository::{InMemoryRepository, KeyValueRepository, StorageError};
use storage::results::ResultStore;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Question(u8, u8),
    Tick(u32),
    Feedback { equation: String, correct: bool },
    Matrix { attempts: u64 },
    Errors(Vec<FactKey>),
    Stopped,
}

struct RecordingObserver {
    events: mpsc::UnboundedSender<Event>,
    log: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let observer = Arc::new(Self {
            events: tx,
            log: Mutex::new(Vec::new()),
        });
        (observer, rx)
    }

    fn push(&self, event: Event) {
        self.log.lock().unwrap().push(event.clone());
        let _ = self.events.send(event);
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_question_changed(&self, first: u8, second: u8) {
        self.push(Event::Question(first, second));
    }

    fn on_tick(&self, seconds_remaining: u32) {
        self.push(Event::Tick(seconds_remaining));
    }

    fn on_feedback(&self, feedback: &Feedback) {
        self.push(Event::Feedback {
            equation: feedback.equation(),
            correct: feedback.was_correct,
        });
    }

    fn on_matrix_changed(&self, matrix: &ResultMatrix) {
        self.push(Event::Matrix {
            attempts: matrix.totals().0,
        });
    }

    fn on_error_list_changed(&self, missed: &[MissedFact]) {
        self.push(Event::Errors(missed.iter().map(|m| m.key).collect()));
    }

    fn on_stopped(&self) {
        self.push(Event::Stopped);
    }
}

/// Reads succeed, every write fails.
struct ReadOnlyRepository;

#[async_trait]
impl KeyValueRepository for ReadOnlyRepository {
    async fn get_value(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn put_value(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }
}

async fn build(
    repo: Arc<dyn KeyValueRepository>,
) -> (
    SessionController,
    mpsc::UnboundedReceiver<Tick>,
    Arc<RecordingObserver>,
    ResultStore,
) {
    let store = ResultStore::new(repo);
    let (observer, _events) = RecordingObserver::new();
    let (controller, ticks) = SessionController::load(
        store.clone(),
        observer.clone(),
        SessionConfig::default(),
    )
    .await;
    let controller = controller
        .with_rng(StdRng::seed_from_u64(99))
        .with_clock(fixed_clock());
    (controller, ticks, observer, store)
}

async fn next_event(
    events: &mut mpsc::UnboundedReceiver<Event>,
    pred: impl Fn(&Event) -> bool,
) -> Event {
    loop {
        let event = events.recv().await.expect("observer channel open");
        if pred(&event) {
            return event;
        }
    }
}

#[tokio::test]
async fn correct_answer_is_recorded_and_persisted() {
    let (mut controller, _ticks, observer, store) =
        build(Arc::new(InMemoryRepository::new())).await;

    let question = controller.start(5);
    assert!((1..=10).contains(&question.first()));
    assert!((1..=10).contains(&question.second()));

    let answer = question.expected_answer().to_string();
    let SubmitOutcome::Answered(feedback) = controller.submit_answer(&answer).await else {
        panic!("answer should be accepted");
    };
    assert!(feedback.was_correct);
    assert_eq!(feedback.equation(), question.equation());
    assert_eq!(feedback.response_time, Some(chrono::Duration::zero()));

    let record = controller.matrix().get(question.key()).unwrap();
    assert_eq!((record.attempts(), record.correct()), (1, 1));

    let persisted = store.load().await;
    assert_eq!(persisted.get(question.key()), Some(record));

    // One matrix update, one feedback, and two questions (first + next).
    assert_eq!(observer.count(|e| matches!(e, Event::Matrix { .. })), 1);
    assert_eq!(observer.count(|e| matches!(e, Event::Feedback { .. })), 1);
    assert_eq!(observer.count(|e| matches!(e, Event::Question(..))), 2);
    assert!(controller.countdown_pending());
}

#[tokio::test]
async fn non_numeric_answer_changes_nothing() {
    let (mut controller, _ticks, observer, _store) =
        build(Arc::new(InMemoryRepository::new())).await;
    let question = controller.start(5);

    for raw in ["abc", "", "  ", "x12", "-", ".5"] {
        assert_eq!(controller.submit_answer(raw).await, SubmitOutcome::Unparsed);
    }

    assert!(controller.matrix().is_empty());
    assert_eq!(controller.current_question(), Some(question));
    assert_eq!(controller.state(), SessionState::AwaitingAnswer);
    assert_eq!(observer.count(|e| matches!(e, Event::Question(..))), 1);
}

#[tokio::test]
async fn leading_digits_count_as_the_answer() {
    let (mut controller, _ticks, _observer, _store) =
        build(Arc::new(InMemoryRepository::new())).await;
    let question = controller.start(5);

    let raw = format!("{}abc", question.expected_answer());
    let SubmitOutcome::Answered(feedback) = controller.submit_answer(&raw).await else {
        panic!("leading digits should be read as an answer");
    };
    assert!(feedback.was_correct);
    assert_eq!(feedback.given, Some(i64::from(question.expected_answer())));

    let next = controller.current_question().unwrap();
    let SubmitOutcome::Answered(feedback) = controller
        .submit_answer(&format!("{}.9", next.expected_answer()))
        .await
    else {
        panic!("decimal input should be truncated to its integer part");
    };
    assert!(feedback.was_correct);
    assert_eq!(controller.matrix().totals(), (2, 2));
}

#[tokio::test]
async fn answers_for_mirrored_questions_share_one_record() {
    let (mut controller, _ticks, _observer, _store) =
        build(Arc::new(InMemoryRepository::new())).await;
    controller.start(5);

    for _ in 0..200 {
        let question = controller.current_question().unwrap();
        controller
            .submit_answer(&question.expected_answer().to_string())
            .await;
    }

    assert!(controller.matrix().len() <= 55);
    for (key, record) in controller.matrix().iter() {
        assert!(key.low() <= key.high());
        assert_eq!(record.correct(), record.attempts());
    }
    assert_eq!(controller.matrix().totals(), (200, 200));
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_records_miss_and_issues_next_question() {
    let (mut controller, mut ticks, observer, _store) =
        build(Arc::new(InMemoryRepository::new())).await;
    let first = controller.start(2);

    let tick = ticks.recv().await.unwrap();
    assert_eq!(
        controller.on_tick(tick).await,
        TickOutcome::Counting {
            seconds_remaining: 1
        }
    );

    let tick = ticks.recv().await.unwrap();
    let TickOutcome::TimedOut(feedback) = controller.on_tick(tick).await else {
        panic!("second tick should expire the question");
    };
    assert!(!feedback.was_correct);
    assert!(feedback.timed_out());

    let record = controller.matrix().get(first.key()).unwrap();
    assert_eq!((record.attempts(), record.correct()), (1, 0));
    assert_eq!(controller.state(), SessionState::AwaitingAnswer);
    assert_eq!(controller.time_remaining(), Some(2));
    assert_eq!(controller.progress().unwrap().timed_out, 1);
    assert_eq!(observer.count(|e| *e == Event::Errors(vec![first.key()])), 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_restarts_leave_a_single_countdown() {
    let (mut controller, mut ticks, _observer, _store) =
        build(Arc::new(InMemoryRepository::new())).await;
    for _ in 0..10 {
        controller.start(5);
    }
    assert!(controller.countdown_pending());

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    let mut received = Vec::new();
    while let Ok(tick) = ticks.try_recv() {
        received.push(tick);
    }
    assert_eq!(received, vec![Tick { generation: 10 }]);
    assert_eq!(
        controller.on_tick(received[0]).await,
        TickOutcome::Counting {
            seconds_remaining: 4
        }
    );
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_countdown_and_restart_keeps_results() {
    let (mut controller, mut ticks, observer, _store) =
        build(Arc::new(InMemoryRepository::new())).await;
    let question = controller.start(3);
    controller.submit_answer("0").await;
    controller.stop();

    assert_eq!(controller.state(), SessionState::Stopped);
    assert!(!controller.countdown_pending());
    assert_eq!(observer.count(|e| *e == Event::Stopped), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(ticks.try_recv().is_err());

    controller.start(3);
    assert_eq!(controller.state(), SessionState::AwaitingAnswer);
    assert_eq!(controller.progress().unwrap().answered, 0);
    assert_eq!(
        controller.matrix().get(question.key()).map(|r| r.attempts()),
        Some(1)
    );
}

#[tokio::test]
async fn failed_persistence_keeps_session_running() {
    let (mut controller, _ticks, _observer, _store) = build(Arc::new(ReadOnlyRepository)).await;
    let question = controller.start(5);

    let outcome = controller
        .submit_answer(&question.expected_answer().to_string())
        .await;
    assert!(matches!(outcome, SubmitOutcome::Answered(_)));
    assert_eq!(controller.matrix().totals(), (1, 1));
    assert_eq!(controller.state(), SessionState::AwaitingAnswer);
}

#[tokio::test]
async fn reset_clears_persisted_results() {
    let (mut controller, _ticks, observer, store) =
        build(Arc::new(InMemoryRepository::new())).await;
    controller.start(5);
    controller.submit_answer("0").await;
    assert!(!store.load().await.is_empty());

    controller.reset().await;

    assert!(controller.matrix().is_empty());
    assert!(store.load().await.is_empty());
    assert_eq!(observer.count(|e| *e == Event::Errors(Vec::new())), 1);
}

#[tokio::test(start_paused = true)]
async fn runtime_drives_answers_and_timeouts() {
    let services = AppServices::in_memory(Clock::default(), SessionConfig::default());
    let (observer, mut events) = RecordingObserver::new();
    let (runtime, handle) = services.launch(observer.clone()).await;
    let join = tokio::spawn(runtime.run());

    handle.start(2).unwrap();
    let Event::Question(a, b) = next_event(&mut events, |e| matches!(e, Event::Question(..))).await
    else {
        unreachable!();
    };

    handle.submit("not a number").unwrap();
    handle.submit((u32::from(a) * u32::from(b)).to_string()).unwrap();
    let feedback = next_event(&mut events, |e| matches!(e, Event::Feedback { .. })).await;
    assert_eq!(
        feedback,
        Event::Feedback {
            equation: format!("{a} × {b} = {}", u32::from(a) * u32::from(b)),
            correct: true
        }
    );

    // Let the next question run out.
    let Event::Question(c, d) = next_event(&mut events, |e| matches!(e, Event::Question(..))).await
    else {
        unreachable!();
    };
    let timeout = next_event(&mut events, |e| matches!(e, Event::Feedback { .. })).await;
    assert_eq!(
        timeout,
        Event::Feedback {
            equation: format!("{c} × {d} = {}", u32::from(c) * u32::from(d)),
            correct: false
        }
    );

    handle.stop().unwrap();
    next_event(&mut events, |e| *e == Event::Stopped).await;

    drop(handle);
    let controller = join.await.unwrap();
    assert_eq!(controller.state(), SessionState::Stopped);
    assert_eq!(controller.matrix().totals(), (2, 1));

    let persisted = services.results().load().await;
    assert_eq!(persisted.totals(), (2, 1));
}
