use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// One elapsed period of the countdown identified by `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// Single-owner handle for the per-question countdown task.
///
/// At most one task is live: `restart` aborts the previous task before
/// spawning the next, and every restart bumps the generation so ticks already
/// queued by an old task can be told apart. `cancel` is idempotent.
pub struct Countdown {
    period: Duration,
    ticks: mpsc::UnboundedSender<Tick>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl Countdown {
    #[must_use]
    pub fn new(period: Duration, ticks: mpsc::UnboundedSender<Tick>) -> Self {
        Self {
            period,
            ticks,
            task: None,
            generation: 0,
        }
    }

    /// Cancel any running countdown and start a fresh one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn restart(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let period = self.period;
        let ticks = self.ticks.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
        generation
    }

    /// Stop the live countdown, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// True while a countdown task is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    /// True if `tick` came from the live countdown.
    #[must_use]
    pub fn is_current(&self, tick: Tick) -> bool {
        self.is_pending() && tick.generation == self.generation
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
