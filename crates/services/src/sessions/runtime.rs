use tokio::sync::mpsc;

use super::controller::SessionController;
use super::countdown::Tick;
use crate::error::SessionError;

/// Input from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start { time_limit_secs: i64 },
    Stop,
    Submit(String),
    Reset,
    Refresh,
}

/// Cloneable sender for [`SessionCommand`]s.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Queue a command for the event loop.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the runtime has exited.
    pub fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands.send(command).map_err(|_| SessionError::Closed)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the runtime has exited.
    pub fn start(&self, time_limit_secs: i64) -> Result<(), SessionError> {
        self.send(SessionCommand::Start { time_limit_secs })
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the runtime has exited.
    pub fn stop(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Stop)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the runtime has exited.
    pub fn submit(&self, raw: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::Submit(raw.into()))
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the runtime has exited.
    pub fn reset(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Reset)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the runtime has exited.
    pub fn refresh(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Refresh)
    }
}

/// Single-task event loop around a [`SessionController`].
///
/// Commands and countdown ticks are handled one at a time, so the controller
/// never sees concurrent mutation. The loop ends when every handle is dropped.
pub struct SessionRuntime {
    controller: SessionController,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    ticks: mpsc::UnboundedReceiver<Tick>,
}

impl SessionRuntime {
    #[must_use]
    pub fn new(
        controller: SessionController,
        ticks: mpsc::UnboundedReceiver<Tick>,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = Self {
            controller,
            commands: rx,
            ticks,
        };
        (runtime, SessionHandle { commands: tx })
    }

    /// Process events until all handles are dropped, then stop the session
    /// and hand the controller back.
    pub async fn run(mut self) -> SessionController {
        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    self.handle(command).await;
                }
                Some(tick) = self.ticks.recv() => {
                    self.controller.on_tick(tick).await;
                }
            }
        }
        self.controller.stop();
        self.controller
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start { time_limit_secs } => {
                self.controller.start(time_limit_secs);
            }
            SessionCommand::Stop => self.controller.stop(),
            SessionCommand::Submit(raw) => {
                self.controller.submit_answer(&raw).await;
            }
            SessionCommand::Reset => self.controller.reset().await,
            SessionCommand::Refresh => self.controller.refresh(),
        }
    }
}
