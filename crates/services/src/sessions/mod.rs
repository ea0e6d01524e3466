mod controller;
mod countdown;
mod observer;
mod progress;
mod runtime;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{SessionController, SessionState, SubmitOutcome, TickOutcome};
pub use countdown::{Countdown, Tick};
pub use observer::{Feedback, NoopObserver, SessionObserver};
pub use progress::SessionProgress;
pub use runtime::{SessionCommand, SessionHandle, SessionRuntime};
pub use view::{HeatCell, MatrixView, Shade};
