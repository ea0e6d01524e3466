#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod sessions;

pub use drill_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use config::{DEFAULT_TIME_LIMIT_SECS, SessionConfig, TimeLimit};
pub use error::{AppServicesError, SessionError};

pub use sessions::{
    Feedback, MatrixView, SessionCommand, SessionController, SessionHandle, SessionObserver,
    SessionRuntime, SessionState, SubmitOutcome, TickOutcome,
};
