#![forbid(unsafe_code)]

pub mod model;
pub mod selector;
pub mod time;

pub use selector::{MIN_WEIGHT, QuestionSelector};
pub use time::Clock;
