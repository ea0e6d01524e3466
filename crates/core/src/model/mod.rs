mod fact;
mod matrix;
mod record;

pub use fact::{FACT_COUNT, FACTOR_COUNT, FactError, FactKey, MAX_FACTOR, MIN_FACTOR, Question};
pub use matrix::{MatrixError, MissedFact, ResultGrid, ResultMatrix};
pub use record::{FactRecord, RecordError};
