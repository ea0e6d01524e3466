#![forbid(unsafe_code)]

pub mod repository;
pub mod results;
pub mod sqlite;

pub use repository::{InMemoryRepository, KeyValueRepository, Storage, StorageError};
pub use results::{RESULTS_KEY, ResultStore};
