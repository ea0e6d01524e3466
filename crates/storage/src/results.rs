use std::sync::Arc;

use drill_core::model::{FactKey, ResultGrid, ResultMatrix};

use crate::repository::{KeyValueRepository, StorageError};

/// Storage key holding the serialized matrix.
pub const RESULTS_KEY: &str = "results";

/// Owns the persisted accuracy matrix.
///
/// The value under [`RESULTS_KEY`] is a JSON 10×10 array of arrays; each cell
/// is `null` or `{"attempts": n, "correct": m}`. Loading never fails: missing
/// or malformed data yields an empty matrix.
#[derive(Clone)]
pub struct ResultStore {
    repo: Arc<dyn KeyValueRepository>,
}

impl ResultStore {
    #[must_use]
    pub fn new(repo: Arc<dyn KeyValueRepository>) -> Self {
        Self { repo }
    }

    /// Load the persisted matrix, failing open to an empty one.
    pub async fn load(&self) -> ResultMatrix {
        let raw = match self.repo.get_value(RESULTS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("no stored results, starting empty");
                return ResultMatrix::new();
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to read results, starting empty");
                return ResultMatrix::new();
            }
        };

        match decode(&raw) {
            Ok(matrix) => matrix,
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed results");
                ResultMatrix::new()
            }
        }
    }

    /// Persist the full matrix, overwriting the previous state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub async fn save(&self, matrix: &ResultMatrix) -> Result<(), StorageError> {
        let raw = encode(matrix)?;
        self.repo.put_value(RESULTS_KEY, &raw).await
    }

    /// Clear every record and persist the empty matrix.
    ///
    /// A failed write is logged; the returned matrix is empty either way.
    pub async fn reset(&self) -> ResultMatrix {
        let matrix = ResultMatrix::new();
        if let Err(err) = self.save(&matrix).await {
            tracing::warn!(error = %err, "failed to persist reset results");
        }
        matrix
    }

    /// Count one answer for `key` and hand the matrix back.
    #[must_use]
    pub fn record(mut matrix: ResultMatrix, key: FactKey, was_correct: bool) -> ResultMatrix {
        matrix.record(key, was_correct);
        matrix
    }
}

fn encode(matrix: &ResultMatrix) -> Result<String, StorageError> {
    serde_json::to_string(&matrix.to_grid()).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode(raw: &str) -> Result<ResultMatrix, StorageError> {
    let grid: ResultGrid =
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
    ResultMatrix::from_grid(&grid).map_err(|e| StorageError::Serialization(e.to_string()))
}
