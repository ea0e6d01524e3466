use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordError {
    #[error("correct answers ({correct}) exceed attempts ({attempts})")]
    CorrectExceedsAttempts { attempts: u32, correct: u32 },
}

/// Accuracy bookkeeping for a single fact.
///
/// Invariant: `correct <= attempts`. A fact that was never answered has no
/// record at all; a zeroed record only exists transiently inside
/// `ResultMatrix::record`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedRecord")]
pub struct FactRecord {
    attempts: u32,
    correct: u32,
}

#[derive(Deserialize)]
struct PersistedRecord {
    attempts: u32,
    correct: u32,
}

impl TryFrom<PersistedRecord> for FactRecord {
    type Error = RecordError;

    fn try_from(raw: PersistedRecord) -> Result<Self, Self::Error> {
        Self::from_persisted(raw.attempts, raw.correct)
    }
}

impl FactRecord {
    /// Rehydrate a record from persisted counts.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::CorrectExceedsAttempts` if the counts break the invariant.
    pub fn from_persisted(attempts: u32, correct: u32) -> Result<Self, RecordError> {
        if correct > attempts {
            return Err(RecordError::CorrectExceedsAttempts { attempts, correct });
        }
        Ok(Self { attempts, correct })
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn missed(&self) -> u32 {
        self.attempts - self.correct
    }

    /// Returns `correct / attempts`, or `0.0` when the fact was never attempted.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.attempts)
        }
    }

    /// Count one more answer.
    ///
    /// Counters saturate; `correct` only moves together with `attempts`, so the
    /// invariant survives saturation.
    pub fn register(&mut self, was_correct: bool) {
        if self.attempts == u32::MAX {
            return;
        }
        self.attempts += 1;
        if was_correct {
            self.correct += 1;
        }
    }

    /// Combine two records for the same fact.
    #[must_use]
    pub fn merged(self, other: FactRecord) -> FactRecord {
        FactRecord {
            attempts: self.attempts.saturating_add(other.attempts),
            correct: self.correct.saturating_add(other.correct),
        }
    }
}
