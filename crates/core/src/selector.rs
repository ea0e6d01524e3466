use rand::Rng;

use crate::model::{FactKey, FactRecord, Question, ResultMatrix};

/// Weight floor for mastered facts so they keep coming back occasionally.
pub const MIN_WEIGHT: f64 = 0.10;

/// Selection weight for a fact: `max(1 - success_rate, MIN_WEIGHT)`.
///
/// Unseen facts weigh `1.0`.
///
/// # Examples
///
/// ```
/// # use drill_core::model::FactRecord;
/// # use drill_core::selector::{weight, MIN_WEIGHT};
/// assert_eq!(weight(None), 1.0);
/// let mastered = FactRecord::from_persisted(10, 10)?;
/// assert_eq!(weight(Some(&mastered)), MIN_WEIGHT);
/// # Ok::<(), drill_core::model::RecordError>(())
/// ```
#[must_use]
pub fn weight(record: Option<&FactRecord>) -> f64 {
    let success_rate = record.map_or(0.0, FactRecord::success_rate);
    (1.0 - success_rate).max(MIN_WEIGHT)
}

/// Roulette-wheel selection over every canonical fact.
///
/// Draws are independent: the same fact can come up twice in a row.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionSelector;

impl QuestionSelector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Weighted pool in enumeration order.
    #[must_use]
    pub fn weights(&self, matrix: &ResultMatrix) -> Vec<(FactKey, f64)> {
        FactKey::all()
            .map(|key| (key, weight(matrix.get(key))))
            .collect()
    }

    /// Pick the next fact to drill.
    pub fn pick_key<R: Rng>(&self, matrix: &ResultMatrix, rng: &mut R) -> FactKey {
        let pool = self.weights(matrix);
        let total: f64 = pool.iter().map(|(_, w)| w).sum();
        let draw = rng.random_range(0.0..total);
        Self::walk(&pool, draw)
    }

    /// Pick the next fact and a random presentation order for its factors.
    pub fn pick<R: Rng>(&self, matrix: &ResultMatrix, rng: &mut R) -> Question {
        let key = self.pick_key(matrix, rng);
        let swap = key.low() != key.high() && rng.random_bool(0.5);
        Question::from_key(key, swap)
    }

    // First entry whose cumulative weight reaches `draw`. The pool is never
    // empty; float round-off past the end lands on the last entry.
    fn walk(pool: &[(FactKey, f64)], draw: f64) -> FactKey {
        let mut cumulative = 0.0;
        for (key, w) in pool {
            cumulative += w;
            if cumulative >= draw {
                return *key;
            }
        }
        pool[pool.len() - 1].0
    }
}
