use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::fact::{FACTOR_COUNT, FactKey};
use crate::model::record::FactRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatrixError {
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Persisted grid layout: `grid[a - 1][b - 1]` holds the record for `a × b`.
pub type ResultGrid = Vec<Vec<Option<FactRecord>>>;

/// A fact the user has missed at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissedFact {
    pub key: FactKey,
    pub record: FactRecord,
}

impl MissedFact {
    /// Solved equation for the list, e.g. `"6 × 7 = 42"`.
    #[must_use]
    pub fn equation(&self) -> String {
        self.key.equation()
    }
}

/// Accuracy records for every fact in the domain, keyed canonically.
///
/// Facts without an entry have never been answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMatrix {
    records: BTreeMap<FactKey, FactRecord>,
}

impl ResultMatrix {
    /// An all-absent matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: FactKey) -> Option<&FactRecord> {
        self.records.get(&key)
    }

    /// Returns the record for `key`, inserting a fresh zeroed one when absent.
    pub fn get_or_create(&mut self, key: FactKey) -> &mut FactRecord {
        self.records.entry(key).or_default()
    }

    /// Count one answer for `key`.
    pub fn record(&mut self, key: FactKey, was_correct: bool) -> FactRecord {
        let record = self.get_or_create(key);
        record.register(was_correct);
        *record
    }

    /// Number of facts with at least one answer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FactKey, &FactRecord)> {
        self.records.iter().map(|(key, record)| (*key, record))
    }

    /// Facts with `correct < attempts`, in canonical enumeration order.
    #[must_use]
    pub fn missed_facts(&self) -> Vec<MissedFact> {
        self.iter()
            .filter(|(_, record)| record.correct() < record.attempts())
            .map(|(key, record)| MissedFact {
                key,
                record: *record,
            })
            .collect()
    }

    /// Total `(attempts, correct)` across every fact.
    #[must_use]
    pub fn totals(&self) -> (u64, u64) {
        self.records.values().fold((0, 0), |(attempts, correct), r| {
            (
                attempts + u64::from(r.attempts()),
                correct + u64::from(r.correct()),
            )
        })
    }

    /// Rebuild a matrix from the persisted grid.
    ///
    /// Grids written with one cell per ordered pair are folded: the records at
    /// `[a-1][b-1]` and `[b-1][a-1]` are summed into the canonical key. Cells
    /// with zero attempts count as absent.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError` if the grid is not `FACTOR_COUNT × FACTOR_COUNT`.
    pub fn from_grid(grid: &ResultGrid) -> Result<Self, MatrixError> {
        if grid.len() != FACTOR_COUNT {
            return Err(MatrixError::RowCount {
                expected: FACTOR_COUNT,
                found: grid.len(),
            });
        }

        let mut records = BTreeMap::new();
        for (row_idx, row) in grid.iter().enumerate() {
            if row.len() != FACTOR_COUNT {
                return Err(MatrixError::ColumnCount {
                    row: row_idx,
                    expected: FACTOR_COUNT,
                    found: row.len(),
                });
            }
            for (col_idx, cell) in row.iter().enumerate() {
                let Some(record) = cell.filter(|r| r.attempts() > 0) else {
                    continue;
                };
                let key = FactKey::canonical(factor_at(row_idx), factor_at(col_idx));
                records
                    .entry(key)
                    .and_modify(|existing: &mut FactRecord| *existing = existing.merged(record))
                    .or_insert(record);
            }
        }

        Ok(Self { records })
    }

    /// Persisted grid with each canonical record at `[low-1][high-1]`.
    #[must_use]
    pub fn to_grid(&self) -> ResultGrid {
        let mut grid = vec![vec![None; FACTOR_COUNT]; FACTOR_COUNT];
        for (key, record) in &self.records {
            grid[usize::from(key.low() - 1)][usize::from(key.high() - 1)] = Some(*record);
        }
        grid
    }
}

#[allow(clippy::cast_possible_truncation)]
fn factor_at(index: usize) -> u8 {
    // index < FACTOR_COUNT, checked by the caller
    index as u8 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(a: i64, b: i64) -> FactKey {
        FactKey::new(a, b).unwrap()
    }

    #[test]
    fn record_creates_then_increments() {
        let mut matrix = ResultMatrix::new();
        assert!(matrix.get(key(4, 6)).is_none());

        matrix.record(key(4, 6), true);
        let after = matrix.record(key(6, 4), false);

        assert_eq!(after.attempts(), 2);
        assert_eq!(after.correct(), 1);
        assert_eq!(matrix.len(), 1);
    }

    #[test]
    fn get_or_create_returns_fresh_records() {
        let mut matrix = ResultMatrix::new();
        matrix.get_or_create(key(2, 2)).register(true);
        let other = matrix.get_or_create(key(3, 3));
        assert_eq!(*other, FactRecord::default());
    }

    #[test]
    fn missed_facts_lists_only_imperfect_records() {
        let mut matrix = ResultMatrix::new();
        matrix.record(key(2, 3), true);
        matrix.record(key(7, 8), false);
        matrix.record(key(9, 1), true);
        matrix.record(key(9, 1), false);

        let missed = matrix.missed_facts();
        let keys: Vec<FactKey> = missed.iter().map(|m| m.key).collect();
        assert_eq!(keys, vec![key(1, 9), key(7, 8)]);
        assert_eq!(missed[1].equation(), "7 × 8 = 56");
    }

    #[test]
    fn grid_places_records_in_upper_triangle() {
        let mut matrix = ResultMatrix::new();
        matrix.record(key(5, 2), true);

        let grid = matrix.to_grid();
        assert_eq!(grid.len(), FACTOR_COUNT);
        assert!(grid.iter().all(|row| row.len() == FACTOR_COUNT));
        assert_eq!(grid[1][4], Some(FactRecord::from_persisted(1, 1).unwrap()));
        assert_eq!(grid[4][1], None);
        assert_eq!(ResultMatrix::from_grid(&grid).unwrap(), matrix);
    }

    #[test]
    fn ordered_grid_is_folded_into_canonical_keys() {
        let mut grid: ResultGrid = vec![vec![None; FACTOR_COUNT]; FACTOR_COUNT];
        grid[2][6] = Some(FactRecord::from_persisted(2, 1).unwrap());
        grid[6][2] = Some(FactRecord::from_persisted(3, 3).unwrap());
        grid[0][0] = Some(FactRecord::from_persisted(0, 0).unwrap());

        let matrix = ResultMatrix::from_grid(&grid).unwrap();
        let record = matrix.get(key(3, 7)).unwrap();
        assert_eq!(record.attempts(), 5);
        assert_eq!(record.correct(), 4);
        assert!(matrix.get(key(1, 1)).is_none());
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let short: ResultGrid = vec![vec![None; FACTOR_COUNT]; 3];
        assert!(matches!(
            ResultMatrix::from_grid(&short),
            Err(MatrixError::RowCount { found: 3, .. })
        ));

        let mut ragged: ResultGrid = vec![vec![None; FACTOR_COUNT]; FACTOR_COUNT];
        ragged[4].pop();
        assert!(matches!(
            ResultMatrix::from_grid(&ragged),
            Err(MatrixError::ColumnCount { row: 4, .. })
        ));
    }

    #[test]
    fn totals_sum_all_records() {
        let mut matrix = ResultMatrix::new();
        matrix.record(key(1, 2), true);
        matrix.record(key(3, 4), false);
        matrix.record(key(3, 4), true);
        assert_eq!(matrix.totals(), (3, 2));
    }
}
