use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Smallest factor that can appear in a question.
pub const MIN_FACTOR: u8 = 1;
/// Largest factor that can appear in a question.
pub const MAX_FACTOR: u8 = 10;
/// Number of distinct factors in the drill domain.
pub const FACTOR_COUNT: usize = (MAX_FACTOR - MIN_FACTOR + 1) as usize;
/// Number of canonical facts (unordered pairs with repetition).
pub const FACT_COUNT: usize = FACTOR_COUNT * (FACTOR_COUNT + 1) / 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FactError {
    #[error("factor {provided} is outside 1..=10")]
    FactorOutOfRange { provided: i64 },
}

fn check_factor(value: i64) -> Result<u8, FactError> {
    u8::try_from(value)
        .ok()
        .filter(|f| (MIN_FACTOR..=MAX_FACTOR).contains(f))
        .ok_or(FactError::FactorOutOfRange { provided: value })
}

//
// ─── FACT KEY ──────────────────────────────────────────────────────────────────
//

/// Canonical identity of a multiplication fact.
///
/// `a × b` and `b × a` share one key: the factors are stored as `low <= high`.
/// Recording, selection and the missed-fact list all go through this type,
/// so there is exactly one record per fact.
///
/// # Examples
///
/// ```
/// # use drill_core::model::FactKey;
/// let key = FactKey::new(7, 3)?;
/// assert_eq!((key.low(), key.high()), (3, 7));
/// assert_eq!(key, FactKey::new(3, 7)?);
/// # Ok::<(), drill_core::model::FactError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactKey {
    low: u8,
    high: u8,
}

impl FactKey {
    /// Builds the canonical key for `a × b`.
    ///
    /// # Errors
    ///
    /// Returns `FactError::FactorOutOfRange` if either factor is outside the domain.
    pub fn new(a: i64, b: i64) -> Result<Self, FactError> {
        let a = check_factor(a)?;
        let b = check_factor(b)?;
        Ok(Self::canonical(a, b))
    }

    pub(crate) fn canonical(a: u8, b: u8) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    #[must_use]
    pub fn low(&self) -> u8 {
        self.low
    }

    #[must_use]
    pub fn high(&self) -> u8 {
        self.high
    }

    #[must_use]
    pub fn product(&self) -> u32 {
        u32::from(self.low) * u32::from(self.high)
    }

    /// Solved equation text in canonical order, e.g. `"3 × 7 = 21"`.
    #[must_use]
    pub fn equation(&self) -> String {
        format!("{} × {} = {}", self.low, self.high, self.product())
    }

    /// Every canonical key, ordered by `low` then `high`.
    pub fn all() -> impl Iterator<Item = FactKey> {
        (MIN_FACTOR..=MAX_FACTOR)
            .flat_map(|low| (low..=MAX_FACTOR).map(move |high| FactKey { low, high }))
    }
}

impl fmt::Debug for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactKey({}x{})", self.low, self.high)
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.low, self.high)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A fact as shown to the user, with a concrete presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    first: u8,
    second: u8,
}

impl Question {
    /// Presents `key` with its smaller factor first, or swapped when `swap` is set.
    #[must_use]
    pub fn from_key(key: FactKey, swap: bool) -> Self {
        if swap {
            Self {
                first: key.high,
                second: key.low,
            }
        } else {
            Self {
                first: key.low,
                second: key.high,
            }
        }
    }

    #[must_use]
    pub fn first(&self) -> u8 {
        self.first
    }

    #[must_use]
    pub fn second(&self) -> u8 {
        self.second
    }

    #[must_use]
    pub fn key(&self) -> FactKey {
        FactKey::canonical(self.first, self.second)
    }

    #[must_use]
    pub fn expected_answer(&self) -> u32 {
        self.key().product()
    }

    /// Returns true if `value` is the product of the two factors.
    #[must_use]
    pub fn is_correct(&self, value: i64) -> bool {
        value == i64::from(self.expected_answer())
    }

    /// Prompt text, e.g. `"7 × 3 = ?"`.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{} × {} = ?", self.first, self.second)
    }

    /// Solved equation in presentation order, e.g. `"7 × 3 = 21"`.
    #[must_use]
    pub fn equation(&self) -> String {
        format!(
            "{} × {} = {}",
            self.first,
            self.second,
            self.expected_answer()
        )
    }
}
