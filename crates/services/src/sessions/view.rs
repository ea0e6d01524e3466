use drill_core::model::{FactKey, FactRecord, MAX_FACTOR, MIN_FACTOR, ResultMatrix};

/// Red/green/blue shade for a heat-map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shade {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Shade {
    /// Green grows with the success rate, red with the miss rate.
    #[must_use]
    pub fn for_rate(success_rate: f64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let green = (success_rate.clamp(0.0, 1.0) * 255.0).floor() as u8;
        Self {
            red: 255 - green,
            green,
            blue: 150,
        }
    }
}

/// One cell of the multiplication grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatCell {
    pub row: u8,
    pub column: u8,
    pub record: Option<FactRecord>,
}

impl HeatCell {
    /// `"correct/attempts"`, or empty for facts never answered.
    #[must_use]
    pub fn label(&self) -> String {
        self.record
            .map(|r| format!("{}/{}", r.correct(), r.attempts()))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn shade(&self) -> Option<Shade> {
        self.record.map(|r| Shade::for_rate(r.success_rate()))
    }
}

/// Presentation-agnostic full grid; both `a × b` and `b × a` show the shared
/// canonical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixView {
    pub rows: Vec<Vec<HeatCell>>,
}

impl MatrixView {
    #[must_use]
    pub fn from_matrix(matrix: &ResultMatrix) -> Self {
        let rows = (MIN_FACTOR..=MAX_FACTOR)
            .map(|row| {
                (MIN_FACTOR..=MAX_FACTOR)
                    .map(|column| HeatCell {
                        row,
                        column,
                        record: FactKey::new(i64::from(row), i64::from(column))
                            .ok()
                            .and_then(|key| matrix.get(key).copied()),
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    #[must_use]
    pub fn cell(&self, row: u8, column: u8) -> Option<&HeatCell> {
        let r = usize::from(row.checked_sub(MIN_FACTOR)?);
        let c = usize::from(column.checked_sub(MIN_FACTOR)?);
        self.rows.get(r)?.get(c)
    }
}
