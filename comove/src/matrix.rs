//! N×N co-movement frequency grid and the per-row computation that fills it.

use crate::{
    config::ComoveConfig,
    estimator::CorrelationEstimator,
    frequency::PairFrequencyCalculator,
    series::{Identifier, Series, SeriesSource},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifecycle of a [`CorrelationMatrix`]. Construction via [`CorrelationMatrix::init`] is the
/// only entry point, so there is no uninitialised state to represent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub enum MatrixPhase {
    /// Diagonal seeded, no row computed yet.
    Initialized,
    /// Some, but not all, schedulable rows have been computed.
    RowsComputing,
    /// Every row with at least one column beyond the diagonal has been computed.
    Complete,
}

/// Best co-moving peer for one row, restricted to columns after the row.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RowBestMatch {
    pub row: usize,
    pub column: usize,
    pub identifier: Identifier,
    pub peer: Identifier,
    pub frequency: f64,
}

#[derive(Debug)]
struct MatrixRow {
    cells: Vec<f64>,
    computed: bool,
}

/// Frequency grid whose rows are each guarded by their own lock.
///
/// Only the worker computing row `i` writes row `i`, so row locks are never contended
/// during a run. Cells with `column < row` are never written and keep their initial 0.0.
#[derive(Debug)]
pub struct CorrelationMatrix {
    identifiers: Vec<Identifier>,
    rows: Vec<Mutex<MatrixRow>>,
}

impl CorrelationMatrix {
    /// Allocates the grid and seeds the diagonal with 1.0.
    pub fn init(identifiers: Vec<Identifier>) -> Self {
        let n = identifiers.len();
        let rows = (0..n)
            .map(|i| {
                let mut cells = vec![0.0; n];
                cells[i] = 1.0;
                Mutex::new(MatrixRow {
                    cells,
                    computed: false,
                })
            })
            .collect();

        Self { identifiers, rows }
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn at(&self, row: usize, column: usize) -> f64 {
        self.rows[row].lock().cells[column]
    }

    /// Rows that have a column beyond the diagonal, i.e. every row except the last.
    pub fn schedulable_rows(&self) -> usize {
        self.len().saturating_sub(1)
    }

    pub fn phase(&self) -> MatrixPhase {
        let computed = self
            .rows
            .iter()
            .take(self.schedulable_rows())
            .filter(|row| row.lock().computed)
            .count();

        match computed {
            0 if self.schedulable_rows() > 0 => MatrixPhase::Initialized,
            computed if computed == self.schedulable_rows() => MatrixPhase::Complete,
            _ => MatrixPhase::RowsComputing,
        }
    }

    /// Maximum over columns `(row, N)`. The first maximum wins ties.
    ///
    /// Returns `None` for the last row, which has nothing to scan.
    pub fn best_in_row(&self, row: usize) -> Option<(usize, f64)> {
        let guard = self.rows.get(row)?.lock();
        best_after(&guard.cells, row)
    }

    /// Read-only copy of the grid.
    pub fn snapshot(&self) -> FrequencyGrid {
        FrequencyGrid {
            identifiers: self.identifiers.clone(),
            cells: self.rows.iter().map(|row| row.lock().cells.clone()).collect(),
        }
    }
}

fn best_after(cells: &[f64], row: usize) -> Option<(usize, f64)> {
    let first = row + 1;
    let mut best = (first, *cells.get(first)?);
    for (column, value) in cells.iter().enumerate().skip(first + 1) {
        if *value > best.1 {
            best = (column, *value);
        }
    }
    Some(best)
}

/// Immutable grid of a finished run, together with its axis identifiers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FrequencyGrid {
    pub identifiers: Vec<Identifier>,
    pub cells: Vec<Vec<f64>>,
}

impl FrequencyGrid {
    pub fn at(&self, row: usize, column: usize) -> f64 {
        self.cells[row][column]
    }
}

/// Owns a [`CorrelationMatrix`], the series it is computed from and the [`ComoveConfig`]
/// every row is computed and scheduled with.
#[derive(Debug)]
pub struct CorrelationMatrixEngine<Source> {
    matrix: CorrelationMatrix,
    source: Source,
    config: ComoveConfig,
    calculator: PairFrequencyCalculator,
}

impl<Source> CorrelationMatrixEngine<Source>
where
    Source: SeriesSource,
{
    pub fn init(identifiers: Vec<Identifier>, source: Source, config: ComoveConfig) -> Self {
        Self {
            matrix: CorrelationMatrix::init(identifiers),
            source,
            config,
            calculator: PairFrequencyCalculator::new(CorrelationEstimator::new(config.threshold)),
        }
    }

    pub fn matrix(&self) -> &CorrelationMatrix {
        &self.matrix
    }

    pub fn config(&self) -> &ComoveConfig {
        &self.config
    }

    fn series(&self, index: usize) -> &Series {
        static EMPTY: Series = Series::empty();
        self.source
            .series(&self.matrix.identifiers[index])
            .unwrap_or(&EMPTY)
    }

    /// Computes every cell `(row, j)` with `j > row`, left to right.
    ///
    /// Calling it twice for the same row recomputes and overwrites the same values.
    pub fn compute_row(&self, row: usize) {
        let n = self.matrix.len();
        if row >= n {
            return;
        }

        let series_row = self.series(row);
        let mut guard = self.matrix.rows[row].lock();
        for column in row + 1..n {
            let frequency = self.calculator.frequency(series_row, self.series(column));
            debug!(
                row = %self.matrix.identifiers[row],
                column = %self.matrix.identifiers[column],
                ?frequency,
                "computed pair frequency"
            );
            guard.cells[column] = frequency.value();
        }
        guard.computed = true;
    }

    pub fn best_in_row(&self, row: usize) -> Option<(usize, f64)> {
        self.matrix.best_in_row(row)
    }

    /// [`Self::compute_row`] followed by [`Self::best_in_row`], resolved to identifiers.
    pub fn compute_row_best_match(&self, row: usize) -> Option<RowBestMatch> {
        self.compute_row(row);
        let (column, frequency) = self.best_in_row(row)?;
        Some(RowBestMatch {
            row,
            column,
            identifier: self.matrix.identifiers[row].clone(),
            peer: self.matrix.identifiers[column].clone(),
            frequency,
        })
    }
}
