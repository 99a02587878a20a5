//! Weekly correlation on L2-normalised closes.

use crate::week::{WEEK_DAYS, Week};

/// Default co-movement cutoff. A week counts only when its correlation is strictly above it.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Sample variance below which a normalised week is treated as flat.
pub const MIN_VARIANCE: f64 = 1e-10;

/// Classifies one full week of two aligned close series as co-moving or not.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CorrelationEstimator {
    threshold: f64,
}

impl CorrelationEstimator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sample Pearson correlation of the two weekly vectors after each is divided by its
    /// Euclidean norm.
    ///
    /// Degenerate weeks (a zero-norm vector, or a variance under [`MIN_VARIANCE`]) yield 0.0.
    pub fn correlation(a: &[f64; WEEK_DAYS], b: &[f64; WEEK_DAYS]) -> f64 {
        let (Some(a), Some(b)) = (normalise(a), normalise(b)) else {
            return 0.0;
        };

        let n = WEEK_DAYS as f64;
        let mean_a = a.iter().sum::<f64>() / n;
        let mean_b = b.iter().sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var_a = 0.0;
        let mut var_b = 0.0;
        for (x, y) in a.iter().zip(b.iter()) {
            let diff_a = x - mean_a;
            let diff_b = y - mean_b;
            cov += diff_a * diff_b;
            var_a += diff_a * diff_a;
            var_b += diff_b * diff_b;
        }

        let var_a = var_a / (n - 1.0);
        let var_b = var_b / (n - 1.0);

        // Flat weeks leave only rounding noise in the deviations
        if var_a < MIN_VARIANCE || var_b < MIN_VARIANCE {
            return 0.0;
        }

        cov / (n - 1.0) / var_a.sqrt() / var_b.sqrt()
    }

    pub fn is_co_moving_correlation(&self, correlation: f64) -> bool {
        correlation > self.threshold
    }

    pub fn is_co_moving(&self, week: &Week<'_>) -> bool {
        self.is_co_moving_correlation(Self::correlation(week.closes_a, week.closes_b))
    }
}

impl Default for CorrelationEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

fn normalise(closes: &[f64; WEEK_DAYS]) -> Option<[f64; WEEK_DAYS]> {
    let norm = closes.iter().map(|close| close * close).sum::<f64>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    Some(closes.map(|close| close / norm))
}
