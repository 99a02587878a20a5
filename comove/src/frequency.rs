//! Pair-level reduction of weekly co-movement into a single frequency.

use crate::{
    estimator::CorrelationEstimator,
    series::{Series, SeriesAligner},
    week::{WEEK_DAYS, WeekSegmenter},
};
use serde::{Deserialize, Serialize};

/// Outcome of one pair computation.
///
/// The frequency grid only stores [`PairFrequency::value`], which collapses both undefined
/// variants onto 0.0.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub enum PairFrequency {
    /// Co-moving weeks divided by full weeks.
    Defined(f64),
    /// Fewer than five common trading days.
    InsufficientHistory,
    /// Enough common days, but no full Monday..Friday week among them.
    NoFullWeeks,
}

impl PairFrequency {
    pub fn value(&self) -> f64 {
        match self {
            PairFrequency::Defined(frequency) => *frequency,
            PairFrequency::InsufficientHistory | PairFrequency::NoFullWeeks => 0.0,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, PairFrequency::Defined(_))
    }
}

/// Running counts of full weeks and co-moving weeks for one pair.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct WeekTally {
    pub total_weeks: usize,
    pub co_moving_weeks: usize,
}

impl WeekTally {
    pub fn record(&mut self, co_moving: bool) {
        self.total_weeks += 1;
        if co_moving {
            self.co_moving_weeks += 1;
        }
    }

    pub fn frequency(&self) -> PairFrequency {
        if self.total_weeks == 0 {
            PairFrequency::NoFullWeeks
        } else {
            PairFrequency::Defined(self.co_moving_weeks as f64 / self.total_weeks as f64)
        }
    }
}

/// Aligns two histories, segments them into full weeks and counts co-moving weeks.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PairFrequencyCalculator {
    estimator: CorrelationEstimator,
}

impl PairFrequencyCalculator {
    pub fn new(estimator: CorrelationEstimator) -> Self {
        Self { estimator }
    }

    pub fn tally(&self, a: &Series, b: &Series) -> Option<WeekTally> {
        let aligned = SeriesAligner::align(a, b);
        if aligned.len() < WEEK_DAYS {
            return None;
        }

        let tally = WeekSegmenter::new(&aligned).fold(WeekTally::default(), |mut tally, week| {
            tally.record(self.estimator.is_co_moving(&week));
            tally
        });
        Some(tally)
    }

    pub fn frequency(&self, a: &Series, b: &Series) -> PairFrequency {
        match self.tally(a, b) {
            Some(tally) => tally.frequency(),
            None => PairFrequency::InsufficientHistory,
        }
    }
}
