//! Daily close series and pairwise date alignment.
//!
//! A [`Series`] is the chronological close history of one security. Two series are merged
//! into an [`AlignedPair`] holding only the dates both sides traded.

use chrono::NaiveDate;
use derive_more::{Display, From};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Unique key naming one security. Roster order fixes its matrix index.
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display, From,
)]
pub struct Identifier(pub SmolStr);

impl Identifier {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self(SmolStr::new(name))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One trading day: calendar date and closing price.
///
/// Zero or negative closes are accepted as-is.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Chronologically ascending closes for one identifier.
///
/// Ordering is a precondition owned by whoever builds the series; it is not re-checked here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<PricePoint> for Series {
    fn from_iter<T: IntoIterator<Item = PricePoint>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Read-only accessor the engine uses to fetch each identifier's history.
///
/// Returning `None` means the history could not be located; the engine treats it as an
/// empty series.
pub trait SeriesSource: Send + Sync {
    fn series(&self, identifier: &Identifier) -> Option<&Series>;
}

/// In-memory [`SeriesSource`] loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: FnvHashMap<Identifier, Series>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: Identifier, series: Series) -> Option<Series> {
        self.series.insert(identifier, series)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl SeriesSource for SeriesStore {
    fn series(&self, identifier: &Identifier) -> Option<&Series> {
        self.series.get(identifier)
    }
}

impl FromIterator<(Identifier, Series)> for SeriesStore {
    fn from_iter<T: IntoIterator<Item = (Identifier, Series)>>(iter: T) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

/// Common-date history of two series: three parallel sequences of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPair {
    pub dates: Vec<NaiveDate>,
    pub closes_a: Vec<f64>,
    pub closes_b: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Two-pointer merge of two ascending series, keeping dates present on both sides.
#[derive(Debug, Copy, Clone, Default)]
pub struct SeriesAligner;

impl SeriesAligner {
    pub fn align(a: &Series, b: &Series) -> AlignedPair {
        let (a, b) = (a.points(), b.points());
        let capacity = a.len().min(b.len());
        let mut aligned = AlignedPair {
            dates: Vec::with_capacity(capacity),
            closes_a: Vec::with_capacity(capacity),
            closes_b: Vec::with_capacity(capacity),
        };

        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].date.cmp(&b[j].date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    aligned.dates.push(a[i].date);
                    aligned.closes_a.push(a[i].close);
                    aligned.closes_b.push(b[j].close);
                    i += 1;
                    j += 1;
                }
            }
        }

        aligned
    }
}
