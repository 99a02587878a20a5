//! Full trading week extraction from an [`AlignedPair`].

use crate::series::AlignedPair;
use chrono::{Datelike, NaiveDate, Weekday};

/// Number of aligned trading days in a full Monday..Friday week.
pub const WEEK_DAYS: usize = 5;

/// Five consecutive aligned entries, Monday first and Friday last.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Week<'a> {
    pub dates: &'a [NaiveDate],
    pub closes_a: &'a [f64; WEEK_DAYS],
    pub closes_b: &'a [f64; WEEK_DAYS],
}

impl Week<'_> {
    pub fn monday(&self) -> NaiveDate {
        self.dates[0]
    }
}

/// Single forward scan over an aligned history yielding non-overlapping full weeks.
///
/// From the current position the scan jumps to the next Monday, then looks for the first
/// Friday after it. The span is a week only when that Friday sits exactly four entries
/// after the Monday. Otherwise the span is dropped and scanning resumes at that Friday.
/// Accepted weeks also resume at their Friday. Running out of Mondays or Fridays ends the
/// scan.
#[derive(Debug, Clone)]
pub struct WeekSegmenter<'a> {
    aligned: &'a AlignedPair,
    cursor: usize,
    done: bool,
}

impl<'a> WeekSegmenter<'a> {
    pub fn new(aligned: &'a AlignedPair) -> Self {
        Self {
            aligned,
            cursor: 0,
            done: false,
        }
    }

    fn next_weekday(&self, from: usize, weekday: Weekday) -> Option<usize> {
        self.aligned.dates[from..]
            .iter()
            .position(|date| date.weekday() == weekday)
            .map(|offset| from + offset)
    }

    fn week_at(&self, monday: usize) -> Option<Week<'a>> {
        let end = monday + WEEK_DAYS;
        let aligned = self.aligned;
        Some(Week {
            dates: &aligned.dates[monday..end],
            closes_a: aligned.closes_a[monday..end].try_into().ok()?,
            closes_b: aligned.closes_b[monday..end].try_into().ok()?,
        })
    }
}

impl<'a> Iterator for WeekSegmenter<'a> {
    type Item = Week<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(monday) = self.next_weekday(self.cursor, Weekday::Mon) else {
                self.done = true;
                break;
            };
            let Some(friday) = self.next_weekday(monday, Weekday::Fri) else {
                self.done = true;
                break;
            };

            self.cursor = friday;
            if friday - monday != WEEK_DAYS - 1 {
                continue;
            }

            match self.week_at(monday) {
                Some(week) => return Some(week),
                None => self.done = true,
            }
        }

        None
    }
}
