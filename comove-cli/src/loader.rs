//! Roster and daily-bar loading from comma-delimited files.

use crate::error::LoadError;
use chrono::NaiveDate;
use comove::series::{Identifier, PricePoint, Series, SeriesStore};
use fnv::FnvHashSet;
use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};
use tracing::{debug, warn};

/// Date layout of the first daily-bar column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Zero-based column holding the daily close.
pub const CLOSE_COLUMN: usize = 3;

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Ordered, duplicate-free identifiers from the first column of each roster record.
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<Identifier>, LoadError> {
    let mut seen = FnvHashSet::default();
    let mut identifiers = Vec::new();

    for record in csv_reader(reader).records() {
        let record = record?;
        let Some(name) = record.get(0).filter(|name| !name.is_empty()) else {
            continue;
        };

        let identifier = Identifier::new(name);
        if !seen.insert(identifier.clone()) {
            warn!(%identifier, "duplicate roster identifier dropped");
            continue;
        }
        identifiers.push(identifier);
    }

    Ok(identifiers)
}

pub fn load_roster(path: &Path) -> Result<Vec<Identifier>, LoadError> {
    let file = File::open(path).map_err(|error| LoadError::Roster {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;
    read_roster(file)
}

/// Parses `date,…,…,close` records into an ascending series.
///
/// Records that cannot be decoded, or whose date or close does not parse (including header
/// lines), are skipped. Rows are sorted by date and later duplicates of a date are dropped.
pub fn read_series<R: Read>(reader: R) -> Result<Series, LoadError> {
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for record in csv_reader(reader).records() {
        let record = match record {
            Ok(record) => record,
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                debug!(%error, "skipped undecodable daily bar");
                skipped += 1;
                continue;
            }
        };
        let date = record
            .get(0)
            .and_then(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).ok());
        let close = record
            .get(CLOSE_COLUMN)
            .and_then(|close| close.parse::<f64>().ok());

        match (date, close) {
            (Some(date), Some(close)) => points.push(PricePoint::new(date, close)),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "skipped unparseable daily bars");
    }

    points.sort_by_key(|point| point.date);
    points.dedup_by_key(|point| point.date);
    Ok(Series::new(points))
}

/// Loads `<dir>/<identifier>.csv`. A missing file yields an empty series.
pub fn load_series(dir: &Path, identifier: &Identifier) -> Result<Series, LoadError> {
    let path = dir.join(format!("{identifier}.csv"));
    match File::open(&path) {
        Ok(file) => read_series(file),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            warn!(%identifier, path = %path.display(), "daily bars not found, using empty series");
            Ok(Series::default())
        }
        Err(error) => Err(LoadError::Series {
            identifier: identifier.to_string(),
            message: error.to_string(),
        }),
    }
}

/// Loads every roster identifier into a [`SeriesStore`].
///
/// A file that fails part way through is logged and treated as empty so one bad file
/// cannot abort the run.
pub fn load_store(dir: &Path, identifiers: &[Identifier]) -> SeriesStore {
    identifiers
        .iter()
        .map(|identifier| {
            let series = load_series(dir, identifier).unwrap_or_else(|error| {
                warn!(%identifier, %error, "failed to load daily bars, using empty series");
                Series::default()
            });
            debug!(%identifier, days = series.len(), "loaded daily bars");
            (identifier.clone(), series)
        })
        .collect()
}
