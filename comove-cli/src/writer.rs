//! Delimited output for the frequency grid and the best-match report.

use crate::error::WriteError;
use comove::{aggregator::BestMatchSink, matrix::FrequencyGrid, matrix::RowBestMatch};
use std::{fs::File, io::Write, path::Path};

fn format_frequency(value: f64) -> String {
    format!("{value:.4}")
}

/// Header of identifiers, then one row per identifier with its cells at four decimals.
pub fn write_grid<W: Write>(writer: W, grid: &FrequencyGrid) -> Result<(), WriteError> {
    let mut writer = csv::Writer::from_writer(writer);

    let header = std::iter::once("").chain(grid.identifiers.iter().map(|id| id.as_str()));
    writer.write_record(header)?;

    for (identifier, cells) in grid.identifiers.iter().zip(&grid.cells) {
        let row = std::iter::once(identifier.to_string())
            .chain(cells.iter().copied().map(format_frequency));
        writer.write_record(row)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_grid_file(path: &Path, grid: &FrequencyGrid) -> Result<(), WriteError> {
    write_grid(File::create(path)?, grid)
}

/// [`BestMatchSink`] writing `identifier,peer,frequency` records as they arrive.
pub struct CsvBestMatchSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvBestMatchSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, WriteError> {
        self.writer.into_inner().map_err(|error| {
            let error = error.error();
            WriteError::Io(std::io::Error::new(error.kind(), error.to_string()))
        })
    }
}

impl CsvBestMatchSink<File> {
    pub fn create(path: &Path) -> Result<Self, WriteError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> BestMatchSink for CsvBestMatchSink<W> {
    type Error = WriteError;

    fn write(&mut self, best: &RowBestMatch) -> Result<(), Self::Error> {
        self.writer.write_record([
            best.identifier.as_str(),
            best.peer.as_str(),
            format_frequency(best.frequency).as_str(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.writer.flush()?;
        Ok(())
    }
}
