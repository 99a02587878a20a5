use thiserror::Error;

/// Failures reading the roster or daily-bar files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open roster {path}: {message}")]
    Roster { path: String, message: String },

    #[error("failed to open daily bars for {identifier}: {message}")]
    Series { identifier: String, message: String },

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures writing the grid or best-match report.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
}
