use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `comove`.
///
/// Degenerate numeric inputs never surface here: they collapse to a 0.0 frequency.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum AggregateError {
    #[error("failed to write best match for row {row}: {message}")]
    Sink { row: usize, message: String },

    #[error("completion channel closed after {received} of {expected} rows")]
    Incomplete { received: usize, expected: usize },
}
