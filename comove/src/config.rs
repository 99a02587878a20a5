use crate::{estimator::DEFAULT_THRESHOLD, scheduler::DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};

/// Tunable knobs of a run.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ComoveConfig {
    /// Maximum number of rows computed concurrently.
    pub capacity: usize,
    /// A week co-moves when its correlation is strictly above this value.
    pub threshold: f64,
}

impl Default for ComoveConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ComoveConfig::default();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.threshold, 0.7);
    }
}
