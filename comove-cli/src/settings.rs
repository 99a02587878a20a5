//! Environment-driven run settings.

use comove::config::ComoveConfig;
use std::{path::PathBuf, str::FromStr};
use tracing::warn;

pub const DEFAULT_DATA_DIR: &str = "./stockdata/";
pub const DEFAULT_ROSTER_FILE: &str = "stocklist.csv";
pub const DEFAULT_GRID_OUTPUT: &str = "corr.csv";
pub const DEFAULT_BEST_OUTPUT: &str = "maxcorr.csv";

/// Input and output locations plus the engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub roster: PathBuf,
    pub grid_output: PathBuf,
    pub best_output: PathBuf,
    pub config: ComoveConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            roster: data_dir.join(DEFAULT_ROSTER_FILE),
            data_dir,
            grid_output: PathBuf::from(DEFAULT_GRID_OUTPUT),
            best_output: PathBuf::from(DEFAULT_BEST_OUTPUT),
            config: ComoveConfig::default(),
        }
    }
}

impl Settings {
    /// Reads `COMOVE_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to defaults for missing or
    /// unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("COMOVE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let roster = lookup("COMOVE_ROSTER")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_ROSTER_FILE));

        Self {
            roster,
            data_dir,
            grid_output: lookup("COMOVE_GRID_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.grid_output),
            best_output: lookup("COMOVE_BEST_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.best_output),
            config: ComoveConfig {
                capacity: parse_or(&lookup, "COMOVE_CAPACITY", defaults.config.capacity),
                threshold: parse_or(&lookup, "COMOVE_THRESHOLD", defaults.config.threshold),
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, ?default, "unparseable setting, using default");
            default
        }),
    }
}
