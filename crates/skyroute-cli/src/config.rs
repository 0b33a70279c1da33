//! Planner configuration from environment.

use std::env;
use std::path::PathBuf;

use skyroute_core::route_engine::{AIRCRAFT_CORRIDOR_FACTOR, RADIO_CORRIDOR_FACTOR};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding `airports.csv` and `navaids.csv`.
    pub data_dir: PathBuf,
    /// IGRF coefficient file; the built-in model is used when unset.
    pub igrf_file: Option<PathBuf>,
    pub aircraft_corridor: f64,
    pub radio_corridor: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let factor = |key: &str, default: f64| {
            lookup(key)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|f| f.is_finite() && *f > 0.0)
                .unwrap_or(default)
        };
        Self {
            data_dir: lookup("SKYROUTE_DATA_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            igrf_file: lookup("SKYROUTE_IGRF_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            aircraft_corridor: factor("SKYROUTE_AIRCRAFT_CORRIDOR", AIRCRAFT_CORRIDOR_FACTOR),
            radio_corridor: factor("SKYROUTE_RADIO_CORRIDOR", RADIO_CORRIDOR_FACTOR),
        }
    }

    /// Apply a `--data-dir` flag over the environment value.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }
}
