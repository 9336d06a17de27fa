// Run configuration for the `namegen` binary.
//
// `CliConfig` holds every setting a run needs. It can come from a JSON file
// (`--config PATH`); any field the file leaves out takes its default, and any
// flag given on the command line overrides the file. See `main.rs` for the
// merge.
//
// Example file:
//
//   {
//     "preset": "fantasy",
//     "count": 10,
//     "seed": 2024,
//     "capacity": 32,
//     "retries": 3,
//     "dictionary": "my_fragments.json"
//   }

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CliError;

pub const DEFAULT_COUNT: usize = 1;
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Pattern text. Takes precedence over `preset` when both are set.
    pub pattern: Option<String>,
    /// Name of a bundled preset pattern.
    pub preset: Option<String>,
    /// Number of names to print.
    pub count: usize,
    /// 64-bit seed, expanded to the generator's 32-bit state. A fresh random
    /// seed is drawn when absent.
    pub seed: Option<u64>,
    /// Output buffer size in bytes, including the terminator.
    pub capacity: usize,
    /// Extra attempts per name while the result is truncated.
    pub retries: u32,
    /// Fragment dictionary JSON; the bundled dictionary when absent.
    pub dictionary: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            pattern: None,
            preset: None,
            count: DEFAULT_COUNT,
            seed: None,
            capacity: DEFAULT_CAPACITY,
            retries: 0,
            dictionary: None,
        }
    }
}

impl CliConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json).map_err(|source| CliError::ConfigJson {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
