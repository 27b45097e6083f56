//! Configuration for stepstore

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Maximum characters per chunk
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Number of builds remembered
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_max_chunk_size() -> usize {
    crate::DEFAULT_MAX_CHUNK_SIZE
}

fn default_history_capacity() -> usize {
    crate::DEFAULT_HISTORY_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("stepstore").join("config.yml")),
            Some(PathBuf::from("stepstore.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }
}
