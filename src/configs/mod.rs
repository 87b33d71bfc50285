mod network;
mod pretrain;

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

pub use network::NetworkConfig;
pub use pretrain::{pretrain_from_config, PretrainConfig};

use crate::Result;

/// Every option a pretraining run reads, as a single flat key/value document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub network: NetworkConfig,
    #[serde(flatten)]
    pub pretrain: PretrainConfig,
}

impl Config {
    /// Parses a `Config` out of a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a `Config` from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
