//! Configuration structures for a pipeline run.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main configuration for apfeed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory locations.
    pub paths: PathConfig,

    /// Output batch naming.
    pub batch: BatchConfig,
}

/// Filesystem locations used by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Root containing `inbox/`, `todo/`, `outbox/`, `success/` and `failure/`.
    pub root: Option<PathBuf>,

    /// Root of the downstream system; batches are delivered to its `inbox/`.
    pub destination: Option<PathBuf>,

    /// Debug log file.
    pub log: Option<PathBuf>,

    /// Error report file (stderr when unset).
    pub report: Option<PathBuf>,
}

/// Batch file naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Fixed file name prefix.
    pub prefix: String,

    /// strftime pattern of the timestamp following the prefix.
    pub timestamp_format: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            prefix: "ALMA_SAP".to_string(),
            timestamp_format: "%Y-%m-%d-%H%M%S".to_string(),
        }
    }
}

impl BatchConfig {
    /// Batch file name for a run started at `started`.
    pub fn file_name(&self, started: NaiveDateTime) -> String {
        format!("{}_{}", self.prefix, started.format(&self.timestamp_format))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() || self.prefix.contains(['/', '\\']) {
            return Err(ConfigError::Parse(format!(
                "invalid batch prefix {:?}",
                self.prefix
            )));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Parse(format!(
                "invalid batch timestamp format {:?}",
                self.timestamp_format
            )));
        }
        Ok(())
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub root: PathBuf,
    pub destination: PathBuf,
    pub log: PathBuf,
    pub report: Option<PathBuf>,
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that every required setting is present.
    pub fn resolve(&self) -> Result<RunConfig, ConfigError> {
        let root = self.paths.root.clone().ok_or(ConfigError::MissingPath("root"))?;
        let destination = self
            .paths
            .destination
            .clone()
            .ok_or(ConfigError::MissingPath("destination"))?;
        let log = self.paths.log.clone().ok_or(ConfigError::MissingPath("log"))?;
        self.batch.validate()?;

        Ok(RunConfig {
            root,
            destination,
            log,
            report: self.paths.report.clone(),
            batch: self.batch.clone(),
        })
    }
}
