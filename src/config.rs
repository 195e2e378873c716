//! Indexer configuration.
//!
//! Loaded from a TOML file; any field left out takes its default. The CLI
//! layers its flags over whatever the file provides.

use crate::core::classifier::CategoryConfig;
use crate::core::environment::Environment;
use crate::core::scanner::ScanConfig;
use crate::error::ConfigError;
use crate::events::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything needed to run a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Directories to index. Empty means the platform defaults.
    pub roots: Vec<PathBuf>,
    /// Database file. `None` means the platform default.
    pub database: Option<PathBuf>,
    /// Fingerprint worker threads (0 = available parallelism)
    pub worker_threads: usize,
    /// Capacity of the progress event channel
    pub event_capacity: usize,
    pub follow_symlinks: bool,
    pub categories: CategoryConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            database: None,
            worker_threads: 0,
            event_capacity: DEFAULT_CAPACITY,
            follow_symlinks: false,
            categories: CategoryConfig::default(),
        }
    }
}

impl IndexerConfig {
    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&raw).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse and validate TOML text
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: IndexerConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.categories.any_enabled() {
            return Err(ConfigError::Invalid(
                "at least one category must be enabled".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Fill unset roots and database from the environment
    pub fn resolve_defaults(mut self, env: &dyn Environment) -> Self {
        if self.roots.is_empty() {
            self.roots = env.default_roots();
        }
        if self.database.is_none() {
            self.database = Some(env.default_database());
        }
        self
    }

    /// Database path, falling back to the environment default
    pub fn database_path(&self, env: &dyn Environment) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| env.default_database())
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            follow_symlinks: self.follow_symlinks,
            worker_threads: self.worker_threads,
        }
    }
}
