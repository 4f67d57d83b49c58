//! Configuration for graphrep
//!
//! Values come from defaults, an optional TOML file, then `GRAPHREP_*`
//! environment variables, in that order. Everything is validated before use.

use crate::error::{GraphrepError, GraphrepResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub mod chain;
pub mod defaults;
pub mod snapshot;

pub use chain::ChainConfig;
pub use defaults::*;
pub use snapshot::SnapshotConfig;

/// Root configuration structure for graphrep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphrepConfig {
    /// Snapshot transfer configuration
    pub snapshot: SnapshotConfig,

    /// Chained write configuration
    pub chain: ChainConfig,

    /// `tracing` filter directive used by `init_tracing`
    pub log_filter: String,
}

impl Default for GraphrepConfig {
    fn default() -> Self {
        Self {
            snapshot: SnapshotConfig::default(),
            chain: ChainConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl GraphrepConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GraphrepResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> GraphrepResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GraphrepError::configuration(
                "file",
                format!("Failed to read {}: {}", path.display(), e),
            )
        })?;

        let mut config: GraphrepConfig = toml::from_str(&content)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> GraphrepResult<()> {
        if let Ok(filter) = std::env::var("GRAPHREP_LOG_FILTER") {
            self.log_filter = filter;
        }
        self.snapshot.apply_env()?;
        self.chain.apply_env()?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> GraphrepResult<()> {
        self.snapshot.validate()?;
        self.chain.validate()?;
        Ok(())
    }
}

/// Builder for GraphrepConfig
pub struct GraphrepConfigBuilder {
    config: GraphrepConfig,
}

impl GraphrepConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GraphrepConfig::default(),
        }
    }

    pub fn snapshot(mut self, snapshot: SnapshotConfig) -> Self {
        self.config.snapshot = snapshot;
        self
    }

    pub fn chain(mut self, chain: ChainConfig) -> Self {
        self.config.chain = chain;
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn build(self) -> GraphrepResult<GraphrepConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for GraphrepConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an environment variable, `None` when it is unset
pub(crate) fn parse_from_env<T: FromStr>(key: &str) -> GraphrepResult<Option<T>> {
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map(Some)
            .map_err(|_| GraphrepError::configuration(key, format!("Invalid value '{}'", val))),
        Err(_) => Ok(None),
    }
}

/// Parse a millisecond duration from the environment
pub(crate) fn parse_duration_from_env(key: &str, default: Duration) -> GraphrepResult<Duration> {
    Ok(parse_from_env::<u64>(key)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}
