//! Chained write configuration

use super::defaults::*;
use super::{parse_duration_from_env, parse_from_env};
use crate::error::{GraphrepError, GraphrepResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chained write configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Added to a leader's public port to reach its internal service
    pub internal_port_offset: u16,

    /// Pause before re-resolving the leader after a leader change
    #[serde(with = "humantime_serde")]
    pub leader_change_backoff: Duration,

    /// Timeout of a single chained RPC
    #[serde(with = "humantime_serde")]
    pub rpc_timeout: Duration,

    /// Treat transport failures like leader changes and keep retrying
    pub retry_on_rpc_failure: bool,

    /// Threads running submitted chained writes
    pub io_threads: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            internal_port_offset: DEFAULT_INTERNAL_PORT_OFFSET,
            leader_change_backoff: duration_ms(DEFAULT_LEADER_CHANGE_BACKOFF_MS),
            rpc_timeout: duration_ms(DEFAULT_CHAIN_RPC_TIMEOUT_MS),
            retry_on_rpc_failure: false,
            io_threads: DEFAULT_CHAIN_IO_THREADS,
        }
    }
}

impl ChainConfig {
    /// Load chained write configuration from environment variables
    pub fn from_env() -> GraphrepResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub(crate) fn apply_env(&mut self) -> GraphrepResult<()> {
        if let Some(val) = parse_from_env("GRAPHREP_CHAIN_INTERNAL_PORT_OFFSET")? {
            self.internal_port_offset = val;
        }
        self.leader_change_backoff = parse_duration_from_env(
            "GRAPHREP_CHAIN_LEADER_CHANGE_BACKOFF_MS",
            self.leader_change_backoff,
        )?;
        self.rpc_timeout = parse_duration_from_env("GRAPHREP_CHAIN_RPC_TIMEOUT_MS", self.rpc_timeout)?;
        if let Some(val) = parse_from_env("GRAPHREP_CHAIN_RETRY_ON_RPC_FAILURE")? {
            self.retry_on_rpc_failure = val;
        }
        if let Some(val) = parse_from_env("GRAPHREP_CHAIN_IO_THREADS")? {
            self.io_threads = val;
        }
        Ok(())
    }

    /// Validate chained write configuration
    pub fn validate(&self) -> GraphrepResult<()> {
        if self.rpc_timeout.is_zero() {
            return Err(GraphrepError::configuration(
                "chain.rpc_timeout",
                "must be non-zero",
            ));
        }

        // A zero backoff would spin against a partition mid-election.
        if self.leader_change_backoff.is_zero() {
            return Err(GraphrepError::configuration(
                "chain.leader_change_backoff",
                "must be non-zero",
            ));
        }

        if self.io_threads == 0 {
            return Err(GraphrepError::configuration(
                "chain.io_threads",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}
