//! Snapshot transfer configuration

use super::defaults::*;
use super::{parse_duration_from_env, parse_from_env};
use crate::error::{GraphrepError, GraphrepResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Snapshot transfer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Threads driving snapshot orchestration
    pub worker_threads: usize,

    /// Threads issuing snapshot RPCs
    pub io_threads: usize,

    /// Attempts per batch before the whole transfer fails
    pub send_retry_times: u32,

    /// Timeout of a single send call
    #[serde(with = "humantime_serde")]
    pub send_timeout: Duration,

    /// Pause between attempts of the same batch
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,

    /// Byte threshold at which the row batcher closes a batch
    pub batch_size_bytes: usize,

    /// Optional pacing of batch production, in bytes per second
    pub rate_limit_bytes_per_sec: Option<u64>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_SNAPSHOT_WORKER_THREADS,
            io_threads: DEFAULT_SNAPSHOT_IO_THREADS,
            send_retry_times: DEFAULT_SNAPSHOT_SEND_RETRY_TIMES,
            send_timeout: duration_ms(DEFAULT_SNAPSHOT_SEND_TIMEOUT_MS),
            retry_interval: duration_ms(DEFAULT_SNAPSHOT_RETRY_INTERVAL_MS),
            batch_size_bytes: DEFAULT_SNAPSHOT_BATCH_SIZE_BYTES,
            rate_limit_bytes_per_sec: None,
        }
    }
}

impl SnapshotConfig {
    /// Load snapshot configuration from environment variables
    pub fn from_env() -> GraphrepResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub(crate) fn apply_env(&mut self) -> GraphrepResult<()> {
        if let Some(val) = parse_from_env("GRAPHREP_SNAPSHOT_WORKER_THREADS")? {
            self.worker_threads = val;
        }
        if let Some(val) = parse_from_env("GRAPHREP_SNAPSHOT_IO_THREADS")? {
            self.io_threads = val;
        }
        if let Some(val) = parse_from_env("GRAPHREP_SNAPSHOT_SEND_RETRY_TIMES")? {
            self.send_retry_times = val;
        }
        self.send_timeout =
            parse_duration_from_env("GRAPHREP_SNAPSHOT_SEND_TIMEOUT_MS", self.send_timeout)?;
        self.retry_interval =
            parse_duration_from_env("GRAPHREP_SNAPSHOT_RETRY_INTERVAL_MS", self.retry_interval)?;
        if let Some(val) = parse_from_env("GRAPHREP_SNAPSHOT_BATCH_SIZE_BYTES")? {
            self.batch_size_bytes = val;
        }
        if let Some(val) = parse_from_env("GRAPHREP_SNAPSHOT_RATE_LIMIT_BYTES_PER_SEC")? {
            self.rate_limit_bytes_per_sec = Some(val);
        }
        Ok(())
    }

    /// Validate snapshot configuration
    pub fn validate(&self) -> GraphrepResult<()> {
        if self.worker_threads == 0 {
            return Err(GraphrepError::configuration(
                "snapshot.worker_threads",
                "must be at least 1",
            ));
        }

        if self.io_threads == 0 {
            return Err(GraphrepError::configuration(
                "snapshot.io_threads",
                "must be at least 1",
            ));
        }

        if self.send_retry_times == 0 {
            return Err(GraphrepError::configuration(
                "snapshot.send_retry_times",
                "must be at least 1",
            ));
        }

        if self.send_timeout.is_zero() {
            return Err(GraphrepError::configuration(
                "snapshot.send_timeout",
                "must be non-zero",
            ));
        }

        if self.batch_size_bytes == 0 {
            return Err(GraphrepError::configuration(
                "snapshot.batch_size_bytes",
                "must be non-zero",
            ));
        }

        if self.rate_limit_bytes_per_sec == Some(0) {
            return Err(GraphrepError::configuration(
                "snapshot.rate_limit_bytes_per_sec",
                "must be non-zero when set",
            ));
        }

        Ok(())
    }
}
