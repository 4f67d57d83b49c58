//! Default configuration values for graphrep
//!
//! This module centralizes all default values to make them easy to find and modify.

use std::time::Duration;

// Snapshot transfer defaults
pub const DEFAULT_SNAPSHOT_WORKER_THREADS: usize = 4;
pub const DEFAULT_SNAPSHOT_IO_THREADS: usize = 4;
pub const DEFAULT_SNAPSHOT_SEND_RETRY_TIMES: u32 = 3;
pub const DEFAULT_SNAPSHOT_SEND_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_SNAPSHOT_RETRY_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_SNAPSHOT_BATCH_SIZE_BYTES: usize = 512 * 1024; // 512KB

// Chained write defaults
pub const DEFAULT_INTERNAL_PORT_OFFSET: u16 = 1;
pub const DEFAULT_LEADER_CHANGE_BACKOFF_MS: u64 = 500;
pub const DEFAULT_CHAIN_RPC_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_CHAIN_IO_THREADS: usize = 4;

// Logging defaults
pub const DEFAULT_LOG_FILTER: &str = "graphrep_core=info";

// Helper functions for Duration creation
pub const fn duration_ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
