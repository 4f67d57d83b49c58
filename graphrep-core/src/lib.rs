//! Replication and chained-write core of a partitioned graph store.
//!
//! Two engines live here: [`raft::SnapshotManager`] streams a partition's
//! state to a lagging replica, and [`chain::InternalStorageClient`] carries
//! the second half of an edge mutation to the partition that owns it.

pub mod error;
pub mod types;
pub mod config;
pub mod runtime;
pub mod patterns;
pub mod metrics;
pub mod observability;
pub mod rpc;
pub mod partition;
pub mod leader;
pub mod raft;
pub mod chain;

pub use chain::{ChainWrite, InternalStorageClient};
pub use config::GraphrepConfig;
pub use error::{GraphrepError, GraphrepResult};
pub use leader::{LeaderCache, LeaderResolver};
pub use partition::{PartitionHandle, SnapshotBatch, SnapshotStatus};
pub use raft::{SnapshotBatcher, SnapshotManager, SnapshotReceiver};
pub use rpc::ErrorCode;
pub use types::{GraphSpaceId, HostAddr, PartitionId, TermId, Watermark};
