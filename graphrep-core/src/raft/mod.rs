//! Snapshot transfer between partition replicas
//!
//! - `batcher` - turns a row scan into a batch stream
//! - `snapshot` - sends the stream to one destination
//! - `receiver` - checks incoming batches on the destination

pub mod batcher;
pub mod receiver;
pub mod snapshot;

pub use batcher::{decode_row, encode_row, SnapshotBatcher};
pub use receiver::SnapshotReceiver;
pub use snapshot::SnapshotManager;
