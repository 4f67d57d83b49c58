//! Contract of a replicated partition as seen by the snapshot engine

use crate::types::{GraphSpaceId, HostAddr, PartitionId, TermId, Watermark};
use futures::stream::BoxStream;

/// Progress marker attached to every snapshot batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    InProgress,
    /// Last batch; nothing follows it.
    Done,
    /// The source gave up, typically because it lost leadership.
    Failed,
}

/// A bounded slice of a partition's rows, with running totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBatch {
    pub rows: Vec<Vec<u8>>,
    /// Rows produced so far, this batch included.
    pub total_count: i64,
    /// Bytes produced so far, this batch included.
    pub total_size: i64,
    pub status: SnapshotStatus,
}

impl SnapshotBatch {
    pub fn failed(total_count: i64, total_size: i64) -> Self {
        Self {
            rows: Vec::new(),
            total_count,
            total_size,
            status: SnapshotStatus::Failed,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// A partition replica the snapshot engine can read from.
///
/// Owned by the consensus layer; the engine only reads it.
pub trait PartitionHandle: Send + Sync {
    fn space_id(&self) -> GraphSpaceId;

    fn part_id(&self) -> PartitionId;

    fn current_term(&self) -> TermId;

    /// Last committed (log id, term) pair.
    fn last_committed_log_id(&self) -> Watermark;

    /// Address followers use to reach this replica.
    fn local_address(&self) -> HostAddr;

    /// All rows of the partition as an ordered stream of batches.
    ///
    /// Batches are produced lazily, so the next one is not read until the
    /// consumer asks for it. The stream ends after a `Done` or `Failed`
    /// batch.
    fn snapshot_batches(&self) -> BoxStream<'static, SnapshotBatch>;

    /// Prefix used in log lines about this partition.
    fn id_str(&self) -> String {
        format!("[Space: {}, Part: {}] ", self.space_id(), self.part_id())
    }
}
