//! Destination-side bookkeeping for an incoming snapshot

use crate::rpc::{ErrorCode, SendSnapshotRequest, SendSnapshotResponse};
use crate::types::{GraphSpaceId, HostAddr, PartitionId, TermId, Watermark};
use tracing::{debug, info, warn};

/// Accepts the batches of one snapshot transfer for one partition and
/// checks they arrive complete and in order.
#[derive(Debug)]
pub struct SnapshotReceiver {
    space: GraphSpaceId,
    part: PartitionId,
    term: TermId,
    leader: Option<HostAddr>,
    rows: Vec<Vec<u8>>,
    received_size: i64,
    installed: Option<Watermark>,
}

impl SnapshotReceiver {
    /// `term` is the receiving replica's current term.
    pub fn new(space: GraphSpaceId, part: PartitionId, term: TermId) -> Self {
        Self {
            space,
            part,
            term,
            leader: None,
            rows: Vec::new(),
            received_size: 0,
            installed: None,
        }
    }

    /// Validate and absorb one batch.
    ///
    /// Rejects batches for another partition, from a stale term, whose
    /// running totals do not extend what was already received, or that
    /// arrive after the `done` batch.
    pub fn accept(&mut self, req: &SendSnapshotRequest) -> SendSnapshotResponse {
        if req.space != self.space || req.part != self.part {
            warn!(
                "Snapshot batch for space {} part {} sent to space {} part {}",
                req.space, req.part, self.space, self.part
            );
            return SendSnapshotResponse::new(ErrorCode::PartNotFound);
        }

        if req.term < self.term {
            warn!(
                "Snapshot batch from stale term {}, local term {}",
                req.term, self.term
            );
            return SendSnapshotResponse::new(ErrorCode::TermOutOfDate);
        }

        let leader = HostAddr::new(req.leader_addr.clone(), req.leader_port);
        if self.is_resend(req, &leader) {
            // The reply to this batch was lost; the rows are already here.
            debug!("Snapshot batch resent at count {}, acknowledging", req.total_count);
            if req.done && self.installed.is_none() {
                self.install(req);
            }
            return SendSnapshotResponse::new(ErrorCode::Succeeded);
        }

        if self.installed.is_some() {
            warn!("Snapshot batch received after the transfer finished");
            return SendSnapshotResponse::new(ErrorCode::SnapshotOutOfOrder);
        }

        if req.term > self.term || self.leader.is_none() {
            // A newer leader restarts the transfer.
            if !self.rows.is_empty() {
                info!("Restarting snapshot from new leader {} at term {}", leader, req.term);
            }
            self.term = req.term;
            self.leader = Some(leader);
            self.rows.clear();
            self.received_size = 0;
        } else if self.leader.as_ref() != Some(&leader) {
            warn!("Snapshot batch from {} while receiving from {:?}", leader, self.leader);
            return SendSnapshotResponse::new(ErrorCode::SnapshotOutOfOrder);
        }

        let batch_size: i64 = req.rows.iter().map(|r| r.len() as i64).sum();
        let expected_count = self.rows.len() as i64 + req.rows.len() as i64;
        let expected_size = self.received_size + batch_size;
        if req.total_count != expected_count || req.total_size != expected_size {
            warn!(
                "Snapshot totals out of order: got count {} size {}, expected count {} size {}",
                req.total_count, req.total_size, expected_count, expected_size
            );
            return SendSnapshotResponse::new(ErrorCode::SnapshotOutOfOrder);
        }

        self.rows.extend(req.rows.iter().cloned());
        self.received_size = expected_size;
        debug!("Received {} snapshot rows so far", self.rows.len());

        if req.done {
            self.install(req);
        }

        SendSnapshotResponse::new(ErrorCode::Succeeded)
    }

    /// Same leader and term, and the running totals match what is already
    /// held: the batch was applied before.
    fn is_resend(&self, req: &SendSnapshotRequest, leader: &HostAddr) -> bool {
        req.term == self.term
            && self.leader.as_ref() == Some(leader)
            && req.total_count == self.rows.len() as i64
            && req.total_size == self.received_size
    }

    fn install(&mut self, req: &SendSnapshotRequest) {
        let watermark = Watermark::new(req.committed_log_id, req.committed_log_term);
        info!(
            "Snapshot finished, totalCount {}, totalSize {}, committed {}",
            req.total_count, req.total_size, watermark
        );
        self.installed = Some(watermark);
    }

    /// Watermark of the finished transfer, once the `done` batch arrived.
    pub fn installed(&self) -> Option<Watermark> {
        self.installed
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn term(&self) -> TermId {
        self.term
    }
}
