//! Client-side service contracts
//!
//! Implementations wrap a concrete transport. An `Err` from any method
//! means the call produced no value (connection lost, peer crashed); an
//! application-level refusal travels inside the `Ok` value instead.

use crate::error::GraphrepResult;
use crate::rpc::messages::{
    ChainAddEdgesRequest, ChainDeleteEdgesRequest, ChainUpdateEdgeRequest, ExecResponse,
    SendSnapshotRequest, SendSnapshotResponse,
};
use crate::rpc::status::StatusOr;
use async_trait::async_trait;

/// Replication service of a partition peer.
#[async_trait]
pub trait RaftexService: Send + Sync {
    async fn send_snapshot(&self, req: &SendSnapshotRequest) -> GraphrepResult<SendSnapshotResponse>;
}

/// Storage service reachable on a host's internal port.
#[async_trait]
pub trait InternalStorageService: Send + Sync {
    async fn chain_add_edges(
        &self,
        req: &ChainAddEdgesRequest,
    ) -> GraphrepResult<StatusOr<ExecResponse>>;

    async fn chain_update_edge(
        &self,
        req: &ChainUpdateEdgeRequest,
    ) -> GraphrepResult<StatusOr<ExecResponse>>;

    async fn chain_delete_edges(
        &self,
        req: &ChainDeleteEdgesRequest,
    ) -> GraphrepResult<StatusOr<ExecResponse>>;
}
