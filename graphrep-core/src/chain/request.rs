//! Chained write payloads and the chain requests built from them

use crate::error::GraphrepResult;
use crate::rpc::{
    AddEdgesRequest, ChainAddEdgesRequest, ChainDeleteEdgesRequest, ChainUpdateEdgeRequest,
    DeleteEdgesRequest, ExecResponse, InternalStorageService, StatusOr, UpdateEdgeRequest,
};
use crate::types::{GraphSpaceId, PartitionId, TermId};

pub fn make_chain_add_request(
    req: &AddEdgesRequest,
    term: TermId,
    version: Option<i64>,
) -> ChainAddEdgesRequest {
    ChainAddEdgesRequest {
        space_id: req.space_id,
        parts: req.parts.clone(),
        prop_names: req.prop_names.clone(),
        if_not_exists: req.if_not_exists,
        term,
        edge_version: version,
    }
}

pub fn make_chain_update_request(
    req: &UpdateEdgeRequest,
    term: TermId,
    version: Option<i64>,
) -> ChainUpdateEdgeRequest {
    ChainUpdateEdgeRequest {
        update_edge_request: req.clone(),
        term,
        edge_version: version,
    }
}

pub fn make_chain_delete_request(
    req: &DeleteEdgesRequest,
    txn_id: &str,
    term: TermId,
) -> ChainDeleteEdgesRequest {
    ChainDeleteEdgesRequest {
        space_id: req.space_id,
        parts: req.parts.clone(),
        txn_id: txn_id.to_string(),
        term,
    }
}

/// A locally applied edge mutation that still has to reach the partition
/// holding the other half of the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainWrite {
    Add {
        req: AddEdgesRequest,
        term: TermId,
        version: Option<i64>,
    },
    Update {
        req: UpdateEdgeRequest,
        term: TermId,
        version: Option<i64>,
    },
    Delete {
        req: DeleteEdgesRequest,
        txn_id: String,
        term: TermId,
    },
}

impl ChainWrite {
    pub fn space_id(&self) -> GraphSpaceId {
        match self {
            ChainWrite::Add { req, .. } => req.space_id,
            ChainWrite::Update { req, .. } => req.space_id,
            ChainWrite::Delete { req, .. } => req.space_id,
        }
    }

    /// Partition the write is sent to: the first entry of the per-partition
    /// map, or the update's own partition. `None` if the map is empty.
    pub fn dest_part(&self) -> Option<PartitionId> {
        match self {
            ChainWrite::Add { req, .. } => req.parts.keys().next().copied(),
            ChainWrite::Update { req, .. } => Some(req.part_id),
            ChainWrite::Delete { req, .. } => req.parts.keys().next().copied(),
        }
    }

    pub fn term(&self) -> TermId {
        match self {
            ChainWrite::Add { term, .. }
            | ChainWrite::Update { term, .. }
            | ChainWrite::Delete { term, .. } => *term,
        }
    }

    /// Label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ChainWrite::Add { .. } => "add",
            ChainWrite::Update { .. } => "update",
            ChainWrite::Delete { .. } => "delete",
        }
    }

    /// Build a fresh chain request from the stored payload.
    pub fn to_request(&self) -> ChainRequest {
        match self {
            ChainWrite::Add { req, term, version } => {
                ChainRequest::Add(make_chain_add_request(req, *term, *version))
            }
            ChainWrite::Update { req, term, version } => {
                ChainRequest::Update(make_chain_update_request(req, *term, *version))
            }
            ChainWrite::Delete { req, txn_id, term } => {
                ChainRequest::Delete(make_chain_delete_request(req, txn_id, *term))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainRequest {
    Add(ChainAddEdgesRequest),
    Update(ChainUpdateEdgeRequest),
    Delete(ChainDeleteEdgesRequest),
}

impl ChainRequest {
    pub async fn send(
        &self,
        client: &dyn InternalStorageService,
    ) -> GraphrepResult<StatusOr<ExecResponse>> {
        match self {
            ChainRequest::Add(req) => client.chain_add_edges(req).await,
            ChainRequest::Update(req) => client.chain_update_edge(req).await,
            ChainRequest::Delete(req) => client.chain_delete_edges(req).await,
        }
    }
}
