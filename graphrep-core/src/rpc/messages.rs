//! Request and response types for the raftex and internal storage services

use crate::rpc::status::ErrorCode;
use crate::types::{GraphSpaceId, HostAddr, LogId, PartitionId, TermId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vertex identifier as stored by the graph engine.
pub type VertexId = String;

/// Identity of one directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub src: VertexId,
    /// Positive for an out-edge, negative for the reversed in-edge.
    pub edge_type: i32,
    pub ranking: i64,
    pub dst: VertexId,
}

impl EdgeKey {
    /// The same edge seen from the other endpoint.
    pub fn reversed(&self) -> EdgeKey {
        EdgeKey {
            src: self.dst.clone(),
            edge_type: -self.edge_type,
            ranking: self.ranking,
            dst: self.src.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEdge {
    pub key: EdgeKey,
    /// Encoded property values, opaque to the replication layer.
    pub props: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedProp {
    pub name: String,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEdgesRequest {
    pub space_id: GraphSpaceId,
    pub parts: BTreeMap<PartitionId, Vec<NewEdge>>,
    pub prop_names: Vec<String>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEdgeRequest {
    pub space_id: GraphSpaceId,
    pub part_id: PartitionId,
    pub edge_key: EdgeKey,
    pub updated_props: Vec<UpdatedProp>,
    pub insertable: bool,
    pub return_props: Vec<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEdgesRequest {
    pub space_id: GraphSpaceId,
    pub parts: BTreeMap<PartitionId, Vec<EdgeKey>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAddEdgesRequest {
    pub space_id: GraphSpaceId,
    pub parts: BTreeMap<PartitionId, Vec<NewEdge>>,
    pub prop_names: Vec<String>,
    pub if_not_exists: bool,
    /// Term under which the source partition accepted the write.
    pub term: TermId,
    pub edge_version: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainUpdateEdgeRequest {
    pub update_edge_request: UpdateEdgeRequest,
    pub term: TermId,
    pub edge_version: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDeleteEdgesRequest {
    pub space_id: GraphSpaceId,
    pub parts: BTreeMap<PartitionId, Vec<EdgeKey>>,
    /// Lets the receiver recognise a resend of a delete it already applied.
    pub txn_id: String,
    pub term: TermId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionResult {
    pub code: ErrorCode,
    pub part_id: PartitionId,
    pub leader: Option<HostAddr>,
}

impl PartitionResult {
    pub fn new(part_id: PartitionId, code: ErrorCode) -> Self {
        Self {
            code,
            part_id,
            leader: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCommon {
    pub failed_parts: Vec<PartitionResult>,
    pub latency_in_us: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResponse {
    pub result: ResponseCommon,
}

impl ExecResponse {
    pub fn succeeded() -> Self {
        Self::default()
    }

    pub fn failed(part_id: PartitionId, code: ErrorCode) -> Self {
        Self {
            result: ResponseCommon {
                failed_parts: vec![PartitionResult::new(part_id, code)],
                latency_in_us: 0,
            },
        }
    }
}

/// One batch of a snapshot transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSnapshotRequest {
    pub space: GraphSpaceId,
    pub part: PartitionId,
    pub term: TermId,
    pub committed_log_id: LogId,
    pub committed_log_term: TermId,
    pub leader_addr: String,
    pub leader_port: u16,
    pub rows: Vec<Vec<u8>>,
    /// Running byte total including this batch.
    pub total_size: i64,
    /// Running row total including this batch.
    pub total_count: i64,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSnapshotResponse {
    pub error_code: ErrorCode,
}

impl SendSnapshotResponse {
    pub fn new(error_code: ErrorCode) -> Self {
        Self { error_code }
    }
}
