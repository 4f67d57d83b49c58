// Common fakes and helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use graphrep_core::chain::{ChainRequest, InternalStorageClient};
use graphrep_core::config::{ChainConfig, SnapshotConfig};
use graphrep_core::error::{GraphrepError, GraphrepResult};
use graphrep_core::leader::LeaderResolver;
use graphrep_core::partition::{PartitionHandle, SnapshotBatch};
use graphrep_core::raft::{SnapshotBatcher, SnapshotManager, SnapshotReceiver};
use graphrep_core::rpc::{
    ChainAddEdgesRequest, ChainDeleteEdgesRequest, ChainUpdateEdgeRequest, ClientManager,
    ErrorCode, ExecResponse, InternalStorageService, PartitionResult, RaftexService,
    SendSnapshotRequest, SendSnapshotResponse, Status, StatusCode, StatusOr,
};
use graphrep_core::runtime::ExecutorPool;
use graphrep_core::types::{GraphSpaceId, HostAddr, PartitionId, TermId, Watermark};
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const PUBLIC_PORT: u16 = 9779;

pub fn host(name: &str) -> HostAddr {
    HostAddr::new(name, PUBLIC_PORT)
}

// ---------------------------------------------------------------------------
// Leader resolution
// ---------------------------------------------------------------------------

/// Answers leader lookups from a script; the last answer repeats.
pub struct ScriptedResolver {
    answers: Mutex<VecDeque<Option<HostAddr>>>,
    lookups: Mutex<usize>,
    changes: Mutex<Vec<(GraphSpaceId, PartitionId, Option<HostAddr>)>>,
}

impl ScriptedResolver {
    pub fn new(answers: Vec<Option<HostAddr>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            lookups: Mutex::new(0),
            changes: Mutex::new(Vec::new()),
        })
    }

    pub fn always(leader: HostAddr) -> Arc<Self> {
        Self::new(vec![Some(leader)])
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock()
    }

    pub fn changes(&self) -> Vec<(GraphSpaceId, PartitionId, Option<HostAddr>)> {
        self.changes.lock().clone()
    }
}

impl LeaderResolver for ScriptedResolver {
    fn leader(&self, space: GraphSpaceId, part: PartitionId) -> GraphrepResult<HostAddr> {
        *self.lookups.lock() += 1;
        let mut answers = self.answers.lock();
        let answer = if answers.len() > 1 {
            answers.pop_front().flatten()
        } else {
            answers.front().cloned().flatten()
        };
        answer.ok_or(GraphrepError::LeaderNotFound { space, part })
    }

    fn leader_changed(&self, space: GraphSpaceId, part: PartitionId, hint: Option<&HostAddr>) {
        self.changes.lock().push((space, part, hint.cloned()));
    }
}

// ---------------------------------------------------------------------------
// Internal storage service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum StorageReply {
    Ok,
    LeaderChanged,
    /// Leader changed, and the refusing host names the new leader.
    LeaderChangedTo(HostAddr),
    FailedPart(ErrorCode),
    Status(StatusCode),
    Transport,
}

/// Records every chained request per host and answers from a script.
/// Once the script runs out every call succeeds.
#[derive(Default)]
pub struct FakeStorage {
    script: Mutex<VecDeque<StorageReply>>,
    calls: Mutex<Vec<(HostAddr, ChainRequest)>>,
}

impl FakeStorage {
    pub fn new(script: Vec<StorageReply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(HostAddr, ChainRequest)> {
        self.calls.lock().clone()
    }

    pub fn hosts(&self) -> Vec<HostAddr> {
        self.calls.lock().iter().map(|(h, _)| h.clone()).collect()
    }

    pub fn clients(self: &Arc<Self>) -> Arc<ClientManager<dyn InternalStorageService>> {
        let storage = self.clone();
        Arc::new(ClientManager::new(move |addr: &HostAddr| {
            Ok(Arc::new(StorageHostClient {
                addr: addr.clone(),
                storage: storage.clone(),
            }) as Arc<dyn InternalStorageService>)
        }))
    }

    fn answer(&self, addr: &HostAddr, req: ChainRequest) -> GraphrepResult<StatusOr<ExecResponse>> {
        let part = match &req {
            ChainRequest::Add(r) => r.parts.keys().next().copied().unwrap_or_default(),
            ChainRequest::Update(r) => r.update_edge_request.part_id,
            ChainRequest::Delete(r) => r.parts.keys().next().copied().unwrap_or_default(),
        };
        self.calls.lock().push((addr.clone(), req));

        let reply = self.script.lock().pop_front().unwrap_or(StorageReply::Ok);
        match reply {
            StorageReply::Ok => Ok(Ok(ExecResponse::succeeded())),
            StorageReply::LeaderChanged => Ok(Err(Status::leader_changed())),
            StorageReply::LeaderChangedTo(leader) => {
                let mut resp = ExecResponse::failed(part, ErrorCode::LeaderChanged);
                resp.result.failed_parts[0] = PartitionResult {
                    code: ErrorCode::LeaderChanged,
                    part_id: part,
                    leader: Some(leader),
                };
                Ok(Ok(resp))
            }
            StorageReply::FailedPart(code) => Ok(Ok(ExecResponse::failed(part, code))),
            StorageReply::Status(code) => Ok(Err(Status::new(code, "scripted"))),
            StorageReply::Transport => Err(GraphrepError::connection(addr.to_string(), "reset")),
        }
    }
}

struct StorageHostClient {
    addr: HostAddr,
    storage: Arc<FakeStorage>,
}

#[async_trait]
impl InternalStorageService for StorageHostClient {
    async fn chain_add_edges(
        &self,
        req: &ChainAddEdgesRequest,
    ) -> GraphrepResult<StatusOr<ExecResponse>> {
        self.storage.answer(&self.addr, ChainRequest::Add(req.clone()))
    }

    async fn chain_update_edge(
        &self,
        req: &ChainUpdateEdgeRequest,
    ) -> GraphrepResult<StatusOr<ExecResponse>> {
        self.storage.answer(&self.addr, ChainRequest::Update(req.clone()))
    }

    async fn chain_delete_edges(
        &self,
        req: &ChainDeleteEdgesRequest,
    ) -> GraphrepResult<StatusOr<ExecResponse>> {
        self.storage.answer(&self.addr, ChainRequest::Delete(req.clone()))
    }
}

/// Chain client running on the test's own runtime.
pub fn chain_client(
    resolver: Arc<dyn LeaderResolver>,
    storage: &Arc<FakeStorage>,
    config: ChainConfig,
) -> InternalStorageClient {
    let io = ExecutorPool::current("chain-io").expect("inside a tokio runtime");
    InternalStorageClient::with_pool(config, resolver, storage.clients(), io)
}

// ---------------------------------------------------------------------------
// Raftex service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum SnapshotReply {
    Deliver,
    Transport,
    /// Applies the batch, then the reply is lost on the way back.
    DeliverReplyLost,
    /// Never answers; only the send timeout ends the call.
    Hang,
    Reject(ErrorCode),
}

/// Destination replica: feeds delivered batches into a `SnapshotReceiver`.
pub struct FakeRaftex {
    script: Mutex<VecDeque<SnapshotReply>>,
    receiver: Mutex<SnapshotReceiver>,
    delivered: Mutex<Vec<SendSnapshotRequest>>,
    calls: Mutex<usize>,
}

impl FakeRaftex {
    pub fn new(space: GraphSpaceId, part: PartitionId, script: Vec<SnapshotReply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            receiver: Mutex::new(SnapshotReceiver::new(space, part, 0)),
            delivered: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        })
    }

    pub fn delivered(&self) -> Vec<SendSnapshotRequest> {
        self.delivered.lock().clone()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    pub fn installed(&self) -> Option<Watermark> {
        self.receiver.lock().installed()
    }

    pub fn received_rows(&self) -> Vec<Vec<u8>> {
        self.receiver.lock().rows().to_vec()
    }

    pub fn clients(self: &Arc<Self>) -> Arc<ClientManager<dyn RaftexService>> {
        let raftex = self.clone();
        Arc::new(ClientManager::new(move |_addr: &HostAddr| {
            Ok(raftex.clone() as Arc<dyn RaftexService>)
        }))
    }
}

#[async_trait]
impl RaftexService for FakeRaftex {
    async fn send_snapshot(
        &self,
        req: &SendSnapshotRequest,
    ) -> GraphrepResult<SendSnapshotResponse> {
        *self.calls.lock() += 1;
        let reply = self.script.lock().pop_front().unwrap_or(SnapshotReply::Deliver);
        match reply {
            SnapshotReply::Deliver => {
                let resp = self.receiver.lock().accept(req);
                self.delivered.lock().push(req.clone());
                Ok(resp)
            }
            SnapshotReply::Transport => Err(GraphrepError::Network("connection reset".to_string())),
            SnapshotReply::DeliverReplyLost => {
                self.receiver.lock().accept(req);
                self.delivered.lock().push(req.clone());
                Err(GraphrepError::Network("reply lost".to_string()))
            }
            SnapshotReply::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            SnapshotReply::Reject(code) => Ok(SendSnapshotResponse::new(code)),
        }
    }
}

pub fn fast_snapshot_config() -> SnapshotConfig {
    SnapshotConfig {
        send_timeout: Duration::from_secs(60),
        retry_interval: Duration::from_secs(1),
        ..SnapshotConfig::default()
    }
}

/// Snapshot manager running on the test's own runtime.
pub fn snapshot_manager(raftex: &Arc<FakeRaftex>) -> SnapshotManager {
    let worker = ExecutorPool::current("snapshot-worker").expect("inside a tokio runtime");
    let io = ExecutorPool::current("snapshot-io").expect("inside a tokio runtime");
    SnapshotManager::with_pools(fast_snapshot_config(), worker, io, raftex.clients())
}

// ---------------------------------------------------------------------------
// Partitions
// ---------------------------------------------------------------------------

/// In-memory partition whose rows are batched by `SnapshotBatcher`.
pub struct VecPartition {
    pub space: GraphSpaceId,
    pub part: PartitionId,
    pub term: TermId,
    pub committed: Watermark,
    pub local: HostAddr,
    pub rows: Vec<(Vec<u8>, Vec<u8>)>,
    pub batch_size: usize,
    /// Scan fails after this many rows.
    pub fail_after: Option<usize>,
    /// Replaces the batcher output when set.
    pub batches: Option<Vec<SnapshotBatch>>,
}

impl VecPartition {
    pub fn new(rows: usize) -> Self {
        Self {
            space: 1,
            part: 3,
            term: 7,
            committed: Watermark::new(120, 7),
            local: HostAddr::new("leader", 9780),
            rows: (0..rows)
                .map(|i| (format!("key-{:03}", i).into_bytes(), vec![b'x'; 16]))
                .collect(),
            batch_size: 64,
            fail_after: None,
            batches: None,
        }
    }
}

impl PartitionHandle for VecPartition {
    fn space_id(&self) -> GraphSpaceId {
        self.space
    }

    fn part_id(&self) -> PartitionId {
        self.part
    }

    fn current_term(&self) -> TermId {
        self.term
    }

    fn last_committed_log_id(&self) -> Watermark {
        self.committed
    }

    fn local_address(&self) -> HostAddr {
        self.local.clone()
    }

    fn snapshot_batches(&self) -> BoxStream<'static, SnapshotBatch> {
        if let Some(batches) = &self.batches {
            return stream::iter(batches.clone()).boxed();
        }

        let mut rows: Vec<GraphrepResult<(Vec<u8>, Vec<u8>)>> =
            self.rows.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fail_after {
            rows.truncate(n);
            rows.push(Err(GraphrepError::internal("lost leadership")));
        }
        let config = SnapshotConfig {
            batch_size_bytes: self.batch_size,
            ..SnapshotConfig::default()
        };
        SnapshotBatcher::from_config(&config).batches(rows)
    }
}
