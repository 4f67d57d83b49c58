//! Client side of chained edge writes
//!
//! Sends a locally applied mutation to the leader of the partition holding
//! the other half of the edge, following leader changes until the write is
//! acknowledged or refused for good.

use crate::chain::request::ChainWrite;
use crate::config::ChainConfig;
use crate::error::{GraphrepError, GraphrepResult};
use crate::leader::LeaderResolver;
use crate::metrics::ReplicationMetrics;
use crate::observability::partition_span;
use crate::rpc::{
    decode_response, AddEdgesRequest, ClientManager, DeleteEdgesRequest, ErrorCode,
    InternalStorageService, UpdateEdgeRequest,
};
use crate::runtime::ExecutorPool;
use crate::types::{GraphSpaceId, HostAddr, PartitionId, TermId};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn, Instrument};

/// Coordinator for chained writes.
///
/// Every write runs as its own task on the chain I/O pool and keeps at most
/// one RPC in flight. Leader changes are retried without limit.
pub struct InternalStorageClient {
    runner: Arc<ChainRunner>,
    io: ExecutorPool,
}

#[derive(Clone)]
struct ChainRunner {
    resolver: Arc<dyn LeaderResolver>,
    clients: Arc<ClientManager<dyn InternalStorageService>>,
    config: ChainConfig,
    metrics: Option<Arc<ReplicationMetrics>>,
}

impl InternalStorageClient {
    /// Start a dedicated "chain-io" pool sized by `config`.
    pub fn new(
        config: ChainConfig,
        resolver: Arc<dyn LeaderResolver>,
        clients: Arc<ClientManager<dyn InternalStorageService>>,
    ) -> GraphrepResult<Self> {
        config.validate()?;
        let io = ExecutorPool::build("chain-io", config.io_threads)?;
        Ok(Self::with_pool(config, resolver, clients, io))
    }

    pub fn with_pool(
        config: ChainConfig,
        resolver: Arc<dyn LeaderResolver>,
        clients: Arc<ClientManager<dyn InternalStorageService>>,
        io: ExecutorPool,
    ) -> Self {
        Self {
            runner: Arc::new(ChainRunner {
                resolver,
                clients,
                config,
                metrics: None,
            }),
            io,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<ReplicationMetrics>) -> Self {
        let mut runner = (*self.runner).clone();
        runner.metrics = Some(metrics);
        self.runner = Arc::new(runner);
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.runner.config
    }

    /// Chain an edge insert to the partition named first in `req.parts`.
    pub fn chain_add_edges(
        &self,
        req: &AddEdgesRequest,
        term: TermId,
        version: Option<i64>,
    ) -> BoxFuture<'static, ErrorCode> {
        self.completion(ChainWrite::Add {
            req: req.clone(),
            term,
            version,
        })
    }

    pub fn chain_update_edge(
        &self,
        req: &UpdateEdgeRequest,
        term: TermId,
        version: Option<i64>,
    ) -> BoxFuture<'static, ErrorCode> {
        self.completion(ChainWrite::Update {
            req: req.clone(),
            term,
            version,
        })
    }

    /// Chain an edge delete. `txn_id` is sent unchanged on every retry.
    pub fn chain_delete_edges(
        &self,
        req: &DeleteEdgesRequest,
        txn_id: &str,
        term: TermId,
    ) -> BoxFuture<'static, ErrorCode> {
        self.completion(ChainWrite::Delete {
            req: req.clone(),
            txn_id: txn_id.to_string(),
            term,
        })
    }

    /// Run `write` in the background and resolve `done` with its outcome.
    pub fn submit(&self, write: ChainWrite, done: oneshot::Sender<ErrorCode>) {
        let runner = self.runner.clone();
        self.io.spawn(async move {
            let code = runner.execute(write).await;
            if done.send(code).is_err() {
                debug!("Chained write caller went away before completion");
            }
        });
    }

    fn completion(&self, write: ChainWrite) -> BoxFuture<'static, ErrorCode> {
        let (tx, rx) = oneshot::channel();
        self.submit(write, tx);
        async move {
            match rx.await {
                Ok(code) => code,
                Err(_) => {
                    error!("Chained write task ended without an outcome");
                    ErrorCode::RpcFailure
                }
            }
        }
        .boxed()
    }
}

impl ChainRunner {
    async fn execute(&self, write: ChainWrite) -> ErrorCode {
        let started = Instant::now();
        let space = write.space_id();
        let code = match write.dest_part() {
            Some(part) => {
                self.run(&write, space, part)
                    .instrument(partition_span(write.kind(), space, part))
                    .await
            }
            None => {
                warn!("Chained {} for space {} names no partition", write.kind(), space);
                ErrorCode::PartNotFound
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_chain_outcome(write.kind(), code, started.elapsed());
        }
        code
    }

    async fn run(&self, write: &ChainWrite, space: GraphSpaceId, part: PartitionId) -> ErrorCode {
        let kind = write.kind();
        tracing::Span::current().record("term", write.term());

        let mut attempt: u32 = 0;
        let mut last_error: Option<ErrorCode> = None;
        loop {
            attempt += 1;
            if let Some(prev) = last_error {
                info!("Retry chained {}, attempt {} after {}", kind, attempt, prev);
            }

            let (code, leader_hint) = self.attempt(write, space, part).await;
            let retry = match code {
                ErrorCode::LeaderChanged => true,
                ErrorCode::RpcFailure => self.config.retry_on_rpc_failure,
                _ => false,
            };
            if !retry {
                return code;
            }

            if code == ErrorCode::LeaderChanged {
                self.resolver.leader_changed(space, part, leader_hint.as_ref());
                if let Some(metrics) = &self.metrics {
                    metrics.record_chain_leader_changed(kind);
                }
            }
            last_error = Some(code);
            tokio::time::sleep(self.config.leader_change_backoff).await;
        }
    }

    /// One resolve-and-send round. Also returns the new leader if the
    /// refusing host named one.
    async fn attempt(
        &self,
        write: &ChainWrite,
        space: GraphSpaceId,
        part: PartitionId,
    ) -> (ErrorCode, Option<HostAddr>) {
        let leader = match self.resolver.leader(space, part) {
            Ok(leader) => leader,
            Err(e) => {
                warn!("No leader for space {} part {}: {}", space, part, e);
                return (ErrorCode::SpaceNotFound, None);
            }
        };

        let Some(dst) = leader.with_port_offset(self.config.internal_port_offset) else {
            warn!(
                "Leader {} has no internal port at offset {}",
                leader, self.config.internal_port_offset
            );
            return (ErrorCode::InvalidPeer, None);
        };

        let client = match self.clients.client(&dst) {
            Ok(client) => client,
            Err(e) => {
                warn!("No client for {}: {}", dst, e);
                return (ErrorCode::RpcFailure, None);
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_chain_attempt(write.kind());
        }
        debug!("Send chained {} to {}", write.kind(), dst);

        let req = write.to_request();
        let timeout = self.config.rpc_timeout;
        let result = match tokio::time::timeout(timeout, req.send(client.as_ref())).await {
            Ok(result) => result,
            Err(_) => Err(GraphrepError::timeout(
                format!("chained {} to {}", write.kind(), dst),
                timeout,
            )),
        };
        if result.is_err() {
            self.clients.evict(&dst);
        }

        let leader_hint = match &result {
            Ok(Ok(resp)) => resp
                .result
                .failed_parts
                .first()
                .and_then(|failed| failed.leader.clone()),
            _ => None,
        };
        (decode_response(&result), leader_hint)
    }
}
