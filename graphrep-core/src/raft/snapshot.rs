//! Snapshot transfer to a lagging or new replica
//!
//! Streams a partition's full state to one destination host in ordered
//! batches and reports the committed (log id, term) watermark the
//! destination can resume log replication from.

use crate::config::SnapshotConfig;
use crate::error::{GraphrepError, GraphrepResult};
use crate::metrics::ReplicationMetrics;
use crate::observability::partition_span;
use crate::partition::{PartitionHandle, SnapshotStatus};
use crate::patterns::{retry, RetryConfig};
use crate::rpc::{ClientManager, RaftexService, SendSnapshotRequest, SendSnapshotResponse};
use crate::runtime::ExecutorPool;
use crate::types::{HostAddr, Watermark};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, info, warn, Instrument};

/// Drives snapshot transfers on a dedicated worker pool, issuing the RPCs
/// on a separate I/O pool.
pub struct SnapshotManager {
    config: SnapshotConfig,
    worker: ExecutorPool,
    io: Arc<ExecutorPool>,
    clients: Arc<ClientManager<dyn RaftexService>>,
    metrics: Option<Arc<ReplicationMetrics>>,
}

impl SnapshotManager {
    /// Start the worker and I/O pools sized by `config`.
    pub fn new(
        config: SnapshotConfig,
        clients: Arc<ClientManager<dyn RaftexService>>,
    ) -> GraphrepResult<Self> {
        config.validate()?;
        let worker = ExecutorPool::build("snapshot-worker", config.worker_threads)?;
        let io = ExecutorPool::build("snapshot-io", config.io_threads)?;
        Ok(Self::with_pools(config, worker, io, clients))
    }

    pub fn with_pools(
        config: SnapshotConfig,
        worker: ExecutorPool,
        io: ExecutorPool,
        clients: Arc<ClientManager<dyn RaftexService>>,
    ) -> Self {
        Self {
            config,
            worker,
            io: Arc::new(io),
            clients,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<ReplicationMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Send the full state of `part` to `dst`.
    ///
    /// Resolves once with the watermark captured when the transfer started,
    /// or with the error that ended it. The partition handle stays alive
    /// until then.
    pub fn send_snapshot(
        &self,
        part: Arc<dyn PartitionHandle>,
        dst: HostAddr,
    ) -> BoxFuture<'static, GraphrepResult<Watermark>> {
        let (tx, rx) = oneshot::channel();
        let span = partition_span("send_snapshot", part.space_id(), part.part_id());
        let transfer = SnapshotTransfer {
            part,
            dst,
            config: self.config.clone(),
            io: self.io.clone(),
            clients: self.clients.clone(),
            metrics: self.metrics.clone(),
        };

        self.worker.spawn(
            async move {
                let result = transfer.run().await;
                if tx.send(result).is_err() {
                    debug!("Snapshot caller went away before completion");
                }
            }
            .instrument(span),
        );

        async move { rx.await? }.boxed()
    }
}

struct SnapshotTransfer {
    part: Arc<dyn PartitionHandle>,
    dst: HostAddr,
    config: SnapshotConfig,
    io: Arc<ExecutorPool>,
    clients: Arc<ClientManager<dyn RaftexService>>,
    metrics: Option<Arc<ReplicationMetrics>>,
}

impl SnapshotTransfer {
    async fn run(self) -> GraphrepResult<Watermark> {
        let started = Instant::now();
        let result = self.transfer().await;
        if let Some(metrics) = &self.metrics {
            metrics.record_snapshot_outcome(result.is_ok(), started.elapsed());
        }
        result
    }

    async fn transfer(&self) -> GraphrepResult<Watermark> {
        let space = self.part.space_id();
        let part_id = self.part.part_id();
        let id_str = self.part.id_str();
        let term = self.part.current_term();
        // Entries committed after this point are not covered; log
        // replication re-applies them once the snapshot is installed.
        let committed = self.part.last_committed_log_id();
        let local = self.part.local_address();
        tracing::Span::current().record("term", term);

        info!(
            "{}Begin to send the snapshot to the host {}, commitLogId = {}, commitLogTerm = {}",
            id_str, self.dst, committed.log_id, committed.term
        );

        let mut batches = self.part.snapshot_batches();
        while let Some(batch) = batches.next().await {
            let done = match batch.status {
                SnapshotStatus::Failed => {
                    info!("{}Snapshot send failed, the leader changed?", id_str);
                    return Err(GraphrepError::SnapshotFailed {
                        space,
                        part: part_id,
                        reason: "source stopped producing rows".to_string(),
                    });
                }
                SnapshotStatus::Done => true,
                SnapshotStatus::InProgress => false,
            };

            let batch_bytes = batch.byte_len() as u64;
            let (total_count, total_size) = (batch.total_count, batch.total_size);
            let req = Arc::new(SendSnapshotRequest {
                space,
                part: part_id,
                term,
                committed_log_id: committed.log_id,
                committed_log_term: committed.term,
                leader_addr: local.host.clone(),
                leader_port: local.port,
                rows: batch.rows,
                total_size,
                total_count,
                done,
            });

            let resp = self.send_batch(req).await?;
            if !resp.error_code.is_succeeded() {
                info!(
                    "{}Sending snapshot failed, we don't retry anymore! The error code is {}",
                    id_str, resp.error_code
                );
                return Err(GraphrepError::SnapshotRejected {
                    space,
                    part: part_id,
                    code: resp.error_code,
                });
            }

            if let Some(metrics) = &self.metrics {
                metrics.record_snapshot_batch(batch_bytes);
            }
            debug!("{}has sent count {}", id_str, total_count);

            if done {
                info!(
                    "{}Finished, totalCount {}, totalSize {}",
                    id_str, total_count, total_size
                );
                return Ok(committed);
            }
        }

        warn!("{}Snapshot batches ended without a done batch", id_str);
        Err(GraphrepError::SnapshotFailed {
            space,
            part: part_id,
            reason: "batch stream ended before completion".to_string(),
        })
    }

    /// Send one batch, retrying transport failures within the configured
    /// attempt budget. Any response, successful or not, ends the retries.
    async fn send_batch(
        &self,
        req: Arc<SendSnapshotRequest>,
    ) -> GraphrepResult<SendSnapshotResponse> {
        let retry_config =
            RetryConfig::fixed(self.config.send_retry_times, self.config.retry_interval)
                .with_operation_name(format!("send_snapshot to {}", self.dst))
                .with_retryable(|_| true);

        let (space, part) = (req.space, req.part);
        let timeout = self.config.send_timeout;
        let dst = self.dst.clone();
        let clients = self.clients.clone();
        let io = self.io.clone();
        let metrics = self.metrics.clone();

        let result = retry(
            retry_config,
            move || {
                let req = req.clone();
                let dst = dst.clone();
                let clients = clients.clone();
                let io = io.clone();
                Box::pin(async move {
                    debug!("Send snapshot request to {}", dst);
                    let client = clients.client(&dst)?;
                    let call = io.spawn(async move {
                        tokio::time::timeout(timeout, client.send_snapshot(&req)).await
                    });

                    let result = match call.await? {
                        Ok(result) => result,
                        Err(_) => Err(GraphrepError::timeout("send_snapshot", timeout)),
                    };
                    if result.is_err() {
                        clients.evict(&dst);
                    }
                    result
                })
            },
            |_, _| {
                if let Some(metrics) = &metrics {
                    metrics.snapshot_send_retries.inc();
                }
            },
        )
        .await;

        result.map_err(|e| GraphrepError::SnapshotSend {
            space,
            part,
            attempts: e.attempts,
            source: Box::new(e.error),
        })
    }
}
