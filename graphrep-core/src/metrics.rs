//! Replication metrics for monitoring and debugging

use crate::error::GraphrepResult;
use crate::rpc::ErrorCode;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};
use std::time::Duration;

/// Counters and histograms for chained writes and snapshot transfers
pub struct ReplicationMetrics {
    /// Chained write RPC attempts by mutation kind
    pub chain_attempts: IntCounterVec,
    /// Terminal chained write outcomes by mutation kind and code
    pub chain_outcomes: IntCounterVec,
    /// Retries caused by a leader change
    pub chain_leader_changed_retries: IntCounterVec,
    /// End-to-end latency of chained writes including retries
    pub chain_latency: HistogramVec,

    pub snapshot_batches_sent: IntCounter,
    pub snapshot_bytes_sent: IntCounter,
    pub snapshot_send_retries: IntCounter,
    /// Finished transfers by outcome ("succeeded" / "failed")
    pub snapshot_outcomes: IntCounterVec,
    pub snapshot_duration: Histogram,
}

impl ReplicationMetrics {
    /// Create the metrics and register them in `registry`
    pub fn new(registry: &Registry) -> GraphrepResult<Self> {
        let chain_attempts = IntCounterVec::new(
            Opts::new(
                "graphrep_chain_write_attempts_total",
                "Chained write RPC attempts by mutation kind",
            ),
            &["kind"],
        )?;

        let chain_outcomes = IntCounterVec::new(
            Opts::new(
                "graphrep_chain_write_outcomes_total",
                "Terminal chained write outcomes by mutation kind and error code",
            ),
            &["kind", "code"],
        )?;

        let chain_leader_changed_retries = IntCounterVec::new(
            Opts::new(
                "graphrep_chain_write_leader_changed_retries_total",
                "Chained write retries triggered by a leader change",
            ),
            &["kind"],
        )?;

        let chain_latency = HistogramVec::new(
            HistogramOpts::new(
                "graphrep_chain_write_latency_seconds",
                "Chained write latency including retries",
            ),
            &["kind"],
        )?;

        let snapshot_batches_sent = IntCounter::new(
            "graphrep_snapshot_batches_sent_total",
            "Snapshot batches acknowledged by the destination",
        )?;

        let snapshot_bytes_sent = IntCounter::new(
            "graphrep_snapshot_bytes_sent_total",
            "Snapshot row bytes acknowledged by the destination",
        )?;

        let snapshot_send_retries = IntCounter::new(
            "graphrep_snapshot_send_retries_total",
            "Snapshot batch sends retried after a transport failure",
        )?;

        let snapshot_outcomes = IntCounterVec::new(
            Opts::new(
                "graphrep_snapshot_transfers_total",
                "Finished snapshot transfers by outcome",
            ),
            &["outcome"],
        )?;

        let snapshot_duration = Histogram::with_opts(HistogramOpts::new(
            "graphrep_snapshot_duration_seconds",
            "Duration of whole snapshot transfers",
        ))?;

        registry.register(Box::new(chain_attempts.clone()))?;
        registry.register(Box::new(chain_outcomes.clone()))?;
        registry.register(Box::new(chain_leader_changed_retries.clone()))?;
        registry.register(Box::new(chain_latency.clone()))?;
        registry.register(Box::new(snapshot_batches_sent.clone()))?;
        registry.register(Box::new(snapshot_bytes_sent.clone()))?;
        registry.register(Box::new(snapshot_send_retries.clone()))?;
        registry.register(Box::new(snapshot_outcomes.clone()))?;
        registry.register(Box::new(snapshot_duration.clone()))?;

        Ok(Self {
            chain_attempts,
            chain_outcomes,
            chain_leader_changed_retries,
            chain_latency,
            snapshot_batches_sent,
            snapshot_bytes_sent,
            snapshot_send_retries,
            snapshot_outcomes,
            snapshot_duration,
        })
    }

    pub fn record_chain_attempt(&self, kind: &str) {
        self.chain_attempts.with_label_values(&[kind]).inc();
    }

    pub fn record_chain_leader_changed(&self, kind: &str) {
        self.chain_leader_changed_retries
            .with_label_values(&[kind])
            .inc();
    }

    pub fn record_chain_outcome(&self, kind: &str, code: ErrorCode, duration: Duration) {
        self.chain_outcomes
            .with_label_values(&[kind, code.as_str()])
            .inc();
        self.chain_latency
            .with_label_values(&[kind])
            .observe(duration.as_secs_f64());
    }

    pub fn record_snapshot_batch(&self, bytes: u64) {
        self.snapshot_batches_sent.inc();
        self.snapshot_bytes_sent.inc_by(bytes);
    }

    pub fn record_snapshot_outcome(&self, succeeded: bool, duration: Duration) {
        let outcome = if succeeded { "succeeded" } else { "failed" };
        self.snapshot_outcomes.with_label_values(&[outcome]).inc();
        self.snapshot_duration.observe(duration.as_secs_f64());
    }
}
