//! Row batching for snapshot streams
//!
//! Turns an ordered scan of a partition's key/value pairs into the batch
//! stream a [`PartitionHandle`](crate::partition::PartitionHandle) hands to
//! the snapshot engine.

use crate::config::SnapshotConfig;
use crate::error::{GraphrepError, GraphrepResult};
use crate::partition::{SnapshotBatch, SnapshotStatus};
use futures::stream::{self, BoxStream, StreamExt};
use std::iter::Peekable;
use std::time::Duration;
use tracing::warn;

const ROW_KEY_LEN_BYTES: usize = std::mem::size_of::<u32>();

/// Frame one key/value pair as a snapshot row: key length (u32 LE), key, value.
pub fn encode_row(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut row = Vec::with_capacity(ROW_KEY_LEN_BYTES + key.len() + value.len());
    row.extend_from_slice(&(key.len() as u32).to_le_bytes());
    row.extend_from_slice(key);
    row.extend_from_slice(value);
    row
}

/// Split a snapshot row back into key and value.
pub fn decode_row(row: &[u8]) -> GraphrepResult<(&[u8], &[u8])> {
    if row.len() < ROW_KEY_LEN_BYTES {
        return Err(GraphrepError::invalid_request(
            "rows",
            format!("row of {} bytes has no key length", row.len()),
        ));
    }

    let mut len_bytes = [0u8; ROW_KEY_LEN_BYTES];
    len_bytes.copy_from_slice(&row[..ROW_KEY_LEN_BYTES]);
    let key_len = u32::from_le_bytes(len_bytes) as usize;

    let rest = &row[ROW_KEY_LEN_BYTES..];
    if key_len > rest.len() {
        return Err(GraphrepError::invalid_request(
            "rows",
            format!("key length {} exceeds row payload {}", key_len, rest.len()),
        ));
    }
    Ok(rest.split_at(key_len))
}

/// Groups rows into batches of roughly `batch_size_bytes`.
#[derive(Debug, Clone)]
pub struct SnapshotBatcher {
    batch_size_bytes: usize,
    rate_limit_bytes_per_sec: Option<u64>,
}

struct BatchState<I: Iterator> {
    rows: Peekable<I>,
    total_count: i64,
    total_size: i64,
    finished: bool,
}

impl SnapshotBatcher {
    pub fn new(batch_size_bytes: usize) -> Self {
        Self {
            batch_size_bytes: batch_size_bytes.max(1),
            rate_limit_bytes_per_sec: None,
        }
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(config.batch_size_bytes).with_rate_limit(config.rate_limit_bytes_per_sec)
    }

    /// Pace batch production to about `bytes_per_sec`.
    pub fn with_rate_limit(mut self, bytes_per_sec: Option<u64>) -> Self {
        self.rate_limit_bytes_per_sec = bytes_per_sec.filter(|rate| *rate > 0);
        self
    }

    /// Batch an ordered row scan.
    ///
    /// A batch is closed once it reaches the byte threshold, so only the last
    /// batch can be smaller. The last batch is `Done`; an empty scan yields a
    /// single empty `Done` batch. A scan error yields a `Failed` batch and
    /// ends the stream.
    pub fn batches<I>(&self, rows: I) -> BoxStream<'static, SnapshotBatch>
    where
        I: IntoIterator<Item = GraphrepResult<(Vec<u8>, Vec<u8>)>>,
        I::IntoIter: Send + 'static,
    {
        let limit = self.batch_size_bytes;
        let rate = self.rate_limit_bytes_per_sec;
        let state = BatchState {
            rows: rows.into_iter().peekable(),
            total_count: 0,
            total_size: 0,
            finished: false,
        };

        stream::unfold(state, move |mut st| async move {
            if st.finished {
                return None;
            }

            let mut rows = Vec::new();
            let mut batch_bytes = 0usize;
            while batch_bytes < limit {
                match st.rows.next() {
                    None => break,
                    Some(Err(e)) => {
                        warn!("Snapshot scan failed after {} rows: {}", st.total_count, e);
                        st.finished = true;
                        let failed = SnapshotBatch::failed(st.total_count, st.total_size);
                        return Some((failed, st));
                    }
                    Some(Ok((key, value))) => {
                        let row = encode_row(&key, &value);
                        batch_bytes += row.len();
                        st.total_count += 1;
                        st.total_size += row.len() as i64;
                        rows.push(row);
                    }
                }
            }

            let done = st.rows.peek().is_none();
            st.finished = done;

            if let Some(rate) = rate {
                let pause = Duration::from_secs_f64(batch_bytes as f64 / rate as f64);
                tokio::time::sleep(pause).await;
            }

            let batch = SnapshotBatch {
                rows,
                total_count: st.total_count,
                total_size: st.total_size,
                status: if done {
                    SnapshotStatus::Done
                } else {
                    SnapshotStatus::InProgress
                },
            };
            Some((batch, st))
        })
        .boxed()
    }
}
