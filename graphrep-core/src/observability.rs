//! Logging setup and span helpers

use crate::error::GraphrepResult;
use crate::types::{GraphSpaceId, PartitionId};
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Initialize tracing; `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) -> GraphrepResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_line_number(true);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}

/// Span for work on one partition
#[inline]
pub fn partition_span(operation: &str, space: GraphSpaceId, part: PartitionId) -> Span {
    tracing::info_span!(
        "partition",
        operation = %operation,
        space = space,
        part = part,
        term = tracing::field::Empty,
    )
}
