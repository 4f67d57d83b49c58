//! Fixed-size executor pools
//!
//! Snapshot orchestration, snapshot I/O and chained writes each run on their
//! own named pool, built once per process and shared by every operation.

use crate::error::{GraphrepError, GraphrepResult};
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::info;

pub struct ExecutorPool {
    name: String,
    handle: Handle,
    // Present only when this pool owns its threads.
    runtime: Option<Runtime>,
}

impl ExecutorPool {
    /// Start a dedicated multi-thread pool with `threads` workers.
    pub fn build(name: impl Into<String>, threads: usize) -> GraphrepResult<Self> {
        let name = name.into();
        if threads == 0 {
            return Err(GraphrepError::configuration(
                name,
                "executor pool needs at least one thread",
            ));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(threads)
            .thread_name(name.clone())
            .enable_all()
            .build()?;
        info!("Started executor pool {} with {} threads", name, threads);

        Ok(Self {
            name,
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    /// Borrow an existing runtime instead of starting threads.
    pub fn from_handle(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            handle,
            runtime: None,
        }
    }

    /// Borrow the runtime the caller is running on.
    pub fn current(name: impl Into<String>) -> GraphrepResult<Self> {
        let handle = Handle::try_current()
            .map_err(|e| GraphrepError::internal(format!("No tokio runtime: {}", e)))?;
        Ok(Self::from_handle(name, handle))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

impl Drop for ExecutorPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            // Safe to call from inside another runtime, unlike a plain drop.
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for ExecutorPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorPool")
            .field("name", &self.name)
            .field("owned", &self.runtime.is_some())
            .finish()
    }
}
