//! Per-host client cache
//!
//! Hands out one shared client per destination host, creating it on first
//! use through a caller-supplied factory. Lookups and creation are safe from
//! any number of tasks at once.

use crate::error::GraphrepResult;
use crate::types::HostAddr;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

type ClientFactory<C> = dyn Fn(&HostAddr) -> GraphrepResult<Arc<C>> + Send + Sync;

pub struct ClientManager<C: ?Sized> {
    clients: DashMap<HostAddr, Arc<C>>,
    factory: Box<ClientFactory<C>>,
}

impl<C: ?Sized + Send + Sync> ClientManager<C> {
    pub fn new(
        factory: impl Fn(&HostAddr) -> GraphrepResult<Arc<C>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            clients: DashMap::new(),
            factory: Box::new(factory),
        }
    }

    /// Get the cached client for `addr`, creating it if needed.
    pub fn client(&self, addr: &HostAddr) -> GraphrepResult<Arc<C>> {
        if let Some(client) = self.clients.get(addr) {
            return Ok(client.value().clone());
        }

        let created = (self.factory)(addr)?;
        debug!("Created client for {}", addr);

        // Another task may have raced us here; keep whichever landed first.
        let client = self
            .clients
            .entry(addr.clone())
            .or_insert(created)
            .value()
            .clone();
        Ok(client)
    }

    /// Drop the cached client so the next lookup reconnects.
    pub fn evict(&self, addr: &HostAddr) {
        if self.clients.remove(addr).is_some() {
            debug!("Evicted client for {}", addr);
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
