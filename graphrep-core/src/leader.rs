//! Leader lookup for (space, partition) pairs
//!
//! Answers are hints. The remote call's error code is the only authority on
//! whether the contacted host is really the leader.

use crate::error::{GraphrepError, GraphrepResult};
use crate::types::{GraphSpaceId, HostAddr, PartitionId};
use dashmap::DashMap;
use tracing::debug;

pub trait LeaderResolver: Send + Sync {
    /// Current leader of the partition, on its public port.
    fn leader(&self, space: GraphSpaceId, part: PartitionId) -> GraphrepResult<HostAddr>;

    /// The leader returned earlier refused a request as not leader.
    /// `hint` is the new leader if the refusing host named one.
    fn leader_changed(
        &self,
        _space: GraphSpaceId,
        _part: PartitionId,
        _hint: Option<&HostAddr>,
    ) {
    }
}

/// Leader table fed by metadata updates and leader-change hints.
#[derive(Debug, Default)]
pub struct LeaderCache {
    leaders: DashMap<(GraphSpaceId, PartitionId), HostAddr>,
}

impl LeaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, space: GraphSpaceId, part: PartitionId, leader: HostAddr) {
        debug!("Leader of space {} part {} is now {}", space, part, leader);
        self.leaders.insert((space, part), leader);
    }

    pub fn len(&self) -> usize {
        self.leaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaders.is_empty()
    }
}

impl LeaderResolver for LeaderCache {
    fn leader(&self, space: GraphSpaceId, part: PartitionId) -> GraphrepResult<HostAddr> {
        self.leaders
            .get(&(space, part))
            .map(|entry| entry.value().clone())
            .ok_or(GraphrepError::LeaderNotFound { space, part })
    }

    fn leader_changed(&self, space: GraphSpaceId, part: PartitionId, hint: Option<&HostAddr>) {
        // Without a hint the stale entry stays until metadata replaces it.
        if let Some(leader) = hint {
            self.update(space, part, leader.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_partition_has_no_leader() {
        let cache = LeaderCache::new();
        assert!(matches!(
            cache.leader(1, 1),
            Err(GraphrepError::LeaderNotFound { space: 1, part: 1 })
        ));
    }

    #[test]
    fn test_update_and_leader_change_hint() {
        let cache = LeaderCache::new();
        cache.update(1, 2, HostAddr::new("a", 9779));
        assert_eq!(cache.leader(1, 2).unwrap(), HostAddr::new("a", 9779));

        cache.update(1, 2, HostAddr::new("b", 9779));
        assert_eq!(cache.leader(1, 2).unwrap(), HostAddr::new("b", 9779));

        cache.leader_changed(1, 2, None);
        assert_eq!(cache.leader(1, 2).unwrap(), HostAddr::new("b", 9779));

        cache.leader_changed(1, 2, Some(&HostAddr::new("c", 9779)));
        assert_eq!(cache.leader(1, 2).unwrap(), HostAddr::new("c", 9779));
        assert_eq!(cache.len(), 1);
    }
}
