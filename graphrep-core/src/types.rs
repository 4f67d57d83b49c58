//! Identifiers, addresses and log positions shared by the snapshot and
//! chained-write paths

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a graph space.
pub type GraphSpaceId = i32;

/// Identifier of a partition within a graph space.
pub type PartitionId = i32;

/// Leadership epoch of a partition; never decreases.
pub type TermId = i64;

/// Position in a partition's replicated log.
pub type LogId = i64;

/// Network address of a storage host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostAddr {
    pub host: String,
    pub port: u16,
}

impl HostAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The same host with `offset` added to the port.
    ///
    /// Internal replication services listen next to the public service on a
    /// derived port. Returns `None` when the sum leaves the port range.
    pub fn with_port_offset(&self, offset: u16) -> Option<HostAddr> {
        self.port.checked_add(offset).map(|port| HostAddr {
            host: self.host.clone(),
            port,
        })
    }
}

impl fmt::Display for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\":{}", self.host, self.port)
    }
}

/// A (log id, term) pair up to which a partition's state is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Watermark {
    pub log_id: LogId,
    pub term: TermId,
}

impl Watermark {
    pub fn new(log_id: LogId, term: TermId) -> Self {
        Self { log_id, term }
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(log {}, term {})", self.log_id, self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_offset() {
        let addr = HostAddr::new("storaged0", 9779);
        assert_eq!(addr.with_port_offset(1), Some(HostAddr::new("storaged0", 9780)));
        assert_eq!(addr.with_port_offset(0), Some(addr.clone()));
    }

    #[test]
    fn test_port_offset_overflow() {
        let addr = HostAddr::new("storaged0", u16::MAX);
        assert_eq!(addr.with_port_offset(1), None);
    }

    #[test]
    fn test_watermark_ordering() {
        assert!(Watermark::new(10, 2) < Watermark::new(11, 2));
        assert!(Watermark::new(10, 2) < Watermark::new(10, 3));
    }
}
