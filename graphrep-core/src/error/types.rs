//! Core error types for graphrep
//!
//! `GraphrepError` covers local and transport failures. The outcome of a
//! remote mutation travels as an [`ErrorCode`](crate::rpc::ErrorCode)
//! instead, so nothing here is ever put on the wire.

use crate::rpc::ErrorCode;
use crate::types::{GraphSpaceId, PartitionId};
use thiserror::Error;

/// Error type for graphrep operations
///
/// # Error Categories
///
/// - **Transport Errors**: connection, timeout and network failures that a
///   caller may retry
/// - **Replication Errors**: snapshot transfers that were aborted or rejected
/// - **Routing Errors**: leader lookups that could not be answered
/// - **Logic Errors**: configuration and request validation
#[derive(Error, Debug)]
pub enum GraphrepError {
    // Configuration Errors
    #[error("Configuration error in {component}: {message}")]
    Configuration { component: String, message: String },

    // Transport Errors
    #[error("Connection error to {address}: {details}")]
    Connection { address: String, details: String },

    #[error("Operation timed out: {operation} after {duration:?}")]
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Temporary failure: {details}")]
    TemporaryFailure { details: String },

    // Routing Errors
    #[error("No leader known for space {space}, part {part}")]
    LeaderNotFound {
        space: GraphSpaceId,
        part: PartitionId,
    },

    // Replication Errors
    #[error("Snapshot of space {space}, part {part} failed: {reason}")]
    SnapshotFailed {
        space: GraphSpaceId,
        part: PartitionId,
        reason: String,
    },

    #[error("Snapshot of space {space}, part {part} rejected by destination with {code}")]
    SnapshotRejected {
        space: GraphSpaceId,
        part: PartitionId,
        code: ErrorCode,
    },

    #[error("Sending snapshot batch of space {space}, part {part} failed after {attempts} attempts")]
    SnapshotSend {
        space: GraphSpaceId,
        part: PartitionId,
        attempts: u32,
        #[source]
        source: Box<GraphrepError>,
    },

    // Request Errors
    #[error("Invalid request field {field}: {message}")]
    InvalidRequest { field: String, message: String },

    // IO & Metrics Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    // Internal Errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type GraphrepResult<T> = std::result::Result<T, GraphrepError>;
