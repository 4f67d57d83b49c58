//! Outcome codes and their translation at the RPC boundary

use crate::error::GraphrepError;
use crate::rpc::messages::ExecResponse;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// Closed set of outcomes carried across the storage RPC boundary.
///
/// Only `LeaderChanged` is retried by the chained-write path; every other
/// code is terminal there and handed back to the caller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    Succeeded,
    // Transport
    RpcFailure,
    // Routing
    LeaderChanged,
    SpaceNotFound,
    PartNotFound,
    InvalidPeer,
    // Consensus
    ConsensusError,
    TermOutOfDate,
    // Snapshot
    SnapshotOutOfOrder,
    // Data
    KeyNotFound,
    EdgeNotFound,
    DataConflict,
    WriteWriteConflict,
    OutdatedLock,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Succeeded => "SUCCEEDED",
            ErrorCode::RpcFailure => "E_RPC_FAILURE",
            ErrorCode::LeaderChanged => "E_LEADER_CHANGED",
            ErrorCode::SpaceNotFound => "E_SPACE_NOT_FOUND",
            ErrorCode::PartNotFound => "E_PART_NOT_FOUND",
            ErrorCode::InvalidPeer => "E_INVALID_PEER",
            ErrorCode::ConsensusError => "E_CONSENSUS_ERROR",
            ErrorCode::TermOutOfDate => "E_TERM_OUT_OF_DATE",
            ErrorCode::SnapshotOutOfOrder => "E_SNAPSHOT_OUT_OF_ORDER",
            ErrorCode::KeyNotFound => "E_KEY_NOT_FOUND",
            ErrorCode::EdgeNotFound => "E_EDGE_NOT_FOUND",
            ErrorCode::DataConflict => "E_DATA_CONFLICT_ERROR",
            ErrorCode::WriteWriteConflict => "E_WRITE_WRITE_CONFLICT",
            ErrorCode::OutdatedLock => "E_OUTDATED_LOCK",
            ErrorCode::Unknown => "E_UNKNOWN",
        }
    }

    pub fn is_succeeded(&self) -> bool {
        *self == ErrorCode::Succeeded
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&GraphrepError> for ErrorCode {
    fn from(err: &GraphrepError) -> Self {
        match err {
            GraphrepError::LeaderNotFound { .. } => ErrorCode::SpaceNotFound,
            GraphrepError::SnapshotRejected { code, .. } => *code,
            _ => ErrorCode::RpcFailure,
        }
    }
}

/// Status kinds a storage service may answer with instead of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    LeaderChanged,
    SpaceNotFound,
    PartNotFound,
    NotSupported,
    Balanced,
    Error,
}

/// Application-level status returned in place of a response value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn leader_changed() -> Self {
        Self::new(StatusCode::LeaderChanged, "Leader changed")
    }
}

/// A response value or the application status that replaced it.
pub type StatusOr<T> = Result<T, Status>;

/// Collapse the result of a chained-write RPC into a single code.
///
/// - no value (transport failure) -> `RpcFailure`
/// - a `LeaderChanged` status -> `LeaderChanged`
/// - any other status -> `Unknown`, logged
/// - a response with failed parts -> the first failed part's code
/// - otherwise `Succeeded`
pub fn decode_response(result: &Result<StatusOr<ExecResponse>, GraphrepError>) -> ErrorCode {
    let response = match result {
        Err(e) => {
            error!(error = %e, "Chained write RPC failed");
            return ErrorCode::RpcFailure;
        }
        Ok(Err(status)) => return translate_status(status),
        Ok(Ok(response)) => response,
    };

    response
        .result
        .failed_parts
        .first()
        .map(|failed| failed.code)
        .unwrap_or(ErrorCode::Succeeded)
}

fn translate_status(status: &Status) -> ErrorCode {
    match status.code {
        StatusCode::LeaderChanged => ErrorCode::LeaderChanged,
        StatusCode::SpaceNotFound
        | StatusCode::PartNotFound
        | StatusCode::NotSupported
        | StatusCode::Balanced
        | StatusCode::Error => {
            warn!(code = ?status.code, message = %status.message, "Unmapped status code");
            ErrorCode::Unknown
        }
    }
}
