//! RPC plumbing shared by the snapshot and chained-write paths
//!
//! - `messages` - wire request/response types
//! - `status` - outcome codes and response decoding
//! - `service` - client-side service contracts
//! - `client_manager` - per-host client cache

pub mod client_manager;
pub mod messages;
pub mod service;
pub mod status;

pub use client_manager::ClientManager;
pub use messages::*;
pub use service::{InternalStorageService, RaftexService};
pub use status::{decode_response, ErrorCode, Status, StatusCode, StatusOr};
