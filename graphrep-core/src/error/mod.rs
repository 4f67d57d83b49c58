//! Error handling for graphrep
//!
//! Two failure surfaces exist side by side:
//!
//! - [`GraphrepError`] for local problems and transport failures (a call
//!   that produced no value, a timeout, bad configuration);
//! - [`ErrorCode`](crate::rpc::ErrorCode) for the outcome a remote peer
//!   reported. Chained writes always resolve to an `ErrorCode`; transport
//!   errors fold into `ErrorCode::RpcFailure` at the decode boundary.

pub mod constructors;
pub mod conversions;
pub mod types;

#[cfg(test)]
mod tests;

pub use types::{GraphrepError, GraphrepResult};
