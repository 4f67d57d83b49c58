//! Shared patterns for graphrep

pub mod retry;

pub use retry::{retry, BackoffStrategy, RetryConfig, RetryError};
