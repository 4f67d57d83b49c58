//! Retry and backoff patterns for handling transient failures
//!
//! Bounded retry of a single async operation. The chained-write path does
//! its own unbounded loop; this is for operations with a fixed attempt
//! budget, such as sending one snapshot batch.

use crate::error::{GraphrepError, GraphrepResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff strategy for retry operations
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
}

impl BackoffStrategy {
    /// Calculate the delay for a given attempt
    pub fn delay(&self, _attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(duration) => *duration,
        }
    }
}

/// Configuration for retry operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial attempt)
    pub max_attempts: u32,
    /// Backoff strategy to use
    pub backoff: BackoffStrategy,
    /// Function to determine if an error is retryable
    pub is_retryable: fn(&GraphrepError) -> bool,
    /// Per-operation identifier for logs
    pub operation_name: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Fixed(Duration::from_secs(1)),
            is_retryable: GraphrepError::is_transient,
            operation_name: None,
        }
    }
}

impl RetryConfig {
    /// Create a simple fixed delay retry config
    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: attempts,
            backoff: BackoffStrategy::Fixed(delay),
            ..Default::default()
        }
    }

    /// Set operation name for better observability
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Set the retryable error checker
    pub fn with_retryable(mut self, f: fn(&GraphrepError) -> bool) -> Self {
        self.is_retryable = f;
        self
    }
}

/// Outcome of a bounded retry that ran out of attempts or hit a
/// non-retryable error.
#[derive(Debug)]
pub struct RetryError {
    /// Attempts made, including the failed last one
    pub attempts: u32,
    pub error: GraphrepError,
}

/// Retry an async operation with the given configuration
///
/// `on_retry` runs before each sleep with the attempt number that failed.
pub async fn retry<F, T>(
    config: RetryConfig,
    mut operation: F,
    mut on_retry: impl FnMut(u32, &GraphrepError),
) -> Result<T, RetryError>
where
    F: FnMut() -> Pin<Box<dyn Future<Output = GraphrepResult<T>> + Send>>,
{
    let operation_name = config.operation_name.as_deref().unwrap_or("operation");
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded after {} attempts", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(error) => {
                if !(config.is_retryable)(&error) {
                    debug!("{} failed with non-retryable error: {}", operation_name, error);
                    return Err(RetryError { attempts: attempt, error });
                }

                if attempt >= config.max_attempts {
                    warn!(
                        "{} failed, max retry attempts ({}) reached: {}",
                        operation_name, config.max_attempts, error
                    );
                    return Err(RetryError { attempts: attempt, error });
                }

                let delay = config.backoff.delay(attempt);
                warn!(
                    "Retry attempt {}/{} for {} after error: {} (waiting {:?})",
                    attempt, config.max_attempts, operation_name, error, delay
                );
                on_retry(attempt, &error);

                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_successful_on_first_attempt() {
        let config = RetryConfig::fixed(3, Duration::from_millis(10));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry(
            config,
            move || {
                let count = counter_clone.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move { Ok(count) })
            },
            |_, _| {},
        )
        .await
        .unwrap();

        assert_eq!(result, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_failure() {
        let config = RetryConfig::fixed(3, Duration::from_secs(1));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let mut retries = Vec::new();

        let start = tokio::time::Instant::now();
        let result = retry(
            config,
            move || {
                let count = counter_clone.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if count < 2 {
                        Err(GraphrepError::Network("Temporary failure".to_string()))
                    } else {
                        Ok(count)
                    }
                })
            },
            |attempt, _| retries.push(attempt),
        )
        .await
        .unwrap();

        assert_eq!(result, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(retries, vec![1, 2]);
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_max_attempts_exceeded() {
        let config = RetryConfig::fixed(2, Duration::from_millis(10));

        let result = retry(
            config,
            move || {
                Box::pin(async move {
                    Err::<(), _>(GraphrepError::Network("Always fails".to_string()))
                })
            },
            |_, _| {},
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 2);
        assert!(matches!(err.error, GraphrepError::Network(_)));
    }

    #[tokio::test]
    async fn test_non_retryable_error() {
        let config = RetryConfig::fixed(3, Duration::from_millis(10));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry(
            config,
            move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    Err::<(), _>(GraphrepError::invalid_request("term", "negative"))
                })
            },
            |_, _| {},
        )
        .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_delays() {
        let fixed = BackoffStrategy::Fixed(Duration::from_secs(1));
        assert_eq!(fixed.delay(1), Duration::from_secs(1));
        assert_eq!(fixed.delay(3), Duration::from_secs(1));

        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff.delay(2), Duration::from_secs(1));
        assert!((config.is_retryable)(&GraphrepError::Network("reset".to_string())));
    }
}
