//! Error conversion implementations for GraphrepError

use super::types::GraphrepError;

// Async/Task error conversions
impl From<tokio::task::JoinError> for GraphrepError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            GraphrepError::Internal {
                message: "Task was cancelled".to_string(),
            }
        } else if err.is_panic() {
            GraphrepError::Internal {
                message: "Task panicked".to_string(),
            }
        } else {
            GraphrepError::Internal {
                message: format!("Task join failed: {}", err),
            }
        }
    }
}

impl From<tokio::time::error::Elapsed> for GraphrepError {
    fn from(_err: tokio::time::error::Elapsed) -> Self {
        GraphrepError::Timeout {
            operation: "async_operation".to_string(),
            duration: std::time::Duration::from_secs(0), // Duration not available from Elapsed
        }
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for GraphrepError {
    fn from(err: tokio::sync::oneshot::error::RecvError) -> Self {
        GraphrepError::Internal {
            message: format!("Channel receive failed: {}", err),
        }
    }
}

// Configuration error conversions
impl From<toml::de::Error> for GraphrepError {
    fn from(err: toml::de::Error) -> Self {
        GraphrepError::Configuration {
            component: "toml".to_string(),
            message: err.to_string(),
        }
    }
}

// Tracing error conversions
impl From<tracing_subscriber::util::TryInitError> for GraphrepError {
    fn from(err: tracing_subscriber::util::TryInitError) -> Self {
        GraphrepError::Configuration {
            component: "tracing".to_string(),
            message: format!("Failed to set global tracing subscriber: {}", err),
        }
    }
}
