//! Constructor methods and classification helpers for GraphrepError

use super::types::GraphrepError;

impl GraphrepError {
    /// Create a configuration error with component and message
    ///
    /// # Examples
    /// ```rust
    /// use graphrep_core::error::GraphrepError;
    ///
    /// let err = GraphrepError::configuration("snapshot.send_retry_times", "must be at least 1");
    /// assert!(err.to_string().contains("snapshot.send_retry_times"));
    /// ```
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        GraphrepError::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn connection(address: impl Into<String>, details: impl Into<String>) -> Self {
        GraphrepError::Connection {
            address: address.into(),
            details: details.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, duration: std::time::Duration) -> Self {
        GraphrepError::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        GraphrepError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        GraphrepError::Internal {
            message: message.into(),
        }
    }

    /// Whether the error came from the transport and a resend may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GraphrepError::Connection { .. }
                | GraphrepError::Timeout { .. }
                | GraphrepError::Network(_)
                | GraphrepError::TemporaryFailure { .. }
        )
    }
}
