//! Tests for error conversions
//!
//! Checks that the `?` operator works with the async primitives the
//! replication paths use.

use crate::error::GraphrepError;
use tokio::sync::oneshot;

#[tokio::test]
async fn test_join_error_conversion() {
    async fn task_that_panics() -> Result<(), &'static str> {
        panic!("test panic");
    }

    async fn test_function() -> Result<(), GraphrepError> {
        let handle = tokio::spawn(task_that_panics());
        let _result = handle.await?;
        Ok(())
    }

    let result = test_function().await;
    match result {
        Err(GraphrepError::Internal { message }) => assert!(message.contains("Task panicked")),
        other => panic!("Expected Internal error with panic message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_error_conversion() {
    use tokio::time::{timeout, Duration};

    async fn test_function() -> Result<(), GraphrepError> {
        timeout(Duration::from_millis(1), tokio::time::sleep(Duration::from_secs(1))).await?;
        Ok(())
    }

    let result = test_function().await;
    assert!(matches!(result, Err(GraphrepError::Timeout { .. })));
    assert!(result.unwrap_err().is_transient());
}

#[tokio::test]
async fn test_oneshot_recv_error_conversion() {
    async fn test_function() -> Result<(), GraphrepError> {
        let (tx, rx) = oneshot::channel::<u32>();
        drop(tx);
        let _value = rx.await?;
        Ok(())
    }

    let result = test_function().await;
    assert!(matches!(result, Err(GraphrepError::Internal { .. })));
}

#[test]
fn test_toml_error_conversion() {
    fn parse() -> Result<toml::Value, GraphrepError> {
        Ok(toml::from_str("snapshot = [unterminated")?)
    }

    match parse() {
        Err(GraphrepError::Configuration { component, .. }) => assert_eq!(component, "toml"),
        other => panic!("Expected Configuration error, got {:?}", other),
    }
}

#[test]
fn test_snapshot_send_error_keeps_source() {
    use std::error::Error;

    let err = GraphrepError::SnapshotSend {
        space: 1,
        part: 3,
        attempts: 3,
        source: Box::new(GraphrepError::connection("10.0.0.2:9780", "refused")),
    };

    assert!(err.to_string().contains("after 3 attempts"));
    let source = err.source().expect("source should be preserved");
    assert!(source.to_string().contains("10.0.0.2:9780"));
}
