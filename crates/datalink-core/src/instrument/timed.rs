//! Execution-time logging wrapper

use std::future::Future;
use std::time::Instant;

use super::Operation;

/// Logs the wall-clock duration of every call to the wrapped operation
///
/// The result, success or error, is passed through untouched.
#[derive(Debug)]
pub struct Timed<O> {
    inner: O,
}

impl<O: Operation> Timed<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Operation> Operation for Timed<O> {
    type Output = O::Output;
    type Error = O::Error;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send {
        async move {
            let start = Instant::now();
            let result = self.inner.call().await;
            let elapsed = start.elapsed();

            tracing::info!(
                operation = self.inner.name(),
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                success = result.is_ok(),
                "Function '{}' took {:.4} seconds to execute",
                self.inner.name(),
                elapsed.as_secs_f64()
            );

            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::{operation, OperationExt};
    use std::time::Duration;

    #[tokio::test]
    async fn test_timed_passes_through_success() {
        let op = operation("answer", || async { Ok::<_, String>(42) }).timed();
        assert_eq!(op.name(), "answer");
        assert_eq!(op.call().await, Ok(42));
    }

    #[tokio::test]
    async fn test_timed_passes_through_error() {
        let op = operation("broken", || async { Err::<u8, _>("nope".to_string()) }).timed();
        assert_eq!(op.call().await, Err("nope".to_string()));
    }

    #[tokio::test]
    async fn test_timed_waits_for_inner_call() {
        let op = operation("slow", || async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, String>(())
        })
        .timed();

        let start = Instant::now();
        op.call().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
