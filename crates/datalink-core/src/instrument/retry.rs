//! Fixed-delay, retry-forever wrapper

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::Operation;
use crate::error::RetryError;

/// Delay between attempts when none is configured
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How a failed operation is repeated
///
/// Attempts are separated by a constant `delay`: no back-off, no jitter, no
/// attempt limit. A `deadline` bounds the total time spent retrying and is
/// unset by default, in which case the operation is retried forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// Retry forever, sleeping `delay` between attempts
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Give up once the next sleep would end past `deadline`
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// True when the policy never gives up
    #[must_use]
    pub const fn is_infinite(&self) -> bool {
        self.deadline.is_none()
    }
}

/// Repeats the wrapped operation until it succeeds
///
/// Every failure is logged at error level before sleeping. With an infinite
/// policy the returned future only resolves with `Ok`.
#[derive(Debug)]
pub struct Retried<O> {
    inner: O,
    policy: RetryPolicy,
    failures: AtomicU64,
}

impl<O: Operation> Retried<O> {
    pub fn new(inner: O, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            failures: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Number of failed attempts observed across all calls
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl<O: Operation> Operation for Retried<O> {
    type Output = O::Output;
    type Error = RetryError;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn call(&self) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send {
        async move {
            let started = Instant::now();
            let mut attempt: u64 = 0;

            loop {
                attempt += 1;
                let error = match self.inner.call().await {
                    Ok(value) => return Ok(value),
                    Err(e) => e,
                };
                self.failures.fetch_add(1, Ordering::Relaxed);

                if let Some(deadline) = self.policy.deadline {
                    if started.elapsed() + self.policy.delay > deadline {
                        tracing::error!(
                            operation = self.inner.name(),
                            attempts = attempt,
                            error = %error,
                            "Retry deadline exceeded, giving up"
                        );
                        return Err(RetryError::DeadlineExceeded {
                            operation: self.inner.name().to_string(),
                            attempts: attempt,
                            last_error: error.to_string(),
                        });
                    }
                }

                tracing::error!(
                    operation = self.inner.name(),
                    attempt,
                    error = %error,
                    "Exception occurred: {}. Retrying in {} seconds...",
                    error,
                    self.policy.delay.as_secs_f64()
                );
                drop(error);

                tokio::time::sleep(self.policy.delay).await;
            }
        }
    }
}
