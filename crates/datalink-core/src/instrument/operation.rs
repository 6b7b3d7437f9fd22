//! The operation capability wrapped by instrumentation

use std::fmt;
use std::future::Future;

use super::{Retried, RetryPolicy, Timed};

/// A named async call that may be invoked any number of times
pub trait Operation: Send + Sync {
    /// Value produced on success
    type Output: Send;
    /// Error produced on failure
    type Error: fmt::Display + Send;

    /// Name used to tag log lines
    fn name(&self) -> &str;

    /// Run the operation once
    fn call(&self) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// Operation backed by a closure returning a future
pub struct FnOperation<F> {
    name: &'static str,
    f: F,
}

impl<F> fmt::Debug for FnOperation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation")
            .field("name", &self.name)
            .finish()
    }
}

/// Wrap a closure as an [`Operation`]
///
/// The closure is called once per attempt, so it must be `Fn`.
pub fn operation<F, Fut, T, E>(name: &'static str, f: F) -> FnOperation<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: fmt::Display + Send,
{
    FnOperation { name, f }
}

impl<F, Fut, T, E> Operation for FnOperation<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: fmt::Display + Send,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        self.name
    }

    fn call(&self) -> impl Future<Output = Result<T, E>> + Send {
        (self.f)()
    }
}

/// Builder-style composition of the instrumentation wrappers
pub trait OperationExt: Operation + Sized {
    /// Log the duration of every call
    fn timed(self) -> Timed<Self> {
        Timed::new(self)
    }

    /// Retry failed calls according to `policy`
    fn retried(self, policy: RetryPolicy) -> Retried<Self> {
        Retried::new(self, policy)
    }
}

impl<O: Operation> OperationExt for O {}
