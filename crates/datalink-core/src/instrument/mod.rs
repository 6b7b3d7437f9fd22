//! Cross-cutting wrappers for pool lifecycle operations
//!
//! An [`Operation`] is a named, repeatable async call. [`Timed`] logs the
//! wall-clock duration of each call and [`Retried`] repeats failed calls
//! forever at a fixed delay. Pools compose them as
//! `Retried(Timed(operation))` so every attempt is timed on its own.

mod operation;
mod retry;
mod timed;

pub use operation::{operation, FnOperation, Operation, OperationExt};
pub use retry::{Retried, RetryPolicy};
pub use timed::Timed;
