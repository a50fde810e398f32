//! baton-core
//!
//! A single-consumer task-serialization queue for tokio.
//!
//! Callers submit producers (deferred async work) from anywhere; the queue
//! runs them one at a time in submission order and hands each caller a
//! `TaskHandle` that settles with that producer's own value or failure.
//!
//! # モジュール構成
//! - **domain**: ids, task state, outcome classification
//! - **queue**: `SerialQueue`, builder, backlog state, completion handles
//! - **producer**: `Producer` trait and the type-erased job stored in the backlog
//! - **worker**: the single drain loop behind each queue
//! - **config / error / observability**: settings, error types, counters
//!
//! ```ignore
//! let queue = SerialQueue::new()?;
//! let first = queue.submit(|| async { fetch(1).await });
//! let second = queue.submit(|| async { fetch(2).await });
//! // fetch(2) starts only after fetch(1) has settled
//! let (a, b) = (first.await, second.await);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod producer;
pub mod queue;
mod worker;

pub use config::QueueConfig;
pub use domain::{OutcomeKind, QueueId, TaskId, TaskState};
pub use error::{BuildError, ConfigError, TaskError};
pub use observability::QueueStats;
pub use producer::{FnProducer, Producer};
pub use queue::{SerialQueue, SerialQueueBuilder, TaskHandle};
