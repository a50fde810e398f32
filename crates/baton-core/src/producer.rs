//! Producer trait - キューに投入される「遅延された仕事」の定義
//!
//! # 二層構造
//! - **表層（Typed）**: `Producer` trait - 出力型とエラー型を持つ
//! - **内部（Dyn）**: `Job` trait - object-safe, backlog に異なる型を並べるための type erasure
//!
//! `TypedJob<P>` が `Producer` と caller 側の completion をまとめて `Box<dyn Job>` にします。

use std::any::Any;
use std::future::Future;

use async_trait::async_trait;

use crate::domain::OutcomeKind;
use crate::error::TaskError;
use crate::queue::handle::Completion;

/// A deferred unit of work. Consumed by `produce`, so it runs at most once.
///
/// # 使用例
/// ```ignore
/// struct Fetch { url: String }
///
/// #[async_trait]
/// impl Producer for Fetch {
///     type Output = String;
///     type Error = std::io::Error;
///
///     async fn produce(self) -> Result<String, std::io::Error> {
///         download(&self.url).await
///     }
/// }
///
/// let handle = queue.submit_task(Fetch { url });
/// ```
#[async_trait]
pub trait Producer: Send + 'static {
    type Output: Send + 'static;
    type Error: Send + 'static;

    async fn produce(self) -> Result<Self::Output, Self::Error>;
}

/// Adapts a zero-argument closure returning a future into a `Producer`.
pub struct FnProducer<F> {
    op: F,
}

impl<F> FnProducer<F> {
    pub fn new(op: F) -> Self {
        Self { op }
    }
}

#[async_trait]
impl<F, Fut, T, E> Producer for FnProducer<F>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    async fn produce(self) -> Result<T, E> {
        // the closure is invoked here, inside the spawned task, so a panic
        // while building the future is caught like any other panic
        (self.op)().await
    }
}

/// Result of running a job: how it ended, plus the deferred delivery to the
/// caller's handle. The worker records the outcome before delivering.
pub(crate) struct Settlement {
    pub(crate) kind: OutcomeKind,
    deliver: Box<dyn FnOnce() -> bool + Send>,
}

impl Settlement {
    /// Settle the caller's handle. Returns `false` if the handle was dropped.
    pub(crate) fn deliver(self) -> bool {
        (self.deliver)()
    }
}

/// Object-safe view of a queued producer.
#[async_trait]
pub(crate) trait Job: Send {
    async fn run(self: Box<Self>) -> Settlement;
}

pub(crate) struct TypedJob<P: Producer> {
    producer: P,
    completion: Completion<P::Output, P::Error>,
}

impl<P: Producer> TypedJob<P> {
    pub(crate) fn new(producer: P, completion: Completion<P::Output, P::Error>) -> Self {
        Self {
            producer,
            completion,
        }
    }
}

#[async_trait]
impl<P: Producer> Job for TypedJob<P> {
    async fn run(self: Box<Self>) -> Settlement {
        let TypedJob {
            producer,
            completion,
        } = *self;

        let result = match tokio::spawn(producer.produce()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(TaskError::Failed(e)),
            Err(join_error) if join_error.is_panic() => {
                let message = panic_message(join_error.into_panic());
                tracing::warn!(task_id = %completion.task_id(), panic = %message, "producer panicked");
                Err(TaskError::Panicked(message))
            }
            Err(_) => Err(TaskError::Abandoned),
        };

        Settlement {
            kind: OutcomeKind::of(&result),
            deliver: Box::new(move || completion.settle(result)),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
