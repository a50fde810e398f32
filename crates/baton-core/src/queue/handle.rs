//! Completion handles: the write-once slot between the worker and a caller.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::domain::TaskId;
use crate::error::TaskError;

type Slot<T, E> = Result<T, TaskError<E>>;

/// Sending half, owned by the queue until the producer settles.
pub(crate) struct Completion<T, E> {
    task_id: TaskId,
    tx: oneshot::Sender<Slot<T, E>>,
}

impl<T, E> Completion<T, E> {
    pub(crate) fn pair(task_id: TaskId, seq: u64) -> (Self, TaskHandle<T, E>) {
        let (tx, rx) = oneshot::channel();
        let completion = Self { task_id, tx };
        let handle = TaskHandle { task_id, seq, rx };
        (completion, handle)
    }

    pub(crate) fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Settle the caller's handle. Consumes the completion, so it can only
    /// happen once. Returns `false` when the caller already dropped its handle.
    pub(crate) fn settle(self, result: Slot<T, E>) -> bool {
        if self.tx.send(result).is_ok() {
            true
        } else {
            tracing::debug!(task_id = %self.task_id, "handle dropped before the task settled; result discarded");
            false
        }
    }
}

/// The caller's view of one submitted task.
///
/// Awaiting it yields the producer's value, or a `TaskError` carrying its
/// failure. Dropping it does not cancel the task: the producer still runs in
/// its turn and the result is discarded.
#[derive(Debug)]
pub struct TaskHandle<T, E> {
    task_id: TaskId,
    seq: u64,
    rx: oneshot::Receiver<Slot<T, E>>,
}

impl<T, E> TaskHandle<T, E> {
    pub fn id(&self) -> TaskId {
        self.task_id
    }

    /// Position of this task in the queue's submission order (0-based).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Block the current thread until the task settles.
    ///
    /// For callers outside the async runtime. Panics if called from within an
    /// asynchronous execution context, like `oneshot::Receiver::blocking_recv`.
    pub fn wait_blocking(self) -> Slot<T, E> {
        self.rx.blocking_recv().unwrap_or(Err(TaskError::Abandoned))
    }
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = Slot<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TaskError::Abandoned)))
    }
}
