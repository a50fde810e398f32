//! `SerialQueue`: accepts producers from any caller and runs them one at a
//! time, in submission order.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::builder::SerialQueueBuilder;
use super::handle::{Completion, TaskHandle};
use super::record::TaskRecord;
use super::Shared;
use crate::config::QueueConfig;
use crate::domain::{QueueId, TaskId};
use crate::error::BuildError;
use crate::observability::QueueStats;
use crate::producer::{FnProducer, Producer, TypedJob};
use crate::worker::worker_loop;

/// Single-consumer task-serialization queue.
///
/// - `submit` is synchronous: it appends to the backlog and returns a handle
///   without waiting for earlier tasks.
/// - One worker task dispatches the backlog head only when nothing is in
///   flight, so producers never overlap and start in submission order.
/// - Each handle settles with its own producer's outcome. A failed (or
///   panicked) producer settles only its own handle; draining continues.
///
/// Share a queue between callers with `Arc<SerialQueue>`. Dropping the last
/// owner closes the queue; tasks already accepted still run.
pub struct SerialQueue {
    id: QueueId,
    name: Arc<str>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl SerialQueue {
    pub fn builder() -> SerialQueueBuilder {
        SerialQueueBuilder::new()
    }

    /// Queue with default settings, worker spawned on the current runtime.
    pub fn new() -> Result<Self, BuildError> {
        Self::builder().build()
    }

    pub fn with_config(config: QueueConfig) -> Result<Self, BuildError> {
        Self::builder().config(config).build()
    }

    /// Spawn the worker. `config` is already validated.
    pub(crate) fn start(config: QueueConfig, runtime: &Handle) -> Self {
        let id = QueueId::generate();
        let name: Arc<str> = Arc::from(config.name);
        let shared = Arc::new(Shared::new(config.initial_capacity));

        let span = tracing::info_span!("serial_queue", queue = %name, queue_id = %id);
        let worker = runtime.spawn(worker_loop(Arc::clone(&shared)).instrument(span));

        Self {
            id,
            name,
            shared,
            worker: Some(worker),
        }
    }

    /// Submit a closure producing a future.
    ///
    /// The closure is invoked at most once, on the queue's runtime, after every
    /// earlier submission has settled. A producer must not await a task it
    /// submitted to the same queue: that task can only start after the
    /// producer itself settles.
    pub fn submit<F, Fut, T, E>(&self, producer: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.submit_task(FnProducer::new(producer))
    }

    /// Submit any `Producer`.
    ///
    /// If the worker is already gone (its runtime shut down), the producer is
    /// dropped unrun and the handle settles with `TaskError::Abandoned`.
    pub fn submit_task<P: Producer>(&self, producer: P) -> TaskHandle<P::Output, P::Error> {
        let task_id = TaskId::generate();

        let (handle, backlog) = {
            let mut state = self.shared.lock();
            let seq = state.allocate_seq();
            let (completion, handle) = Completion::pair(task_id, seq);
            if state.is_stopped() {
                drop(state);
                drop(completion);
                tracing::warn!(queue = %self.name, task_id = %task_id, "worker is gone; task abandoned");
                return handle;
            }
            let job = TypedJob::new(producer, completion);
            state.push(TaskRecord::new(task_id, seq, Box::new(job)));
            (handle, state.len())
        };

        // drain トリガー: worker が待機中なら起こす
        self.shared.notify.notify_one();

        tracing::debug!(
            queue = %self.name,
            task_id = %task_id,
            seq = handle.seq(),
            backlog,
            "task submitted"
        );
        handle
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tasks waiting in the backlog (excluding the one in flight).
    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while a producer is in flight.
    pub fn is_busy(&self) -> bool {
        self.shared.lock().is_busy()
    }

    /// Nothing queued and nothing in flight.
    pub fn is_idle(&self) -> bool {
        let state = self.shared.lock();
        state.len() == 0 && !state.is_busy()
    }

    pub fn stats(&self) -> QueueStats {
        self.shared.lock().stats()
    }

    /// Stop accepting work, run everything already accepted, and wait for the
    /// worker to exit.
    pub async fn shutdown(mut self) {
        self.close();
        let Some(worker) = self.worker.take() else {
            return;
        };
        if let Err(e) = worker.await {
            tracing::error!(queue = %self.name, error = %e, "worker exited abnormally");
        }
    }

    fn close(&self) {
        self.shared.lock().close();
        self.shared.notify.notify_one();
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialQueue")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::error::TaskError;

    #[tokio::test]
    async fn submit_returns_before_the_task_runs() {
        let queue = SerialQueue::new().unwrap();
        let ran = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&ran);
        let handle = queue.submit(move || async move {
            *flag.lock().unwrap() = true;
            Ok::<_, ()>(())
        });

        // current_thread runtime: the worker cannot run until we yield
        assert!(!*ran.lock().unwrap());
        assert_eq!(queue.len(), 1);
        assert_eq!(handle.seq(), 0);

        handle.await.unwrap();
        assert!(*ran.lock().unwrap());
    }

    #[tokio::test]
    async fn handles_settle_with_their_own_outcome() {
        let queue = SerialQueue::new().unwrap();

        let h1 = queue.submit(|| async { Err::<u32, _>("boom") });
        let h2 = queue.submit(|| async { Ok::<u32, &str>(42) });

        assert_eq!(h2.await, Ok(42));
        assert_eq!(h1.await, Err(TaskError::Failed("boom")));
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(32)]
    #[tokio::test]
    async fn sequence_numbers_follow_submission(#[case] n: u64) {
        let queue = SerialQueue::new().unwrap();
        let handles: Vec<_> = (0..n)
            .map(|i| queue.submit(move || async move { Ok::<_, ()>(i) }))
            .collect();

        for (expected, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.seq(), expected as u64);
            assert_eq!(handle.await, Ok(expected as u64));
        }
    }

    #[tokio::test]
    async fn stats_after_mixed_outcomes() {
        let queue = SerialQueue::new().unwrap();

        let handles = vec![
            queue.submit(|| async { Ok::<(), &str>(()) }),
            queue.submit(|| async { Err::<(), &str>("nope") }),
            queue.submit(|| async { Ok::<(), &str>(()) }),
        ];
        assert_eq!(queue.stats().queued, 3);

        for handle in handles {
            let _ = handle.await;
        }

        assert_eq!(
            queue.stats(),
            QueueStats { queued: 0, running: 0, succeeded: 2, failed: 1 }
        );
        assert!(queue.is_idle());
    }

    struct Greeting {
        name: &'static str,
    }

    #[async_trait]
    impl Producer for Greeting {
        type Output = String;
        type Error = std::convert::Infallible;

        async fn produce(self) -> Result<String, Self::Error> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(format!("hello, {}", self.name))
        }
    }

    #[tokio::test]
    async fn struct_producers_share_the_queue_with_closures() {
        let queue = SerialQueue::builder().name("greeter").build().unwrap();

        let a = queue.submit_task(Greeting { name: "a" });
        let b = queue.submit(|| async { Ok::<_, std::convert::Infallible>(String::from("plain")) });

        assert_eq!(a.await.unwrap(), "hello, a");
        assert_eq!(b.await.unwrap(), "plain");
    }

    #[tokio::test]
    async fn busy_while_a_producer_is_in_flight() {
        let queue = SerialQueue::new().unwrap();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();

        let blocked = queue.submit(move || async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok::<_, ()>(())
        });
        let next = queue.submit(|| async { Ok::<_, ()>(()) });

        started_rx.await.unwrap();
        assert!(queue.is_busy());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.stats().running, 1);

        release_tx.send(()).unwrap();
        blocked.await.unwrap();
        next.await.unwrap();
        assert!(!queue.is_busy());
    }

    #[tokio::test]
    async fn shutdown_runs_accepted_tasks() {
        let queue = SerialQueue::new().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = Arc::clone(&log);
            // handles dropped on purpose: the tasks still run
            let _ = queue.submit(move || async move {
                tokio::time::sleep(Duration::from_millis(2)).await;
                log.lock().unwrap().push(i);
                Ok::<_, ()>(())
            });
        }

        queue.shutdown().await;
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn dropping_the_queue_keeps_accepted_tasks() {
        let queue = SerialQueue::new().unwrap();
        let handle = queue.submit(|| async { Ok::<_, ()>(7) });
        drop(queue);

        assert_eq!(handle.await, Ok(7));
    }
}
