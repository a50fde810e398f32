//! Worker - キューごとに 1 本だけ動く drain ループ
//!
//! # フロー
//! 1. ロックを取り、drain step (`begin_next`) で backlog の先頭を取り出す
//! 2. 何もなければ submit からの通知を待つ（closed なら終了）
//! 3. producer を実行し、結果を記録してから caller の handle を settle
//! 4. 1 に戻る（完了ごとに次の drain が走る）
//!
//! Consumer is single, so no two producers of one queue are ever in flight.
//!
//! runtime の shutdown で worker future が drop された場合は `StopGuard` が
//! backlog を捨て、残った handle はすべて `Abandoned` で settle する。

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::queue::Shared;
use crate::queue::record::TaskRecord;

/// The guard is built before the first poll, so a worker that the runtime
/// drops without ever polling still releases the backlog.
pub(crate) fn worker_loop(shared: Arc<Shared>) -> impl Future<Output = ()> + Send + 'static {
    let guard = StopGuard { shared };
    async move {
        run(&guard.shared).await;
    }
}

async fn run(shared: &Shared) {
    tracing::info!("worker started");

    loop {
        // ロックは await を跨がない
        let next = {
            let mut state = shared.lock();
            match state.begin_next() {
                Some(record) => Some(record),
                None if state.is_closed() => break,
                None => None,
            }
        };

        let Some(record) = next else {
            // notify_one は permit を残すので、ロック解放後の submit も取りこぼさない
            shared.notify.notified().await;
            continue;
        };

        dispatch(shared, record).await;
    }

    tracing::info!("worker stopped");
}

async fn dispatch(shared: &Shared, record: TaskRecord) {
    let TaskRecord {
        id,
        seq,
        submitted_at,
        job,
    } = record;

    tracing::trace!(
        task_id = %id,
        seq,
        queued_ms = submitted_at.elapsed().as_millis() as u64,
        "dispatching task"
    );

    let started = Instant::now();
    let settlement = job.run().await;
    let kind = settlement.kind;

    // busy を下ろしてから handle を settle する
    shared.lock().finish(kind);
    let delivered = settlement.deliver();

    tracing::debug!(
        task_id = %id,
        seq,
        outcome = kind.as_str(),
        run_ms = started.elapsed().as_millis() as u64,
        delivered,
        "task settled"
    );
}

/// Marks the queue stopped when the worker goes away, whether it returned or
/// was dropped mid-flight.
struct StopGuard {
    shared: Arc<Shared>,
}

impl Drop for StopGuard {
    fn drop(&mut self) {
        let abandoned = self.shared.lock().stop();
        if !abandoned.is_empty() {
            tracing::warn!(
                abandoned = abandoned.len(),
                "worker dropped with tasks in the backlog"
            );
        }
        // records (and their completions) drop here, outside the lock
    }
}
