//! Queue module: backlog state, task records, completion handles and the
//! `SerialQueue` front end.

mod builder;
pub(crate) mod handle;
pub(crate) mod record;
mod serial;
mod state;

pub use builder::SerialQueueBuilder;
pub use handle::TaskHandle;
pub use serial::SerialQueue;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use state::QueueState;

/// State shared between a `SerialQueue` and its worker.
pub(crate) struct Shared {
    state: Mutex<QueueState>,

    /// Wakes the worker: one permit per submission (or close).
    pub(crate) notify: Notify,
}

impl Shared {
    fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::new(capacity)),
            notify: Notify::new(),
        }
    }

    /// Lock the state. Poisoning is ignored: no critical section leaves the
    /// state half-updated.
    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
