use serde::{Deserialize, Serialize};

use crate::domain::TaskState;

/// Point-in-time counters for one queue.
///
/// `queued` and `running` describe the present; `succeeded` and `failed` are
/// totals since the queue was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub queued: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl QueueStats {
    pub fn count(&self, state: TaskState) -> usize {
        match state {
            TaskState::Queued => self.queued,
            TaskState::Running => self.running,
            TaskState::Succeeded => self.succeeded,
            TaskState::Failed => self.failed,
        }
    }

    /// Tasks that have been settled so far.
    pub fn settled(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Tasks accepted so far, settled or not.
    pub fn submitted(&self) -> usize {
        self.queued + self.running + self.settled()
    }
}
