//! Task record: one submission waiting in the backlog.

use std::fmt;
use std::time::Instant;

use crate::domain::TaskId;
use crate::producer::Job;

/// A submitted producer plus the bookkeeping the worker logs with.
///
/// Design:
/// - Created by `submit`, removed from the backlog the moment it is dispatched.
/// - `seq` is the submission order; the backlog never reorders records.
pub(crate) struct TaskRecord {
    pub id: TaskId,
    pub seq: u64,
    pub submitted_at: Instant,
    pub job: Box<dyn Job>,
}

impl TaskRecord {
    pub fn new(id: TaskId, seq: u64, job: Box<dyn Job>) -> Self {
        Self {
            id,
            seq,
            submitted_at: Instant::now(),
            job,
        }
    }
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("seq", &self.seq)
            .field("submitted_at", &self.submitted_at)
            .finish_non_exhaustive()
    }
}
