//! Queue state: backlog, busy flag and counters.
//!
//! All transitions happen here, under the queue's mutex. Nothing in this
//! module awaits.

use std::collections::VecDeque;

use super::record::TaskRecord;
use crate::domain::OutcomeKind;
use crate::observability::QueueStats;

#[derive(Debug)]
pub(crate) struct QueueState {
    /// Not-yet-dispatched records, in submission order.
    backlog: VecDeque<TaskRecord>,

    /// True while a dispatched producer has not settled.
    busy: bool,

    /// Sequence number handed to the next submission.
    next_seq: u64,

    succeeded: usize,
    failed: usize,

    /// Set once the owning `SerialQueue` is gone; the worker exits when the
    /// backlog is empty.
    closed: bool,

    /// Set once the worker itself is gone. Nothing queued after this can run.
    stopped: bool,
}

impl QueueState {
    pub fn new(capacity: usize) -> Self {
        Self {
            backlog: VecDeque::with_capacity(capacity),
            busy: false,
            next_seq: 0,
            succeeded: 0,
            failed: 0,
            closed: false,
            stopped: false,
        }
    }

    /// Allocate the next submission sequence number.
    pub fn allocate_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Append a record to the tail of the backlog.
    pub fn push(&mut self, record: TaskRecord) {
        debug_assert!(
            self.backlog.back().is_none_or(|last| last.seq < record.seq),
            "backlog must stay in submission order"
        );
        self.backlog.push_back(record);
    }

    /// The drain step.
    ///
    /// Returns `None` ("nothing happened") when a task is already in flight or
    /// the backlog is empty. Otherwise removes the head and marks the queue busy.
    pub fn begin_next(&mut self) -> Option<TaskRecord> {
        if self.busy {
            return None;
        }
        let record = self.backlog.pop_front()?;
        self.busy = true;
        Some(record)
    }

    /// Mark the in-flight task as settled.
    pub fn finish(&mut self, kind: OutcomeKind) {
        debug_assert!(self.busy, "finish without a task in flight");
        self.busy = false;
        match kind {
            OutcomeKind::Success => self.succeeded += 1,
            OutcomeKind::Failure => self.failed += 1,
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The worker is gone. Hands back every record that will never run; the
    /// caller drops them outside the lock.
    pub fn stop(&mut self) -> VecDeque<TaskRecord> {
        self.closed = true;
        self.stopped = true;
        self.busy = false;
        std::mem::take(&mut self.backlog)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn len(&self) -> usize {
        self.backlog.len()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            queued: self.backlog.len(),
            running: usize::from(self.busy),
            succeeded: self.succeeded,
            failed: self.failed,
        }
    }
}
