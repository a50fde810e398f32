//! State - タスクの状態

use serde::{Deserialize, Serialize};

use super::outcome::OutcomeKind;

/// Lifecycle of one submitted producer.
///
/// # 状態遷移
/// - queued: backlog にいる（まだ producer は呼ばれていない）
/// - running: dispatch 済み、まだ settle していない（in flight）
/// - succeeded / failed: handle が settle 済み（終端）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl From<OutcomeKind> for TaskState {
    fn from(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Success => TaskState::Succeeded,
            OutcomeKind::Failure => TaskState::Failed,
        }
    }
}
