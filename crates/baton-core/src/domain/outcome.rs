//! Outcome model: how a dispatched producer settled.
//!
//! The value or error itself travels to the caller through its handle; the
//! queue only keeps the classification for bookkeeping and logs.

use serde::{Deserialize, Serialize};

/// Classification of a settled task.
///
/// Serialized as SCREAMING_SNAKE_CASE: SUCCESS / FAILURE.
/// A producer that returned `Err` and one that panicked are both `Failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Success,
    Failure,
}

impl OutcomeKind {
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => OutcomeKind::Success,
            Err(_) => OutcomeKind::Failure,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Failure => "failure",
        }
    }
}
