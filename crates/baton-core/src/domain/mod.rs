//! Domain model (ids, task state, outcome classification).

pub mod ids;
pub mod outcome;
pub mod state;

pub use ids::{QueueId, TaskId};
pub use outcome::OutcomeKind;
pub use state::TaskState;
