use thiserror::Error;

/// What a `TaskHandle` resolves to when its task did not succeed.
///
/// `Failed` and `Panicked` are the same kind of event for the queue: the task
/// failed, its own handle carries the failure, and draining continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError<E> {
    /// The producer completed with `Err`.
    #[error("task failed: {0}")]
    Failed(E),

    /// The producer panicked, either when invoked or while its future was polled.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The completion was dropped without a result (the hosting runtime went
    /// away before the task could settle).
    #[error("task was abandoned before it settled")]
    Abandoned,
}

impl<E> TaskError<E> {
    pub fn is_failed(&self) -> bool {
        matches!(self, TaskError::Failed(_))
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked(_))
    }

    pub fn failure(&self) -> Option<&E> {
        match self {
            TaskError::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_failure(self) -> Option<E> {
        match self {
            TaskError::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Map the producer's error type, keeping the other variants.
    pub fn map_failure<F>(self, op: impl FnOnce(E) -> F) -> TaskError<F> {
        match self {
            TaskError::Failed(e) => TaskError::Failed(op(e)),
            TaskError::Panicked(msg) => TaskError::Panicked(msg),
            TaskError::Abandoned => TaskError::Abandoned,
        }
    }
}

/// Errors raised while building a queue from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("queue name must not be empty")]
    EmptyName,

    #[error("initial_capacity must be greater than zero")]
    ZeroCapacity,

    #[error("invalid queue config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by `SerialQueueBuilder::build`.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no tokio runtime to host the queue worker: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error: TaskError<&str> = TaskError::Failed("boom");
        assert_eq!(error.to_string(), "task failed: boom");

        let error: TaskError<&str> = TaskError::Panicked("index out of bounds".into());
        assert_eq!(error.to_string(), "task panicked: index out of bounds");

        let error: TaskError<&str> = TaskError::Abandoned;
        assert_eq!(error.to_string(), "task was abandoned before it settled");

        assert_eq!(
            ConfigError::ZeroCapacity.to_string(),
            "initial_capacity must be greater than zero"
        );
    }

    #[test]
    fn failure_accessors() {
        let error: TaskError<u8> = TaskError::Failed(7);
        assert!(error.is_failed());
        assert!(!error.is_panic());
        assert_eq!(error.failure(), Some(&7));
        assert_eq!(error.map_failure(|e| e * 2), TaskError::Failed(14));

        let error: TaskError<u8> = TaskError::Panicked("p".into());
        assert!(error.is_panic());
        assert_eq!(error.into_failure(), None);
    }
}
