//! SerialQueueBuilder - キューの構築
//!
//! - 起動時検証（Fail-fast）: 設定が不正なら worker を起動せずに `BuildError`
//! - runtime を明示しなければ、呼び出し元の tokio runtime に worker を spawn

use tokio::runtime::Handle;

use super::SerialQueue;
use crate::config::QueueConfig;
use crate::error::BuildError;

/// Builds a `SerialQueue`.
///
/// # 使用例
/// ```ignore
/// let queue = SerialQueue::builder()
///     .name("io")
///     .initial_capacity(16)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SerialQueueBuilder {
    config: QueueConfig,
    runtime: Option<Handle>,
}

impl SerialQueueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Replace every setting with `config`.
    pub fn config(mut self, config: QueueConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn the worker on `runtime` instead of the current one. Lets a queue
    /// be built from a thread that is not inside a runtime.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validate the configuration and start the worker.
    pub fn build(self) -> Result<SerialQueue, BuildError> {
        self.config.validate()?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()?,
        };
        Ok(SerialQueue::start(self.config, &runtime))
    }
}
