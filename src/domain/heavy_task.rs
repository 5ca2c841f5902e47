use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Stand-in for slow business logic behind the `/slow` endpoint.
#[async_trait::async_trait]
pub trait HeavyTask: Send + Sync {
    // ---
    /// Run the task, returning how long it took on success.
    async fn run(&self) -> Result<Duration>;
}

/// Type alias for any implementation of HeavyTask.
pub type HeavyTaskPtr = Arc<dyn HeavyTask>;
