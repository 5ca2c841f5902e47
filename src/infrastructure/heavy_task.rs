//! Simulated slow business operation behind `/slow`.

use crate::domain::{HeavyTask, HeavyTaskPtr};
use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

const DELAYS_MS: [u64; 9] = [100, 150, 200, 300, 600, 500, 1000, 1400, 2500];

const FAILURES: [&str; 4] = [
    "DB Payment Failure",
    "DB Server is Down",
    "Access Denied",
    "Not Found Error",
];

/// Sleeps for a random delay, failing outright about one call in eight.
pub struct SimulatedHeavyTask {
    delays_ms: Vec<u64>,
    /// Fail once in this many runs; `0` never fails.
    failure_one_in: u32,
}

impl SimulatedHeavyTask {
    pub fn new(delays_ms: Vec<u64>, failure_one_in: u32) -> Self {
        Self {
            delays_ms,
            failure_one_in,
        }
    }
}

impl Default for SimulatedHeavyTask {
    fn default() -> Self {
        Self::new(DELAYS_MS.to_vec(), 8)
    }
}

#[async_trait::async_trait]
impl HeavyTask for SimulatedHeavyTask {
    // ---
    async fn run(&self) -> Result<Duration> {
        // ---
        // ThreadRng is not Send; keep it out of the await below.
        let (delay_ms, failure) = {
            let mut rng = rand::thread_rng();
            let delay_ms = self.delays_ms.choose(&mut rng).copied().unwrap_or(0);
            let failure = if self.failure_one_in > 0 && rng.gen_range(0..self.failure_one_in) == 0
            {
                FAILURES.choose(&mut rng).copied()
            } else {
                None
            };
            (delay_ms, failure)
        };

        if let Some(reason) = failure {
            bail!(reason);
        }

        let delay = Duration::from_millis(delay_ms);
        tokio::time::sleep(delay).await;
        Ok(delay)
    }
}

/// Creates the default simulated heavy task.
pub fn create_heavy_task() -> HeavyTaskPtr {
    Arc::new(SimulatedHeavyTask::default())
}
