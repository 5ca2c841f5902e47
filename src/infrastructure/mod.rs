mod heavy_task;
pub mod logging;
pub mod metrics;

// Re-export the factory functions for easy access
pub use heavy_task::{create_heavy_task, SimulatedHeavyTask};
pub use metrics::{create_noop_metrics, create_prom_metrics};
