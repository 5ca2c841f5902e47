// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod health;
mod metrics;
mod root;
mod shared_types;
mod slow;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::root_handler;
pub use slow::slow_handler;

// Error responses
pub use shared_types::{AppError, ErrorEnvelope};
