mod instrumentation;

pub use instrumentation::{route_key, track_requests, Instrumentation};
