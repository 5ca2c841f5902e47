mod loki;
mod panic_hook;
mod route_logger;
mod shipper;

pub use loki::LokiSink;
pub use panic_hook::{capture_panics, panic_message, within_panic_boundary};
pub use route_logger::RouteLogger;
pub use shipper::{LogHandle, LogShipper, ShipperSettings};
