use super::RouteLogger;
use serde_json::json;
use std::any::Any;
use std::future::Future;

tokio::task_local! {
    // Set while a future runs under `within_panic_boundary`.
    static PANIC_BOUNDARY: ();
}

/// Forwards panic reports to the route logger before the previous hook runs.
///
/// Panics raised inside [`within_panic_boundary`] are left to the code that
/// catches them and are not forwarded. Replaces the process-wide panic hook;
/// call once at startup.
pub fn capture_panics(logger: RouteLogger) {
    // ---
    let previous = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        if !inside_panic_boundary() {
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()));

            logger.error(
                "Unhandled panic",
                json!({
                    "panic": panic_message(info.payload()),
                    "location": location,
                }),
            );
        }

        previous(info);
    }));
}

/// Runs `future` in a scope whose panics the caller catches and reports.
pub fn within_panic_boundary<F: Future>(future: F) -> impl Future<Output = F::Output> {
    PANIC_BOUNDARY.scope((), future)
}

fn inside_panic_boundary() -> bool {
    PANIC_BOUNDARY.try_with(|_| ()).is_ok()
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    // ---
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
