//! Inbound event dispatch.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;

use crate::realtime::registry::Callback;

/// Invokes every callback registered for an event.
///
/// Callbacks run independently: a panicking callback is caught and reported,
/// and neither stops the remaining callbacks nor reaches the connection's
/// read loop. No ordering is guaranteed across callbacks for one event.
pub fn dispatch(event: &str, payload: &Value, callbacks: &[Callback]) {
    for callback in callbacks {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(payload.clone()))) {
            let reason = panic_message(panic.as_ref());
            tracing::error!(event, "subscriber callback panicked: {reason}");
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
