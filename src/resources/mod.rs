//! Typed resource objects wrapping the REST endpoints.
//!
//! Each resource holds a handle to the shared HTTP transport and exposes the
//! operations of one API area. Payloads are opaque `serde_json::Value`
//! records; the `data` envelope field is unwrapped before returning.

pub mod airports;
pub mod batch;
pub mod export;
pub mod flights;
pub mod statistics;
pub mod webhooks;

pub use airports::Airports;
pub use batch::{Batch, BatchJob, BatchOperation};
pub use export::{Export, ExportFormat};
pub use flights::Flights;
pub use statistics::Statistics;
pub use webhooks::{Webhook, WebhookUpdate, Webhooks};

use serde_json::{Map, Value};

/// Unwraps a list-shaped `data` envelope, defaulting to empty.
pub(crate) fn data_array(mut response: Value) -> Vec<Value> {
    match response.get_mut("data").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Unwraps an object-shaped `data` envelope, defaulting to empty.
pub(crate) fn data_object(mut response: Value) -> Value {
    match response.get_mut("data").map(Value::take) {
        Some(value @ Value::Object(_)) => value,
        _ => Value::Object(Map::new()),
    }
}
