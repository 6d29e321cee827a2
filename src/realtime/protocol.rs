//! Socket.IO-style framing over the raw websocket.
//!
//! Translates between logical operations (handshake, subscribe, unsubscribe,
//! inbound event) and the text frames of the sub-protocol. Event frames are
//! the marker `"42"` followed by a JSON array whose first element is the
//! event name and whose optional second element is the payload.

use serde_json::{Map, Value, json};

use crate::realtime::topic::Topic;

/// Handshake literal, sent once after socket-open; the server accepts no
/// event frame before it.
pub const HANDSHAKE: &str = "40";

/// Marker prefixing every event frame.
pub const EVENT_PREFIX: &str = "42";

/// Query suffix identifying the protocol version and transport.
pub const CONNECT_SUFFIX: &str = "/socket.io/?EIO=4&transport=websocket";

/// Derives the websocket URL from the configured API base URL.
pub fn websocket_url(base_url: &str) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    };
    format!("{ws_base}{CONNECT_SUFFIX}")
}

/// Encodes an outbound event frame. The array has a single element when
/// there is no payload.
pub fn encode_event(name: &str, data: Option<&Value>) -> String {
    let array = match data {
        Some(data) => json!([name, data]),
        None => json!([name]),
    };
    format!("{EVENT_PREFIX}{array}")
}

pub fn encode_subscribe(topic: &Topic) -> String {
    encode_event(
        &format!("subscribe:{}", topic.kind().as_str()),
        Some(topic.payload()),
    )
}

pub fn encode_unsubscribe(topic: &Topic) -> String {
    encode_event(
        &format!("unsubscribe:{}", topic.kind().as_str()),
        Some(topic.payload()),
    )
}

/// Decodes an inbound text frame into `(event_name, payload)`.
///
/// Anything that is not a well-formed event frame — heartbeats, other
/// protocol-internal markers, malformed JSON — decodes to `None` and is
/// dropped by the caller. A missing payload defaults to an empty object.
pub fn decode_event(raw: &str) -> Option<(String, Value)> {
    let body = raw.strip_prefix(EVENT_PREFIX)?;
    let mut array: Vec<Value> = serde_json::from_str(body).ok()?;
    if array.is_empty() {
        return None;
    }
    let payload = if array.len() > 1 {
        array.swap_remove(1)
    } else {
        Value::Object(Map::new())
    };
    match array.swap_remove(0) {
        Value::String(name) => Some((name, payload)),
        _ => None,
    }
}
