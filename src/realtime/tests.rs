use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::dispatch::dispatch;
use super::protocol;
use super::registry::{Callback, Registry};
use super::topic::Topic;

#[test]
fn test_airport_topic_is_case_normalized() {
    assert_eq!(Topic::airport("sfo", None).key(), "airport:SFO");
    assert_eq!(
        Topic::airport("sfo", None).key(),
        Topic::airport("SFO", None).key()
    );
}

#[test]
fn test_route_topic_is_verbatim() {
    assert_eq!(Topic::route("sfo", "lax").key(), "route:sfo-lax");
    assert_ne!(
        Topic::route("sfo", "lax").key(),
        Topic::route("SFO", "LAX").key()
    );
}

#[test]
fn test_flight_topic_and_payload() {
    let topic = Topic::flight("UA123");
    assert_eq!(topic.key(), "flight:UA123");
    assert_eq!(topic.payload(), &json!({ "flightId": "UA123" }));
}

#[test]
fn test_airport_payload_carries_types() {
    let types = vec!["departure".to_string()];
    let topic = Topic::airport("sfo", Some(&types));
    assert_eq!(
        topic.payload(),
        &json!({ "airport": "sfo", "types": ["departure"] })
    );
}

#[test]
fn test_registry_merges_same_topic() {
    let mut registry = Registry::new();
    let noop: Callback = Arc::new(|_| {});

    let (_h1, first) = registry.register(Topic::airport("SFO", None), noop.clone());
    assert!(first);
    let (_h2, second) = registry.register(Topic::airport("sfo", None), noop);
    assert!(!second);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_registry_removing_one_callback_keeps_topic_active() {
    let mut registry = Registry::new();
    let noop: Callback = Arc::new(|_| {});

    let (h1, _) = registry.register(Topic::flight("UA123"), noop.clone());
    let (_h2, _) = registry.register(Topic::flight("UA123"), noop);

    assert!(registry.unregister("flight:UA123", Some(h1.id)).is_none());
    assert!(registry.contains("flight:UA123"));
    assert_eq!(registry.callbacks_for("flight:UA123").len(), 1);
}

#[test]
fn test_registry_removing_last_callback_drops_entry() {
    let mut registry = Registry::new();
    let noop: Callback = Arc::new(|_| {});

    let (h, _) = registry.register(Topic::flight("UA123"), noop);
    let removed = registry.unregister("flight:UA123", Some(h.id));

    assert!(removed.is_some());
    assert_eq!(removed.unwrap().key(), "flight:UA123");
    assert!(!registry.contains("flight:UA123"));
    assert!(registry.is_empty());
}

#[test]
fn test_registry_unregister_without_handle_clears_topic() {
    let mut registry = Registry::new();
    let noop: Callback = Arc::new(|_| {});

    registry.register(Topic::airport("SFO", None), noop.clone());
    registry.register(Topic::airport("SFO", None), noop);

    assert!(registry.unregister("airport:SFO", None).is_some());
    assert!(registry.is_empty());
}

#[test]
fn test_websocket_url_rewrites_scheme() {
    assert_eq!(
        protocol::websocket_url("https://api.aerodata.io"),
        "wss://api.aerodata.io/socket.io/?EIO=4&transport=websocket"
    );
    assert_eq!(
        protocol::websocket_url("http://localhost:3000"),
        "ws://localhost:3000/socket.io/?EIO=4&transport=websocket"
    );
}

#[test]
fn test_encode_event_with_and_without_data() {
    assert_eq!(
        protocol::encode_event("subscribe:flight", Some(&json!({ "flightId": "UA123" }))),
        r#"42["subscribe:flight",{"flightId":"UA123"}]"#
    );
    assert_eq!(protocol::encode_event("ping", None), r#"42["ping"]"#);
}

#[test]
fn test_encode_subscribe_frame_roundtrips() {
    let frame = protocol::encode_subscribe(&Topic::route("SFO", "LAX"));
    let (event, payload) = protocol::decode_event(&frame).expect("frame should decode");
    assert_eq!(event, "subscribe:route");
    assert_eq!(payload, json!({ "origin": "SFO", "destination": "LAX" }));
}

#[test]
fn test_decode_event_frame() {
    let (event, payload) =
        protocol::decode_event(r#"42["airport:SFO",{"activeFlights":3}]"#).expect("should decode");
    assert_eq!(event, "airport:SFO");
    assert_eq!(payload, json!({ "activeFlights": 3 }));
}

#[test]
fn test_decode_defaults_missing_payload_to_empty_object() {
    let (event, payload) = protocol::decode_event(r#"42["flight:UA123"]"#).expect("should decode");
    assert_eq!(event, "flight:UA123");
    assert_eq!(payload, json!({}));
}

#[test]
fn test_decode_drops_non_event_frames() {
    // Heartbeats, the handshake itself, malformed JSON, and frames whose
    // first element is not a string are all silently discarded.
    assert!(protocol::decode_event("3").is_none());
    assert!(protocol::decode_event("40").is_none());
    assert!(protocol::decode_event("42{not json").is_none());
    assert!(protocol::decode_event("42[]").is_none());
    assert!(protocol::decode_event("42[5]").is_none());
}

#[test]
fn test_dispatch_isolates_panicking_callback() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let invoked_clone = invoked.clone();

    let panicking: Callback = Arc::new(|_| panic!("subscriber bug"));
    let counting: Callback = Arc::new(move |_| {
        invoked_clone.fetch_add(1, Ordering::SeqCst);
    });

    // Order is not guaranteed, so cover both: the counting callback must run
    // no matter where the panicking one lands.
    dispatch("airport:SFO", &json!({}), &[panicking.clone(), counting.clone()]);
    dispatch("airport:SFO", &json!({}), &[counting, panicking]);
    assert_eq!(invoked.load(Ordering::SeqCst), 2);
}

#[test]
fn test_dispatch_passes_payload_to_every_callback() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let callbacks: Vec<Callback> = (0..2)
        .map(|_| {
            let seen = seen.clone();
            let callback: Callback = Arc::new(move |payload| {
                seen.lock().unwrap().push(payload);
            });
            callback
        })
        .collect();

    dispatch("flight:UA123", &json!({ "status": "delayed" }), &callbacks);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|p| p == &json!({ "status": "delayed" })));
}
