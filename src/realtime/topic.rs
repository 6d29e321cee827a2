//! Canonical topics for subscribable streams.

use serde_json::{Value, json};

/// Entity kinds that can be subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Airport,
    Flight,
    Route,
}

impl TopicKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Airport => "airport",
            Self::Flight => "flight",
            Self::Route => "route",
        }
    }
}

/// Canonical key plus the wire payload for one subscribable stream.
///
/// Key derivation is pure and idempotent: the same logical subscription
/// always yields the same key, so repeated subscribe calls for the same
/// entity merge into one registry entry.
#[derive(Debug, Clone)]
pub struct Topic {
    key: String,
    kind: TopicKind,
    payload: Value,
}

impl Topic {
    /// Airport updates. IATA codes are case-normalized in the key; the wire
    /// payload carries the code as given, plus the event types when set.
    pub fn airport(code: &str, types: Option<&[String]>) -> Self {
        let mut payload = json!({ "airport": code });
        if let Some(types) = types {
            payload["types"] = json!(types);
        }
        Self {
            key: format!("airport:{}", code.to_uppercase()),
            kind: TopicKind::Airport,
            payload,
        }
    }

    /// Updates for one flight, identified verbatim.
    pub fn flight(flight_id: &str) -> Self {
        Self {
            key: format!("flight:{flight_id}"),
            kind: TopicKind::Flight,
            payload: json!({ "flightId": flight_id }),
        }
    }

    /// Updates for an origin-destination pair. Codes are used verbatim, not
    /// case-normalized.
    pub fn route(origin: &str, destination: &str) -> Self {
        Self {
            key: format!("route:{origin}-{destination}"),
            kind: TopicKind::Route,
            payload: json!({ "origin": origin, "destination": destination }),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> TopicKind {
        self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}
