//! Webhook management and delivery-signature verification.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::Sha256;

use crate::error::ApiError;
use crate::http::Http;

type HmacSha256 = Hmac<Sha256>;

/// A webhook subscription as reported by the API.
#[derive(Debug, Clone)]
pub struct Webhook {
    pub id: String,
    pub url: String,
    pub events: Vec<String>,
    pub filters: Value,
    pub secret: Option<String>,
    pub active: bool,
    pub created_at: Option<String>,
    pub last_delivery: Option<String>,
    pub delivery_attempts: u64,
    pub failure_count: u64,
}

impl Webhook {
    pub fn from_value(data: &Value) -> Self {
        let string = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            id: string("id").unwrap_or_default(),
            url: string("url").unwrap_or_default(),
            events: data
                .get("events")
                .and_then(Value::as_array)
                .map(|events| {
                    events
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            filters: data.get("filters").cloned().unwrap_or_else(|| json!({})),
            secret: string("secret"),
            active: data.get("active").and_then(Value::as_bool).unwrap_or(true),
            created_at: string("createdAt"),
            last_delivery: string("lastDelivery"),
            delivery_attempts: data
                .get("deliveryAttempts")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            failure_count: data
                .get("failureCount")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        }
    }
}

/// Fields accepted by [`Webhooks::update`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct WebhookUpdate {
    pub url: Option<String>,
    pub events: Option<Vec<String>>,
    pub filters: Option<Value>,
    pub active: Option<bool>,
}

/// Operations for webhook management.
pub struct Webhooks {
    http: Arc<Http>,
}

impl Webhooks {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Creates a new webhook subscription.
    pub async fn create(
        &self,
        url: &str,
        events: &[&str],
        filters: Option<Value>,
        secret: Option<&str>,
    ) -> Result<Webhook, ApiError> {
        let mut body = json!({ "url": url, "events": events });
        if let Some(filters) = filters {
            body["filters"] = filters;
        }
        if let Some(secret) = secret {
            body["secret"] = json!(secret);
        }
        let response = self.http.post("/api/v2/webhooks", Some(&body)).await?;
        Ok(webhook_from(&response))
    }

    /// Lists all webhooks for the authenticated user.
    pub async fn list(&self) -> Result<Vec<Webhook>, ApiError> {
        let response = self.http.get::<()>("/api/v2/webhooks", None).await?;
        let webhooks = response
            .get("webhooks")
            .and_then(Value::as_array)
            .map(|hooks| hooks.iter().map(Webhook::from_value).collect())
            .unwrap_or_default();
        Ok(webhooks)
    }

    /// Fetches one webhook.
    pub async fn get(&self, webhook_id: &str) -> Result<Webhook, ApiError> {
        let response = self
            .http
            .get::<()>(&format!("/api/v2/webhooks/{webhook_id}"), None)
            .await?;
        Ok(webhook_from(&response))
    }

    /// Updates a webhook. Only the set fields are sent.
    pub async fn update(
        &self,
        webhook_id: &str,
        update: &WebhookUpdate,
    ) -> Result<Webhook, ApiError> {
        let mut body = json!({});
        if let Some(url) = &update.url {
            body["url"] = json!(url);
        }
        if let Some(events) = &update.events {
            body["events"] = json!(events);
        }
        if let Some(filters) = &update.filters {
            body["filters"] = filters.clone();
        }
        if let Some(active) = update.active {
            body["active"] = json!(active);
        }
        let response = self
            .http
            .put(&format!("/api/v2/webhooks/{webhook_id}"), Some(&body))
            .await?;
        Ok(webhook_from(&response))
    }

    /// Deletes a webhook.
    pub async fn delete(&self, webhook_id: &str) -> Result<Value, ApiError> {
        self.http
            .delete(&format!("/api/v2/webhooks/{webhook_id}"))
            .await
    }

    /// Triggers a test delivery.
    pub async fn test(&self, webhook_id: &str) -> Result<Value, ApiError> {
        self.http
            .post(&format!("/api/v2/webhooks/{webhook_id}/test"), None)
            .await
    }

    /// Disables deliveries for a webhook.
    pub async fn pause(&self, webhook_id: &str) -> Result<Webhook, ApiError> {
        self.update(
            webhook_id,
            &WebhookUpdate {
                active: Some(false),
                ..WebhookUpdate::default()
            },
        )
        .await
    }

    /// Re-enables deliveries for a webhook.
    pub async fn resume(&self, webhook_id: &str) -> Result<Webhook, ApiError> {
        self.update(
            webhook_id,
            &WebhookUpdate {
                active: Some(true),
                ..WebhookUpdate::default()
            },
        )
        .await
    }

    /// Event names the API can deliver.
    pub fn available_events() -> &'static [&'static str] {
        &[
            "flight.delayed",
            "flight.cancelled",
            "flight.statusChange",
            "flight.gateChange",
            "airport.stats",
            "collection.completed",
            "system.alert",
        ]
    }

    /// Verifies the `X-Webhook-Signature` header of a delivery.
    ///
    /// The signature is the hex-encoded HMAC-SHA256 of the raw request body
    /// keyed by the webhook secret; comparison is constant-time.
    pub fn verify_signature(secret: &str, payload: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(payload.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

fn webhook_from(response: &Value) -> Webhook {
    let record = response.get("webhook").cloned().unwrap_or_else(|| json!({}));
    Webhook::from_value(&record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_accepts_valid() {
        let payload = r#"{"event":"flight.delayed","flightId":"UA123"}"#;
        let signature = sign("hook-secret", payload);
        assert!(Webhooks::verify_signature("hook-secret", payload, &signature));
    }

    #[test]
    fn test_verify_signature_rejects_tampering() {
        let payload = r#"{"event":"flight.delayed"}"#;
        let signature = sign("hook-secret", payload);
        assert!(!Webhooks::verify_signature(
            "hook-secret",
            r#"{"event":"flight.cancelled"}"#,
            &signature
        ));
        assert!(!Webhooks::verify_signature("other-secret", payload, &signature));
        assert!(!Webhooks::verify_signature(
            "hook-secret",
            payload,
            "not hex at all"
        ));
    }

    #[test]
    fn test_webhook_from_value_defaults() {
        let hook = Webhook::from_value(&serde_json::json!({
            "id": "wh-1",
            "url": "https://example.com/hook",
            "events": ["flight.delayed"],
        }));
        assert_eq!(hook.id, "wh-1");
        assert_eq!(hook.events, vec!["flight.delayed"]);
        assert!(hook.active);
        assert_eq!(hook.delivery_attempts, 0);
    }
}
