//! HTTP transport shared by the REST resources.
//!
//! A thin wrapper over `reqwest` that owns the authenticated client, maps
//! error statuses onto [`ApiError`], and retries transport-level failures up
//! to the configured attempt budget.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;

const USER_AGENT: &str = concat!("aerodata-rust/", env!("CARGO_PKG_VERSION"));

pub struct Http {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl Http {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| {
                ApiError::Authentication("API key contains invalid header characters".to_string())
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    pub async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> Result<Value, ApiError> {
        let mut req = self.client.get(self.url(path));
        if let Some(query) = query {
            req = req.query(query);
        }
        Ok(self.execute(req).await?.json().await?)
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let mut req = self.client.post(self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(self.execute(req).await?.json().await?)
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let mut req = self.client.put(self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(self.execute(req).await?.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let req = self.client.delete(self.url(path));
        Ok(self.execute(req).await?.json().await?)
    }

    /// GET returning the raw response, for endpoints whose body is streamed to
    /// disk rather than decoded.
    pub async fn get_raw<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> Result<Response, ApiError> {
        let mut req = self.client.get(self.url(path));
        if let Some(query) = query {
            req = req.query(query);
        }
        self.execute(req).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let mut last_err: Option<reqwest::Error> = None;
        for _ in 0..self.max_retries {
            // Bodies here are always JSON, so the builder stays cloneable.
            let Some(attempt) = req.try_clone() else { break };
            match attempt.send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => return Err(error_from_response(resp).await),
                // Only transport-level failures are retried; mapped API errors
                // never are.
                Err(e) if e.is_timeout() || e.is_connect() => {
                    tracing::debug!("request attempt failed: {e}");
                    last_err = Some(e);
                }
                Err(e) => return Err(ApiError::Transport(e)),
            }
        }
        match last_err {
            Some(e) => Err(ApiError::Transport(e)),
            // Non-cloneable builder: single attempt.
            None => match req.send().await {
                Ok(resp) if resp.status().is_success() => Ok(resp),
                Ok(resp) => Err(error_from_response(resp).await),
                Err(e) => Err(ApiError::Transport(e)),
            },
        }
    }
}

async fn error_from_response(resp: Response) -> ApiError {
    let status = resp.status();
    let retry_after = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = resp.text().await.unwrap_or_default();
    map_error(status, retry_after, &body)
}

/// Maps a non-success response onto the error taxonomy. The message comes from
/// the body's `error` field when the body is JSON, the raw body otherwise.
fn map_error(status: StatusCode, retry_after: Option<Duration>, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .unwrap_or_else(|| {
            if body.is_empty() {
                "unknown error".to_string()
            } else {
                body.to_string()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Authentication(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation(message),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited {
            message,
            retry_after,
        },
        _ => ApiError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http_for(server: &MockServer) -> Http {
        let config = ClientConfig::new("test-key").with_base_url(server.uri());
        Http::new(&config).expect("client should build")
    }

    #[test]
    fn test_map_error_statuses() {
        let body = r#"{"error":"nope"}"#;
        assert!(matches!(
            map_error(StatusCode::UNAUTHORIZED, None, body),
            ApiError::Authentication(m) if m == "nope"
        ));
        assert!(matches!(
            map_error(StatusCode::NOT_FOUND, None, body),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            map_error(StatusCode::BAD_REQUEST, None, body),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            map_error(StatusCode::UNPROCESSABLE_ENTITY, None, body),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            map_error(StatusCode::INTERNAL_SERVER_ERROR, None, body),
            ApiError::Api { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[test]
    fn test_map_error_message_fallback() {
        // Non-JSON bodies are used verbatim; empty bodies get a placeholder.
        assert!(matches!(
            map_error(StatusCode::NOT_FOUND, None, "plain text"),
            ApiError::NotFound(m) if m == "plain text"
        ));
        assert!(matches!(
            map_error(StatusCode::NOT_FOUND, None, ""),
            ApiError::NotFound(m) if m == "unknown error"
        ));
    }

    #[tokio::test]
    async fn test_get_sends_auth_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/flights"))
            .and(header("authorization", "Bearer test-key"))
            .and(query_param("airport", "SFO"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"flightNumber": "UA123"}]
            })))
            .mount(&server)
            .await;

        let http = http_for(&server);
        let body = http
            .get("/api/v2/flights", Some(&[("airport", "SFO")]))
            .await
            .expect("request should succeed");
        assert_eq!(body["data"][0]["flightNumber"], "UA123");
    }

    #[tokio::test]
    async fn test_rate_limit_carries_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/flights"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_json(serde_json::json!({"error": "slow down"})),
            )
            .mount(&server)
            .await;

        let http = http_for(&server);
        let err = http
            .get::<()>("/api/v2/flights", None)
            .await
            .expect_err("request should be rate limited");
        match err {
            ApiError::RateLimited {
                message,
                retry_after,
            } => {
                assert_eq!(message, "slow down");
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/airports/XXX"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "missing"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let http = http_for(&server);
        let err = http
            .get::<()>("/api/v2/airports/XXX", None)
            .await
            .expect_err("request should fail");
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_connect_failures_exhaust_retry_budget() {
        // Nothing listens on the mock server once it is dropped.
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        let config = ClientConfig::new("k")
            .with_base_url(uri)
            .with_max_retries(2)
            .with_timeout(Duration::from_secs(1));
        let http = Http::new(&config).expect("client should build");

        let err = http
            .get::<()>("/api/v2/flights", None)
            .await
            .expect_err("request should fail to connect");
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
