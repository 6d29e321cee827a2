//! Error types for the Aerodata SDK.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the REST resources.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("request validation failed: {0}")]
    Validation(String),

    #[error("rate limited (retry after {retry_after:?}): {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("batch job {job_id} did not complete within {waited:?}")]
    BatchTimeout { job_id: String, waited: Duration },
}

/// Errors surfaced synchronously by the realtime update channel.
///
/// Failures that happen on the background connection task after it is running
/// (socket errors, unsolicited closes, callback panics) have no caller to
/// propagate to; they are reported through `tracing` instead.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The connect attempt did not reach `Connected` within the bounded wait,
    /// or the socket failed to open.
    #[error("failed to connect to realtime endpoint: {0}")]
    Connection(String),

    /// The websocket client request could not be built.
    #[error("websocket handshake failed: {0}")]
    Handshake(#[from] tungstenite::Error),
}
