//! Main client for the Aerodata flight-data API.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::Http;
use crate::realtime::RealtimeClient;
use crate::resources::{Airports, Batch, Export, Flights, Statistics, Webhooks};

/// Entry point for the SDK.
///
/// Owns the authenticated HTTP transport and the realtime channel, and hands
/// out typed resource objects for each API area.
///
/// ```no_run
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// use aerodata::AerodataClient;
///
/// let client = AerodataClient::new("my-api-key")?;
/// let airport = client.airports().get("SFO").await?;
/// println!("{airport}");
///
/// client
///     .realtime()
///     .subscribe_flight("UA123", |update| println!("{update}"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct AerodataClient {
    config: ClientConfig,
    http: Arc<Http>,
    realtime: RealtimeClient,
}

impl AerodataClient {
    /// Creates a client for the production API with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::new(api_key))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        let http = Arc::new(Http::new(&config)?);
        let realtime = RealtimeClient::new(&config);
        Ok(Self {
            config,
            http,
            realtime,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Flight data operations.
    pub fn flights(&self) -> Flights {
        Flights::new(self.http.clone())
    }

    /// Airport data operations.
    pub fn airports(&self) -> Airports {
        Airports::new(self.http.clone())
    }

    /// Statistical data operations.
    pub fn statistics(&self) -> Statistics {
        Statistics::new(self.http.clone())
    }

    /// Bulk export operations.
    pub fn export(&self) -> Export {
        Export::new(self.http.clone())
    }

    /// Batch job operations.
    pub fn batch(&self) -> Batch {
        Batch::new(self.http.clone())
    }

    /// Webhook management.
    pub fn webhooks(&self) -> Webhooks {
        Webhooks::new(self.http.clone())
    }

    /// The realtime update channel.
    pub fn realtime(&self) -> &RealtimeClient {
        &self.realtime
    }

    /// Shuts down the realtime channel. The REST transport needs no
    /// teardown.
    pub async fn close(&self) {
        self.realtime.close().await;
    }
}
