//! Airport data operations.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::{data_array, data_object};
use crate::error::ApiError;
use crate::http::Http;

/// Optional date window shared by several airport endpoints.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Filters for [`Airports::stats`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportStatsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// `"hourly"`, `"daily"`, `"weekly"` or `"monthly"`.
    pub granularity: String,
}

impl Default for AirportStatsQuery {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            granularity: "daily".to_string(),
        }
    }
}

/// Filters for [`Airports::traffic`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportTrafficQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Hour of day, 0-23.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
}

/// Operations for airport data.
pub struct Airports {
    http: Arc<Http>,
}

impl Airports {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Lists all available airports.
    pub async fn list(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.http.get::<()>("/api/v2/airports", None).await?;
        Ok(data_array(response))
    }

    /// Fetches details for one airport by IATA code.
    pub async fn get(&self, airport_code: &str) -> Result<Value, ApiError> {
        let response = self
            .http
            .get::<()>(&format!("/api/v2/airports/{airport_code}"), None)
            .await?;
        Ok(data_object(response))
    }

    /// Fetches statistics for an airport.
    pub async fn stats(
        &self,
        airport_code: &str,
        query: &AirportStatsQuery,
    ) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(&format!("/api/v2/airports/{airport_code}/stats"), Some(query))
            .await?;
        Ok(data_object(response))
    }

    /// Lists airlines operating at an airport.
    pub async fn airlines(&self, airport_code: &str) -> Result<Vec<Value>, ApiError> {
        let response = self
            .http
            .get::<()>(&format!("/api/v2/airports/{airport_code}/airlines"), None)
            .await?;
        Ok(data_array(response))
    }

    /// Lists destinations served from an airport.
    pub async fn destinations(&self, airport_code: &str) -> Result<Vec<Value>, ApiError> {
        let response = self
            .http
            .get::<()>(
                &format!("/api/v2/airports/{airport_code}/destinations"),
                None,
            )
            .await?;
        Ok(data_array(response))
    }

    /// Fetches delay statistics for an airport.
    pub async fn delays(&self, airport_code: &str, range: &DateRange) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(
                &format!("/api/v2/airports/{airport_code}/delays"),
                Some(range),
            )
            .await?;
        Ok(data_object(response))
    }

    /// Fetches current weather at an airport.
    pub async fn weather(&self, airport_code: &str) -> Result<Value, ApiError> {
        let response = self
            .http
            .get::<()>(&format!("/api/v2/airports/{airport_code}/weather"), None)
            .await?;
        Ok(data_object(response))
    }

    /// Fetches traffic data for an airport.
    pub async fn traffic(
        &self,
        airport_code: &str,
        query: &AirportTrafficQuery,
    ) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(
                &format!("/api/v2/airports/{airport_code}/traffic"),
                Some(query),
            )
            .await?;
        Ok(data_object(response))
    }
}
