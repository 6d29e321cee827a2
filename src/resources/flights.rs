//! Flight data operations.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::{data_array, data_object};
use crate::error::ApiError;
use crate::http::Http;

/// Filters for [`Flights::list`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    /// `"departure"` or `"arrival"`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub flight_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for FlightListQuery {
    fn default() -> Self {
        Self {
            airport: None,
            flight_type: None,
            start_date: None,
            end_date: None,
            airline: None,
            status: None,
            limit: 100,
            offset: 0,
        }
    }
}

/// Filters for [`Flights::search`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
}

/// Filters for [`Flights::delays`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDelayQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    pub min_delay: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Filters for [`Flights::cancellations`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightCancellationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Operations for flight data.
pub struct Flights {
    http: Arc<Http>,
}

impl Flights {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Lists flights matching the given filters.
    pub async fn list(&self, query: &FlightListQuery) -> Result<Vec<Value>, ApiError> {
        let response = self.http.get("/api/v2/flights", Some(query)).await?;
        Ok(data_array(response))
    }

    /// Fetches details for a specific flight.
    pub async fn get(&self, flight_id: &str) -> Result<Value, ApiError> {
        let response = self
            .http
            .get::<()>(&format!("/api/v2/flights/{flight_id}"), None)
            .await?;
        Ok(data_object(response))
    }

    /// Searches for flights by flight number.
    pub async fn search(
        &self,
        flight_number: &str,
        query: &FlightSearchQuery,
    ) -> Result<Vec<Value>, ApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Params<'a> {
            flight_number: &'a str,
            #[serde(flatten)]
            rest: &'a FlightSearchQuery,
        }
        let response = self
            .http
            .get(
                "/api/v2/flights/search",
                Some(&Params {
                    flight_number,
                    rest: query,
                }),
            )
            .await?;
        Ok(data_array(response))
    }

    /// Lists delayed flights.
    pub async fn delays(&self, query: &FlightDelayQuery) -> Result<Vec<Value>, ApiError> {
        let response = self.http.get("/api/v2/flights/delays", Some(query)).await?;
        Ok(data_array(response))
    }

    /// Lists cancelled flights.
    pub async fn cancellations(
        &self,
        query: &FlightCancellationQuery,
    ) -> Result<Vec<Value>, ApiError> {
        let response = self
            .http
            .get("/api/v2/flights/cancellations", Some(query))
            .await?;
        Ok(data_array(response))
    }

    /// Fetches real-time tracking data for one flight.
    pub async fn track(&self, flight_number: &str, date: &str) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(
                "/api/v2/flights/track",
                Some(&[("flightNumber", flight_number), ("date", date)]),
            )
            .await?;
        Ok(data_object(response))
    }
}
