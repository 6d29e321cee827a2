//! Statistical data operations.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::{data_array, data_object};
use crate::error::ApiError;
use crate::http::Http;
use crate::resources::airports::DateRange;

/// Filters for [`Statistics::delays`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsDelayQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub granularity: String,
}

impl Default for StatisticsDelayQuery {
    fn default() -> Self {
        Self {
            airport: None,
            airline: None,
            start_date: None,
            end_date: None,
            granularity: "daily".to_string(),
        }
    }
}

/// Filters for [`Statistics::trends`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
    /// `"7d"`, `"30d"`, `"90d"` or `"1y"`.
    pub period: String,
}

impl Default for TrendQuery {
    fn default() -> Self {
        Self {
            airport: None,
            airline: None,
            period: "30d".to_string(),
        }
    }
}

/// Filters for [`Statistics::rankings`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub limit: u32,
}

impl Default for RankingQuery {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            limit: 10,
        }
    }
}

/// Filters for [`Statistics::predictions`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Operations for statistical data.
pub struct Statistics {
    http: Arc<Http>,
}

impl Statistics {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Fetches the system-wide statistics overview.
    pub async fn overview(&self, range: &DateRange) -> Result<Value, ApiError> {
        let response = self.http.get("/api/v2/statistics", Some(range)).await?;
        Ok(data_object(response))
    }

    /// Fetches delay statistics.
    pub async fn delays(&self, query: &StatisticsDelayQuery) -> Result<Value, ApiError> {
        let response = self
            .http
            .get("/api/v2/statistics/delays", Some(query))
            .await?;
        Ok(data_object(response))
    }

    /// Fetches performance metrics for an entity.
    ///
    /// `entity_type` is one of `"airport"`, `"airline"` or `"route"`.
    pub async fn performance(
        &self,
        entity_type: &str,
        entity_id: &str,
        range: &DateRange,
    ) -> Result<Value, ApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Params<'a> {
            entity_type: &'a str,
            entity_id: &'a str,
            #[serde(flatten)]
            range: &'a DateRange,
        }
        let response = self
            .http
            .get(
                "/api/v2/statistics/performance",
                Some(&Params {
                    entity_type,
                    entity_id,
                    range,
                }),
            )
            .await?;
        Ok(data_object(response))
    }

    /// Fetches trend data points for a metric.
    pub async fn trends(&self, metric: &str, query: &TrendQuery) -> Result<Vec<Value>, ApiError> {
        #[derive(Serialize)]
        struct Params<'a> {
            metric: &'a str,
            #[serde(flatten)]
            rest: &'a TrendQuery,
        }
        let response = self
            .http
            .get(
                "/api/v2/statistics/trends",
                Some(&Params {
                    metric,
                    rest: query,
                }),
            )
            .await?;
        Ok(data_array(response))
    }

    /// Fetches a ranked list for a category and metric.
    pub async fn rankings(
        &self,
        category: &str,
        metric: &str,
        query: &RankingQuery,
    ) -> Result<Vec<Value>, ApiError> {
        #[derive(Serialize)]
        struct Params<'a> {
            category: &'a str,
            metric: &'a str,
            #[serde(flatten)]
            rest: &'a RankingQuery,
        }
        let response = self
            .http
            .get(
                "/api/v2/statistics/rankings",
                Some(&Params {
                    category,
                    metric,
                    rest: query,
                }),
            )
            .await?;
        Ok(data_array(response))
    }

    /// Fetches predictions of the given type.
    pub async fn predictions(
        &self,
        prediction_type: &str,
        query: &PredictionQuery,
    ) -> Result<Value, ApiError> {
        #[derive(Serialize)]
        struct Params<'a> {
            #[serde(rename = "type")]
            prediction_type: &'a str,
            #[serde(flatten)]
            rest: &'a PredictionQuery,
        }
        let response = self
            .http
            .get(
                "/api/v2/statistics/predictions",
                Some(&Params {
                    prediction_type,
                    rest: query,
                }),
            )
            .await?;
        Ok(data_object(response))
    }
}
