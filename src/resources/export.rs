//! Bulk data export.
//!
//! Export endpoints stream their body; the resource writes the stream to disk
//! chunk by chunk and returns the canonical path of the written file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::ApiError;
use crate::http::Http;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Parquet,
}

impl ExportFormat {
    /// File extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Json
    }
}

/// Filters for [`Export::flights`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFlightsQuery {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub flight_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
    pub limit: u32,
}

impl Default for ExportFlightsQuery {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            airport: None,
            start_date: None,
            end_date: None,
            flight_type: None,
            airline: None,
            limit: 10_000,
        }
    }
}

/// Filters for [`Export::statistics`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStatisticsQuery {
    pub format: ExportFormat,
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub granularity: String,
}

impl Default for ExportStatisticsQuery {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            metric: "all".to_string(),
            airport: None,
            start_date: None,
            end_date: None,
            granularity: "daily".to_string(),
        }
    }
}

/// Filters for [`Export::aggregated`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAggregatedQuery {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl Default for ExportAggregatedQuery {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            airport: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// Operations for data export.
pub struct Export {
    http: Arc<Http>,
}

impl Export {
    pub(crate) fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Exports flight data to a file and returns its path.
    ///
    /// When `output` is `None` the file is written to
    /// `flights_export.<ext>` in the working directory.
    pub async fn flights(
        &self,
        query: &ExportFlightsQuery,
        output: Option<&Path>,
    ) -> Result<PathBuf, ApiError> {
        let response = self
            .http
            .get_raw("/api/v2/export/flights", Some(query))
            .await?;
        let path = output_path(output, "flights_export", query.format);
        write_stream(response, &path).await
    }

    /// Exports statistics data to a file and returns its path.
    pub async fn statistics(
        &self,
        query: &ExportStatisticsQuery,
        output: Option<&Path>,
    ) -> Result<PathBuf, ApiError> {
        let response = self
            .http
            .get_raw("/api/v2/export/statistics", Some(query))
            .await?;
        let path = output_path(output, "statistics_export", query.format);
        write_stream(response, &path).await
    }

    /// Exports aggregated data to a file and returns its path.
    ///
    /// `aggregation` is e.g. `"sum"`, `"avg"`, `"count"`; `group_by` is the
    /// grouping field (`"date"`, `"airport"`, `"airline"`, ...).
    pub async fn aggregated(
        &self,
        aggregation: &str,
        group_by: &str,
        query: &ExportAggregatedQuery,
        output: Option<&Path>,
    ) -> Result<PathBuf, ApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Params<'a> {
            aggregation: &'a str,
            group_by: &'a str,
            #[serde(flatten)]
            rest: &'a ExportAggregatedQuery,
        }
        let response = self
            .http
            .get_raw(
                "/api/v2/export/aggregated",
                Some(&Params {
                    aggregation,
                    group_by,
                    rest: query,
                }),
            )
            .await?;
        let path = output_path(output, "aggregated_export", query.format);
        write_stream(response, &path).await
    }
}

fn output_path(output: Option<&Path>, stem: &str, format: ExportFormat) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("{stem}.{}", format.extension())),
    }
}

async fn write_stream(response: reqwest::Response, path: &Path) -> Result<PathBuf, ApiError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(tokio::fs::canonicalize(path).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use wiremock::matchers::{method, path as url_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::ClientConfig;

    #[tokio::test]
    async fn test_flights_export_writes_streamed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/api/v2/export/flights"))
            .and(query_param("format", "csv"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("flight,status\nUA123,on-time\n"),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new("test-key").with_base_url(server.uri());
        let export = Export::new(Arc::new(Http::new(&config).expect("client should build")));

        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("flights.csv");
        let query = ExportFlightsQuery {
            format: ExportFormat::Csv,
            ..ExportFlightsQuery::default()
        };

        let written = export
            .flights(&query, Some(&output))
            .await
            .expect("export should succeed");
        let contents = std::fs::read_to_string(&written).expect("file should exist");
        assert_eq!(contents, "flight,status\nUA123,on-time\n");
    }

    #[test]
    fn test_default_output_path_uses_format_extension() {
        assert_eq!(
            output_path(None, "flights_export", ExportFormat::Parquet),
            PathBuf::from("flights_export.parquet")
        );
        assert_eq!(
            output_path(Some(Path::new("/tmp/out.bin")), "flights_export", ExportFormat::Json),
            PathBuf::from("/tmp/out.bin")
        );
    }
}
