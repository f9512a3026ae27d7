// InfluxDB repository implementation
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::{Draw, Reading};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

const READINGS_AFTER_QUERY: &str =
    "SELECT \"draw\" FROM \"${measurement}\" WHERE time > '${cutoff}' GROUP BY \"switch\" ORDER BY time ASC";
const LATEST_READING_QUERY: &str =
    "SELECT last(\"draw\") AS \"draw\" FROM \"${measurement}\" WHERE \"switch\" = '${switch}'";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to send request to InfluxDB: {0}")]
    Request(#[from] reqwest::Error),

    #[error("InfluxDB query failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("InfluxDB query error: {0}")]
    Query(String),
}

#[derive(Debug, Clone)]
pub struct InfluxReadingRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    tags: Option<HashMap<String, String>>,
}

impl InfluxReadingRepository {
    pub fn new(
        host: String,
        token: String,
        database: String,
        retention_policy: String,
        measurement: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
            measurement,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse, StoreError> {
        tracing::debug!("Executing reading query: {}", query);

        let mut request = self
            .client
            .get(self.build_query_url(query))
            .header("Accept", "application/json");
        if !self.token.is_empty() {
            request = request.header("Authorization", format!("Token {}", self.token));
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let data = response.json::<InfluxQLResponse>().await?;

        if let Some(error) = data.results.first().and_then(|r| r.error.clone()) {
            return Err(StoreError::Query(error));
        }

        Ok(data)
    }

    fn vars(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert("measurement", escape_identifier(&self.measurement));
        vars
    }
}

#[async_trait]
impl ReadingRepository for InfluxReadingRepository {
    async fn readings_after(&self, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<Reading>> {
        let mut vars = self.vars();
        vars.insert(
            "cutoff",
            cutoff.to_rfc3339_opts(SecondsFormat::Nanos, true),
        );
        let query = render_query(READINGS_AFTER_QUERY, &vars);

        let response = self
            .execute_query(&query)
            .await
            .with_context(|| format!("Failed to query readings after {}", cutoff))?;

        let mut readings = readings_from_response(response, None);
        // Series come back per switch; merge them into one timeline
        readings.sort_by_key(|r| r.timestamp);

        tracing::debug!("Found {} readings after {}", readings.len(), cutoff);
        Ok(readings)
    }

    async fn latest_reading(&self, switch: &str) -> anyhow::Result<Option<Reading>> {
        let mut vars = self.vars();
        vars.insert("switch", escape_string(switch));
        let query = render_query(LATEST_READING_QUERY, &vars);

        let response = self
            .execute_query(&query)
            .await
            .with_context(|| format!("Failed to query latest reading for {}", switch))?;

        Ok(readings_from_response(response, Some(switch)).pop())
    }
}

/// Replace `${name}` placeholders in a query template
fn render_query(template: &str, vars: &HashMap<&'static str, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn escape_identifier(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Convert every well-formed row into a reading. Rows missing a time or a
/// non-negative draw are skipped with a warning.
fn readings_from_response(response: InfluxQLResponse, switch: Option<&str>) -> Vec<Reading> {
    let mut readings = Vec::new();

    let Some(series_list) = response.results.into_iter().next().and_then(|r| r.series) else {
        return readings;
    };

    for series in series_list {
        let series_switch = series
            .tags
            .as_ref()
            .and_then(|tags| tags.get("switch").cloned())
            .or_else(|| switch.map(str::to_string));
        let Some(series_switch) = series_switch else {
            tracing::warn!("Skipping series without a switch tag");
            continue;
        };

        let time_idx = series.columns.iter().position(|c| c == "time").unwrap_or(0);
        let draw_idx = series.columns.iter().position(|c| c == "draw").unwrap_or(1);

        for row in &series.values {
            let timestamp = row
                .get(time_idx)
                .and_then(|v| v.as_str())
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc));
            let draw = row.get(draw_idx).and_then(parse_draw);

            match (timestamp, draw) {
                (Some(timestamp), Some(draw)) => {
                    readings.push(Reading::new(series_switch.clone(), draw, timestamp));
                }
                _ => tracing::warn!("Skipping malformed {} row: {:?}", series_switch, row),
            }
        }
    }

    readings
}

fn parse_draw(value: &serde_json::Value) -> Option<Draw> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as Draw)
    })
}
