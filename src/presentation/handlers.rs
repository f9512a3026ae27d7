// HTTP request handlers
use crate::domain::reading::{Draw, Reading};
use crate::presentation::app_state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchStatus {
    pub draw: Draw,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl From<&Reading> for SwitchStatus {
    fn from(reading: &Reading) -> Self {
        Self {
            draw: reading.draw,
            timestamp: reading.timestamp.timestamp_millis(),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest reading of every switch, keyed by lowercased switch label
pub async fn latest_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, SwitchStatus>>, StatusCode> {
    let readings = state.status_service.latest_readings().await.map_err(|e| {
        tracing::error!("Error fetching latest readings: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let status = readings
        .iter()
        .map(|r| (r.switch.to_lowercase(), SwitchStatus::from(r)))
        .collect();

    Ok(Json(status))
}
