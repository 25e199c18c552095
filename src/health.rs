//! Health endpoint handler, mounted only when `--health-path` is set.
//!
//! Returns a [`HealthResponse`] JSON payload containing the version,
//! uptime, listen address, configured targets, and cumulative dispatch
//! statistics.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub listen: String,
    pub targets: Vec<String>,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_delivered: u64,
    pub requests_failed: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        listen: state.listen.to_string(),
        targets: state
            .dispatcher
            .targets()
            .iter()
            .map(ToString::to_string)
            .collect(),
        stats: StatsResponse {
            requests_delivered: state.stats.delivered.load(Ordering::Relaxed),
            requests_failed: state.stats.all_failed.load(Ordering::Relaxed),
        },
    })
}
