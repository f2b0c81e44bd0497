//! Liveness and readiness endpoints

use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use fuglelitt_common::errors::Result;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    Healthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: Liveness,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: Readiness,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub store: StoreCheck,
}

/// Outcome of one catalog store ping
#[derive(Debug, Serialize)]
pub struct StoreCheck {
    pub status: StoreStatus,
    /// `postgres` or `memory`
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreCheck {
    fn from_ping(kind: &'static str, ping: Result<()>, elapsed: Duration) -> Self {
        match ping {
            Ok(()) => Self {
                status: StoreStatus::Up,
                kind,
                latency_ms: Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
                error: None,
            },
            Err(e) => Self {
                status: StoreStatus::Down,
                kind,
                latency_ms: None,
                error: Some(e.to_string()),
            },
        }
    }
}

impl ReadyResponse {
    fn from_store(store: StoreCheck) -> (StatusCode, Self) {
        let (code, status) = match store.status {
            StoreStatus::Up => (StatusCode::OK, Readiness::Ready),
            StoreStatus::Down => (StatusCode::SERVICE_UNAVAILABLE, Readiness::NotReady),
        };
        (
            code,
            Self {
                status,
                checks: ReadyChecks { store },
            },
        )
    }
}

/// Always healthy while the process serves requests
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: Liveness::Healthy,
        version: fuglelitt_common::VERSION,
    })
}

/// Ready once the catalog store answers a ping; 503 otherwise
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let kind = if state.config.uses_memory_store() { "memory" } else { "postgres" };
    let start = Instant::now();
    let ping = state.catalog.ping().await;
    let check = StoreCheck::from_ping(kind, ping, start.elapsed());

    if let Some(error) = &check.error {
        warn!(store = kind, error = %error, "Catalog store unreachable");
    }

    let (code, body) = ReadyResponse::from_store(check);
    (code, Json(body))
}
