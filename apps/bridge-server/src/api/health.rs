// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Bound on the ledger probe of the readiness check.
pub const READINESS_TIMEOUT: Duration = Duration::from_millis(800);

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LivenessResponse {
    pub status: String,
    /// Seconds since the server started.
    pub uptime_sec: u64,
    pub timestamp: DateTime<Utc>,
    /// Deployment environment name (`APP_ENV`).
    pub env: String,
}

/// Readiness response with per-dependency status.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    pub uptime_sec: u64,
    pub timestamp: DateTime<Utc>,
    pub dependencies: Dependencies,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dependencies {
    /// Fiat ledger ("ok" or "down").
    pub ledger: String,
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = LivenessResponse)
    )
)]
pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".to_string(),
        uptime_sec: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
        env: state.app_env.clone(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if the ledger answers within [`READINESS_TIMEOUT`].
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Ledger unavailable", body = ReadinessResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let ledger_ok = match tokio::time::timeout(READINESS_TIMEOUT, state.fiat_ledger.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Ledger readiness check failed");
            false
        }
        Err(_) => {
            tracing::warn!("Ledger readiness check timed out");
            false
        }
    };

    let response = ReadinessResponse {
        status: if ledger_ok { "ok" } else { "degraded" }.to_string(),
        uptime_sec: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
        dependencies: Dependencies {
            ledger: if ledger_ok { "ok" } else { "down" }.to_string(),
        },
    };

    let status = if ledger_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryLedger, ScriptedReader, TestApp};
    use std::sync::Arc;

    #[tokio::test]
    async fn liveness_reports_env() {
        let app = TestApp::new(ScriptedReader::new());
        let Json(response) = liveness(State(app.state.clone())).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.env, "test");
    }

    #[tokio::test]
    async fn readiness_ok_with_open_ledger() {
        let app = TestApp::new(ScriptedReader::new());
        let (status, Json(response)) = readiness(State(app.state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.status, "ok");
        assert_eq!(response.dependencies.ledger, "ok");
    }

    #[tokio::test]
    async fn readiness_degraded_when_ledger_fails() {
        let app = TestApp::new(ScriptedReader::new());
        let state = app
            .state
            .clone()
            .with_fiat_ledger(Arc::new(MemoryLedger::new().failing()));
        let (status, Json(response)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status, "degraded");
        assert_eq!(response.dependencies.ledger, "down");
    }

    #[tokio::test]
    async fn readiness_reports_uptime_and_timestamp() {
        let app = TestApp::new(ScriptedReader::new());
        let before = Utc::now();
        let (_, Json(response)) = readiness(State(app.state.clone())).await;
        assert!(response.timestamp >= before);
        assert!(response.uptime_sec < 60);

        let value = serde_json::to_value(&response).unwrap();
        for key in ["status", "uptimeSec", "timestamp", "dependencies"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
