//! Gateway request handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::error::GatewayError;
use crate::gateway::server::AppState;
use crate::http::request::RequestId;
use crate::observability::metrics;

/// Static greeting placed beside the data service payload on `GET /`.
pub const GREETING: &str = "Hello from Flask!";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub backend: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub frontend: String,
    pub backend: Value,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "frontend".to_string(),
    })
}

/// GET /ready - reachability of the data service `/health`, one attempt.
pub async fn ready(State(state): State<AppState>, request_id: RequestId) -> Response {
    let (status, backend) = match state.client.probe_health(&request_id).await {
        Ok(downstream) if downstream == StatusCode::OK => (StatusCode::OK, "connected"),
        Ok(downstream) => {
            tracing::warn!(request_id = %request_id, status = %downstream, "Backend health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Backend readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    let body = ReadyResponse {
        status: if status == StatusCode::OK { "ready" } else { "not_ready" }.to_string(),
        backend: backend.to_string(),
    };
    (status, Json(body)).into_response()
}

/// GET / - data service `/data`, wrapped beside the greeting.
pub async fn home(State(state): State<AppState>, request_id: RequestId) -> Response {
    tracing::info!(request_id = %request_id, "Home endpoint called");

    match fetch(&state, "/data", &request_id).await {
        Ok(data) => Json(HomeResponse {
            frontend: GREETING.to_string(),
            backend: data,
        })
        .into_response(),
        Err(response) => response,
    }
}

/// GET /clubs - data service `/footballClub`, passed through unchanged.
pub async fn clubs(State(state): State<AppState>, request_id: RequestId) -> Response {
    tracing::info!(request_id = %request_id, "Clubs endpoint called");

    match fetch(&state, "/footballClub", &request_id).await {
        Ok(body) => Json(body).into_response(),
        Err(response) => response,
    }
}

async fn fetch(state: &AppState, path: &str, request_id: &RequestId) -> Result<Value, Response> {
    match state.client.get_json(path, request_id).await {
        Ok(body) => {
            metrics::record_upstream(path, "ok");
            tracing::info!(request_id = %request_id, path, "Fetched from backend");
            Ok(body)
        }
        Err(e) => {
            let mapped = GatewayError::from(&e);
            metrics::record_upstream(path, mapped.outcome());
            tracing::error!(
                request_id = %request_id,
                path,
                error = %e,
                status = mapped.status_code().as_u16(),
                "Backend request failed"
            );
            Err(mapped.into_response_for(request_id))
        }
    }
}
