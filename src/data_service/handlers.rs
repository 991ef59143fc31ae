//! Data service request handlers.

use axum::{extract::State, response::Response, Json};
use serde::{Deserialize, Serialize};

use crate::data_service::error::DataError;
use crate::data_service::models::{ClubsResponse, ItemsResponse};
use crate::data_service::server::AppState;
use crate::http::request::RequestId;
use crate::observability::metrics;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub database: String,
    pub pool_available: u32,
}

/// GET /health - liveness only, never touches the database.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "backend".to_string(),
    })
}

/// GET /ready - one pooled connection, one `SELECT 1`.
pub async fn ready(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<ReadyResponse>, Response> {
    match state.store.probe().await {
        Ok(pool) => {
            let available = pool.available();
            metrics::record_pool_available(available);
            Ok(Json(ReadyResponse {
                status: "ready".to_string(),
                database: "connected".to_string(),
                pool_available: available,
            }))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Readiness check failed");
            Err(DataError::from_probe(&e).into_response_for(&request_id))
        }
    }
}

/// GET /data
pub async fn list_items(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<ItemsResponse>, Response> {
    tracing::info!(request_id = %request_id, "Fetching data from items table");

    match state.store.list_items().await {
        Ok(items) => {
            tracing::info!(request_id = %request_id, count = items.len(), "Fetched items");
            Ok(Json(ItemsResponse { data: items }))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Database error in list_items");
            Err(DataError::from_query(&e).into_response_for(&request_id))
        }
    }
}

/// GET /footballClub
pub async fn list_clubs(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<ClubsResponse>, Response> {
    tracing::info!(request_id = %request_id, "Fetching football clubs");

    match state.store.list_clubs().await {
        Ok(clubs) => {
            tracing::info!(request_id = %request_id, count = clubs.len(), "Fetched clubs");
            Ok(Json(ClubsResponse { clubs }))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Database error in list_clubs");
            Err(DataError::from_query(&e).into_response_for(&request_id))
        }
    }
}
