//! Pass-through routes over the device-data API.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;
use time::OffsetDateTime;

use crate::app::AppState;
use crate::error::ApiError;
use crate::proxy::types::HealthBody;

pub async fn list_devices(State(st): State<AppState>) -> Result<Json<Value>, ApiError> {
    st.feed
        .list()
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Failed to fetch device data", &e))
}

pub async fn get_device(
    State(st): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    st.feed
        .get(&device_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Failed to fetch device by ID", &e))
}

pub async fn get_device_at(
    State(st): State<AppState>,
    Path((device_id, timestamp)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    st.feed
        .get_at(&device_id, &timestamp)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Failed to fetch device data by timestamp", &e))
}

pub async fn submit(
    State(st): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    st.feed
        .submit(body)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Failed to post device data", &e))
}

pub async fn health(State(st): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy",
        timestamp: OffsetDateTime::now_utc(),
        api_gateway: st.cfg.upstream.base_url.clone(),
    })
}
