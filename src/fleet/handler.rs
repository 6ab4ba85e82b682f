use axum::extract::{Path, Query, State};
use axum::Json;
use time::OffsetDateTime;

use crate::app::AppState;
use crate::dashboard::DashboardSnapshot;
use crate::domain::aggregate::{family_summary, FamilySummary};
use crate::domain::geo::{fleet_map, FleetMap};
use crate::domain::{DeviceRecord, EquipmentGroup, MewpVariant};
use crate::error::{ApiError, FleetError};
use crate::fleet::types::{FleetDevice, FleetQuery, HistoryQuery, DEFAULT_HISTORY_LIMIT};

fn present(records: Vec<DeviceRecord>) -> Vec<FleetDevice> {
    let now = OffsetDateTime::now_utc();
    records
        .into_iter()
        .map(|r| FleetDevice::new(r, now))
        .collect()
}

async fn select(st: &AppState, query: &FleetQuery) -> Result<Vec<DeviceRecord>, FleetError> {
    if let Some(code) = query.variant.as_deref() {
        let variant: MewpVariant = code
            .parse()
            .map_err(FleetError::UnknownVariant)?;
        return st.service.devices_of_variant(variant).await;
    }
    if let Some(name) = query.category.as_deref() {
        let group: EquipmentGroup = name
            .parse()
            .map_err(FleetError::UnknownCategory)?;
        return st.service.devices_in_group(group).await;
    }
    st.service.unique_devices().await
}

pub async fn list_devices(
    State(st): State<AppState>,
    Query(query): Query<FleetQuery>,
) -> Result<Json<Vec<FleetDevice>>, ApiError> {
    select(&st, &query)
        .await
        .map(|records| Json(present(records)))
        .map_err(|e| ApiError::fleet("Failed to fetch device data", e))
}

pub async fn device(
    State(st): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<FleetDevice>, ApiError> {
    let record = st
        .service
        .device(&device_id)
        .await
        .map_err(|e| ApiError::fleet("Failed to fetch device by ID", e))?;
    Ok(Json(FleetDevice::new(record, OffsetDateTime::now_utc())))
}

pub async fn history(
    State(st): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DeviceRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    st.service
        .history(&device_id, limit)
        .await
        .map(Json)
        .map_err(|e| ApiError::fleet("Failed to fetch device history", e))
}

pub async fn map(State(st): State<AppState>) -> Result<Json<FleetMap>, ApiError> {
    st.service
        .with_devices(fleet_map)
        .await
        .map(Json)
        .map_err(|e| ApiError::fleet("Failed to fetch device data", e))
}

/// Tower-light totals and per-pack battery capacity.
pub async fn summary(State(st): State<AppState>) -> Result<Json<FamilySummary>, ApiError> {
    st.service
        .with_devices(family_summary)
        .await
        .map(Json)
        .map_err(|e| ApiError::fleet("Failed to fetch device data", e))
}

pub async fn dashboard(State(st): State<AppState>) -> Json<DashboardSnapshot> {
    let latest = st.dashboard.borrow().clone();
    Json(DashboardSnapshot::clone(&latest))
}
