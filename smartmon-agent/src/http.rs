//! JSON API over the device cache
//!
//! Routes:
//! - `GET /health`       liveness
//! - `GET /devices`      known devices with collection age, no refresh
//! - `GET /devices/{id}` refresh stale devices, then the reading for `id`
//!
//! `id` is either the full device name or its last path segment (`sda`).

use crate::device::Device;
use crate::service::SmartService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SmartService>,
    pub devices: Arc<Vec<Device>>,
}

#[derive(Debug, Serialize)]
struct DeviceView {
    name: String,
    #[serde(rename = "type")]
    device_type: String,
    collected_at: Option<String>, // RFC3339
    stale: bool,
    age_seconds: Option<i64>,
}

fn to_view(service: &SmartService, device: &Device) -> DeviceView {
    let now = Utc::now();
    let interval = service.orchestrator().interval();
    let entry = service.cache().get(device);
    DeviceView {
        name: device.name.clone(),
        device_type: device.device_type.clone(),
        collected_at: entry.as_ref().map(|e| e.collected_at.to_rfc3339()),
        stale: service.cache().is_stale(device, interval, now),
        age_seconds: entry.map(|e| e.age(now).num_seconds().max(0)),
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/devices", get(list_devices))
        .route("/devices/{id}", get(get_device))
        .with_state(app_state)
}

async fn list_devices(State(st): State<AppState>) -> Json<Vec<DeviceView>> {
    Json(st.devices.iter().map(|d| to_view(&st.service, d)).collect())
}

async fn get_device(
    State(st): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let device = st
        .devices
        .iter()
        .find(|d| d.name == id || d.short_name() == id)
        .ok_or(StatusCode::NOT_FOUND)?;

    st.service.refresh_all_devices(&st.devices).await;
    let data = st.service.read_data(device).await;
    Ok(Json(Value::clone(&data)))
}
