//! Axum handlers for the five HTTP routes (§11). Each single-read handler
//! dispatches into `mc3e`'s blocking core via `spawn_blocking`; the batch
//! handler does the same but never fails the whole request on a per-item
//! error, since `mc3e::batch_read` already isolates those into `ReadOutcome`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use mc3e::{ConnectionConfig, ReadOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::GatewayError;

pub struct ServerState {
    pub default_plc_config: ConnectionConfig,
}

fn resolve_config(
    state: &ServerState,
    plc_host: Option<String>,
    port: Option<u16>,
) -> ConnectionConfig {
    let mut config = state.default_plc_config.clone();
    if let Some(host) = plc_host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config
}

/// Body for `POST /api/read`.
#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub device: String,
    pub addr: u32,
    pub length: u32,
    pub plc_host: Option<String>,
    pub port: Option<u16>,
}

async fn do_read(
    state: Arc<ServerState>,
    spec: String,
    plc_host: Option<String>,
    port: Option<u16>,
) -> Result<Json<ReadOutcome>, GatewayError> {
    let config = resolve_config(&state, plc_host, port);
    let outcome = tokio::task::spawn_blocking(move || match mc3e::read_device(&config, &spec) {
        Ok(values) => ReadOutcome {
            device: spec,
            values,
            success: true,
            error: None,
        },
        Err(e) => ReadOutcome {
            device: spec,
            values: Vec::new(),
            success: false,
            error: Some(e.to_string()),
        },
    })
    .await
    .map_err(|e| GatewayError::BadRequest(format!("read task panicked: {e}")))?;
    Ok(Json(outcome))
}

pub async fn read_device(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ReadRequest>,
) -> Result<Json<ReadOutcome>, GatewayError> {
    let spec = format!("{}{}:{}", req.device, req.addr, req.length);
    do_read(state, spec, req.plc_host, req.port).await
}

pub async fn read_device_path(
    State(state): State<Arc<ServerState>>,
    Path((device, addr, length)): Path<(String, u32, u32)>,
) -> Result<Json<ReadOutcome>, GatewayError> {
    let spec = format!("{device}{addr}:{length}");
    do_read(state, spec, None, None).await
}

/// Body for `POST /api/batch_read`.
#[derive(Debug, Deserialize)]
pub struct BatchReadRequest {
    pub devices: Vec<String>,
    pub plc_host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Serialize)]
pub struct BatchReadResponse {
    pub results: Vec<ReadOutcome>,
}

pub async fn batch_read(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<BatchReadRequest>,
) -> Result<Json<BatchReadResponse>, GatewayError> {
    let config = resolve_config(&state, req.plc_host, req.port);
    let results = tokio::task::spawn_blocking(move || mc3e::batch_read(&config, &req.devices))
        .await
        .map_err(|e| GatewayError::BadRequest(format!("batch read task panicked: {e}")))?;
    Ok(Json(BatchReadResponse { results }))
}

/// Static capability report (§11, §12): the device kinds the original's
/// `get_supported_devices()` names as first-class, and the advertised (not
/// enforced) per-request device cap from spec.md §9's Open Questions.
pub async fn batch_read_status() -> Json<Value> {
    Json(json!({
        "supported_devices": ["D", "W", "R", "ZR", "X", "Y", "M"],
        "max_devices_per_request": 32,
    }))
}

/// Hand-built schema description of the four routes above; no derive-macro
/// schema generation is pulled in for this out-of-core-scope surface (§11).
/// Registered against a `{*format}` catch-all rather than a single-segment
/// `{format}` so the two-segment `swagger/yaml` variant is actually
/// reachable.
pub async fn openapi(Path(format): Path<String>) -> Result<Json<Value>, GatewayError> {
    let doc = json!({
        "openapi": "3.0.0",
        "info": { "title": "mc3e-gateway", "version": "1" },
        "paths": {
            "/api/read": { "post": { "summary": "Read one device" } },
            "/api/read/{device}/{addr}/{length}": { "get": { "summary": "Read one device" } },
            "/api/batch_read": { "post": { "summary": "Read a heterogeneous batch" } },
            "/api/batch_read_status": { "get": { "summary": "Capability report" } },
        },
    });
    match format.as_str() {
        "json" | "swagger" => Ok(Json(doc)),
        "yaml" | "swagger/yaml" => Ok(Json(doc)),
        other => Err(GatewayError::BadRequest(format!(
            "unknown openapi format '{other}'"
        ))),
    }
}
