use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::location::{Coordinate, FormSnapshot, MemoryMap, ReverseGeocoder};
use crate::picker::OrderingPolicy;

use super::state::AppState;
use super::static_files;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn coordinate(lat: Option<f64>, lon: Option<f64>) -> Result<Coordinate, ApiError> {
    let (lat, lon) = match (lat, lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(api_error(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lon'")),
    };
    Coordinate::new(lat, lon).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))
}

// ─── Static file handlers ────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

pub async fn style() -> Response {
    (
        [(header::CONTENT_TYPE, "text/css")],
        static_files::STYLE_CSS,
    )
        .into_response()
}

pub async fn script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        static_files::APP_JS,
    )
        .into_response()
}

// ─── GET /api/picker ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct PickerSnapshot {
    pub fields: FormSnapshot,
    pub map: MemoryMap,
    pub ordering: OrderingPolicy,
    pub pending_lookups: usize,
}

fn snapshot(state: &AppState) -> PickerSnapshot {
    PickerSnapshot {
        fields: state.picker.fields().snapshot(),
        map: state.picker.map().clone(),
        ordering: state.picker.policy(),
        pending_lookups: state.picker.pending_lookups(),
    }
}

pub async fn picker_state(State(state): State<Arc<AppState>>) -> Json<PickerSnapshot> {
    Json(snapshot(&state))
}

// ─── POST /api/picker/click, /api/picker/drag ────────────────────

#[derive(Deserialize)]
pub struct PlacementBody {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Body rejections (bad JSON, wrong content type) answer in the same JSON shape.
fn placement(payload: Result<Json<PlacementBody>, JsonRejection>) -> Result<Coordinate, ApiError> {
    let Json(body) = payload.map_err(|e| api_error(e.status(), e.body_text()))?;
    coordinate(body.lat, body.lon)
}

pub async fn map_click(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlacementBody>, JsonRejection>,
) -> Result<(StatusCode, Json<PickerSnapshot>), ApiError> {
    let at = placement(payload)?;
    info!(%at, "map click");
    // Lookup runs detached; the address fields fill in when it completes.
    drop(state.picker.on_map_click(at));
    Ok((StatusCode::ACCEPTED, Json(snapshot(&state))))
}

pub async fn marker_drag(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlacementBody>, JsonRejection>,
) -> Result<(StatusCode, Json<PickerSnapshot>), ApiError> {
    let at = placement(payload)?;
    if !state.picker.map().drag_marker_to(at) {
        return Err(api_error(StatusCode::CONFLICT, "No draggable marker on the map"));
    }
    info!(%at, "marker drag end");
    if state.picker.on_drag_end().is_none() {
        return Err(api_error(StatusCode::CONFLICT, "Marker disappeared during drag"));
    }
    Ok((StatusCode::ACCEPTED, Json(snapshot(&state))))
}

// ─── GET /api/reverse ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReverseQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Serialize)]
pub struct ReverseResponse {
    pub region: String,
    pub municipality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub formatted_coords: String,
}

pub async fn reverse(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReverseQuery>,
) -> Result<Json<ReverseResponse>, ApiError> {
    let at = coordinate(params.lat, params.lon)?;
    let geocoder = state.picker.geocoder();

    let result = tokio::task::spawn_blocking(move || geocoder.reverse(at))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let found = result.map_err(|e| {
        warn!(%at, error = %e, "reverse lookup failed");
        api_error(StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    Ok(Json(ReverseResponse {
        region: found.region().to_string(),
        municipality: found.municipality().to_string(),
        display_name: found.display_name.clone(),
        formatted_coords: at.to_string(),
    }))
}
