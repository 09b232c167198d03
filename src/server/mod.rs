//! HTTP surface over a single shared picker session.

mod handlers;
mod state;
mod static_files;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::PickerConfig;
use crate::location::{AddressFields, MemoryMap, NominatimGeocoder};
use crate::picker::LocationPicker;

pub use state::AppState;

/// Build the session state and run the initial placement.
/// Must be called within a Tokio runtime.
pub fn build_state(config: &PickerConfig) -> Arc<AppState> {
    let picker = LocationPicker::new(
        MemoryMap::new(),
        NominatimGeocoder::from_config(&config.geocoder),
        AddressFields::in_memory(),
        config,
    );
    drop(picker.init());
    Arc::new(AppState { picker })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/style.css", get(handlers::style))
        .route("/app.js", get(handlers::script))
        .route("/api/picker", get(handlers::picker_state))
        .route("/api/picker/click", post(handlers::map_click))
        .route("/api/picker/drag", post(handlers::marker_drag))
        .route("/api/reverse", get(handlers::reverse))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(config: &PickerConfig, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(build_state(config));
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(%addr, error = %e, "cannot bind");
        e
    })?;

    info!(
        %addr,
        geocoder = config.geocoder.endpoint.as_str(),
        ordering = %config.ordering,
        "location picker server listening"
    );
    axum::serve(listener, app).await
}
