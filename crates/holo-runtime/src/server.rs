//! HTTP signals endpoint
//!
//! `GET /signals` returns the latest [`RenderSignals`] as JSON for renderers
//! that live in another process. `GET /health` is a liveness probe.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use holo_core::{HoloError, HoloResult};
use parking_lot::RwLock;
use tracing::info;

use crate::RenderSignals;

/// Render signals shared between the driver and the endpoint
pub type SharedSignals = Arc<RwLock<RenderSignals>>;

pub fn shared_signals() -> SharedSignals {
    Arc::new(RwLock::new(RenderSignals::default()))
}

pub fn router(signals: SharedSignals) -> Router {
    Router::new()
        .route("/signals", get(get_signals))
        .route("/health", get(health))
        .with_state(signals)
}

async fn get_signals(State(signals): State<SharedSignals>) -> Json<RenderSignals> {
    Json(signals.read().clone())
}

async fn health() -> &'static str {
    "OK"
}

/// Bind and serve until the task is dropped
pub async fn serve(addr: SocketAddr, signals: SharedSignals) -> HoloResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| HoloError::Config(format!("bind {addr}: {e}")))?;
    info!(addr = %addr, "signals endpoint listening");
    axum::serve(listener, router(signals))
        .await
        .map_err(|e| HoloError::Transport(e.to_string()))
}
