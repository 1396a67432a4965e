use axum::{
    extract::{Path as AxumPath, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, get_service, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{future::Future, path::Path};
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::layout::{self, BracketGeometry, ConnectorStyle, LineSink, Segment, SvgLayer};
use crate::overlay::{build_overlay_state, current_team};
use crate::types::{AppState, SharedState, OVERLAY_ASSETS_DIR, OVERLAY_PAGES_DIR};

// ── Router ─────────────────────────────────────────────────────────────

/// Routes for overlay pages. `base_path` is the directory of the loaded save
/// file; pages come from its `overlay/` folder and assets from `assets/`.
pub fn overlay_router(state: SharedState, base_path: &Path) -> Router {
    let pages = get_service(ServeDir::new(base_path.join(OVERLAY_PAGES_DIR)));
    let assets = get_service(ServeDir::new(base_path.join(OVERLAY_ASSETS_DIR)));

    Router::new()
        .route("/state.json", get(get_state_json))
        .route("/team/:team", get(get_team_json))
        .route("/bracket/connectors", post(post_bracket_connectors))
        .nest_service("/assets", assets)
        .fallback_service(pages)
        .with_state(state)
}

fn no_cache_json<T: Serialize>(payload: &T) -> Response {
    let body = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    (
        [
            ("Content-Type", "application/json"),
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
            ("Expires", "0"),
        ],
        body,
    )
        .into_response()
}

async fn get_state_json(AxumState(state): AxumState<SharedState>) -> Response {
    let payload = {
        let guard = state.lock().unwrap_or_else(|e| e.into_inner());
        build_overlay_state(&guard.data)
    };
    no_cache_json(&payload)
}

async fn get_team_json(AxumPath(team): AxumPath<usize>, AxumState(state): AxumState<SharedState>) -> Response {
    let payload = {
        let guard = state.lock().unwrap_or_else(|e| e.into_inner());
        current_team(&guard.data, team)
    };
    match payload {
        Some(team) => no_cache_json(&team),
        None => (StatusCode::NOT_FOUND, format!("No team {team} in the current match")).into_response(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRequest {
    #[serde(default)]
    pub style: ConnectorStyle,
    pub rounds: BracketGeometry,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorResponse {
    pub segments: Vec<Segment>,
    pub svg: String,
}

/// Overlay pages post the rectangles of their rendered slots and draw the
/// returned connectors.
async fn post_bracket_connectors(Json(request): Json<ConnectorRequest>) -> Response {
    let mut segments: Vec<Segment> = Vec::new();
    layout::redraw(&request.rounds, &mut segments, request.style);
    let mut svg = SvgLayer::new();
    for segment in &segments {
        svg.draw(*segment);
    }
    no_cache_json(&ConnectorResponse {
        segments,
        svg: svg.to_fragment(),
    })
}

// ── Server lifecycle ───────────────────────────────────────────────────

pub async fn serve_listener(
    listener: TcpListener,
    state: SharedState,
    base_path: &Path,
    shutdown_rx: oneshot::Receiver<()>,
) {
    let app = overlay_router(state, base_path);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        })
        .await;
    match result {
        Ok(()) => info!("overlay server stopped"),
        Err(e) => error!("overlay server error: {e}"),
    }
}

/// A stop handle whose receiver is gone belongs to a server that already exited.
fn is_running(state: &AppState) -> bool {
    state
        .webserver_stop_tx
        .as_ref()
        .map_or(false, |tx| !tx.is_closed())
}

fn running_error() -> String {
    "Overlay server is already running.".to_string()
}

/// Binds `addr`, registers a stop handle and returns the server future for
/// the caller's runtime to spawn. Fails when a server is already running, no
/// save file is loaded, or the address cannot be bound; nothing is registered
/// in those cases.
pub async fn start_webserver(
    state: &SharedState,
    addr: &str,
) -> Result<impl Future<Output = ()> + Send + 'static, String> {
    let base_path = {
        let guard = state.lock().map_err(|e| e.to_string())?;
        if is_running(&guard) {
            return Err(running_error());
        }
        guard
            .base_path()
            .ok_or_else(|| "Load or save a save file before starting the overlay server.".to_string())?
    };
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind overlay server to {addr}: {e}"))?;
    let (tx, rx) = oneshot::channel();
    {
        let mut guard = state.lock().map_err(|e| e.to_string())?;
        if is_running(&guard) {
            return Err(running_error());
        }
        guard.webserver_stop_tx = Some(tx);
    }
    match listener.local_addr() {
        Ok(local) => info!("overlay server listening at http://{local}/ serving {}", base_path.display()),
        Err(_) => info!("overlay server listening at http://{addr}/ serving {}", base_path.display()),
    }

    let state = state.clone();
    Ok(async move {
        serve_listener(listener, state.clone(), &base_path, rx).await;
        let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
        if !is_running(&guard) {
            guard.webserver_stop_tx = None;
        }
    })
}

/// Signals a running server to shut down. Returns false when none was running.
pub fn stop_webserver(state: &SharedState) -> bool {
    let tx = {
        let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
        guard.webserver_stop_tx.take()
    };
    let Some(tx) = tx else {
        return false;
    };
    if tx.send(()).is_err() {
        return false;
    }
    info!("overlay server stop requested");
    true
}
