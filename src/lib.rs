use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    middleware,
    response::IntoResponse,
    routing::{any, get},
};
use std::{collections::HashMap, sync::Arc};
use tower_http::cors::CorsLayer;

use crate::{
    domain::UserInfo,
    metrics::{metrics_handler, metrics_middleware},
    socket::live_socket,
    state::AppState,
};

pub mod actors;
pub mod config;
pub mod domain;
pub mod error;
pub mod fanout;
pub mod identity;
pub mod metrics;
pub mod socket;
pub mod state;
pub mod wire;

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let handle = match params.get("handle") {
        Some(handle) if !handle.is_empty() => handle.clone(),
        _ => return "Missing handle".into_response(),
    };

    let profile = UserInfo {
        display_name: params.get("name").cloned().unwrap_or_else(|| handle.clone()),
        avatar_url: params.get("avatar").cloned().unwrap_or_default(),
        handle,
    };

    ws.on_upgrade(move |socket| live_socket(socket, profile, state))
}

pub fn alumnet_route(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", any(ws_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
