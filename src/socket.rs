use axum::extract::ws::WebSocket;
use std::sync::Arc;

use crate::{domain::UserInfo, state::AppState};

pub async fn live_socket(socket: WebSocket, profile: UserInfo, state: Arc<AppState>) {
    state
        .connection_manager
        .handle_connection(socket, profile)
        .await;
}
