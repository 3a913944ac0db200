use axum::extract::ws::WebSocket;
use tracing::{error, info};

use crate::actors::user_session::{SessionContext, UserSession};
use crate::domain::UserInfo;

pub struct ConnectionManager {
    ctx: SessionContext,
}

impl ConnectionManager {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle_connection(&self, socket: WebSocket, profile: UserInfo) {
        info!("New connection attempt for user: {}", profile.handle);

        match UserSession::new(profile.clone(), socket, self.ctx.clone()).await {
            Ok(session) => {
                info!("User session created for: {}", profile.handle);
                session.run().await;
            }
            Err(e) => {
                error!("Failed to create session for {}: {}", profile.handle, e);
            }
        }
    }
}
