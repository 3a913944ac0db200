use std::sync::Arc;

use crate::actors::connection_manager::ConnectionManager;
use crate::actors::directory::{ConversationDirectory, DirectoryHandle};
use crate::actors::engagement::{EngagementCounters, EngagementHandle};
use crate::actors::message_store::{MessageStore, MessageStoreHandle};
use crate::actors::notifications::{NotificationDispatcher, NotificationHandle};
use crate::actors::presence::{PresenceHandle, PresenceTracker};
use crate::actors::typing::{TypingHandle, TypingIndicator};
use crate::actors::user_session::SessionContext;
use crate::config::LiveConfig;
use crate::fanout::ShareFanout;
use crate::identity::IdentityRegistry;

pub struct AppState {
    pub connection_manager: Arc<ConnectionManager>,
    pub ctx: SessionContext,
}

impl AppState {
    async fn new(config: LiveConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let identity = Arc::new(IdentityRegistry::new());

        let (store, store_sender) =
            MessageStore::new(Arc::clone(&identity), config.message_history_limit);
        let (directory, directory_sender) = ConversationDirectory::new(Arc::clone(&identity));
        let (presence, presence_sender) = PresenceTracker::new();
        let (typing, typing_sender) = TypingIndicator::new(config.typing_stale_after);
        let (engagement, engagement_sender) = EngagementCounters::new();
        let (notifications, notifications_sender) =
            NotificationDispatcher::new(config.notification_limit);

        // Spawn actors
        tokio::spawn(store.run());
        tokio::spawn(directory.run());
        tokio::spawn(presence.run());
        tokio::spawn(typing.run());
        tokio::spawn(engagement.run());
        tokio::spawn(notifications.run());

        let store = MessageStoreHandle::new(store_sender);
        let directory = DirectoryHandle::new(directory_sender);
        let notifications = NotificationHandle::new(notifications_sender);
        let fanout = ShareFanout::new(directory.clone(), store.clone(), notifications.clone());

        let ctx = SessionContext {
            config,
            identity,
            store,
            directory,
            presence: PresenceHandle::new(presence_sender),
            typing: TypingHandle::new(typing_sender),
            engagement: EngagementHandle::new(engagement_sender),
            notifications,
            fanout,
        };

        let connection_manager = Arc::new(ConnectionManager::new(ctx.clone()));

        Ok(Self {
            connection_manager,
            ctx,
        })
    }
}

pub struct AppStateBuilder {
    config: Option<LiveConfig>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn with_config(mut self, config: LiveConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub async fn build(self) -> Result<AppState, Box<dyn std::error::Error>> {
        let config = self.config.unwrap_or_else(LiveConfig::from_env);
        AppState::new(config).await
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
