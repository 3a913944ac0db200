pub mod handlers;
mod session;

pub use session::UserSession;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::actors::directory::DirectoryHandle;
use crate::actors::engagement::EngagementHandle;
use crate::actors::message_store::MessageStoreHandle;
use crate::actors::notifications::NotificationHandle;
use crate::actors::presence::PresenceHandle;
use crate::actors::typing::TypingHandle;
use crate::config::LiveConfig;
use crate::fanout::ShareFanout;
use crate::identity::IdentityRegistry;

/// Everything a session needs to serve one connected user.
#[derive(Clone)]
pub struct SessionContext {
    pub config: LiveConfig,
    pub identity: Arc<IdentityRegistry>,
    pub store: MessageStoreHandle,
    pub directory: DirectoryHandle,
    pub presence: PresenceHandle,
    pub typing: TypingHandle,
    pub engagement: EngagementHandle,
    pub notifications: NotificationHandle,
    pub fanout: ShareFanout,
}

/// Live subscriptions held by one session. Every entry must be unsubscribed
/// on teardown or the actors keep pushing into dead channels.
#[derive(Default)]
pub struct SessionSubs {
    pub messages: HashMap<String, (Uuid, JoinHandle<()>)>,
    pub typing: HashMap<String, (Uuid, JoinHandle<()>)>,
    /// Keyed by the watched handle.
    pub presence: HashMap<String, (Uuid, JoinHandle<()>)>,
    pub notifications: Option<(Uuid, JoinHandle<()>)>,
}

impl SessionSubs {
    /// Drops the subscriptions for one conversation (on close or re-open).
    pub fn close_conversation(&mut self, ctx: &SessionContext, key: &str) {
        if let Some((id, task)) = self.messages.remove(key) {
            ctx.store.unsubscribe(key, id);
            task.abort();
        }
        if let Some((id, task)) = self.typing.remove(key) {
            ctx.typing.unsubscribe(key, id);
            task.abort();
        }
    }

    pub fn teardown(&mut self, ctx: &SessionContext, handle: &str) {
        let keys: Vec<String> = self.messages.keys().cloned().collect();
        for key in keys {
            self.close_conversation(ctx, &key);
        }
        let typing_keys: Vec<String> = self.typing.keys().cloned().collect();
        for key in typing_keys {
            self.close_conversation(ctx, &key);
        }
        for (_, (id, task)) in self.presence.drain() {
            ctx.presence.unsubscribe(id);
            task.abort();
        }
        if let Some((id, task)) = self.notifications.take() {
            ctx.notifications.unsubscribe(handle, id);
            task.abort();
        }
    }
}
