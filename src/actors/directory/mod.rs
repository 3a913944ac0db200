mod directory;
mod handlers;
mod messages;

pub use directory::{ConversationDirectory, direct_key, group_key};
pub use messages::DirectoryMessage;

use tokio::sync::{mpsc, oneshot};

use crate::domain::{ConversationEntry, DirectoryPatch, ShareTarget};
use crate::error::LiveError;

#[derive(Clone)]
pub struct DirectoryHandle {
    sender: mpsc::UnboundedSender<DirectoryMessage>,
}

impl DirectoryHandle {
    pub fn new(sender: mpsc::UnboundedSender<DirectoryMessage>) -> Self {
        Self { sender }
    }

    /// Resolves a target to its stable conversation key, materializing the
    /// conversation lazily. Idempotent: the same target always yields the
    /// same key, so repeated sends never fork a duplicate thread.
    pub async fn resolve_or_create(
        &self,
        initiator: &str,
        target: ShareTarget,
    ) -> Result<String, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(DirectoryMessage::ResolveOrCreate {
                initiator: initiator.to_string(),
                target,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }

    /// Merges preview fields into one viewer's entry, creating it with an
    /// unread count of zero if absent. Safe to retry.
    pub async fn upsert(
        &self,
        key: &str,
        viewer: &str,
        patch: DirectoryPatch,
    ) -> Result<(), LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(DirectoryMessage::Upsert {
                key: key.to_string(),
                viewer: viewer.to_string(),
                patch,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }

    /// Conversations for a user, most recently active first.
    pub async fn list_for_user(&self, handle: &str) -> Result<Vec<ConversationEntry>, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(DirectoryMessage::ListForUser {
                handle: handle.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }

    pub async fn mark_read(&self, viewer: &str, key: &str) -> Result<(), LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(DirectoryMessage::MarkRead {
                viewer: viewer.to_string(),
                key: key.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }

    /// Explicit group join; the counterpart of the source's implicit
    /// conversation materialization.
    pub async fn add_member(&self, key: &str, handle: &str) -> Result<(), LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(DirectoryMessage::AddMember {
                key: key.to_string(),
                handle: handle.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }

    pub async fn members(&self, key: &str) -> Result<Vec<String>, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(DirectoryMessage::Members {
                key: key.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }
}
