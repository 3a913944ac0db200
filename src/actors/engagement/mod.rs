mod counters;
mod handlers;
mod messages;

pub use counters::EngagementCounters;
pub use messages::EngagementMessage;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::domain::{Comment, EngagementSnapshot, LikeOutcome};
use crate::error::LiveError;

#[derive(Clone)]
pub struct EngagementHandle {
    sender: mpsc::UnboundedSender<EngagementMessage>,
}

impl EngagementHandle {
    pub fn new(sender: mpsc::UnboundedSender<EngagementMessage>) -> Self {
        Self { sender }
    }

    /// Content collaborators announce an item here before anyone can engage
    /// with it; counters are never created implicitly by a like.
    pub async fn track_content(&self, content_id: &str, owner: &str) -> Result<(), LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(EngagementMessage::TrackContent {
                content_id: content_id.to_string(),
                owner: owner.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }

    /// Atomic like/unlike. The counter pair (likes, liked_by) is mutated in
    /// one step inside the actor, so concurrent togglers never lose updates.
    pub async fn toggle_like(
        &self,
        content_id: &str,
        handle: &str,
    ) -> Result<LikeOutcome, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(EngagementMessage::ToggleLike {
                content_id: content_id.to_string(),
                handle: handle.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }

    pub async fn add_comment(
        &self,
        content_id: &str,
        author: &str,
        text: &str,
    ) -> Result<Comment, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(EngagementMessage::AddComment {
                content_id: content_id.to_string(),
                author: author.to_string(),
                text: text.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }

    /// Allowed for the comment's author or the content's owner only.
    pub async fn delete_comment(
        &self,
        content_id: &str,
        comment_id: Uuid,
        requester: &str,
    ) -> Result<(), LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(EngagementMessage::DeleteComment {
                content_id: content_id.to_string(),
                comment_id,
                requester: requester.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }

    pub async fn snapshot(
        &self,
        content_id: &str,
    ) -> Result<EngagementSnapshot, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(EngagementMessage::Snapshot {
                content_id: content_id.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }
}
