use tokio::sync::oneshot;
use uuid::Uuid;

use crate::domain::{Comment, EngagementSnapshot, LikeOutcome};
use crate::error::LiveError;

#[derive(Debug)]
pub enum EngagementMessage {
    TrackContent {
        content_id: String,
        owner: String,
        respond_to: oneshot::Sender<()>,
    },
    ToggleLike {
        content_id: String,
        handle: String,
        respond_to: oneshot::Sender<Result<LikeOutcome, LiveError>>,
    },
    AddComment {
        content_id: String,
        author: String,
        text: String,
        respond_to: oneshot::Sender<Result<Comment, LiveError>>,
    },
    DeleteComment {
        content_id: String,
        comment_id: Uuid,
        requester: String,
        respond_to: oneshot::Sender<Result<(), LiveError>>,
    },
    Snapshot {
        content_id: String,
        respond_to: oneshot::Sender<Result<EngagementSnapshot, LiveError>>,
    },
}
