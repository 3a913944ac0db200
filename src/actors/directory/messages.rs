use tokio::sync::oneshot;

use crate::domain::{ConversationEntry, DirectoryPatch, ShareTarget};
use crate::error::LiveError;

#[derive(Debug)]
pub enum DirectoryMessage {
    ResolveOrCreate {
        initiator: String,
        target: ShareTarget,
        respond_to: oneshot::Sender<Result<String, LiveError>>,
    },
    Upsert {
        key: String,
        viewer: String,
        patch: DirectoryPatch,
        respond_to: oneshot::Sender<()>,
    },
    ListForUser {
        handle: String,
        respond_to: oneshot::Sender<Vec<ConversationEntry>>,
    },
    MarkRead {
        viewer: String,
        key: String,
        respond_to: oneshot::Sender<Result<(), LiveError>>,
    },
    AddMember {
        key: String,
        handle: String,
        respond_to: oneshot::Sender<Result<(), LiveError>>,
    },
    Members {
        key: String,
        respond_to: oneshot::Sender<Result<Vec<String>, LiveError>>,
    },
}
