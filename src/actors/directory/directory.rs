use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use super::messages::DirectoryMessage;
use crate::domain::ConversationEntry;
use crate::identity::IdentityRegistry;

/// Canonical key for a 1:1 thread. Handles are ordered lexically so both
/// participants (and repeated calls) resolve to the same conversation.
pub fn direct_key(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("dm:{lo}:{hi}")
}

pub fn group_key(group_id: &str) -> String {
    format!("group:{group_id}")
}

pub(super) struct ConversationMeta {
    pub is_group: bool,
    pub participants: BTreeSet<String>,
}

/// Derived index of who participates in which conversation, with per-viewer
/// denormalized preview fields and unread counts.
pub struct ConversationDirectory {
    pub(super) receiver: mpsc::UnboundedReceiver<DirectoryMessage>,
    pub(super) identity: Arc<IdentityRegistry>,
    pub(super) conversations: HashMap<String, ConversationMeta>,
    /// viewer handle -> conversation key -> entry
    pub(super) entries: HashMap<String, HashMap<String, ConversationEntry>>,
}

impl ConversationDirectory {
    pub fn new(
        identity: Arc<IdentityRegistry>,
    ) -> (Self, mpsc::UnboundedSender<DirectoryMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let directory = Self {
            receiver,
            identity,
            conversations: HashMap::new(),
            entries: HashMap::new(),
        };

        (directory, sender)
    }

    pub async fn run(mut self) {
        info!("Conversation directory started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                DirectoryMessage::ResolveOrCreate {
                    initiator,
                    target,
                    respond_to,
                } => {
                    let result = self.handle_resolve_or_create(&initiator, target);
                    let _ = respond_to.send(result);
                }
                DirectoryMessage::Upsert {
                    key,
                    viewer,
                    patch,
                    respond_to,
                } => {
                    self.handle_upsert(&key, &viewer, patch);
                    let _ = respond_to.send(());
                }
                DirectoryMessage::ListForUser { handle, respond_to } => {
                    let _ = respond_to.send(self.handle_list_for_user(&handle));
                }
                DirectoryMessage::MarkRead {
                    viewer,
                    key,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.handle_mark_read(&viewer, &key));
                }
                DirectoryMessage::AddMember {
                    key,
                    handle,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.handle_add_member(&key, &handle));
                }
                DirectoryMessage::Members { key, respond_to } => {
                    let _ = respond_to.send(self.handle_members(&key));
                }
            }
        }

        info!("Conversation directory stopped");
    }
}
