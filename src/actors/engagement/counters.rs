use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tracing::info;

use super::messages::EngagementMessage;
use crate::domain::Comment;

pub(super) struct ContentEngagement {
    pub owner: String,
    pub likes: u32,
    pub liked_by: HashSet<String>,
    pub comments: Vec<Comment>,
}

/// Per-content like counters and comment lists. Every read-modify-write runs
/// inside this actor's mailbox, which is what keeps `likes == |liked_by|`
/// under concurrent togglers.
pub struct EngagementCounters {
    pub(super) receiver: mpsc::UnboundedReceiver<EngagementMessage>,
    pub(super) contents: HashMap<String, ContentEngagement>,
}

impl EngagementCounters {
    pub fn new() -> (Self, mpsc::UnboundedSender<EngagementMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let counters = Self {
            receiver,
            contents: HashMap::new(),
        };

        (counters, sender)
    }

    pub async fn run(mut self) {
        info!("Engagement counters started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                EngagementMessage::TrackContent {
                    content_id,
                    owner,
                    respond_to,
                } => {
                    self.handle_track_content(content_id, owner);
                    let _ = respond_to.send(());
                }
                EngagementMessage::ToggleLike {
                    content_id,
                    handle,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.handle_toggle_like(&content_id, &handle));
                }
                EngagementMessage::AddComment {
                    content_id,
                    author,
                    text,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.handle_add_comment(&content_id, author, text));
                }
                EngagementMessage::DeleteComment {
                    content_id,
                    comment_id,
                    requester,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.handle_delete_comment(
                        &content_id,
                        comment_id,
                        &requester,
                    ));
                }
                EngagementMessage::Snapshot {
                    content_id,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.handle_snapshot(&content_id));
                }
            }
        }

        info!("Engagement counters stopped");
    }
}
