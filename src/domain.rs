use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LiveError;

/// Display fields for a user, supplied by the identity collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub handle: String,
    pub display_name: String,
    pub avatar_url: String,
}

/// The closed set of content kinds a message can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Job,
    Event,
    Story,
    Profile,
    Group,
}

impl ContentKind {
    /// Fixed preview label used when this kind is shared into a conversation.
    pub fn share_label(self) -> &'static str {
        match self {
            ContentKind::Post => "Shared a post.",
            ContentKind::Job => "Shared a job.",
            ContentKind::Event => "Shared an event.",
            ContentKind::Story => "Shared a success story.",
            ContentKind::Profile => "Shared a profile.",
            ContentKind::Group => "Shared a group.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Job => "job",
            ContentKind::Event => "event",
            ContentKind::Story => "story",
            ContentKind::Profile => "profile",
            ContentKind::Group => "group",
        }
    }
}

/// Tagged pointer to externally-owned content. The core never stores a copy
/// of the content itself, only this (kind, id) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SharedRef {
    pub kind: ContentKind,
    pub id: String,
}

impl SharedRef {
    /// Public deep link for the copy-link share path. Pure formatting, no state.
    pub fn deep_link(&self, base_url: &str) -> String {
        format!("{}/{}/{}", base_url.trim_end_matches('/'), self.kind.as_str(), self.id)
    }
}

/// A message carries exactly one payload: plain text or one shared reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePayload {
    Text(String),
    Shared(SharedRef),
}

impl MessagePayload {
    /// Builds a payload from the optional fields a client submits, rejecting
    /// empty sends and sends that carry both a body and a reference.
    pub fn from_parts(
        text: Option<String>,
        shared: Option<SharedRef>,
    ) -> Result<Self, LiveError> {
        match (text, shared) {
            (Some(_), Some(_)) => Err(LiveError::InvalidPayload(
                "message carries both text and a shared reference".to_string(),
            )),
            (None, None) => Err(LiveError::InvalidPayload(
                "message carries neither text nor a shared reference".to_string(),
            )),
            (Some(text), None) => {
                if text.trim().is_empty() {
                    Err(LiveError::InvalidPayload("empty text body".to_string()))
                } else {
                    Ok(MessagePayload::Text(text))
                }
            }
            (None, Some(shared)) => Ok(MessagePayload::Shared(shared)),
        }
    }

    /// Text shown in conversation-list previews.
    pub fn preview(&self) -> String {
        match self {
            MessagePayload::Text(text) => text.clone(),
            MessagePayload::Shared(shared) => shared.kind.share_label().to_string(),
        }
    }
}

/// What a sender submits; the store fills in id, sequence and timestamp.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageDraft {
    pub sender: String,
    pub payload: MessagePayload,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: String,
    pub sender: String,
    /// Captured at send time; a later display-name change does not rewrite
    /// already-sent messages.
    pub sender_name: String,
    pub payload: MessagePayload,
    /// Server-assigned, strictly increasing within a conversation.
    pub seq: u64,
    pub sent_at: DateTime<Utc>,
}

/// One viewer's entry for a conversation, with denormalized preview fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub key: String,
    pub is_group: bool,
    /// The other participant's handle, for 1:1 threads only.
    pub counterpart: Option<String>,
    pub last_message_text: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub unread_count: u32,
}

/// Merge patch applied to a viewer's conversation entry.
#[derive(Clone, Debug, Default)]
pub struct DirectoryPatch {
    pub last_message_text: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub increment_unread: bool,
}

/// Where a message or share is headed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareTarget {
    User(String),
    Group(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShareFailure {
    pub target: ShareTarget,
    pub reason: String,
}

/// Per-target outcome of a fan-out. Partial failure is a normal result, not
/// an error: the caller retries just the failed subset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareReport {
    pub succeeded: Vec<ShareTarget>,
    pub failed: Vec<ShareFailure>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub handle: String,
    pub display_name: String,
    pub avatar_url: String,
    pub online: bool,
    pub last_seen: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

/// Point-in-time view of one content item's engagement state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub content_id: String,
    pub owner: String,
    pub likes: u32,
    pub liked_by: Vec<String>,
    pub comments: Vec<Comment>,
}

/// Closed taxonomy of notification kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ConnectionRequest,
    Message,
    EventReminder,
    JobPosted,
    Like,
    Comment,
    Share,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    pub target: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub actor: String,
    pub text: String,
    pub content: Option<SharedRef>,
    pub action: Option<NotificationAction>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub actor: String,
    pub text: String,
    pub content: Option<SharedRef>,
    pub action: Option<NotificationAction>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}
