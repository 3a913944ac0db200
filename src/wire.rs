use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Comment, ConversationEntry, Message, Notification, PresenceRecord, SharedRef, ShareReport,
    ShareTarget, UserInfo,
};

/// JSON frames a client sends over the WebSocket.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    SendMessage {
        target: ShareTarget,
        text: Option<String>,
        shared: Option<SharedRef>,
    },
    OpenConversation {
        target: ShareTarget,
    },
    CloseConversation {
        conversation_id: String,
    },
    ListConversations,
    StartTyping {
        conversation_id: String,
    },
    StopTyping {
        conversation_id: String,
    },
    /// Content collaborators announce a freshly published item so it can be
    /// engaged with; the publisher becomes its owner.
    PublishContent {
        content_id: String,
    },
    ToggleLike {
        content_id: String,
    },
    AddComment {
        content_id: String,
        text: String,
    },
    DeleteComment {
        content_id: String,
        comment_id: Uuid,
    },
    Share {
        content: SharedRef,
        targets: Vec<ShareTarget>,
    },
    MarkNotificationRead {
        notification_id: Uuid,
    },
    /// Follow one user's online/offline transitions.
    WatchPresence {
        handle: String,
    },
    ListOnline,
}

/// JSON frames the server pushes back.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Ack to the sender of a message.
    MessageDelivered { message: Message },
    /// Pushed to subscribers of an open conversation.
    NewMessage { message: Message },
    ConversationOpened {
        conversation_id: String,
        backlog: Vec<Message>,
    },
    Conversations {
        conversations: Vec<ConversationEntry>,
    },
    Typing {
        conversation_id: String,
        users: Vec<UserInfo>,
    },
    LikeUpdated {
        content_id: String,
        liked: bool,
        count: u32,
    },
    CommentAdded {
        content_id: String,
        comment: Comment,
    },
    CommentDeleted {
        content_id: String,
        comment_id: Uuid,
    },
    ShareResult { report: ShareReport },
    Notification { notification: Notification },
    Presence { record: PresenceRecord },
    OnlineUsers { users: Vec<String> },
    Error { message: String },
}
