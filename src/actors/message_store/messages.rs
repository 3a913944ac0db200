use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::domain::{Message, MessageDraft};
use crate::error::LiveError;

#[derive(Debug)]
pub enum StoreMessage {
    Append {
        conversation_id: String,
        draft: MessageDraft,
        respond_to: oneshot::Sender<Result<Message, LiveError>>,
    },
    Subscribe {
        conversation_id: String,
        subscription_id: Uuid,
        sender: mpsc::Sender<Message>,
        respond_to: oneshot::Sender<Vec<Message>>,
    },
    Unsubscribe {
        conversation_id: String,
        subscription_id: Uuid,
    },
    History {
        conversation_id: String,
        respond_to: oneshot::Sender<Vec<Message>>,
    },
}
