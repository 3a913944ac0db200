mod handlers;
mod messages;
mod store;

pub use messages::StoreMessage;
pub use store::MessageStore;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::actors::Subscription;
use crate::domain::{Message, MessageDraft};
use crate::error::LiveError;

/// Cheap clonable handle over the message store actor.
#[derive(Clone)]
pub struct MessageStoreHandle {
    sender: mpsc::UnboundedSender<StoreMessage>,
}

impl MessageStoreHandle {
    pub fn new(sender: mpsc::UnboundedSender<StoreMessage>) -> Self {
        Self { sender }
    }

    /// Appends a message, returning it with server-assigned id, sequence and
    /// timestamp. The matching directory upsert is the caller's job.
    pub async fn append(
        &self,
        conversation_id: impl Into<String>,
        draft: MessageDraft,
    ) -> Result<Message, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreMessage::Append {
                conversation_id: conversation_id.into(),
                draft,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }

    /// Live subscription: the trailing window of the conversation as backlog
    /// (ascending server order) plus a channel that receives every append
    /// from now on.
    pub async fn subscribe(
        &self,
        conversation_id: impl Into<String>,
        capacity: usize,
    ) -> Result<(Vec<Message>, Subscription<Message>), LiveError> {
        let (sender, receiver) = mpsc::channel(capacity);
        let (respond_to, response) = oneshot::channel();
        let subscription_id = Uuid::new_v4();

        self.sender
            .send(StoreMessage::Subscribe {
                conversation_id: conversation_id.into(),
                subscription_id,
                sender,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;

        let backlog = response.await.map_err(|_| LiveError::store_unavailable())?;
        Ok((
            backlog,
            Subscription {
                id: subscription_id,
                receiver,
            },
        ))
    }

    pub fn unsubscribe(&self, conversation_id: impl Into<String>, subscription_id: Uuid) {
        let _ = self.sender.send(StoreMessage::Unsubscribe {
            conversation_id: conversation_id.into(),
            subscription_id,
        });
    }

    /// Full log of a conversation, ascending. Test and tooling surface.
    pub async fn history(
        &self,
        conversation_id: impl Into<String>,
    ) -> Result<Vec<Message>, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreMessage::History {
                conversation_id: conversation_id.into(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }
}
