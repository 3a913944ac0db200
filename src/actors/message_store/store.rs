use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use super::messages::StoreMessage;
use crate::domain::Message;
use crate::identity::IdentityRegistry;

/// Append-only per-conversation message log with live subscribers. The actor
/// mailbox is the serialization point: sequence numbers are assigned in
/// arrival order, so subscribers observe every conversation in one order.
pub struct MessageStore {
    pub(super) receiver: mpsc::UnboundedReceiver<StoreMessage>,
    pub(super) identity: Arc<IdentityRegistry>,
    pub(super) history_limit: usize,
    pub(super) logs: HashMap<String, Vec<Message>>,
    pub(super) subscribers: HashMap<String, HashMap<Uuid, mpsc::Sender<Message>>>,
}

impl MessageStore {
    pub fn new(
        identity: Arc<IdentityRegistry>,
        history_limit: usize,
    ) -> (Self, mpsc::UnboundedSender<StoreMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let store = Self {
            receiver,
            identity,
            history_limit,
            logs: HashMap::new(),
            subscribers: HashMap::new(),
        };

        (store, sender)
    }

    pub async fn run(mut self) {
        info!("Message store started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                StoreMessage::Append {
                    conversation_id,
                    draft,
                    respond_to,
                } => {
                    let result = self.handle_append(conversation_id, draft).await;
                    let _ = respond_to.send(result);
                }
                StoreMessage::Subscribe {
                    conversation_id,
                    subscription_id,
                    sender,
                    respond_to,
                } => {
                    let backlog =
                        self.handle_subscribe(conversation_id, subscription_id, sender);
                    let _ = respond_to.send(backlog);
                }
                StoreMessage::Unsubscribe {
                    conversation_id,
                    subscription_id,
                } => {
                    self.handle_unsubscribe(&conversation_id, subscription_id);
                }
                StoreMessage::History {
                    conversation_id,
                    respond_to,
                } => {
                    let log = self
                        .logs
                        .get(&conversation_id)
                        .cloned()
                        .unwrap_or_default();
                    let _ = respond_to.send(log);
                }
            }
        }

        info!("Message store stopped");
    }
}
