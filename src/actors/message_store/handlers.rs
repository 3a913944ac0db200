use chrono::Utc;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::store::MessageStore;
use crate::domain::{Message, MessageDraft, MessagePayload};
use crate::error::LiveError;

impl MessageStore {
    pub(super) async fn handle_append(
        &mut self,
        conversation_id: String,
        draft: MessageDraft,
    ) -> Result<Message, LiveError> {
        if let MessagePayload::Text(text) = &draft.payload {
            if text.trim().is_empty() {
                return Err(LiveError::InvalidPayload("empty text body".to_string()));
            }
        }

        // Sender identity check is delegated to the identity collaborator.
        let sender_info = self.identity.lookup(&draft.sender).ok_or_else(|| {
            LiveError::NotAuthorized(format!("unknown sender {}", draft.sender))
        })?;

        let log = self.logs.entry(conversation_id.clone()).or_default();
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: conversation_id.clone(),
            sender: draft.sender,
            sender_name: sender_info.display_name,
            payload: draft.payload,
            seq: log.len() as u64 + 1,
            sent_at: Utc::now(),
        };
        log.push(message.clone());

        self.push_to_subscribers(&conversation_id, &message);

        debug!(
            "Appended message {} (seq {}) to {}",
            message.id, message.seq, conversation_id
        );

        Ok(message)
    }

    fn push_to_subscribers(&self, conversation_id: &str, message: &Message) {
        let Some(subscribers) = self.subscribers.get(conversation_id) else {
            return;
        };

        for (subscription_id, sender) in subscribers {
            // try_send so one slow subscriber never blocks the store
            match sender.try_send(message.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!(
                        "Subscriber {} on {} is full, dropping update",
                        subscription_id, conversation_id
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(
                        "Subscriber {} on {} is closed",
                        subscription_id, conversation_id
                    );
                }
            }
        }
    }

    pub(super) fn handle_subscribe(
        &mut self,
        conversation_id: String,
        subscription_id: Uuid,
        sender: mpsc::Sender<Message>,
    ) -> Vec<Message> {
        let backlog = self
            .logs
            .get(&conversation_id)
            .map(|log| {
                let skip = log.len().saturating_sub(self.history_limit);
                log[skip..].to_vec()
            })
            .unwrap_or_default();

        self.subscribers
            .entry(conversation_id)
            .or_default()
            .insert(subscription_id, sender);

        backlog
    }

    pub(super) fn handle_unsubscribe(&mut self, conversation_id: &str, subscription_id: Uuid) {
        if let Some(subscribers) = self.subscribers.get_mut(conversation_id) {
            subscribers.remove(&subscription_id);
            if subscribers.is_empty() {
                self.subscribers.remove(conversation_id);
            }
        }
    }
}
