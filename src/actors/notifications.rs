use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use uuid::Uuid;

use crate::actors::Subscription;
use crate::domain::{Notification, NotificationDraft};
use crate::error::LiveError;

#[derive(Debug)]
pub enum NotificationMessage {
    Notify {
        recipient: String,
        draft: NotificationDraft,
        respond_to: oneshot::Sender<Notification>,
    },
    MarkRead {
        recipient: String,
        notification_id: Uuid,
        respond_to: oneshot::Sender<Result<(), LiveError>>,
    },
    ListRecent {
        recipient: String,
        respond_to: oneshot::Sender<Vec<Notification>>,
    },
    Subscribe {
        recipient: String,
        subscription_id: Uuid,
        sender: mpsc::Sender<Notification>,
        respond_to: oneshot::Sender<Vec<Notification>>,
    },
    Unsubscribe {
        recipient: String,
        subscription_id: Uuid,
    },
}

/// Per-user append-only notification log. Append plus flip-a-flag; listings
/// are newest first over a bounded window.
pub struct NotificationDispatcher {
    receiver: mpsc::UnboundedReceiver<NotificationMessage>,
    limit: usize,
    logs: HashMap<String, Vec<Notification>>,
    subscribers: HashMap<String, HashMap<Uuid, mpsc::Sender<Notification>>>,
}

impl NotificationDispatcher {
    pub fn new(limit: usize) -> (Self, mpsc::UnboundedSender<NotificationMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let dispatcher = Self {
            receiver,
            limit,
            logs: HashMap::new(),
            subscribers: HashMap::new(),
        };

        (dispatcher, sender)
    }

    pub async fn run(mut self) {
        info!("Notification dispatcher started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                NotificationMessage::Notify {
                    recipient,
                    draft,
                    respond_to,
                } => {
                    let notification = Notification {
                        id: Uuid::new_v4(),
                        kind: draft.kind,
                        actor: draft.actor,
                        text: draft.text,
                        content: draft.content,
                        action: draft.action,
                        created_at: Utc::now(),
                        read: false,
                    };

                    self.logs
                        .entry(recipient.clone())
                        .or_default()
                        .push(notification.clone());

                    if let Some(subscribers) = self.subscribers.get(&recipient) {
                        for sender in subscribers.values() {
                            let _ = sender.try_send(notification.clone());
                        }
                    }

                    let _ = respond_to.send(notification);
                }
                NotificationMessage::MarkRead {
                    recipient,
                    notification_id,
                    respond_to,
                } => {
                    let result = self
                        .logs
                        .get_mut(&recipient)
                        .and_then(|log| log.iter_mut().find(|n| n.id == notification_id))
                        .map(|n| n.read = true)
                        .ok_or_else(|| {
                            LiveError::NotFound(format!("no notification {notification_id}"))
                        });
                    let _ = respond_to.send(result);
                }
                NotificationMessage::ListRecent {
                    recipient,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.recent(&recipient));
                }
                NotificationMessage::Subscribe {
                    recipient,
                    subscription_id,
                    sender,
                    respond_to,
                } => {
                    let recent = self.recent(&recipient);
                    self.subscribers
                        .entry(recipient)
                        .or_default()
                        .insert(subscription_id, sender);
                    let _ = respond_to.send(recent);
                }
                NotificationMessage::Unsubscribe {
                    recipient,
                    subscription_id,
                } => {
                    if let Some(subscribers) = self.subscribers.get_mut(&recipient) {
                        subscribers.remove(&subscription_id);
                        if subscribers.is_empty() {
                            self.subscribers.remove(&recipient);
                        }
                    }
                }
            }
        }

        info!("Notification dispatcher stopped");
    }

    fn recent(&self, recipient: &str) -> Vec<Notification> {
        self.logs
            .get(recipient)
            .map(|log| log.iter().rev().take(self.limit).cloned().collect())
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct NotificationHandle {
    sender: mpsc::UnboundedSender<NotificationMessage>,
}

impl NotificationHandle {
    pub fn new(sender: mpsc::UnboundedSender<NotificationMessage>) -> Self {
        Self { sender }
    }

    pub async fn notify(
        &self,
        recipient: &str,
        draft: NotificationDraft,
    ) -> Result<Notification, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(NotificationMessage::Notify {
                recipient: recipient.to_string(),
                draft,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }

    pub async fn mark_read(
        &self,
        recipient: &str,
        notification_id: Uuid,
    ) -> Result<(), LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(NotificationMessage::MarkRead {
                recipient: recipient.to_string(),
                notification_id,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?
    }

    pub async fn list_recent(&self, recipient: &str) -> Result<Vec<Notification>, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(NotificationMessage::ListRecent {
                recipient: recipient.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }

    pub async fn subscribe(
        &self,
        recipient: &str,
        capacity: usize,
    ) -> Result<(Vec<Notification>, Subscription<Notification>), LiveError> {
        let (sender, receiver) = mpsc::channel(capacity);
        let (respond_to, response) = oneshot::channel();
        let subscription_id = Uuid::new_v4();

        self.sender
            .send(NotificationMessage::Subscribe {
                recipient: recipient.to_string(),
                subscription_id,
                sender,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;

        let recent = response.await.map_err(|_| LiveError::store_unavailable())?;
        Ok((
            recent,
            Subscription {
                id: subscription_id,
                receiver,
            },
        ))
    }

    pub fn unsubscribe(&self, recipient: &str, subscription_id: Uuid) {
        let _ = self.sender.send(NotificationMessage::Unsubscribe {
            recipient: recipient.to_string(),
            subscription_id,
        });
    }
}
