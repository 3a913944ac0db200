use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::actors::Subscription;
use crate::domain::UserInfo;
use crate::error::LiveError;

#[derive(Debug)]
pub enum TypingMessage {
    SetTyping {
        conversation_id: String,
        info: UserInfo,
    },
    ClearTyping {
        conversation_id: String,
        handle: String,
    },
    CurrentlyTyping {
        conversation_id: String,
        respond_to: oneshot::Sender<Vec<UserInfo>>,
    },
    Subscribe {
        conversation_id: String,
        subscription_id: Uuid,
        sender: mpsc::Sender<Vec<UserInfo>>,
        respond_to: oneshot::Sender<Vec<UserInfo>>,
    },
    Unsubscribe {
        conversation_id: String,
        subscription_id: Uuid,
    },
}

struct Marker {
    info: UserInfo,
    refreshed_at: Instant,
}

/// Ephemeral per-(conversation, user) typing markers. A marker moves from
/// typing back to idle either on an explicit clear or once readers see it
/// older than the staleness window; no reaper task is needed.
pub struct TypingIndicator {
    receiver: mpsc::UnboundedReceiver<TypingMessage>,
    stale_after: Duration,
    markers: HashMap<String, HashMap<String, Marker>>,
    subscribers: HashMap<String, HashMap<Uuid, mpsc::Sender<Vec<UserInfo>>>>,
}

impl TypingIndicator {
    pub fn new(stale_after: Duration) -> (Self, mpsc::UnboundedSender<TypingMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let indicator = Self {
            receiver,
            stale_after,
            markers: HashMap::new(),
            subscribers: HashMap::new(),
        };

        (indicator, sender)
    }

    pub async fn run(mut self) {
        info!("Typing indicator started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                TypingMessage::SetTyping {
                    conversation_id,
                    info,
                } => {
                    // Re-entry while already typing just refreshes the clock.
                    self.markers
                        .entry(conversation_id.clone())
                        .or_default()
                        .insert(
                            info.handle.clone(),
                            Marker {
                                info,
                                refreshed_at: Instant::now(),
                            },
                        );
                    self.push_update(&conversation_id);
                }
                TypingMessage::ClearTyping {
                    conversation_id,
                    handle,
                } => {
                    if let Some(markers) = self.markers.get_mut(&conversation_id) {
                        markers.remove(&handle);
                    }
                    self.push_update(&conversation_id);
                }
                TypingMessage::CurrentlyTyping {
                    conversation_id,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.active(&conversation_id));
                }
                TypingMessage::Subscribe {
                    conversation_id,
                    subscription_id,
                    sender,
                    respond_to,
                } => {
                    let current = self.active(&conversation_id);
                    self.subscribers
                        .entry(conversation_id)
                        .or_default()
                        .insert(subscription_id, sender);
                    let _ = respond_to.send(current);
                }
                TypingMessage::Unsubscribe {
                    conversation_id,
                    subscription_id,
                } => {
                    if let Some(subscribers) = self.subscribers.get_mut(&conversation_id) {
                        subscribers.remove(&subscription_id);
                        if subscribers.is_empty() {
                            self.subscribers.remove(&conversation_id);
                        }
                    }
                }
            }
        }

        info!("Typing indicator stopped");
    }

    /// Stale markers are filtered (and pruned) at read time.
    fn active(&mut self, conversation_id: &str) -> Vec<UserInfo> {
        let Some(markers) = self.markers.get_mut(conversation_id) else {
            return Vec::new();
        };

        let stale_after = self.stale_after;
        markers.retain(|_, marker| marker.refreshed_at.elapsed() <= stale_after);

        let mut active: Vec<UserInfo> = markers.values().map(|m| m.info.clone()).collect();
        active.sort_by(|a, b| a.handle.cmp(&b.handle));
        active
    }

    fn push_update(&mut self, conversation_id: &str) {
        let active = self.active(conversation_id);
        if let Some(subscribers) = self.subscribers.get(conversation_id) {
            for sender in subscribers.values() {
                let _ = sender.try_send(active.clone());
            }
        }
    }
}

#[derive(Clone)]
pub struct TypingHandle {
    sender: mpsc::UnboundedSender<TypingMessage>,
}

impl TypingHandle {
    pub fn new(sender: mpsc::UnboundedSender<TypingMessage>) -> Self {
        Self { sender }
    }

    pub fn set_typing(&self, conversation_id: &str, info: UserInfo) -> Result<(), LiveError> {
        self.sender
            .send(TypingMessage::SetTyping {
                conversation_id: conversation_id.to_string(),
                info,
            })
            .map_err(|_| LiveError::store_unavailable())
    }

    pub fn clear_typing(&self, conversation_id: &str, handle: &str) -> Result<(), LiveError> {
        self.sender
            .send(TypingMessage::ClearTyping {
                conversation_id: conversation_id.to_string(),
                handle: handle.to_string(),
            })
            .map_err(|_| LiveError::store_unavailable())
    }

    pub async fn currently_typing(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<UserInfo>, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TypingMessage::CurrentlyTyping {
                conversation_id: conversation_id.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }

    /// Current typers plus a feed of every subsequent transition.
    pub async fn subscribe(
        &self,
        conversation_id: &str,
        capacity: usize,
    ) -> Result<(Vec<UserInfo>, Subscription<Vec<UserInfo>>), LiveError> {
        let (sender, receiver) = mpsc::channel(capacity);
        let (respond_to, response) = oneshot::channel();
        let subscription_id = Uuid::new_v4();

        self.sender
            .send(TypingMessage::Subscribe {
                conversation_id: conversation_id.to_string(),
                subscription_id,
                sender,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;

        let current = response.await.map_err(|_| LiveError::store_unavailable())?;
        Ok((
            current,
            Subscription {
                id: subscription_id,
                receiver,
            },
        ))
    }

    pub fn unsubscribe(&self, conversation_id: &str, subscription_id: Uuid) {
        let _ = self.sender.send(TypingMessage::Unsubscribe {
            conversation_id: conversation_id.to_string(),
            subscription_id,
        });
    }
}
