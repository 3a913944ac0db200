use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::actors::Subscription;
use crate::domain::{PresenceRecord, UserInfo};
use crate::error::LiveError;

#[derive(Debug)]
pub enum PresenceMessage {
    SetOnline {
        info: UserInfo,
    },
    SetOffline {
        handle: String,
    },
    Get {
        handle: String,
        respond_to: oneshot::Sender<Option<PresenceRecord>>,
    },
    ListOnline {
        respond_to: oneshot::Sender<Vec<String>>,
    },
    Subscribe {
        subscription_id: Uuid,
        /// When set, only changes for this handle are pushed.
        watch: Option<String>,
        sender: mpsc::Sender<PresenceRecord>,
        respond_to: oneshot::Sender<()>,
    },
    Unsubscribe {
        subscription_id: Uuid,
    },
}

struct PresenceSubscriber {
    watch: Option<String>,
    sender: mpsc::Sender<PresenceRecord>,
}

/// Latest-write-wins presence records, one per user. The actor queue is the
/// only ordering guarantee; a racing online/offline pair resolves to
/// whichever message arrived last.
pub struct PresenceTracker {
    receiver: mpsc::UnboundedReceiver<PresenceMessage>,
    records: HashMap<String, PresenceRecord>,
    subscribers: HashMap<Uuid, PresenceSubscriber>,
}

impl PresenceTracker {
    pub fn new() -> (Self, mpsc::UnboundedSender<PresenceMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let tracker = Self {
            receiver,
            records: HashMap::new(),
            subscribers: HashMap::new(),
        };

        (tracker, sender)
    }

    pub async fn run(mut self) {
        info!("Presence tracker started");

        while let Some(message) = self.receiver.recv().await {
            match message {
                PresenceMessage::SetOnline { info } => {
                    let record = PresenceRecord {
                        handle: info.handle.clone(),
                        display_name: info.display_name,
                        avatar_url: info.avatar_url,
                        online: true,
                        last_seen: Utc::now(),
                    };
                    self.records.insert(info.handle, record.clone());
                    self.broadcast(&record);
                }
                PresenceMessage::SetOffline { handle } => {
                    if let Some(record) = self.records.get_mut(&handle) {
                        record.online = false;
                        record.last_seen = Utc::now();
                        let record = record.clone();
                        self.broadcast(&record);
                    } else {
                        debug!("Offline for unknown user {}", handle);
                    }
                }
                PresenceMessage::Get { handle, respond_to } => {
                    let _ = respond_to.send(self.records.get(&handle).cloned());
                }
                PresenceMessage::ListOnline { respond_to } => {
                    let mut online: Vec<String> = self
                        .records
                        .values()
                        .filter(|r| r.online)
                        .map(|r| r.handle.clone())
                        .collect();
                    online.sort();
                    let _ = respond_to.send(online);
                }
                PresenceMessage::Subscribe {
                    subscription_id,
                    watch,
                    sender,
                    respond_to,
                } => {
                    self.subscribers
                        .insert(subscription_id, PresenceSubscriber { watch, sender });
                    let _ = respond_to.send(());
                }
                PresenceMessage::Unsubscribe { subscription_id } => {
                    self.subscribers.remove(&subscription_id);
                }
            }
        }

        info!("Presence tracker stopped");
    }

    fn broadcast(&self, record: &PresenceRecord) {
        for subscriber in self.subscribers.values() {
            if let Some(watch) = &subscriber.watch {
                if watch != &record.handle {
                    continue;
                }
            }
            // try_send: presence is best-effort and never blocks the tracker
            let _ = subscriber.sender.try_send(record.clone());
        }
    }
}

#[derive(Clone)]
pub struct PresenceHandle {
    sender: mpsc::UnboundedSender<PresenceMessage>,
}

impl PresenceHandle {
    pub fn new(sender: mpsc::UnboundedSender<PresenceMessage>) -> Self {
        Self { sender }
    }

    /// Fire-and-forget; a failed presence update must never block messaging.
    pub fn set_online(&self, info: UserInfo) -> Result<(), LiveError> {
        self.sender
            .send(PresenceMessage::SetOnline { info })
            .map_err(|_| LiveError::store_unavailable())
    }

    pub fn set_offline(&self, handle: &str) -> Result<(), LiveError> {
        self.sender
            .send(PresenceMessage::SetOffline {
                handle: handle.to_string(),
            })
            .map_err(|_| LiveError::store_unavailable())
    }

    pub async fn get(&self, handle: &str) -> Result<Option<PresenceRecord>, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PresenceMessage::Get {
                handle: handle.to_string(),
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }

    pub async fn list_online(&self) -> Result<Vec<String>, LiveError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PresenceMessage::ListOnline { respond_to })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())
    }

    pub async fn subscribe(
        &self,
        watch: Option<String>,
        capacity: usize,
    ) -> Result<Subscription<PresenceRecord>, LiveError> {
        let (sender, receiver) = mpsc::channel(capacity);
        let (respond_to, response) = oneshot::channel();
        let subscription_id = Uuid::new_v4();

        self.sender
            .send(PresenceMessage::Subscribe {
                subscription_id,
                watch,
                sender,
                respond_to,
            })
            .map_err(|_| LiveError::store_unavailable())?;
        response.await.map_err(|_| LiveError::store_unavailable())?;

        Ok(Subscription {
            id: subscription_id,
            receiver,
        })
    }

    pub fn unsubscribe(&self, subscription_id: Uuid) {
        let _ = self
            .sender
            .send(PresenceMessage::Unsubscribe { subscription_id });
    }
}
