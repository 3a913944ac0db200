use tokio::sync::mpsc;
use uuid::Uuid;

pub mod connection_manager;
pub mod directory;
pub mod engagement;
pub mod message_store;
pub mod notifications;
pub mod presence;
pub mod typing;
pub mod user_session;

/// A live push feed handed out by a subscribing actor. Callers must pass the
/// id back to the owning handle's `unsubscribe` when the observing context is
/// torn down, otherwise the actor keeps pushing into a dead channel.
#[derive(Debug)]
pub struct Subscription<T> {
    pub id: Uuid,
    pub receiver: mpsc::Receiver<T>,
}
