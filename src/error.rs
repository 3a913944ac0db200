use thiserror::Error;

/// Error taxonomy shared by every component. `InvalidPayload` and
/// `NotAuthorized` are terminal and never retried; `TransientStoreFailure`
/// is safe to retry for idempotent operations (resolve, upsert).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LiveError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("transient store failure: {0}")]
    TransientStoreFailure(String),
}

impl LiveError {
    /// An actor mailbox or response channel went away.
    pub fn store_unavailable() -> Self {
        Self::TransientStoreFailure("store actor unavailable".to_string())
    }
}
