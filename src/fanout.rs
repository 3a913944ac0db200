use tracing::{debug, warn};

use crate::actors::directory::DirectoryHandle;
use crate::actors::message_store::MessageStoreHandle;
use crate::actors::notifications::NotificationHandle;
use crate::domain::{
    DirectoryPatch, Message, MessageDraft, MessagePayload, NotificationDraft, NotificationKind,
    ShareFailure, SharedRef, ShareReport, ShareTarget,
};
use crate::error::LiveError;
use crate::metrics::Metrics;

/// Delivers one message (or one share) into a target conversation: resolve
/// the thread, append, then fan the preview into every participant's
/// directory entry. Multi-target shares run each target independently;
/// partial failure is a normal, reported outcome.
#[derive(Clone)]
pub struct ShareFanout {
    directory: DirectoryHandle,
    store: MessageStoreHandle,
    notifications: NotificationHandle,
}

impl ShareFanout {
    pub fn new(
        directory: DirectoryHandle,
        store: MessageStoreHandle,
        notifications: NotificationHandle,
    ) -> Self {
        Self {
            directory,
            store,
            notifications,
        }
    }

    /// One logical send: resolve/create, append, directory fan-in, then a
    /// best-effort notification per recipient. The append and the upserts
    /// are separate writes; a crash between them leaves the documented
    /// directory-lag window, not corruption.
    pub async fn send(
        &self,
        from: &str,
        target: &ShareTarget,
        payload: MessagePayload,
    ) -> Result<Message, LiveError> {
        let key = self
            .directory
            .resolve_or_create(from, target.clone())
            .await?;

        let message = self
            .store
            .append(
                key.clone(),
                MessageDraft {
                    sender: from.to_string(),
                    payload,
                },
            )
            .await?;

        let preview = message.payload.preview();
        let members = self.directory.members(&key).await?;
        for member in &members {
            let patch = DirectoryPatch {
                last_message_text: Some(preview.clone()),
                last_message_time: Some(message.sent_at),
                increment_unread: member != from,
            };
            self.directory.upsert(&key, member, patch).await?;
        }

        for member in members.iter().filter(|m| m.as_str() != from) {
            let draft = match &message.payload {
                MessagePayload::Text(_) => NotificationDraft {
                    kind: NotificationKind::Message,
                    actor: from.to_string(),
                    text: format!("New message from {}", message.sender_name),
                    content: None,
                    action: None,
                },
                MessagePayload::Shared(shared) => NotificationDraft {
                    kind: NotificationKind::Share,
                    actor: from.to_string(),
                    text: format!(
                        "{} shared a {} with you",
                        message.sender_name,
                        shared.kind.as_str()
                    ),
                    content: Some(shared.clone()),
                    action: None,
                },
            };

            // Notification failures never fail the send itself.
            if let Err(e) = self.notifications.notify(member, draft).await {
                debug!("Notification to {} failed: {}", member, e);
            }
        }

        Metrics::message_delivered(&message.payload);
        Ok(message)
    }

    /// Fans one share action out to every selected target. Targets are
    /// independent units: one failing resolve or append leaves the others
    /// untouched, and the report names exactly which subset failed so the
    /// caller can retry just those.
    pub async fn share(
        &self,
        content: SharedRef,
        from: &str,
        targets: Vec<ShareTarget>,
    ) -> ShareReport {
        let mut report = ShareReport::default();

        for target in targets {
            match self
                .send(from, &target, MessagePayload::Shared(content.clone()))
                .await
            {
                Ok(_) => {
                    Metrics::share_target("succeeded");
                    report.succeeded.push(target);
                }
                Err(e) => {
                    warn!("Share to {:?} failed: {}", target, e);
                    Metrics::share_target("failed");
                    report.failed.push(ShareFailure {
                        target,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
