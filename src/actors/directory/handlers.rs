use std::collections::BTreeSet;

use tracing::debug;

use super::directory::{ConversationDirectory, ConversationMeta, direct_key, group_key};
use crate::domain::{ConversationEntry, DirectoryPatch, ShareTarget};
use crate::error::LiveError;

impl ConversationDirectory {
    pub(super) fn handle_resolve_or_create(
        &mut self,
        initiator: &str,
        target: ShareTarget,
    ) -> Result<String, LiveError> {
        match target {
            ShareTarget::User(counterpart) => {
                // Counterpart must be a known identity; sharing to a handle
                // nobody owns is a caller error, not a lazy-create.
                if !self.identity.is_known(&counterpart) {
                    return Err(LiveError::NotFound(format!(
                        "no such user {counterpart}"
                    )));
                }

                let key = direct_key(initiator, &counterpart);
                self.conversations.entry(key.clone()).or_insert_with(|| {
                    debug!("Created 1:1 conversation {}", key);
                    ConversationMeta {
                        is_group: false,
                        participants: BTreeSet::from([
                            initiator.to_string(),
                            counterpart.clone(),
                        ]),
                    }
                });
                Ok(key)
            }
            ShareTarget::Group(group_id) => {
                let key = group_key(&group_id);
                let meta = self.conversations.entry(key.clone()).or_insert_with(|| {
                    debug!("Created group conversation {}", key);
                    ConversationMeta {
                        is_group: true,
                        participants: BTreeSet::new(),
                    }
                });
                meta.participants.insert(initiator.to_string());
                Ok(key)
            }
        }
    }

    pub(super) fn handle_upsert(&mut self, key: &str, viewer: &str, patch: DirectoryPatch) {
        let meta = self.conversations.get(key);
        let is_group = meta.map(|m| m.is_group).unwrap_or_else(|| key.starts_with("group:"));
        let counterpart = if is_group {
            None
        } else {
            meta.and_then(|m| m.participants.iter().find(|p| p.as_str() != viewer).cloned())
        };

        let entry = self
            .entries
            .entry(viewer.to_string())
            .or_default()
            .entry(key.to_string())
            .or_insert_with(|| ConversationEntry {
                key: key.to_string(),
                is_group,
                counterpart,
                last_message_text: None,
                last_message_time: None,
                unread_count: 0,
            });

        if let Some(text) = patch.last_message_text {
            entry.last_message_text = Some(text);
        }
        if let Some(time) = patch.last_message_time {
            entry.last_message_time = Some(time);
        }
        if patch.increment_unread {
            entry.unread_count += 1;
        }
    }

    pub(super) fn handle_list_for_user(&self, handle: &str) -> Vec<ConversationEntry> {
        let mut list: Vec<ConversationEntry> = self
            .entries
            .get(handle)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default();

        // Most recently active first; ties broken by key for determinism.
        list.sort_by(|a, b| {
            b.last_message_time
                .cmp(&a.last_message_time)
                .then_with(|| a.key.cmp(&b.key))
        });

        list
    }

    pub(super) fn handle_mark_read(&mut self, viewer: &str, key: &str) -> Result<(), LiveError> {
        let entry = self
            .entries
            .get_mut(viewer)
            .and_then(|entries| entries.get_mut(key))
            .ok_or_else(|| LiveError::NotFound(format!("no conversation {key} for {viewer}")))?;
        entry.unread_count = 0;
        Ok(())
    }

    pub(super) fn handle_add_member(&mut self, key: &str, handle: &str) -> Result<(), LiveError> {
        let meta = self
            .conversations
            .get_mut(key)
            .ok_or_else(|| LiveError::NotFound(format!("no conversation {key}")))?;
        if !meta.is_group {
            return Err(LiveError::InvalidPayload(format!(
                "{key} is not a group conversation"
            )));
        }
        meta.participants.insert(handle.to_string());
        Ok(())
    }

    pub(super) fn handle_members(&self, key: &str) -> Result<Vec<String>, LiveError> {
        self.conversations
            .get(key)
            .map(|meta| meta.participants.iter().cloned().collect())
            .ok_or_else(|| LiveError::NotFound(format!("no conversation {key}")))
    }
}
