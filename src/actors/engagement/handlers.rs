use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::counters::{ContentEngagement, EngagementCounters};
use crate::domain::{Comment, EngagementSnapshot, LikeOutcome};
use crate::error::LiveError;

impl EngagementCounters {
    pub(super) fn handle_track_content(&mut self, content_id: String, owner: String) {
        self.contents
            .entry(content_id)
            .or_insert_with(|| ContentEngagement {
                owner,
                likes: 0,
                liked_by: HashSet::new(),
                comments: Vec::new(),
            });
    }

    pub(super) fn handle_toggle_like(
        &mut self,
        content_id: &str,
        handle: &str,
    ) -> Result<LikeOutcome, LiveError> {
        let content = self
            .contents
            .get_mut(content_id)
            .ok_or_else(|| LiveError::NotFound(format!("no content {content_id}")))?;

        // Counter and set move together in one step; the mailbox serializes
        // concurrent togglers.
        let liked = if content.liked_by.remove(handle) {
            content.likes -= 1;
            false
        } else {
            content.liked_by.insert(handle.to_string());
            content.likes += 1;
            true
        };

        debug_assert_eq!(content.likes as usize, content.liked_by.len());
        debug!(
            "{} {} {} (now {})",
            handle,
            if liked { "liked" } else { "unliked" },
            content_id,
            content.likes
        );

        Ok(LikeOutcome {
            liked,
            count: content.likes,
        })
    }

    pub(super) fn handle_add_comment(
        &mut self,
        content_id: &str,
        author: String,
        text: String,
    ) -> Result<Comment, LiveError> {
        if text.trim().is_empty() {
            return Err(LiveError::InvalidPayload("empty comment".to_string()));
        }

        let content = self
            .contents
            .get_mut(content_id)
            .ok_or_else(|| LiveError::NotFound(format!("no content {content_id}")))?;

        let comment = Comment {
            id: Uuid::new_v4(),
            author,
            text,
            posted_at: Utc::now(),
        };
        content.comments.push(comment.clone());

        Ok(comment)
    }

    pub(super) fn handle_delete_comment(
        &mut self,
        content_id: &str,
        comment_id: Uuid,
        requester: &str,
    ) -> Result<(), LiveError> {
        let content = self
            .contents
            .get_mut(content_id)
            .ok_or_else(|| LiveError::NotFound(format!("no content {content_id}")))?;

        let index = content
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| LiveError::NotFound(format!("no comment {comment_id}")))?;

        let author = &content.comments[index].author;
        if requester != author && requester != content.owner {
            return Err(LiveError::NotAuthorized(format!(
                "{requester} may not delete this comment"
            )));
        }

        content.comments.remove(index);
        Ok(())
    }

    pub(super) fn handle_snapshot(
        &self,
        content_id: &str,
    ) -> Result<EngagementSnapshot, LiveError> {
        let content = self
            .contents
            .get(content_id)
            .ok_or_else(|| LiveError::NotFound(format!("no content {content_id}")))?;

        let mut liked_by: Vec<String> = content.liked_by.iter().cloned().collect();
        liked_by.sort();

        Ok(EngagementSnapshot {
            content_id: content_id.to_string(),
            owner: content.owner.clone(),
            likes: content.likes,
            liked_by,
            comments: content.comments.clone(),
        })
    }
}
