use tokio::sync::mpsc;
use tracing::debug;

use super::{SessionContext, SessionSubs};
use crate::domain::{MessagePayload, NotificationDraft, NotificationKind, UserInfo};
use crate::error::LiveError;
use crate::wire::{ClientEvent, ServerEvent};

/// Bridges one client event to the component contracts. Terminal errors are
/// returned and surfaced to the client as an error frame; they are never
/// retried here.
pub async fn handle_event(
    event: ClientEvent,
    profile: &UserInfo,
    ctx: &SessionContext,
    out: &mpsc::Sender<ServerEvent>,
    subs: &mut SessionSubs,
) -> Result<(), LiveError> {
    match event {
        ClientEvent::SendMessage {
            target,
            text,
            shared,
        } => {
            let payload = MessagePayload::from_parts(text, shared)?;
            let message = ctx.fanout.send(&profile.handle, &target, payload).await?;
            let _ = out.send(ServerEvent::MessageDelivered { message }).await;
        }

        ClientEvent::OpenConversation { target } => {
            let key = ctx
                .directory
                .resolve_or_create(&profile.handle, target)
                .await?;

            // Re-opening replaces any previous feed on this conversation.
            subs.close_conversation(ctx, &key);

            // NotFound here just means nothing was ever received in it.
            if let Err(e) = ctx.directory.mark_read(&profile.handle, &key).await {
                debug!("mark_read on open {}: {}", key, e);
            }

            let (backlog, subscription) = ctx
                .store
                .subscribe(&key, ctx.config.session_buffer)
                .await?;

            let message_out = out.clone();
            let mut receiver = subscription.receiver;
            let task = tokio::spawn(async move {
                while let Some(message) = receiver.recv().await {
                    if message_out
                        .send(ServerEvent::NewMessage { message })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
            subs.messages.insert(key.clone(), (subscription.id, task));

            let (current, typing_sub) = ctx
                .typing
                .subscribe(&key, ctx.config.session_buffer)
                .await?;

            let typing_out = out.clone();
            let typing_key = key.clone();
            let mut typing_receiver = typing_sub.receiver;
            let task = tokio::spawn(async move {
                while let Some(users) = typing_receiver.recv().await {
                    if typing_out
                        .send(ServerEvent::Typing {
                            conversation_id: typing_key.clone(),
                            users,
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
            subs.typing.insert(key.clone(), (typing_sub.id, task));

            let _ = out
                .send(ServerEvent::ConversationOpened {
                    conversation_id: key.clone(),
                    backlog,
                })
                .await;
            if !current.is_empty() {
                let _ = out
                    .send(ServerEvent::Typing {
                        conversation_id: key,
                        users: current,
                    })
                    .await;
            }
        }

        ClientEvent::CloseConversation { conversation_id } => {
            subs.close_conversation(ctx, &conversation_id);
        }

        ClientEvent::ListConversations => {
            let conversations = ctx.directory.list_for_user(&profile.handle).await?;
            let _ = out.send(ServerEvent::Conversations { conversations }).await;
        }

        ClientEvent::StartTyping { conversation_id } => {
            ctx.typing.set_typing(&conversation_id, profile.clone())?;
        }

        ClientEvent::StopTyping { conversation_id } => {
            ctx.typing.clear_typing(&conversation_id, &profile.handle)?;
        }

        ClientEvent::PublishContent { content_id } => {
            ctx.engagement
                .track_content(&content_id, &profile.handle)
                .await?;
        }

        ClientEvent::ToggleLike { content_id } => {
            let outcome = ctx
                .engagement
                .toggle_like(&content_id, &profile.handle)
                .await?;
            let _ = out
                .send(ServerEvent::LikeUpdated {
                    content_id: content_id.clone(),
                    liked: outcome.liked,
                    count: outcome.count,
                })
                .await;

            if outcome.liked {
                notify_owner(
                    ctx,
                    &content_id,
                    profile,
                    NotificationKind::Like,
                    format!("{} liked your post", profile.display_name),
                )
                .await;
            }
        }

        ClientEvent::AddComment { content_id, text } => {
            let comment = ctx
                .engagement
                .add_comment(&content_id, &profile.handle, &text)
                .await?;
            let _ = out
                .send(ServerEvent::CommentAdded {
                    content_id: content_id.clone(),
                    comment,
                })
                .await;

            notify_owner(
                ctx,
                &content_id,
                profile,
                NotificationKind::Comment,
                format!("{} commented on your post", profile.display_name),
            )
            .await;
        }

        ClientEvent::DeleteComment {
            content_id,
            comment_id,
        } => {
            ctx.engagement
                .delete_comment(&content_id, comment_id, &profile.handle)
                .await?;
            let _ = out
                .send(ServerEvent::CommentDeleted {
                    content_id,
                    comment_id,
                })
                .await;
        }

        ClientEvent::Share { content, targets } => {
            let report = ctx.fanout.share(content, &profile.handle, targets).await;
            let _ = out.send(ServerEvent::ShareResult { report }).await;
        }

        ClientEvent::MarkNotificationRead { notification_id } => {
            ctx.notifications
                .mark_read(&profile.handle, notification_id)
                .await?;
        }

        ClientEvent::WatchPresence { handle } => {
            if let Some((id, task)) = subs.presence.remove(&handle) {
                ctx.presence.unsubscribe(id);
                task.abort();
            }

            let subscription = ctx
                .presence
                .subscribe(Some(handle.clone()), ctx.config.session_buffer)
                .await?;

            // Current state first, then live transitions.
            if let Ok(Some(record)) = ctx.presence.get(&handle).await {
                let _ = out.send(ServerEvent::Presence { record }).await;
            }

            let presence_out = out.clone();
            let mut receiver = subscription.receiver;
            let task = tokio::spawn(async move {
                while let Some(record) = receiver.recv().await {
                    if presence_out
                        .send(ServerEvent::Presence { record })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
            subs.presence.insert(handle, (subscription.id, task));
        }

        ClientEvent::ListOnline => {
            let users = ctx.presence.list_online().await?;
            let _ = out.send(ServerEvent::OnlineUsers { users }).await;
        }
    }

    Ok(())
}

/// Best-effort notification to a content owner; failures only log.
async fn notify_owner(
    ctx: &SessionContext,
    content_id: &str,
    actor: &UserInfo,
    kind: NotificationKind,
    text: String,
) {
    let snapshot = match ctx.engagement.snapshot(content_id).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            debug!("Snapshot for {} failed: {}", content_id, e);
            return;
        }
    };

    if snapshot.owner == actor.handle {
        return;
    }

    let draft = NotificationDraft {
        kind,
        actor: actor.handle.clone(),
        text,
        content: None,
        action: None,
    };
    if let Err(e) = ctx.notifications.notify(&snapshot.owner, draft).await {
        debug!("Notification to {} failed: {}", snapshot.owner, e);
    }
}
