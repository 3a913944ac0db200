use std::time::Duration;

use alumnet_live::actors::directory::direct_key;
use alumnet_live::config::LiveConfig;
use alumnet_live::domain::{
    ContentKind, DirectoryPatch, MessageDraft, MessagePayload, NotificationDraft,
    NotificationKind, SharedRef, ShareTarget, UserInfo,
};
use alumnet_live::error::LiveError;
use alumnet_live::state::{AppState, AppStateBuilder};
use chrono::{TimeZone, Utc};

fn user(handle: &str, name: &str) -> UserInfo {
    UserInfo {
        handle: handle.to_string(),
        display_name: name.to_string(),
        avatar_url: format!("https://cdn.example/{handle}.png"),
    }
}

async fn state_with(config: LiveConfig) -> AppState {
    AppStateBuilder::new()
        .with_config(config)
        .build()
        .await
        .expect("state builds")
}

async fn default_state() -> AppState {
    state_with(LiveConfig::default()).await
}

#[tokio::test]
async fn like_count_matches_liker_set_under_concurrent_togglers() {
    let state = default_state().await;
    let engagement = state.ctx.engagement.clone();
    engagement.track_content("post-42", "admin").await.unwrap();

    let mut tasks = Vec::new();
    // priya and rohan toggle once; kavya toggles three times (net: liked)
    for (handle, toggles) in [("priya-sharma", 1), ("rohan-verma", 1), ("kavya-iyer", 3)] {
        for _ in 0..toggles {
            let engagement = engagement.clone();
            tasks.push(tokio::spawn(async move {
                engagement.toggle_like("post-42", handle).await.unwrap();
            }));
        }
    }
    for task in tasks {
        task.await.unwrap();
    }

    let snapshot = engagement.snapshot("post-42").await.unwrap();
    assert_eq!(snapshot.likes as usize, snapshot.liked_by.len());
    assert_eq!(snapshot.likes, 3);
    for handle in ["priya-sharma", "rohan-verma", "kavya-iyer"] {
        assert!(snapshot.liked_by.iter().any(|h| h == handle));
    }
}

#[tokio::test]
async fn like_unlike_round_trip() {
    let state = default_state().await;
    let engagement = &state.ctx.engagement;
    engagement.track_content("post-1", "meera-nair").await.unwrap();

    let first = engagement.toggle_like("post-1", "kavya-iyer").await.unwrap();
    assert!(first.liked);
    assert_eq!(first.count, 1);

    let second = engagement.toggle_like("post-1", "kavya-iyer").await.unwrap();
    assert!(!second.liked);
    assert_eq!(second.count, 0);
}

#[tokio::test]
async fn toggle_like_on_unknown_content_is_not_found() {
    let state = default_state().await;
    let err = state
        .ctx
        .engagement
        .toggle_like("post-nope", "kavya-iyer")
        .await
        .unwrap_err();
    assert!(matches!(err, LiveError::NotFound(_)));
}

#[tokio::test]
async fn comment_deletion_is_author_or_owner_only() {
    let state = default_state().await;
    let engagement = &state.ctx.engagement;
    engagement.track_content("post-7", "meera-nair").await.unwrap();

    let comment = engagement
        .add_comment("post-7", "rohan-verma", "Congrats!")
        .await
        .unwrap();

    // A bystander may not delete it.
    let err = engagement
        .delete_comment("post-7", comment.id, "kavya-iyer")
        .await
        .unwrap_err();
    assert!(matches!(err, LiveError::NotAuthorized(_)));

    // The content owner may.
    engagement
        .delete_comment("post-7", comment.id, "meera-nair")
        .await
        .unwrap();
    let snapshot = engagement.snapshot("post-7").await.unwrap();
    assert!(snapshot.comments.is_empty());
}

#[tokio::test]
async fn conversation_key_is_stable_across_calls_and_directions() {
    let state = default_state().await;
    state.ctx.identity.register(user("rohan-verma", "Rohan Verma"));
    state.ctx.identity.register(user("kavya-iyer", "Kavya Iyer"));
    let directory = &state.ctx.directory;

    let first = directory
        .resolve_or_create("priya-sharma", ShareTarget::User("rohan-verma".into()))
        .await
        .unwrap();
    let second = directory
        .resolve_or_create("priya-sharma", ShareTarget::User("rohan-verma".into()))
        .await
        .unwrap();
    assert_eq!(first, second);

    // The counterpart resolves the same thread from their side.
    state.ctx.identity.register(user("priya-sharma", "Priya Sharma"));
    let reverse = directory
        .resolve_or_create("rohan-verma", ShareTarget::User("priya-sharma".into()))
        .await
        .unwrap();
    assert_eq!(first, reverse);

    let other = directory
        .resolve_or_create("priya-sharma", ShareTarget::User("kavya-iyer".into()))
        .await
        .unwrap();
    assert_ne!(first, other);
}

#[tokio::test]
async fn subscriber_observes_messages_in_append_order() {
    let state = default_state().await;
    state.ctx.identity.register(user("priya-sharma", "Priya Sharma"));
    let key = "dm:priya-sharma:rohan-verma";

    let (backlog, mut subscription) = state.ctx.store.subscribe(key, 16).await.unwrap();
    assert!(backlog.is_empty());

    for text in ["first", "second", "third"] {
        state
            .ctx
            .store
            .append(
                key,
                MessageDraft {
                    sender: "priya-sharma".into(),
                    payload: MessagePayload::Text(text.into()),
                },
            )
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for _ in 0..3 {
        let message = subscription.receiver.recv().await.unwrap();
        seen.push(message);
    }
    assert_eq!(
        seen.iter()
            .map(|m| match &m.payload {
                MessagePayload::Text(t) => t.as_str(),
                _ => "",
            })
            .collect::<Vec<_>>(),
        vec!["first", "second", "third"]
    );
    assert_eq!(seen.iter().map(|m| m.seq).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(seen.windows(2).all(|w| w[0].sent_at <= w[1].sent_at));
}

#[tokio::test]
async fn append_validates_payload_and_sender() {
    let state = default_state().await;
    state.ctx.identity.register(user("priya-sharma", "Priya Sharma"));

    let err = state
        .ctx
        .store
        .append(
            "dm:a:b",
            MessageDraft {
                sender: "priya-sharma".into(),
                payload: MessagePayload::Text("   ".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LiveError::InvalidPayload(_)));

    let err = state
        .ctx
        .store
        .append(
            "dm:a:b",
            MessageDraft {
                sender: "nobody".into(),
                payload: MessagePayload::Text("hi".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LiveError::NotAuthorized(_)));
}

#[tokio::test(start_paused = true)]
async fn typing_marker_expires_by_staleness_alone() {
    let state = default_state().await;
    let typing = &state.ctx.typing;
    let key = "dm:priya-sharma:rohan-verma";

    typing
        .set_typing(key, user("priya-sharma", "Priya Sharma"))
        .unwrap();
    // Round trip so the marker is recorded before the clock moves.
    assert_eq!(typing.currently_typing(key).await.unwrap().len(), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    let active = typing.currently_typing(key).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].handle, "priya-sharma");

    // No clear_typing call: the marker drops out purely by staleness.
    tokio::time::advance(Duration::from_secs(3)).await;
    let active = typing.currently_typing(key).await.unwrap();
    assert!(active.is_empty());
}

#[tokio::test(start_paused = true)]
async fn retyping_refreshes_the_marker() {
    let state = default_state().await;
    let typing = &state.ctx.typing;
    let key = "group:batch-of-2010";

    typing.set_typing(key, user("rohan-verma", "Rohan Verma")).unwrap();
    typing.currently_typing(key).await.unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;
    typing.set_typing(key, user("rohan-verma", "Rohan Verma")).unwrap();
    typing.currently_typing(key).await.unwrap();
    tokio::time::advance(Duration::from_secs(2)).await;

    // 4s after the first keystroke but only 2s after the refresh.
    let active = typing.currently_typing(key).await.unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn one_to_one_message_round_trip() {
    let state = default_state().await;
    state.ctx.identity.register(user("priya-sharma", "Priya Sharma"));
    state.ctx.identity.register(user("rohan-verma", "Rohan Verma"));

    state
        .ctx
        .fanout
        .send(
            "priya-sharma",
            &ShareTarget::User("rohan-verma".into()),
            MessagePayload::Text("hello".into()),
        )
        .await
        .unwrap();

    let conversations = state.ctx.directory.list_for_user("rohan-verma").await.unwrap();
    assert_eq!(conversations.len(), 1);
    let entry = &conversations[0];
    assert_eq!(entry.last_message_text.as_deref(), Some("hello"));
    assert_eq!(entry.counterpart.as_deref(), Some("priya-sharma"));
    assert_eq!(entry.unread_count, 1);

    // The sender's own entry stays read.
    let sender_view = state.ctx.directory.list_for_user("priya-sharma").await.unwrap();
    assert_eq!(sender_view[0].unread_count, 0);

    let (backlog, _sub) = state.ctx.store.subscribe(&entry.key, 16).await.unwrap();
    assert_eq!(backlog.len(), 1);
    assert_eq!(backlog[0].sender, "priya-sharma");
    assert_eq!(backlog[0].sender_name, "Priya Sharma");
}

#[tokio::test]
async fn share_fan_out_reports_partial_failure() {
    let state = default_state().await;
    state.ctx.identity.register(user("priya-sharma", "Priya Sharma"));
    state.ctx.identity.register(user("rohan-verma", "Rohan Verma"));

    let content = SharedRef {
        kind: ContentKind::Post,
        id: "post-99".into(),
    };
    let targets = vec![
        ShareTarget::User("rohan-verma".into()),
        ShareTarget::Group("batch-of-2010".into()),
        ShareTarget::User("ghost".into()),
    ];

    let report = state
        .ctx
        .fanout
        .share(content, "priya-sharma", targets)
        .await;

    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].target, ShareTarget::User("ghost".into()));
    assert!(report.failed[0].reason.contains("ghost"));

    // Each successful target got exactly one message and a fresh preview.
    let dm_key = direct_key("priya-sharma", "rohan-verma");
    assert_eq!(state.ctx.store.history(&dm_key).await.unwrap().len(), 1);
    assert_eq!(
        state
            .ctx
            .store
            .history("group:batch-of-2010")
            .await
            .unwrap()
            .len(),
        1
    );

    let rohan = state.ctx.directory.list_for_user("rohan-verma").await.unwrap();
    assert_eq!(rohan[0].last_message_text.as_deref(), Some("Shared a post."));
    assert_eq!(rohan[0].unread_count, 1);
}

#[tokio::test]
async fn conversation_list_orders_by_activity_then_key() {
    let state = default_state().await;
    let directory = &state.ctx.directory;
    let t0 = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2026, 6, 1, 13, 0, 0).unwrap();

    for (key, time) in [
        ("dm:meera-nair:priya-sharma", t0),
        ("dm:priya-sharma:rohan-verma", t1),
        ("dm:kavya-iyer:priya-sharma", t1),
    ] {
        directory
            .upsert(
                key,
                "priya-sharma",
                DirectoryPatch {
                    last_message_text: Some("hey".into()),
                    last_message_time: Some(time),
                    increment_unread: false,
                },
            )
            .await
            .unwrap();
    }

    let list = directory.list_for_user("priya-sharma").await.unwrap();
    let keys: Vec<&str> = list.iter().map(|e| e.key.as_str()).collect();
    // Newest activity first; the t1 tie resolves by key.
    assert_eq!(
        keys,
        vec![
            "dm:kavya-iyer:priya-sharma",
            "dm:priya-sharma:rohan-verma",
            "dm:meera-nair:priya-sharma",
        ]
    );
}

#[tokio::test]
async fn mark_read_resets_unread_count() {
    let state = default_state().await;
    state.ctx.identity.register(user("priya-sharma", "Priya Sharma"));
    state.ctx.identity.register(user("rohan-verma", "Rohan Verma"));

    for text in ["one", "two"] {
        state
            .ctx
            .fanout
            .send(
                "priya-sharma",
                &ShareTarget::User("rohan-verma".into()),
                MessagePayload::Text(text.into()),
            )
            .await
            .unwrap();
    }

    let key = direct_key("priya-sharma", "rohan-verma");
    let list = state.ctx.directory.list_for_user("rohan-verma").await.unwrap();
    assert_eq!(list[0].unread_count, 2);

    state.ctx.directory.mark_read("rohan-verma", &key).await.unwrap();
    let list = state.ctx.directory.list_for_user("rohan-verma").await.unwrap();
    assert_eq!(list[0].unread_count, 0);
}

#[tokio::test]
async fn notifications_list_newest_first_within_window() {
    let mut config = LiveConfig::default();
    config.notification_limit = 2;
    let state = state_with(config).await;
    let notifications = &state.ctx.notifications;

    for text in ["a", "b", "c"] {
        notifications
            .notify(
                "rohan-verma",
                NotificationDraft {
                    kind: NotificationKind::Like,
                    actor: "priya-sharma".into(),
                    text: text.into(),
                    content: None,
                    action: None,
                },
            )
            .await
            .unwrap();
    }

    let recent = notifications.list_recent("rohan-verma").await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].text, "c");
    assert_eq!(recent[1].text, "b");
    assert!(!recent[0].read);

    notifications
        .mark_read("rohan-verma", recent[0].id)
        .await
        .unwrap();
    let recent = notifications.list_recent("rohan-verma").await.unwrap();
    assert!(recent[0].read);

    let err = notifications
        .mark_read("rohan-verma", uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, LiveError::NotFound(_)));
}

#[tokio::test]
async fn presence_last_write_wins() {
    let state = default_state().await;
    let presence = &state.ctx.presence;

    presence.set_online(user("priya-sharma", "Priya Sharma")).unwrap();
    presence.set_online(user("rohan-verma", "Rohan Verma")).unwrap();
    presence.set_offline("priya-sharma").unwrap();

    let online = presence.list_online().await.unwrap();
    assert_eq!(online, vec!["rohan-verma".to_string()]);

    let record = presence.get("priya-sharma").await.unwrap().unwrap();
    assert!(!record.online);
    assert_eq!(record.display_name, "Priya Sharma");
}

#[tokio::test]
async fn presence_subscription_pushes_watched_changes() {
    let state = default_state().await;
    let presence = &state.ctx.presence;

    let mut subscription = presence
        .subscribe(Some("rohan-verma".into()), 8)
        .await
        .unwrap();

    presence.set_online(user("kavya-iyer", "Kavya Iyer")).unwrap();
    presence.set_online(user("rohan-verma", "Rohan Verma")).unwrap();

    // Only the watched handle comes through.
    let record = subscription.receiver.recv().await.unwrap();
    assert_eq!(record.handle, "rohan-verma");
    assert!(record.online);

    presence.unsubscribe(subscription.id);
}

#[tokio::test]
async fn group_share_reaches_joined_members() {
    let state = default_state().await;
    state.ctx.identity.register(user("priya-sharma", "Priya Sharma"));
    state.ctx.identity.register(user("rohan-verma", "Rohan Verma"));
    let directory = &state.ctx.directory;

    let key = directory
        .resolve_or_create("priya-sharma", ShareTarget::Group("batch-of-2010".into()))
        .await
        .unwrap();
    directory.add_member(&key, "rohan-verma").await.unwrap();

    state
        .ctx
        .fanout
        .send(
            "priya-sharma",
            &ShareTarget::Group("batch-of-2010".into()),
            MessagePayload::Text("reunion soon".into()),
        )
        .await
        .unwrap();

    let rohan = directory.list_for_user("rohan-verma").await.unwrap();
    assert_eq!(rohan.len(), 1);
    assert!(rohan[0].is_group);
    assert_eq!(rohan[0].unread_count, 1);
    assert_eq!(rohan[0].last_message_text.as_deref(), Some("reunion soon"));

    let notifications = state.ctx.notifications.list_recent("rohan-verma").await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Message);
}
