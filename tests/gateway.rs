use std::sync::Arc;
use std::time::Duration;

use alumnet_live::{alumnet_route, config::LiveConfig, state::AppStateBuilder};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server() -> String {
    let state = AppStateBuilder::new()
        .with_config(LiveConfig::default())
        .build()
        .await
        .expect("state builds");
    let app = alumnet_route(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("127.0.0.1:{}", addr.port())
}

async fn connect(addr: &str, handle: &str, name: &str) -> WsStream {
    let url = format!("ws://{addr}/ws?handle={handle}&name={name}");
    let (stream, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("ws connect");
    stream
}

async fn send_event(ws: &mut WsStream, event: Value) {
    ws.send(Message::Text(event.to_string().into()))
        .await
        .expect("ws send");
}

/// Reads frames until one of the wanted type arrives; everything is wrapped
/// in a timeout so a missing push fails the test instead of hanging it.
async fn next_event_of(ws: &mut WsStream, wanted: &str) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("ws error");
        if let Message::Text(text) = frame {
            let event: Value = serde_json::from_str(text.as_str()).unwrap();
            if event["type"] == wanted {
                return event;
            }
        }
    }
}

#[tokio::test]
async fn message_round_trip_over_websocket() {
    let addr = start_server().await;

    // Both sides connect (and thereby register their identities).
    let mut rohan = connect(&addr, "rohan-verma", "Rohan").await;
    let mut priya = connect(&addr, "priya-sharma", "Priya").await;

    // Let both sessions finish registering their identities.
    tokio::time::sleep(Duration::from_millis(100)).await;

    send_event(
        &mut priya,
        json!({
            "type": "send_message",
            "target": { "user": "rohan-verma" },
            "text": "hello"
        }),
    )
    .await;

    let ack = next_event_of(&mut priya, "message_delivered").await;
    assert_eq!(ack["message"]["sender"], "priya-sharma");
    assert_eq!(ack["message"]["payload"]["text"], "hello");
    assert_eq!(ack["message"]["seq"], 1);

    // The recipient is notified even before opening the thread.
    let notification = next_event_of(&mut rohan, "notification").await;
    assert_eq!(notification["notification"]["kind"], "message");

    // Opening the conversation replays the backlog.
    send_event(
        &mut rohan,
        json!({
            "type": "open_conversation",
            "target": { "user": "priya-sharma" }
        }),
    )
    .await;
    let opened = next_event_of(&mut rohan, "conversation_opened").await;
    assert_eq!(opened["backlog"].as_array().unwrap().len(), 1);
    assert_eq!(opened["backlog"][0]["sender"], "priya-sharma");

    // Live push for the next message.
    send_event(
        &mut priya,
        json!({
            "type": "send_message",
            "target": { "user": "rohan-verma" },
            "text": "are you coming to the reunion?"
        }),
    )
    .await;
    let pushed = next_event_of(&mut rohan, "new_message").await;
    assert_eq!(
        pushed["message"]["payload"]["text"],
        "are you coming to the reunion?"
    );

    // Directory preview reflects the latest message.
    send_event(&mut rohan, json!({ "type": "list_conversations" })).await;
    let list = next_event_of(&mut rohan, "conversations").await;
    let conversations = list["conversations"].as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(
        conversations[0]["last_message_text"],
        "are you coming to the reunion?"
    );
}

#[tokio::test]
async fn invalid_send_gets_an_error_frame() {
    let addr = start_server().await;
    let mut priya = connect(&addr, "priya-sharma", "Priya").await;

    // Neither text nor shared reference.
    send_event(
        &mut priya,
        json!({
            "type": "send_message",
            "target": { "user": "priya-sharma" }
        }),
    )
    .await;

    let error = next_event_of(&mut priya, "error").await;
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("invalid payload")
    );
}

#[tokio::test]
async fn like_over_websocket_notifies_the_owner() {
    let addr = start_server().await;
    let mut priya = connect(&addr, "priya-sharma", "Priya").await;
    let mut rohan = connect(&addr, "rohan-verma", "Rohan").await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    send_event(
        &mut priya,
        json!({ "type": "publish_content", "content_id": "post-42" }),
    )
    .await;
    // Round trip on the same session so the publish is applied before the
    // other session likes it.
    send_event(&mut priya, json!({ "type": "list_online" })).await;
    next_event_of(&mut priya, "online_users").await;

    send_event(
        &mut rohan,
        json!({ "type": "toggle_like", "content_id": "post-42" }),
    )
    .await;
    let updated = next_event_of(&mut rohan, "like_updated").await;
    assert_eq!(updated["liked"], true);
    assert_eq!(updated["count"], 1);

    let notification = next_event_of(&mut priya, "notification").await;
    assert_eq!(notification["notification"]["kind"], "like");
    assert_eq!(notification["notification"]["actor"], "rohan-verma");
}

#[tokio::test]
async fn online_users_reflect_connected_sessions() {
    let addr = start_server().await;
    let mut priya = connect(&addr, "priya-sharma", "Priya").await;
    let _rohan = connect(&addr, "rohan-verma", "Rohan").await;

    // Give the second session a beat to register presence.
    tokio::time::sleep(Duration::from_millis(100)).await;

    send_event(&mut priya, json!({ "type": "list_online" })).await;
    let online = next_event_of(&mut priya, "online_users").await;
    let users = online["users"].as_array().unwrap();
    assert!(users.iter().any(|u| u == "priya-sharma"));
    assert!(users.iter().any(|u| u == "rohan-verma"));
}
