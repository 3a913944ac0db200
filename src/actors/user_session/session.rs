use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, warn};

use super::{SessionContext, SessionSubs, handlers};
use crate::domain::UserInfo;
use crate::metrics::Metrics;
use crate::wire::{ClientEvent, ServerEvent};

pub struct UserSession {
    profile: UserInfo,
    socket: WebSocket,
    ctx: SessionContext,
    session_receiver: mpsc::Receiver<ServerEvent>,
    session_sender: mpsc::Sender<ServerEvent>,
}

impl UserSession {
    pub async fn new(
        profile: UserInfo,
        socket: WebSocket,
        ctx: SessionContext,
    ) -> Result<Self, String> {
        let (session_sender, session_receiver) = mpsc::channel(ctx.config.session_buffer);

        // The gateway is where the identity collaborator learns about this
        // user; the core components only ever look the handle up.
        ctx.identity.register(profile.clone());

        // Presence failures are non-fatal: messaging continues without it.
        if let Err(e) = ctx.presence.set_online(profile.clone()) {
            warn!("Presence update failed for {}: {}", profile.handle, e);
        }

        Ok(Self {
            profile,
            socket,
            ctx,
            session_receiver,
            session_sender,
        })
    }

    pub async fn run(self) {
        let (mut ws_sender, mut ws_receiver) = self.socket.split();
        let profile = self.profile;
        let ctx = self.ctx;
        let session_sender = self.session_sender;
        let mut session_receiver = self.session_receiver;

        Metrics::session_connected();

        let subs = Arc::new(Mutex::new(SessionSubs::default()));

        // Every session gets its notification feed up front.
        match ctx
            .notifications
            .subscribe(&profile.handle, ctx.config.session_buffer)
            .await
        {
            Ok((recent, subscription)) => {
                for notification in recent {
                    let _ = session_sender
                        .send(ServerEvent::Notification { notification })
                        .await;
                }

                let out = session_sender.clone();
                let mut receiver = subscription.receiver;
                let task = tokio::spawn(async move {
                    while let Some(notification) = receiver.recv().await {
                        if out
                            .send(ServerEvent::Notification { notification })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                });
                subs.lock().await.notifications = Some((subscription.id, task));
            }
            Err(e) => {
                warn!(
                    "Notification subscription failed for {}: {}",
                    profile.handle, e
                );
            }
        }

        // Outgoing: session events to the WebSocket.
        let send_handle = profile.handle.clone();
        let mut send_task = tokio::spawn(async move {
            while let Some(event) = session_receiver.recv().await {
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if ws_sender.send(Message::Text(json.into())).await.is_err() {
                            debug!(
                                "WebSocket send failed for {}, likely disconnected",
                                send_handle
                            );
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to serialize event for {}: {}", send_handle, e);
                    }
                }
            }
        });

        // Incoming: client events to the component handles.
        let recv_profile = profile.clone();
        let recv_ctx = ctx.clone();
        let recv_subs = Arc::clone(&subs);
        let out = session_sender.clone();
        let mut recv_task = tokio::spawn(async move {
            while let Some(Ok(Message::Text(text))) = ws_receiver.next().await {
                match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        let mut subs = recv_subs.lock().await;
                        if let Err(e) = handlers::handle_event(
                            event,
                            &recv_profile,
                            &recv_ctx,
                            &out,
                            &mut subs,
                        )
                        .await
                        {
                            let _ = out
                                .send(ServerEvent::Error {
                                    message: e.to_string(),
                                })
                                .await;
                        }
                    }
                    Err(e) => {
                        debug!(
                            "Unparseable frame from {}: {}",
                            recv_profile.handle, e
                        );
                        let _ = out
                            .send(ServerEvent::Error {
                                message: format!("invalid event: {e}"),
                            })
                            .await;
                    }
                }
            }
        });

        tokio::select! {
            _ = &mut send_task => {
                debug!("Send task completed for {}", profile.handle);
                recv_task.abort();
            }
            _ = &mut recv_task => {
                debug!("Receive task completed for {}", profile.handle);
                send_task.abort();
            }
        }

        subs.lock().await.teardown(&ctx, &profile.handle);

        if let Err(e) = ctx.presence.set_offline(&profile.handle) {
            warn!("Offline update failed for {}: {}", profile.handle, e);
        }

        Metrics::session_disconnected();
        debug!("Session ended for {}", profile.handle);
    }
}
