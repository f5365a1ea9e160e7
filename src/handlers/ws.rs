//! WebSocket handler: join, ping, heartbeat, and the per-connection writer task.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::handlers::http::AppState;
use crate::models::event::{ClientMessage, ServerEvent, CODE_INVALID_NAME, CODE_MALFORMED};
use crate::models::presence::{generate_connection_id, ConnectionId};
use crate::services::SessionCoordinator;

/// Upgrade HTTP to WebSocket.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let connection_id = generate_connection_id();
    info!(connection_id = %connection_id, "ws connected");

    let heartbeat = state.heartbeat;
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let mut send_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval_at(Instant::now() + heartbeat.interval, heartbeat.interval);
        loop {
            let msg = tokio::select! {
                msg = rx.recv() => match msg {
                    Some(text) => Message::Text(text),
                    None => break,
                },
                _ = ping.tick() => Message::Ping(Vec::new()),
            };
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let coordinator = state.coordinator().clone();
    coordinator.register(connection_id.clone(), tx).await;

    // any inbound frame, pongs included, proves the peer is alive
    let idle = tokio::time::sleep(heartbeat.timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            msg = receiver.next() => {
                idle.as_mut().reset(Instant::now() + heartbeat.timeout);
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_text(&coordinator, &connection_id, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            _ = &mut send_task => {
                debug!(connection_id = %connection_id, "writer closed");
                break;
            }
            _ = &mut idle => {
                warn!(connection_id = %connection_id, "heartbeat timeout");
                break;
            }
        }
    }

    coordinator.disconnect(&connection_id).await;
    send_task.abort();
    info!(connection_id = %connection_id, "ws disconnected");
}

/// Apply one client text frame. Problems are reported to the sender only.
pub(crate) async fn handle_client_text(
    coordinator: &SessionCoordinator,
    connection_id: &ConnectionId,
    text: &str,
) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Join { data }) => {
            if data.name.trim().is_empty() {
                let err = ServerEvent::error("Name required to join", CODE_INVALID_NAME);
                coordinator.send_to(connection_id, &err).await;
                return;
            }
            coordinator.join(connection_id, &data.name).await;
        }
        Ok(ClientMessage::Ping) => {
            coordinator.send_to(connection_id, &ServerEvent::Pong).await;
        }
        Err(e) => {
            debug!(connection_id = %connection_id, error = %e, "malformed client message");
            let err = ServerEvent::error(format!("Malformed message: {}", e), CODE_MALFORMED);
            coordinator.send_to(connection_id, &err).await;
        }
    }
}
