//! WebSocket endpoint for rewrite sessions.
//!
//! One connection can carry any number of sequential edit sessions: the
//! client sends an `edit` message, the server streams the session's events
//! back as JSON text frames, and the connection stays open for the next
//! request. Request-level validation failures are reported as an `error`
//! frame without closing the connection.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use draftwork_agent::{edit_stream, AgentError, EditEvent, EditRequest};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::state::AppState;

/// Message from client to server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a rewrite session.
    Edit { request: EditRequest },
    /// Ping for keepalive.
    Ping,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Edit { request }) => {
                    if run_session(&mut sender, &state, request).await.is_err() {
                        break;
                    }
                }
                Ok(ClientMessage::Ping) => {
                    if send_json(&mut sender, &serde_json::json!({ "type": "pong" }))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Invalid client message: {}", e);
                    let event = EditEvent::Error {
                        message: format!("Invalid message: {e}"),
                    };
                    if send_json(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
            },
            Ok(Message::Ping(data)) => {
                if sender.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Err(e) => {
                warn!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    debug!("WebSocket connection closed");
}

/// Run one edit session and forward its events. Returns `Err(())` when the
/// socket is gone and the connection loop should stop.
async fn run_session(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    state: &AppState,
    request: EditRequest,
) -> Result<(), ()> {
    let provider = draftwork_provider::from_config(&state.provider_config);

    let mut events = match edit_stream(request, provider, state.max_selection_chars) {
        Ok(events) => events,
        Err(AgentError::InvalidRequest(message)) => {
            // Rejected before any provider call; the connection survives.
            return send_json(sender, &EditEvent::Error { message }).await;
        }
    };

    while let Some(event) = events.next().await {
        send_json(sender, &event).await?;
    }
    Ok(())
}

async fn send_json<T: serde::Serialize>(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), ()> {
    match serde_json::to_string(value) {
        Ok(json) => sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|_| ()),
        Err(e) => {
            warn!("Failed to serialize frame: {}", e);
            Ok(())
        }
    }
}
