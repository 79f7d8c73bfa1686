//! services/bot/src/web/ws_handler.rs
//!
//! The chat loop for a WebSocket connection: every client `message` frame is
//! one conversation turn, answered with one `reply` frame.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{SinkExt, StreamExt};
use shift_log_core::Caller;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, caller))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, caller: Caller) {
    info!("New WebSocket connection established for user: {}", caller.username);

    let (mut sender, mut receiver) = socket.split();

    while let Some(frame) = receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                warn!("WebSocket receive failed: {}", e);
                break;
            }
        };

        let outbound = match msg {
            Message::Text(text) => handle_text_frame(text.as_str(), &app_state, &caller).await,
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            _ => continue,
        };

        let json = match serde_json::to_string(&outbound) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize server message: {}", e);
                break;
            }
        };
        if sender.send(Message::Text(json.into())).await.is_err() {
            error!("Failed to send reply to {}", caller.username);
            break;
        }
    }

    info!("WebSocket connection closed for user: {}", caller.username);
}

/// Runs one turn for a client text frame.
async fn handle_text_frame(text: &str, app_state: &Arc<AppState>, caller: &Caller) -> ServerMessage {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Message { text }) => {
            let turn = app_state.engine.handle(caller, &text).await;
            ServerMessage::Reply(turn.into())
        }
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            ServerMessage::Error {
                message: format!("Unrecognised frame: {}", e),
            }
        }
    }
}
