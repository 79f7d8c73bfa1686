//! services/bot/src/web/protocol.rs
//!
//! Defines the chat message protocol between a client and the bot, shared by
//! the REST endpoint and the WebSocket connection.

use serde::{Deserialize, Serialize};
use shift_log_core::{ReplyMarkup, Turn};
use utoipa::ToSchema;

//=========================================================================================
// Messages Sent FROM the Client TO the Server
//=========================================================================================

/// Body of `POST /messages`.
#[derive(Deserialize, Debug, ToSchema)]
pub struct MessageRequest {
    /// Free text or a `/command`.
    pub text: String,
}

/// Represents the structured text frames a client can send over the WebSocket.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// One chat message, text or `/command`.
    Message { text: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client
//=========================================================================================

/// The bot's answer to one message.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ReplyPayload {
    pub text: String,
    /// Choice buttons in rows, when the client should offer them.
    pub keyboard: Option<Vec<Vec<String>>>,
    /// The client should hide any keyboard it is showing.
    pub remove_keyboard: bool,
    /// Conversation state after this turn.
    pub state: String,
}

impl From<Turn> for ReplyPayload {
    fn from(turn: Turn) -> Self {
        let (keyboard, remove_keyboard) = match turn.reply.markup {
            ReplyMarkup::None => (None, false),
            ReplyMarkup::Keyboard(k) => (Some(k.rows().to_vec()), false),
            ReplyMarkup::RemoveKeyboard => (None, true),
        };
        Self {
            text: turn.reply.text,
            keyboard,
            remove_keyboard,
            state: turn.state.name().to_string(),
        }
    }
}

/// Represents the structured text frames the server sends over the WebSocket.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The reply to a client `message` frame.
    Reply(ReplyPayload),

    /// The client's frame could not be understood.
    Error { message: String },
}
