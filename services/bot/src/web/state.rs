//! services/bot/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use shift_log_core::ConversationEngine;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Per-user conversation sessions live inside the engine, keyed by username,
/// so REST calls and WebSocket frames from the same user drive one session.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
    pub config: Arc<Config>,
}
