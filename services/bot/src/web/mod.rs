pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the handlers to make them easily accessible
// to the binary that will build the web server router.
pub use middleware::require_caller;
pub use rest::{health_handler, post_message_handler};
pub use ws_handler::ws_handler;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// The chat routes plus the health probe, without docs or CORS.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Chat routes (bearer token and caller identity required)
    let chat_routes = Router::new()
        .route("/messages", post(post_message_handler))
        .route("/ws", get(ws_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_caller,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(chat_routes)
        .with_state(app_state)
}
