//! services/bot/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    protocol::{MessageRequest, ReplyPayload},
    state::AppState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use shift_log_core::Caller;
use std::sync::Arc;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        post_message_handler,
        health_handler,
    ),
    components(
        schemas(MessageRequest, ReplyPayload)
    ),
    tags(
        (name = "Shift Log Bot API", description = "Chat endpoints for logging shifts and requesting payroll summaries.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Send one chat message and receive the bot's reply.
///
/// Text starting with `/` is a command (`/start`, `/add`, `/edit`, `/summary`,
/// `/cancel`); anything else answers the bot's current question.
#[utoipa::path(
    post,
    path = "/messages",
    request_body = MessageRequest,
    responses(
        (status = 200, description = "The bot's reply", body = ReplyPayload),
        (status = 400, description = "Empty message"),
        (status = 401, description = "Missing or invalid bearer token, or missing x-username header")
    ),
    params(
        ("authorization" = String, Header, description = "`Bearer <gateway token>`."),
        ("x-username" = String, Header, description = "The sender's username."),
        ("x-display-name" = Option<String>, Header, description = "Name used in payroll summaries.")
    )
)]
pub async fn post_message_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<MessageRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message text is empty".to_string()));
    }

    let turn = app_state.engine.handle(&caller, &req.text).await;
    Ok(Json(ReplyPayload::from(turn)))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running")
    )
)]
pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}
