//! services/bot/src/web/middleware.rs
//!
//! Caller authentication middleware for the chat routes.

use crate::web::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use shift_log_core::Caller;
use std::sync::Arc;
use tracing::warn;

pub const USERNAME_HEADER: &str = "x-username";
pub const DISPLAY_NAME_HEADER: &str = "x-display-name";

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Compares without short-circuiting on the first differing byte.
fn token_matches(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Middleware that authenticates the gateway client and identifies the caller.
///
/// The request must carry `Authorization: Bearer <GATEWAY_TOKEN>`; only then is
/// the `x-username` header trusted and a `Caller` inserted into the request
/// extensions. Whether that user may use the bot is decided by the
/// conversation itself on `/start`.
pub async fn require_caller(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Validate the bearer token
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| {
            warn!("Request without bearer token rejected");
            StatusCode::UNAUTHORIZED
        })?;
    if !token_matches(token, &state.config.gateway_token) {
        warn!("Request with invalid bearer token rejected");
        return Err(StatusCode::UNAUTHORIZED);
    }

    // 2. Extract the username header
    let username = header_value(req.headers(), USERNAME_HEADER).ok_or_else(|| {
        warn!("Request without {} header rejected", USERNAME_HEADER);
        StatusCode::UNAUTHORIZED
    })?;

    // 3. Build the caller, with an optional display name
    let mut caller = Caller::new(username.trim_start_matches('@'));
    if let Some(display_name) = header_value(req.headers(), DISPLAY_NAME_HEADER) {
        caller = caller.with_display_name(display_name);
    }

    // 4. Insert the caller into request extensions
    req.extensions_mut().insert(caller);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
