/**
 * Routes Module
 * API route handlers
 */

pub mod admins;
pub mod auth;
pub mod health;
pub mod payments;
pub mod recipes;
pub mod subscribers;
pub mod subscriptions;
pub mod writers;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Error/notice body shared across the API: `{ "msg": "..." }`.
#[derive(Debug, Serialize)]
pub struct MsgResponse {
    pub msg: String,
}

impl MsgResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        MsgResponse { msg: msg.into() }
    }
}

pub(crate) fn msg_response(
    status: StatusCode,
    msg: impl Into<String>,
) -> (StatusCode, Json<MsgResponse>) {
    (status, Json(MsgResponse::new(msg)))
}

/// 503 body used by every handler when the pool is not initialized.
pub(crate) fn db_unavailable() -> (StatusCode, Json<MsgResponse>) {
    msg_response(StatusCode::SERVICE_UNAVAILABLE, "Database not available")
}
