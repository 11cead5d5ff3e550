//! Admin mutation endpoints. Each handler passes the session holder's
//! account id to the mutation service, which re-verifies `is_admin` on the
//! live record before writing — a client-supplied flag is never trusted.

use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_account_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::Prefix;

#[derive(Deserialize)]
pub struct CoinsRequest {
    pub login: String,
    pub amount: i64,
}

#[derive(Deserialize)]
pub struct RoleRequest {
    pub login: String,
    pub is_admin: bool,
}

#[derive(Deserialize)]
pub struct PrefixRequest {
    pub login: String,
    /// Badge id from the fixed prefix set; null clears the prefix.
    pub prefix: Option<String>,
}

/// POST /admin/coins/credit
pub async fn credit_coins(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CoinsRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let caller_id = require_account_id(&session).await?;

    state
        .account_service
        .credit(&caller_id, &payload.login, payload.amount)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Gave {} coins to {}", payload.amount, payload.login),
    })))
}

/// POST /admin/coins/debit
/// Clamps at zero rather than erroring on insufficient balance.
pub async fn debit_coins(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CoinsRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let caller_id = require_account_id(&session).await?;

    state
        .account_service
        .debit(&caller_id, &payload.login, payload.amount)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Took {} coins from {}", payload.amount, payload.login),
    })))
}

/// PUT /admin/role
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let caller_id = require_account_id(&session).await?;

    state
        .account_service
        .set_admin(&caller_id, &payload.login, payload.is_admin)
        .await?;

    let message = if payload.is_admin {
        format!("Granted admin to {}", payload.login)
    } else {
        format!("Revoked admin from {}", payload.login)
    };

    Ok(Json(ApiResponse::success(MessageResponse { message })))
}

/// PUT /admin/prefix
pub async fn set_prefix(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<PrefixRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let caller_id = require_account_id(&session).await?;

    let prefix = match payload.prefix.as_deref() {
        Some(raw) => Some(
            raw.parse::<Prefix>()
                .map_err(|e| ApiError::validation(e.to_string()))?,
        ),
        None => None,
    };

    state
        .account_service
        .set_prefix(&caller_id, &payload.login, prefix)
        .await?;

    let message = match prefix {
        Some(p) => format!("Set prefix {} for {}", p, payload.login),
        None => format!("Cleared prefix for {}", payload.login),
    };

    Ok(Json(ApiResponse::success(MessageResponse { message })))
}
