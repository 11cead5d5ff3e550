use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::require_account_id;
use super::{AccountDto, ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::SettingsPatch;

/// GET /accounts
/// The full roster, newest accounts first, read fresh from the store so a
/// completed mutation is visible to the very next call.
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<AccountDto>>>, ApiError> {
    let accounts = state
        .store
        .list_accounts()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        accounts.into_iter().map(AccountDto::from).collect(),
    )))
}

/// PUT /settings
/// Partial update of the caller's own linked-account flags. Fields left
/// out of the body keep their stored value.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let account_id = require_account_id(&session).await?;

    state
        .account_service
        .update_self_settings(&account_id, patch)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Settings updated".to_string(),
    })))
}
