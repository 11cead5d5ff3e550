use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{AccountDto, ApiError, ApiResponse, AppState, CurrentAccountDto};
use crate::models::Account;

/// Session key holding the authenticated account id. The session cookie is
/// the single canonical identity reference; nothing else is handed to the
/// client.
pub const SESSION_ACCOUNT_KEY: &str = "account_id";

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
    pub confirm: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create an account, then behave like a successful login.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    if payload.login.is_empty() {
        return Err(ApiError::validation("Login is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let account = state
        .auth_service
        .register(&payload.login, &payload.password, &payload.confirm)
        .await?;

    establish_session(&session, &state, &account).await?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}

/// POST /auth/login
/// Authenticate with login and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AccountDto>>, ApiError> {
    if payload.login.is_empty() {
        return Err(ApiError::validation("Login is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let account = state
        .auth_service
        .login(&payload.login, &payload.password)
        .await?;

    establish_session(&session, &state, &account).await?;

    Ok(Json(ApiResponse::success(AccountDto::from(account))))
}

/// POST /auth/logout
/// Discard the session. Idempotent: logging out while Anonymous is fine.
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
/// Resolve the session back to the live account. Anonymous is a normal
/// answer (account: null), never an error; a session whose account no
/// longer exists is flushed and reported as Anonymous.
pub async fn get_current_account(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<CurrentAccountDto>>, ApiError> {
    let Some(account_id) = session_account_id(&session).await? else {
        return Ok(Json(ApiResponse::success(CurrentAccountDto {
            account: None,
        })));
    };

    let account = state.auth_service.resolve(&account_id).await?;

    if account.is_none() {
        let _ = session.flush().await;
    }

    Ok(Json(ApiResponse::success(CurrentAccountDto {
        account: account.map(AccountDto::from),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// Bind the session to the account and refresh the roster immediately so
/// the caller's view reflects the new or changed account before the next
/// poll tick.
async fn establish_session(
    session: &Session,
    state: &AppState,
    account: &Account,
) -> Result<(), ApiError> {
    session
        .insert(SESSION_ACCOUNT_KEY, &account.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    state.roster_sync.refresh_now().await;

    tracing::Span::current().record("user_id", account.login.as_str());
    Ok(())
}

/// Read the account id from the session, `None` when Anonymous.
pub async fn session_account_id(session: &Session) -> Result<Option<String>, ApiError> {
    session
        .get::<String>(SESSION_ACCOUNT_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

/// Account id from the session, erroring when Anonymous.
pub async fn require_account_id(session: &Session) -> Result<String, ApiError> {
    session_account_id(session)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}
