use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let accounts = state
        .store
        .list_accounts()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let admin_accounts = accounts.iter().filter(|a| a.is_admin).count();
    let db_ready = state.store.ping().await.is_ok();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        db_ready,
        total_accounts: accounts.len(),
        admin_accounts,
        sync_running: state.roster_sync.is_running().await,
        last_sync: state.roster_sync.last_refresh().await.map(|t| t.to_rfc3339()),
    })))
}
