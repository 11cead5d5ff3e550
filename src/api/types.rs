use serde::Serialize;

use crate::models::{Account, Prefix};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Account as exposed over HTTP. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct AccountDto {
    pub id: String,
    pub login: String,
    pub coins: i64,
    pub prefix: Option<Prefix>,
    pub is_admin: bool,
    pub played_hours: i64,
    pub kills: i64,
    pub deaths: i64,
    pub wins: i64,
    pub two_factor_enabled: bool,
    pub telegram_linked: bool,
    pub discord_linked: bool,
    pub created_at: String,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            login: account.login,
            coins: account.coins,
            prefix: account.prefix,
            is_admin: account.is_admin,
            played_hours: account.played_hours,
            kills: account.kills,
            deaths: account.deaths,
            wins: account.wins,
            two_factor_enabled: account.two_factor_enabled,
            telegram_linked: account.telegram_linked,
            discord_linked: account.discord_linked,
            created_at: account.created_at,
        }
    }
}

/// `GET /api/auth/me` payload. `account` is null when Anonymous, which is
/// a normal answer rather than an error.
#[derive(Debug, Serialize)]
pub struct CurrentAccountDto {
    pub account: Option<AccountDto>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub db_ready: bool,
    pub total_accounts: usize,
    pub admin_accounts: usize,
    pub sync_running: bool,
    pub last_sync: Option<String>,
}
