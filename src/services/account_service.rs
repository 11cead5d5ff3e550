//! Domain service for privileged account mutations.
//!
//! The only legitimate writer of mutable account fields: coin balance,
//! admin flag, display prefix, and the self-service linked-account flags.

use thiserror::Error;

use crate::models::{Prefix, SettingsPatch};

/// Errors specific to account mutation operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Player not found")]
    NotFound,

    /// The caller's own account row does not carry `is_admin`. Every admin
    /// operation re-verifies this server-side instead of trusting the client.
    #[error("Admin privileges required")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for account mutations.
///
/// Admin operations take the caller's account id and re-fetch the caller
/// record to check `is_admin` before any write.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Adds `amount` (> 0) coins to the target's balance.
    async fn credit(
        &self,
        caller_id: &str,
        target_login: &str,
        amount: i64,
    ) -> Result<(), AccountError>;

    /// Subtracts `amount` (> 0) coins from the target's balance, clamping
    /// at zero rather than erroring on insufficient balance.
    async fn debit(
        &self,
        caller_id: &str,
        target_login: &str,
        amount: i64,
    ) -> Result<(), AccountError>;

    /// Grants or revokes the target's admin flag.
    async fn set_admin(
        &self,
        caller_id: &str,
        target_login: &str,
        is_admin: bool,
    ) -> Result<(), AccountError>;

    /// Sets the target's display prefix; `None` clears it.
    async fn set_prefix(
        &self,
        caller_id: &str,
        target_login: &str,
        prefix: Option<Prefix>,
    ) -> Result<(), AccountError>;

    /// Partial update of the caller's own linked-account flags. The one
    /// operation here legitimately invoked without admin rights.
    async fn update_self_settings(
        &self,
        account_id: &str,
        patch: SettingsPatch,
    ) -> Result<(), AccountError>;
}
