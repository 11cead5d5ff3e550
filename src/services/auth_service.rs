//! Domain service for identity: registration, login, and resolving a held
//! token (account id) back to the live account record.

use thiserror::Error;

use crate::models::Account;

/// Minimum login length accepted at registration.
pub const MIN_LOGIN_LEN: usize = 3;

/// Minimum credential length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Errors specific to authentication operations.
///
/// Every validation failure carries a distinct, human-readable reason so the
/// caller can always tell a rejected input from a generic failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No account with that login, register first")]
    NotFound,

    #[error("Wrong password")]
    BadCredential,

    #[error("An account with that login already exists")]
    DuplicateLogin,

    #[error("Login must be at least {MIN_LOGIN_LEN} characters")]
    WeakLogin,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakCredential,

    #[error("Password confirmation does not match")]
    Mismatch,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] when the login is unknown
    /// (case-insensitively) and [`AuthError::BadCredential`] when the
    /// credential does not verify against the stored hash.
    async fn login(&self, login: &str, password: &str) -> Result<Account, AuthError>;

    /// Creates an account, then behaves like a successful login.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateLogin`], [`AuthError::WeakLogin`],
    /// [`AuthError::WeakCredential`] or [`AuthError::Mismatch`] on failed
    /// validation.
    async fn register(
        &self,
        login: &str,
        password: &str,
        confirm: &str,
    ) -> Result<Account, AuthError>;

    /// Re-fetches the live account for a held token. `None` means the
    /// account no longer exists and the caller must discard the token and
    /// fall back to Anonymous.
    async fn resolve(&self, account_id: &str) -> Result<Option<Account>, AuthError>;
}
