//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::auth_service::{
    AuthError, AuthService, MIN_LOGIN_LEN, MIN_PASSWORD_LEN,
};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

/// True when the error chain bottoms out in a unique-constraint violation,
/// i.e. a racing insert hit the unique index on `login`.
fn is_duplicate_login(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DbErr>().and_then(DbErr::sql_err),
        Some(SqlErr::UniqueConstraintViolation(_))
    )
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, login: &str, password: &str) -> Result<crate::models::Account, AuthError> {
        let account = self
            .store
            .get_account_by_login(login)
            .await?
            .ok_or(AuthError::NotFound)?;

        let is_valid = self.store.verify_account_password(login, password).await?;

        if !is_valid {
            return Err(AuthError::BadCredential);
        }

        Ok(account)
    }

    async fn register(
        &self,
        login: &str,
        password: &str,
        confirm: &str,
    ) -> Result<crate::models::Account, AuthError> {
        if self.store.get_account_by_login(login).await?.is_some() {
            return Err(AuthError::DuplicateLogin);
        }

        if login.chars().count() < MIN_LOGIN_LEN {
            return Err(AuthError::WeakLogin);
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakCredential);
        }

        if password != confirm {
            return Err(AuthError::Mismatch);
        }

        // The unique index on login backstops the existence check above:
        // a racing duplicate insert fails here and is reported as a
        // conflict, so double-submits stay safe to retry.
        let account = self
            .store
            .create_account(login, password, &self.security)
            .await
            .map_err(|e| {
                if is_duplicate_login(&e) {
                    AuthError::DuplicateLogin
                } else {
                    AuthError::Database(e.to_string())
                }
            })?;

        tracing::info!("Registered account: {}", account.login);

        Ok(account)
    }

    async fn resolve(&self, account_id: &str) -> Result<Option<crate::models::Account>, AuthError> {
        let account = self.store.get_account_by_id(account_id).await?;
        Ok(account)
    }
}
