//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::{Prefix, SettingsPatch};
use crate::services::account_service::{AccountError, AccountService};

pub struct SeaOrmAccountService {
    store: Store,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Re-fetch the caller and require the admin flag on the live record.
    async fn require_admin(&self, caller_id: &str) -> Result<(), AccountError> {
        let caller = self
            .store
            .get_account_by_id(caller_id)
            .await?
            .ok_or(AccountError::Forbidden)?;

        if !caller.is_admin {
            return Err(AccountError::Forbidden);
        }

        Ok(())
    }
}

fn validate_amount(amount: i64) -> Result<(), AccountError> {
    if amount <= 0 {
        return Err(AccountError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn credit(
        &self,
        caller_id: &str,
        target_login: &str,
        amount: i64,
    ) -> Result<(), AccountError> {
        self.require_admin(caller_id).await?;
        validate_amount(amount)?;

        let updated = self.store.credit_account(target_login, amount).await?;
        if !updated {
            return Err(AccountError::NotFound);
        }

        tracing::info!("Credited {} coins to {}", amount, target_login);
        Ok(())
    }

    async fn debit(
        &self,
        caller_id: &str,
        target_login: &str,
        amount: i64,
    ) -> Result<(), AccountError> {
        self.require_admin(caller_id).await?;
        validate_amount(amount)?;

        let updated = self.store.debit_account(target_login, amount).await?;
        if !updated {
            return Err(AccountError::NotFound);
        }

        tracing::info!("Debited {} coins from {}", amount, target_login);
        Ok(())
    }

    async fn set_admin(
        &self,
        caller_id: &str,
        target_login: &str,
        is_admin: bool,
    ) -> Result<(), AccountError> {
        self.require_admin(caller_id).await?;

        let updated = self.store.set_account_admin(target_login, is_admin).await?;
        if !updated {
            return Err(AccountError::NotFound);
        }

        tracing::info!("Set admin={} for {}", is_admin, target_login);
        Ok(())
    }

    async fn set_prefix(
        &self,
        caller_id: &str,
        target_login: &str,
        prefix: Option<Prefix>,
    ) -> Result<(), AccountError> {
        self.require_admin(caller_id).await?;

        let updated = self.store.set_account_prefix(target_login, prefix).await?;
        if !updated {
            return Err(AccountError::NotFound);
        }

        match prefix {
            Some(p) => tracing::info!("Set prefix {} for {}", p, target_login),
            None => tracing::info!("Cleared prefix for {}", target_login),
        }
        Ok(())
    }

    async fn update_self_settings(
        &self,
        account_id: &str,
        patch: SettingsPatch,
    ) -> Result<(), AccountError> {
        let updated = self.store.update_account_settings(account_id, &patch).await?;
        if !updated {
            return Err(AccountError::NotFound);
        }

        Ok(())
    }
}
