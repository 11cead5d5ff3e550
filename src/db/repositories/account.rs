use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::accounts;
use crate::models::{Account, Prefix, SettingsPatch};

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get an account by login. The input is lower-cased before comparison;
    /// the stored login is always the canonical lower-cased form.
    pub async fn get_by_login(&self, login: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Login.eq(login.to_lowercase()))
            .one(&self.conn)
            .await
            .context("Failed to query account by login")?;

        Ok(account.map(Account::from))
    }

    /// Get an account by id
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Account>> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account by id")?;

        Ok(account.map(Account::from))
    }

    /// Full roster, newest accounts first.
    pub async fn list_all(&self) -> Result<Vec<Account>> {
        let rows = accounts::Entity::find()
            .order_by_desc(accounts::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list accounts")?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    /// Insert a new account with a hashed credential and zeroed state.
    ///
    /// The login is stored lower-cased. Callers check for an existing login
    /// first; the unique index on `login` still rejects a racing duplicate
    /// insert, so a double-submit is always surfaced as a conflict.
    /// Note: Argon2 hashing runs in `spawn_blocking` because it is
    /// CPU-intensive and would stall the async runtime if run inline.
    pub async fn create(
        &self,
        login: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<Account> {
        let password = password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let model = accounts::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            login: Set(login.to_lowercase()),
            password_hash: Set(password_hash),
            coins: Set(0),
            prefix: Set(None),
            is_admin: Set(false),
            played_hours: Set(0),
            kills: Set(0),
            deaths: Set(0),
            wins: Set(0),
            two_factor_enabled: Set(false),
            telegram_linked: Set(false),
            discord_linked: Set(false),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert account")?;

        Ok(Account::from(inserted))
    }

    /// Verify a credential against the stored Argon2 hash. Returns false
    /// both for a wrong credential and for an unknown login.
    pub async fn verify_password(&self, login: &str, password: &str) -> Result<bool> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Login.eq(login.to_lowercase()))
            .one(&self.conn)
            .await
            .context("Failed to query account for password verification")?;

        let Some(account) = account else {
            return Ok(false);
        };

        let password_hash = account.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// Atomically add `amount` to the target's balance.
    /// Returns false when no account matches the login.
    pub async fn credit(&self, login: &str, amount: i64) -> Result<bool> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Coins,
                Expr::col(accounts::Column::Coins).add(amount),
            )
            .filter(accounts::Column::Login.eq(login.to_lowercase()))
            .exec(&self.conn)
            .await
            .context("Failed to credit account")?;

        Ok(result.rows_affected > 0)
    }

    /// Atomically subtract `amount` from the target's balance, clamping at
    /// zero. A single UPDATE keeps concurrent coin mutations from losing
    /// each other's writes.
    pub async fn debit(&self, login: &str, amount: i64) -> Result<bool> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Coins,
                Expr::cust_with_values("MAX(coins - ?, 0)", [amount]),
            )
            .filter(accounts::Column::Login.eq(login.to_lowercase()))
            .exec(&self.conn)
            .await
            .context("Failed to debit account")?;

        Ok(result.rows_affected > 0)
    }

    /// Grant or revoke the admin flag. Returns false when no account matches.
    pub async fn set_admin(&self, login: &str, is_admin: bool) -> Result<bool> {
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::IsAdmin, Expr::value(is_admin))
            .filter(accounts::Column::Login.eq(login.to_lowercase()))
            .exec(&self.conn)
            .await
            .context("Failed to update admin flag")?;

        Ok(result.rows_affected > 0)
    }

    /// Set or clear the display prefix. Returns false when no account matches.
    pub async fn set_prefix(&self, login: &str, prefix: Option<Prefix>) -> Result<bool> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Prefix,
                Expr::value(prefix.map(|p| p.as_str().to_string())),
            )
            .filter(accounts::Column::Login.eq(login.to_lowercase()))
            .exec(&self.conn)
            .await
            .context("Failed to update prefix")?;

        Ok(result.rows_affected > 0)
    }

    /// Field-level merge of self-service flags; fields left `None` in the
    /// patch keep their stored value. `id`, `login` and `created_at` are
    /// never touched. Returns false when no account matches.
    pub async fn update_settings(&self, id: &str, patch: &SettingsPatch) -> Result<bool> {
        if patch.is_empty() {
            // Nothing to merge; still report whether the account exists.
            return Ok(self.get_by_id(id).await?.is_some());
        }

        let Some(existing) = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for settings update")?
        else {
            return Ok(false);
        };

        let mut active: accounts::ActiveModel = existing.into();
        if let Some(two_factor) = patch.two_factor_enabled {
            active.two_factor_enabled = Set(two_factor);
        }
        if let Some(telegram) = patch.telegram_linked {
            active.telegram_linked = Set(telegram);
        }
        if let Some(discord) = patch.discord_linked {
            active.discord_linked = Set(discord);
        }

        active
            .update(&self.conn)
            .await
            .context("Failed to update account settings")?;

        Ok(true)
    }
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
