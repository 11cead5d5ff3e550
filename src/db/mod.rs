use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::{Account, Prefix, SettingsPatch};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("::memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    pub async fn get_account_by_login(&self, login: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_login(login).await
    }

    pub async fn get_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        self.account_repo().get_by_id(id).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.account_repo().list_all().await
    }

    pub async fn create_account(
        &self,
        login: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Account> {
        self.account_repo().create(login, password, security).await
    }

    pub async fn verify_account_password(&self, login: &str, password: &str) -> Result<bool> {
        self.account_repo().verify_password(login, password).await
    }

    pub async fn credit_account(&self, login: &str, amount: i64) -> Result<bool> {
        self.account_repo().credit(login, amount).await
    }

    pub async fn debit_account(&self, login: &str, amount: i64) -> Result<bool> {
        self.account_repo().debit(login, amount).await
    }

    pub async fn set_account_admin(&self, login: &str, is_admin: bool) -> Result<bool> {
        self.account_repo().set_admin(login, is_admin).await
    }

    pub async fn set_account_prefix(&self, login: &str, prefix: Option<Prefix>) -> Result<bool> {
        self.account_repo().set_prefix(login, prefix).await
    }

    pub async fn update_account_settings(&self, id: &str, patch: &SettingsPatch) -> Result<bool> {
        self.account_repo().update_settings(id, patch).await
    }
}
