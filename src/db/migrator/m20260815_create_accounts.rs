use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap admin login seeded with the accounts table. Without it no
/// caller would ever hold the `is_admin` flag needed to grant privileges.
const BOOTSTRAP_LOGIN: &str = "admin";
const BOOTSTRAP_PASSWORD: &[u8] = b"password";

/// Hash the bootstrap password using Argon2id
fn hash_bootstrap_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(BOOTSTRAP_PASSWORD, &salt)
        .expect("Failed to hash bootstrap password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Accounts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_bootstrap_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Accounts)
            .columns([
                crate::entities::accounts::Column::Id,
                crate::entities::accounts::Column::Login,
                crate::entities::accounts::Column::PasswordHash,
                crate::entities::accounts::Column::Coins,
                crate::entities::accounts::Column::IsAdmin,
                crate::entities::accounts::Column::PlayedHours,
                crate::entities::accounts::Column::Kills,
                crate::entities::accounts::Column::Deaths,
                crate::entities::accounts::Column::Wins,
                crate::entities::accounts::Column::TwoFactorEnabled,
                crate::entities::accounts::Column::TelegramLinked,
                crate::entities::accounts::Column::DiscordLinked,
                crate::entities::accounts::Column::CreatedAt,
            ])
            .values_panic([
                uuid::Uuid::new_v4().to_string().into(),
                BOOTSTRAP_LOGIN.into(),
                password_hash.into(),
                0i64.into(),
                true.into(),
                0i64.into(),
                0i64.into(),
                0i64.into(),
                0i64.into(),
                false.into(),
                false.into(),
                false.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts).to_owned())
            .await?;

        Ok(())
    }
}
