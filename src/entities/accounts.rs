use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// UUIDv4, assigned at creation, immutable.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Canonical lower-cased login, immutable after creation.
    #[sea_orm(unique)]
    pub login: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Coin balance, never negative (debits clamp at zero).
    pub coins: i64,

    /// Cosmetic badge id from the fixed prefix set, NULL = none.
    pub prefix: Option<String>,

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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
