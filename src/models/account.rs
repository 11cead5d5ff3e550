//! Domain account record and the fixed prefix (badge) set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::accounts;

/// Account data as seen by the rest of the system (without the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
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

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            login: model.login,
            coins: model.coins,
            // A row can only hold a value written through Prefix, so an
            // unparseable string is treated as no prefix rather than an error.
            prefix: model.prefix.and_then(|p| p.parse().ok()),
            is_admin: model.is_admin,
            played_hours: model.played_hours,
            kills: model.kills,
            deaths: model.deaths,
            wins: model.wins,
            two_factor_enabled: model.two_factor_enabled,
            telegram_linked: model.telegram_linked,
            discord_linked: model.discord_linked,
            created_at: model.created_at,
        }
    }
}

/// The fixed enumerated set of display badges an account can wear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prefix {
    Vip,
    Premium,
    Legend,
    Mvp,
    Elite,
    Champion,
    God,
}

impl Prefix {
    pub const ALL: [Self; 7] = [
        Self::Vip,
        Self::Premium,
        Self::Legend,
        Self::Mvp,
        Self::Elite,
        Self::Champion,
        Self::God,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vip => "vip",
            Self::Premium => "premium",
            Self::Legend => "legend",
            Self::Mvp => "mvp",
            Self::Elite => "elite",
            Self::Champion => "champion",
            Self::God => "god",
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown prefix: {0}")]
pub struct UnknownPrefix(pub String);

impl FromStr for Prefix {
    type Err = UnknownPrefix;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPrefix(s.to_string()))
    }
}

/// Partial update of self-service account flags. `None` leaves the
/// corresponding field unchanged.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SettingsPatch {
    pub two_factor_enabled: Option<bool>,
    pub telegram_linked: Option<bool>,
    pub discord_linked: Option<bool>,
}

impl SettingsPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.two_factor_enabled.is_none()
            && self.telegram_linked.is_none()
            && self.discord_linked.is_none()
    }
}
