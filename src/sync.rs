//! Presence/sync loop: the polling process that keeps a client's cached
//! view of the account roster (and its own record) converged with the
//! store. There is no push channel, so the poll interval is the upper
//! bound on how stale any cached copy can get.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tracing::{debug, info, warn};

use crate::db::Store;
use crate::models::Account;

#[derive(Clone)]
pub struct RosterSync {
    store: Store,
    poll_interval: Duration,
    running: Arc<RwLock<bool>>,
    /// Held token: the account id of the authenticated holder, if any.
    token: Arc<RwLock<Option<String>>>,
    roster: Arc<RwLock<Vec<Account>>>,
    current: Arc<RwLock<Option<Account>>>,
    last_refresh: Arc<RwLock<Option<chrono::DateTime<chrono::Utc>>>>,
}

impl RosterSync {
    #[must_use]
    pub fn new(store: Store, poll_interval_seconds: u64) -> Self {
        Self {
            store,
            poll_interval: Duration::from_secs(poll_interval_seconds),
            running: Arc::new(RwLock::new(false)),
            token: Arc::new(RwLock::new(None)),
            roster: Arc::new(RwLock::new(Vec::new())),
            current: Arc::new(RwLock::new(None)),
            last_refresh: Arc::new(RwLock::new(None)),
        }
    }

    /// Attach a persisted token. The next refresh resolves it; an id that
    /// no longer matches an account is discarded and the holder falls back
    /// to Anonymous.
    pub async fn attach(&self, account_id: impl Into<String>) {
        *self.token.write().await = Some(account_id.into());
    }

    /// Discard the held token (logout). Idempotent.
    pub async fn detach(&self) {
        *self.token.write().await = None;
        *self.current.write().await = None;
    }

    /// Run the loop until stopped: one cold-start refresh, then a full
    /// roster + own-record refetch every poll interval. Never blocks
    /// mutations; a failed tick keeps the previous cache and retries on
    /// the next one.
    pub async fn start(&self) {
        *self.running.write().await = true;
        info!(
            "Starting roster sync loop (every {}s)",
            self.poll_interval.as_secs()
        );

        self.refresh_now().await;

        let mut ticker = interval(self.poll_interval);
        // the first tick completes immediately; cold start already ran
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if !*self.running.read().await {
                break;
            }
            self.refresh_now().await;
        }

        info!("Roster sync loop stopped");
    }

    pub async fn stop(&self) {
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// One full refresh: re-fetch the roster and, if a token is attached,
    /// re-resolve the holder's own account, replacing cached copies in
    /// place. Also invoked directly after a successful login/registration
    /// so the caller's view reflects the change before the next tick.
    pub async fn refresh_now(&self) {
        match self.store.list_accounts().await {
            Ok(accounts) => {
                debug!("Roster refreshed: {} accounts", accounts.len());
                *self.roster.write().await = accounts;
                *self.last_refresh.write().await = Some(chrono::Utc::now());
            }
            Err(e) => {
                warn!("Roster refresh failed: {}", e);
            }
        }

        let token = self.token.read().await.clone();
        if let Some(account_id) = token {
            match self.store.get_account_by_id(&account_id).await {
                Ok(Some(account)) => {
                    *self.current.write().await = Some(account);
                }
                Ok(None) => {
                    // Account gone from the store: discard the token and
                    // fall back to Anonymous.
                    warn!("Held token no longer resolves, detaching");
                    self.detach().await;
                }
                Err(e) => {
                    warn!("Own-account refresh failed: {}", e);
                }
            }
        }
    }

    /// Cached roster snapshot (at most one poll interval stale).
    pub async fn roster(&self) -> Vec<Account> {
        self.roster.read().await.clone()
    }

    /// Cached own account, `None` when Anonymous.
    pub async fn current(&self) -> Option<Account> {
        self.current.read().await.clone()
    }

    pub async fn last_refresh(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        *self.last_refresh.read().await
    }
}
