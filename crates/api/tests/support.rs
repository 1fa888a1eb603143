//! In-memory port implementations for exercising the application context

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tollgate_core::ports::{GameConnector, GameStore, SocialApiClient};
use tollgate_domain::{
    Config, GangRecord, InventoryItem, LeaderboardEntry, Post, PrisonRecord, Result,
    SocialAccount, TollgateError,
};

/// Social API that answers every call immediately
///
/// A revoked client fails every probe with an auth error.
#[derive(Default)]
pub struct StaticSocialClient {
    pub probes: AtomicUsize,
    revoked: AtomicBool,
}

impl StaticSocialClient {
    pub fn revoked() -> Self {
        Self { revoked: AtomicBool::new(true), ..Self::default() }
    }
}

#[async_trait]
impl SocialApiClient for StaticSocialClient {
    async fn lookup_account(&self, handle: &str) -> Result<SocialAccount> {
        Ok(SocialAccount {
            id: format!("id-{handle}"),
            handle: handle.to_string(),
            display_name: handle.to_uppercase(),
            follower_count: 42,
        })
    }

    async fn fetch_posts(&self, _user_id: &str, _limit: u32) -> Result<Vec<Post>> {
        Ok(Vec::new())
    }

    async fn probe(&self) -> Result<String> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.revoked.load(Ordering::SeqCst) {
            return Err(TollgateError::Auth("revoked".into()));
        }
        Ok("ok (@tollgate_bot)".to_string())
    }
}

/// Points-only game store kept in memory
#[derive(Default)]
pub struct MemoryStore {
    points: Mutex<HashMap<String, i64>>,
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get_points(&self, user_id: &str) -> Result<i64> {
        Ok(self.points.lock().unwrap().get(user_id).copied().unwrap_or(0))
    }

    async fn add_points(&self, user_id: &str, amount: i64) -> Result<()> {
        *self.points.lock().unwrap().entry(user_id.to_string()).or_default() += amount;
        Ok(())
    }

    async fn leaderboard(&self, _limit: u32) -> Result<Vec<LeaderboardEntry>> {
        Ok(Vec::new())
    }

    async fn get_inventory(&self, _user_id: &str) -> Result<Vec<InventoryItem>> {
        Ok(Vec::new())
    }

    async fn add_item(&self, _user_id: &str, _item_name: &str, _quantity: i32) -> Result<()> {
        Ok(())
    }

    async fn remove_item(&self, _user_id: &str, _item_name: &str, _quantity: i32) -> Result<bool> {
        Ok(false)
    }

    async fn get_prison_record(&self, _user_id: &str) -> Result<Option<PrisonRecord>> {
        Ok(None)
    }

    async fn set_prison_record(&self, _record: &PrisonRecord) -> Result<()> {
        Ok(())
    }

    async fn get_gang(&self, _name: &str) -> Result<Option<GangRecord>> {
        Ok(None)
    }

    async fn create_gang(&self, _record: &GangRecord) -> Result<bool> {
        Ok(true)
    }
}

/// Connector whose reachability can be toggled; hands out one shared store
pub struct MemoryConnector {
    pub reachable: AtomicBool,
    pub connects: AtomicUsize,
    store: Arc<MemoryStore>,
}

impl MemoryConnector {
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: AtomicBool::new(reachable),
            connects: AtomicUsize::new(0),
            store: Arc::new(MemoryStore::default()),
        }
    }
}

#[async_trait]
impl GameConnector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn GameStore>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            Ok(Arc::clone(&self.store) as Arc<dyn GameStore>)
        } else {
            Err(TollgateError::Connection("connection refused".into()))
        }
    }
}

/// Defaults with a bearer token so the config validates as a whole
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.social.bearer_token = Some("test-token".into());
    config
}
