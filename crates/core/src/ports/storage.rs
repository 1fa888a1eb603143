//! Port interfaces for the game database

use std::sync::Arc;

use async_trait::async_trait;
use tollgate_domain::{GangRecord, InventoryItem, LeaderboardEntry, PrisonRecord, Result};

/// A live connection to the game database
///
/// Connectivity problems surface as `TollgateError::Connection` or
/// `TollgateError::Timeout`; query problems on a healthy connection as
/// `TollgateError::Database`.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Lightweight round trip used as a liveness probe
    async fn ping(&self) -> Result<()>;

    async fn get_points(&self, user_id: &str) -> Result<i64>;

    async fn add_points(&self, user_id: &str, amount: i64) -> Result<()>;

    /// Highest balances first
    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>>;

    async fn get_inventory(&self, user_id: &str) -> Result<Vec<InventoryItem>>;

    async fn add_item(&self, user_id: &str, item_name: &str, quantity: i32) -> Result<()>;

    /// `false` when the user holds fewer than `quantity`
    async fn remove_item(&self, user_id: &str, item_name: &str, quantity: i32) -> Result<bool>;

    async fn get_prison_record(&self, user_id: &str) -> Result<Option<PrisonRecord>>;

    async fn set_prison_record(&self, record: &PrisonRecord) -> Result<()>;

    async fn get_gang(&self, name: &str) -> Result<Option<GangRecord>>;

    /// `false` when a gang with that name already exists
    async fn create_gang(&self, record: &GangRecord) -> Result<bool>;
}

/// Establishes fresh connections for the supervisor
#[async_trait]
pub trait GameConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn GameStore>>;
}
