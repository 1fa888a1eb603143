//! Data-access facade for game logic
//!
//! Every method runs through the [`RetryExecutor`] and therefore always
//! returns a value: the real one, or the degraded default for its category.

use std::sync::Arc;

use tollgate_domain::{
    ConnectionReport, GangRecord, InventoryItem, LeaderboardEntry, PrisonRecord,
};
use tracing::debug;

use super::degraded::DegradedModeProvider;
use super::executor::RetryExecutor;
use super::supervisor::ConnectionSupervisor;

pub struct ResilientStore {
    executor: RetryExecutor,
}

impl ResilientStore {
    pub fn new(executor: RetryExecutor) -> Self {
        Self { executor }
    }

    pub fn supervisor(&self) -> &Arc<ConnectionSupervisor> {
        self.executor.supervisor()
    }

    pub fn degraded(&self) -> &Arc<DegradedModeProvider> {
        self.executor.degraded()
    }

    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    pub async fn get_user_points(&self, user_id: &str) -> i64 {
        self.executor
            .execute("get_user_points", |store| {
                let user_id = user_id.to_string();
                async move { store.get_points(&user_id).await }
            })
            .await
    }

    pub async fn add_points(&self, user_id: &str, amount: i64) -> bool {
        self.executor
            .execute("add_points", |store| {
                let user_id = user_id.to_string();
                async move { store.add_points(&user_id, amount).await.map(|()| true) }
            })
            .await
    }

    pub async fn get_leaderboard(&self, limit: u32) -> Vec<LeaderboardEntry> {
        self.executor
            .execute("get_leaderboard", |store| async move { store.leaderboard(limit).await })
            .await
    }

    pub async fn get_inventory(&self, user_id: &str) -> Vec<InventoryItem> {
        self.executor
            .execute("get_inventory", |store| {
                let user_id = user_id.to_string();
                async move { store.get_inventory(&user_id).await }
            })
            .await
    }

    /// A non-positive `quantity` is refused without touching the database
    pub async fn add_item(&self, user_id: &str, item_name: &str, quantity: i32) -> bool {
        if let Err(e) = InventoryItem::check_amount(quantity) {
            debug!(error = %e, "add_item rejected");
            return false;
        }
        self.executor
            .execute("add_item", |store| {
                let (user_id, item_name) = (user_id.to_string(), item_name.to_string());
                async move { store.add_item(&user_id, &item_name, quantity).await.map(|()| true) }
            })
            .await
    }

    /// A non-positive `quantity` is refused without touching the database
    pub async fn remove_item(&self, user_id: &str, item_name: &str, quantity: i32) -> bool {
        if let Err(e) = InventoryItem::check_amount(quantity) {
            debug!(error = %e, "remove_item rejected");
            return false;
        }
        self.executor
            .execute("remove_item", |store| {
                let (user_id, item_name) = (user_id.to_string(), item_name.to_string());
                async move { store.remove_item(&user_id, &item_name, quantity).await }
            })
            .await
    }

    pub async fn get_prison_record(&self, user_id: &str) -> Option<PrisonRecord> {
        self.executor
            .execute("get_prison_record", |store| {
                let user_id = user_id.to_string();
                async move { store.get_prison_record(&user_id).await }
            })
            .await
    }

    pub async fn set_prison_record(&self, record: &PrisonRecord) -> bool {
        self.executor
            .execute("set_prison_record", |store| {
                let record = record.clone();
                async move { store.set_prison_record(&record).await.map(|()| true) }
            })
            .await
    }

    pub async fn get_gang(&self, name: &str) -> Option<GangRecord> {
        self.executor
            .execute("get_gang", |store| {
                let name = name.to_string();
                async move { store.get_gang(&name).await }
            })
            .await
    }

    pub async fn create_gang(&self, record: &GangRecord) -> bool {
        self.executor
            .execute("create_gang", |store| {
                let record = record.clone();
                async move { store.create_gang(&record).await }
            })
            .await
    }

    /// Connection telemetry for health reporting
    pub fn get_connection_status(&self) -> ConnectionReport {
        ConnectionReport::new(
            self.supervisor().get_status(),
            self.executor.max_retries(),
            self.degraded().counts(),
        )
    }
}
