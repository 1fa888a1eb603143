//! `GameStore` over a single `tokio-postgres` connection

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Row};
use tollgate_core::ports::GameStore;
use tollgate_domain::{
    GangRecord, InventoryItem, LeaderboardEntry, PrisonRecord, Result, TollgateError,
};
use tracing::{debug, info};

use crate::errors::InfraError;

pub const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

pub struct PgGameStore {
    client: Client,
    connection_task: JoinHandle<()>,
}

impl PgGameStore {
    pub(crate) fn new(client: Client, connection_task: JoinHandle<()>) -> Self {
        Self { client, connection_task }
    }

    /// Ensure the full schema exists on the current database.
    pub async fn run_migrations(&self) -> Result<()> {
        self.client.batch_execute(SCHEMA_SQL).await.map_err(map_pg_error)?;
        self.client
            .execute(
                "INSERT INTO schema_version (version) VALUES ($1) ON CONFLICT (version) DO NOTHING",
                &[&SCHEMA_VERSION],
            )
            .await
            .map_err(map_pg_error)?;

        info!(schema_version = SCHEMA_VERSION, "database schema ensured");
        Ok(())
    }

    pub async fn schema_version(&self) -> Result<Option<i32>> {
        let row = self
            .client
            .query_opt("SELECT max(version) FROM schema_version", &[])
            .await
            .map_err(map_pg_error)?;
        match row {
            Some(row) => row.try_get::<_, Option<i32>>(0).map_err(map_pg_error),
            None => Ok(None),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.client.is_closed() {
            return Err(TollgateError::Connection("database connection closed".into()));
        }
        Ok(())
    }
}

impl Drop for PgGameStore {
    fn drop(&mut self) {
        self.connection_task.abort();
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn ping(&self) -> Result<()> {
        self.ensure_open()?;
        self.client.simple_query("SELECT 1").await.map_err(map_pg_error)?;
        Ok(())
    }

    async fn get_points(&self, user_id: &str) -> Result<i64> {
        self.ensure_open()?;
        let row = self
            .client
            .query_opt("SELECT points FROM user_points WHERE user_id = $1", &[&user_id])
            .await
            .map_err(map_pg_error)?;

        row.map_or(Ok(0), |row| row.try_get("points").map_err(map_pg_error))
    }

    async fn add_points(&self, user_id: &str, amount: i64) -> Result<()> {
        self.ensure_open()?;
        self.client
            .execute(
                "INSERT INTO user_points (user_id, points) VALUES ($1, $2)
                 ON CONFLICT (user_id)
                 DO UPDATE SET points = user_points.points + EXCLUDED.points, updated_at = now()",
                &[&user_id, &amount],
            )
            .await
            .map_err(map_pg_error)?;
        debug!(user_id, amount, "points added");
        Ok(())
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        self.ensure_open()?;
        let rows = self
            .client
            .query(
                "SELECT user_id, points FROM user_points ORDER BY points DESC, user_id ASC LIMIT $1",
                &[&i64::from(limit)],
            )
            .await
            .map_err(map_pg_error)?;

        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(LeaderboardEntry {
                    rank: u32::try_from(i + 1).unwrap_or(u32::MAX),
                    user_id: row.try_get("user_id").map_err(map_pg_error)?,
                    points: row.try_get("points").map_err(map_pg_error)?,
                })
            })
            .collect()
    }

    async fn get_inventory(&self, user_id: &str) -> Result<Vec<InventoryItem>> {
        self.ensure_open()?;
        let rows = self
            .client
            .query(
                "SELECT item_name, quantity FROM inventory WHERE user_id = $1 ORDER BY item_name",
                &[&user_id],
            )
            .await
            .map_err(map_pg_error)?;

        rows.iter()
            .map(|row| {
                Ok(InventoryItem {
                    item_name: row.try_get("item_name").map_err(map_pg_error)?,
                    quantity: row.try_get("quantity").map_err(map_pg_error)?,
                })
            })
            .collect()
    }

    async fn add_item(&self, user_id: &str, item_name: &str, quantity: i32) -> Result<()> {
        self.ensure_open()?;
        InventoryItem::check_amount(quantity)?;
        self.client
            .execute(
                "INSERT INTO inventory (user_id, item_name, quantity) VALUES ($1, $2, $3)
                 ON CONFLICT (user_id, item_name)
                 DO UPDATE SET quantity = inventory.quantity + EXCLUDED.quantity",
                &[&user_id, &item_name, &quantity],
            )
            .await
            .map_err(map_pg_error)?;
        Ok(())
    }

    async fn remove_item(&self, user_id: &str, item_name: &str, quantity: i32) -> Result<bool> {
        self.ensure_open()?;
        // a negative amount would pass the guard below and add items
        InventoryItem::check_amount(quantity)?;
        // conditional update: never drives quantity below zero
        let updated = self
            .client
            .execute(
                "UPDATE inventory SET quantity = quantity - $3
                 WHERE user_id = $1 AND item_name = $2 AND quantity >= $3",
                &[&user_id, &item_name, &quantity],
            )
            .await
            .map_err(map_pg_error)?;
        Ok(updated > 0)
    }

    async fn get_prison_record(&self, user_id: &str) -> Result<Option<PrisonRecord>> {
        self.ensure_open()?;
        let row = self
            .client
            .query_opt(
                "SELECT user_id, reason, release_at, bail_amount FROM prison_records WHERE user_id = $1",
                &[&user_id],
            )
            .await
            .map_err(map_pg_error)?;

        row.as_ref().map(prison_from_row).transpose()
    }

    async fn set_prison_record(&self, record: &PrisonRecord) -> Result<()> {
        self.ensure_open()?;
        self.client
            .execute(
                "INSERT INTO prison_records (user_id, reason, release_at, bail_amount)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (user_id)
                 DO UPDATE SET reason = EXCLUDED.reason,
                               release_at = EXCLUDED.release_at,
                               bail_amount = EXCLUDED.bail_amount",
                &[&record.user_id, &record.reason, &record.release_at, &record.bail_amount],
            )
            .await
            .map_err(map_pg_error)?;
        Ok(())
    }

    async fn get_gang(&self, name: &str) -> Result<Option<GangRecord>> {
        self.ensure_open()?;
        let row = self
            .client
            .query_opt(
                "SELECT name, leader_id, members, bank, created_at FROM gangs WHERE name = $1",
                &[&name],
            )
            .await
            .map_err(map_pg_error)?;

        row.as_ref().map(gang_from_row).transpose()
    }

    async fn create_gang(&self, record: &GangRecord) -> Result<bool> {
        self.ensure_open()?;
        let inserted = self
            .client
            .execute(
                "INSERT INTO gangs (name, leader_id, members, bank, created_at)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (name) DO NOTHING",
                &[&record.name, &record.leader_id, &record.members, &record.bank, &record.created_at],
            )
            .await
            .map_err(map_pg_error)?;
        Ok(inserted == 1)
    }
}

fn prison_from_row(row: &Row) -> Result<PrisonRecord> {
    Ok(PrisonRecord {
        user_id: row.try_get("user_id").map_err(map_pg_error)?,
        reason: row.try_get("reason").map_err(map_pg_error)?,
        release_at: row.try_get("release_at").map_err(map_pg_error)?,
        bail_amount: row.try_get("bail_amount").map_err(map_pg_error)?,
    })
}

fn gang_from_row(row: &Row) -> Result<GangRecord> {
    Ok(GangRecord {
        name: row.try_get("name").map_err(map_pg_error)?,
        leader_id: row.try_get("leader_id").map_err(map_pg_error)?,
        members: row.try_get("members").map_err(map_pg_error)?,
        bank: row.try_get("bank").map_err(map_pg_error)?,
        created_at: row.try_get("created_at").map_err(map_pg_error)?,
    })
}

pub(crate) fn map_pg_error(err: tokio_postgres::Error) -> TollgateError {
    TollgateError::from(InfraError::from(err))
}
