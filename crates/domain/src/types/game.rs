//! Game records served by the data-access facade

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TollgateError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_name: String,
    pub quantity: i32,
}

impl InventoryItem {
    /// Amounts added to or removed from an inventory must be positive
    pub fn check_amount(quantity: i32) -> Result<()> {
        if quantity <= 0 {
            return Err(TollgateError::InvalidInput(format!(
                "quantity must be positive, got {quantity}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrisonRecord {
    pub user_id: String,
    pub reason: String,
    pub release_at: DateTime<Utc>,
    pub bail_amount: i64,
}

impl PrisonRecord {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.release_at > now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GangRecord {
    pub name: String,
    pub leader_id: String,
    pub members: Vec<String>,
    pub bank: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn prison_record_expiry() {
        let now = Utc::now();
        let record = PrisonRecord {
            user_id: "42".into(),
            reason: "robbery".into(),
            release_at: now + Duration::minutes(10),
            bail_amount: 500,
        };
        assert!(record.is_active(now));
        assert!(!record.is_active(now + Duration::minutes(11)));
    }

    #[test]
    fn inventory_amounts_must_be_positive() {
        assert!(InventoryItem::check_amount(1).is_ok());
        assert!(matches!(InventoryItem::check_amount(0), Err(TollgateError::InvalidInput(_))));
        assert!(matches!(InventoryItem::check_amount(-5), Err(TollgateError::InvalidInput(_))));
    }
}
