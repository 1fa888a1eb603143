//! Mock game store and connector

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tollgate_core::ports::{GameConnector, GameStore};
use tollgate_domain::{
    GangRecord, InventoryItem, LeaderboardEntry, PrisonRecord, Result, TollgateError,
};

/// In-memory store with scripted failures.
///
/// `ping` fails while `reachable` is false; data operations fail with the
/// queued errors first, then with `Connection` while unreachable.
#[derive(Default)]
pub struct MockGameStore {
    reachable: AtomicBool,
    calls: AtomicU32,
    pings: AtomicU32,
    failures: Mutex<VecDeque<TollgateError>>,
    points: Mutex<HashMap<String, i64>>,
    inventory: Mutex<HashMap<String, HashMap<String, i32>>>,
    prison: Mutex<HashMap<String, PrisonRecord>>,
    gangs: Mutex<HashMap<String, GangRecord>>,
}

impl MockGameStore {
    pub fn healthy() -> Arc<Self> {
        let store = Self::default();
        store.reachable.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    /// Every ping and every operation fails with a connection error
    pub fn outage() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn fail_next(&self, errors: impl IntoIterator<Item = TollgateError>) {
        self.failures.lock().extend(errors);
    }

    pub fn seed_points(&self, user_id: &str, points: i64) {
        self.points.lock().insert(user_id.to_string(), points);
    }

    /// Data operations invoked (pings excluded)
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.lock().pop_front() {
            return Err(err);
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(TollgateError::Connection("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl GameStore for MockGameStore {
    async fn ping(&self) -> Result<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TollgateError::Connection("connection refused".into()))
        }
    }

    async fn get_points(&self, user_id: &str) -> Result<i64> {
        self.begin()?;
        Ok(self.points.lock().get(user_id).copied().unwrap_or(0))
    }

    async fn add_points(&self, user_id: &str, amount: i64) -> Result<()> {
        self.begin()?;
        *self.points.lock().entry(user_id.to_string()).or_insert(0) += amount;
        Ok(())
    }

    async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        self.begin()?;
        let mut balances: Vec<_> =
            self.points.lock().iter().map(|(user, points)| (user.clone(), *points)).collect();
        balances.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(balances
            .into_iter()
            .take(limit as usize)
            .enumerate()
            .map(|(i, (user_id, points))| LeaderboardEntry { rank: i as u32 + 1, user_id, points })
            .collect())
    }

    async fn get_inventory(&self, user_id: &str) -> Result<Vec<InventoryItem>> {
        self.begin()?;
        let inventory = self.inventory.lock();
        let mut items: Vec<_> = inventory
            .get(user_id)
            .map(|items| {
                items
                    .iter()
                    .map(|(name, qty)| InventoryItem { item_name: name.clone(), quantity: *qty })
                    .collect()
            })
            .unwrap_or_default();
        items.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(items)
    }

    async fn add_item(&self, user_id: &str, item_name: &str, quantity: i32) -> Result<()> {
        self.begin()?;
        InventoryItem::check_amount(quantity)?;
        *self
            .inventory
            .lock()
            .entry(user_id.to_string())
            .or_default()
            .entry(item_name.to_string())
            .or_insert(0) += quantity;
        Ok(())
    }

    async fn remove_item(&self, user_id: &str, item_name: &str, quantity: i32) -> Result<bool> {
        self.begin()?;
        InventoryItem::check_amount(quantity)?;
        let mut inventory = self.inventory.lock();
        let Some(held) = inventory.get_mut(user_id).and_then(|items| items.get_mut(item_name))
        else {
            return Ok(false);
        };
        if *held < quantity {
            return Ok(false);
        }
        *held -= quantity;
        Ok(true)
    }

    async fn get_prison_record(&self, user_id: &str) -> Result<Option<PrisonRecord>> {
        self.begin()?;
        Ok(self.prison.lock().get(user_id).cloned())
    }

    async fn set_prison_record(&self, record: &PrisonRecord) -> Result<()> {
        self.begin()?;
        self.prison.lock().insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn get_gang(&self, name: &str) -> Result<Option<GangRecord>> {
        self.begin()?;
        Ok(self.gangs.lock().get(name).cloned())
    }

    async fn create_gang(&self, record: &GangRecord) -> Result<bool> {
        self.begin()?;
        let mut gangs = self.gangs.lock();
        if gangs.contains_key(&record.name) {
            return Ok(false);
        }
        gangs.insert(record.name.clone(), record.clone());
        Ok(true)
    }
}

/// Hands out the same store on every connect, optionally slowly.
pub struct MockConnector {
    store: Arc<MockGameStore>,
    connects: AtomicU32,
    delay: Duration,
    refuse: AtomicBool,
}

impl MockConnector {
    pub fn new(store: Arc<MockGameStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            connects: AtomicU32::new(0),
            delay: Duration::ZERO,
            refuse: AtomicBool::new(false),
        })
    }

    pub fn slow(store: Arc<MockGameStore>, delay: Duration) -> Arc<Self> {
        Arc::new(Self { store, connects: AtomicU32::new(0), delay, refuse: AtomicBool::new(false) })
    }

    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameConnector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn GameStore>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TollgateError::Connection("connection refused".into()));
        }
        Ok(Arc::clone(&self.store) as Arc<dyn GameStore>)
    }
}
