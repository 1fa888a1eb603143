//! Mock social API client

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tollgate_core::ports::SocialApiClient;
use tollgate_domain::{Endpoint, Post, Result, SocialAccount, TollgateError};

/// Counts every outbound call and replays scripted failures in order.
#[derive(Default)]
pub struct MockSocialClient {
    lookups: AtomicU32,
    fetches: AtomicU32,
    probes: AtomicU32,
    failures: Mutex<VecDeque<TollgateError>>,
    calls: Mutex<Vec<(Endpoint, Instant)>>,
    latency: Option<Duration>,
}

impl MockSocialClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each outbound call sleeps this long before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// The next calls (any endpoint) fail with these errors, in order
    pub fn fail_next(&self, errors: impl IntoIterator<Item = TollgateError>) {
        self.failures.lock().extend(errors);
    }

    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u32 {
        self.lookups() + self.fetches() + self.probes()
    }

    /// Virtual-time instants of every call for one endpoint
    pub fn call_times(&self, endpoint: Endpoint) -> Vec<Instant> {
        self.calls.lock().iter().filter(|(e, _)| *e == endpoint).map(|(_, t)| *t).collect()
    }

    async fn begin(&self, endpoint: Endpoint) -> Result<()> {
        self.calls.lock().push((endpoint, Instant::now()));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SocialApiClient for MockSocialClient {
    async fn lookup_account(&self, handle: &str) -> Result<SocialAccount> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.begin(Endpoint::LookupAccount).await?;
        Ok(SocialAccount {
            id: format!("id-{handle}"),
            handle: handle.to_string(),
            display_name: handle.to_uppercase(),
            follower_count: 42,
        })
    }

    async fn fetch_posts(&self, user_id: &str, limit: u32) -> Result<Vec<Post>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.begin(Endpoint::FetchPosts).await?;
        Ok((0..limit.min(3))
            .map(|i| Post {
                id: format!("{user_id}-{i}"),
                author_id: user_id.to_string(),
                text: format!("post {i}"),
                created_at: None,
                like_count: u64::from(i),
                repost_count: 0,
            })
            .collect())
    }

    async fn probe(&self) -> Result<String> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.begin(Endpoint::HealthProbe).await?;
        Ok("ok".to_string())
    }
}
