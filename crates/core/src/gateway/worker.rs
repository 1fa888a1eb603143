//! Single worker serializing every outbound social API call

use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tollgate_common::cache::{CacheConfig, TtlCache};
use tollgate_common::resilience::{Clock, RateLimitWindow, WindowQuota, WindowTracker};
use tollgate_domain::constants::MAX_QUOTA_REQUEUES;
use tollgate_domain::{Endpoint, FailureKind};
use tracing::{debug, info, instrument, warn};

use super::failure::GatewayFailure;
use super::queue::{ApiPayload, QueuedRequest};

/// Worker state published after every handled request
#[derive(Debug, Clone)]
pub struct GatewaySnapshot {
    pub windows: Vec<(Endpoint, RateLimitWindow)>,
    /// Live (unexpired) cache entries
    pub cache_entries: usize,
    /// Clock reading the snapshot was taken at
    pub taken_at: Instant,
}

/// Owns the window tracker and the response cache
///
/// Runs as exactly one task; see [`GatewayWorker::run`].
pub struct GatewayWorker<C: Clock + Clone> {
    rx: mpsc::Receiver<QueuedRequest>,
    requeue: mpsc::Sender<QueuedRequest>,
    windows: WindowTracker<Endpoint, C>,
    cache: TtlCache<String, ApiPayload, C>,
    snapshot: watch::Sender<GatewaySnapshot>,
    cancel: CancellationToken,
    clock: C,
}

impl<C: Clock + Clone> GatewayWorker<C> {
    pub fn new(
        rx: mpsc::Receiver<QueuedRequest>,
        requeue: mpsc::Sender<QueuedRequest>,
        quotas: impl IntoIterator<Item = (Endpoint, WindowQuota)>,
        cache_config: CacheConfig,
        clock: C,
        cancel: CancellationToken,
    ) -> (Self, watch::Receiver<GatewaySnapshot>) {
        let windows = WindowTracker::with_clock(quotas, clock.clone());
        let cache = TtlCache::with_clock(cache_config, clock.clone());
        let initial = GatewaySnapshot {
            windows: collect_windows(&windows),
            cache_entries: 0,
            taken_at: clock.now(),
        };
        let (snapshot, snapshot_rx) = watch::channel(initial);

        (Self { rx, requeue, windows, cache, snapshot, cancel, clock }, snapshot_rx)
    }

    /// Process requests until cancelled, then fail whatever is still queued
    #[instrument(name = "gateway_worker", skip(self))]
    pub async fn run(mut self) {
        info!("gateway worker started");

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(request) => self.handle(request).await,
                    None => break,
                },
            }
        }

        self.drain();
        info!("gateway worker stopped");
    }

    async fn handle(&mut self, request: QueuedRequest) {
        let endpoint = request.endpoint;

        if let Some(hit) = self.cache.get(&request.cache_key) {
            debug!(%endpoint, cache_key = %request.cache_key, "served from cache");
            self.publish();
            request.resolve(Ok(hit));
            return;
        }

        if !self.windows.can_proceed(&endpoint) {
            let wait = self.windows.time_until_available(&endpoint);
            debug!(%endpoint, wait_ms = wait.as_millis() as u64, "window closed; deferring request");
            self.defer(request, wait);
            return;
        }

        self.windows.record_request(&endpoint);
        let operation = request.operation();
        let result = operation().await;

        match result {
            Ok(payload) => {
                self.cache.insert(request.cache_key.clone(), payload.clone());
                self.publish();
                debug!(
                    %endpoint,
                    waited_ms = request.enqueued_at.elapsed().as_millis() as u64,
                    "request completed"
                );
                request.resolve(Ok(payload));
            }
            Err(err)
                if err.failure_kind() == FailureKind::QuotaExceeded
                    && request.quota_retries < MAX_QUOTA_REQUEUES =>
            {
                let retry_after = err
                    .retry_after()
                    .or_else(|| self.windows.window(&endpoint).map(|w| w.quota().window))
                    .unwrap_or_default();
                self.windows.saturate(&endpoint, retry_after);

                let mut request = request;
                request.quota_retries += 1;
                warn!(
                    %endpoint,
                    quota_retries = request.quota_retries,
                    retry_after_secs = retry_after.as_secs(),
                    "server reported quota exhaustion; re-queueing"
                );
                let wait = self.windows.time_until_available(&endpoint).max(retry_after);
                self.publish();
                self.defer(request, wait);
            }
            Err(err) => {
                warn!(%endpoint, kind = %err.failure_kind(), error = %err, "request failed");
                self.publish();
                request.resolve(Err(GatewayFailure::from_error(err)));
            }
        }
    }

    /// Re-enqueue after `wait` from a detached task so the loop keeps moving
    fn defer(&self, request: QueuedRequest, wait: Duration) {
        let requeue = self.requeue.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    request.resolve(Err(GatewayFailure::shutting_down()));
                }
                _ = tokio::time::sleep(wait) => {
                    // wait for a slot: this request was already accepted
                    if let Err(mpsc::error::SendError(request)) = requeue.send(request).await {
                        request.resolve(Err(GatewayFailure::shutting_down()));
                    }
                }
            }
        });
    }

    fn drain(&mut self) {
        self.rx.close();
        let mut drained = 0usize;
        while let Ok(request) = self.rx.try_recv() {
            request.resolve(Err(GatewayFailure::shutting_down()));
            drained += 1;
        }
        if drained > 0 {
            info!(drained, "failed queued requests on shutdown");
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(GatewaySnapshot {
            windows: collect_windows(&self.windows),
            cache_entries: self.cache.live_len(),
            taken_at: self.clock.now(),
        });
    }
}

fn collect_windows<C: Clock>(tracker: &WindowTracker<Endpoint, C>) -> Vec<(Endpoint, RateLimitWindow)> {
    let mut windows: Vec<_> = tracker.windows().map(|(k, w)| (*k, w.clone())).collect();
    windows.sort_by_key(|(endpoint, _)| *endpoint);
    windows
}
