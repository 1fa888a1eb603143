//! Bounded request queue feeding the gateway worker

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tollgate_domain::{Endpoint, Post, Result, SocialAccount};
use tracing::debug;
use uuid::Uuid;

use super::failure::{GatewayFailure, GatewayOutcome};

/// Value produced by a social API call, as stored in the response cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiPayload {
    Account(SocialAccount),
    Posts(Vec<Post>),
    Health(String),
}

/// Deferred outbound call
///
/// `Fn` rather than `FnOnce`: a request rejected by the server's own quota is
/// re-enqueued and executed again.
pub type Operation = Arc<dyn Fn() -> BoxFuture<'static, Result<ApiPayload>> + Send + Sync>;

type Responder = oneshot::Sender<GatewayOutcome<ApiPayload>>;

/// Decrements the pending counter when the request is dropped
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    /// Claim a slot unless `limit` requests are already outstanding
    fn try_reserve(counter: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |pending| {
                (pending < limit).then_some(pending + 1)
            })
            .ok()
            .map(|_| Self(Arc::clone(counter)))
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A caller's request travelling between queue, worker and delayed re-enqueue
pub struct QueuedRequest {
    pub id: Uuid,
    pub endpoint: Endpoint,
    pub cache_key: String,
    pub enqueued_at: Instant,
    /// Server-side quota rejections seen so far
    pub quota_retries: u32,
    operation: Operation,
    responder: Responder,
    _pending: PendingGuard,
}

impl fmt::Debug for QueuedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedRequest")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("cache_key", &self.cache_key)
            .field("quota_retries", &self.quota_retries)
            .finish_non_exhaustive()
    }
}

impl QueuedRequest {
    pub fn operation(&self) -> Operation {
        Arc::clone(&self.operation)
    }

    /// True once the caller stopped waiting (timeout or dropped future)
    pub fn is_abandoned(&self) -> bool {
        self.responder.is_closed()
    }

    /// Hand the outcome to the caller
    ///
    /// Consumes the request, so a request resolves at most once. Returns
    /// `false` when the caller already gave up; that is not an error.
    pub fn resolve(self, outcome: GatewayOutcome<ApiPayload>) -> bool {
        let delivered = self.responder.send(outcome).is_ok();
        if !delivered {
            debug!(
                request_id = %self.id,
                endpoint = %self.endpoint,
                "caller no longer waiting; resolution dropped"
            );
        }
        delivered
    }
}

/// Producer side of the worker's channel
#[derive(Clone)]
pub struct RequestQueue {
    tx: mpsc::Sender<QueuedRequest>,
    pending: Arc<AtomicUsize>,
    capacity: usize,
}

impl RequestQueue {
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<QueuedRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx, pending: Arc::new(AtomicUsize::new(0)), capacity }, rx)
    }

    /// Enqueue a request without waiting for a slot
    ///
    /// The bound covers every unresolved request, deferred ones included, so
    /// requests parked on a closed window still count against capacity. A
    /// full queue rejects immediately with a capacity failure.
    pub fn submit(
        &self,
        endpoint: Endpoint,
        cache_key: String,
        operation: Operation,
    ) -> GatewayOutcome<oneshot::Receiver<GatewayOutcome<ApiPayload>>> {
        let Some(pending) = PendingGuard::try_reserve(&self.pending, self.capacity.max(1)) else {
            debug!(%endpoint, capacity = self.capacity, "request rejected; queue full");
            return Err(GatewayFailure::queue_full(self.capacity));
        };

        let (responder, rx) = oneshot::channel();
        let request = QueuedRequest {
            id: Uuid::new_v4(),
            endpoint,
            cache_key,
            enqueued_at: Instant::now(),
            quota_retries: 0,
            operation,
            responder,
            _pending: pending,
        };

        match self.tx.try_send(request) {
            Ok(()) => Ok(rx),
            Err(mpsc::error::TrySendError::Full(_)) => Err(GatewayFailure::queue_full(self.capacity)),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(GatewayFailure::shutting_down()),
        }
    }

    /// Sender used by the worker for delayed re-enqueues
    pub fn sender(&self) -> mpsc::Sender<QueuedRequest> {
        self.tx.clone()
    }

    /// Accepted requests not yet resolved, including deferred ones
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    fn noop() -> Operation {
        Arc::new(|| async { Ok(ApiPayload::Health("ok".into())) }.boxed())
    }

    #[tokio::test]
    async fn full_queue_rejects_immediately() {
        let (queue, _rx) = RequestQueue::bounded(1);

        assert!(queue.submit(Endpoint::HealthProbe, "a".into(), noop()).is_ok());
        let err = queue.submit(Endpoint::HealthProbe, "b".into(), noop()).unwrap_err();

        assert_eq!(err.kind, tollgate_domain::FailureKind::QuotaExceeded);
        // the rejected request never counted as pending
        assert_eq!(queue.pending(), 1);
    }

    #[tokio::test]
    async fn deferred_requests_count_against_capacity() {
        let (queue, mut rx) = RequestQueue::bounded(2);
        queue.submit(Endpoint::LookupAccount, "a".into(), noop()).unwrap();
        queue.submit(Endpoint::LookupAccount, "b".into(), noop()).unwrap();

        // the worker took both off the channel and parked them
        let parked = [rx.recv().await.unwrap(), rx.recv().await.unwrap()];

        let err = queue.submit(Endpoint::LookupAccount, "c".into(), noop()).unwrap_err();
        assert_eq!(err.kind, tollgate_domain::FailureKind::QuotaExceeded);
        assert_eq!(queue.pending(), 2);

        drop(parked);
        assert!(queue.submit(Endpoint::LookupAccount, "c".into(), noop()).is_ok());
    }

    #[tokio::test]
    async fn pending_tracks_request_lifetime() {
        let (queue, mut rx) = RequestQueue::bounded(4);
        let caller = queue.submit(Endpoint::LookupAccount, "k".into(), noop()).unwrap();
        assert_eq!(queue.pending(), 1);

        let request = rx.recv().await.unwrap();
        assert!(request.resolve(Ok(ApiPayload::Health("done".into()))));
        assert_eq!(queue.pending(), 0);
        assert_eq!(caller.await.unwrap(), Ok(ApiPayload::Health("done".into())));
    }

    #[tokio::test]
    async fn resolving_abandoned_request_is_noop() {
        let (queue, mut rx) = RequestQueue::bounded(4);
        let caller = queue.submit(Endpoint::LookupAccount, "k".into(), noop()).unwrap();
        drop(caller);

        let request = rx.recv().await.unwrap();
        assert!(request.is_abandoned());
        assert!(!request.resolve(Ok(ApiPayload::Health("late".into()))));
    }

    #[tokio::test]
    async fn closed_queue_reports_shutdown() {
        let (queue, rx) = RequestQueue::bounded(4);
        drop(rx);

        let err = queue.submit(Endpoint::HealthProbe, "a".into(), noop()).unwrap_err();
        assert_eq!(err.reason, "gateway shutting down");
    }
}
