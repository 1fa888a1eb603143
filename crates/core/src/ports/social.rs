//! Port interface for the external social API

use async_trait::async_trait;
use tollgate_domain::{Post, Result, SocialAccount};

/// Raw, unthrottled access to the social API
///
/// Implementations make exactly one outbound call per method invocation and
/// report failures through typed `TollgateError` variants (`Auth`,
/// `RateLimited`, `Connection`, `Timeout`, `NotFound`). Quota accounting,
/// caching and serialization are the gateway's job.
#[async_trait]
pub trait SocialApiClient: Send + Sync {
    /// Look up an account by normalized handle
    async fn lookup_account(&self, handle: &str) -> Result<SocialAccount>;

    /// Fetch up to `limit` recent posts for an account id
    async fn fetch_posts(&self, user_id: &str, limit: u32) -> Result<Vec<Post>>;

    /// Cheap authenticated call used for health checks
    async fn probe(&self) -> Result<String>;
}
