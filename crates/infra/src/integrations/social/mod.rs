//! Social API adapter
//!
//! [`SocialHttpClient`] implements the `SocialApiClient` port against the v2
//! REST API with a bearer token. It makes exactly one HTTP request per call:
//! quota windows, caching and re-queueing all belong to the gateway in
//! `tollgate-core`.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `lookup_account` | `GET /2/users/by/username/{handle}?user.fields=public_metrics` |
//! | `fetch_posts` | `GET /2/users/{id}/tweets?max_results={limit}` |
//! | `probe` | `GET /2/users/me` |
//!
//! Status mapping: 401/403 → `Auth`, 404 → `NotFound`, 429 → `RateLimited`
//! (with `retry-after` or `x-rate-limit-reset`), 5xx and transport failures →
//! `Connection`/`Timeout`.

pub mod client;
mod types;

pub use client::SocialHttpClient;
