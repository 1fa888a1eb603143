//! HTTP implementation of the social API port
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use tollgate_core::ports::SocialApiClient;
use tollgate_domain::{Post, Result, SocialAccount, SocialConfig, TollgateError};
use tracing::{debug, instrument, warn};

use super::types::{Envelope, TweetData, UserData};
use crate::errors::error_from_status;
use crate::http::HttpClient;

const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";
const POST_FIELDS: &str = "created_at,public_metrics,author_id";

pub struct SocialHttpClient {
    http_client: HttpClient,
    base_url: String,
    bearer_token: String,
}

impl SocialHttpClient {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>, http_client: HttpClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http_client, base_url, bearer_token: bearer_token.into() }
    }

    /// Build from configuration; a missing bearer token is a configuration error
    pub fn from_config(config: &SocialConfig) -> Result<Self> {
        let token = config
            .bearer_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| TollgateError::Config("social.bearer_token is not set".into()))?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .max_attempts(1)
            .build()?;

        Ok(Self::new(config.base_url.clone(), token, http_client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Envelope<T>> {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .http_client
            .request(Method::GET, &url)
            .bearer_auth(&self.bearer_token)
            .query(query);

        let response = self.http_client.send(request).await?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "social API response");

        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| TollgateError::Internal(format!("malformed social API response: {e}")))
    }
}

#[async_trait]
impl SocialApiClient for SocialHttpClient {
    #[instrument(skip(self))]
    async fn lookup_account(&self, handle: &str) -> Result<SocialAccount> {
        let envelope: Envelope<UserData> = self
            .get(
                &format!("/2/users/by/username/{handle}"),
                &[("user.fields", "public_metrics".to_string())],
            )
            .await?;

        match envelope.data {
            Some(user) => Ok(user.into()),
            None => {
                let detail = envelope
                    .errors
                    .first()
                    .map(|problem| problem.describe())
                    .unwrap_or_else(|| format!("no account named {handle}"));
                Err(TollgateError::NotFound(detail))
            }
        }
    }

    #[instrument(skip(self))]
    async fn fetch_posts(&self, user_id: &str, limit: u32) -> Result<Vec<Post>> {
        let envelope: Envelope<Vec<TweetData>> = self
            .get(
                &format!("/2/users/{user_id}/tweets"),
                &[("max_results", limit.to_string()), ("tweet.fields", POST_FIELDS.to_string())],
            )
            .await?;

        if envelope.data.is_none() {
            if let Some(problem) = envelope.errors.first() {
                return Err(TollgateError::NotFound(problem.describe()));
            }
        }

        // an account without posts answers with no `data` at all
        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|tweet| tweet.into_post(user_id))
            .collect())
    }

    #[instrument(skip(self))]
    async fn probe(&self) -> Result<String> {
        let envelope: Envelope<UserData> = self.get("/2/users/me", &[]).await?;
        match envelope.data {
            Some(user) => Ok(format!("ok (@{})", user.username)),
            None => Err(TollgateError::Auth("credentials resolved to no user".into())),
        }
    }
}

async fn error_from_response(response: Response) -> TollgateError {
    let status = response.status();
    let retry_after = retry_after_secs(response.headers());
    let body = response.text().await.unwrap_or_default();
    let detail: String = body.chars().take(200).collect();

    let err = error_from_status(status, retry_after, detail.trim());
    warn!(status = status.as_u16(), kind = %err.failure_kind(), "social API rejected request");
    err
}

/// Seconds until the server's window resets, from `retry-after` or the
/// epoch-seconds `x-rate-limit-reset` header
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim);

    if let Some(secs) = header(RETRY_AFTER.as_str()).and_then(|v| v.parse::<u64>().ok()) {
        return Some(secs);
    }

    header(RATE_LIMIT_RESET_HEADER)
        .and_then(|v| v.parse::<i64>().ok())
        .map(|reset| reset.saturating_sub(Utc::now().timestamp()).max(0) as u64)
}
