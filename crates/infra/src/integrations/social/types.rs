/// Wire types for the social API (v2 user and timeline endpoints)
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tollgate_domain::{Post, SocialAccount};

/// Envelope shared by every v2 response
///
/// A lookup for an unknown handle answers `200` with `errors` and no `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiProblem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiProblem {
    pub fn describe(&self) -> String {
        match (&self.title, &self.detail) {
            (Some(title), Some(detail)) => format!("{title}: {detail}"),
            (Some(text), None) | (None, Some(text)) => text.clone(),
            (None, None) => "unspecified API error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub public_metrics: Option<UserMetrics>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserMetrics {
    #[serde(default)]
    pub followers_count: u64,
}

impl From<UserData> for SocialAccount {
    fn from(user: UserData) -> Self {
        Self {
            id: user.id,
            handle: user.username.to_lowercase(),
            display_name: user.name,
            follower_count: user.public_metrics.map(|m| m.followers_count).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TweetData {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_metrics: Option<TweetMetrics>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TweetMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
}

impl TweetData {
    /// `author_id` is only present when requested; fall back to the queried id
    pub fn into_post(self, queried_user_id: &str) -> Post {
        let metrics = self.public_metrics.unwrap_or_default();
        Post {
            id: self.id,
            author_id: self.author_id.unwrap_or_else(|| queried_user_id.to_string()),
            text: self.text,
            created_at: self.created_at,
            like_count: metrics.like_count,
            repost_count: metrics.retweet_count,
        }
    }
}
