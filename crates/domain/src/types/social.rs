//! Social API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of outbound call, each with its own quota window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    LookupAccount,
    FetchPosts,
    HealthProbe,
}

impl Endpoint {
    pub fn all() -> [Endpoint; 3] {
        [Self::LookupAccount, Self::FetchPosts, Self::HealthProbe]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LookupAccount => "lookup_account",
            Self::FetchPosts => "fetch_posts",
            Self::HealthProbe => "health_probe",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified external account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialAccount {
    pub id: String,
    pub handle: String,
    pub display_name: String,
    pub follower_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub like_count: u64,
    pub repost_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_names_are_stable() {
        let names: Vec<_> = Endpoint::all().iter().map(Endpoint::as_str).collect();
        assert_eq!(names, ["lookup_account", "fetch_posts", "health_probe"]);
        assert_eq!(
            serde_json::to_string(&Endpoint::FetchPosts).unwrap(),
            "\"fetch_posts\""
        );
    }
}
