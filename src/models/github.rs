//! GitHub REST payloads
//!
//! Typed views over upstream JSON. Fields the dashboard does not use are kept
//! in `extra`, so serializing a model reproduces the upstream object.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bytes of code per language, as returned by `/repos/{owner}/{repo}/languages`.
pub type Languages = BTreeMap<String, u64>;

/// `GET /users/{username}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub twitter_username: Option<String>,
    pub public_repos: u64,
    pub public_gists: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Compact account object: repository owners, followers, search hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSummary {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /repos/{owner}/{repo}/collaborators` item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collaborator {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    pub permissions: Option<BTreeMap<String, bool>>,
    pub role_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Repository, both as a listing item and as `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: UserSummary,
    pub private: bool,
    pub html_url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub size: u64,
    pub topics: Vec<String>,
    pub has_pages: bool,
    pub has_wiki: bool,
    pub archived: bool,
    pub default_branch: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /users/{username}/orgs` item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /users/{username}/social_accounts` item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialAccount {
    pub provider: String,
    pub url: String,
}

/// `GET /search/users`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSearchResults {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<UserSummary>,
}

/// One quota bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds
    pub reset: i64,
    pub used: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitResources {
    pub core: RateLimit,
    pub search: RateLimit,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /rate_limit`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitStatus {
    pub resources: RateLimitResources,
    /// Same as `resources.core`; GitHub keeps it for compatibility
    pub rate: RateLimit,
}

/// Result of `GitHubClient::test_connection`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub authenticated: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
