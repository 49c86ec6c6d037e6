//! GitHub API Client
//!
//! One async operation per GitHub resource. Every read goes through the shared
//! [`ResponseCache`]; failures are classified once, in [`classify`], and never cached.
//!
//! Concurrent calls for the same key are not coalesced: the cache lock is
//! released before the network call, so both callers fetch and the last
//! response written wins.

pub mod classify;
pub mod options;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, ResponseCache};
use crate::config::{Config, REQUEST_TIMEOUT_SECS};
use crate::error::{GitHubError, Result};
use crate::models::{
    Collaborator, ConnectionStatus, Languages, Organization, RateLimitStatus, Repository,
    SocialAccount, UserProfile, UserSearchResults, UserSummary,
};

use classify::{classify_decode, classify_response, classify_transport};
pub use options::{
    Direction, InvalidOption, PageOptions, QueryParams, RepoListOptions, RepoSort, RepoType,
    SearchOptions, SearchSort,
};
pub use transport::{HttpError, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
#[cfg(any(test, feature = "test-util"))]
pub use transport::MockTransport;

/// Media type requested on every call.
pub const ACCEPT_GITHUB_V3: &str = "application/vnd.github.v3+json";

const USER_AGENT: &str = concat!("gitflex/", env!("CARGO_PKG_VERSION"));

// == GitHub Client ==
/// Cache-aware GitHub REST client.
///
/// Cloning is cheap; clones share the transport and the response cache.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: Option<String>,
    cache: Arc<RwLock<ResponseCache>>,
}

impl GitHubClient {
    /// Builds a client backed by reqwest with the fixed request timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .map_err(|e| classify_transport(&e))?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Builds a client over any transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        Self {
            transport,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
            cache: Arc::new(RwLock::new(ResponseCache::new(Duration::from_secs(
                config.cache_ttl,
            )))),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    // == Resource operations ==

    /// `GET /users/{username}`
    pub async fn get_user(&self, username: &str) -> Result<UserProfile> {
        self.get_cached(&["users", username], &QueryParams::new(), "User")
            .await
    }

    /// `GET /users/{username}/repos`, in the order GitHub returns them.
    pub async fn get_user_repos(
        &self,
        username: &str,
        options: &RepoListOptions,
    ) -> Result<Vec<Repository>> {
        self.get_cached(
            &["users", username, "repos"],
            &options.to_params(),
            "User",
        )
        .await
    }

    /// `GET /repos/{owner}/{repo}`
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        self.get_cached(
            &["repos", owner, repo],
            &QueryParams::new(),
            "Repository",
        )
        .await
    }

    /// `GET /repos/{owner}/{repo}/languages`
    pub async fn get_repository_languages(&self, owner: &str, repo: &str) -> Result<Languages> {
        self.get_cached(
            &["repos", owner, repo, "languages"],
            &QueryParams::new(),
            "Repository",
        )
        .await
    }

    /// `GET /repos/{owner}/{repo}/collaborators`
    ///
    /// Resolves to an empty list when access is denied (403/404); private
    /// repositories routinely hide their collaborators.
    pub async fn get_repository_collaborators(
        &self,
        owner: &str,
        repo: &str,
        options: &PageOptions,
    ) -> Result<Vec<Collaborator>> {
        let result = self
            .get_cached(
                &["repos", owner, repo, "collaborators"],
                &options.to_params(),
                "Repository",
            )
            .await;
        empty_if_denied(result)
    }

    /// `GET /users/{username}/orgs`
    pub async fn get_user_organizations(&self, username: &str) -> Result<Vec<Organization>> {
        self.get_cached(
            &["users", username, "orgs"],
            &QueryParams::new(),
            "User",
        )
        .await
    }

    /// `GET /users/{username}/followers`
    pub async fn get_user_followers(
        &self,
        username: &str,
        options: &PageOptions,
    ) -> Result<Vec<UserSummary>> {
        self.get_cached(
            &["users", username, "followers"],
            &options.to_params(),
            "User",
        )
        .await
    }

    /// `GET /users/{username}/following`
    pub async fn get_user_following(
        &self,
        username: &str,
        options: &PageOptions,
    ) -> Result<Vec<UserSummary>> {
        self.get_cached(
            &["users", username, "following"],
            &options.to_params(),
            "User",
        )
        .await
    }

    /// `GET /search/users`
    pub async fn search_users(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<UserSearchResults> {
        self.get_cached(&["search", "users"], &options.to_params(query), "Search")
            .await
    }

    /// `GET /rate_limit`. Never cached: the quota is live data.
    pub async fn get_rate_limit(&self) -> Result<RateLimitStatus> {
        let url = self.request_url(&["rate_limit"], &QueryParams::new())?;
        let value = self.send(url, "Rate limit").await?;
        decode(&value)
    }

    /// `GET /users/{username}/social_accounts`
    ///
    /// Resolves to an empty list when access is denied (403/404).
    pub async fn get_user_social_accounts(&self, username: &str) -> Result<Vec<SocialAccount>> {
        let result = self
            .get_cached(
                &["users", username, "social_accounts"],
                &QueryParams::new(),
                "User",
            )
            .await;
        empty_if_denied(result)
    }

    /// Checks connectivity and, when a token is configured, its validity.
    ///
    /// A rejected token is reported in the returned status instead of failing.
    pub async fn test_connection(&self) -> Result<ConnectionStatus> {
        if !self.is_authenticated() {
            let status = self.get_rate_limit().await?;
            return Ok(ConnectionStatus {
                authenticated: false,
                valid: true,
                rate_limit: Some(status.rate),
                ..Default::default()
            });
        }

        let check = async {
            let url = self.request_url(&["user"], &QueryParams::new())?;
            let user: UserProfile = decode(&self.send(url, "User").await?)?;
            let status = self.get_rate_limit().await?;
            Ok::<_, GitHubError>((user, status))
        };

        match check.await {
            Ok((user, status)) => Ok(ConnectionStatus {
                authenticated: true,
                valid: true,
                user: Some(user.login),
                rate_limit: Some(status.rate),
                error: None,
            }),
            Err(GitHubError::Unauthorized { .. }) => Ok(ConnectionStatus {
                authenticated: false,
                valid: false,
                error: Some("Invalid token".to_string()),
                ..Default::default()
            }),
            Err(e) => Err(e),
        }
    }

    // == Cache management ==

    /// Evicts every cached response. Returns how many were dropped.
    pub async fn clear_cache(&self) -> usize {
        let removed = self.cache.write().await.clear();
        debug!(removed, "response cache cleared");
        removed
    }

    /// Number of cached responses, stale ones included.
    pub async fn cache_size(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn cache_ttl(&self) -> Duration {
        self.cache.read().await.ttl()
    }

    // == Request plumbing ==

    /// Absolute request URL; its path and query double as the cache key.
    ///
    /// Each segment is percent-encoded on its own, so an identifier can never
    /// add path segments or a query string.
    fn request_url(&self, segments: &[&str], params: &QueryParams) -> Result<Url> {
        let invalid = |detail: String| GitHubError::Unknown {
            status: None,
            message: format!("Invalid request URL: {}", detail),
        };

        if let Some(bad) = segments
            .iter()
            .find(|s| s.trim().is_empty() || matches!(**s, "." | ".."))
        {
            return Err(invalid(format!("'{}' is not a valid path segment", bad)));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(url)
    }

    async fn get_cached<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &QueryParams,
        resource: &str,
    ) -> Result<T> {
        let url = self.request_url(segments, params)?;
        let key = cache_key(&url);

        // The write lock is needed because a stale hit evicts the entry.
        let cached = self.cache.write().await.get(&key);
        if let Some(data) = cached {
            debug!(%key, "cache hit");
            return decode(&data);
        }
        debug!(%key, "cache miss");

        let data = Arc::new(self.send(url, resource).await?);
        let result = decode(&data);
        if result.is_ok() {
            self.cache.write().await.insert(key, data);
        }
        result
    }

    async fn send(&self, url: Url, resource: &str) -> Result<Value> {
        let mut headers = vec![
            ("Accept".to_string(), ACCEPT_GITHUB_V3.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let request = HttpRequest {
            url: url.to_string(),
            headers,
        };

        debug!(url = %request.url, "GET");
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                let err = classify_transport(&e);
                warn!(%url, error = %e, kind = err.kind().as_str(), "GitHub request failed");
                return Err(err);
            }
        };

        if !response.is_success() {
            let err = classify_response(&response, resource, self.is_authenticated());
            warn!(
                %url,
                status = response.status,
                kind = err.kind().as_str(),
                "GitHub returned an error"
            );
            return Err(err);
        }

        serde_json::from_slice(&response.body).map_err(|e| classify_decode(response.status, &e))
    }
}

/// Cache key: path plus the sorted, encoded query string.
pub fn cache_key(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| classify_decode(200, &e))
}

/// Downgrades access denial to an empty list. Rate limiting still fails.
fn empty_if_denied<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(e) if e.is_access_denied() => {
            debug!(error = %e, "access denied, returning no data");
            Ok(Vec::new())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    const API: &str = "https://api.github.com";

    fn client_with(transport: &MockTransport, config: Config) -> GitHubClient {
        GitHubClient::with_transport(Arc::new(transport.clone()), &config)
    }

    #[test]
    fn test_cache_key_is_path_plus_sorted_query() {
        let client = client_with(&MockTransport::new(), Config::default());
        let url = client
            .request_url(&["users", "x", "repos"], &RepoListOptions::default().to_params())
            .unwrap();
        assert_eq!(
            cache_key(&url),
            "/users/x/repos?direction=desc&page=1&per_page=30&sort=updated&type=owner"
        );

        let url = client.request_url(&["users", "x"], &QueryParams::new()).unwrap();
        assert_eq!(cache_key(&url), "/users/x");
        assert_eq!(url.as_str(), "https://api.github.com/users/x");
    }

    #[test]
    fn test_query_values_are_encoded() {
        let client = client_with(&MockTransport::new(), Config::default());
        let url = client
            .request_url(
                &["search", "users"],
                &SearchOptions::default().to_params("tom repos:>42"),
            )
            .unwrap();
        assert_eq!(
            url.query(),
            Some("order=desc&page=1&per_page=10&q=tom+repos%3A%3E42&sort=best-match")
        );
    }

    #[tokio::test]
    async fn test_identifiers_stay_single_path_segments() {
        let transport = MockTransport::new();
        let client = client_with(&transport, Config::default());

        // Nothing is registered, so every call fails; only the sent URLs matter.
        let _ = client.get_user("octocat?per_page=1").await;
        let _ = client.get_repository("o", "r/languages").await;
        let _ = client.get_user("a#b").await;

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                format!("{API}/users/octocat%3Fper_page=1"),
                format!("{API}/repos/o/r%2Flanguages"),
                format!("{API}/users/a%23b"),
            ]
        );
    }

    #[tokio::test]
    async fn test_dot_and_empty_identifiers_are_rejected_before_sending() {
        let transport = MockTransport::new();
        let client = client_with(&transport, Config::default());

        for name in ["..", ".", "", "  "] {
            let err = client.get_user(name).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unknown);
        }
        let err = client.get_repository("..", "r").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);

        assert!(transport.requests().is_empty());
        assert_eq!(client.cache_size().await, 0);
    }

    #[test]
    fn test_base_url_path_is_kept() {
        let config = Config {
            api_base_url: "https://ghe.example.com/api/v3/".to_string(),
            ..Config::default()
        };
        let client = client_with(&MockTransport::new(), config);
        let url = client.request_url(&["users", "x"], &QueryParams::new()).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/users/x");
        assert_eq!(cache_key(&url), "/api/v3/users/x");
    }

    #[tokio::test]
    async fn test_headers_without_token() {
        let transport = MockTransport::new();
        transport.push_json(format!("{API}/users/octocat"), 200, json!({"login": "octocat"}));
        let client = client_with(&transport, Config::default());

        client.get_user("octocat").await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.header("accept"), Some(ACCEPT_GITHUB_V3));
        assert!(request.header("user-agent").unwrap().starts_with("gitflex/"));
        assert_eq!(request.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let transport = MockTransport::new();
        transport.push_json(format!("{API}/users/octocat"), 200, json!({"login": "octocat"}));
        let client = client_with(&transport, Config::default().with_token("ghp_test"));

        client.get_user("octocat").await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.header("authorization"), Some("Bearer ghp_test"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_unknown_and_not_cached() {
        let transport = MockTransport::new();
        let url = format!("{API}/users/octocat");
        transport.push_response(
            url.clone(),
            HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: b"<html>".to_vec(),
            },
        );
        let client = client_with(&transport, Config::default());

        let err = client.get_user("octocat").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(client.cache_size().await, 0);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_not_cached() {
        let transport = MockTransport::new();
        let url = format!("{API}/users/octocat/orgs");
        transport.push_json(url.clone(), 200, json!({"unexpected": true}));
        let client = client_with(&transport, Config::default());

        let err = client.get_user_organizations("octocat").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(client.cache_size().await, 0);
    }

    #[tokio::test]
    async fn test_rate_limit_is_never_cached() {
        let transport = MockTransport::new();
        let url = format!("{API}/rate_limit");
        let body = json!({"rate": {"limit": 60, "remaining": 59, "reset": 1700000000, "used": 1}});
        transport.push_json(url.clone(), 200, body.clone());
        transport.push_json(url.clone(), 200, body);
        let client = client_with(&transport, Config::default());

        client.get_rate_limit().await.unwrap();
        let status = client.get_rate_limit().await.unwrap();

        assert_eq!(status.rate.remaining, 59);
        assert_eq!(transport.request_count(&url), 2);
        assert_eq!(client.cache_size().await, 0);
    }

    #[tokio::test]
    async fn test_social_accounts_rate_limit_is_not_downgraded() {
        let transport = MockTransport::new();
        let url = format!("{API}/users/octocat/social_accounts");
        transport.push_response(
            url,
            HttpResponse::json(403, &json!({"message": "API rate limit exceeded"}))
                .with_header("x-ratelimit-remaining", "0")
                .with_header("x-ratelimit-reset", "1700000000"),
        );
        let client = client_with(&transport, Config::default());

        let err = client.get_user_social_accounts("octocat").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn test_cache_stats_track_hits_and_misses() {
        let transport = MockTransport::new();
        transport.push_json(format!("{API}/users/octocat"), 200, json!({"login": "octocat"}));
        let client = client_with(&transport, Config::default());

        client.get_user("octocat").await.unwrap();
        client.get_user("octocat").await.unwrap();

        let stats = client.cache_stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
