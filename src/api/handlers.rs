//! API Handlers
//!
//! HTTP request handlers, one per client operation.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::client::{GitHubClient, PageOptions, QueryParams, RepoListOptions};
use crate::config::Config;
use crate::error::{AppError, AppResult, GitHubError};
use crate::insights::{
    filter_repositories, is_valid_username, language_breakdown_by_bytes, sort_repositories,
    ProfileOverview, RepositoryCard,
};
use crate::models::{
    requests, CacheStatsResponse, ClearCacheResponse, Collaborator, ConnectionStatus,
    HealthResponse, LanguagesResponse, Organization, RateLimitStatus, Repository, SocialAccount,
    UserProfile, UserSearchResults, UserSummary,
};

/// Largest page GitHub serves; used when a view needs "all" repositories.
const MAX_PER_PAGE: u32 = 100;

/// Application state shared across all handlers.
///
/// The client is cheap to clone and its clones share one response cache.
#[derive(Clone)]
pub struct AppState {
    pub client: GitHubClient,
}

impl AppState {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// Creates a reqwest-backed client from configuration.
    pub fn from_config(config: &Config) -> Result<Self, GitHubError> {
        Ok(Self::new(GitHubClient::new(config)?))
    }
}

fn check_username(username: &str) -> AppResult<()> {
    if is_valid_username(username) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!(
            "'{}' is not a valid GitHub username",
            username
        )))
    }
}

fn check_repo_name(repo: &str) -> AppResult<()> {
    let valid = !repo.is_empty()
        && repo != "."
        && repo != ".."
        && repo
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!(
            "'{}' is not a valid repository name",
            repo
        )))
    }
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.client.is_authenticated()))
}

/// GET /users/:username
pub async fn user_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserProfile>> {
    check_username(&username)?;
    Ok(Json(state.client.get_user(&username).await?))
}

/// GET /users/:username/repos
pub async fn repos_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Vec<Repository>>> {
    check_username(&username)?;
    let options = requests::repo_list_options(params)?;
    Ok(Json(state.client.get_user_repos(&username, &options).await?))
}

/// GET /users/:username/overview
///
/// Profile, totals, language breakdown and top repositories in one body.
pub async fn overview_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<ProfileOverview>> {
    check_username(&username)?;
    let options = RepoListOptions::default().per_page(MAX_PER_PAGE);
    let (user, repos) = tokio::try_join!(
        state.client.get_user(&username),
        state.client.get_user_repos(&username, &options),
    )?;
    Ok(Json(ProfileOverview::build(user, &repos, Utc::now())))
}

/// GET /users/:username/showcase
///
/// Repository cards filtered and sorted locally.
pub async fn showcase_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Vec<RepositoryCard>>> {
    check_username(&username)?;
    let (filter, sort_by) = requests::showcase_options(params)?;
    let options = RepoListOptions::default().per_page(MAX_PER_PAGE);
    let repos = state.client.get_user_repos(&username, &options).await?;

    let now = Utc::now();
    let cards = sort_repositories(&filter_repositories(&repos, &filter), sort_by)
        .iter()
        .map(|repo| RepositoryCard::from_repository(repo, now))
        .collect();
    Ok(Json(cards))
}

/// GET /users/:username/orgs
pub async fn orgs_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<Organization>>> {
    check_username(&username)?;
    Ok(Json(state.client.get_user_organizations(&username).await?))
}

/// GET /users/:username/followers
pub async fn followers_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Vec<UserSummary>>> {
    check_username(&username)?;
    let options: PageOptions = requests::page_options(params)?;
    Ok(Json(
        state.client.get_user_followers(&username, &options).await?,
    ))
}

/// GET /users/:username/following
pub async fn following_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Vec<UserSummary>>> {
    check_username(&username)?;
    let options = requests::page_options(params)?;
    Ok(Json(
        state.client.get_user_following(&username, &options).await?,
    ))
}

/// GET /users/:username/social_accounts
pub async fn social_accounts_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<SocialAccount>>> {
    check_username(&username)?;
    Ok(Json(state.client.get_user_social_accounts(&username).await?))
}

/// GET /repos/:owner/:repo
pub async fn repository_handler(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> AppResult<Json<Repository>> {
    check_username(&owner)?;
    check_repo_name(&repo)?;
    Ok(Json(state.client.get_repository(&owner, &repo).await?))
}

/// GET /repos/:owner/:repo/languages
pub async fn languages_handler(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> AppResult<Json<LanguagesResponse>> {
    check_username(&owner)?;
    check_repo_name(&repo)?;
    let bytes = state.client.get_repository_languages(&owner, &repo).await?;
    let breakdown = language_breakdown_by_bytes(&bytes);
    Ok(Json(LanguagesResponse { bytes, breakdown }))
}

/// GET /repos/:owner/:repo/collaborators
pub async fn collaborators_handler(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<Vec<Collaborator>>> {
    check_username(&owner)?;
    check_repo_name(&repo)?;
    let options = requests::page_options(params)?;
    Ok(Json(
        state
            .client
            .get_repository_collaborators(&owner, &repo, &options)
            .await?,
    ))
}

/// GET /search/users
pub async fn search_users_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<UserSearchResults>> {
    let (query, options) = requests::search_options(params)?;
    let query =
        query.ok_or_else(|| AppError::InvalidRequest("Query parameter 'q' is required".into()))?;
    Ok(Json(state.client.search_users(&query, &options).await?))
}

/// GET /rate_limit
pub async fn rate_limit_handler(
    State(state): State<AppState>,
) -> AppResult<Json<RateLimitStatus>> {
    Ok(Json(state.client.get_rate_limit().await?))
}

/// GET /connection
pub async fn connection_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ConnectionStatus>> {
    Ok(Json(state.client.test_connection().await?))
}

/// GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.client.cache_stats().await;
    let ttl = state.client.cache_ttl().await;
    Json(CacheStatsResponse::new(&stats, ttl.as_secs()))
}

/// DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let cleared = state.client.clear_cache().await;
    info!(cleared, "response cache cleared on request");
    Json(ClearCacheResponse::new(cleared))
}
