//! API Routes
//!
//! Configures the Axum router with every profile-explorer endpoint.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_cache_handler, collaborators_handler, connection_handler,
    followers_handler, following_handler, health_handler, languages_handler, orgs_handler,
    overview_handler, rate_limit_handler, repos_handler, repository_handler,
    search_users_handler, showcase_handler, social_accounts_handler, user_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Liveness plus whether a token is configured
/// - `GET /users/:username` - Profile
/// - `GET /users/:username/repos` - Public repositories
/// - `GET /users/:username/overview` - Profile, totals and top repositories
/// - `GET /users/:username/showcase` - Filtered, sorted repository cards
/// - `GET /users/:username/orgs` - Organizations
/// - `GET /users/:username/followers` / `following`
/// - `GET /users/:username/social_accounts`
/// - `GET /repos/:owner/:repo` - Repository
/// - `GET /repos/:owner/:repo/languages` - Language bytes and shares
/// - `GET /repos/:owner/:repo/collaborators`
/// - `GET /search/users?q=` - User search
/// - `GET /rate_limit` - Live quota
/// - `GET /connection` - Connectivity and token check
/// - `GET /cache/stats`, `DELETE /cache`
///
/// # Middleware
/// - CORS: Allows any origin, since the frontend is served elsewhere
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/users/:username", get(user_handler))
        .route("/users/:username/repos", get(repos_handler))
        .route("/users/:username/overview", get(overview_handler))
        .route("/users/:username/showcase", get(showcase_handler))
        .route("/users/:username/orgs", get(orgs_handler))
        .route("/users/:username/followers", get(followers_handler))
        .route("/users/:username/following", get(following_handler))
        .route(
            "/users/:username/social_accounts",
            get(social_accounts_handler),
        )
        .route("/repos/:owner/:repo", get(repository_handler))
        .route("/repos/:owner/:repo/languages", get(languages_handler))
        .route(
            "/repos/:owner/:repo/collaborators",
            get(collaborators_handler),
        )
        .route("/search/users", get(search_users_handler))
        .route("/rate_limit", get(rate_limit_handler))
        .route("/connection", get(connection_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache", delete(clear_cache_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
