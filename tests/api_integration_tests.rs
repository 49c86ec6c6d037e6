//! Integration Tests for API Endpoints
//!
//! Drives the full router over an in-memory GitHub transport.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use gitflex::{
    api::create_router,
    client::{HttpError, HttpResponse, MockTransport},
    AppState, Config, GitHubClient,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const API: &str = "https://api.github.com";
const REPOS_100: &str = concat!(
    "https://api.github.com/users/octocat/repos",
    "?direction=desc&page=1&per_page=100&sort=updated&type=owner"
);

// == Helper Functions ==

fn create_test_app(transport: &MockTransport) -> Router {
    create_test_app_with(transport, Config::default())
}

fn create_test_app_with(transport: &MockTransport, config: Config) -> Router {
    let client = GitHubClient::with_transport(Arc::new(transport.clone()), &config);
    create_router(AppState::new(client))
}

async fn send(app: &Router, method: &str, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_to_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn sample_repos() -> Value {
    json!([
        {
            "name": "hello-world",
            "html_url": "https://github.com/octocat/hello-world",
            "language": "Rust",
            "stargazers_count": 50,
            "forks_count": 5,
            "fork": false,
            "topics": ["cli"],
            "pushed_at": "2024-01-01T00:00:00Z"
        },
        {
            "name": "spoon-knife",
            "html_url": "https://github.com/octocat/spoon-knife",
            "language": "JavaScript",
            "stargazers_count": 10,
            "forks_count": 20,
            "fork": true,
            "homepage": "https://octocat.github.io/spoon-knife",
            "pushed_at": "2023-01-01T00:00:00Z"
        },
        {
            "name": "linguist",
            "html_url": "https://github.com/octocat/linguist",
            "language": "Rust",
            "stargazers_count": 5,
            "forks_count": 0,
            "fork": false
        }
    ])
}

// == Health Endpoint ==

#[tokio::test]
async fn test_health_endpoint_reports_authentication() {
    let transport = MockTransport::new();

    let json = body_to_json(send(&create_test_app(&transport), "GET", "/health").await).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["authenticated"], false);

    let app = create_test_app_with(&transport, Config::default().with_token("ghp_test"));
    let json = body_to_json(send(&app, "GET", "/health").await).await;
    assert_eq!(json["authenticated"], true);
}

// == Profile Endpoints ==

#[tokio::test]
async fn test_user_endpoint_passes_upstream_fields_through() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/users/octocat"),
        200,
        json!({"login": "octocat", "followers": 3, "hireable": true}),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/users/octocat").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["login"], "octocat");
    assert_eq!(json["followers"], 3);
    assert_eq!(json["hireable"], true);
}

#[tokio::test]
async fn test_user_not_found_body() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/users/nobody"),
        404,
        json!({"message": "Not Found"}),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/users/nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response).await;
    assert_eq!(json["error"], "User not found");
    assert_eq!(json["kind"], "not_found");
}

#[tokio::test]
async fn test_repos_endpoint_forwards_query() {
    let transport = MockTransport::new();
    let url = format!(
        "{API}/users/octocat/repos?{}",
        "direction=asc&page=2&per_page=30&sort=pushed&type=owner&visibility=public"
    );
    transport.push_json(url.clone(), 200, sample_repos());
    let app = create_test_app(&transport);

    let response = send(
        &app,
        "GET",
        "/users/octocat/repos?sort=pushed&direction=asc&page=2&visibility=public",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(transport.request_count(&url), 1);

    let json = body_to_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_overview_endpoint() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/users/octocat"),
        200,
        json!({"login": "octocat", "public_repos": 3}),
    );
    transport.push_json(REPOS_100, 200, sample_repos());
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/users/octocat/overview").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["user"]["login"], "octocat");
    assert_eq!(json["totals"]["repositories"], 3);
    assert_eq!(json["totals"]["stars"], 65);
    assert_eq!(json["totals"]["forks"], 25);
    assert_eq!(json["totals"]["original_repositories"], 2);
    assert_eq!(json["languages"][0]["language"], "Rust");
    assert_eq!(json["top_repositories"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_overview_fails_when_profile_fails() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/users/octocat"),
        404,
        json!({"message": "Not Found"}),
    );
    transport.push_json(REPOS_100, 200, sample_repos());
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/users/octocat/overview").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_showcase_filters_and_sorts() {
    let transport = MockTransport::new();
    transport.push_json(REPOS_100, 200, sample_repos());
    let app = create_test_app(&transport);

    let response = send(
        &app,
        "GET",
        "/users/octocat/showcase?language=Rust&sort_by=stars",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["hello-world", "linguist"]);
    assert_eq!(json[0]["stars_label"], "50");
    assert_eq!(json[0]["language_color"], "#000000");
}

#[tokio::test]
async fn test_showcase_reuses_cached_repositories() {
    let transport = MockTransport::new();
    transport.push_json(REPOS_100, 200, sample_repos());
    let app = create_test_app(&transport);

    send(&app, "GET", "/users/octocat/showcase").await;
    let response = send(&app, "GET", "/users/octocat/showcase?kind=forks").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(transport.request_count(REPOS_100), 1);

    let json = body_to_json(response).await;
    assert_eq!(json[0]["name"], "spoon-knife");
    assert_eq!(
        json[0]["live_demo"],
        "https://octocat.github.io/spoon-knife"
    );
}

#[tokio::test]
async fn test_social_accounts_denied_is_empty() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/users/octocat/social_accounts"),
        404,
        json!({"message": "Not Found"}),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/users/octocat/social_accounts").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await, json!([]));
}

// == Repository Endpoints ==

#[tokio::test]
async fn test_languages_endpoint_adds_breakdown() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/repos/octocat/hello-world/languages"),
        200,
        json!({"Rust": 750, "Shell": 250}),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/repos/octocat/hello-world/languages").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["bytes"]["Rust"], 750);
    assert_eq!(json["breakdown"][0]["language"], "Rust");
    assert_eq!(json["breakdown"][0]["percentage"], 75.0);
}

#[tokio::test]
async fn test_collaborators_forbidden_is_empty() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/repos/octocat/private/collaborators?page=1&per_page=30"),
        403,
        json!({"message": "Must have push access"}),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/repos/octocat/private/collaborators").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await, json!([]));
}

// == Search ==

#[tokio::test]
async fn test_search_users() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/search/users?order=desc&page=1&per_page=10&q=tom&sort=best-match"),
        200,
        json!({"total_count": 1, "incomplete_results": false, "items": [{"login": "tom"}]}),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/search/users?q=tom").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["items"][0]["login"], "tom");
}

#[tokio::test]
async fn test_search_without_query_is_bad_request() {
    let app = create_test_app(&MockTransport::new());

    let response = send(&app, "GET", "/search/users").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_to_json(response).await["kind"], "invalid_request");
}

// == Error Mapping ==

#[tokio::test]
async fn test_rate_limited_maps_to_429_with_retry_after() {
    let transport = MockTransport::new();
    let reset = chrono::Utc::now().timestamp() + 600;
    transport.push_response(
        format!("{API}/users/octocat"),
        HttpResponse::json(403, &json!({"message": "API rate limit exceeded"}))
            .with_header("X-RateLimit-Remaining", "0")
            .with_header("X-RateLimit-Reset", reset.to_string()),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/users/octocat").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    let json = body_to_json(response).await;
    assert_eq!(json["kind"], "rate_limited");
    assert!(json["retry_after"].is_string());
}

#[tokio::test]
async fn test_timeout_maps_to_504() {
    let transport = MockTransport::new();
    transport.push_error(
        format!("{API}/users/octocat"),
        HttpError::Timeout("deadline elapsed".to_string()),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/users/octocat").await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_server_error_maps_to_502() {
    let transport = MockTransport::new();
    transport.push_json(format!("{API}/users/octocat"), 503, json!({}));
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/users/octocat").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_to_json(response).await["error"],
        "GitHub service unavailable"
    );
}

// == Connection and Quota ==

#[tokio::test]
async fn test_connection_with_invalid_token() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/user"),
        401,
        json!({"message": "Bad credentials"}),
    );
    let app = create_test_app_with(&transport, Config::default().with_token("ghp_revoked"));

    let response = send(&app, "GET", "/connection").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["authenticated"], false);
    assert_eq!(json["valid"], false);
    assert_eq!(json["error"], "Invalid token");
}

#[tokio::test]
async fn test_rate_limit_endpoint() {
    let transport = MockTransport::new();
    transport.push_json(
        format!("{API}/rate_limit"),
        200,
        json!({
            "resources": {"core": {"limit": 60, "remaining": 42, "reset": 1700000000, "used": 18}},
            "rate": {"limit": 60, "remaining": 42, "reset": 1700000000, "used": 18}
        }),
    );
    let app = create_test_app(&transport);

    let response = send(&app, "GET", "/rate_limit").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await["rate"]["remaining"], 42);
}

// == Cache Endpoints ==

#[tokio::test]
async fn test_cache_stats_and_clear() {
    let transport = MockTransport::new();
    transport.push_json(format!("{API}/users/octocat"), 200, json!({"login": "octocat"}));
    transport.push_json(format!("{API}/users/octocat"), 200, json!({"login": "octocat"}));
    let app = create_test_app(&transport);

    send(&app, "GET", "/users/octocat").await;
    send(&app, "GET", "/users/octocat").await;

    let stats = body_to_json(send(&app, "GET", "/cache/stats").await).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_entries"], 1);
    assert_eq!(stats["ttl_seconds"], 300);

    let cleared = body_to_json(send(&app, "DELETE", "/cache").await).await;
    assert_eq!(cleared["cleared"], 1);

    send(&app, "GET", "/users/octocat").await;
    assert_eq!(transport.request_count(&format!("{API}/users/octocat")), 2);
}
