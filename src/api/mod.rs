//! API Module
//!
//! HTTP handlers and routing for the profile explorer REST API.
//! Every handler is a thin wrapper over one [`crate::client::GitHubClient`]
//! operation, plus the local aggregation views built by [`crate::insights`].

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
