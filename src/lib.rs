//! GitFlex - a cache-aware GitHub profile explorer backend
//!
//! Wraps the public GitHub REST API behind a response cache with a fixed TTL,
//! classifies upstream failures, and serves profile views over HTTP.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod insights;
pub mod models;

pub use api::AppState;
pub use client::GitHubClient;
pub use config::Config;
pub use error::{ErrorKind, GitHubError};
