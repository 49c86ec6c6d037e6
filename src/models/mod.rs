//! Data models
//!
//! GitHub payloads plus the request/response DTOs of the HTTP API.

pub mod github;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use github::{
    Collaborator, ConnectionStatus, Languages, Organization, RateLimit, RateLimitResources,
    RateLimitStatus, Repository, SocialAccount, UserProfile, UserSearchResults, UserSummary,
};
pub use responses::{CacheStatsResponse, ClearCacheResponse, HealthResponse, LanguagesResponse};
