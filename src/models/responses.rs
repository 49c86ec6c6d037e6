//! Response DTOs for the HTTP API
//!
//! Bodies that are not plain GitHub payloads.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::insights::LanguageShare;
use crate::models::Languages;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether a GitHub token is configured
    pub authenticated: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(authenticated: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            authenticated,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub ttl_seconds: u64,
}

impl CacheStatsResponse {
    pub fn new(stats: &CacheStats, ttl_seconds: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            ttl_seconds,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub message: String,
    /// Entries held before the clear
    pub cleared: usize,
}

impl ClearCacheResponse {
    pub fn new(cleared: usize) -> Self {
        Self {
            message: format!("Cleared {} cached responses", cleared),
            cleared,
        }
    }
}

/// Response body for GET /repos/:owner/:repo/languages
#[derive(Debug, Clone, Serialize)]
pub struct LanguagesResponse {
    /// Upstream map, language to bytes
    pub bytes: Languages,
    pub breakdown: Vec<LanguageShare>,
}
