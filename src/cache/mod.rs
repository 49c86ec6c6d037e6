//! Cache Module
//!
//! In-memory response cache with a uniform TTL and lazy expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::ResponseCache;
