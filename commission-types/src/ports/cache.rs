//! Reference-data cache port.
//!
//! Both resolvers share one cache. Implementations may be in-memory,
//! file-backed, or anything else with per-entry expiry.

use std::time::Duration;

use serde_json::Value;

/// Key-value store with per-entry expiration.
///
/// Operations are infallible from the caller's point of view: the cache is an
/// optimization, so an adapter that cannot persist a write logs it and carries
/// on rather than failing the lookup that triggered it.
#[async_trait::async_trait]
pub trait ReferenceCache: Send + Sync {
    /// Returns the live value for `key`, or `None` on a miss or expiry.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: Value, ttl: Duration);

    /// Expires `key` immediately.
    async fn force_expire(&self, key: &str);
}
