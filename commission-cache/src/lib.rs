//! # Commission Cache
//!
//! Concrete cache implementations (adapters) for the commission calculator.
//! This crate provides the stores that implement the `ReferenceCache` port.

use std::path::Path;
use std::sync::Arc;

use commission_types::ReferenceCache;

pub mod file;
pub mod memory;


pub use file::FileCache;
pub use memory::MemoryCache;

/// Errors raised while opening a cache store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },
}

/// Build a cache store.
///
/// A path selects the persistent JSON-file store; `None` selects the
/// process-local in-memory store.
///
/// # Examples
///
/// ```ignore
/// let cache = build_cache(Some(Path::new(".commission-cache.json"))).await?;
/// let cache = build_cache(None).await?;
/// ```
pub async fn build_cache(path: Option<&Path>) -> Result<Arc<dyn ReferenceCache>, CacheError> {
    match path {
        Some(path) => Ok(Arc::new(FileCache::open(path).await?)),
        None => Ok(Arc::new(MemoryCache::new())),
    }
}
