//! BIN country lookup against a binlist-compatible service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use commission_types::{Bin, CountryCode, CountryResolver, ReferenceCache, UpstreamError};

use crate::upstream::UpstreamClient;

/// Issuer countries change rarely and the upstream quota is tiny.
pub const COUNTRY_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Country resolver backed by `GET <base>/<bin>`.
pub struct BinlistResolver {
    upstream: UpstreamClient,
    base_url: String,
    cache: Arc<dyn ReferenceCache>,
}

impl BinlistResolver {
    pub const SERVICE: &'static str = "binlist";
    pub const DEFAULT_BASE_URL: &'static str = "https://lookup.binlist.net";

    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        cache: Arc<dyn ReferenceCache>,
    ) -> Self {
        Self {
            upstream: UpstreamClient::new(http, Self::SERVICE),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Caps lookups at `requests` per minute (see [`UpstreamClient::with_requests_per_minute`]).
    pub fn with_requests_per_minute(mut self, requests: u32) -> Self {
        self.upstream = self.upstream.with_requests_per_minute(requests);
        self
    }

    /// Returns the cached country, discarding entries of the wrong shape.
    async fn cached(&self, key: &str) -> Option<CountryCode> {
        let value = self.cache.get(key).await?;
        match value.as_str().and_then(CountryCode::parse) {
            Some(country) => Some(country),
            None => {
                warn!(key, cached = %value, "discarding corrupt cached country");
                self.cache.force_expire(key).await;
                None
            }
        }
    }

    async fn fetch(&self, bin: &Bin) -> Result<CountryCode, UpstreamError> {
        let url = format!("{}/{}", self.base_url, bin);
        let request = self.upstream.get(&url).header("Accept-Version", "3");
        let body = self.upstream.send(request, &format!("BIN {}", bin)).await?;

        let payload: Value = self.upstream.decode(&body)?;
        payload
            .pointer("/country/alpha2")
            .and_then(Value::as_str)
            .and_then(CountryCode::parse)
            .ok_or_else(|| self.upstream.invalid_data("country.alpha2 must be a 2-letter code"))
    }
}

#[async_trait]
impl CountryResolver for BinlistResolver {
    #[instrument(skip(self), fields(bin = %bin))]
    async fn resolve_country(&self, bin: &Bin) -> Result<CountryCode, UpstreamError> {
        let key = bin.cache_key();

        if let Some(country) = self.cached(&key).await {
            debug!(%country, "country cache hit");
            return Ok(country);
        }

        let country = self.fetch(bin).await?;
        self.cache
            .set(&key, Value::String(country.to_string()), COUNTRY_TTL)
            .await;
        info!(%country, "resolved issuing country");
        Ok(country)
    }
}
