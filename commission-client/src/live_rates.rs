//! Live exchange rates from a USD-pivot quotes service.
//!
//! The whole quotes table is cached as one entry, holding the raw response
//! body, so one upstream call serves every currency until the entry expires.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use commission_types::{CurrencyCode, RateResolver, ReferenceCache, UpstreamError};
use exchange_rates::{LiveQuotes, PivotQuotes, QuoteError};

use crate::upstream::UpstreamClient;

/// Cache key of the quotes table.
pub const RATE_TABLE_KEY: &str = "exchange_rates_live";

/// Matches the upstream refresh cadence.
pub const RATE_TABLE_TTL: Duration = Duration::from_secs(60 * 60);

/// Rate resolver backed by `GET <base>/live?access_key=<key>`.
pub struct LiveRateResolver {
    upstream: UpstreamClient,
    base_url: String,
    access_key: String,
    reference: CurrencyCode,
    cache: Arc<dyn ReferenceCache>,
    /// Serializes table fetches so concurrent misses cost one upstream call.
    fetch_lock: Mutex<()>,
}

impl LiveRateResolver {
    pub const SERVICE: &'static str = "exchange-rates";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.exchangerate.host";

    /// Creates a resolver quoting rates against `reference`.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        reference: CurrencyCode,
        cache: Arc<dyn ReferenceCache>,
    ) -> Self {
        Self {
            upstream: UpstreamClient::new(http, Self::SERVICE),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_key: access_key.into(),
            reference,
            cache,
            fetch_lock: Mutex::new(()),
        }
    }

    /// Caps table fetches at `requests` per minute.
    pub fn with_requests_per_minute(mut self, requests: u32) -> Self {
        self.upstream = self.upstream.with_requests_per_minute(requests);
        self
    }

    pub fn reference(&self) -> &CurrencyCode {
        &self.reference
    }

    /// Returns the cached table, discarding entries that no longer decode.
    async fn cached_table(&self) -> Option<PivotQuotes> {
        let value = self.cache.get(RATE_TABLE_KEY).await?;
        let table = value
            .as_str()
            .and_then(|raw| serde_json::from_str::<LiveQuotes>(raw).ok())
            .and_then(|live| PivotQuotes::try_from(live).ok());

        if table.is_none() {
            warn!("discarding corrupt cached rate table");
            self.cache.force_expire(RATE_TABLE_KEY).await;
        }
        table
    }

    async fn rate_table(&self) -> Result<PivotQuotes, UpstreamError> {
        if let Some(table) = self.cached_table().await {
            return Ok(table);
        }

        let _guard = self.fetch_lock.lock().await;
        // Another task may have filled the cache while we waited.
        if let Some(table) = self.cached_table().await {
            debug!("rate table filled by concurrent fetch");
            return Ok(table);
        }

        self.fetch_table().await
    }

    async fn fetch_table(&self) -> Result<PivotQuotes, UpstreamError> {
        let url = format!("{}/live", self.base_url);
        let request = self
            .upstream
            .get(&url)
            .query(&[("access_key", self.access_key.as_str())]);
        let body = self.upstream.send(request, "live rates").await?;

        let live: LiveQuotes = self.upstream.decode(&body)?;
        let table = live.validate_fresh().map_err(|e| self.quote_error(e))?;

        info!(quotes = table.len(), "fetched live rate table");
        self.cache
            .set(RATE_TABLE_KEY, Value::String(body), RATE_TABLE_TTL)
            .await;
        Ok(table)
    }

    fn quote_error(&self, err: QuoteError) -> UpstreamError {
        match err {
            QuoteError::Unsuccessful(detail) => UpstreamError::ApiFailure {
                service: self.upstream.service(),
                detail,
            },
            other => self.upstream.invalid_data(other.to_string()),
        }
    }
}

#[async_trait]
impl RateResolver for LiveRateResolver {
    #[instrument(skip(self), fields(currency = %currency, reference = %self.reference))]
    async fn resolve_rate(&self, currency: &CurrencyCode) -> Result<f64, UpstreamError> {
        if *currency == self.reference {
            return Ok(1.0);
        }

        let table = self.rate_table().await?;
        let rate = table
            .cross_rate(currency, &self.reference)
            .map_err(|e| self.quote_error(e))?;
        debug!(rate, "resolved cross rate");
        Ok(rate)
    }
}
