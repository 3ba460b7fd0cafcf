//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use commission_client::{BinlistResolver, DEFAULT_TIMEOUT, LiveRateResolver};
use commission_types::CurrencyCode;

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    pub binlist_url: String,
    pub exchange_rates_url: String,
    pub exchange_rates_access_key: String,
    pub reference_currency: CurrencyCode,
    pub upstream_timeout: Duration,
    /// Local cap on BIN lookups per minute; 0 disables it.
    pub binlist_requests_per_minute: u32,
    /// Local cap on rate-table fetches per minute; 0 disables it.
    pub exchange_rates_requests_per_minute: u32,
    pub json_logs: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let exchange_rates_access_key = var("EXCHANGE_RATES_ACCESS_KEY").ok_or_else(|| {
            anyhow::anyhow!("EXCHANGE_RATES_ACCESS_KEY environment variable is required")
        })?;

        let reference_currency = var("REFERENCE_CURRENCY")
            .unwrap_or_else(|| "EUR".to_string())
            .parse::<CurrencyCode>()
            .map_err(|e| anyhow::anyhow!("REFERENCE_CURRENCY: {}", e))?;

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .map_err(|e| anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS: {}", e))?,
            ),
            None => DEFAULT_TIMEOUT,
        };
        if upstream_timeout.is_zero() {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
        }

        let per_minute = |key: &str| -> anyhow::Result<u32> {
            var(key)
                .map(|v| v.parse::<u32>().map_err(|e| anyhow::anyhow!("{}: {}", key, e)))
                .transpose()
                .map(Option::unwrap_or_default)
        };

        Ok(Self {
            binlist_url: var("BINLIST_URL")
                .unwrap_or_else(|| BinlistResolver::DEFAULT_BASE_URL.to_string()),
            exchange_rates_url: var("EXCHANGE_RATES_URL")
                .unwrap_or_else(|| LiveRateResolver::DEFAULT_BASE_URL.to_string()),
            exchange_rates_access_key,
            reference_currency,
            upstream_timeout,
            binlist_requests_per_minute: per_minute("BINLIST_REQUESTS_PER_MINUTE")?,
            exchange_rates_requests_per_minute: per_minute("EXCHANGE_RATES_REQUESTS_PER_MINUTE")?,
            json_logs: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("binlist_url", &self.binlist_url)
            .field("exchange_rates_url", &self.exchange_rates_url)
            .field("exchange_rates_access_key", &"<redacted>")
            .field("reference_currency", &self.reference_currency)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("binlist_requests_per_minute", &self.binlist_requests_per_minute)
            .field(
                "exchange_rates_requests_per_minute",
                &self.exchange_rates_requests_per_minute,
            )
            .field("json_logs", &self.json_logs)
            .finish()
    }
}
