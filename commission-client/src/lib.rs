//! # Commission Client
//!
//! Outbound adapters that resolve reference data from rate-limited upstream
//! services, caching every answer in the shared `ReferenceCache`:
//! - [`BinlistResolver`] - issuing country of a BIN
//! - [`LiveRateResolver`] - reference-currency cross rates from USD-pivot quotes

use std::time::Duration;

mod binlist;
mod live_rates;
mod upstream;

pub use binlist::{BinlistResolver, COUNTRY_TTL};
pub use live_rates::{LiveRateResolver, RATE_TABLE_KEY, RATE_TABLE_TTL};
pub use upstream::UpstreamClient;

/// Default per-request timeout for upstream calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the HTTP client shared by all resolvers.
///
/// Every request is bounded by `timeout` so a slow upstream cannot hang the
/// pipeline.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("commission-calculator/", env!("CARGO_PKG_VERSION")))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_builds() {
        assert!(http_client(DEFAULT_TIMEOUT).is_ok());
    }
}
