//! Reference-data resolver ports.
//!
//! Each resolver is a single capability, so test doubles and alternative
//! upstream providers plug into the commission engine unchanged.

use exchange_rates::CurrencyCode;

use crate::domain::{Bin, CountryCode};
use crate::error::UpstreamError;

/// Resolves the issuing country of a card.
#[async_trait::async_trait]
pub trait CountryResolver: Send + Sync {
    async fn resolve_country(&self, bin: &Bin) -> Result<CountryCode, UpstreamError>;
}

/// Resolves exchange rates against the reference currency.
#[async_trait::async_trait]
pub trait RateResolver: Send + Sync {
    /// Returns X in `1 reference = X currency`.
    async fn resolve_rate(&self, currency: &CurrencyCode) -> Result<f64, UpstreamError>;
}
