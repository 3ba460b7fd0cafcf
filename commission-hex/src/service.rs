//! Commission Application Service
//!
//! Orchestrates country and rate resolution through the resolver ports.
//! Contains NO infrastructure logic - pure business orchestration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, instrument};

use commission_types::domain::decimal_from_f64;
use commission_types::{
    Commission, CommissionError, CountryResolver, CurrencyCode, RateResolver, Transaction,
};

/// Commission charged on transactions with cards issued inside the EU.
pub const EU_COMMISSION_RATE: Decimal = dec!(0.01);

/// Commission charged on every other transaction.
pub const NON_EU_COMMISSION_RATE: Decimal = dec!(0.02);

/// Application service computing per-transaction commissions.
///
/// Generic over both resolver ports - the adapters are injected at compile time.
/// This enables:
/// - Swapping upstream providers without code changes
/// - Testing with in-memory resolvers
pub struct CommissionService<C: CountryResolver, R: RateResolver> {
    countries: C,
    rates: R,
    reference: CurrencyCode,
}

impl<C: CountryResolver, R: RateResolver> CommissionService<C, R> {
    /// Creates a service reporting commissions in `reference`.
    ///
    /// `rates` must quote against the same reference currency.
    pub fn new(countries: C, rates: R, reference: CurrencyCode) -> Self {
        Self {
            countries,
            rates,
            reference,
        }
    }

    /// Returns a reference to the country resolver.
    pub fn countries(&self) -> &C {
        &self.countries
    }

    /// Returns a reference to the rate resolver.
    pub fn rates(&self) -> &R {
        &self.rates
    }

    pub fn reference(&self) -> &CurrencyCode {
        &self.reference
    }

    /// Computes the commission for one transaction, in the reference currency.
    ///
    /// Any resolver failure aborts the calculation and is returned as is.
    /// Converting by a rate so small that the result leaves the decimal range
    /// fails with [`CommissionError::Arithmetic`].
    #[instrument(
        skip(self, tx),
        fields(bin = %tx.bin(), amount = tx.amount(), currency = %tx.currency())
    )]
    pub async fn calculate_commission(
        &self,
        tx: &Transaction,
    ) -> Result<Commission, CommissionError> {
        let country = self.countries.resolve_country(tx.bin()).await?;
        let is_eu = country.is_eu();

        let rate = self.rates.resolve_rate(tx.currency()).await?;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(CommissionError::NonPositiveRate {
                currency: tx.currency().clone(),
                rate,
            });
        }

        let amount = to_decimal(tx.amount(), "amount")?;
        let converted = if *tx.currency() == self.reference {
            amount
        } else {
            let rate = to_decimal(rate, "rate")?;
            amount.checked_div(rate).ok_or_else(|| {
                CommissionError::Arithmetic(format!("{} / {} overflows", amount, rate))
            })?
        };

        let commission_rate = if is_eu {
            EU_COMMISSION_RATE
        } else {
            NON_EU_COMMISSION_RATE
        };
        let raw = converted.checked_mul(commission_rate).ok_or_else(|| {
            CommissionError::Arithmetic(format!("{} * {} overflows", converted, commission_rate))
        })?;

        let commission = Commission::ceil_to_cent(raw);
        debug!(%country, is_eu, rate, %converted, %commission, "calculated commission");
        Ok(commission)
    }
}

fn to_decimal(value: f64, what: &str) -> Result<Decimal, CommissionError> {
    decimal_from_f64(value).ok_or_else(|| {
        CommissionError::Arithmetic(format!("{} {} is out of decimal range", what, value))
    })
}
